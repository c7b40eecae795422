use crate::error::session::SessionError;
use crate::session::{
    Connector, Session, SessionEnvelope, SessionEvent, SessionEventSender, SessionId,
    TerminationReason,
};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures_util::{SinkExt, StreamExt};
use log::{debug, trace, warn};
use tokio::spawn as TokioSpawn;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

const STATE_CONNECTING: u8 = 0;
const STATE_OPEN: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Opens [`WsSession`]s with `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Session = WsSession;

    fn open(&self, id: SessionId, url: &Url, events: SessionEventSender) -> WsSession {
        WsSession::open(id, url, events)
    }
}

/// Handle to one WebSocket connection task.
///
/// Dropping the handle closes the connection.
pub struct WsSession {
    id: SessionId,
    state: Arc<AtomicU8>,
    outbound_tx: mpsc::UnboundedSender<String>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl WsSession {
    /// Spawn the connection task. Requires a running tokio runtime.
    pub fn open(id: SessionId, url: &Url, events: SessionEventSender) -> Self {
        let state = Arc::new(AtomicU8::new(STATE_CONNECTING));
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();

        debug!("Session {id}: connecting to {url}");

        TokioSpawn(run_session(
            id,
            url.to_string(),
            Arc::clone(&state),
            outbound_rx,
            close_rx,
            events,
        ));

        Self {
            id,
            state,
            outbound_tx,
            close_tx: Some(close_tx),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_OPEN
    }
}

impl Session for WsSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn send(&self, payload: String) -> Result<(), SessionError> {
        if !self.is_open() {
            return Err(SessionError::NotConnected {
                message: format!("Session {} is not open", self.id),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.outbound_tx
            .send(payload)
            .map_err(|_| SessionError::NotConnected {
                message: format!("Session {} task has ended", self.id),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn close(&mut self) {
        self.state.store(STATE_CLOSED, Ordering::SeqCst);

        if let Some(close_tx) = self.close_tx.take() {
            debug!("Session {}: closing", self.id);
            // Task may already be gone
            let _ = close_tx.send(());
        }
    }
}

impl Drop for WsSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Connection task: connect, pump frames both ways, report exactly one
/// termination unless closed locally.
async fn run_session(
    id: SessionId,
    url: String,
    state: Arc<AtomicU8>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    mut close_rx: oneshot::Receiver<()>,
    events: SessionEventSender,
) {
    let emit = |event: SessionEvent| {
        // Receiver gone means the controller stopped; nothing left to notify
        let _ = events.send(SessionEnvelope { session: id, event });
    };

    let connected = tokio::select! {
        _ = &mut close_rx => {
            debug!("Session {id}: closed before connecting");
            return;
        }
        result = connect_async(url.as_str()) => result,
    };

    let ws_stream = match connected {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            warn!("Session {id}: connect to {url} failed: {e}");
            if state.swap(STATE_CLOSED, Ordering::SeqCst) == STATE_CLOSED {
                return;
            }
            emit(SessionEvent::Terminated(TerminationReason::Error(
                e.to_string(),
            )));
            return;
        }
    };

    // A local close may have raced the handshake
    if state
        .compare_exchange(STATE_CONNECTING, STATE_OPEN, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        debug!("Session {id}: closed during handshake");
        return;
    }

    debug!("Session {id}: socket connected");
    emit(SessionEvent::Ready);

    let (mut write, mut read) = ws_stream.split();

    let reason = loop {
        tokio::select! {
            _ = &mut close_rx => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    trace!("Session {id}: close frame not sent: {e}");
                }
                debug!("Session {id}: closed locally");
                return;
            }
            Some(payload) = outbound_rx.recv() => {
                trace!("Session {id}: sending {payload}");
                if let Err(e) = write.send(Message::text(payload)).await {
                    break TerminationReason::Error(e.to_string());
                }
            }
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => emit(SessionEvent::Message(text.as_str().to_owned())),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => emit(SessionEvent::Message(text)),
                    Err(e) => emit(SessionEvent::DecodeFailed(format!(
                        "Binary frame is not UTF-8: {e}"
                    ))),
                },
                Some(Ok(Message::Close(frame))) => {
                    break TerminationReason::RemoteClosed(
                        frame.map(|f| f.reason.as_str().to_owned()),
                    );
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break TerminationReason::Error(e.to_string()),
                None => break TerminationReason::RemoteClosed(None),
            },
        }
    };

    debug!("Session {id}: terminated ({reason})");
    if state.swap(STATE_CLOSED, Ordering::SeqCst) == STATE_CLOSED {
        return;
    }
    emit(SessionEvent::Terminated(reason));
}
