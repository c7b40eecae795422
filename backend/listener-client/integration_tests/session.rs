use crate::helpers::{is_connection_closed, recv_json, send_json, start_test_server};

use listener_client::error::session::SessionError;
use listener_client::session::{
    Connector, Session, SessionEnvelope, SessionEvent, SessionEventReceiver, TerminationReason,
    WsConnector,
};

use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

async fn next_event(rx: &mut SessionEventReceiver) -> SessionEnvelope {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("No session event within timeout")
        .expect("Event channel closed")
}

fn ws_url(port: u16) -> Url {
    Url::parse(&format!("ws://127.0.0.1:{port}/ws")).unwrap()
}

// ============================================================================
// WsSession over a real socket
// ============================================================================

/// **VALUE**: Verifies that sends before the socket is open fail fast.
///
/// **BUG THIS CATCHES**: Would catch frames being queued before the handshake and
/// then sent out of order (ahead of the auth reply).
#[tokio::test]
async fn given_connecting_session_when_send_then_not_connected() {
    // GIVEN: Session that has not had a chance to connect
    let server = start_test_server().await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let session = WsConnector.open(1, &ws_url(server.port), tx);

    // WHEN: Sending immediately
    let result = session.send("{}".to_string());

    // THEN: Rejected
    assert!(matches!(result, Err(SessionError::NotConnected { .. })));
}

/// **VALUE**: Verifies Ready, inbound text, and outbound frames on a live socket.
#[tokio::test]
async fn given_open_session_when_frames_exchanged_then_events_tagged_with_session() {
    // GIVEN: Session connected to the test server
    let mut server = start_test_server().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = WsConnector.open(7, &ws_url(server.port), tx);
    let mut ws = server.next_connection().await;

    let ready = next_event(&mut rx).await;
    assert_eq!(ready.session, 7);
    assert_eq!(ready.event, SessionEvent::Ready);

    // WHEN: Server sends a frame, client sends one back
    send_json(&mut ws, r#"{"type":"sysInfo"}"#).await;
    session
        .send(r#"{"type":"subscribeSysInfo"}"#.to_string())
        .expect("session open");

    // THEN: Both arrive intact
    let inbound = next_event(&mut rx).await;
    assert_eq!(
        inbound.event,
        SessionEvent::Message(r#"{"type":"sysInfo"}"#.to_string())
    );
    assert_eq!(recv_json(&mut ws).await, json!({ "type": "subscribeSysInfo" }));
}

/// **VALUE**: Verifies that a refused connection reports a transport error.
#[tokio::test]
async fn given_nothing_listening_when_opened_then_terminated_with_error() {
    // GIVEN: A port with nothing behind it
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    // WHEN: Opening a session
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _session = WsConnector.open(3, &ws_url(port), tx);

    // THEN: Terminated with an error, once
    let envelope = next_event(&mut rx).await;
    assert_eq!(envelope.session, 3);
    assert!(matches!(
        envelope.event,
        SessionEvent::Terminated(TerminationReason::Error(_))
    ));
}

/// **VALUE**: Verifies that a local close is silent on the event channel.
///
/// **WHY THIS MATTERS**: The controller treats every termination as a reason to
/// reconnect. A close it asked for itself must not look like one.
#[tokio::test]
async fn given_open_session_when_closed_locally_then_no_termination_event() {
    // GIVEN: Open session
    let mut server = start_test_server().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = WsConnector.open(9, &ws_url(server.port), tx);
    let mut ws = server.next_connection().await;
    assert_eq!(next_event(&mut rx).await.event, SessionEvent::Ready);

    // WHEN: Closed by the client
    session.close();

    // THEN: Server sees the close, the event channel stays quiet
    assert!(is_connection_closed(&mut ws).await);
    let quiet = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(
        !matches!(quiet, Ok(Some(_))),
        "Local close must not emit an event"
    );
    assert!(matches!(
        session.send("{}".to_string()),
        Err(SessionError::NotConnected { .. })
    ));
}
