//! Test helpers for listener integration tests.
//!
//! This module provides a stand-in listener server:
//! - Binding a WebSocket server on an ephemeral port
//! - Handing accepted sockets to the test
//! - Sending/receiving JSON frames
//! - Waiting for a specific controller status

use listener_client::config::{ConnectionConfig, ListenerConfig, ReconnectConfig};
use listener_client::{ConnectionStatus, StatusUpdate};

use common::RedactedSecret;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

pub const TEST_SECRET: &str = "pw";
pub const TEST_SALT: &str = "abc";
/// md5("abc" + "pw")
pub const TEST_DIGEST: &str = "71605ab39e19fe87034aee29cf2957e4";

const WAIT: Duration = Duration::from_secs(5);

pub type ServerSocket = WebSocketStream<TcpStream>;

/// WebSocket server on `127.0.0.1:<ephemeral>` that forwards every accepted socket.
pub struct TestServer {
    pub port: u16,
    accepted: mpsc::UnboundedReceiver<ServerSocket>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Wait for the next client connection.
    pub async fn next_connection(&mut self) -> ServerSocket {
        tokio::time::timeout(WAIT, self.accepted.recv())
            .await
            .expect("No connection within timeout")
            .expect("Server task ended")
    }

    /// True if no client connects within `window`.
    pub async fn stays_quiet(&mut self, window: Duration) -> bool {
        tokio::time::timeout(window, self.accepted.recv())
            .await
            .is_err()
    }

    pub fn connection_config(&self, secret: &str) -> ConnectionConfig {
        ConnectionConfig::new("127.0.0.1", self.port, RedactedSecret::new(secret))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn start_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let port = listener.local_addr().expect("No local addr").port();
    let (tx, accepted) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let Ok(ws) = accept_async(stream).await else {
                continue;
            };
            if tx.send(ws).is_err() {
                break;
            }
        }
    });

    TestServer {
        port,
        accepted,
        task,
    }
}

/// Listener config pointed at `server` with fast reconnects.
pub fn fast_config(server: &TestServer, secret: &str) -> ListenerConfig {
    ListenerConfig {
        connection: server.connection_config(secret),
        reconnect: ReconnectConfig {
            increment_ms: 50,
            per_run_ceiling_ms: 200,
            absolute_ceiling_ms: 200,
        },
    }
}

pub async fn send_json(ws: &mut ServerSocket, raw: &str) {
    ws.send(Message::text(raw.to_owned()))
        .await
        .expect("Failed to send message");
}

/// Receive the next text frame as JSON, skipping control frames.
pub async fn recv_json(ws: &mut ServerSocket) -> Value {
    tokio::time::timeout(WAIT, async {
        loop {
            let msg = ws
                .next()
                .await
                .expect("Socket ended")
                .expect("Error receiving message");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("Client sent invalid JSON");
            }
        }
    })
    .await
    .expect("No message within timeout")
}

/// Run the server side of the handshake. Returns the auth frame the client sent.
pub async fn complete_handshake(ws: &mut ServerSocket) -> Value {
    send_json(
        ws,
        &format!(r#"{{"type":"authChallenge","salt":"{TEST_SALT}"}}"#),
    )
    .await;
    let auth = recv_json(ws).await;
    send_json(ws, r#"{"type":"authResponse","status":"authenticated"}"#).await;
    auth
}

/// True once the client has closed the socket (close frame, EOF, or error).
pub async fn is_connection_closed(ws: &mut ServerSocket) -> bool {
    tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return true,
                Some(Ok(_)) => {}
            }
        }
    })
    .await
    .unwrap_or(false)
}

/// Wait for `wanted`, skipping other updates.
pub async fn wait_for_status(
    rx: &mut mpsc::UnboundedReceiver<StatusUpdate>,
    wanted: ConnectionStatus,
) -> StatusUpdate {
    tokio::time::timeout(WAIT, async {
        loop {
            let update = rx.recv().await.expect("Status channel closed");
            if update.status == wanted {
                return update;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("Status {wanted} not reported within timeout"))
}
