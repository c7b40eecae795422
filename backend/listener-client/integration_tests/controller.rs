use crate::helpers::{
    TEST_DIGEST, TEST_SECRET, complete_handshake, fast_config, is_connection_closed, recv_json,
    send_json, start_test_server, wait_for_status,
};

use listener_client::protocol::Command;
use listener_client::{ConnectionStatus, spawn_controller};

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

// ============================================================================
// Public API tests for the controller over real sockets
// ============================================================================

/// **VALUE**: Verifies the full handshake against a real WebSocket server.
///
/// **WHY THIS MATTERS**: This is the only path to a usable connection. The server
/// checks the digest byte for byte and then expects the system info subscription.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The digest is computed over the wrong input order or encoding
/// - The `/ws` path or port is wrong and the client never arrives
/// - Subscription is sent before, or not after, authentication
#[tokio::test]
async fn given_running_server_when_started_then_authenticates_and_subscribes() {
    // GIVEN: Server and controller
    let mut server = start_test_server().await;
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let handle = spawn_controller(fast_config(&server, TEST_SECRET), status_tx);

    // WHEN: Started and the server runs the handshake
    handle.start().expect("actor running");
    let mut ws = server.next_connection().await;
    let auth = complete_handshake(&mut ws).await;

    // THEN: Client answered with the digest, then subscribed
    assert_eq!(auth, json!({ "type": "auth", "password": TEST_DIGEST }));
    assert_eq!(recv_json(&mut ws).await, json!({ "type": "subscribeSysInfo" }));
    wait_for_status(&mut status_rx, ConnectionStatus::Ok).await;

    handle.shutdown().await.expect("shutdown acknowledged");
}

/// **VALUE**: Verifies that host commands reach the server once connected.
#[tokio::test]
async fn given_authenticated_when_command_sent_then_server_receives_it() {
    // GIVEN: Authenticated controller
    let mut server = start_test_server().await;
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let handle = spawn_controller(fast_config(&server, TEST_SECRET), status_tx);
    handle.start().expect("actor running");
    let mut ws = server.next_connection().await;
    complete_handshake(&mut ws).await;
    recv_json(&mut ws).await;
    wait_for_status(&mut status_rx, ConnectionStatus::Ok).await;

    // WHEN: Host subscribes to a feed
    handle.send_command(Command::subscribe("cpu"));

    // THEN: Server gets the frame
    assert_eq!(
        recv_json(&mut ws).await,
        json!({ "type": "subscribe", "name": "cpu" })
    );

    handle.shutdown().await.expect("shutdown acknowledged");
}

/// **VALUE**: Verifies that a dropped connection is re-established.
///
/// **WHY THIS MATTERS**: The listener server restarts routinely; the client is
/// expected to come back on its own.
///
/// **BUG THIS CATCHES**: Would catch a termination that never schedules a reconnect,
/// or a reconnect that forgets to authenticate again.
#[tokio::test]
async fn given_connected_when_server_drops_socket_then_reconnects_and_reauthenticates() {
    // GIVEN: Authenticated connection
    let mut server = start_test_server().await;
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let handle = spawn_controller(fast_config(&server, TEST_SECRET), status_tx);
    handle.start().expect("actor running");
    let mut first = server.next_connection().await;
    complete_handshake(&mut first).await;
    wait_for_status(&mut status_rx, ConnectionStatus::Ok).await;

    // WHEN: Server closes the socket
    first.close(None).await.expect("close sent");
    drop(first);

    // THEN: Disconnect reported, and a new connection authenticates again
    wait_for_status(&mut status_rx, ConnectionStatus::Disconnected).await;
    let mut second = server.next_connection().await;
    let auth = complete_handshake(&mut second).await;
    assert_eq!(auth["password"], TEST_DIGEST);
    wait_for_status(&mut status_rx, ConnectionStatus::Ok).await;

    handle.shutdown().await.expect("shutdown acknowledged");
}

/// **VALUE**: Verifies that shutdown closes the socket and nothing reconnects.
///
/// **BUG THIS CATCHES**: Would catch the local close being treated as a failure
/// and scheduling a reconnect after shutdown.
#[tokio::test]
async fn given_connected_when_shutdown_then_socket_closed_and_no_reconnect() {
    // GIVEN: Connected controller
    let mut server = start_test_server().await;
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let handle = spawn_controller(fast_config(&server, TEST_SECRET), status_tx);
    handle.start().expect("actor running");
    let mut ws = server.next_connection().await;
    complete_handshake(&mut ws).await;
    wait_for_status(&mut status_rx, ConnectionStatus::Ok).await;

    // WHEN: Shut down
    handle.shutdown().await.expect("shutdown acknowledged");

    // THEN: Socket closed, no new connection even after several backoff periods
    assert!(is_connection_closed(&mut ws).await);
    assert!(server.stays_quiet(Duration::from_millis(600)).await);
}

/// **VALUE**: Verifies that a config update moves the connection to the new server.
///
/// **BUG THIS CATCHES**: Would catch the old socket's close event scheduling a
/// reconnect back to the old server.
#[tokio::test]
async fn given_connected_when_config_updated_then_moves_to_new_server() {
    // GIVEN: Connected to server A
    let mut server_a = start_test_server().await;
    let mut server_b = start_test_server().await;
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let handle = spawn_controller(fast_config(&server_a, TEST_SECRET), status_tx);
    handle.start().expect("actor running");
    let mut old = server_a.next_connection().await;
    complete_handshake(&mut old).await;
    wait_for_status(&mut status_rx, ConnectionStatus::Ok).await;

    // WHEN: Config points at server B
    handle
        .config_updated(server_b.connection_config(TEST_SECRET))
        .expect("actor running");

    // THEN: Old socket closed, B authenticates, A never hears from the client again
    assert!(is_connection_closed(&mut old).await);
    let mut new = server_b.next_connection().await;
    complete_handshake(&mut new).await;
    wait_for_status(&mut status_rx, ConnectionStatus::Ok).await;
    assert!(server_a.stays_quiet(Duration::from_millis(600)).await);

    handle.shutdown().await.expect("shutdown acknowledged");
}

/// **VALUE**: Verifies that rejected credentials are reported and not retried.
///
/// **WHY THIS MATTERS**: Retrying a wrong secret only fills the server's log; the
/// operator has to fix the config.
#[tokio::test]
async fn given_wrong_secret_when_rejected_then_bad_config_and_no_retry() {
    // GIVEN: Server that rejects the credentials
    let mut server = start_test_server().await;
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let handle = spawn_controller(fast_config(&server, "wrong"), status_tx);
    handle.start().expect("actor running");
    let mut ws = server.next_connection().await;

    // WHEN: Challenge answered, then rejected
    send_json(&mut ws, r#"{"type":"authChallenge","salt":"abc"}"#).await;
    let auth = recv_json(&mut ws).await;
    assert_ne!(auth["password"], TEST_DIGEST);
    send_json(&mut ws, r#"{"type":"authResponse","status":"invalid"}"#).await;

    // THEN: Bad config with the server's status text, and no new connection
    let update = wait_for_status(&mut status_rx, ConnectionStatus::BadConfig).await;
    assert!(update.detail.unwrap_or_default().contains("invalid"));
    assert!(server.stays_quiet(Duration::from_millis(600)).await);

    handle.shutdown().await.expect("shutdown acknowledged");
}
