// Push-channel lifecycle tests against a local WebSocket server.

use std::time::{Duration, Instant};

use futures_util::SinkExt;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use tasksync_api::{ConnectionState, PushChannel, topic};

type ServerSocket = WebSocketStream<TcpStream>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// ── Test server ─────────────────────────────────────────────────────

/// Bind a local WebSocket server; every accepted connection is handed to
/// the test through the returned channel.
async fn ws_server() -> (Url, mpsc::UnboundedReceiver<ServerSocket>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let (conn_tx, conn_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let Ok(socket) = tokio_tungstenite::accept_async(stream).await else {
                continue;
            };
            if conn_tx.send(socket).is_err() {
                break;
            }
        }
    });

    let url = Url::parse(&format!("ws://{addr}/ws")).expect("server URL");
    (url, conn_rx)
}

async fn accept(conns: &mut mpsc::UnboundedReceiver<ServerSocket>) -> ServerSocket {
    timeout(RECV_TIMEOUT, conns.recv())
        .await
        .expect("connection within timeout")
        .expect("server alive")
}

fn capture(channel: &PushChannel, topic: &str) -> mpsc::UnboundedReceiver<Value> {
    let (tx, rx) = mpsc::unbounded_channel();
    channel.bus().subscribe(topic, move |data| {
        let _ = tx.send(data.clone());
        Ok(())
    });
    rx
}

// ── Dispatch ────────────────────────────────────────────────────────

#[tokio::test]
async fn frames_are_fanned_out_by_message_type() {
    let (url, mut conns) = ws_server().await;
    let channel = PushChannel::new(url, Duration::from_millis(100));
    let mut deleted = capture(&channel, topic::DELETED);

    channel.connect();
    let mut socket = accept(&mut conns).await;

    socket
        .send(Message::text(
            r#"{"message_type":"todo_deleted","data":{"id":7}}"#,
        ))
        .await
        .expect("send frame");

    let payload = timeout(RECV_TIMEOUT, deleted.recv())
        .await
        .expect("payload within timeout")
        .expect("payload");
    assert_eq!(payload, serde_json::json!({"id": 7}));

    channel.disconnect();
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_connection_survives() {
    let (url, mut conns) = ws_server().await;
    let channel = PushChannel::new(url, Duration::from_millis(100));
    let mut created = capture(&channel, topic::CREATED);

    channel.connect();
    let mut socket = accept(&mut conns).await;

    socket
        .send(Message::text("definitely not json"))
        .await
        .expect("send garbage");
    socket
        .send(Message::text(
            r#"{"message_type":"todo_created","data":{"id":1}}"#,
        ))
        .await
        .expect("send frame");

    // The valid frame after the garbage still arrives on the same connection.
    let payload = timeout(RECV_TIMEOUT, created.recv())
        .await
        .expect("payload within timeout")
        .expect("payload");
    assert_eq!(payload, serde_json::json!({"id": 1}));

    channel.disconnect();
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn state_follows_open_and_close() {
    let (url, mut conns) = ws_server().await;
    let channel = PushChannel::new(url, Duration::from_secs(30));
    let mut state = channel.state();

    assert_eq!(*state.borrow(), ConnectionState::Disconnected);

    channel.connect();
    let mut socket = accept(&mut conns).await;
    timeout(RECV_TIMEOUT, state.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .expect("connected within timeout")
        .expect("state channel open");

    socket.close(None).await.expect("server close");
    timeout(RECV_TIMEOUT, state.wait_for(|s| *s == ConnectionState::Disconnected))
        .await
        .expect("disconnected within timeout")
        .expect("state channel open");

    channel.disconnect();
}

#[tokio::test]
async fn connect_while_connected_is_a_no_op() {
    let (url, mut conns) = ws_server().await;
    let channel = PushChannel::new(url, Duration::from_secs(30));

    channel.connect();
    let _socket = accept(&mut conns).await;

    channel.connect();
    channel.connect();

    // No extra connection attempts show up.
    assert!(
        timeout(Duration::from_millis(300), conns.recv())
            .await
            .is_err()
    );

    channel.disconnect();
}

// ── Reconnect policy ────────────────────────────────────────────────

#[tokio::test]
async fn reconnects_after_the_fixed_delay_and_not_before() {
    let delay = Duration::from_millis(400);
    let (url, mut conns) = ws_server().await;
    let channel = PushChannel::new(url, delay);

    channel.connect();
    let socket = accept(&mut conns).await;

    // Unexpected close: drop the server side without a close handshake.
    let closed_at = Instant::now();
    drop(socket);

    let _second = accept(&mut conns).await;
    let elapsed = closed_at.elapsed();
    assert!(
        elapsed >= delay,
        "reconnected after {elapsed:?}, before the {delay:?} delay elapsed"
    );

    channel.disconnect();
}

#[tokio::test]
async fn manual_disconnect_suppresses_the_pending_reconnect() {
    let delay = Duration::from_millis(100);
    let (url, mut conns) = ws_server().await;
    let channel = PushChannel::new(url, delay);

    channel.connect();
    let _socket = accept(&mut conns).await;

    channel.disconnect();

    // Well past the reconnect delay: no new connection attempt.
    assert!(
        timeout(delay * 4, conns.recv()).await.is_err(),
        "manual disconnect must cancel the reconnect timer"
    );
}

#[tokio::test]
async fn disconnect_emits_disconnected_event() {
    let (url, mut conns) = ws_server().await;
    let channel = PushChannel::new(url, Duration::from_secs(30));
    let mut disconnected = capture(&channel, topic::DISCONNECTED);

    channel.connect();
    let _socket = accept(&mut conns).await;
    channel.disconnect();

    timeout(RECV_TIMEOUT, disconnected.recv())
        .await
        .expect("disconnected event within timeout")
        .expect("event");
}
