//! WebSocket push channel with fixed-delay auto-reconnect.
//!
//! The channel is receive-only: the service pushes `{message_type, data}`
//! frames and each one is fanned out on the [`EventBus`] under its
//! `message_type` topic. The channel never sends a frame.
//!
//! An unexpected close schedules a reconnect after a fixed delay -- no
//! backoff growth, no retry cap. The delay and the read loop are tied to a
//! per-connect [`CancellationToken`], so a caller-initiated
//! [`disconnect`](PushChannel::disconnect) tears down both the live
//! connection and any pending retry.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use tasksync_api::PushChannel;
//! use url::Url;
//!
//! let url = Url::parse("ws://localhost:3000/ws")?;
//! let channel = PushChannel::new(url, Duration::from_secs(3));
//! channel.bus().subscribe("todo_created", |data| {
//!     println!("created: {data}");
//!     Ok(())
//! });
//! channel.connect();
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::bus::EventBus;
use crate::wire::PushEnvelope;

/// Topics the gateway emits on the bus.
///
/// The `todo_*` topics arrive from the wire; `connected`, `disconnected`,
/// and `error` are emitted locally by the channel's own lifecycle.
pub mod topic {
    pub const CREATED: &str = "todo_created";
    pub const UPDATED: &str = "todo_updated";
    pub const TOGGLED: &str = "todo_toggled";
    pub const DELETED: &str = "todo_deleted";
    pub const CONNECTED: &str = "connected";
    pub const DISCONNECTED: &str = "disconnected";
    pub const ERROR: &str = "error";
}

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state, owned exclusively by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

// ── PushChannel ──────────────────────────────────────────────────────

/// Handle to the push channel. Cheaply cloneable.
#[derive(Clone)]
pub struct PushChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    url: url::Url,
    reconnect_delay: Duration,
    bus: Arc<EventBus>,
    state: watch::Sender<ConnectionState>,
    /// Cancellation token for the current connection generation.
    /// `Some` from `connect()` until `disconnect()`, spanning reconnects.
    conn: Mutex<Option<CancellationToken>>,
}

impl PushChannel {
    /// Create a channel for `url`. Does not connect.
    pub fn new(url: url::Url, reconnect_delay: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(ChannelInner {
                url,
                reconnect_delay,
                bus: Arc::new(EventBus::new()),
                state,
                conn: Mutex::new(None),
            }),
        }
    }

    /// The bus inbound events are fanned out on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.inner.bus
    }

    /// Subscribe to connection state changes.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Open the channel and spawn the background read loop.
    ///
    /// Idempotent: a call while already connected, connecting, or waiting
    /// out a reconnect delay is a no-op. Must be called within a tokio
    /// runtime.
    pub fn connect(&self) {
        let mut conn = lock(&self.inner.conn);
        if conn.is_some() {
            return;
        }
        let token = CancellationToken::new();
        *conn = Some(token.clone());
        drop(conn);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            connection_loop(inner, token).await;
        });
    }

    /// Close the channel and suppress any pending automatic reconnect.
    pub fn disconnect(&self) {
        if let Some(token) = lock(&self.inner.conn).take() {
            token.cancel();
        }
    }
}

fn lock(conn: &Mutex<Option<CancellationToken>>) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Background loop ──────────────────────────────────────────────────

/// Connect → read until close → enter `Disconnected` → wait the fixed
/// delay → reconnect. Runs until the generation token is cancelled.
async fn connection_loop(inner: Arc<ChannelInner>, token: CancellationToken) {
    loop {
        let _ = inner.state.send(ConnectionState::Connecting);

        if let Err(e) = connect_and_read(&inner, &token).await {
            warn!(error = %e, "push channel error");
            inner.bus.emit(topic::ERROR, &Value::String(e.to_string()));
        }

        let _ = inner.state.send(ConnectionState::Disconnected);
        inner.bus.emit(topic::DISCONNECTED, &Value::Null);

        if token.is_cancelled() {
            break;
        }

        debug!(
            delay = ?inner.reconnect_delay,
            "push channel closed unexpectedly, waiting before reconnect"
        );
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            () = tokio::time::sleep(inner.reconnect_delay) => {}
        }
    }

    debug!("push channel loop exiting");
}

/// Establish a single connection and read frames until it drops.
///
/// Returns `Ok` on clean closes (close frame, stream end, cancellation) and
/// `Err` on handshake or transport failures. Either way the caller drives
/// the transition to `Disconnected` -- an `error` event alone never changes
/// state.
async fn connect_and_read(
    inner: &ChannelInner,
    token: &CancellationToken,
) -> Result<(), crate::error::Error> {
    debug!(url = %inner.url, "connecting push channel");

    let ws_stream = tokio::select! {
        biased;
        () = token.cancelled() => return Ok(()),
        result = tokio_tungstenite::connect_async(inner.url.as_str()) => {
            let (ws_stream, _response) = result
                .map_err(|e| crate::error::Error::ChannelConnect(e.to_string()))?;
            ws_stream
        }
    };

    info!("push channel connected");
    let _ = inner.state.send(ConnectionState::Connected);
    inner.bus.emit(topic::CONNECTED, &Value::Null);

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        dispatch_frame(text.as_str(), &inner.bus);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite answers pings automatically
                        trace!("push channel ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            info!(code = %cf.code, reason = %cf.reason, "push channel close frame");
                        } else {
                            info!("push channel close frame (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(crate::error::Error::Channel(e.to_string()));
                    }
                    None => {
                        info!("push channel stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame -- the service never sends these
                    }
                }
            }
        }
    }
}

// ── Frame dispatch ───────────────────────────────────────────────────

/// Parse one text frame and emit it on the bus.
///
/// Malformed frames are logged and dropped; the connection stays open.
fn dispatch_frame(text: &str, bus: &EventBus) {
    let envelope: PushEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, "dropping malformed push frame");
            return;
        }
    };

    trace!(topic = %envelope.message_type, "push frame");
    bus.emit(&envelope.message_type, &envelope.data);
}

// ── Tests ────────────────────────────────────────────────────────────
