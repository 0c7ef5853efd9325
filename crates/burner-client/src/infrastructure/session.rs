//! WebSocket session with the heater.
//!
//! [`Session`] owns the one connection to `ws://{endpoint}` and implements
//! [`HeaterLink`] for the application layer.  It is responsible for:
//!
//! 1. Opening the connection and flipping the liveness flag.
//! 2. Spawning the receive loop that feeds every inbound frame to the
//!    [`InboundDispatcher`].
//! 3. Sending command frames on the write half.
//! 4. Closing the connection and stopping the receive loop.
//!
//! # Receive loop timing
//!
//! Each iteration waits at most `recv_timeout` for a frame.  When nothing
//! arrives the loop sleeps `idle_sleep` before trying again; a quiet device
//! is normal and never ends the session.  Frames that arrive during the sleep
//! wait in the socket buffer and are processed on the next iteration.
//!
//! # I/O timeouts
//!
//! Opening the connection, sending one frame and the close handshake are
//! each bounded by `io_timeout`.  All three hold the connection lock, so an
//! unresponsive host can delay other callers by at most that long.
//!
//! # Keepalive
//!
//! No transport-level pings are sent.  The heater firmware does not answer
//! them, and tungstenite never originates a ping on its own.
//!
//! # Reconnect
//!
//! There is none.  Once the device closes the connection or the transport
//! fails, liveness stays `false` until the caller connects again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, trace, warn};

use burner_core::Command;

use crate::application::dispatcher::{InboundDispatcher, SharedState};
use crate::application::link::{HeaterLink, SendError};
use crate::domain::config::{ClientConfig, Timings};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;

/// Errors from opening or closing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The WebSocket handshake or the TCP connect failed.
    #[error("unable to open websocket connection to {endpoint}: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: WsError,
    },

    /// The host did not complete the handshake within `io_timeout`.
    #[error("timed out after {timeout:?} opening websocket connection to {endpoint}")]
    ConnectTimedOut { endpoint: String, timeout: Duration },

    /// `close` was called with no open connection.
    #[error("no open websocket connection to close")]
    NotOpen,

    /// The transport reported an error while closing.
    #[error("websocket exception while closing the connection: {0}")]
    CloseFailed(#[source] WsError),

    /// The close handshake did not finish within `io_timeout`.
    #[error("timed out after {0:?} closing the websocket connection")]
    CloseTimedOut(Duration),
}

/// Everything that exists only while connected.
struct Connection {
    sink: WsSink,
    reader: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        // A dropped session must not leave its receive loop running.
        self.reader.abort();
    }
}

/// One WebSocket session with one heater.
pub struct Session {
    endpoint: String,
    uri: String,
    timings: Timings,
    alive: Arc<AtomicBool>,
    dispatcher: InboundDispatcher,
    connection: Mutex<Option<Connection>>,
}

impl Session {
    /// Creates a session that will merge inbound frames into `state`.
    ///
    /// Nothing is opened until [`Session::try_connect`] or
    /// [`HeaterLink::connect`].
    pub fn new(config: &ClientConfig, state: SharedState) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            uri: config.uri(),
            timings: config.timings,
            alive: Arc::new(AtomicBool::new(false)),
            dispatcher: InboundDispatcher::new(state),
            connection: Mutex::new(None),
        }
    }

    /// Opens the connection and starts the receive loop.
    ///
    /// Calling this while already connected is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConnectFailed`] if the TCP connect or the
    /// WebSocket handshake fails and [`SessionError::ConnectTimedOut`] if it
    /// takes longer than `io_timeout`.  The receive loop is not started.
    pub async fn try_connect(&self) -> Result<(), SessionError> {
        let mut guard = self.connection.lock().await;

        if guard.is_some() && self.alive.load(Ordering::Acquire) {
            debug!("already connected to {}", self.endpoint);
            return Ok(());
        }

        // A previous connection that the device dropped: make sure its loop
        // has fully stopped before the flag is reused.
        if let Some(mut stale) = guard.take() {
            stale.reader.abort();
            let _ = (&mut stale.reader).await;
        }

        let io_timeout = self.timings.io_timeout();
        let (ws_stream, _response) = timeout(io_timeout, connect_async(self.uri.as_str()))
            .await
            .map_err(|_| SessionError::ConnectTimedOut {
                endpoint: self.endpoint.clone(),
                timeout: io_timeout,
            })?
            .map_err(|source| SessionError::ConnectFailed {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let (sink, source) = ws_stream.split();

        self.alive.store(true, Ordering::Release);
        let reader = tokio::spawn(receive_loop(
            source,
            Arc::clone(&self.alive),
            self.dispatcher.clone(),
            self.timings,
            self.endpoint.clone(),
        ));

        *guard = Some(Connection { sink, reader });
        info!("established websocket connection to {}", self.endpoint);
        Ok(())
    }

    /// Closes the connection and stops the receive loop.
    ///
    /// Liveness is `false` afterwards whether or not the close handshake
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotOpen`] if there is no connection,
    /// [`SessionError::CloseFailed`] if the transport reports an error and
    /// [`SessionError::CloseTimedOut`] if the handshake stalls.
    pub async fn try_close(&self) -> Result<(), SessionError> {
        let mut guard = self.connection.lock().await;
        let Some(mut conn) = guard.take() else {
            return Err(SessionError::NotOpen);
        };

        self.alive.store(false, Ordering::Release);
        conn.reader.abort();
        let _ = (&mut conn.reader).await;

        let io_timeout = self.timings.io_timeout();
        timeout(io_timeout, conn.sink.close())
            .await
            .map_err(|_| SessionError::CloseTimedOut(io_timeout))?
            .map_err(SessionError::CloseFailed)?;
        info!("websocket connection to {} closed", self.endpoint);
        Ok(())
    }
}

#[async_trait]
impl HeaterLink for Session {
    async fn connect(&self) -> bool {
        match self.try_connect().await {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    async fn close(&self) -> bool {
        match self.try_close().await {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    async fn send(&self, command: &Command) -> Result<(), SendError> {
        let mut guard = self.connection.lock().await;
        let conn = match guard.as_mut() {
            Some(conn) if self.alive.load(Ordering::Acquire) => conn,
            _ => return Err(SendError::NotConnected),
        };

        let text = command.to_json()?;
        let io_timeout = self.timings.io_timeout();
        timeout(io_timeout, conn.sink.send(WsMessage::Text(text)))
            .await
            .map_err(|_| SendError::TimedOut(io_timeout))?
            .map_err(|e| SendError::Transport(e.to_string()))
    }
}

// ── Receive loop ──────────────────────────────────────────────────────────────

/// Reads frames until the connection ends or liveness is cleared.
///
/// Clears `alive` on exit, so a device-side close is visible to callers
/// polling [`HeaterLink::is_alive`].
async fn receive_loop(
    mut source: WsSource,
    alive: Arc<AtomicBool>,
    dispatcher: InboundDispatcher,
    timings: Timings,
    endpoint: String,
) {
    while alive.load(Ordering::Acquire) {
        let next = match timeout(timings.recv_timeout(), source.next()).await {
            Ok(next) => next,
            Err(_) => {
                // Quiet device; not an error.
                trace!("no frame from {endpoint} within {:?}", timings.recv_timeout());
                sleep(timings.idle_sleep()).await;
                continue;
            }
        };

        match next {
            Some(Ok(WsMessage::Text(text))) => {
                dispatcher.dispatch(&text).await;
            }
            Some(Ok(WsMessage::Close(frame))) => {
                info!("{endpoint} closed the websocket: {frame:?}");
                break;
            }
            Some(Ok(WsMessage::Binary(data))) => {
                debug!("ignoring {}-byte binary frame from {endpoint}", data.len());
            }
            Some(Ok(_)) => {
                // Ping / Pong / raw frames carry no state.
            }
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                info!("websocket connection to {endpoint} closed");
                break;
            }
            Some(Err(e)) => {
                warn!("websocket receive error from {endpoint}: {e}");
                break;
            }
            None => {
                info!("websocket stream from {endpoint} ended");
                break;
            }
        }
    }

    alive.store(false, Ordering::Release);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
