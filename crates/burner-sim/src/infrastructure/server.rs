//! WebSocket server for the simulated heater.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting connections and upgrading each one to a WebSocket session.
//! 3. Feeding every inbound text frame to the shared [`DeviceModel`] and
//!    carrying out the resulting [`Reaction`]s.
//! 4. Fanning broadcasts (refresh replies, unsolicited pushes) out to every
//!    session.
//! 5. Stopping cleanly when [`DeviceSimulator::stop`] clears the `running`
//!    flag.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::device::{DeviceModel, Reaction};
use crate::domain::config::SimConfig;

/// Broadcast capacity; a session more than this far behind skips frames.
const OUTBOUND_CAPACITY: usize = 64;

/// What every session receives from the broadcast channel.
#[derive(Debug, Clone)]
enum Outbound {
    Frame(String),
    Disconnect,
}

/// Shared by the accept loop and every session task.
struct Shared {
    model: Mutex<DeviceModel>,
    outbound: broadcast::Sender<Outbound>,
    run_transition_delay: Duration,
}

/// A running simulated heater.
///
/// Dropping it stops the accept loop within 200 ms and disconnects all
/// sessions; [`DeviceSimulator::stop`] does the same and waits for it.
pub struct DeviceSimulator {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    shared: Arc<Shared>,
    accept_task: Option<JoinHandle<()>>,
}

impl DeviceSimulator {
    /// Binds the listener and starts accepting connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(config: SimConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind simulator on {}", config.bind_addr))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read simulator listen address")?;

        let (outbound, _) = broadcast::channel(OUTBOUND_CAPACITY);
        let shared = Arc::new(Shared {
            model: Mutex::new(DeviceModel::new(
                config.initial_state,
                config.write_policy,
                config.echo_diagnostics,
            )),
            outbound,
            run_transition_delay: config.run_transition_delay,
        });

        let running = Arc::new(AtomicBool::new(true));
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&running),
            Arc::clone(&shared),
        ));

        info!("heater simulator listening on ws://{local_addr}");
        Ok(Self {
            local_addr,
            running,
            shared,
            accept_task: Some(accept_task),
        })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `host:port` form a client can connect to.
    pub fn endpoint(&self) -> String {
        self.local_addr.to_string()
    }

    /// Copy of the current device state.
    pub async fn state_snapshot(&self) -> Map<String, Value> {
        self.shared.model.lock().await.state().clone()
    }

    /// Every text frame received from any session, in arrival order.
    pub async fn received_frames(&self) -> Vec<String> {
        self.shared.model.lock().await.received().to_vec()
    }

    /// Merges `update` into the device state and pushes it, unsolicited, to
    /// every connected session.
    pub async fn push(&self, update: Map<String, Value>) {
        let text = self.shared.model.lock().await.merge_push(update);
        let _ = self.shared.outbound.send(Outbound::Frame(text));
    }

    /// Sends a raw text frame to every connected session.
    pub fn push_raw(&self, text: impl Into<String>) {
        let _ = self.shared.outbound.send(Outbound::Frame(text.into()));
    }

    /// Closes every session from the device side; the listener keeps
    /// accepting.
    pub fn disconnect_all(&self) {
        let _ = self.shared.outbound.send(Outbound::Disconnect);
    }

    /// Stops accepting, disconnects every session, and waits for the accept
    /// loop to exit.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.disconnect_all();
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                error!("simulator accept loop failed: {e}");
            }
        }
        info!("heater simulator on {} stopped", self.local_addr);
    }
}

impl Drop for DeviceSimulator {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        let _ = self.shared.outbound.send(Outbound::Disconnect);
    }
}

// ── Accept loop ───────────────────────────────────────────────────────────────

async fn accept_loop(listener: TcpListener, running: Arc<AtomicBool>, shared: Arc<Shared>) {
    loop {
        if !running.load(Ordering::Relaxed) {
            debug!("simulator shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the running flag is re-checked while idle.
        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    handle_session(stream, peer_addr, shared).await;
                });
            }
            Ok(Err(e)) => {
                error!("simulator accept error: {e}");
            }
            Err(_) => {}
        }
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

async fn handle_session(stream: TcpStream, peer_addr: SocketAddr, shared: Arc<Shared>) {
    let session_id = Uuid::new_v4();
    match run_session(stream, peer_addr, session_id, shared).await {
        Ok(()) => info!("simulator session {session_id} ({peer_addr}) closed"),
        Err(e) => warn!("simulator session {session_id} ({peer_addr}) closed with error: {e:#}"),
    }
}

async fn run_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    session_id: Uuid,
    shared: Arc<Shared>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;
    info!("simulator session {session_id} established with {peer_addr}");

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let mut outbound_rx = shared.outbound.subscribe();

    loop {
        tokio::select! {
            inbound = ws_rx.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    let reactions = shared.model.lock().await.handle_frame(&text);
                    for reaction in reactions {
                        match reaction {
                            Reaction::Reply(reply) => {
                                ws_tx
                                    .send(WsMessage::Text(reply))
                                    .await
                                    .context("failed to send reply")?;
                            }
                            Reaction::Broadcast(frame) => {
                                let _ = shared.outbound.send(Outbound::Frame(frame));
                            }
                            Reaction::RunTransition(run_state) => {
                                schedule_run_transition(Arc::clone(&shared), run_state);
                            }
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("receive failed"),
            },
            outbound = outbound_rx.recv() => match outbound {
                Ok(Outbound::Frame(frame)) => {
                    ws_tx
                        .send(WsMessage::Text(frame))
                        .await
                        .context("failed to push frame")?;
                }
                Ok(Outbound::Disconnect) | Err(broadcast::error::RecvError::Closed) => {
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    return Ok(());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("simulator session {session_id} skipped {skipped} pushed frame(s)");
                }
            },
        }
    }
}

fn schedule_run_transition(shared: Arc<Shared>, run_state: i64) {
    tokio::spawn(async move {
        sleep(shared.run_transition_delay).await;
        shared.model.lock().await.apply_run_state(run_state);
        debug!("simulated RunState is now {run_state}");
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────────
