//! Simulation worker that owns the authoritative [`ServerSession`].
//!
//! Applies client messages as they arrive, ticks the session on a fixed
//! interval, and publishes every resulting broadcast on the replication
//! channel.

use std::future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

use action_core::EntityId;

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::net::ServerEndpoint;
use crate::session::{ActorSnapshot, ServerSession};
use crate::world::WorldBackend;

const LOG_TARGET: &str = "runtime::worker";

/// Commands that can be sent to the simulation worker.
pub enum Command {
    /// Step the session by `dt` seconds, independent of the internal clock.
    Advance { dt: f32, reply: oneshot::Sender<()> },
    /// Query one actor (read-only).
    Snapshot {
        actor: EntityId,
        reply: oneshot::Sender<Option<ActorSnapshot>>,
    },
    /// Stop the worker after publishing what is pending.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Background task that drives a [`ServerSession`].
pub struct SimulationWorker<W: WorldBackend> {
    session: ServerSession<W>,
    endpoint: ServerEndpoint,
    command_rx: mpsc::Receiver<Command>,
    tick: Option<Duration>,
}

impl<W: WorldBackend + 'static> SimulationWorker<W> {
    pub fn new(
        session: ServerSession<W>,
        endpoint: ServerEndpoint,
        command_rx: mpsc::Receiver<Command>,
        tick: Option<Duration>,
    ) -> Self {
        Self {
            session,
            endpoint,
            command_rx,
            tick,
        }
    }

    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(
        session: ServerSession<W>,
        endpoint: ServerEndpoint,
        config: &RuntimeConfig,
    ) -> (SimulationHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(config.channel_capacity);
        let worker = Self::new(session, endpoint, command_rx, config.tick_interval());
        let join = tokio::spawn(worker.run());
        (SimulationHandle { command_tx }, join)
    }

    /// Main worker loop.
    ///
    /// Ends on [`Command::Shutdown`] or when every handle is dropped.
    pub async fn run(mut self) {
        let mut interval = self.tick.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        let dt = self.tick.map_or(0.0, |period| period.as_secs_f32());
        let mut clients_open = true;

        debug!(target: LOG_TARGET, tick = ?self.tick, actors = self.session.actors().count(), "simulation worker started");

        loop {
            tokio::select! {
                message = self.endpoint.recv(), if clients_open => match message {
                    Some(message) => {
                        if let Some(Err(err)) = self.session.handle_client_message(message) {
                            debug!(target: LOG_TARGET, error = %err, "client request rejected");
                        }
                        self.publish();
                    }
                    None => {
                        debug!(target: LOG_TARGET, "all clients disconnected");
                        clients_open = false;
                    }
                },
                _ = next_tick(&mut interval) => {
                    self.session.tick(dt);
                    self.publish();
                }
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        debug!(target: LOG_TARGET, "simulation worker stopped");
    }

    /// Returns false when the worker should stop.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Advance { dt, reply } => {
                self.session.tick(dt);
                self.publish();
                if reply.send(()).is_err() {
                    debug!(target: LOG_TARGET, "Advance reply channel closed (caller dropped)");
                }
                true
            }
            Command::Snapshot { actor, reply } => {
                if reply.send(self.session.snapshot(actor)).is_err() {
                    debug!(target: LOG_TARGET, "Snapshot reply channel closed (caller dropped)");
                }
                true
            }
            Command::Shutdown { reply } => {
                self.publish();
                if reply.send(()).is_err() {
                    debug!(target: LOG_TARGET, "Shutdown reply channel closed (caller dropped)");
                }
                false
            }
        }
    }

    fn publish(&mut self) {
        for message in self.session.drain_broadcasts() {
            if let Err(err) = self.endpoint.publish(&message) {
                warn!(target: LOG_TARGET, actor = %message.actor, error = %err, "failed to publish broadcast");
            }
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

/// Cloneable handle for controlling a running [`SimulationWorker`].
#[derive(Clone)]
pub struct SimulationHandle {
    command_tx: mpsc::Sender<Command>,
}

impl SimulationHandle {
    pub fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    /// Steps the session by `dt` and waits until its broadcasts are
    /// published.
    pub async fn advance(&self, dt: f32) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Advance { dt, reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    pub async fn snapshot(&self, actor: EntityId) -> Result<Option<ActorSnapshot>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { actor, reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Asks the worker to stop and waits for it to acknowledge.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
