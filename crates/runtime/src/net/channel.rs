//! In-process replication transport.
//!
//! Client frames go through one mpsc queue to the server; server frames are
//! fanned out to every observer through a broadcast channel. Each direction is
//! FIFO per sender. Frames are encoded on send and decoded on receive so the
//! codec sits on the same path a real transport would use.
use tokio::sync::{broadcast, mpsc};

use super::codec::{decode, encode};
use super::messages::{ClientMessage, ServerMessage};
use crate::error::{Result, RuntimeError};

const LOG_TARGET: &str = "runtime::net";

/// Factory for the endpoints of one replication session.
pub struct ReplicationChannel;

impl ReplicationChannel {
    /// Creates the server endpoint and the first client endpoint.
    ///
    /// More clients come from [`ClientEndpoint::clone`], more observers from
    /// [`ServerEndpoint::subscribe`].
    pub fn open(capacity: usize) -> (ServerEndpoint, ClientEndpoint) {
        let (client_tx, client_rx) = mpsc::channel(capacity);
        let (server_tx, _) = broadcast::channel(capacity);
        (
            ServerEndpoint {
                inbound: client_rx,
                outbound: server_tx,
            },
            ClientEndpoint { outbound: client_tx },
        )
    }
}

/// Sending half held by a client.
#[derive(Clone)]
pub struct ClientEndpoint {
    outbound: mpsc::Sender<Vec<u8>>,
}

impl ClientEndpoint {
    pub async fn send(&self, message: &ClientMessage) -> Result<()> {
        let frame = encode(message)?;
        self.outbound
            .send(frame)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Non-async send; fails when the queue is full or closed.
    pub fn try_send(&self, message: &ClientMessage) -> Result<()> {
        let frame = encode(message)?;
        self.outbound
            .try_send(frame)
            .map_err(|_| RuntimeError::ChannelClosed)
    }
}

/// Server half: receives client frames, publishes server frames.
pub struct ServerEndpoint {
    inbound: mpsc::Receiver<Vec<u8>>,
    outbound: broadcast::Sender<Vec<u8>>,
}

impl ServerEndpoint {
    /// Attaches a new observer. It only sees messages published afterwards.
    pub fn subscribe(&self) -> ObserverEndpoint {
        ObserverEndpoint {
            inbound: self.outbound.subscribe(),
        }
    }

    /// Waits for the next well-formed client message.
    ///
    /// Malformed frames are logged and skipped. Returns `None` once every
    /// client endpoint is gone.
    pub async fn recv(&mut self) -> Option<ClientMessage> {
        while let Some(frame) = self.inbound.recv().await {
            match decode(&frame) {
                Ok(message) => return Some(message),
                Err(err) => tracing::warn!(target: LOG_TARGET, error = %err, "dropping client frame"),
            }
        }
        None
    }

    /// Takes every client message already queued, without waiting.
    pub fn drain(&mut self) -> Vec<ClientMessage> {
        let mut messages = Vec::new();
        while let Ok(frame) = self.inbound.try_recv() {
            match decode(&frame) {
                Ok(message) => messages.push(message),
                Err(err) => tracing::warn!(target: LOG_TARGET, error = %err, "dropping client frame"),
            }
        }
        messages
    }

    /// Publishes to every observer. Returns how many observers were reached.
    pub fn publish(&self, message: &ServerMessage) -> Result<usize> {
        let frame = encode(message)?;
        match self.outbound.send(frame) {
            Ok(receivers) => Ok(receivers),
            Err(_) => {
                tracing::trace!(target: LOG_TARGET, actor = %message.actor, "no observers attached");
                Ok(0)
            }
        }
    }
}

/// Receiving half held by one observer.
pub struct ObserverEndpoint {
    inbound: broadcast::Receiver<Vec<u8>>,
}

impl ObserverEndpoint {
    /// Takes every message already published, without waiting.
    ///
    /// A lagged observer loses the overwritten messages; the loss is logged
    /// and draining continues with the oldest retained message.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        loop {
            match self.inbound.try_recv() {
                Ok(frame) => match decode(&frame) {
                    Ok(message) => messages.push(message),
                    Err(err) => {
                        tracing::warn!(target: LOG_TARGET, error = %err, "dropping server frame")
                    }
                },
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(target: LOG_TARGET, skipped, "observer lagged behind");
                }
                Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                    break;
                }
            }
        }
        messages
    }

    /// Waits for the next message. Returns `None` once the server is gone.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        loop {
            match self.inbound.recv().await {
                Ok(frame) => match decode(&frame) {
                    Ok(message) => return Some(message),
                    Err(err) => {
                        tracing::warn!(target: LOG_TARGET, error = %err, "dropping server frame")
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: LOG_TARGET, skipped, "observer lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
