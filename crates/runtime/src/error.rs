//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the wire codec and worker coordination so callers can
//! bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use action_core::EntityId;

use crate::net::CodecError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("replication channel closed")]
    ChannelClosed,

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("actor {0} is already registered")]
    DuplicateActor(EntityId),
}
