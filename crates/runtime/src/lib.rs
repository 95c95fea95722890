//! Runtime plumbing around the action engine.
//!
//! Modules are organized by responsibility:
//! - [`net`] carries replication messages between clients, the server and
//!   observers
//! - [`session`] routes those messages to per-actor action players
//! - [`world`] provides the world backend trait and an in-memory sandbox
//! - [`workers`] hosts the async simulation worker
//! - [`config`] and [`error`] are shared by all of the above
pub mod config;
pub mod error;
pub mod net;
pub mod session;
pub mod workers;
pub mod world;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use net::{
    ClientEndpoint, ClientMessage, ClientRequest, CodecError, ObserverEndpoint,
    ReplicationChannel, ServerEndpoint, ServerMessage,
};
pub use session::{ActorSnapshot, ObserverSession, ServerSession};
pub use workers::{Command, SimulationHandle, SimulationWorker};
pub use world::{SandboxEntity, SandboxWorld, WorldBackend, WorldEvent};
