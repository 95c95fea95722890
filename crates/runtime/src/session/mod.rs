//! Sessions route replication messages to the per-actor players.
//!
//! [`ServerSession`] owns one authoritative player per actor and the world
//! they act in. [`ObserverSession`] owns one visualization player per actor
//! on a client and applies what the server broadcasts.
mod host;
mod observer;
mod server;

pub use observer::ObserverSession;
pub use server::{ActorSnapshot, ServerSession};
