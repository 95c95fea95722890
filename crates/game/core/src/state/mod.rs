//! Identifiers and per-actor replicated state.
//!
//! Everything here is plain data: cheap to copy, comparable, and (behind the
//! `serde` feature) serializable for the replication codec.
mod actor;
mod ids;

pub use actor::{Faction, LifeState, ReplicatedActorState};
pub use ids::{ActionId, EntityId, InstanceId};
