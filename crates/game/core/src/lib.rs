//! Ability execution engine for real-time action games.
//!
//! `action-core` runs character abilities as timed, cancellable instances.
//! The server side ([`engine::AuthoritativeActionPlayer`]) decides what
//! happens; the observer side ([`engine::VisualizationActionPlayer`]) replays
//! it from a stream of [`engine::Broadcast`]s and lets the owning client
//! anticipate its own input. Everything the engine needs from the world comes
//! through the narrow collaborator traits in [`env`].
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

#[cfg(test)]
mod testing;

pub use action::{
    ActionBehavior, ActionConfig, ActionError, ActionLogic, ActionRequestData, BlockingMode,
    BuffableValue, Conclusion, GameplayActivity, PlayError,
};
pub use config::{EngineConfig, PrototypeIds, TossTuning};
pub use engine::{AuthoritativeActionPlayer, Broadcast, PlayOutcome, VisualizationActionPlayer};
pub use env::{ActionOracle, ClientHost, ServerHost};
pub use error::{ErrorSeverity, GameError};
pub use state::{ActionId, EntityId, Faction, InstanceId, LifeState, ReplicatedActorState};
