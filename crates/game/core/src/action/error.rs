//! Action execution errors.
//!
//! `ActionError` is raised by a single instance and never outlives it.
//! `PlayError` is the player's policy verdict on a request.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActionId, EntityId};

// ============================================================================
// Instance Errors
// ============================================================================

/// Errors raised by a variant while starting or running an instance.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The acting entity itself no longer resolves.
    #[error("Actor {0} not found")]
    ActorNotFound(EntityId),

    /// The request carries no target but the variant needs one.
    #[error("Request has no target")]
    TargetMissing,

    /// The requested target no longer resolves.
    #[error("Target {0} not found")]
    TargetNotFound(EntityId),

    /// The target resolves but cannot be affected by this action.
    #[error("Target {0} is not a valid target")]
    InvalidTarget(EntityId),

    /// The requested point is farther than the action allows.
    #[error("Requested position is out of range")]
    OutOfRange,

    /// Carry/drop requested while the hands are in the wrong state.
    #[error("Nothing to carry")]
    NothingToCarry,

    /// Pick-up requested while already carrying something.
    #[error("Already carrying {0}")]
    AlreadyCarrying(EntityId),

    /// The action's config lists no projectile of the kind it launches.
    #[error("Action {action} has no usable projectile")]
    MissingProjectile { action: ActionId },

    /// A projectile entry exists but cannot be flown (non-positive speed).
    #[error("Action {action} has a misconfigured projectile")]
    ProjectileMisconfigured { action: ActionId },
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            ActorNotFound(_) | TargetNotFound(_) => ErrorSeverity::Recoverable,
            NothingToCarry | AlreadyCarrying(_) => ErrorSeverity::Recoverable,
            TargetMissing | InvalidTarget(_) | OutOfRange => ErrorSeverity::Validation,
            MissingProjectile { .. } | ProjectileMisconfigured { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            TargetMissing => "ACTION_TARGET_MISSING",
            TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            InvalidTarget(_) => "ACTION_INVALID_TARGET",
            OutOfRange => "ACTION_OUT_OF_RANGE",
            NothingToCarry => "ACTION_NOTHING_TO_CARRY",
            AlreadyCarrying(_) => "ACTION_ALREADY_CARRYING",
            MissingProjectile { .. } => "ACTION_MISSING_PROJECTILE",
            ProjectileMisconfigured { .. } => "ACTION_PROJECTILE_MISCONFIGURED",
        }
    }
}

// ============================================================================
// Play Errors
// ============================================================================

/// Reasons a player refuses or fails to run a request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    /// The actor is not alive.
    #[error("Actor {0} is incapacitated")]
    ActorIncapacitated(EntityId),

    /// The actor is being moved by an uninterruptible force.
    #[error("Actor {0} is performing forced movement")]
    ForcedMovement(EntityId),

    /// The catalog has no config for this id.
    #[error("Unknown action {0}")]
    UnknownAction(ActionId),

    /// A non-interruptible blocking instance holds the slot and the request
    /// did not ask to queue.
    #[error("Blocking slot occupied; request for {0} dropped")]
    SlotOccupied(ActionId),

    /// Queueing would exceed the configured queue time depth.
    #[error("Queue is full; request for {0} dropped")]
    QueueDepthExceeded(ActionId),

    /// The action's reuse time has not elapsed since its last start.
    #[error("Action {0} is on cooldown")]
    OnCooldown(ActionId),

    /// The variant refused to start.
    #[error("Action {action} failed to start: {source}")]
    StartFailed {
        action: ActionId,
        #[source]
        source: ActionError,
    },
}

impl GameError for PlayError {
    fn severity(&self) -> ErrorSeverity {
        use PlayError::*;
        match self {
            ActorIncapacitated(_) | ForcedMovement(_) => ErrorSeverity::Recoverable,
            SlotOccupied(_) | QueueDepthExceeded(_) | OnCooldown(_) => ErrorSeverity::Recoverable,
            UnknownAction(_) => ErrorSeverity::Validation,
            StartFailed { source, .. } => source.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use PlayError::*;
        match self {
            ActorIncapacitated(_) => "PLAY_ACTOR_INCAPACITATED",
            ForcedMovement(_) => "PLAY_FORCED_MOVEMENT",
            UnknownAction(_) => "PLAY_UNKNOWN_ACTION",
            SlotOccupied(_) => "PLAY_SLOT_OCCUPIED",
            QueueDepthExceeded(_) => "PLAY_QUEUE_DEPTH_EXCEEDED",
            OnCooldown(_) => "PLAY_ON_COOLDOWN",
            StartFailed { .. } => "PLAY_START_FAILED",
        }
    }
}
