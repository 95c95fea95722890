//! Collaborator traits at the engine boundary.
//!
//! The engine never owns world state. Positions, movement, animation, physics,
//! projectiles, damage, and visual effects all belong to the host; these traits
//! are the narrow capability surface the engine calls through. Every query
//! re-resolves by id, so a despawned entity is an ordinary `None`.
mod actions;
mod animation;
mod damage;
mod effects;
mod movement;
mod physics;
mod projectile;
mod registry;
mod rng;

pub use actions::ActionOracle;
pub use animation::AnimationDriver;
pub use damage::{Damageable, SpecialDamageFlags};
pub use effects::{EffectAnchor, EffectHandle, EffectSpawner};
pub use movement::MovementDriver;
pub use physics::{LineOfSight, PhysicsQueries};
pub use projectile::{ProjectileHandle, ProjectileLaunch, ProjectileSpawner};
pub use registry::{EntityInfo, EntityRegistry};
pub use rng::{PcgRng, RngOracle, compute_seed};

/// Everything an authoritative instance may call.
pub trait ServerHost:
    EntityRegistry + MovementDriver + AnimationDriver + PhysicsQueries + ProjectileSpawner + Damageable
{
}

impl<T> ServerHost for T where
    T: EntityRegistry
        + MovementDriver
        + AnimationDriver
        + PhysicsQueries
        + ProjectileSpawner
        + Damageable
{
}

/// Everything a visualization instance may call.
pub trait ClientHost: EntityRegistry + AnimationDriver + EffectSpawner {}

impl<T> ClientHost for T where T: EntityRegistry + AnimationDriver + EffectSpawner {}
