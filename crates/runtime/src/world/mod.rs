//! World backends the server session runs against.
//!
//! The engine's collaborator traits describe what an action may ask of the
//! world. A [`WorldBackend`] adds what the session itself needs: hit point
//! bookkeeping and a physics step that reports contacts and projectile hits.
mod sandbox;

pub use sandbox::{SandboxEntity, SandboxWorld};

use action_core::action::BuffableValue;
use action_core::env::{
    AnimationDriver, EntityRegistry, MovementDriver, PhysicsQueries, ProjectileSpawner,
    SpecialDamageFlags,
};
use action_core::{EntityId, LifeState};

/// Something the world's physics produced during one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldEvent {
    /// `entity` started touching `other`.
    Contact { entity: EntityId, other: EntityId },
    /// A physical projectile reached a victim.
    ProjectileHit {
        owner: EntityId,
        victim: EntityId,
        damage: f32,
    },
}

/// Everything the server session needs from the simulated world.
pub trait WorldBackend:
    EntityRegistry + MovementDriver + AnimationDriver + PhysicsQueries + ProjectileSpawner + Send
{
    /// Applies `delta` hit points to `target` and reports its life state
    /// afterwards, or `None` if it does not exist.
    fn apply_hp(&mut self, target: EntityId, delta: f32) -> Option<LifeState>;

    fn special_damage_flags(&self, target: EntityId) -> SpecialDamageFlags;

    fn revive(&mut self, target: EntityId, hp: f32);

    /// Buff contributed by the world itself, before any running action.
    fn base_buff(&self, _target: EntityId, kind: BuffableValue) -> f32 {
        kind.unbuffed()
    }

    /// Advances movement and physics by `dt` seconds.
    fn step(&mut self, _dt: f32) -> Vec<WorldEvent> {
        Vec::new()
    }
}
