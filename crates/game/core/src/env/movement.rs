use glam::Vec3;

use crate::state::EntityId;

/// Movement and navigation collaborator.
pub trait MovementDriver {
    fn set_movement_target(&mut self, actor: EntityId, position: Vec3);

    /// Keeps walking toward `target` until told otherwise.
    fn follow_entity(&mut self, actor: EntityId, target: EntityId);

    fn teleport(&mut self, actor: EntityId, position: Vec3);

    /// Uncontrolled run along the current facing.
    fn start_forward_charge(&mut self, actor: EntityId, speed: f32, duration: f32);

    /// Pushes `victim` away from `origin`.
    fn start_knockback(&mut self, victim: EntityId, origin: Vec3, speed: f32, duration: f32);

    fn cancel_move(&mut self, actor: EntityId);

    /// True while a charge or knockback is moving the actor.
    fn is_performing_forced_movement(&self, actor: EntityId) -> bool;

    fn is_moving(&self, actor: EntityId) -> bool;

    fn set_facing(&mut self, actor: EntityId, direction: Vec3);
}
