//! Collaborator adapter handed to authoritative players.
//!
//! Routes damage between actors: the victim's buffs scale the hit, and the
//! resulting gameplay activity is queued for the session to deliver once the
//! acting player's hook has returned.

use std::collections::BTreeMap;

use glam::Vec3;

use action_core::action::{BuffableValue, GameplayActivity};
use action_core::env::{
    AnimationDriver, Damageable, EntityInfo, EntityRegistry, LineOfSight, MovementDriver,
    PhysicsQueries, ProjectileHandle, ProjectileLaunch, ProjectileSpawner, SpecialDamageFlags,
};
use action_core::{AuthoritativeActionPlayer, EntityId, Faction};

use crate::world::WorldBackend;

/// Every buffable scalar, for snapshotting a player that is checked out.
pub(super) const BUFFABLE: [BuffableValue; 3] = [
    BuffableValue::PercentHealingReceived,
    BuffableValue::PercentDamageReceived,
    BuffableValue::ChanceToStunTramplers,
];

/// Follow-up work produced while a player's hook ran.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum SessionEvent {
    Activity(EntityId, GameplayActivity),
    Incapacitated(EntityId),
}

/// Buff values of the player currently checked out of the session.
pub(super) type OwnBuffs = (EntityId, [f32; BUFFABLE.len()]);

pub(super) fn own_buffs(player: &AuthoritativeActionPlayer) -> OwnBuffs {
    (player.actor(), BUFFABLE.map(|kind| player.get_buffed_value(kind)))
}

pub(super) struct SessionHost<'a, W: WorldBackend> {
    pub world: &'a mut W,
    /// Players other than the one being driven.
    pub players: &'a BTreeMap<EntityId, AuthoritativeActionPlayer>,
    pub own: Option<OwnBuffs>,
    pub events: &'a mut Vec<SessionEvent>,
}

impl<W: WorldBackend> SessionHost<'_, W> {
    fn actor_buff(&self, target: EntityId, kind: BuffableValue) -> Option<f32> {
        if let Some((actor, values)) = &self.own
            && *actor == target
        {
            return BUFFABLE
                .iter()
                .position(|k| *k == kind)
                .map(|index| values[index]);
        }
        self.players
            .get(&target)
            .map(|player| player.get_buffed_value(kind))
    }
}

impl<W: WorldBackend> Damageable for SessionHost<'_, W> {
    fn receive_hp(&mut self, inflicter: EntityId, target: EntityId, delta: f32) {
        let Some(before) = self.world.resolve(target) else {
            tracing::debug!(target: "runtime::session", %inflicter, %target, "hp change for missing entity");
            return;
        };
        let kind = if delta < 0.0 {
            BuffableValue::PercentDamageReceived
        } else {
            BuffableValue::PercentHealingReceived
        };
        let scaled = delta * self.buffed_value(target, kind);
        let after = self.world.apply_hp(target, scaled);

        if delta < 0.0 {
            self.events
                .push(SessionEvent::Activity(target, GameplayActivity::AttackedByEnemy));
            if inflicter != target {
                self.events
                    .push(SessionEvent::Activity(inflicter, GameplayActivity::UsingAttackAction));
            }
        } else if delta > 0.0 {
            self.events
                .push(SessionEvent::Activity(target, GameplayActivity::Healed));
        }

        if before.life_state.is_alive() && after.is_some_and(|state| !state.is_alive()) {
            self.events.push(SessionEvent::Incapacitated(target));
        }
    }

    fn special_damage_flags(&self, target: EntityId) -> SpecialDamageFlags {
        self.world.special_damage_flags(target)
    }

    fn buffed_value(&self, target: EntityId, kind: BuffableValue) -> f32 {
        let base = self.world.base_buff(target, kind);
        match self.actor_buff(target, kind) {
            Some(value) => kind.combine(base, value),
            None => base,
        }
    }

    fn revive(&mut self, reviver: EntityId, target: EntityId, hp: f32) {
        tracing::debug!(target: "runtime::session", %reviver, %target, hp, "revive");
        self.world.revive(target, hp);
        self.events
            .push(SessionEvent::Activity(target, GameplayActivity::Healed));
    }
}

// ============================================================================
// Delegation to the world
// ============================================================================

impl<W: WorldBackend> EntityRegistry for SessionHost<'_, W> {
    fn resolve(&self, id: EntityId) -> Option<EntityInfo> {
        self.world.resolve(id)
    }
}

impl<W: WorldBackend> MovementDriver for SessionHost<'_, W> {
    fn set_movement_target(&mut self, actor: EntityId, position: Vec3) {
        self.world.set_movement_target(actor, position);
    }

    fn follow_entity(&mut self, actor: EntityId, target: EntityId) {
        self.world.follow_entity(actor, target);
    }

    fn teleport(&mut self, actor: EntityId, position: Vec3) {
        self.world.teleport(actor, position);
    }

    fn start_forward_charge(&mut self, actor: EntityId, speed: f32, duration: f32) {
        self.world.start_forward_charge(actor, speed, duration);
    }

    fn start_knockback(&mut self, victim: EntityId, origin: Vec3, speed: f32, duration: f32) {
        self.world.start_knockback(victim, origin, speed, duration);
    }

    fn cancel_move(&mut self, actor: EntityId) {
        self.world.cancel_move(actor);
    }

    fn is_performing_forced_movement(&self, actor: EntityId) -> bool {
        self.world.is_performing_forced_movement(actor)
    }

    fn is_moving(&self, actor: EntityId) -> bool {
        self.world.is_moving(actor)
    }

    fn set_facing(&mut self, actor: EntityId, direction: Vec3) {
        self.world.set_facing(actor, direction);
    }
}

impl<W: WorldBackend> AnimationDriver for SessionHost<'_, W> {
    fn set_trigger(&mut self, entity: EntityId, trigger: &str) {
        self.world.set_trigger(entity, trigger);
    }

    fn reset_trigger(&mut self, entity: EntityId, trigger: &str) {
        self.world.reset_trigger(entity, trigger);
    }
}

impl<W: WorldBackend> PhysicsQueries for SessionHost<'_, W> {
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> LineOfSight {
        self.world.line_of_sight(from, to)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, faction: Option<Faction>) -> Vec<EntityId> {
        self.world.overlap_sphere(center, radius, faction)
    }

    fn raycast_carryable(&self, origin: Vec3, direction: Vec3, distance: f32) -> Option<EntityId> {
        self.world.raycast_carryable(origin, direction, distance)
    }

    fn try_attach(&mut self, carrier: EntityId, object: EntityId) -> bool {
        self.world.try_attach(carrier, object)
    }

    fn detach(&mut self, carrier: EntityId, object: EntityId) {
        self.world.detach(carrier, object);
    }
}

impl<W: WorldBackend> ProjectileSpawner for SessionHost<'_, W> {
    fn spawn_projectile(&mut self, launch: ProjectileLaunch) -> ProjectileHandle {
        self.world.spawn_projectile(launch)
    }
}
