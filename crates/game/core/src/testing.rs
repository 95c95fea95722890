//! In-memory host and catalog for unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use glam::Vec3;

use crate::action::{ActionConfig, BuffableValue, EffectDescriptor, ProjectileInfo};
use crate::env::{
    AnimationDriver, Damageable, EffectAnchor, EffectHandle, EffectSpawner, EntityInfo,
    EntityRegistry, LineOfSight, MovementDriver, PhysicsQueries, ProjectileHandle,
    ProjectileLaunch, ProjectileSpawner, SpecialDamageFlags,
};
use crate::state::{ActionId, EntityId, Faction, LifeState};

pub fn catalog(configs: impl IntoIterator<Item = ActionConfig>) -> Arc<HashMap<ActionId, Arc<ActionConfig>>> {
    Arc::new(
        configs
            .into_iter()
            .map(|config| (config.id, Arc::new(config)))
            .collect(),
    )
}

#[derive(Debug)]
pub struct MockEntity {
    pub info: EntityInfo,
    pub flags: SpecialDamageFlags,
    pub buffs: HashMap<BuffableValue, f32>,
}

#[derive(Debug, Default)]
pub struct MockHost {
    pub entities: BTreeMap<EntityId, MockEntity>,
    pub forced: HashSet<EntityId>,
    pub moving: HashSet<EntityId>,
    /// Point where line of sight is cut, if any.
    pub obstruction: Option<Vec3>,
    pub carryable: Option<EntityId>,

    pub hp_changes: Vec<(EntityId, EntityId, f32)>,
    pub revives: Vec<(EntityId, EntityId, f32)>,
    pub triggers: Vec<(EntityId, String)>,
    pub follows: Vec<(EntityId, EntityId)>,
    pub move_targets: Vec<(EntityId, Vec3)>,
    pub move_cancels: Vec<EntityId>,
    pub teleports: Vec<(EntityId, Vec3)>,
    pub charges: Vec<(EntityId, f32, f32)>,
    pub knockbacks: Vec<EntityId>,
    pub projectiles: Vec<ProjectileLaunch>,
    pub attached: Vec<(EntityId, EntityId)>,
    pub detached: Vec<(EntityId, EntityId)>,
    pub effects: Vec<(EffectHandle, String, EffectAnchor)>,
    pub fx_launches: Vec<(EffectHandle, f32)>,
    pub shutdowns: Vec<EffectHandle>,
    next_handle: u64,
}

impl MockHost {
    pub fn spawn(&mut self, id: u32, faction: Faction, position: Vec3) -> EntityId {
        let id = EntityId(id);
        self.entities.insert(
            id,
            MockEntity {
                info: EntityInfo {
                    id,
                    position,
                    forward: Vec3::X,
                    faction,
                    life_state: LifeState::Alive,
                },
                flags: SpecialDamageFlags::empty(),
                buffs: HashMap::new(),
            },
        );
        id
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut MockEntity {
        self.entities.get_mut(&id).expect("entity spawned in test")
    }

    pub fn despawn(&mut self, id: EntityId) {
        self.entities.remove(&id);
    }

    pub fn damage_to(&self, target: EntityId) -> f32 {
        self.hp_changes
            .iter()
            .filter(|(_, victim, _)| *victim == target)
            .map(|(_, _, delta)| -delta)
            .sum()
    }

    pub fn fired(&self, entity: EntityId, trigger: &str) -> bool {
        self.triggers
            .iter()
            .any(|(e, name)| *e == entity && name == trigger)
    }

    pub fn live_effects(&self) -> usize {
        self.effects
            .iter()
            .map(|(handle, _, _)| *handle)
            .chain(self.fx_launches.iter().map(|(handle, _)| *handle))
            .filter(|handle| !self.shutdowns.contains(handle))
            .count()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl EntityRegistry for MockHost {
    fn resolve(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities.get(&id).map(|entity| entity.info)
    }
}

impl MovementDriver for MockHost {
    fn set_movement_target(&mut self, actor: EntityId, position: Vec3) {
        self.moving.insert(actor);
        self.move_targets.push((actor, position));
    }

    fn follow_entity(&mut self, actor: EntityId, target: EntityId) {
        self.moving.insert(actor);
        self.follows.push((actor, target));
    }

    fn teleport(&mut self, actor: EntityId, position: Vec3) {
        if let Some(entity) = self.entities.get_mut(&actor) {
            entity.info.position = position;
        }
        self.teleports.push((actor, position));
    }

    fn start_forward_charge(&mut self, actor: EntityId, speed: f32, duration: f32) {
        self.charges.push((actor, speed, duration));
    }

    fn start_knockback(&mut self, victim: EntityId, _origin: Vec3, _speed: f32, _duration: f32) {
        self.knockbacks.push(victim);
    }

    fn cancel_move(&mut self, actor: EntityId) {
        self.moving.remove(&actor);
        self.move_cancels.push(actor);
    }

    fn is_performing_forced_movement(&self, actor: EntityId) -> bool {
        self.forced.contains(&actor)
    }

    fn is_moving(&self, actor: EntityId) -> bool {
        self.moving.contains(&actor)
    }

    fn set_facing(&mut self, actor: EntityId, direction: Vec3) {
        if let Some(entity) = self.entities.get_mut(&actor) {
            entity.info.forward = direction;
        }
    }
}

impl AnimationDriver for MockHost {
    fn set_trigger(&mut self, entity: EntityId, trigger: &str) {
        self.triggers.push((entity, trigger.to_owned()));
    }

    fn reset_trigger(&mut self, _entity: EntityId, _trigger: &str) {}
}

impl PhysicsQueries for MockHost {
    fn line_of_sight(&self, _from: Vec3, _to: Vec3) -> LineOfSight {
        match self.obstruction {
            Some(point) => LineOfSight::Blocked(point),
            None => LineOfSight::Clear,
        }
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, faction: Option<Faction>) -> Vec<EntityId> {
        let mut hits: Vec<(f32, EntityId)> = self
            .entities
            .values()
            .filter(|entity| faction.is_none_or(|f| entity.info.faction == f))
            .map(|entity| (entity.info.position.distance(center), entity.info.id))
            .filter(|(distance, _)| *distance <= radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    fn raycast_carryable(&self, _origin: Vec3, _direction: Vec3, _distance: f32) -> Option<EntityId> {
        self.carryable
    }

    fn try_attach(&mut self, carrier: EntityId, object: EntityId) -> bool {
        self.attached.push((carrier, object));
        true
    }

    fn detach(&mut self, carrier: EntityId, object: EntityId) {
        self.detached.push((carrier, object));
    }
}

impl ProjectileSpawner for MockHost {
    fn spawn_projectile(&mut self, launch: ProjectileLaunch) -> ProjectileHandle {
        self.projectiles.push(launch);
        ProjectileHandle(self.next_handle())
    }
}

impl Damageable for MockHost {
    fn receive_hp(&mut self, inflicter: EntityId, target: EntityId, delta: f32) {
        self.hp_changes.push((inflicter, target, delta));
    }

    fn special_damage_flags(&self, target: EntityId) -> SpecialDamageFlags {
        self.entities
            .get(&target)
            .map(|entity| entity.flags)
            .unwrap_or_default()
    }

    fn buffed_value(&self, target: EntityId, kind: BuffableValue) -> f32 {
        self.entities
            .get(&target)
            .and_then(|entity| entity.buffs.get(&kind).copied())
            .unwrap_or(kind.unbuffed())
    }

    fn revive(&mut self, reviver: EntityId, target: EntityId, hp: f32) {
        if let Some(entity) = self.entities.get_mut(&target) {
            entity.info.life_state = LifeState::Alive;
        }
        self.revives.push((reviver, target, hp));
    }
}

impl EffectSpawner for MockHost {
    fn spawn_effect(&mut self, effect: &EffectDescriptor, anchor: EffectAnchor) -> EffectHandle {
        let handle = EffectHandle(self.next_handle());
        self.effects.push((handle, effect.name.clone(), anchor));
        handle
    }

    fn launch_fx_projectile(
        &mut self,
        _info: &ProjectileInfo,
        _from: Vec3,
        _to: Vec3,
        flight_time: f32,
    ) -> EffectHandle {
        let handle = EffectHandle(self.next_handle());
        self.fx_launches.push((handle, flight_time));
        handle
    }

    fn shutdown(&mut self, handle: EffectHandle) {
        self.shutdowns.push(handle);
    }
}
