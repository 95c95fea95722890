//! In-memory world used by tests and the harness.
//!
//! Movement is straight-line at a fixed speed, obstacles are spheres, and
//! projectiles fly in a straight line until they run out of range or
//! victims. Good enough to drive every action variant end to end.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use glam::Vec3;

use action_core::action::{EffectDescriptor, ProjectileInfo};
use action_core::env::{
    AnimationDriver, EffectAnchor, EffectHandle, EffectSpawner, EntityInfo, EntityRegistry,
    LineOfSight, MovementDriver, PhysicsQueries, ProjectileHandle, ProjectileLaunch,
    ProjectileSpawner, SpecialDamageFlags,
};
use action_core::{EntityId, Faction, LifeState};

use super::{WorldBackend, WorldEvent};

const LOG_TARGET: &str = "runtime::sandbox";

/// Walking speed in meters per second.
const WALK_SPEED: f32 = 5.0;
/// Distance at which two bodies touch.
const TOUCH_DISTANCE: f32 = 1.0;
/// Radius of a projectile's hit test.
const PROJECTILE_RADIUS: f32 = 0.5;
/// Lateral tolerance of the carryable raycast.
const PICK_UP_TOLERANCE: f32 = 0.75;

#[derive(Clone, Debug)]
pub struct SandboxEntity {
    pub info: EntityInfo,
    pub hp: f32,
    pub max_hp: f32,
    pub flags: SpecialDamageFlags,
    pub carryable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Locomotion {
    Walk(Vec3),
    Follow(EntityId),
    Charge { speed: f32, remaining: f32 },
    Knockback { direction: Vec3, speed: f32, remaining: f32 },
}

impl Locomotion {
    fn is_forced(self) -> bool {
        matches!(self, Self::Charge { .. } | Self::Knockback { .. })
    }
}

#[derive(Clone, Debug)]
struct Flight {
    owner: EntityId,
    info: ProjectileInfo,
    position: Vec3,
    direction: Vec3,
    travelled: f32,
    hit: HashSet<EntityId>,
}

#[derive(Clone, Debug, Default)]
pub struct SandboxWorld {
    entities: BTreeMap<EntityId, SandboxEntity>,
    locomotion: HashMap<EntityId, Locomotion>,
    /// Carried object to carrier.
    carried: HashMap<EntityId, EntityId>,
    obstacles: Vec<(Vec3, f32)>,
    flights: BTreeMap<u64, Flight>,
    effects: BTreeMap<u64, String>,
    triggers: Vec<(EntityId, String)>,
    touching: BTreeSet<(EntityId, EntityId)>,
    next_handle: u64,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Adds a character facing +X.
    pub fn spawn_character(&mut self, id: EntityId, faction: Faction, position: Vec3, hp: f32) {
        self.insert(id, faction, position, hp, false);
    }

    /// Adds a neutral object.
    pub fn spawn_object(&mut self, id: EntityId, position: Vec3, carryable: bool) {
        self.insert(id, Faction::Neutral, position, 1.0, carryable);
    }

    fn insert(&mut self, id: EntityId, faction: Faction, position: Vec3, hp: f32, carryable: bool) {
        self.entities.insert(
            id,
            SandboxEntity {
                info: EntityInfo {
                    id,
                    position,
                    forward: Vec3::X,
                    faction,
                    life_state: LifeState::Alive,
                },
                hp,
                max_hp: hp,
                flags: SpecialDamageFlags::empty(),
                carryable,
            },
        );
    }

    pub fn despawn(&mut self, id: EntityId) {
        self.entities.remove(&id);
        self.locomotion.remove(&id);
        self.carried.retain(|object, carrier| *object != id && *carrier != id);
    }

    pub fn set_flags(&mut self, id: EntityId, flags: SpecialDamageFlags) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.flags = flags;
        }
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec3) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.info.position = position;
        }
    }

    /// Adds a spherical obstacle that blocks line of sight.
    pub fn add_obstacle(&mut self, center: Vec3, radius: f32) {
        self.obstacles.push((center, radius));
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn entity(&self, id: EntityId) -> Option<&SandboxEntity> {
        self.entities.get(&id)
    }

    pub fn hp(&self, id: EntityId) -> Option<f32> {
        self.entities.get(&id).map(|entity| entity.hp)
    }

    pub fn carrier_of(&self, object: EntityId) -> Option<EntityId> {
        self.carried.get(&object).copied()
    }

    pub fn projectiles_in_flight(&self) -> usize {
        self.flights.len()
    }

    /// Names of the effects currently alive, in spawn order.
    pub fn live_effects(&self) -> Vec<&str> {
        self.effects.values().map(String::as_str).collect()
    }

    /// Takes the animation triggers fired since the last call.
    pub fn take_triggers(&mut self) -> Vec<(EntityId, String)> {
        std::mem::take(&mut self.triggers)
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    fn step_locomotion(&mut self, dt: f32) {
        let moving: Vec<_> = self.locomotion.iter().map(|(id, l)| (*id, *l)).collect();
        for (id, locomotion) in moving {
            let Some(position) = self.entities.get(&id).map(|e| e.info.position) else {
                self.locomotion.remove(&id);
                continue;
            };
            let forward = self.entities.get(&id).map_or(Vec3::X, |e| e.info.forward);

            let (next, remaining) = match locomotion {
                Locomotion::Walk(goal) => {
                    let next = approach(position, goal, WALK_SPEED * dt);
                    (next, (next != goal).then_some(locomotion))
                }
                Locomotion::Follow(target) => match self.resolve(target) {
                    Some(target) => (approach(position, target.position, WALK_SPEED * dt), Some(locomotion)),
                    None => (position, None),
                },
                Locomotion::Charge { speed, remaining } => {
                    let step = dt.min(remaining);
                    let left = remaining - step;
                    (
                        position + forward * speed * step,
                        (left > 0.0).then_some(Locomotion::Charge { speed, remaining: left }),
                    )
                }
                Locomotion::Knockback { direction, speed, remaining } => {
                    let step = dt.min(remaining);
                    let left = remaining - step;
                    (
                        position + direction * speed * step,
                        (left > 0.0).then_some(Locomotion::Knockback {
                            direction,
                            speed,
                            remaining: left,
                        }),
                    )
                }
            };

            self.set_position(id, next);
            match remaining {
                Some(locomotion) => {
                    self.locomotion.insert(id, locomotion);
                }
                None => {
                    self.locomotion.remove(&id);
                }
            }
        }

        let carried: Vec<_> = self.carried.iter().map(|(o, c)| (*o, *c)).collect();
        for (object, carrier) in carried {
            if let Some(position) = self.entities.get(&carrier).map(|e| e.info.position) {
                self.set_position(object, position + Vec3::Y * 2.0);
            }
        }
    }

    /// Contacts begin only for moving bodies, once per touching pair.
    fn detect_contacts(&mut self, events: &mut Vec<WorldEvent>) {
        let mut now_touching = BTreeSet::new();
        for id in self.locomotion.keys() {
            let Some(mover) = self.entities.get(id) else { continue };
            for other in self.entities.values() {
                if other.info.id == *id || self.carried.contains_key(&other.info.id) {
                    continue;
                }
                if mover.info.position.distance(other.info.position) <= TOUCH_DISTANCE {
                    now_touching.insert((*id, other.info.id));
                }
            }
        }
        for &(entity, other) in now_touching.difference(&self.touching) {
            events.push(WorldEvent::Contact { entity, other });
        }
        self.touching = now_touching;
    }

    fn step_projectiles(&mut self, dt: f32, events: &mut Vec<WorldEvent>) {
        let mut finished = Vec::new();
        for (handle, flight) in &mut self.flights {
            let travel = flight.info.speed * dt;
            flight.position += flight.direction * travel;
            flight.travelled += travel;

            for entity in self.entities.values() {
                let id = entity.info.id;
                if id == flight.owner
                    || flight.hit.contains(&id)
                    || !entity.info.faction.is_character()
                    || entity.info.position.distance(flight.position) > PROJECTILE_RADIUS + TOUCH_DISTANCE
                {
                    continue;
                }
                flight.hit.insert(id);
                if flight.info.damage > 0.0 {
                    events.push(WorldEvent::ProjectileHit {
                        owner: flight.owner,
                        victim: id,
                        damage: flight.info.damage,
                    });
                }
                if flight.hit.len() >= usize::from(flight.info.max_victims.max(1)) {
                    break;
                }
            }

            if flight.travelled >= flight.info.range
                || flight.hit.len() >= usize::from(flight.info.max_victims.max(1))
            {
                finished.push(*handle);
            }
        }
        for handle in finished {
            self.flights.remove(&handle);
        }
    }
}

fn approach(from: Vec3, to: Vec3, max_step: f32) -> Vec3 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_step {
        to
    } else {
        from + offset / distance * max_step
    }
}

impl WorldBackend for SandboxWorld {
    fn apply_hp(&mut self, target: EntityId, delta: f32) -> Option<LifeState> {
        let entity = self.entities.get_mut(&target)?;
        if !entity.info.life_state.is_alive() {
            return Some(entity.info.life_state);
        }
        entity.hp = (entity.hp + delta).clamp(0.0, entity.max_hp);
        if entity.hp <= 0.0 {
            entity.info.life_state = if entity.info.faction.is_character() {
                LifeState::Fainted
            } else {
                LifeState::Dead
            };
            tracing::debug!(target: LOG_TARGET, entity = %target, state = ?entity.info.life_state, "hp exhausted");
        }
        Some(entity.info.life_state)
    }

    fn special_damage_flags(&self, target: EntityId) -> SpecialDamageFlags {
        self.entities
            .get(&target)
            .map(|entity| entity.flags)
            .unwrap_or_default()
    }

    fn revive(&mut self, target: EntityId, hp: f32) {
        if let Some(entity) = self.entities.get_mut(&target)
            && entity.info.life_state == LifeState::Fainted
        {
            entity.info.life_state = LifeState::Alive;
            entity.hp = hp.min(entity.max_hp);
        }
    }

    fn step(&mut self, dt: f32) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        self.step_locomotion(dt);
        self.detect_contacts(&mut events);
        self.step_projectiles(dt, &mut events);
        events
    }
}

impl EntityRegistry for SandboxWorld {
    fn resolve(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities.get(&id).map(|entity| entity.info)
    }
}

impl MovementDriver for SandboxWorld {
    fn set_movement_target(&mut self, actor: EntityId, position: Vec3) {
        self.locomotion.insert(actor, Locomotion::Walk(position));
    }

    fn follow_entity(&mut self, actor: EntityId, target: EntityId) {
        self.locomotion.insert(actor, Locomotion::Follow(target));
    }

    fn teleport(&mut self, actor: EntityId, position: Vec3) {
        self.locomotion.remove(&actor);
        self.set_position(actor, position);
    }

    fn start_forward_charge(&mut self, actor: EntityId, speed: f32, duration: f32) {
        self.locomotion.insert(
            actor,
            Locomotion::Charge {
                speed,
                remaining: duration,
            },
        );
    }

    fn start_knockback(&mut self, victim: EntityId, origin: Vec3, speed: f32, duration: f32) {
        let Some(position) = self.entities.get(&victim).map(|e| e.info.position) else {
            return;
        };
        let direction = (position - origin).with_y(0.0).try_normalize().unwrap_or(Vec3::X);
        self.locomotion.insert(
            victim,
            Locomotion::Knockback {
                direction,
                speed,
                remaining: duration,
            },
        );
    }

    fn cancel_move(&mut self, actor: EntityId) {
        if self.locomotion.get(&actor).is_some_and(|l| !l.is_forced()) {
            self.locomotion.remove(&actor);
        }
    }

    fn is_performing_forced_movement(&self, actor: EntityId) -> bool {
        self.locomotion.get(&actor).is_some_and(|l| l.is_forced())
    }

    fn is_moving(&self, actor: EntityId) -> bool {
        self.locomotion.contains_key(&actor)
    }

    fn set_facing(&mut self, actor: EntityId, direction: Vec3) {
        if let Some(entity) = self.entities.get_mut(&actor) {
            entity.info.forward = direction;
        }
    }
}

impl AnimationDriver for SandboxWorld {
    fn set_trigger(&mut self, entity: EntityId, trigger: &str) {
        self.triggers.push((entity, trigger.to_owned()));
    }

    fn reset_trigger(&mut self, _entity: EntityId, _trigger: &str) {}
}

impl PhysicsQueries for SandboxWorld {
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> LineOfSight {
        let segment = to - from;
        let length_squared = segment.length_squared();
        let mut nearest: Option<(f32, Vec3)> = None;
        for &(center, radius) in &self.obstacles {
            let t = if length_squared > 0.0 {
                ((center - from).dot(segment) / length_squared).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = from + segment * t;
            if closest.distance(center) < radius && nearest.is_none_or(|(best, _)| t < best) {
                nearest = Some((t, closest));
            }
        }
        match nearest {
            Some((_, point)) => LineOfSight::Blocked(point),
            None => LineOfSight::Clear,
        }
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, faction: Option<Faction>) -> Vec<EntityId> {
        let mut hits: Vec<(f32, EntityId)> = self
            .entities
            .values()
            .filter(|entity| faction.is_none_or(|f| entity.info.faction == f))
            .filter(|entity| !self.carried.contains_key(&entity.info.id))
            .map(|entity| (entity.info.position.distance(center), entity.info.id))
            .filter(|(distance, _)| *distance <= radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    fn raycast_carryable(&self, origin: Vec3, direction: Vec3, distance: f32) -> Option<EntityId> {
        let direction = direction.try_normalize()?;
        self.entities
            .values()
            .filter(|entity| entity.carryable && !self.carried.contains_key(&entity.info.id))
            .filter_map(|entity| {
                let offset = entity.info.position - origin;
                let along = offset.dot(direction);
                let lateral = (offset - direction * along).length();
                (along >= 0.0 && along <= distance && lateral <= PICK_UP_TOLERANCE)
                    .then_some((along, entity.info.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    fn try_attach(&mut self, carrier: EntityId, object: EntityId) -> bool {
        let attachable = self
            .entities
            .get(&object)
            .is_some_and(|entity| entity.carryable)
            && !self.carried.contains_key(&object);
        if attachable {
            self.carried.insert(object, carrier);
        }
        attachable
    }

    fn detach(&mut self, carrier: EntityId, object: EntityId) {
        if self.carried.get(&object) == Some(&carrier) {
            self.carried.remove(&object);
            if let Some(info) = self.resolve(carrier) {
                self.set_position(object, info.position + info.forward);
            }
        }
    }
}

impl ProjectileSpawner for SandboxWorld {
    fn spawn_projectile(&mut self, launch: ProjectileLaunch) -> ProjectileHandle {
        let handle = self.next_handle();
        let direction = launch
            .direction
            .try_normalize()
            .or_else(|| launch.impulse.try_normalize())
            .unwrap_or(Vec3::X);
        self.flights.insert(
            handle,
            Flight {
                owner: launch.owner,
                info: launch.info,
                position: launch.origin,
                direction,
                travelled: 0.0,
                hit: HashSet::new(),
            },
        );
        ProjectileHandle(handle)
    }
}

impl EffectSpawner for SandboxWorld {
    fn spawn_effect(&mut self, effect: &EffectDescriptor, _anchor: EffectAnchor) -> EffectHandle {
        let handle = self.next_handle();
        self.effects.insert(handle, effect.name.clone());
        EffectHandle(handle)
    }

    fn launch_fx_projectile(
        &mut self,
        info: &ProjectileInfo,
        _from: Vec3,
        _to: Vec3,
        _flight_time: f32,
    ) -> EffectHandle {
        let handle = self.next_handle();
        self.effects.insert(handle, info.name.clone());
        EffectHandle(handle)
    }

    fn shutdown(&mut self, handle: EffectHandle) {
        self.effects.remove(&handle.0);
    }
}
