use glam::Vec3;

use crate::state::{EntityId, Faction, LifeState};

/// Snapshot of an entity at the moment it was resolved.
///
/// Never cache one across ticks; resolve again instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub position: Vec3,
    /// Unit facing direction on the ground plane.
    pub forward: Vec3,
    pub faction: Faction,
    pub life_state: LifeState,
}

impl EntityInfo {
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    /// Characters that are alive can be targeted.
    pub fn is_valid_target(&self) -> bool {
        self.faction.is_character() && self.life_state.is_alive()
    }
}

/// Explicit lookup of live entities by id.
pub trait EntityRegistry {
    /// Resolves `id` to a live entity. `None` is an expected outcome.
    fn resolve(&self, id: EntityId) -> Option<EntityInfo>;

    fn contains(&self, id: EntityId) -> bool {
        self.resolve(id).is_some()
    }
}
