use glam::Vec3;

use crate::state::{EntityId, Faction};

/// Outcome of a line-of-sight check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineOfSight {
    Clear,
    /// Blocked at the given obstruction point.
    Blocked(Vec3),
}

impl LineOfSight {
    #[inline]
    pub fn is_clear(self) -> bool {
        matches!(self, Self::Clear)
    }
}

/// Targeting and physics queries.
pub trait PhysicsQueries {
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> LineOfSight;

    /// Damageable entities within `radius` of `center`, nearest first.
    ///
    /// `faction` restricts results to one faction; `None` returns every
    /// damageable, neutral props included.
    fn overlap_sphere(&self, center: Vec3, radius: f32, faction: Option<Faction>) -> Vec<EntityId>;

    /// First carryable object hit by a ray, if any.
    fn raycast_carryable(&self, origin: Vec3, direction: Vec3, distance: f32) -> Option<EntityId>;

    /// Parents `object` to `carrier`; false when the object refuses.
    fn try_attach(&mut self, carrier: EntityId, object: EntityId) -> bool;

    fn detach(&mut self, carrier: EntityId, object: EntityId);
}
