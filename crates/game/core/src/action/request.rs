use arrayvec::ArrayVec;
use glam::Vec3;

use crate::config::EngineConfig;
use crate::state::{ActionId, EntityId};

/// Ordered target list carried by a request; index 0 is the primary target.
pub type TargetIds = ArrayVec<EntityId, { EngineConfig::MAX_TARGETS }>;

/// One cast attempt: the wire payload and the unit of replication.
///
/// The server may revise a request before broadcasting it (clearing the
/// targets of a blocked beam, for instance); observers always see the revised
/// copy.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequestData {
    pub action_id: ActionId,
    pub target_ids: TargetIds,
    pub position: Vec3,
    pub direction: Vec3,
    /// Wait behind a busy blocking slot instead of being dropped.
    pub should_queue: bool,
    /// Cancel the actor's movement before playing.
    pub cancel_movement: bool,
    /// Walk into range of the primary target first.
    pub should_close: bool,
    /// Per-request override of the config's amount (a chase's stop distance).
    pub amount: Option<f32>,
}

impl ActionRequestData {
    pub fn new(action_id: ActionId) -> Self {
        Self {
            action_id,
            ..Self::default()
        }
    }

    /// Appends a target. Targets beyond the request capacity are ignored.
    pub fn with_target(mut self, target: EntityId) -> Self {
        let _ = self.target_ids.try_push(target);
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_amount(mut self, amount: f32) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn queued(mut self) -> Self {
        self.should_queue = true;
        self
    }

    pub fn closing(mut self) -> Self {
        self.should_close = true;
        self
    }

    pub fn cancelling_movement(mut self) -> Self {
        self.cancel_movement = true;
        self
    }

    /// Primary target, if the request names one.
    #[inline]
    pub fn primary_target(&self) -> Option<EntityId> {
        self.target_ids.first().copied()
    }

    /// Replaces the target list with a single target.
    pub fn set_single_target(&mut self, target: EntityId) {
        self.target_ids.clear();
        self.target_ids.push(target);
    }

    pub fn clear_targets(&mut self) {
        self.target_ids.clear();
    }

    /// True when `entity` appears anywhere in the target list.
    pub fn targets(&self, entity: EntityId) -> bool {
        self.target_ids.contains(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_targets_are_ignored() {
        let request = (0..6).fold(ActionRequestData::new(ActionId(1)), |r, i| {
            r.with_target(EntityId(i))
        });
        assert_eq!(request.target_ids.len(), EngineConfig::MAX_TARGETS);
        assert_eq!(request.primary_target(), Some(EntityId(0)));
    }

    #[test]
    fn revising_a_copy_leaves_the_original_intact() {
        let original = ActionRequestData::new(ActionId(4))
            .with_target(EntityId(7))
            .with_position(Vec3::new(1.0, 0.0, 2.0));
        let mut revised = original.clone();
        revised.clear_targets();
        revised.position = Vec3::ZERO;

        assert_eq!(original.primary_target(), Some(EntityId(7)));
        assert!(revised.target_ids.is_empty());
    }
}
