use crate::state::EntityId;

/// Animation playback collaborator.
///
/// Inbound animation markers are delivered by the host straight to the
/// visualization player (`on_anim_event`).
pub trait AnimationDriver {
    fn set_trigger(&mut self, entity: EntityId, trigger: &str);
    fn reset_trigger(&mut self, entity: EntityId, trigger: &str);
}
