use bitflags::bitflags;

use crate::action::BuffableValue;
use crate::state::EntityId;

bitflags! {
    /// Special reactions a damageable has to certain hits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpecialDamageFlags: u8 {
        /// A trampler running into this is stunned.
        const STUN_ON_TRAMPLE = 1 << 0;
        /// Collateral (splash) damage does not apply.
        const NOT_AFFECTED_BY_SPLASH = 1 << 1;
    }
}

/// Damage receiver capability of other entities.
///
/// Implementations apply the target's own buffs (see [`BuffableValue`]) and
/// notify the target's running actions.
pub trait Damageable {
    /// Applies `delta` hit points to `target`; negative is damage.
    fn receive_hp(&mut self, inflicter: EntityId, target: EntityId, delta: f32);

    fn special_damage_flags(&self, target: EntityId) -> SpecialDamageFlags;

    /// The target's current buffed value (its running actions folded in).
    fn buffed_value(&self, target: EntityId, kind: BuffableValue) -> f32;

    /// Brings a fainted target back with `hp` hit points.
    fn revive(&mut self, reviver: EntityId, target: EntityId, hp: f32);
}
