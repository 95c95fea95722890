//! Immutable per-prototype action configuration.
//!
//! Configs are loaded once by a content collaborator and shared read-only
//! (behind `Arc`) by every instance of the prototype.

use crate::state::ActionId;

/// Variant tag selecting the behavior an instance runs.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionLogic {
    #[default]
    Melee,
    /// Always-hit beam rendered as an FX projectile.
    RangedFxTargeted,
    LaunchProjectile,
    ChargedLaunchProjectile,
    Chase,
    Revive,
    Emote,
    Aoe,
    Trample,
    ChargedShield,
    Stunned,
    Target,
    StealthMode,
    DashAttack,
    PickUp,
    Drop,
    Toss,
}

/// How long a blocking-capable action holds the actor's blocking slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockingMode {
    /// Blocks until the instance ends.
    #[default]
    EntireDuration,
    /// Blocks only while the wind-up runs; with no wind-up it never blocks.
    OnlyDuringExecTime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProjectileKind {
    /// A simulated object that flies and collides.
    #[default]
    Physical,
    /// A purely visual projectile; damage is applied by the action itself.
    Fx,
}

/// One projectile entry of an action.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectileInfo {
    pub name: String,
    pub kind: ProjectileKind,
    /// Meters per second.
    pub speed: f32,
    /// Maximum travel distance.
    pub range: f32,
    pub damage: f32,
    /// How many victims a physical projectile may hit before vanishing.
    pub max_victims: u8,
}

/// Visual effect spawned by a visualization instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDescriptor {
    pub name: String,
}

impl EffectDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Immutable configuration of one action prototype.
///
/// Animation trigger names are empty when unused.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionConfig {
    pub id: ActionId,
    pub name: String,
    pub logic: ActionLogic,

    // ===== targeting =====
    pub range: f32,
    pub radius: f32,
    pub is_friendly: bool,

    // ===== magnitude =====
    /// Primary damage or heal (or a multiplier, for stun).
    pub amount: f32,
    pub splash_damage: f32,

    // ===== timing =====
    /// Wind-up before the action's effect fires.
    pub exec_time_seconds: f32,
    /// Total lifetime; non-positive means "until the variant stops".
    pub duration_seconds: f32,
    /// Lingering effect time after a charge is released.
    pub effect_duration_seconds: f32,
    pub reuse_time_seconds: f32,

    // ===== movement =====
    pub move_speed: f32,
    pub knockback_speed: f32,
    pub knockback_duration: f32,

    // ===== scheduling =====
    pub action_interruptible: bool,
    /// Prototypes allowed to interrupt this one even when it is not
    /// interruptible in general.
    pub interrupted_by: Vec<ActionId>,
    pub blocking_mode: BlockingMode,

    // ===== animation =====
    pub anim: String,
    pub anim2: String,
    pub anim_anticipation: String,
    pub react_anim: String,
    pub other_animator_variable: String,

    // ===== resources =====
    pub projectiles: Vec<ProjectileInfo>,
    pub spawns: Vec<EffectDescriptor>,
    pub icon: String,
    pub description: String,
}

impl ActionConfig {
    pub fn new(id: ActionId, logic: ActionLogic) -> Self {
        Self {
            id,
            logic,
            name: logic.to_string(),
            ..Self::default()
        }
    }

    /// True when instances occupy the actor's blocking slot at start.
    pub fn is_blocking(&self) -> bool {
        !(self.blocking_mode == BlockingMode::OnlyDuringExecTime && self.exec_time_seconds <= 0.0)
    }

    /// Seconds a fresh instance holds the blocking slot, used for queue depth.
    pub fn blocking_duration(&self) -> f32 {
        match self.blocking_mode {
            BlockingMode::EntireDuration => self.duration_seconds.max(0.0),
            BlockingMode::OnlyDuringExecTime => self.exec_time_seconds.max(0.0),
        }
    }

    /// True when a request for `incoming` may cancel a running instance of
    /// this config without queueing.
    pub fn can_be_interrupted_by(&self, incoming: ActionId) -> bool {
        self.action_interruptible || self.interrupted_by.contains(&incoming)
    }

    /// First projectile entry of the given kind.
    pub fn projectile(&self, kind: ProjectileKind) -> Option<&ProjectileInfo> {
        self.projectiles.iter().find(|p| p.kind == kind)
    }
}

/// Returns `name` when it names a trigger.
#[inline]
pub(crate) fn trigger(name: &str) -> Option<&str> {
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exec_time_only_blocks_in_entire_duration_mode() {
        let mut config = ActionConfig::new(ActionId(1), ActionLogic::Target);
        config.blocking_mode = BlockingMode::OnlyDuringExecTime;
        assert!(!config.is_blocking());

        config.exec_time_seconds = 0.5;
        assert!(config.is_blocking());
        assert_eq!(config.blocking_duration(), 0.5);

        config.exec_time_seconds = 0.0;
        config.blocking_mode = BlockingMode::EntireDuration;
        assert!(config.is_blocking());
    }

    #[test]
    fn explicit_interrupters_override_flag() {
        let mut config = ActionConfig::new(ActionId(1), ActionLogic::ChargedShield);
        config.interrupted_by.push(ActionId(9));
        assert!(config.can_be_interrupted_by(ActionId(9)));
        assert!(!config.can_be_interrupted_by(ActionId(2)));
    }

    #[test]
    fn logic_tags_parse_case_insensitively() {
        use std::str::FromStr;
        assert_eq!(
            ActionLogic::from_str("Charged_Shield").ok(),
            Some(ActionLogic::ChargedShield)
        );
        assert_eq!(ActionLogic::RangedFxTargeted.as_ref(), "ranged_fx_targeted");
    }
}
