use crate::state::ActionId;

/// Engine tunables shared by every player and variant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Extra reach added to a melee range when the visualization decides
    /// whether the requested target should play its hit-react.
    pub melee_range_padding: f32,
    /// Upper bound, in seconds of blocking time, for the pending request queue.
    pub max_queue_time_depth: f32,
    /// Anticipated visualization instances are discarded after this many
    /// seconds without an authoritative confirmation.
    pub anticipation_timeout: f32,
    /// Distance at which a trampler counts as already touching a victim.
    pub physical_touch_distance: f32,
    /// Dash destinations closer than this are replaced by a forward dash.
    pub very_close_teleport_range: f32,
    /// Tolerance between a client-picked AoE point and the caster's range.
    pub max_aoe_divergence: f32,
    /// Impulse and torque parameters for tossed objects.
    pub toss: TossTuning,
    /// Prototypes the players synthesize on their own.
    pub prototypes: PrototypeIds,
}

/// Physical launch parameters for the toss variant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TossTuning {
    pub forward_impulse: f32,
    pub upward_impulse: f32,
    /// Torque is drawn uniformly from `[-max_torque, max_torque]` per axis.
    pub max_torque: f32,
    /// Height above the actor at which the tossed object spawns.
    pub spawn_height: f32,
}

impl Default for TossTuning {
    fn default() -> Self {
        Self {
            forward_impulse: 80.0,
            upward_impulse: 150.0,
            max_torque: 15.0,
            spawn_height: 2.0,
        }
    }
}

/// Action ids the engine refers to without a request naming them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrototypeIds {
    /// Inserted ahead of `should_close` requests whose target is out of range.
    pub chase: Option<ActionId>,
    /// Inserted ahead of single-target requests aimed at a new target.
    pub target: Option<ActionId>,
    /// Chained after a trample whose trampler got stunned.
    pub stunned: Option<ActionId>,
}

impl EngineConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of target ids carried by a single request.
    pub const MAX_TARGETS: usize = 4;
    /// Maximum number of entities returned by one overlap query.
    pub const MAX_OVERLAP_RESULTS: usize = 16;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MELEE_RANGE_PADDING: f32 = 3.0;
    pub const DEFAULT_MAX_QUEUE_TIME_DEPTH: f32 = 1.6;
    pub const DEFAULT_ANTICIPATION_TIMEOUT: f32 = 1.0;
    pub const DEFAULT_PHYSICAL_TOUCH_DISTANCE: f32 = 1.0;
    pub const DEFAULT_VERY_CLOSE_TELEPORT_RANGE: f32 = 4.0;
    pub const DEFAULT_MAX_AOE_DIVERGENCE: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            melee_range_padding: Self::DEFAULT_MELEE_RANGE_PADDING,
            max_queue_time_depth: Self::DEFAULT_MAX_QUEUE_TIME_DEPTH,
            anticipation_timeout: Self::DEFAULT_ANTICIPATION_TIMEOUT,
            physical_touch_distance: Self::DEFAULT_PHYSICAL_TOUCH_DISTANCE,
            very_close_teleport_range: Self::DEFAULT_VERY_CLOSE_TELEPORT_RANGE,
            max_aoe_divergence: Self::DEFAULT_MAX_AOE_DIVERGENCE,
            toss: TossTuning::default(),
            prototypes: PrototypeIds::default(),
        }
    }

    pub fn with_prototypes(mut self, prototypes: PrototypeIds) -> Self {
        self.prototypes = prototypes;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
