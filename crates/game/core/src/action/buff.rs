//! Gameplay-activity notifications and buffable scalars.

/// Scalars a running instance may adjust while it is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BuffableValue {
    /// Multiplier on incoming healing.
    PercentHealingReceived,
    /// Multiplier on incoming damage.
    PercentDamageReceived,
    /// Probability that a trampler colliding with this actor gets stunned.
    ChanceToStunTramplers,
}

impl BuffableValue {
    /// Value with no instance contributing.
    pub const fn unbuffed(self) -> f32 {
        match self {
            Self::PercentHealingReceived | Self::PercentDamageReceived => 1.0,
            Self::ChanceToStunTramplers => 0.0,
        }
    }

    /// Folds one contribution into an accumulated value.
    ///
    /// Percentages multiply and chances take the maximum, so the result does
    /// not depend on the order instances are visited in.
    pub fn combine(self, accumulated: f32, contribution: f32) -> f32 {
        match self {
            Self::PercentHealingReceived | Self::PercentDamageReceived => {
                accumulated * contribution
            }
            Self::ChanceToStunTramplers => accumulated.max(contribution),
        }
    }
}

/// Coarse events forwarded to every running instance of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GameplayActivity {
    AttackedByEnemy,
    Healed,
    StoppedChargingUp,
    UsingAttackAction,
}
