use super::EntityId;

/// Coarse life state of a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifeState {
    #[default]
    Alive,
    /// Down but revivable.
    Fainted,
    Dead,
}

impl LifeState {
    #[inline]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Allegiance used to resolve "friendly" versus "hostile" targeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Faction {
    Player,
    Npc,
    /// Non-character damageables such as breakable props.
    Neutral,
}

impl Faction {
    /// Faction an action should affect, given whether it is friendly.
    ///
    /// Neutral casters return `None`, which callers treat as "no faction filter".
    pub const fn affected_by(self, friendly: bool) -> Option<Faction> {
        match (self, friendly) {
            (Self::Player, true) | (Self::Npc, false) => Some(Self::Player),
            (Self::Npc, true) | (Self::Player, false) => Some(Self::Npc),
            (Self::Neutral, _) => None,
        }
    }

    #[inline]
    pub const fn is_character(self) -> bool {
        !matches!(self, Self::Neutral)
    }

    /// True when `self` and `other` are opposing characters.
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self.is_character() && other.is_character() && self != other
    }
}

/// Per-actor state that observers need to mirror.
///
/// Players mutate this directly and announce every change with an explicit
/// `StateChanged` broadcast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicatedActorState {
    /// Currently selected target (set by the target action).
    pub target: Option<EntityId>,
    /// Heavy object carried by the actor, if any.
    pub held_object: Option<EntityId>,
    pub is_stealthy: bool,
}
