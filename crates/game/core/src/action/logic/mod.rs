//! Concrete action variants.
//!
//! One behavior per [`ActionLogic`] tag; [`create`] is the dispatch table.

mod aoe;
mod chase;
mod charged_launch;
mod charged_shield;
mod dash_attack;
mod emote;
mod fx_beam;
mod launch_projectile;
mod melee;
mod pick_up;
mod revive;
mod stealth;
mod stunned;
mod target;
mod toss;
mod trample;

pub use aoe::Aoe;
pub use chase::Chase;
pub use charged_launch::ChargedLaunchProjectile;
pub use charged_shield::ChargedShield;
pub use dash_attack::DashAttack;
pub use emote::Emote;
pub use fx_beam::FxBeam;
pub use launch_projectile::LaunchProjectile;
pub use melee::Melee;
pub use pick_up::{Drop, FAILED_PICKUP_TRIGGER, PickUp};
pub use revive::Revive;
pub use stealth::StealthMode;
pub use stunned::Stunned;
pub use target::Target;
pub use toss::Toss;
pub use trample::Trample;

use crate::action::{ActionBehavior, ActionLogic};

/// Animation marker at which a swing connects.
pub const IMPACT_EVENT: &str = "impact";

/// Creates a fresh behavior for `logic`.
pub fn create(logic: ActionLogic) -> Box<dyn ActionBehavior> {
    match logic {
        ActionLogic::Melee => Box::<Melee>::default(),
        ActionLogic::RangedFxTargeted => Box::<FxBeam>::default(),
        ActionLogic::LaunchProjectile => Box::<LaunchProjectile>::default(),
        ActionLogic::ChargedLaunchProjectile => Box::<ChargedLaunchProjectile>::default(),
        ActionLogic::Chase => Box::<Chase>::default(),
        ActionLogic::Revive => Box::<Revive>::default(),
        ActionLogic::Emote => Box::new(Emote),
        ActionLogic::Aoe => Box::<Aoe>::default(),
        ActionLogic::Trample => Box::<Trample>::default(),
        ActionLogic::ChargedShield => Box::<ChargedShield>::default(),
        ActionLogic::Stunned => Box::new(Stunned),
        ActionLogic::Target => Box::<Target>::default(),
        ActionLogic::StealthMode => Box::<StealthMode>::default(),
        ActionLogic::DashAttack => Box::<DashAttack>::default(),
        ActionLogic::PickUp => Box::<PickUp>::default(),
        ActionLogic::Drop => Box::<Drop>::default(),
        ActionLogic::Toss => Box::<Toss>::default(),
    }
}
