use glam::Vec3;

use crate::action::{ActionBehavior, ActionError, Conclusion, ServerContext};
use crate::state::EntityId;

/// Animation trigger played when a pick-up attempt finds nothing to grab.
pub const FAILED_PICKUP_TRIGGER: &str = "PickUpFailed";

/// Grabs the heavy object in front of the actor once the wind-up completes.
///
/// Fails closed: with nothing carryable in reach, or a refused attach, it
/// plays [`FAILED_PICKUP_TRIGGER`] and ends.
#[derive(Debug, Default)]
pub struct PickUp {
    attempted: bool,
}

impl PickUp {
    fn try_pick_up(ctx: &mut ServerContext<'_>) -> bool {
        let Some(actor) = ctx.actor_info() else {
            return false;
        };
        let reach = ctx.config.range.max(1.0);
        let Some(object) = ctx
            .host
            .raycast_carryable(actor.position + Vec3::Y, actor.forward, reach)
        else {
            return false;
        };
        if !ctx.host.try_attach(ctx.actor, object) {
            return false;
        }

        ctx.state.held_object = Some(object);
        ctx.request.set_single_target(object);
        ctx.set_target(None);
        true
    }
}

impl ActionBehavior for PickUp {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        if let Some(held) = ctx.state.held_object.filter(|h| ctx.host.contains(*h)) {
            return Err(ActionError::AlreadyCarrying(held));
        }
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if self.attempted || ctx.time_running() < ctx.config.exec_time_seconds {
            return Conclusion::Continue;
        }
        self.attempted = true;

        if Self::try_pick_up(ctx) {
            Conclusion::Continue
        } else {
            tracing::debug!(target: "engine::pick_up", actor = %ctx.actor, "nothing to pick up");
            ctx.set_trigger(FAILED_PICKUP_TRIGGER);
            Conclusion::Stop
        }
    }
}

/// Puts down the carried object after the wind-up.
#[derive(Debug, Default)]
pub struct Drop {
    held: Option<EntityId>,
}

impl ActionBehavior for Drop {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        let Some(held) = ctx.state.held_object else {
            return Err(ActionError::NothingToCarry);
        };
        if !ctx.host.contains(held) {
            // The object despawned while carried.
            ctx.state.held_object = None;
            ctx.publish_state();
            return Err(ActionError::NothingToCarry);
        }

        self.held = Some(held);
        ctx.request.clear_targets();
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if ctx.time_running() < ctx.config.exec_time_seconds {
            return Conclusion::Continue;
        }
        if let Some(held) = self.held.take() {
            ctx.host.detach(ctx.actor, held);
            ctx.state.held_object = None;
            ctx.publish_state();
        }
        Conclusion::Stop
    }
}
