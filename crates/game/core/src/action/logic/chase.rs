use crate::action::{ActionBehavior, ActionError, ClientContext, Conclusion, ServerContext};
use crate::state::EntityId;

/// Walks the actor into range of its primary target.
///
/// The request's `amount` (or the config's) is the stop distance.
#[derive(Debug, Default)]
pub struct Chase {
    target: Option<EntityId>,
}

impl Chase {
    fn stop_distance(ctx: &ServerContext<'_>) -> f32 {
        ctx.request.amount.unwrap_or(ctx.config.amount)
    }

    fn stop_distance_client(ctx: &ClientContext<'_>) -> f32 {
        ctx.request.amount.unwrap_or(ctx.config.amount)
    }
}

impl ActionBehavior for Chase {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let target = ctx
            .request
            .primary_target()
            .ok_or(ActionError::TargetMissing)?;
        if !ctx.host.contains(target) {
            return Err(ActionError::TargetNotFound(target));
        }

        self.target = Some(target);
        if !ctx.host.is_performing_forced_movement(ctx.actor) {
            ctx.host.follow_entity(ctx.actor, target);
        }
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        let Some(target) = self.target.and_then(|t| ctx.host.resolve(t)) else {
            tracing::debug!(target: "engine::chase", actor = %ctx.actor, "chase target vanished");
            return Conclusion::Cancel;
        };
        let Some(actor) = ctx.actor_info() else {
            return Conclusion::Cancel;
        };

        let stop = Self::stop_distance(ctx);
        if actor.position.distance_squared(target.position) < stop * stop {
            return Conclusion::Stop;
        }

        // Re-issued every tick so a knockback mid-chase resumes afterwards.
        if !ctx.host.is_performing_forced_movement(ctx.actor) {
            ctx.host.follow_entity(ctx.actor, target.id);
        }
        Conclusion::Continue
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        ctx.host.cancel_move(ctx.actor);
        if let Some(target) = self.target.and_then(|t| ctx.host.resolve(t)) {
            ctx.face_towards(target.position);
        }
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        ctx.host.cancel_move(ctx.actor);
    }

    // Ends silently on the server, so observers stop on their own once in range.
    fn update_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        let (Some(actor), Some(target)) = (ctx.actor_info(), ctx.primary_target()) else {
            return Conclusion::Stop;
        };
        let stop = Self::stop_distance_client(ctx);
        if actor.position.distance_squared(target.position) < stop * stop {
            Conclusion::Stop
        } else {
            Conclusion::Continue
        }
    }
}
