use crate::action::{ActionBehavior, ActionError, ClientContext, Conclusion, ServerContext};
use crate::env::EffectAnchor;

/// Area attack centred on a requested point.
///
/// Victims are only known when the blast fires, so the broadcast request
/// carries no targets.
#[derive(Debug, Default)]
pub struct Aoe {
    fired: bool,
}

impl ActionBehavior for Aoe {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        let actor = ctx
            .actor_info()
            .ok_or(ActionError::ActorNotFound(ctx.actor))?;

        // The client's pick may be stale by the time it arrives.
        let reach = config.range + ctx.engine.max_aoe_divergence;
        if actor.position.distance(ctx.request.position) > reach {
            return Err(ActionError::OutOfRange);
        }

        ctx.request.clear_targets();
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if self.fired || ctx.time_running() < ctx.config.exec_time_seconds {
            return Conclusion::Continue;
        }
        self.fired = true;

        let Some(actor) = ctx.actor_info() else {
            return Conclusion::Continue;
        };
        let config = ctx.config;
        let faction = actor.faction.affected_by(config.is_friendly);
        let victims = ctx
            .host
            .overlap_sphere(ctx.request.position, config.radius, faction);
        let delta = if config.is_friendly {
            config.amount
        } else {
            -config.amount
        };
        let caster = ctx.actor;
        for victim in victims.into_iter().filter(|v| *v != caster) {
            ctx.host.receive_hp(caster, victim, delta);
        }
        Conclusion::Continue
    }

    fn start_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        // Fire and forget; the effect cleans itself up.
        ctx.spawn(0, EffectAnchor::Point(ctx.request.position));
        Conclusion::Stop
    }
}
