use super::IMPACT_EVENT;
use crate::action::utils::ideal_melee_foe;
use crate::action::{ActionBehavior, ActionError, ClientContext, Conclusion, ServerContext};
use crate::state::EntityId;

/// Close-range swing.
///
/// The victim is resolved again at impact time from whatever stands in front
/// of the actor, so a target that moved away or died is never hit by
/// accident.
#[derive(Debug, Default)]
pub struct Melee {
    provisional_target: Option<EntityId>,
    executed: bool,
    react_target: Option<EntityId>,
    impact_played: bool,
}

impl Melee {
    fn detect_foe(ctx: &ServerContext<'_>, hint: Option<EntityId>) -> Option<EntityId> {
        let actor = ctx.actor_info()?;
        ideal_melee_foe(
            &*ctx.host,
            &actor,
            ctx.config.is_friendly,
            ctx.config.range,
            hint,
        )
    }

    fn play_hit_react(&mut self, ctx: &mut ClientContext<'_>) {
        if self.impact_played {
            return;
        }
        self.impact_played = true;

        let config = ctx.config;
        if let Some(target) = self.react_target.filter(|t| ctx.host.contains(*t)) {
            ctx.set_trigger(target, &config.react_anim);
        }
    }
}

impl ActionBehavior for Melee {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        if let Some(direction) = ctx.request.direction.try_normalize() {
            ctx.host.set_facing(ctx.actor, direction);
        }

        if let Some(foe) = Self::detect_foe(ctx, ctx.request.primary_target()) {
            self.provisional_target = Some(foe);
            ctx.request.set_single_target(foe);
        }

        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if !self.executed && ctx.time_running() >= ctx.config.exec_time_seconds {
            self.executed = true;
            if let Some(foe) = Self::detect_foe(ctx, self.provisional_target) {
                ctx.damage(foe, ctx.config.amount);
            }
        }
        Conclusion::Continue
    }

    fn start_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        let (Some(actor), Some(target)) = (ctx.actor_info(), ctx.primary_target()) else {
            return Conclusion::Continue;
        };
        let reach = ctx.config.range + ctx.engine.melee_range_padding;
        if actor.position.distance_squared(target.position) < reach * reach {
            self.react_target = Some(target.id);
        }
        Conclusion::Continue
    }

    fn on_anim_event_client(&mut self, ctx: &mut ClientContext<'_>, event: &str) {
        if event == IMPACT_EVENT {
            self.play_hit_react(ctx);
        }
    }

    fn end_client(&mut self, ctx: &mut ClientContext<'_>) {
        // Covers swings whose impact marker never arrived.
        self.play_hit_react(ctx);
    }
}
