use crate::action::{ActionBehavior, ActionError, Conclusion, ServerContext};
use crate::state::{EntityId, LifeState};

/// Brings a fainted ally back once the wind-up completes.
#[derive(Debug, Default)]
pub struct Revive {
    target: Option<EntityId>,
    fired: bool,
}

impl Revive {
    /// Applies the heal if the target is still down. Returns false when the
    /// target got up, died, or vanished in the meantime.
    fn try_revive(&mut self, ctx: &mut ServerContext<'_>) -> bool {
        self.fired = true;
        let Some(target) = self.target.and_then(|t| ctx.host.resolve(t)) else {
            return false;
        };
        if target.life_state != LifeState::Fainted {
            return false;
        }
        ctx.host.revive(ctx.actor, target.id, ctx.config.amount);
        true
    }
}

impl ActionBehavior for Revive {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        let target = ctx
            .request
            .primary_target()
            .ok_or(ActionError::TargetMissing)?;
        let info = ctx
            .host
            .resolve(target)
            .ok_or(ActionError::TargetNotFound(target))?;

        self.target = Some(target);
        ctx.face_towards(info.position);
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if !self.fired && ctx.time_running() >= ctx.config.exec_time_seconds && !self.try_revive(ctx)
        {
            tracing::debug!(
                target: "engine::revive",
                actor = %ctx.actor,
                "revive target is no longer fainted; cancelling"
            );
            return Conclusion::Cancel;
        }
        Conclusion::Continue
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        if !self.fired {
            self.try_revive(ctx);
        }
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        let config = ctx.config;
        ctx.set_trigger(&config.anim2);
    }
}
