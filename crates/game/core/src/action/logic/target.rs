use crate::action::{ActionBehavior, ActionError, ActionLogic, ClientContext, Conclusion, ServerContext};
use crate::env::{EffectAnchor, EffectHandle};
use crate::state::EntityId;

/// Selects the actor's target and keeps it while the target stays valid.
///
/// Only one target instance runs per actor; starting one cancels the rest.
/// A request without targets just clears the current target.
#[derive(Debug, Default)]
pub struct Target {
    target: Option<EntityId>,
    reticule: Option<EffectHandle>,
}

impl Target {
    fn release(&mut self, ctx: &mut ServerContext<'_>) {
        if self.target.is_some() && ctx.state.target == self.target {
            ctx.state.target = None;
            ctx.publish_state();
        }
    }
}

impl ActionBehavior for Target {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        ctx.cancel_by_logic(ActionLogic::Target, true);

        let Some(id) = ctx.request.primary_target() else {
            ctx.set_target(None);
            return Ok(Conclusion::Stop);
        };
        let Some(info) = ctx.host.resolve(id) else {
            ctx.set_target(None);
            return Err(ActionError::TargetNotFound(id));
        };
        if !info.is_valid_target() {
            ctx.set_target(None);
            return Err(ActionError::InvalidTarget(id));
        }

        self.target = Some(id);
        ctx.set_target(Some(id));
        ctx.face_towards(info.position);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        let Some(info) = self
            .target
            .and_then(|t| ctx.host.resolve(t))
            .filter(|t| t.is_valid_target())
        else {
            return Conclusion::Stop;
        };

        // Idle actors keep facing their target.
        if ctx.running_actions == 1 && !ctx.host.is_moving(ctx.actor) {
            ctx.face_towards(info.position);
        }
        Conclusion::Continue
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        self.release(ctx);
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        self.release(ctx);
    }

    fn start_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        let Some(target) = ctx.primary_target() else {
            return Conclusion::Stop;
        };
        if ctx.is_owner {
            self.reticule = ctx.spawn(0, EffectAnchor::Entity(target.id));
        }
        Conclusion::Continue
    }

    fn update_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        match ctx.primary_target() {
            Some(target) if target.is_valid_target() => Conclusion::Continue,
            _ => Conclusion::Stop,
        }
    }

    fn cancel_client(&mut self, ctx: &mut ClientContext<'_>) {
        ctx.shutdown(&mut self.reticule);
    }
}
