use crate::action::{
    ActionBehavior, ActionError, ClientContext, Conclusion, GameplayActivity, InstanceView,
    ServerContext,
};
use crate::engine::Broadcast;
use crate::env::{EffectAnchor, EffectHandle};

/// Turns the actor stealthy after an uninterrupted wind-up.
///
/// Attacking or being attacked ends it. The visualization is cancelled by
/// prototype id rather than with a blanket cancel, so an owner's freshly
/// anticipated re-trigger survives its predecessor's cleanup.
#[derive(Debug, Default)]
pub struct StealthMode {
    started: bool,
    ended: bool,
    graphics: Vec<EffectHandle>,
}

impl StealthMode {
    fn end_stealth(&mut self, ctx: &mut ServerContext<'_>) {
        if self.ended {
            return;
        }
        self.ended = true;
        if self.started {
            ctx.state.is_stealthy = false;
            ctx.publish_state();
        }
        ctx.broadcast(Broadcast::CancelActionsByPrototype(ctx.request.action_id));
    }
}

impl ActionBehavior for StealthMode {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn should_become_non_blocking(&self, view: &InstanceView<'_>) -> bool {
        view.time_running() >= view.config.exec_time_seconds
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if !self.started && !self.ended && ctx.time_running() >= ctx.config.exec_time_seconds {
            self.started = true;
            ctx.state.is_stealthy = true;
            ctx.publish_state();
        }
        if self.ended {
            Conclusion::Stop
        } else {
            Conclusion::Continue
        }
    }

    fn on_gameplay_activity(&mut self, ctx: &mut ServerContext<'_>, activity: GameplayActivity) {
        if matches!(
            activity,
            GameplayActivity::UsingAttackAction | GameplayActivity::AttackedByEnemy
        ) {
            self.end_stealth(ctx);
        }
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        self.end_stealth(ctx);
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        self.end_stealth(ctx);
    }

    fn update_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        let ready = ctx.time_running() >= ctx.config.exec_time_seconds;
        if ready && ctx.is_owner && self.graphics.is_empty() {
            for index in 0..ctx.config.spawns.len() {
                if let Some(handle) = ctx.spawn(index, EffectAnchor::Entity(ctx.actor)) {
                    self.graphics.push(handle);
                }
            }
        }
        Conclusion::Continue
    }

    fn cancel_client(&mut self, ctx: &mut ClientContext<'_>) {
        for handle in self.graphics.drain(..) {
            ctx.host.shutdown(handle);
        }
    }
}
