use glam::Vec3;

use crate::action::utils::{dash_destination, ideal_melee_foe};
use crate::action::{
    ActionBehavior, ActionError, BuffableValue, Conclusion, InstanceView, ServerContext,
};
use crate::engine::Broadcast;

/// Dash to a point, then swing once on arrival.
///
/// The actor is only moved (teleported) at `end`; the visualization fakes
/// the travel during the wind-up. Incoming damage is suppressed once the
/// wind-up has completed.
#[derive(Debug, Default)]
pub struct DashAttack {
    destination: Vec3,
    swung: bool,
}

impl DashAttack {
    /// Melee resolution at the arrival point. Uses `radius` as reach.
    fn swing(&mut self, ctx: &mut ServerContext<'_>) {
        if self.swung {
            return;
        }
        self.swung = true;

        let Some(actor) = ctx.actor_info() else {
            return;
        };
        let foe = ideal_melee_foe(
            &*ctx.host,
            &actor,
            ctx.config.is_friendly,
            ctx.config.radius,
            ctx.request.primary_target(),
        );
        if let Some(foe) = foe {
            ctx.damage(foe, ctx.config.amount);
        }
    }
}

impl ActionBehavior for DashAttack {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        let actor = ctx
            .actor_info()
            .ok_or(ActionError::ActorNotFound(ctx.actor))?;

        self.destination = dash_destination(
            &*ctx.host,
            &actor,
            ctx.request.position,
            ctx.engine.very_close_teleport_range,
            config.range,
            config.range,
        );
        ctx.face_towards(self.destination);
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        let config = ctx.config;
        ctx.set_trigger(&config.anim2);
        ctx.host.teleport(ctx.actor, self.destination);
        self.swing(ctx);
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        let config = ctx.config;
        ctx.set_trigger(&config.other_animator_variable);
        // The visualization moved the actor; it has to be told explicitly.
        ctx.broadcast(Broadcast::CancelActionsByPrototype(ctx.request.action_id));
    }

    fn buff_value(&self, kind: BuffableValue, view: &InstanceView<'_>) -> Option<f32> {
        let dashing = view.time_running() >= view.config.exec_time_seconds;
        (kind == BuffableValue::PercentDamageReceived && dashing).then_some(0.0)
    }
}
