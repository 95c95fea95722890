use crate::action::utils::{observed_charge_end, percent_charged_up};
use crate::action::{
    ActionBehavior, ActionError, BuffableValue, ClientContext, Conclusion, GameplayActivity,
    InstanceView, ServerContext,
};
use crate::engine::Broadcast;
use crate::env::{EffectAnchor, EffectHandle};

/// Tolerance for treating a released charge as full.
const FULL_CHARGE_EPSILON: f32 = 1e-3;

/// Damage-absorbing stance that grows stronger the longer it is charged.
///
/// While charging it blocks; once released it lingers for
/// `effect_duration_seconds` as a non-blocking instance.
#[derive(Debug, Default)]
pub struct ChargedShield {
    stopped_at: Option<f32>,
    charging_client: bool,
    stopped_at_client: Option<f32>,
    charge_fx: Option<EffectHandle>,
    shield_fx: Option<EffectHandle>,
}

impl ChargedShield {
    fn percent(&self, view: &InstanceView<'_>) -> f32 {
        percent_charged_up(
            self.stopped_at,
            view.now,
            view.time_started,
            view.config.exec_time_seconds,
        )
    }

    fn stop_charging(&mut self, ctx: &mut ServerContext<'_>) {
        if self.stopped_at.is_some() {
            return;
        }
        let config = ctx.config;
        self.stopped_at = Some(ctx.now);
        let percent = self.percent(&ctx.view());

        ctx.broadcast(Broadcast::StoppedChargingUp(percent));
        ctx.set_trigger(&config.anim2);
    }
}

impl ActionBehavior for ChargedShield {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if self.stopped_at.is_none() && self.percent(&ctx.view()) >= 1.0 {
            self.stop_charging(ctx);
        }
        match self.stopped_at {
            Some(at) if ctx.now >= at + ctx.config.effect_duration_seconds => Conclusion::Stop,
            _ => Conclusion::Continue,
        }
    }

    fn on_gameplay_activity(&mut self, ctx: &mut ServerContext<'_>, activity: GameplayActivity) {
        if activity == GameplayActivity::StoppedChargingUp {
            self.stop_charging(ctx);
        }
    }

    fn should_become_non_blocking(&self, _view: &InstanceView<'_>) -> bool {
        self.stopped_at.is_some()
    }

    fn buff_value(&self, kind: BuffableValue, view: &InstanceView<'_>) -> Option<f32> {
        let percent = self.percent(view);
        match kind {
            BuffableValue::PercentDamageReceived => {
                let reduction = 0.5 + percent * percent / 2.0;
                Some(1.0 - reduction)
            }
            BuffableValue::ChanceToStunTramplers if percent >= 1.0 => Some(1.0),
            _ => None,
        }
    }

    fn start_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        self.charging_client = true;
        self.charge_fx = ctx.spawn(0, EffectAnchor::Entity(ctx.actor));
        Conclusion::Continue
    }

    fn on_stopped_charging_up_client(&mut self, ctx: &mut ClientContext<'_>, percent: f32) {
        if !self.charging_client {
            return;
        }
        self.charging_client = false;
        self.stopped_at_client = Some(ctx.now);
        ctx.shutdown(&mut self.charge_fx);

        if (percent - 1.0).abs() <= FULL_CHARGE_EPSILON {
            self.shield_fx = ctx.spawn(1, EffectAnchor::Entity(ctx.actor));
        }
    }

    fn update_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        let stopped_at = observed_charge_end(
            self.stopped_at_client,
            ctx.now,
            ctx.time_started,
            ctx.config.exec_time_seconds,
        );
        match stopped_at {
            Some(at) if ctx.now >= at + ctx.config.effect_duration_seconds => Conclusion::Stop,
            _ => Conclusion::Continue,
        }
    }

    fn cancel_client(&mut self, ctx: &mut ClientContext<'_>) {
        self.charging_client = false;
        ctx.shutdown(&mut self.charge_fx);
        ctx.shutdown(&mut self.shield_fx);
    }
}
