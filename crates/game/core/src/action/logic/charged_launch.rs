use super::launch_projectile::{physical_projectile, spawn_forward};
use crate::action::utils::{observed_charge_end, percent_charged_up};
use crate::action::{
    ActionBehavior, ActionError, ClientContext, Conclusion, GameplayActivity, ProjectileKind,
    ServerContext,
};
use crate::engine::Broadcast;
use crate::env::{EffectAnchor, EffectHandle};

/// Projectile whose tier depends on how long the actor charged it.
///
/// Charging ends when the owner releases the button (`StoppedChargingUp`) or
/// when the wind-up is fully charged. Being hit while charging spoils the
/// shot.
#[derive(Debug, Default)]
pub struct ChargedLaunchProjectile {
    stopped_at: Option<f32>,
    hit_by_attack: bool,
    launched: bool,
    stopped_at_client: Option<f32>,
    charge_fx: Option<EffectHandle>,
}

impl ChargedLaunchProjectile {
    fn percent(&self, ctx: &ServerContext<'_>) -> f32 {
        percent_charged_up(
            self.stopped_at,
            ctx.now,
            ctx.time_started,
            ctx.config.exec_time_seconds,
        )
    }

    fn stop_charging(&mut self, ctx: &mut ServerContext<'_>) {
        if self.stopped_at.is_some() {
            return;
        }
        let config = ctx.config;
        self.stopped_at = Some(ctx.now);
        let percent = self.percent(ctx);

        ctx.set_trigger(&config.anim2);
        ctx.broadcast(Broadcast::StoppedChargingUp(percent));
        if !self.hit_by_attack {
            self.launch(ctx, percent);
        }
    }

    /// Picks the projectile tier matching `percent` and spawns it once.
    fn launch(&mut self, ctx: &mut ServerContext<'_>, percent: f32) {
        if self.launched {
            return;
        }
        self.launched = true;

        let tiers: Vec<_> = ctx
            .config
            .projectiles
            .iter()
            .filter(|p| p.kind == ProjectileKind::Physical)
            .collect();
        let Some(last) = tiers.len().checked_sub(1) else {
            return;
        };
        let index = ((percent * last as f32).floor() as usize).min(last);
        let info = tiers[index].clone();
        spawn_forward(ctx, info, glam::Vec3::ZERO, glam::Vec3::ZERO);
    }
}

impl ActionBehavior for ChargedLaunchProjectile {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        physical_projectile(ctx)?;
        ctx.face_request();
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if self.stopped_at.is_none() && self.percent(ctx) >= 1.0 {
            self.stop_charging(ctx);
        }
        match self.stopped_at {
            Some(at) if ctx.now >= at + ctx.config.effect_duration_seconds => Conclusion::Stop,
            _ => Conclusion::Continue,
        }
    }

    fn on_gameplay_activity(&mut self, ctx: &mut ServerContext<'_>, activity: GameplayActivity) {
        match activity {
            GameplayActivity::AttackedByEnemy if self.stopped_at.is_none() => {
                self.hit_by_attack = true;
            }
            GameplayActivity::StoppedChargingUp => self.stop_charging(ctx),
            _ => {}
        }
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        self.stop_charging(ctx);
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        // A cancelled charge never fires.
        if self.stopped_at.is_none() {
            self.stopped_at = Some(ctx.now);
            self.launched = true;
        }
    }

    fn start_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        self.charge_fx = ctx.spawn(0, EffectAnchor::Entity(ctx.actor));
        Conclusion::Continue
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

    fn on_stopped_charging_up_client(&mut self, ctx: &mut ClientContext<'_>, _percent: f32) {
        self.stopped_at_client.get_or_insert(ctx.now);
        ctx.shutdown(&mut self.charge_fx);
    }

    fn cancel_client(&mut self, ctx: &mut ClientContext<'_>) {
        ctx.shutdown(&mut self.charge_fx);
    }
}
