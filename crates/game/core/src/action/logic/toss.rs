use glam::Vec3;

use super::launch_projectile::physical_projectile;
use crate::action::{ActionBehavior, ActionError, Conclusion, ProjectileInfo, ServerContext};
use crate::env::ProjectileLaunch;

/// Lobs a physical object with an impulse and a random spin.
#[derive(Debug, Default)]
pub struct Toss {
    projectile: Option<ProjectileInfo>,
    launched: bool,
}

impl Toss {
    fn throw(&mut self, ctx: &mut ServerContext<'_>) {
        if self.launched {
            return;
        }
        self.launched = true;

        let (Some(info), Some(actor)) = (self.projectile.take(), ctx.actor_info()) else {
            return;
        };
        let tuning = ctx.engine.toss;
        let forward = actor.forward;
        let torque = forward * ctx.roll_range(-tuning.max_torque, tuning.max_torque)
            + Vec3::Y * ctx.roll_range(-tuning.max_torque, tuning.max_torque);

        let launch = ProjectileLaunch {
            owner: ctx.actor,
            info,
            origin: actor.position + forward + Vec3::Y * tuning.spawn_height,
            direction: forward,
            impulse: forward * tuning.forward_impulse + Vec3::Y * tuning.upward_impulse,
            torque,
        };
        ctx.host.spawn_projectile(launch);
    }
}

impl ActionBehavior for Toss {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        self.projectile = Some(physical_projectile(ctx)?);
        ctx.face_request();
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if ctx.time_running() >= ctx.config.exec_time_seconds {
            self.throw(ctx);
        }
        Conclusion::Continue
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        self.throw(ctx);
    }
}
