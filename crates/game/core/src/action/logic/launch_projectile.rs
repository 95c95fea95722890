use glam::Vec3;

use crate::action::{
    ActionBehavior, ActionError, Conclusion, ProjectileInfo, ProjectileKind, ServerContext,
};
use crate::env::{ProjectileHandle, ProjectileLaunch};

/// Resolves the config's physical projectile or reports a content fault.
pub(super) fn physical_projectile(ctx: &ServerContext<'_>) -> Result<ProjectileInfo, ActionError> {
    let action = ctx.config.id;
    let info = ctx
        .config
        .projectile(ProjectileKind::Physical)
        .ok_or(ActionError::MissingProjectile { action })?;
    if info.speed <= 0.0 {
        return Err(ActionError::ProjectileMisconfigured { action });
    }
    Ok(info.clone())
}

/// Spawns `info` one meter ahead of the actor along its facing.
pub(super) fn spawn_forward(
    ctx: &mut ServerContext<'_>,
    info: ProjectileInfo,
    impulse: Vec3,
    torque: Vec3,
) -> Option<ProjectileHandle> {
    let actor = ctx.actor_info()?;
    let launch = ProjectileLaunch {
        owner: ctx.actor,
        info,
        origin: actor.position + actor.forward,
        direction: actor.forward,
        impulse,
        torque,
    };
    Some(ctx.host.spawn_projectile(launch))
}

/// Fires one physical projectile when the wind-up completes.
///
/// Once spawned the projectile belongs to the physics subsystem.
#[derive(Debug, Default)]
pub struct LaunchProjectile {
    projectile: Option<ProjectileInfo>,
    launched: bool,
}

impl LaunchProjectile {
    /// Spawns the projectile at most once, whichever path gets here first.
    fn launch(&mut self, ctx: &mut ServerContext<'_>) {
        if self.launched {
            return;
        }
        self.launched = true;
        if let Some(info) = self.projectile.take() {
            spawn_forward(ctx, info, Vec3::ZERO, Vec3::ZERO);
        }
    }
}

impl ActionBehavior for LaunchProjectile {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        self.projectile = Some(physical_projectile(ctx)?);
        ctx.face_request();
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if ctx.time_running() >= ctx.config.exec_time_seconds {
            self.launch(ctx);
        }
        Conclusion::Continue
    }

    fn end(&mut self, ctx: &mut ServerContext<'_>) {
        self.launch(ctx);
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        let config = ctx.config;
        ctx.set_trigger(&config.anim2);
    }
}
