use glam::Vec3;

use crate::action::{
    ActionBehavior, ActionError, ActionRequestData, ClientContext, Conclusion, ProjectileInfo,
    ServerContext,
};
use crate::env::{EffectHandle, EntityInfo, LineOfSight, ServerHost};
use crate::state::EntityId;

/// Always-hit beam: damage lands after the wind-up plus the time a projectile
/// would need to fly to the target.
///
/// When the line of sight is blocked, the request is rewritten to aim at the
/// obstruction with no target, so every observer renders the same miss.
#[derive(Debug, Default)]
pub struct FxBeam {
    impact_target: Option<EntityId>,
    time_until_impact: f32,
    damage: f32,
    did_damage: bool,
    fx: Option<EffectHandle>,
    launched_fx: bool,
}

fn beam_projectile(config_projectiles: &[ProjectileInfo]) -> Option<&ProjectileInfo> {
    config_projectiles.first()
}

/// Resolves the primary target, rewriting the request on an obstructed shot.
fn resolve_beam_target(
    host: &dyn ServerHost,
    actor: &EntityInfo,
    friendly: bool,
    request: &mut ActionRequestData,
) -> Option<EntityId> {
    let id = request.primary_target()?;
    let Some(target) = host.resolve(id) else {
        tracing::warn!(target: "engine::beam", actor = %actor.id, %id, "beam target not found");
        return None;
    };

    if let LineOfSight::Blocked(point) = host.line_of_sight(actor.position, target.position) {
        request.clear_targets();
        request.position = point;
        return None;
    }

    let wanted = actor.faction.affected_by(friendly);
    (wanted.is_none() || wanted == Some(target.faction)).then_some(id)
}

impl ActionBehavior for FxBeam {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        let action = config.id;
        let info = beam_projectile(&config.projectiles)
            .ok_or(ActionError::MissingProjectile { action })?;
        if info.speed <= 0.0 {
            return Err(ActionError::ProjectileMisconfigured { action });
        }
        let actor = ctx
            .actor_info()
            .ok_or(ActionError::ActorNotFound(ctx.actor))?;

        self.impact_target =
            resolve_beam_target(&*ctx.host, &actor, config.is_friendly, ctx.request);
        let impact_position = self
            .impact_target
            .and_then(|id| ctx.host.resolve(id))
            .map_or(ctx.request.position, |t| t.position);

        self.time_until_impact =
            config.exec_time_seconds + actor.position.distance(impact_position) / info.speed;
        self.damage = info.damage;

        ctx.face_towards(impact_position);
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        if !self.did_damage && ctx.time_running() >= self.time_until_impact {
            self.did_damage = true;
            if let Some(target) = self.impact_target.filter(|t| ctx.host.contains(*t)) {
                ctx.damage(target, self.damage);
            }
        }
        Conclusion::Continue
    }

    fn update_client(&mut self, ctx: &mut ClientContext<'_>) -> Conclusion {
        if self.launched_fx || ctx.time_running() < ctx.config.exec_time_seconds {
            return Conclusion::Continue;
        }
        self.launched_fx = true;

        let config = ctx.config;
        let (Some(info), Some(actor)) = (beam_projectile(&config.projectiles), ctx.actor_info())
        else {
            return Conclusion::Continue;
        };
        let to: Vec3 = ctx
            .primary_target()
            .map_or(ctx.request.position, |t| t.position);
        let flight_time = if info.speed > 0.0 {
            actor.position.distance(to) / info.speed
        } else {
            0.0
        };
        self.fx = Some(
            ctx.host
                .launch_fx_projectile(info, actor.position, to, flight_time),
        );
        Conclusion::Continue
    }

    /// The visual projectile is left to finish its flight.
    fn end_client(&mut self, _ctx: &mut ClientContext<'_>) {}

    fn cancel_client(&mut self, ctx: &mut ClientContext<'_>) {
        ctx.shutdown(&mut self.fx);
    }
}
