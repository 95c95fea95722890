//! Geometry and timing helpers shared by several variants.

use glam::Vec3;

use crate::env::{EntityInfo, LineOfSight, ServerHost};
use crate::state::EntityId;

/// Fraction of the wind-up spent charging, clamped to `[0, 1]`.
///
/// Charging stops either at `stopped_at` or, while still charging, at `now`.
pub fn percent_charged_up(stopped_at: Option<f32>, now: f32, time_started: f32, exec_time: f32) -> f32 {
    if exec_time <= 0.0 {
        return 1.0;
    }
    let charged_for = stopped_at.unwrap_or(now) - time_started;
    (charged_for / exec_time).clamp(0.0, 1.0)
}

/// When charging ended as far as an observer can tell: at the release it
/// was told about, or at full charge if no release has arrived yet.
pub fn observed_charge_end(
    stopped_at: Option<f32>,
    now: f32,
    time_started: f32,
    exec_time: f32,
) -> Option<f32> {
    let full_at = time_started + exec_time.max(0.0);
    stopped_at.or((now >= full_at).then_some(full_at))
}

/// Where a dash that aims at `target_spot` actually stops.
///
/// Spots that are unset or closer than `very_close_range` become a forward
/// dash of `distance_if_very_close`; the result never exceeds `max_distance`
/// and stops at the first obstruction.
pub fn dash_destination(
    host: &dyn ServerHost,
    actor: &EntityInfo,
    target_spot: Vec3,
    very_close_range: f32,
    distance_if_very_close: f32,
    max_distance: f32,
) -> Vec3 {
    let mut destination = target_spot;
    if destination == Vec3::ZERO || actor.position.distance(destination) <= very_close_range {
        destination = actor.position + actor.forward * distance_if_very_close;
    }

    let distance = actor.position.distance(destination);
    if distance > max_distance {
        destination = actor.position + (destination - actor.position) * (max_distance / distance);
    }

    match host.line_of_sight(actor.position, destination) {
        LineOfSight::Clear => destination,
        LineOfSight::Blocked(point) => point,
    }
}

/// True when `point` lies in the actor's front half-space.
pub fn is_in_front(actor: &EntityInfo, point: Vec3) -> bool {
    let mut to_point = point - actor.position;
    to_point.y = 0.0;
    to_point.length_squared() <= f32::EPSILON || to_point.dot(actor.forward) >= 0.0
}

/// Best melee victim within `range` in front of the actor.
///
/// Prefers `hint` when it is still a candidate, otherwise the nearest one.
pub fn ideal_melee_foe(
    host: &dyn ServerHost,
    actor: &EntityInfo,
    friendly: bool,
    range: f32,
    hint: Option<EntityId>,
) -> Option<EntityId> {
    let faction = actor.faction.affected_by(friendly);
    let candidates: Vec<EntityId> = host
        .overlap_sphere(actor.position, range, faction)
        .into_iter()
        .filter(|id| *id != actor.id)
        .filter(|id| {
            host.resolve(*id)
                .is_some_and(|e| e.life_state.is_alive() && is_in_front(actor, e.position))
        })
        .collect();

    hint.filter(|h| candidates.contains(h))
        .or_else(|| candidates.first().copied())
}
