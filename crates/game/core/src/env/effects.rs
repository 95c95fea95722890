use glam::Vec3;

use crate::action::{EffectDescriptor, ProjectileInfo};
use crate::state::EntityId;

/// Opaque handle to a spawned visual effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectHandle(pub u64);

/// Where a visual effect is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectAnchor {
    Entity(EntityId),
    Point(Vec3),
}

/// Visualization-side effect collaborator.
pub trait EffectSpawner {
    fn spawn_effect(&mut self, effect: &EffectDescriptor, anchor: EffectAnchor) -> EffectHandle;

    /// Spawns a purely visual projectile travelling `from` → `to` in
    /// `flight_time` seconds.
    fn launch_fx_projectile(
        &mut self,
        info: &ProjectileInfo,
        from: Vec3,
        to: Vec3,
        flight_time: f32,
    ) -> EffectHandle;

    fn shutdown(&mut self, handle: EffectHandle);
}
