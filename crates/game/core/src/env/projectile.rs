use glam::Vec3;

use crate::action::ProjectileInfo;
use crate::state::EntityId;

/// Opaque handle to a spawned projectile owned by the physics subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileHandle(pub u64);

/// Everything needed to spawn one physical projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileLaunch {
    pub owner: EntityId,
    pub info: ProjectileInfo,
    pub origin: Vec3,
    /// Unit flight direction.
    pub direction: Vec3,
    /// Initial impulse; zero for projectiles that fly at `info.speed`.
    pub impulse: Vec3,
    pub torque: Vec3,
}

pub trait ProjectileSpawner {
    fn spawn_projectile(&mut self, launch: ProjectileLaunch) -> ProjectileHandle;
}
