//! Per-call views handed to variant hooks.
//!
//! A context borrows the instance's request and config plus the owning
//! player's collaborators for the duration of one hook call. Requests that
//! affect the player itself (broadcasts, cancelling sibling instances) are
//! queued as [`PlayerCommand`]s and applied once the hook returns.

use glam::Vec3;

use crate::action::config::trigger;
use crate::action::{ActionConfig, ActionLogic, ActionRequestData, EffectDescriptor};
use crate::config::EngineConfig;
use crate::engine::Broadcast;
use crate::env::{
    ClientHost, EffectAnchor, EffectHandle, EntityInfo, RngOracle, ServerHost, compute_seed,
};
use crate::state::{EntityId, InstanceId, ReplicatedActorState};

/// Read-only view of an instance, for hooks that only inspect timing.
#[derive(Clone, Copy, Debug)]
pub struct InstanceView<'a> {
    pub request: &'a ActionRequestData,
    pub config: &'a ActionConfig,
    pub time_started: f32,
    pub now: f32,
}

impl InstanceView<'_> {
    #[inline]
    pub fn time_running(&self) -> f32 {
        self.now - self.time_started
    }
}

/// Player-level effects requested by a hook.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerCommand {
    Broadcast(Broadcast),
    /// Broadcast the replicated state as it is when the command is applied.
    PublishState,
    /// Replace the actor's target, then publish.
    SetTarget(Option<EntityId>),
    /// Cancel every running instance except `except`, and drop pending requests.
    CancelOtherActions { except: InstanceId },
    /// Cancel running instances with the given logic.
    CancelByLogic {
        logic: ActionLogic,
        except: Option<InstanceId>,
    },
}

/// Context for server-side hooks.
pub struct ServerContext<'a> {
    pub actor: EntityId,
    pub instance: InstanceId,
    pub now: f32,
    pub time_started: f32,
    pub request: &'a mut ActionRequestData,
    pub config: &'a ActionConfig,
    pub engine: &'a EngineConfig,
    pub host: &'a mut dyn ServerHost,
    pub state: &'a mut ReplicatedActorState,
    /// Running instances of the actor, this one included.
    pub running_actions: usize,
    pub(crate) rng: &'a dyn RngOracle,
    pub(crate) rng_seed: u64,
    pub(crate) rng_nonce: &'a mut u64,
    pub(crate) commands: &'a mut Vec<PlayerCommand>,
}

impl ServerContext<'_> {
    #[inline]
    pub fn time_running(&self) -> f32 {
        self.now - self.time_started
    }

    pub fn view(&self) -> InstanceView<'_> {
        InstanceView {
            request: self.request,
            config: self.config,
            time_started: self.time_started,
            now: self.now,
        }
    }

    pub fn actor_info(&self) -> Option<EntityInfo> {
        self.host.resolve(self.actor)
    }

    /// Re-resolves the request's primary target.
    pub fn primary_target(&self) -> Option<EntityInfo> {
        self.request
            .primary_target()
            .and_then(|id| self.host.resolve(id))
    }

    pub fn broadcast(&mut self, event: Broadcast) {
        self.commands.push(PlayerCommand::Broadcast(event));
    }

    /// Announces the replicated state to observers once the hook returns.
    pub fn publish_state(&mut self) {
        self.commands.push(PlayerCommand::PublishState);
    }

    /// Changes the actor's target after sibling cancellations queued earlier
    /// in the same hook have run.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.commands.push(PlayerCommand::SetTarget(target));
    }

    pub fn cancel_other_actions(&mut self) {
        let except = self.instance;
        self.commands
            .push(PlayerCommand::CancelOtherActions { except });
    }

    pub fn cancel_by_logic(&mut self, logic: ActionLogic, exclude_self: bool) {
        let except = exclude_self.then_some(self.instance);
        self.commands
            .push(PlayerCommand::CancelByLogic { logic, except });
    }

    /// Fires an actor animation trigger; empty names are ignored.
    pub fn set_trigger(&mut self, name: &str) {
        if let Some(name) = trigger(name) {
            self.host.set_trigger(self.actor, name);
        }
    }

    pub fn reset_trigger(&mut self, name: &str) {
        if let Some(name) = trigger(name) {
            self.host.reset_trigger(self.actor, name);
        }
    }

    /// Turns the actor toward `point` (ground plane only).
    pub fn face_towards(&mut self, point: Vec3) {
        let Some(actor) = self.actor_info() else {
            return;
        };
        let mut direction = point - actor.position;
        direction.y = 0.0;
        if let Some(direction) = direction.try_normalize() {
            self.host.set_facing(self.actor, direction);
        }
    }

    /// Faces the primary target if it resolves, else the request direction.
    pub fn face_request(&mut self) {
        if let Some(target) = self.primary_target() {
            self.face_towards(target.position);
        } else if let Some(direction) = self.request.direction.try_normalize() {
            self.host.set_facing(self.actor, direction);
        }
    }

    pub fn damage(&mut self, target: EntityId, amount: f32) {
        self.host.receive_hp(self.actor, target, -amount);
    }

    fn next_seed(&mut self) -> u64 {
        let seed = compute_seed(
            self.rng_seed,
            *self.rng_nonce,
            self.actor.0,
            self.instance.0 as u32,
        );
        *self.rng_nonce += 1;
        seed
    }

    /// Deterministic uniform draw in `[0, 1)`.
    pub fn roll_unit(&mut self) -> f32 {
        let seed = self.next_seed();
        self.rng.unit(seed)
    }

    /// Deterministic uniform draw in `[min, max)`.
    pub fn roll_range(&mut self, min: f32, max: f32) -> f32 {
        let seed = self.next_seed();
        self.rng.range_f32(seed, min, max)
    }
}

/// Context for visualization-side hooks.
pub struct ClientContext<'a> {
    pub actor: EntityId,
    /// True on the client that controls this actor.
    pub is_owner: bool,
    /// True until the authoritative play event confirms the instance.
    pub anticipated: bool,
    pub now: f32,
    pub time_started: f32,
    pub request: &'a ActionRequestData,
    pub config: &'a ActionConfig,
    pub engine: &'a EngineConfig,
    pub host: &'a mut dyn ClientHost,
}

impl ClientContext<'_> {
    #[inline]
    pub fn time_running(&self) -> f32 {
        self.now - self.time_started
    }

    pub fn actor_info(&self) -> Option<EntityInfo> {
        self.host.resolve(self.actor)
    }

    pub fn primary_target(&self) -> Option<EntityInfo> {
        self.request
            .primary_target()
            .and_then(|id| self.host.resolve(id))
    }

    pub fn set_trigger(&mut self, entity: EntityId, name: &str) {
        if let Some(name) = trigger(name) {
            self.host.set_trigger(entity, name);
        }
    }

    /// Spawns the config's `index`-th effect, if configured.
    pub fn spawn(&mut self, index: usize, anchor: EffectAnchor) -> Option<EffectHandle> {
        let effect: &EffectDescriptor = self.config.spawns.get(index)?;
        Some(self.host.spawn_effect(effect, anchor))
    }

    /// Shuts down and clears an optional effect handle.
    pub fn shutdown(&mut self, handle: &mut Option<EffectHandle>) {
        if let Some(handle) = handle.take() {
            self.host.shutdown(handle);
        }
    }
}
