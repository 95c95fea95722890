//! Observer-side action player.
//!
//! Mirrors authoritative broadcasts for one actor. On the owning client it
//! can also start an instance ahead of confirmation ("anticipation") so the
//! actor reacts to input without waiting a round trip.

use std::sync::Arc;

use crate::action::{
    ActionBehavior, ActionInstance, ActionLogic, ActionRequestData, ClientContext, Conclusion,
    InstancePhase,
};
use crate::config::EngineConfig;
use crate::env::{ActionOracle, ClientHost};
use crate::state::{ActionId, EntityId, InstanceId};

const LOG_TARGET: &str = "engine::client";

pub struct VisualizationActionPlayer {
    actor: EntityId,
    is_owner: bool,
    catalog: Arc<dyn ActionOracle>,
    engine: Arc<EngineConfig>,
    clock: f32,
    next_instance: InstanceId,
    playing: Vec<ActionInstance>,
}

impl VisualizationActionPlayer {
    pub fn new(
        actor: EntityId,
        is_owner: bool,
        catalog: Arc<dyn ActionOracle>,
        engine: Arc<EngineConfig>,
    ) -> Self {
        Self {
            actor,
            is_owner,
            catalog,
            engine,
            clock: 0.0,
            next_instance: InstanceId::default(),
            playing: Vec::new(),
        }
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn playing(&self) -> &[ActionInstance] {
        &self.playing
    }

    pub fn is_playing(&self, action: ActionId) -> bool {
        self.playing
            .iter()
            .any(|instance| !instance.anticipated && instance.action_id() == action)
    }

    pub fn is_anticipating(&self, action: ActionId) -> bool {
        self.playing
            .iter()
            .any(|instance| instance.anticipated && instance.action_id() == action)
    }

    /// True if the owning client may show `request` before the server
    /// confirms it.
    ///
    /// Target actions never anticipate, and a closing request only does when
    /// its target is already in range (otherwise the server chases first).
    pub fn should_anticipate(&self, request: &ActionRequestData, host: &dyn ClientHost) -> bool {
        if !self.is_owner {
            return false;
        }
        let Some(actor) = host.resolve(self.actor) else {
            return false;
        };
        if !actor.life_state.is_alive() {
            return false;
        }
        let Some(config) = self.catalog.action_config(request.action_id) else {
            return false;
        };
        if config.logic == ActionLogic::Target {
            return false;
        }
        if request.should_close {
            return request
                .primary_target()
                .and_then(|target| host.resolve(target))
                .is_some_and(|target| actor.distance_to(target.position) <= config.range);
        }
        true
    }

    /// Starts an anticipated instance. Returns false when anticipation is not
    /// allowed for this request.
    pub fn anticipate_action(&mut self, request: ActionRequestData, host: &mut dyn ClientHost) -> bool {
        if !self.should_anticipate(&request, host) {
            return false;
        }
        let Some(config) = self.catalog.action_config(request.action_id) else {
            return false;
        };

        let mut instance = ActionInstance::new(self.allocate_instance(), request, config, self.clock);
        instance.anticipated = true;
        instance.advance(InstancePhase::Started);

        let conclusion = self.run_hook(&mut instance, host, |behavior, ctx| {
            let config = ctx.config;
            let actor = ctx.actor;
            ctx.set_trigger(actor, &config.anim_anticipation);
            behavior.start_client(ctx)
        });
        tracing::trace!(target: LOG_TARGET, actor = %self.actor, action = %instance.action_id(), "anticipating");
        self.settle(instance, conclusion, host);
        true
    }

    /// Applies an authoritative play event.
    ///
    /// A matching anticipated instance is confirmed in place and keeps
    /// running; otherwise a fresh instance starts.
    pub fn play_action(&mut self, request: ActionRequestData, host: &mut dyn ClientHost) {
        if let Some(instance) = self
            .playing
            .iter_mut()
            .find(|instance| instance.anticipated && instance.action_id() == request.action_id)
        {
            instance.request = request;
            instance.anticipated = false;
            instance.time_started = self.clock;
            tracing::trace!(target: LOG_TARGET, actor = %self.actor, action = %instance.action_id(), "anticipation confirmed");
            return;
        }

        let Some(config) = self.catalog.action_config(request.action_id) else {
            tracing::warn!(target: LOG_TARGET, actor = %self.actor, action = %request.action_id, "play event for unknown action");
            return;
        };

        let mut instance = ActionInstance::new(self.allocate_instance(), request, config, self.clock);
        instance.advance(InstancePhase::Started);
        let conclusion = self.run_hook(&mut instance, host, |behavior, ctx| behavior.start_client(ctx));
        self.settle(instance, conclusion, host);
    }

    /// Cancels every instance, anticipated ones included.
    pub fn cancel_all_actions(&mut self, host: &mut dyn ClientHost) {
        for instance in std::mem::take(&mut self.playing) {
            self.cancel_instance(instance, host);
        }
    }

    /// Cancels confirmed instances of `action`. Anticipated instances survive
    /// so that a cancel for an earlier use does not kill fresh input.
    pub fn cancel_all_actions_with_same_prototype_id(
        &mut self,
        action: ActionId,
        host: &mut dyn ClientHost,
    ) {
        let (cancelled, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.playing)
            .into_iter()
            .partition(|instance| !instance.anticipated && instance.action_id() == action);
        self.playing = kept;
        for instance in cancelled {
            self.cancel_instance(instance, host);
        }
    }

    pub fn on_stopped_charging_up(&mut self, percent: f32, host: &mut dyn ClientHost) {
        self.visit(host, |behavior, ctx| {
            behavior.on_stopped_charging_up_client(ctx, percent)
        });
    }

    /// Forwards a named animation event to every instance.
    pub fn on_anim_event(&mut self, event: &str, host: &mut dyn ClientHost) {
        self.visit(host, |behavior, ctx| behavior.on_anim_event_client(ctx, event));
    }

    /// Advances the clock and steps every instance.
    ///
    /// Anticipated instances are not updated; they only time out.
    pub fn on_update(&mut self, dt: f32, host: &mut dyn ClientHost) {
        self.clock += dt;
        let timeout = self.engine.anticipation_timeout;

        for mut instance in std::mem::take(&mut self.playing) {
            if instance.anticipated {
                if self.clock - instance.time_started >= timeout {
                    tracing::debug!(target: LOG_TARGET, actor = %self.actor, action = %instance.action_id(), "anticipation timed out");
                    self.cancel_instance(instance, host);
                } else {
                    self.playing.push(instance);
                }
                continue;
            }

            let conclusion = self.run_hook(&mut instance, host, |behavior, ctx| behavior.update_client(ctx));
            match conclusion {
                Conclusion::Continue if !instance.is_expired(self.clock) => self.playing.push(instance),
                Conclusion::Cancel => self.cancel_instance(instance, host),
                _ => self.end_instance(instance, host),
            }
        }
    }

    fn settle(&mut self, mut instance: ActionInstance, conclusion: Conclusion, host: &mut dyn ClientHost) {
        match conclusion {
            Conclusion::Continue => {
                instance.advance(InstancePhase::Running);
                self.playing.push(instance);
            }
            Conclusion::Stop => self.end_instance(instance, host),
            Conclusion::Cancel => self.cancel_instance(instance, host),
        }
    }

    fn end_instance(&mut self, mut instance: ActionInstance, host: &mut dyn ClientHost) {
        instance.advance(InstancePhase::Ending);
        self.run_hook(&mut instance, host, |behavior, ctx| behavior.end_client(ctx));
        instance.advance(InstancePhase::Disposed);
    }

    fn cancel_instance(&mut self, mut instance: ActionInstance, host: &mut dyn ClientHost) {
        instance.advance(InstancePhase::Cancelling);
        self.run_hook(&mut instance, host, |behavior, ctx| behavior.cancel_client(ctx));
        instance.advance(InstancePhase::Disposed);
    }

    fn visit(
        &mut self,
        host: &mut dyn ClientHost,
        mut visit: impl FnMut(&mut dyn ActionBehavior, &mut ClientContext<'_>),
    ) {
        let mut playing = std::mem::take(&mut self.playing);
        for instance in &mut playing {
            self.run_hook(instance, host, &mut visit);
        }
        self.playing = playing;
    }

    fn run_hook<R>(
        &self,
        instance: &mut ActionInstance,
        host: &mut dyn ClientHost,
        hook: impl FnOnce(&mut dyn ActionBehavior, &mut ClientContext<'_>) -> R,
    ) -> R {
        let ActionInstance {
            request,
            config,
            time_started,
            anticipated,
            behavior,
            ..
        } = instance;

        let mut ctx = ClientContext {
            actor: self.actor,
            is_owner: self.is_owner,
            anticipated: *anticipated,
            now: self.clock,
            time_started: *time_started,
            request,
            config: &**config,
            engine: self.engine.as_ref(),
            host: &mut *host,
        };
        hook(behavior.as_mut(), &mut ctx)
    }

    fn allocate_instance(&mut self) -> InstanceId {
        self.next_instance = self.next_instance.next();
        self.next_instance
    }
}

impl std::fmt::Debug for VisualizationActionPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualizationActionPlayer")
            .field("actor", &self.actor)
            .field("is_owner", &self.is_owner)
            .field("clock", &self.clock)
            .field("playing", &self.playing)
            .finish()
    }
}

#[cfg(test)]
mod tests;
