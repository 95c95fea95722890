//! Server-authoritative action player.
//!
//! One player per actor. It enforces the blocking-slot invariant, queues and
//! interrupts, synthesizes chase and target instances, drives every hook, and
//! records the broadcasts observers need.
//!
//! Instances are always taken out of the player's lists before a hook runs on
//! them. Anything a hook asks of the player itself is queued as a
//! [`PlayerCommand`] and applied after the hook returns, so a hook can never
//! observe the player half-mutated.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::action::{
    ActionBehavior, ActionConfig, ActionError, ActionInstance, ActionLogic, ActionRequestData,
    BuffableValue, Conclusion, GameplayActivity, InstancePhase, InstanceView, PlayError,
    PlayerCommand, ServerContext,
};
use crate::config::EngineConfig;
use crate::engine::Broadcast;
use crate::env::{ActionOracle, PcgRng, RngOracle, ServerHost};
use crate::error::GameError;
use crate::state::{ActionId, EntityId, InstanceId, ReplicatedActorState};

const LOG_TARGET: &str = "engine::server";

/// Result of an accepted [`AuthoritativeActionPlayer::play`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// An instance is now running.
    Started(InstanceId),
    /// The request waits in the pending queue.
    Queued,
    /// The instance started and concluded within the same call.
    Completed,
}

pub struct AuthoritativeActionPlayer {
    actor: EntityId,
    catalog: Arc<dyn ActionOracle>,
    engine: Arc<EngineConfig>,
    rng: Arc<dyn RngOracle>,
    rng_seed: u64,
    rng_nonce: u64,

    clock: f32,
    next_instance: InstanceId,

    blocking: Option<ActionInstance>,
    non_blocking: Vec<ActionInstance>,
    pending: VecDeque<ActionRequestData>,
    /// Follow-ups nominated by ending instances; started before `pending`.
    chained: VecDeque<ActionRequestData>,
    last_used: HashMap<ActionId, f32>,

    state: ReplicatedActorState,
    commands: Vec<PlayerCommand>,
    outbox: Vec<Broadcast>,
}

impl AuthoritativeActionPlayer {
    pub fn new(actor: EntityId, catalog: Arc<dyn ActionOracle>, engine: Arc<EngineConfig>) -> Self {
        Self {
            actor,
            catalog,
            engine,
            rng: Arc::new(PcgRng),
            rng_seed: u64::from(actor.0),
            rng_nonce: 0,
            clock: 0.0,
            next_instance: InstanceId::default(),
            blocking: None,
            non_blocking: Vec::new(),
            pending: VecDeque::new(),
            chained: VecDeque::new(),
            last_used: HashMap::new(),
            state: ReplicatedActorState::default(),
            commands: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Replaces the random source and session seed used by variants.
    pub fn with_rng(mut self, rng: Arc<dyn RngOracle>, session_seed: u64) -> Self {
        self.rng = rng;
        self.rng_seed = session_seed;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    /// Seconds accumulated through [`update`](Self::update).
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn state(&self) -> &ReplicatedActorState {
        &self.state
    }

    pub fn running_action_count(&self) -> usize {
        usize::from(self.blocking.is_some()) + self.non_blocking.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Request of the instance holding the blocking slot.
    pub fn active_request(&self) -> Option<&ActionRequestData> {
        self.blocking.as_ref().map(ActionInstance::request)
    }

    pub fn blocking_instance(&self) -> Option<&ActionInstance> {
        self.blocking.as_ref()
    }

    /// Every running instance, blocking slot first.
    pub fn instances(&self) -> impl Iterator<Item = &ActionInstance> {
        self.blocking.iter().chain(self.non_blocking.iter())
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances().map(ActionInstance::id).collect()
    }

    pub fn is_running(&self, action: ActionId) -> bool {
        self.instances().any(|instance| instance.action_id() == action)
    }

    /// True if `config` is off cooldown at the current clock.
    pub fn is_reuse_time_elapsed(&self, config: &ActionConfig) -> bool {
        match self.last_used.get(&config.id) {
            Some(&used) if config.reuse_time_seconds > 0.0 => {
                self.clock - used >= config.reuse_time_seconds
            }
            _ => true,
        }
    }

    /// Seconds of blocking time ahead of a newly queued request.
    pub fn queue_time_depth(&self) -> f32 {
        let remaining = self.blocking.as_ref().map_or(0.0, |active| {
            (active.config.blocking_duration() - (self.clock - active.time_started)).max(0.0)
        });
        let queued: f32 = self
            .pending
            .iter()
            .filter_map(|request| self.catalog.action_config(request.action_id))
            .map(|config| config.blocking_duration())
            .sum();
        remaining + queued
    }

    /// Folds every running instance's contribution into the unbuffed value.
    pub fn get_buffed_value(&self, kind: BuffableValue) -> f32 {
        self.instances()
            .filter_map(|instance| {
                instance
                    .behavior
                    .buff_value(kind, &instance.view(self.clock))
            })
            .fold(kind.unbuffed(), |acc, value| kind.combine(acc, value))
    }

    /// Takes the broadcasts recorded since the last drain, in order.
    pub fn drain_broadcasts(&mut self) -> Vec<Broadcast> {
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Submits a request.
    ///
    /// Non-blocking configs start immediately. A blocking config starts if the
    /// slot is free, interrupts an interruptible active instance, or queues
    /// when `should_queue` is set and the queue is not too deep.
    pub fn play(
        &mut self,
        request: ActionRequestData,
        host: &mut dyn ServerHost,
    ) -> Result<PlayOutcome, PlayError> {
        let result = self.admit(request, host);
        if let Err(err) = &result {
            tracing::debug!(target: LOG_TARGET, actor = %self.actor, error = %err, "request rejected");
        }
        self.flush(host);
        result
    }

    fn admit(
        &mut self,
        request: ActionRequestData,
        host: &mut dyn ServerHost,
    ) -> Result<PlayOutcome, PlayError> {
        self.ensure_can_act(host)?;
        if request.cancel_movement {
            host.cancel_move(self.actor);
        }

        let config = self.lookup(request.action_id)?;
        if !self.is_reuse_time_elapsed(&config) {
            return Err(PlayError::OnCooldown(request.action_id));
        }
        if !config.is_blocking() {
            return self.start_request(request, config, host);
        }

        let Some(active) = &self.blocking else {
            return self.start_request(request, config, host);
        };
        if active.config.can_be_interrupted_by(request.action_id) {
            tracing::debug!(
                target: LOG_TARGET,
                actor = %self.actor,
                interrupted = %active.action_id(),
                by = %request.action_id,
                "interrupting active action"
            );
            self.clear_actions(false, host);
            return self.start_request(request, config, host);
        }
        if !request.should_queue {
            return Err(PlayError::SlotOccupied(active.action_id()));
        }

        let depth = self.queue_time_depth();
        if depth >= self.engine.max_queue_time_depth {
            tracing::trace!(target: LOG_TARGET, actor = %self.actor, depth, "queue too deep");
            return Err(PlayError::QueueDepthExceeded(request.action_id));
        }
        self.pending.push_back(request);
        Ok(PlayOutcome::Queued)
    }

    /// Moves the actor, interrupting interruptible work and dropping its
    /// target.
    pub fn request_move(
        &mut self,
        destination: glam::Vec3,
        host: &mut dyn ServerHost,
    ) -> Result<(), PlayError> {
        self.ensure_can_act(host)?;
        if self
            .blocking
            .as_ref()
            .is_some_and(|active| active.config.action_interruptible)
        {
            self.clear_actions(false, host);
        }
        self.commands.push(PlayerCommand::CancelByLogic {
            logic: ActionLogic::Target,
            except: None,
        });
        self.flush(host);
        host.set_movement_target(self.actor, destination);
        Ok(())
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the clock by `dt` and steps every running instance.
    ///
    /// The blocking instance goes first, then non-blocking instances in start
    /// order, then chained and pending requests fill the blocking slot.
    pub fn update(&mut self, dt: f32, host: &mut dyn ServerHost) {
        self.clock += dt;

        if let Some(mut active) = self.blocking.take() {
            if active.behavior.should_become_non_blocking(&active.view(self.clock)) {
                tracing::trace!(target: LOG_TARGET, actor = %self.actor, action = %active.action_id(), "released blocking slot");
                self.non_blocking.push(active);
            } else {
                match self.step(&mut active, host) {
                    Conclusion::Continue => self.blocking = Some(active),
                    Conclusion::Stop => self.finish(active, host),
                    Conclusion::Cancel => self.abort(active, host, true),
                }
            }
            self.apply_commands(host);
        }

        let ids: Vec<InstanceId> = self.non_blocking.iter().map(ActionInstance::id).collect();
        for id in ids {
            let Some(index) = self.non_blocking.iter().position(|i| i.id == id) else {
                continue;
            };
            let mut instance = self.non_blocking.remove(index);
            match self.step(&mut instance, host) {
                Conclusion::Continue => {
                    let index = index.min(self.non_blocking.len());
                    self.non_blocking.insert(index, instance);
                }
                Conclusion::Stop => self.finish(instance, host),
                Conclusion::Cancel => self.abort(instance, host, true),
            }
            self.apply_commands(host);
        }

        self.flush(host);
    }

    fn step(&mut self, instance: &mut ActionInstance, host: &mut dyn ServerHost) -> Conclusion {
        let conclusion = self.run_hook(instance, host, |behavior, ctx| behavior.update(ctx));
        if conclusion == Conclusion::Continue && instance.is_expired(self.clock) {
            Conclusion::Stop
        } else {
            conclusion
        }
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Cancels one instance. Returns false if it is not running.
    pub fn cancel(&mut self, id: InstanceId, host: &mut dyn ServerHost) -> bool {
        let cancelled = self.cancel_where(|instance| instance.id == id, true, host);
        self.flush(host);
        cancelled > 0
    }

    /// Cancels every running instance of `action`. Returns how many ran.
    pub fn cancel_by_prototype(&mut self, action: ActionId, host: &mut dyn ServerHost) -> usize {
        let cancelled = self.cancel_where(|instance| instance.action_id() == action, false, host);
        if cancelled > 0 {
            self.outbox.push(Broadcast::CancelActionsByPrototype(action));
        }
        self.flush(host);
        cancelled
    }

    /// Cancels everything, running and pending.
    pub fn cancel_all(&mut self, host: &mut dyn ServerHost) {
        self.clear_actions(true, host);
        self.flush(host);
    }

    /// Stops the actor's work after it fainted or died, dropping anything
    /// held.
    pub fn on_incapacitated(&mut self, host: &mut dyn ServerHost) {
        tracing::debug!(target: LOG_TARGET, actor = %self.actor, "incapacitated");
        self.cancel_all(host);
        if let Some(held) = self.state.held_object.take() {
            host.detach(self.actor, held);
            self.outbox.push(Broadcast::StateChanged(self.state));
        }
    }

    /// Cancels the blocking instance and drops pending requests. With
    /// `cancel_non_blocking`, every non-blocking instance goes too.
    fn clear_actions(&mut self, cancel_non_blocking: bool, host: &mut dyn ServerHost) {
        self.pending.clear();
        self.chained.clear();
        if let Some(active) = self.blocking.take() {
            self.abort(active, host, !cancel_non_blocking);
        }
        if cancel_non_blocking {
            for instance in std::mem::take(&mut self.non_blocking) {
                self.abort(instance, host, false);
            }
            self.outbox.push(Broadcast::CancelAllActions);
        }
        self.apply_commands(host);
    }

    /// Takes every running instance matching `predicate` out and cancels it.
    fn cancel_where(
        &mut self,
        predicate: impl Fn(&ActionInstance) -> bool,
        broadcast: bool,
        host: &mut dyn ServerHost,
    ) -> usize {
        let mut victims = Vec::new();
        if let Some(active) = self.blocking.take_if(|active| predicate(active)) {
            victims.push(active);
        }
        let (cancelled, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.non_blocking)
            .into_iter()
            .partition(|instance| predicate(instance));
        self.non_blocking = kept;
        victims.extend(cancelled);

        let count = victims.len();
        for instance in victims {
            self.abort(instance, host, broadcast);
        }
        count
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Forwards a gameplay activity to every running instance.
    pub fn notify_gameplay_activity(
        &mut self,
        activity: GameplayActivity,
        host: &mut dyn ServerHost,
    ) {
        self.visit_running(host, |behavior, ctx| {
            behavior.on_gameplay_activity(ctx, activity)
        });
        self.flush(host);
    }

    /// Forwards a physics contact to every running instance.
    pub fn collision_entered(&mut self, other: EntityId, host: &mut dyn ServerHost) {
        self.visit_running(host, |behavior, ctx| behavior.collision_entered(ctx, other));
        self.flush(host);
    }

    fn visit_running(
        &mut self,
        host: &mut dyn ServerHost,
        mut visit: impl FnMut(&mut dyn ActionBehavior, &mut ServerContext<'_>),
    ) {
        if let Some(mut active) = self.blocking.take() {
            self.run_hook(&mut active, host, &mut visit);
            self.blocking = Some(active);
            self.apply_commands(host);
        }

        let ids: Vec<InstanceId> = self.non_blocking.iter().map(ActionInstance::id).collect();
        for id in ids {
            let Some(index) = self.non_blocking.iter().position(|i| i.id == id) else {
                continue;
            };
            let mut instance = self.non_blocking.remove(index);
            self.run_hook(&mut instance, host, &mut visit);
            let index = index.min(self.non_blocking.len());
            self.non_blocking.insert(index, instance);
            self.apply_commands(host);
        }
    }

    // ========================================================================
    // Instance lifecycle
    // ========================================================================

    fn start_request(
        &mut self,
        mut request: ActionRequestData,
        config: Arc<ActionConfig>,
        host: &mut dyn ServerHost,
    ) -> Result<PlayOutcome, PlayError> {
        self.synthesize_target(&request, &config, host);

        if let Some(chase) = self.synthesize_chase(&mut request, &config, host) {
            let chase_config = self.lookup(chase.action_id)?;
            tracing::debug!(
                target: LOG_TARGET,
                actor = %self.actor,
                action = %request.action_id,
                "closing distance before acting"
            );
            self.pending.push_front(request);
            return self.launch(chase, chase_config, host);
        }

        self.launch(request, config, host)
    }

    /// Starts a target instance when a blocking request names a single new
    /// target.
    fn synthesize_target(
        &mut self,
        request: &ActionRequestData,
        config: &ActionConfig,
        host: &mut dyn ServerHost,
    ) {
        let Some(target_action) = self.engine.prototypes.target else {
            return;
        };
        if config.logic == ActionLogic::Target
            || !config.is_blocking()
            || request.target_ids.len() != 1
        {
            return;
        }
        let Some(target) = request.primary_target() else {
            return;
        };
        if self.state.target == Some(target) {
            return;
        }
        let Some(target_config) = self.catalog.action_config(target_action) else {
            return;
        };

        let target_request = ActionRequestData::new(target_action).with_target(target);
        if let Err(err) = self.launch(target_request, target_config, host) {
            tracing::debug!(target: LOG_TARGET, actor = %self.actor, error = %err, "target synthesis failed");
        }
    }

    /// Returns a chase request when the request must close distance first.
    /// Clears `should_close` on the original either way.
    fn synthesize_chase(
        &self,
        request: &mut ActionRequestData,
        config: &ActionConfig,
        host: &dyn ServerHost,
    ) -> Option<ActionRequestData> {
        if !request.should_close {
            return None;
        }
        request.should_close = false;

        let chase_action = self.engine.prototypes.chase?;
        let target = request.primary_target()?;
        let actor = host.resolve(self.actor)?;
        let in_range = host
            .resolve(target)
            .is_some_and(|info| actor.distance_to(info.position) <= config.range);
        if in_range {
            return None;
        }

        Some(
            ActionRequestData::new(chase_action)
                .with_target(target)
                .with_amount(config.range),
        )
    }

    fn launch(
        &mut self,
        request: ActionRequestData,
        config: Arc<ActionConfig>,
        host: &mut dyn ServerHost,
    ) -> Result<PlayOutcome, PlayError> {
        if config.is_blocking() {
            if let Some(active) = &self.blocking {
                return Err(PlayError::SlotOccupied(active.action_id()));
            }
        }

        let action = request.action_id;
        let id = self.allocate_instance();
        let mut instance = ActionInstance::new(id, request, config, self.clock);

        match self.run_hook(&mut instance, host, |behavior, ctx| behavior.start(ctx)) {
            Err(source) => {
                self.log_start_failure(action, &source);
                instance.advance(InstancePhase::Disposed);
                self.apply_commands(host);
                Err(PlayError::StartFailed { action, source })
            }
            Ok(conclusion) => {
                instance.advance(InstancePhase::Started);
                self.last_used.insert(action, self.clock);
                self.apply_commands(host);
                self.outbox
                    .push(Broadcast::PlayAction(instance.request.clone()));
                tracing::debug!(
                    target: LOG_TARGET,
                    actor = %self.actor,
                    action = %action,
                    instance = %id,
                    logic = %instance.config.logic,
                    "action started"
                );

                match conclusion {
                    Conclusion::Continue => {
                        instance.advance(InstancePhase::Running);
                        if instance.config.is_blocking() {
                            self.blocking = Some(instance);
                        } else {
                            self.non_blocking.push(instance);
                        }
                        Ok(PlayOutcome::Started(id))
                    }
                    Conclusion::Stop => {
                        self.finish(instance, host);
                        Ok(PlayOutcome::Completed)
                    }
                    Conclusion::Cancel => {
                        self.abort(instance, host, true);
                        Ok(PlayOutcome::Completed)
                    }
                }
            }
        }
    }

    fn log_start_failure(&self, action: ActionId, err: &ActionError) {
        if err.severity().is_internal() {
            tracing::error!(
                target: LOG_TARGET,
                actor = %self.actor,
                action = %action,
                code = err.error_code(),
                error = %err,
                "action content is misconfigured"
            );
        } else {
            tracing::warn!(
                target: LOG_TARGET,
                actor = %self.actor,
                action = %action,
                code = err.error_code(),
                error = %err,
                "action failed to start"
            );
        }
    }

    /// Ends an instance normally and queues its follow-up, if any.
    fn finish(&mut self, mut instance: ActionInstance, host: &mut dyn ServerHost) {
        instance.advance(InstancePhase::Ending);
        self.run_hook(&mut instance, host, |behavior, ctx| behavior.end(ctx));
        let ActionInstance {
            request,
            config,
            time_started,
            behavior,
            ..
        } = &mut instance;
        let view = InstanceView {
            request: &*request,
            config: &**config,
            time_started: *time_started,
            now: self.clock,
        };
        let follow_up = behavior.chain_into_new_action(&view);
        instance.advance(InstancePhase::Disposed);
        tracing::trace!(target: LOG_TARGET, actor = %self.actor, action = %instance.action_id(), "action ended");

        if let Some(next) = follow_up {
            self.chained.push_back(next);
        }
    }

    /// Cancels an instance and forgets its cooldown.
    fn abort(&mut self, mut instance: ActionInstance, host: &mut dyn ServerHost, broadcast: bool) {
        instance.advance(InstancePhase::Cancelling);
        self.run_hook(&mut instance, host, |behavior, ctx| behavior.cancel(ctx));
        instance.advance(InstancePhase::Disposed);

        let action = instance.action_id();
        self.last_used.remove(&action);
        if broadcast {
            self.outbox.push(Broadcast::CancelActionsByPrototype(action));
        }
        tracing::trace!(target: LOG_TARGET, actor = %self.actor, action = %action, "action cancelled");
    }

    fn run_hook<R>(
        &mut self,
        instance: &mut ActionInstance,
        host: &mut dyn ServerHost,
        hook: impl FnOnce(&mut dyn ActionBehavior, &mut ServerContext<'_>) -> R,
    ) -> R {
        let running_actions = self.running_action_count() + 1;
        let ActionInstance {
            id,
            request,
            config,
            time_started,
            behavior,
            ..
        } = instance;

        let mut ctx = ServerContext {
            actor: self.actor,
            instance: *id,
            now: self.clock,
            time_started: *time_started,
            request,
            config: &**config,
            engine: self.engine.as_ref(),
            host: &mut *host,
            state: &mut self.state,
            running_actions,
            rng: self.rng.as_ref(),
            rng_seed: self.rng_seed,
            rng_nonce: &mut self.rng_nonce,
            commands: &mut self.commands,
        };
        hook(behavior.as_mut(), &mut ctx)
    }

    // ========================================================================
    // Command processing
    // ========================================================================

    fn apply_commands(&mut self, host: &mut dyn ServerHost) {
        while !self.commands.is_empty() {
            for command in std::mem::take(&mut self.commands) {
                match command {
                    PlayerCommand::Broadcast(event) => self.outbox.push(event),
                    PlayerCommand::PublishState => {
                        self.outbox.push(Broadcast::StateChanged(self.state));
                    }
                    PlayerCommand::SetTarget(target) => {
                        self.state.target = target;
                        self.outbox.push(Broadcast::StateChanged(self.state));
                    }
                    PlayerCommand::CancelOtherActions { except } => {
                        self.pending.clear();
                        self.cancel_where(|instance| instance.id != except, false, host);
                    }
                    PlayerCommand::CancelByLogic { logic, except } => {
                        self.cancel_where(
                            |instance| {
                                instance.config.logic == logic && Some(instance.id) != except
                            },
                            true,
                            host,
                        );
                    }
                }
            }
        }
    }

    /// Applies queued commands, then starts chained and pending requests
    /// while the blocking slot is free.
    fn flush(&mut self, host: &mut dyn ServerHost) {
        self.apply_commands(host);

        while let Some(next) = self.chained.pop_front() {
            if let Err(err) = self.admit(next, host) {
                tracing::debug!(target: LOG_TARGET, actor = %self.actor, error = %err, "chained request dropped");
            }
            self.apply_commands(host);
        }

        while self.blocking.is_none() {
            let Some(next) = self.pending.pop_front() else {
                break;
            };
            if let Err(err) = self.start_pending(next, host) {
                tracing::debug!(target: LOG_TARGET, actor = %self.actor, error = %err, "queued request dropped");
            }
            self.apply_commands(host);
        }
    }

    fn start_pending(
        &mut self,
        request: ActionRequestData,
        host: &mut dyn ServerHost,
    ) -> Result<PlayOutcome, PlayError> {
        let config = self.lookup(request.action_id)?;
        if !self.is_reuse_time_elapsed(&config) {
            return Err(PlayError::OnCooldown(request.action_id));
        }
        self.start_request(request, config, host)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_can_act(&self, host: &dyn ServerHost) -> Result<(), PlayError> {
        let alive = host
            .resolve(self.actor)
            .is_some_and(|info| info.life_state.is_alive());
        if !alive {
            return Err(PlayError::ActorIncapacitated(self.actor));
        }
        if host.is_performing_forced_movement(self.actor) {
            return Err(PlayError::ForcedMovement(self.actor));
        }
        Ok(())
    }

    fn lookup(&self, action: ActionId) -> Result<Arc<ActionConfig>, PlayError> {
        self.catalog
            .action_config(action)
            .ok_or(PlayError::UnknownAction(action))
    }

    fn allocate_instance(&mut self) -> InstanceId {
        self.next_instance = self.next_instance.next();
        self.next_instance
    }
}

impl std::fmt::Debug for AuthoritativeActionPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthoritativeActionPlayer")
            .field("actor", &self.actor)
            .field("clock", &self.clock)
            .field("blocking", &self.blocking)
            .field("non_blocking", &self.non_blocking)
            .field("pending", &self.pending.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests;
