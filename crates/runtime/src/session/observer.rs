//! Client-side session: mirrors the server's broadcasts for every tracked
//! actor and anticipates the owner's own input.

use std::collections::BTreeMap;
use std::sync::Arc;

use action_core::{
    ActionOracle, ActionRequestData, Broadcast, ClientHost, EngineConfig, EntityId,
    ReplicatedActorState, VisualizationActionPlayer,
};

use crate::net::ServerMessage;

const LOG_TARGET: &str = "runtime::observer";

pub struct ObserverSession {
    /// The actor this client controls, if any.
    owner: Option<EntityId>,
    catalog: Arc<dyn ActionOracle>,
    engine: Arc<EngineConfig>,
    players: BTreeMap<EntityId, VisualizationActionPlayer>,
    states: BTreeMap<EntityId, ReplicatedActorState>,
}

impl ObserverSession {
    pub fn new(
        owner: Option<EntityId>,
        catalog: Arc<dyn ActionOracle>,
        engine: Arc<EngineConfig>,
    ) -> Self {
        Self {
            owner,
            catalog,
            engine,
            players: BTreeMap::new(),
            states: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Starts mirroring `actor`. Tracking an actor twice is a no-op.
    pub fn track(&mut self, actor: EntityId) {
        let is_owner = self.owner == Some(actor);
        self.players.entry(actor).or_insert_with(|| {
            VisualizationActionPlayer::new(
                actor,
                is_owner,
                Arc::clone(&self.catalog),
                Arc::clone(&self.engine),
            )
        });
    }

    /// Stops mirroring `actor`, cleaning up its visuals. Later events for it
    /// are ignored.
    pub fn forget(&mut self, actor: EntityId, host: &mut dyn ClientHost) {
        if let Some(mut player) = self.players.remove(&actor) {
            player.cancel_all_actions(host);
        }
        self.states.remove(&actor);
    }

    pub fn player(&self, actor: EntityId) -> Option<&VisualizationActionPlayer> {
        self.players.get(&actor)
    }

    /// Last replicated state received for `actor`.
    pub fn state(&self, actor: EntityId) -> Option<&ReplicatedActorState> {
        self.states.get(&actor)
    }

    /// Applies one server message. Returns false when the actor is not
    /// tracked, in which case nothing happens.
    pub fn apply(&mut self, message: &ServerMessage, host: &mut dyn ClientHost) -> bool {
        let Some(player) = self.players.get_mut(&message.actor) else {
            tracing::trace!(target: LOG_TARGET, actor = %message.actor, "event for untracked actor ignored");
            return false;
        };
        match &message.event {
            Broadcast::PlayAction(request) => player.play_action(request.clone(), host),
            Broadcast::CancelAllActions => player.cancel_all_actions(host),
            Broadcast::CancelActionsByPrototype(action) => {
                player.cancel_all_actions_with_same_prototype_id(*action, host)
            }
            Broadcast::StoppedChargingUp(percent) => player.on_stopped_charging_up(*percent, host),
            Broadcast::StateChanged(state) => {
                self.states.insert(message.actor, *state);
            }
        }
        true
    }

    pub fn apply_all<'m>(
        &mut self,
        messages: impl IntoIterator<Item = &'m ServerMessage>,
        host: &mut dyn ClientHost,
    ) {
        for message in messages {
            self.apply(message, host);
        }
    }

    /// Shows the owner's request before the server confirms it. Returns
    /// false when there is no tracked owner or the request may not be
    /// anticipated.
    pub fn anticipate(&mut self, request: ActionRequestData, host: &mut dyn ClientHost) -> bool {
        let Some(player) = self.owner.and_then(|owner| self.players.get_mut(&owner)) else {
            return false;
        };
        player.anticipate_action(request, host)
    }

    /// Forwards a named animation event for `actor`.
    pub fn anim_event(&mut self, actor: EntityId, event: &str, host: &mut dyn ClientHost) {
        if let Some(player) = self.players.get_mut(&actor) {
            player.on_anim_event(event, host);
        }
    }

    pub fn update(&mut self, dt: f32, host: &mut dyn ClientHost) {
        for player in self.players.values_mut() {
            player.on_update(dt, host);
        }
    }
}

impl std::fmt::Debug for ObserverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSession")
            .field("owner", &self.owner)
            .field("players", &self.players)
            .field("states", &self.states)
            .finish()
    }
}
