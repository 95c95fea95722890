//! Authoritative session: one action player per actor over a shared world.

use std::collections::BTreeMap;
use std::sync::Arc;

use action_core::action::GameplayActivity;
use action_core::env::{Damageable, PcgRng};
use action_core::{
    ActionId, ActionOracle, AuthoritativeActionPlayer, EngineConfig, EntityId, LifeState,
    PlayError, ReplicatedActorState, ServerHost,
};

use super::host::{SessionEvent, SessionHost, own_buffs};
use crate::error::{Result, RuntimeError};
use crate::net::{ClientMessage, ClientRequest, ServerMessage};
use crate::world::{WorldBackend, WorldEvent};

const LOG_TARGET: &str = "runtime::session";

/// Upper bound on follow-up events delivered after one driving call. A
/// notification that keeps producing damage is cut off here.
const MAX_FOLLOW_UPS: usize = 256;

/// Read-only view of one actor for tooling and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    pub actor: EntityId,
    pub state: ReplicatedActorState,
    /// Running prototypes, blocking first.
    pub running: Vec<ActionId>,
    pub pending: usize,
    pub life_state: Option<LifeState>,
}

pub struct ServerSession<W: WorldBackend> {
    world: W,
    catalog: Arc<dyn ActionOracle>,
    engine: Arc<EngineConfig>,
    session_seed: u64,
    players: BTreeMap<EntityId, AuthoritativeActionPlayer>,
    events: Vec<SessionEvent>,
    outbox: Vec<ServerMessage>,
}

impl<W: WorldBackend> ServerSession<W> {
    pub fn new(world: W, catalog: Arc<dyn ActionOracle>, engine: Arc<EngineConfig>) -> Self {
        Self {
            world,
            catalog,
            engine,
            session_seed: 0,
            players: BTreeMap::new(),
            events: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Seed mixed into every actor's random draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.session_seed = seed;
        self
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Gives `actor` an action player. The entity itself must already exist
    /// in the world for its requests to be accepted.
    pub fn add_actor(&mut self, actor: EntityId) -> Result<()> {
        if self.players.contains_key(&actor) {
            return Err(RuntimeError::DuplicateActor(actor));
        }
        let player = AuthoritativeActionPlayer::new(
            actor,
            Arc::clone(&self.catalog),
            Arc::clone(&self.engine),
        )
        .with_rng(Arc::new(PcgRng), self.session_seed ^ u64::from(actor.0));
        self.players.insert(actor, player);
        tracing::debug!(target: LOG_TARGET, %actor, "actor joined");
        Ok(())
    }

    /// Cancels the actor's work and drops its player.
    pub fn remove_actor(&mut self, actor: EntityId) -> bool {
        if self
            .with_player(actor, |player, host| player.cancel_all(host))
            .is_none()
        {
            return false;
        }
        self.players.remove(&actor);
        self.deliver_follow_ups();
        tracing::debug!(target: LOG_TARGET, %actor, "actor left");
        true
    }

    pub fn actors(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.players.keys().copied()
    }

    pub fn player(&self, actor: EntityId) -> Option<&AuthoritativeActionPlayer> {
        self.players.get(&actor)
    }

    pub fn snapshot(&self, actor: EntityId) -> Option<ActorSnapshot> {
        let player = self.players.get(&actor)?;
        Some(ActorSnapshot {
            actor,
            state: *player.state(),
            running: player.instances().map(|instance| instance.action_id()).collect(),
            pending: player.pending_count(),
            life_state: self.world.resolve(actor).map(|info| info.life_state),
        })
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Routes one client message to its actor's player.
    ///
    /// Returns `None` when the actor has no player; such messages are
    /// dropped without further effect.
    pub fn handle_client_message(
        &mut self,
        message: ClientMessage,
    ) -> Option<std::result::Result<(), PlayError>> {
        let actor = message.actor;
        let result = match message.request {
            ClientRequest::PlayAction(request) => self.with_player(actor, |player, host| {
                player.play(request, host).map(|_| ())
            }),
            ClientRequest::StopChargingUp => self.with_player(actor, |player, host| {
                player.notify_gameplay_activity(GameplayActivity::StoppedChargingUp, host);
                Ok(())
            }),
            ClientRequest::Move(destination) => self.with_player(actor, |player, host| {
                player.request_move(destination, host)
            }),
        };
        if result.is_none() {
            tracing::trace!(target: LOG_TARGET, %actor, "message for unknown actor ignored");
        }
        self.deliver_follow_ups();
        result
    }

    /// Advances the world, then every player, by `dt` seconds.
    ///
    /// Contacts and projectile hits from the world step are delivered before
    /// the players update; players update in actor id order.
    pub fn tick(&mut self, dt: f32) {
        for event in self.world.step(dt) {
            match event {
                WorldEvent::Contact { entity, other } => {
                    self.with_player(entity, |player, host| player.collision_entered(other, host));
                }
                WorldEvent::ProjectileHit {
                    owner,
                    victim,
                    damage,
                } => {
                    let mut host = SessionHost {
                        world: &mut self.world,
                        players: &self.players,
                        own: None,
                        events: &mut self.events,
                    };
                    host.receive_hp(owner, victim, -damage);
                }
            }
            self.deliver_follow_ups();
        }

        let actors: Vec<_> = self.players.keys().copied().collect();
        for actor in actors {
            self.with_player(actor, |player, host| player.update(dt, host));
            self.deliver_follow_ups();
        }
    }

    /// Takes the broadcasts produced since the last drain, in order.
    pub fn drain_broadcasts(&mut self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Checks `actor`'s player out of the session and runs `drive` with a
    /// host that sees every other player.
    fn with_player<R>(
        &mut self,
        actor: EntityId,
        drive: impl FnOnce(&mut AuthoritativeActionPlayer, &mut dyn ServerHost) -> R,
    ) -> Option<R> {
        let mut player = self.players.remove(&actor)?;
        let result = {
            let mut host = SessionHost {
                world: &mut self.world,
                players: &self.players,
                own: Some(own_buffs(&player)),
                events: &mut self.events,
            };
            drive(&mut player, &mut host)
        };
        self.outbox.extend(
            player
                .drain_broadcasts()
                .into_iter()
                .map(|event| ServerMessage { actor, event }),
        );
        self.players.insert(actor, player);
        Some(result)
    }

    /// Delivers gameplay activities and incapacitations queued by the last
    /// driving call, including any they cause in turn.
    fn deliver_follow_ups(&mut self) {
        let mut delivered = 0;
        while !self.events.is_empty() {
            if delivered >= MAX_FOLLOW_UPS {
                tracing::warn!(
                    target: LOG_TARGET,
                    dropped = self.events.len(),
                    "follow-up events kept cascading; dropping the rest"
                );
                self.events.clear();
                break;
            }
            let event = self.events.remove(0);
            delivered += 1;
            match event {
                SessionEvent::Activity(actor, activity) => {
                    self.with_player(actor, |player, host| {
                        player.notify_gameplay_activity(activity, host)
                    });
                }
                SessionEvent::Incapacitated(actor) => {
                    tracing::debug!(target: LOG_TARGET, %actor, "incapacitated");
                    self.with_player(actor, |player, host| player.on_incapacitated(host));
                }
            }
        }
    }
}

impl<W: WorldBackend + std::fmt::Debug> std::fmt::Debug for ServerSession<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSession")
            .field("world", &self.world)
            .field("players", &self.players)
            .finish()
    }
}
