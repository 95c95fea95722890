//! The scripted scenario.
//!
//! A hero and two goblins share a sandbox world. The hero's client owns an
//! observer session with anticipation; a spectator mirrors everything. Each
//! observer renders into its own copy of the world.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec3;

use action_content::ActionCatalog;
use action_core::{ActionId, ActionRequestData, EntityId, Faction};
use action_runtime::{
    ClientEndpoint, ClientMessage, ObserverEndpoint, ObserverSession, ReplicationChannel,
    RuntimeConfig, SandboxWorld, ServerSession, SimulationHandle, SimulationWorker,
};

const LOG_TARGET: &str = "harness::scenario";

const HERO: EntityId = EntityId(1);
const GOBLIN: EntityId = EntityId(2);
const GOBLIN_ARCHER: EntityId = EntityId(3);

/// Observer frame length.
const FRAME: f32 = 1.0 / 30.0;

/// One client view: a session plus the world it renders into.
struct View {
    label: &'static str,
    feed: ObserverEndpoint,
    session: ObserverSession,
    world: SandboxWorld,
}

impl View {
    fn new(label: &'static str, feed: ObserverEndpoint, session: ObserverSession, world: SandboxWorld) -> Self {
        let mut view = Self {
            label,
            feed,
            session,
            world,
        };
        for actor in [HERO, GOBLIN, GOBLIN_ARCHER] {
            view.session.track(actor);
        }
        view
    }

    fn sync(&mut self, dt: f32) {
        let messages = self.feed.drain();
        if !messages.is_empty() {
            tracing::debug!(target: LOG_TARGET, view = self.label, count = messages.len(), "applying broadcasts");
        }
        self.session.apply_all(&messages, &mut self.world);
        self.session.update(dt, &mut self.world);
    }
}

struct Script {
    config: RuntimeConfig,
    handle: SimulationHandle,
    client: ClientEndpoint,
    views: Vec<View>,
}

impl Script {
    /// Lets `seconds` of game time pass, on the worker's clock when it has
    /// one and by explicit steps otherwise.
    async fn wait(&mut self, seconds: f32) -> Result<()> {
        let frames = (seconds / FRAME).round() as usize;
        for _ in 0..frames {
            match self.config.tick_interval() {
                Some(_) => tokio::time::sleep(Duration::from_secs_f32(FRAME)).await,
                None => self.handle.advance(FRAME).await?,
            }
            for view in &mut self.views {
                view.sync(FRAME);
            }
        }
        Ok(())
    }

    async fn send(&mut self, message: ClientMessage) -> Result<()> {
        tracing::info!(target: LOG_TARGET, actor = %message.actor, request = ?message.request, "client sends");
        self.client.send(&message).await?;
        Ok(())
    }

    async fn report(&self, actor: EntityId) -> Result<()> {
        let snapshot = self
            .handle
            .snapshot(actor)
            .await?
            .with_context(|| format!("actor {actor} is not registered"))?;
        tracing::info!(
            target: LOG_TARGET,
            actor = %actor,
            running = ?snapshot.running,
            pending = snapshot.pending,
            life = ?snapshot.life_state,
            target_id = ?snapshot.state.target,
            "server view"
        );
        for view in &self.views {
            if let Some(player) = view.session.player(actor) {
                tracing::info!(
                    target: LOG_TARGET,
                    actor = %actor,
                    view = view.label,
                    playing = player.playing().len(),
                    effects = view.world.live_effects().len(),
                    "client view"
                );
            }
        }
        Ok(())
    }
}

fn sandbox() -> SandboxWorld {
    let mut world = SandboxWorld::new();
    world.spawn_character(HERO, Faction::Player, Vec3::ZERO, 100.0);
    world.spawn_character(GOBLIN, Faction::Npc, Vec3::new(2.0, 0.0, 0.0), 30.0);
    world.spawn_character(GOBLIN_ARCHER, Faction::Npc, Vec3::new(12.0, 0.0, 4.0), 20.0);
    world
}

fn action(catalog: &ActionCatalog, name: &str) -> Result<ActionId> {
    catalog
        .by_name(name)
        .map(|config| config.id)
        .with_context(|| format!("catalog has no {name:?} action"))
}

pub async fn run(config: RuntimeConfig, catalog: Arc<ActionCatalog>) -> Result<()> {
    let slash = action(&catalog, "slash")?;
    let shield = action(&catalog, "shield")?;
    let arrow = action(&catalog, "arrow")?;

    let engine = Arc::new(config.engine.clone());
    let mut session = ServerSession::new(sandbox(), catalog.clone(), engine.clone()).with_seed(0x5eed);
    for actor in [HERO, GOBLIN, GOBLIN_ARCHER] {
        session.add_actor(actor)?;
    }

    let (server, client) = ReplicationChannel::open(config.channel_capacity);
    let owner_feed = server.subscribe();
    let spectator_feed = server.subscribe();
    let (handle, join) = SimulationWorker::spawn(session, server, &config);

    let owner = ObserverSession::new(Some(HERO), catalog.clone(), engine.clone());
    let spectator = ObserverSession::new(None, catalog, engine);
    let mut script = Script {
        config,
        handle,
        client,
        views: vec![
            View::new("owner", owner_feed, owner, sandbox()),
            View::new("spectator", spectator_feed, spectator, sandbox()),
        ],
    };

    tracing::info!(target: LOG_TARGET, tick = ?script.config.tick_interval(), "scenario started");

    // The goblin raises its shield and holds it.
    script.send(ClientMessage::play(GOBLIN, ActionRequestData::new(shield))).await?;
    script.wait(0.6).await?;
    script.send(ClientMessage::stop_charging_up(GOBLIN)).await?;

    // The hero predicts the slash locally before the server confirms it.
    let request = ActionRequestData::new(slash).with_target(GOBLIN);
    let owner = &mut script.views[0];
    let anticipated = owner.session.anticipate(request.clone(), &mut owner.world);
    tracing::info!(target: LOG_TARGET, anticipated, "owner anticipates slash");
    script.send(ClientMessage::play(HERO, request)).await?;
    script.wait(1.0).await?;
    script.report(HERO).await?;
    script.report(GOBLIN).await?;

    // The archer fires from range while the hero walks away.
    script
        .send(ClientMessage::play(
            GOBLIN_ARCHER,
            ActionRequestData::new(arrow)
                .with_target(HERO)
                .with_direction(Vec3::new(-12.0, 0.0, -4.0).normalize()),
        ))
        .await?;
    script.send(ClientMessage::move_to(HERO, Vec3::new(-6.0, 0.0, 0.0))).await?;
    script.wait(2.0).await?;

    for actor in [HERO, GOBLIN, GOBLIN_ARCHER] {
        script.report(actor).await?;
    }

    script.handle.shutdown().await?;
    join.await.context("simulation worker panicked")?;
    tracing::info!(target: LOG_TARGET, "scenario finished");
    Ok(())
}
