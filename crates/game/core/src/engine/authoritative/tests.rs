use std::sync::Arc;

use glam::Vec3;

use super::*;
use crate::action::{BlockingMode, ProjectileInfo};
use crate::config::PrototypeIds;
use crate::env::compute_seed;
use crate::state::{Faction, LifeState};
use crate::testing::{MockHost, catalog};

const ACTOR: EntityId = EntityId(1);

fn stunned(id: u16, duration: f32) -> ActionConfig {
    let mut config = ActionConfig::new(ActionId(id), ActionLogic::Stunned);
    config.duration_seconds = duration;
    config.anim = "Stunned".into();
    config.anim2 = "StunnedEnd".into();
    config
}

fn interruptible(mut config: ActionConfig) -> ActionConfig {
    config.action_interruptible = true;
    config
}

fn non_blocking(mut config: ActionConfig) -> ActionConfig {
    config.blocking_mode = BlockingMode::OnlyDuringExecTime;
    config.exec_time_seconds = 0.0;
    config
}

fn fixture_with(
    configs: Vec<ActionConfig>,
    engine: EngineConfig,
) -> (AuthoritativeActionPlayer, MockHost) {
    let mut host = MockHost::default();
    host.spawn(ACTOR.0, Faction::Player, Vec3::ZERO);
    let player = AuthoritativeActionPlayer::new(ACTOR, catalog(configs), Arc::new(engine));
    (player, host)
}

fn fixture(configs: Vec<ActionConfig>) -> (AuthoritativeActionPlayer, MockHost) {
    fixture_with(configs, EngineConfig::default())
}

fn tick(player: &mut AuthoritativeActionPlayer, host: &mut MockHost, steps: usize, dt: f32) {
    for _ in 0..steps {
        player.update(dt, host);
    }
}

fn request(id: u16) -> ActionRequestData {
    ActionRequestData::new(ActionId(id))
}

#[test]
fn non_interruptible_action_drops_or_queues_new_requests() {
    let (mut player, mut host) = fixture(vec![stunned(1, 1.0), stunned(2, 0.5)]);

    assert!(matches!(player.play(request(1), &mut host), Ok(PlayOutcome::Started(_))));
    assert_eq!(
        player.play(request(2), &mut host),
        Err(PlayError::SlotOccupied(ActionId(1)))
    );
    assert_eq!(player.play(request(2).queued(), &mut host), Ok(PlayOutcome::Queued));
    assert_eq!(player.pending_count(), 1);

    tick(&mut player, &mut host, 3, 0.25);
    assert_eq!(player.active_request().map(|r| r.action_id), Some(ActionId(1)));

    tick(&mut player, &mut host, 1, 0.25);
    assert_eq!(player.active_request().map(|r| r.action_id), Some(ActionId(2)));
    assert_eq!(player.pending_count(), 0);

    let broadcasts = player.drain_broadcasts();
    assert_eq!(
        broadcasts,
        vec![
            Broadcast::PlayAction(request(1)),
            Broadcast::PlayAction(request(2).queued()),
        ]
    );
}

#[test]
fn interruptible_action_yields_to_new_request() {
    let (mut player, mut host) = fixture(vec![interruptible(stunned(1, 5.0)), stunned(2, 1.0)]);

    player.play(request(1), &mut host).unwrap();
    player.play(request(2), &mut host).unwrap();

    assert_eq!(player.active_request().map(|r| r.action_id), Some(ActionId(2)));
    assert_eq!(player.running_action_count(), 1);
    assert!(host.fired(ACTOR, "StunnedEnd"));
    assert_eq!(
        player.drain_broadcasts(),
        vec![
            Broadcast::PlayAction(request(1)),
            Broadcast::CancelActionsByPrototype(ActionId(1)),
            Broadcast::PlayAction(request(2)),
        ]
    );
}

#[test]
fn queued_request_still_interrupts_an_interruptible_action() {
    let (mut player, mut host) = fixture(vec![interruptible(stunned(1, 5.0)), stunned(2, 1.0)]);

    player.play(request(1), &mut host).unwrap();
    let outcome = player.play(request(2).queued(), &mut host);

    assert!(matches!(outcome, Ok(PlayOutcome::Started(_))));
    assert_eq!(player.active_request().map(|r| r.action_id), Some(ActionId(2)));
    assert_eq!(player.pending_count(), 0);
    assert!(!player.is_running(ActionId(1)));
}

#[test]
fn listed_interrupter_cancels_otherwise_uninterruptible_action() {
    let mut guarded = stunned(1, 5.0);
    guarded.interrupted_by = vec![ActionId(3)];
    let (mut player, mut host) = fixture(vec![guarded, stunned(2, 1.0), stunned(3, 1.0)]);

    player.play(request(1), &mut host).unwrap();
    assert!(player.play(request(2), &mut host).is_err());
    player.play(request(3), &mut host).unwrap();

    assert_eq!(player.active_request().map(|r| r.action_id), Some(ActionId(3)));
}

#[test]
fn queue_rejects_requests_beyond_time_depth() {
    let (mut player, mut host) = fixture(vec![stunned(1, 1.0), stunned(2, 1.0), stunned(3, 1.0)]);

    player.play(request(1), &mut host).unwrap();
    assert_eq!(player.play(request(2).queued(), &mut host), Ok(PlayOutcome::Queued));
    assert!((player.queue_time_depth() - 2.0).abs() < 1e-6);
    assert_eq!(
        player.play(request(3).queued(), &mut host),
        Err(PlayError::QueueDepthExceeded(ActionId(3)))
    );
}

#[test]
fn blocking_slot_never_holds_two_entire_duration_instances() {
    let configs = vec![
        stunned(1, 1.0),
        interruptible(stunned(2, 0.5)),
        stunned(3, 0.25),
        non_blocking(stunned(4, 0.75)),
    ];
    let (mut player, mut host) = fixture(configs);
    let rng = PcgRng;

    for step in 0..400u64 {
        let roll = rng.next_u32(compute_seed(0xAC7, step, ACTOR.0, 0));
        match roll % 4 {
            0 | 1 => {
                let id = (roll / 4 % 4) as u16 + 1;
                let mut req = request(id);
                req.should_queue = roll / 16 % 2 == 0;
                let _ = player.play(req, &mut host);
            }
            2 => player.update(if roll / 4 % 2 == 0 { 0.125 } else { 0.25 }, &mut host),
            _ => {
                if roll / 4 % 8 == 0 {
                    player.cancel_all(&mut host);
                } else {
                    player.update(0.125, &mut host);
                }
            }
        }

        let holders = player
            .instances()
            .filter(|i| i.config().blocking_mode == BlockingMode::EntireDuration)
            .count();
        assert!(holders <= 1, "step {step}: {holders} blocking instances");
        if player.blocking_instance().is_none() {
            assert_eq!(player.pending_count(), 0, "step {step}: idle with a queue");
        }
    }
}

#[test]
fn cancel_by_prototype_only_touches_matching_instances() {
    let (mut player, mut host) = fixture(vec![
        non_blocking(stunned(1, 5.0)),
        non_blocking(stunned(2, 5.0)),
    ]);
    player.play(request(1), &mut host).unwrap();
    player.play(request(2), &mut host).unwrap();
    player.drain_broadcasts();

    assert_eq!(player.cancel_by_prototype(ActionId(1), &mut host), 1);

    assert!(!player.is_running(ActionId(1)));
    assert!(player.is_running(ActionId(2)));
    assert_eq!(
        player.drain_broadcasts(),
        vec![Broadcast::CancelActionsByPrototype(ActionId(1))]
    );
    assert_eq!(player.cancel_by_prototype(ActionId(7), &mut host), 0);
}

#[test]
fn cancel_by_instance_id_leaves_siblings_running() {
    let (mut player, mut host) = fixture(vec![stunned(1, 1.0), non_blocking(stunned(2, 5.0))]);
    player.play(request(1), &mut host).unwrap();
    player.play(request(2), &mut host).unwrap();

    let ids = player.instance_ids();
    assert_eq!(ids.len(), 2);

    assert!(player.cancel(ids[0], &mut host));
    assert!(!player.cancel(ids[0], &mut host));
    assert_eq!(player.instance_ids(), vec![ids[1]]);
    assert!(player.active_request().is_none());
}

#[test]
fn cancel_all_clears_running_and_pending() {
    let (mut player, mut host) = fixture(vec![
        stunned(1, 1.0),
        stunned(2, 0.5),
        non_blocking(stunned(3, 5.0)),
    ]);
    player.play(request(1), &mut host).unwrap();
    player.play(request(2).queued(), &mut host).unwrap();
    player.play(request(3), &mut host).unwrap();
    player.drain_broadcasts();

    player.cancel_all(&mut host);

    assert_eq!(player.running_action_count(), 0);
    assert_eq!(player.pending_count(), 0);
    assert_eq!(player.drain_broadcasts(), vec![Broadcast::CancelAllActions]);
}

#[test]
fn reuse_time_gates_repeat_requests() {
    let mut config = ActionConfig::new(ActionId(1), ActionLogic::Emote);
    config.reuse_time_seconds = 1.0;
    let (mut player, mut host) = fixture(vec![config]);

    assert_eq!(player.play(request(1), &mut host), Ok(PlayOutcome::Completed));
    assert_eq!(
        player.play(request(1), &mut host),
        Err(PlayError::OnCooldown(ActionId(1)))
    );

    tick(&mut player, &mut host, 4, 0.25);
    assert_eq!(player.play(request(1), &mut host), Ok(PlayOutcome::Completed));
}

#[test]
fn incapacitated_or_forced_actor_cannot_act() {
    let (mut player, mut host) = fixture(vec![stunned(1, 1.0)]);

    host.forced.insert(ACTOR);
    assert_eq!(
        player.play(request(1), &mut host),
        Err(PlayError::ForcedMovement(ACTOR))
    );

    host.forced.clear();
    host.entity_mut(ACTOR).info.life_state = LifeState::Fainted;
    assert_eq!(
        player.play(request(1), &mut host),
        Err(PlayError::ActorIncapacitated(ACTOR))
    );
    assert_eq!(
        player.play(request(9), &mut host),
        Err(PlayError::ActorIncapacitated(ACTOR))
    );
}

#[test]
fn unknown_action_is_rejected() {
    let (mut player, mut host) = fixture(vec![]);
    assert_eq!(
        player.play(request(4), &mut host),
        Err(PlayError::UnknownAction(ActionId(4)))
    );
}

#[test]
fn failed_start_leaves_no_trace() {
    let config = ActionConfig::new(ActionId(1), ActionLogic::LaunchProjectile);
    let (mut player, mut host) = fixture(vec![config]);

    let err = player.play(request(1), &mut host).unwrap_err();

    assert_eq!(
        err,
        PlayError::StartFailed {
            action: ActionId(1),
            source: ActionError::MissingProjectile { action: ActionId(1) },
        }
    );
    assert!(err.severity().is_internal());
    assert_eq!(player.running_action_count(), 0);
    assert!(player.drain_broadcasts().is_empty());
}

#[test]
fn cancel_movement_flag_stops_the_actor_first() {
    let (mut player, mut host) = fixture(vec![stunned(1, 1.0)]);
    player
        .play(request(1).cancelling_movement(), &mut host)
        .unwrap();
    assert_eq!(host.move_cancels, vec![ACTOR]);
}

#[test]
fn out_of_range_closing_request_chases_first() {
    let mut melee = ActionConfig::new(ActionId(1), ActionLogic::Melee);
    melee.range = 2.0;
    melee.duration_seconds = 1.0;
    let chase = ActionConfig::new(ActionId(9), ActionLogic::Chase);
    let engine = EngineConfig::default().with_prototypes(PrototypeIds {
        chase: Some(ActionId(9)),
        ..PrototypeIds::default()
    });
    let (mut player, mut host) = fixture_with(vec![melee, chase], engine);
    let foe = host.spawn(2, Faction::Npc, Vec3::new(10.0, 0.0, 0.0));

    let outcome = player.play(request(1).with_target(foe).closing(), &mut host);

    assert!(matches!(outcome, Ok(PlayOutcome::Started(_))));
    let active = player.active_request().cloned().unwrap();
    assert_eq!(active.action_id, ActionId(9));
    assert_eq!(active.amount, Some(2.0));
    assert_eq!(player.pending_count(), 1);
    assert_eq!(host.follows, vec![(ACTOR, foe)]);

    host.entity_mut(ACTOR).info.position = Vec3::new(9.0, 0.0, 0.0);
    player.update(0.25, &mut host);

    let active = player.active_request().unwrap();
    assert_eq!(active.action_id, ActionId(1));
    assert!(!active.should_close);
}

#[test]
fn in_range_closing_request_skips_the_chase() {
    let mut melee = ActionConfig::new(ActionId(1), ActionLogic::Melee);
    melee.range = 2.0;
    let engine = EngineConfig::default().with_prototypes(PrototypeIds {
        chase: Some(ActionId(9)),
        ..PrototypeIds::default()
    });
    let (mut player, mut host) = fixture_with(
        vec![melee, ActionConfig::new(ActionId(9), ActionLogic::Chase)],
        engine,
    );
    let foe = host.spawn(2, Faction::Npc, Vec3::new(1.5, 0.0, 0.0));

    player
        .play(request(1).with_target(foe).closing(), &mut host)
        .unwrap();

    assert_eq!(player.active_request().map(|r| r.action_id), Some(ActionId(1)));
    assert!(host.follows.is_empty());
}

#[test]
fn new_single_target_synthesizes_a_target_action() {
    let mut melee = interruptible(ActionConfig::new(ActionId(1), ActionLogic::Melee));
    melee.range = 2.0;
    let target = non_blocking(ActionConfig::new(ActionId(8), ActionLogic::Target));
    let engine = EngineConfig::default().with_prototypes(PrototypeIds {
        target: Some(ActionId(8)),
        ..PrototypeIds::default()
    });
    let (mut player, mut host) = fixture_with(vec![melee, target], engine);
    let foe = host.spawn(2, Faction::Npc, Vec3::new(1.0, 0.0, 0.0));

    player.play(request(1).with_target(foe), &mut host).unwrap();

    assert_eq!(player.state().target, Some(foe));
    assert!(player.is_running(ActionId(8)));
    let broadcasts = player.drain_broadcasts();
    assert_eq!(
        broadcasts.first(),
        Some(&Broadcast::StateChanged(ReplicatedActorState {
            target: Some(foe),
            ..ReplicatedActorState::default()
        }))
    );
    assert!(broadcasts.contains(&Broadcast::PlayAction(request(8).with_target(foe))));

    // Same target again: nothing new to select.
    player.play(request(1).with_target(foe), &mut host).unwrap();
    assert_eq!(player.instances().filter(|i| i.action_id() == ActionId(8)).count(), 1);
}

#[test]
fn non_blocking_request_does_not_change_the_target() {
    let mark = non_blocking(ActionConfig::new(ActionId(1), ActionLogic::Emote));
    let target = non_blocking(ActionConfig::new(ActionId(8), ActionLogic::Target));
    let engine = EngineConfig::default().with_prototypes(PrototypeIds {
        target: Some(ActionId(8)),
        ..PrototypeIds::default()
    });
    let (mut player, mut host) = fixture_with(vec![mark, target], engine);
    let foe = host.spawn(2, Faction::Npc, Vec3::new(1.0, 0.0, 0.0));

    player.play(request(1).with_target(foe), &mut host).unwrap();

    assert_eq!(player.state().target, None);
    assert!(!player.is_running(ActionId(8)));
}

#[test]
fn retargeting_replaces_the_previous_target_instance() {
    let target = non_blocking(ActionConfig::new(ActionId(8), ActionLogic::Target));
    let (mut player, mut host) = fixture(vec![target]);
    let first = host.spawn(2, Faction::Npc, Vec3::new(3.0, 0.0, 0.0));
    let second = host.spawn(3, Faction::Npc, Vec3::new(-3.0, 0.0, 0.0));

    player.play(request(8).with_target(first), &mut host).unwrap();
    player.play(request(8).with_target(second), &mut host).unwrap();

    assert_eq!(player.state().target, Some(second));
    assert_eq!(player.running_action_count(), 1);

    player.play(request(8), &mut host).unwrap();
    assert_eq!(player.state().target, None);
    assert_eq!(player.running_action_count(), 0);
}

#[test]
fn move_request_interrupts_and_drops_target() {
    let target = non_blocking(ActionConfig::new(ActionId(8), ActionLogic::Target));
    let (mut player, mut host) = fixture(vec![target, interruptible(stunned(1, 5.0))]);
    let foe = host.spawn(2, Faction::Npc, Vec3::new(3.0, 0.0, 0.0));
    player.play(request(8).with_target(foe), &mut host).unwrap();
    player.play(request(1), &mut host).unwrap();

    player
        .request_move(Vec3::new(0.0, 0.0, 5.0), &mut host)
        .unwrap();

    assert_eq!(player.running_action_count(), 0);
    assert_eq!(player.state().target, None);
    assert_eq!(host.move_targets, vec![(ACTOR, Vec3::new(0.0, 0.0, 5.0))]);
}

#[test]
fn stunned_actor_takes_scaled_damage_until_it_expires() {
    let mut config = stunned(1, 1.0);
    config.amount = 2.0;
    let (mut player, mut host) = fixture(vec![config]);

    assert_eq!(player.get_buffed_value(BuffableValue::PercentDamageReceived), 1.0);
    player.play(request(1), &mut host).unwrap();
    assert_eq!(player.get_buffed_value(BuffableValue::PercentDamageReceived), 2.0);

    tick(&mut player, &mut host, 4, 0.25);
    assert_eq!(player.get_buffed_value(BuffableValue::PercentDamageReceived), 1.0);
}

#[test]
fn incapacitation_cancels_everything_and_drops_held_object() {
    let (mut player, mut host) = fixture(vec![stunned(1, 5.0)]);
    player.play(request(1), &mut host).unwrap();
    player.state.held_object = Some(EntityId(40));
    player.drain_broadcasts();

    player.on_incapacitated(&mut host);

    assert_eq!(player.running_action_count(), 0);
    assert_eq!(host.detached, vec![(ACTOR, EntityId(40))]);
    assert_eq!(
        player.drain_broadcasts(),
        vec![
            Broadcast::CancelAllActions,
            Broadcast::StateChanged(ReplicatedActorState::default()),
        ]
    );
}

#[test]
fn projectile_launches_once_at_exec_time() {
    let mut config = ActionConfig::new(ActionId(1), ActionLogic::LaunchProjectile);
    config.exec_time_seconds = 0.25;
    config.duration_seconds = 0.5;
    config.projectiles = vec![ProjectileInfo {
        name: "arrow".into(),
        speed: 10.0,
        range: 20.0,
        damage: 3.0,
        max_victims: 1,
        ..ProjectileInfo::default()
    }];
    let (mut player, mut host) = fixture(vec![config]);

    player.play(request(1), &mut host).unwrap();
    tick(&mut player, &mut host, 1, 0.25);

    assert_eq!(host.projectiles.len(), 1);
    assert_eq!(host.projectiles[0].info.name, "arrow");
    assert_eq!(host.projectiles[0].owner, ACTOR);

    tick(&mut player, &mut host, 1, 0.25);
    assert_eq!(player.running_action_count(), 0);
    assert_eq!(host.projectiles.len(), 1);
}
