use std::sync::Arc;

use glam::Vec3;

use super::*;
use crate::action::{ActionConfig, EffectDescriptor};
use crate::action::logic::IMPACT_EVENT;
use crate::state::Faction;
use crate::testing::{MockHost, catalog};

const ACTOR: EntityId = EntityId(1);
const MELEE: ActionId = ActionId(1);
const SHIELD: ActionId = ActionId(2);
const TARGET: ActionId = ActionId(3);
const STUN: ActionId = ActionId(4);
const BOLT: ActionId = ActionId(5);
const CHASE: ActionId = ActionId(6);

fn configs() -> Vec<ActionConfig> {
    let mut melee = ActionConfig::new(MELEE, ActionLogic::Melee);
    melee.range = 5.0;
    melee.duration_seconds = 1.0;
    melee.anim_anticipation = "Anticipate".into();
    melee.react_anim = "HitReact".into();

    let mut shield = ActionConfig::new(SHIELD, ActionLogic::ChargedShield);
    shield.exec_time_seconds = 1.0;
    shield.effect_duration_seconds = 2.0;
    shield.spawns = vec![
        EffectDescriptor::named("charge"),
        EffectDescriptor::named("shield"),
    ];

    let mut stun = ActionConfig::new(STUN, ActionLogic::Stunned);
    stun.duration_seconds = 0.5;

    let mut bolt = ActionConfig::new(BOLT, ActionLogic::ChargedLaunchProjectile);
    bolt.exec_time_seconds = 1.0;
    bolt.effect_duration_seconds = 0.5;
    bolt.spawns = vec![EffectDescriptor::named("crackle")];

    let mut chase = ActionConfig::new(CHASE, ActionLogic::Chase);
    chase.amount = 2.0;

    vec![
        melee,
        shield,
        ActionConfig::new(TARGET, ActionLogic::Target),
        stun,
        bolt,
        chase,
    ]
}

fn fixture(is_owner: bool) -> (VisualizationActionPlayer, MockHost) {
    let mut host = MockHost::default();
    host.spawn(ACTOR.0, Faction::Player, Vec3::ZERO);
    let player = VisualizationActionPlayer::new(
        ACTOR,
        is_owner,
        catalog(configs()),
        Arc::new(EngineConfig::default()),
    );
    (player, host)
}

#[test]
fn confirmed_anticipation_keeps_running() {
    let (mut player, mut host) = fixture(true);
    let request = ActionRequestData::new(MELEE);

    assert!(player.anticipate_action(request.clone(), &mut host));
    assert!(player.is_anticipating(MELEE));
    assert!(host.fired(ACTOR, "Anticipate"));

    player.on_update(0.25, &mut host);
    player.play_action(request, &mut host);

    assert!(player.is_playing(MELEE));
    assert!(!player.is_anticipating(MELEE));
    assert_eq!(player.playing().len(), 1);
}

#[test]
fn unconfirmed_anticipation_times_out_and_cleans_up() {
    let (mut player, mut host) = fixture(true);

    assert!(player.anticipate_action(ActionRequestData::new(SHIELD), &mut host));
    assert_eq!(host.live_effects(), 1);

    player.on_update(0.5, &mut host);
    assert!(player.is_anticipating(SHIELD));

    player.on_update(0.5, &mut host);
    assert!(player.playing().is_empty());
    assert_eq!(host.live_effects(), 0);
}

#[test]
fn anticipation_is_limited_to_the_owner_and_eligible_requests() {
    let (mut observer, mut host) = fixture(false);
    assert!(!observer.anticipate_action(ActionRequestData::new(MELEE), &mut host));

    let (mut owner, mut host) = fixture(true);
    let far = host.spawn(2, Faction::Npc, Vec3::new(20.0, 0.0, 0.0));
    let near = host.spawn(3, Faction::Npc, Vec3::new(2.0, 0.0, 0.0));

    assert!(!owner.anticipate_action(ActionRequestData::new(TARGET).with_target(near), &mut host));
    assert!(!owner.should_anticipate(
        &ActionRequestData::new(MELEE).with_target(far).closing(),
        &host
    ));
    assert!(owner.should_anticipate(
        &ActionRequestData::new(MELEE).with_target(near).closing(),
        &host
    ));
}

#[test]
fn prototype_cancel_spares_anticipated_instances() {
    let (mut player, mut host) = fixture(true);
    player.play_action(ActionRequestData::new(MELEE), &mut host);
    assert!(player.anticipate_action(ActionRequestData::new(MELEE), &mut host));
    assert_eq!(player.playing().len(), 2);

    player.cancel_all_actions_with_same_prototype_id(MELEE, &mut host);

    assert_eq!(player.playing().len(), 1);
    assert!(player.is_anticipating(MELEE));

    player.cancel_all_actions(&mut host);
    assert!(player.playing().is_empty());
}

#[test]
fn hit_react_only_plays_within_padded_melee_range() {
    let (mut player, mut host) = fixture(false);
    let near = host.spawn(2, Faction::Npc, Vec3::new(7.9, 0.0, 0.0));
    player.play_action(ActionRequestData::new(MELEE).with_target(near), &mut host);
    player.on_anim_event(IMPACT_EVENT, &mut host);
    assert!(host.fired(near, "HitReact"));

    let (mut player, mut host) = fixture(false);
    let far = host.spawn(2, Faction::Npc, Vec3::new(8.1, 0.0, 0.0));
    player.play_action(ActionRequestData::new(MELEE).with_target(far), &mut host);
    player.on_anim_event(IMPACT_EVENT, &mut host);
    player.on_update(1.0, &mut host);
    assert!(!host.fired(far, "HitReact"));
}

#[test]
fn hit_react_falls_back_to_the_end_of_the_swing() {
    let (mut player, mut host) = fixture(false);
    let foe = host.spawn(2, Faction::Npc, Vec3::new(3.0, 0.0, 0.0));
    player.play_action(ActionRequestData::new(MELEE).with_target(foe), &mut host);

    player.on_update(1.0, &mut host);

    assert!(player.playing().is_empty());
    assert_eq!(
        host.triggers.iter().filter(|(e, t)| *e == foe && t == "HitReact").count(),
        1
    );
}

#[test]
fn full_charge_raises_the_shield_visual() {
    let (mut player, mut host) = fixture(false);
    player.play_action(ActionRequestData::new(SHIELD), &mut host);
    assert_eq!(host.live_effects(), 1);

    player.on_stopped_charging_up(1.0, &mut host);

    assert_eq!(host.live_effects(), 1);
    let (_, name, _) = host.effects.last().unwrap();
    assert_eq!(name, "shield");
}

#[test]
fn partial_charge_only_stops_the_charge_visual() {
    let (mut player, mut host) = fixture(false);
    player.play_action(ActionRequestData::new(SHIELD), &mut host);

    player.on_stopped_charging_up(0.6, &mut host);

    assert_eq!(host.live_effects(), 0);
    assert_eq!(host.effects.len(), 1);
}

#[test]
fn confirmed_instances_expire_with_their_duration() {
    let (mut player, mut host) = fixture(false);
    player.play_action(ActionRequestData::new(STUN), &mut host);

    player.on_update(0.25, &mut host);
    assert!(player.is_playing(STUN));
    player.on_update(0.25, &mut host);
    assert!(!player.is_playing(STUN));
}

#[test]
fn released_shield_ends_after_its_lingering_effect() {
    let (mut player, mut host) = fixture(false);
    player.play_action(ActionRequestData::new(SHIELD), &mut host);
    player.on_stopped_charging_up(1.0, &mut host);

    player.on_update(1.0, &mut host);
    assert!(player.is_playing(SHIELD));
    assert_eq!(host.live_effects(), 1);

    player.on_update(1.0, &mut host);
    assert!(player.playing().is_empty());
    assert_eq!(host.live_effects(), 0);
}

#[test]
fn unreleased_shield_ends_after_a_full_charge_and_its_effect() {
    let (mut player, mut host) = fixture(false);
    player.play_action(ActionRequestData::new(SHIELD), &mut host);

    player.on_update(1.0, &mut host);
    player.on_update(1.0, &mut host);
    assert!(player.is_playing(SHIELD));

    player.on_update(1.0, &mut host);
    assert!(player.playing().is_empty());
    assert_eq!(host.live_effects(), 0);
}

#[test]
fn charged_launch_ends_on_observers_once_released() {
    let (mut player, mut host) = fixture(false);
    player.play_action(ActionRequestData::new(BOLT), &mut host);
    assert_eq!(host.live_effects(), 1);

    player.on_stopped_charging_up(0.4, &mut host);
    assert_eq!(host.live_effects(), 0);

    player.on_update(0.25, &mut host);
    assert!(player.is_playing(BOLT));
    player.on_update(0.25, &mut host);
    assert!(player.playing().is_empty());
}

#[test]
fn chase_ends_on_observers_once_in_range() {
    let (mut player, mut host) = fixture(false);
    let foe = host.spawn(2, Faction::Npc, Vec3::new(10.0, 0.0, 0.0));
    player.play_action(ActionRequestData::new(CHASE).with_target(foe), &mut host);

    player.on_update(0.25, &mut host);
    assert!(player.is_playing(CHASE));

    host.entity_mut(ACTOR).info.position = Vec3::new(9.0, 0.0, 0.0);
    player.on_update(0.25, &mut host);
    assert!(player.playing().is_empty());
}
