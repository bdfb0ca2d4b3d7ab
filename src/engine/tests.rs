use super::FireControlEngine;
use crate::ammo::{AmmoPool, AmmoType};
use crate::attributes::SelectiveFireState;
use crate::config::{
    TriggerBinding, TriggerKind, WeaponConfig, WeaponConfigBuilder, WeaponRegistry,
};
use crate::core::time::MAX_SHOTS_PER_SECOND;
use crate::core::State;
use crate::env::{
    ActorId, Hand, InputSnapshot, RegionVerdict, SupplementaryTask, WeaponInstanceId,
};
use crate::firearm::{FirearmKind, FirearmState};
use crate::sandbox::{HookEvent, Sandbox};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Engine = FireControlEngine<Sandbox>;

fn right_click() -> TriggerBinding {
    TriggerBinding::main_hand(TriggerKind::RightClick)
}

fn weapon(id: &str) -> WeaponConfigBuilder {
    WeaponConfigBuilder::new(id, right_click()).projectile("bullet", 80.0)
}

fn engine(configs: Vec<WeaponConfig>) -> Engine {
    let mut registry = WeaponRegistry::new();
    for config in configs {
        registry.insert(config).unwrap();
    }
    FireControlEngine::new(Sandbox::new(), registry)
}

/// Engine with one actor holding `weapon_id` in the main hand.
fn armed(config: WeaponConfig) -> (Engine, ActorId, WeaponInstanceId) {
    let id = config.id.clone();
    let mut engine = engine(vec![config]);
    let actor = engine.env_mut().spawn_actor();
    let instance = engine.env_mut().give_weapon(actor, Hand::Main, &id);
    (engine, actor, instance)
}

fn fire(engine: &mut Engine, actor: ActorId, weapon_id: &str) -> bool {
    engine.try_use(actor, weapon_id, Hand::Main, TriggerKind::RightClick, false, None)
}

fn step(engine: &mut Engine, ticks: u32) {
    for _ in 0..ticks {
        engine.env_mut().advance_tick();
        engine.tick();
    }
}

fn hold_right_click(engine: &mut Engine, actor: ActorId, held: bool) {
    let input = InputSnapshot {
        right_clicking: held,
        ..InputSnapshot::default()
    };
    engine.env_mut().set_input(actor, input);
}

fn ammo_left(engine: &Engine, instance: WeaponInstanceId) -> u32 {
    engine.attributes().get(instance).unwrap().ammo_left
}

fn reload_requests(engine: &Engine) -> usize {
    engine
        .env()
        .count_events(|e| matches!(e, HookEvent::ReloadRequested { .. }))
}

#[test]
fn single_shots_stop_at_whole_rounds() {
    let config = weapon("rifle").magazine(5, 10).ammo_per_shot(2).build().unwrap();
    let (mut engine, actor, instance) = armed(config);

    assert!(fire(&mut engine, actor, "rifle"));
    assert!(fire(&mut engine, actor, "rifle"));
    assert!(!fire(&mut engine, actor, "rifle"));

    assert_eq!(engine.env().shots_by(actor), 2);
    assert_eq!(ammo_left(&engine, instance), 1);
}

#[test]
fn unmatched_trigger_has_no_side_effect() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());

    assert!(!engine.try_use(actor, "rifle", Hand::Main, TriggerKind::LeftClick, false, None));
    assert!(!engine.try_use(actor, "rifle", Hand::Off, TriggerKind::RightClick, false, None));
    assert!(!engine.try_use(actor, "pistol", Hand::Main, TriggerKind::RightClick, false, None));

    assert!(engine.env().fired.is_empty());
    assert!(engine.attributes().is_empty());
}

#[test]
fn main_hand_melee_goes_to_melee_handler() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    let victim = ActorId::new();
    engine.env_mut().melee_result = true;

    assert!(engine.try_use(actor, "rifle", Hand::Main, TriggerKind::Melee, false, Some(victim)));
    assert_eq!(
        engine.env().events,
        vec![HookEvent::Melee {
            victim: Some(victim)
        }]
    );
    assert!(engine.env().fired.is_empty());
}

#[test]
fn pre_shoot_hook_can_veto() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    engine.env_mut().deny_pre_shoot = true;

    assert!(!fire(&mut engine, actor, "rifle"));
    assert!(engine.env().fired.is_empty());
}

#[test]
fn region_denial_sends_its_message() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    engine.env_mut().region = RegionVerdict::deny(Some("No shooting here".to_string()));

    assert!(!fire(&mut engine, actor, "rifle"));
    assert_eq!(
        engine.env().messages,
        vec![(actor, "No shooting here".to_string())]
    );
}

#[test]
fn missing_permission_is_reported_to_players() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    engine
        .env_mut()
        .forbidden
        .insert((actor, "rifle".to_string()));

    assert!(!fire(&mut engine, actor, "rifle"));
    assert_eq!(engine.env().messages.len(), 1);
    assert!(engine.env().messages[0].1.contains("rifle"));
}

#[test]
fn delay_between_shots_spaces_attempts() {
    let config = weapon("rifle").delay_between_shots(4).build().unwrap();
    let (mut engine, actor, _) = armed(config);

    let mut accepted = 0;
    for _ in 0..20 {
        if fire(&mut engine, actor, "rifle") {
            accepted += 1;
        }
        step(&mut engine, 1);
    }

    assert_eq!(accepted, 5);
    assert_eq!(engine.env().shots_by(actor), 5);
}

#[test]
fn equip_delay_blocks_until_elapsed() {
    let config = weapon("rifle").equip_delay(4).build().unwrap();
    let (mut engine, actor, _) = armed(config);
    engine.equip(actor, Hand::Main, Some("rifle"));

    assert!(!fire(&mut engine, actor, "rifle"));
    step(&mut engine, 3);
    assert!(!fire(&mut engine, actor, "rifle"));
    step(&mut engine, 1);
    assert!(fire(&mut engine, actor, "rifle"));
}

#[test]
fn burst_fires_its_shots_then_frees_the_hand() {
    let config = weapon("smg").magazine(10, 20).burst(3, 2).build().unwrap();
    let (mut engine, actor, instance) = armed(config);

    assert!(fire(&mut engine, actor, "smg"));
    assert_eq!(engine.env().shots_by(actor), 1);
    assert!(engine.hand(actor, Hand::Main).unwrap().is_using_burst());
    assert!(!fire(&mut engine, actor, "smg"));

    step(&mut engine, 2);
    assert_eq!(engine.env().shots_by(actor), 2);
    step(&mut engine, 2);
    assert_eq!(engine.env().shots_by(actor), 3);

    step(&mut engine, 6);
    assert_eq!(engine.env().shots_by(actor), 3);
    assert!(!engine.hand(actor, Hand::Main).unwrap().is_firing());
    assert_eq!(ammo_left(&engine, instance), 7);
}

#[test]
fn burst_stops_early_and_reloads_when_ammo_runs_out() {
    let config = weapon("smg").magazine(2, 20).burst(3, 1).build().unwrap();
    let (mut engine, actor, _) = armed(config);

    assert!(fire(&mut engine, actor, "smg"));
    step(&mut engine, 3);

    assert_eq!(engine.env().shots_by(actor), 2);
    assert!(!engine.hand(actor, Hand::Main).unwrap().is_firing());
    assert!(engine.is_reloading(actor));
}

#[test]
fn full_auto_fires_ten_shots_a_second_while_held() {
    let config = weapon("minigun").full_auto(10).build().unwrap();
    let (mut engine, actor, _) = armed(config);
    hold_right_click(&mut engine, actor, true);

    assert!(fire(&mut engine, actor, "minigun"));
    step(&mut engine, 19);
    assert_eq!(engine.env().shots_by(actor), 10);

    let times: Vec<_> = engine.env().fired.iter().map(|p| p.fired_at).collect();
    assert!(times
        .windows(2)
        .all(|pair| (pair[1] - pair[0]).num_milliseconds() == 100));

    hold_right_click(&mut engine, actor, false);
    step(&mut engine, 10);
    assert_eq!(engine.env().shots_by(actor), 10);
    assert!(!engine.hand(actor, Hand::Main).unwrap().is_firing());
}

#[test]
fn full_auto_hook_overrides_rate() {
    let config = weapon("minigun").full_auto(10).build().unwrap();
    let (mut engine, actor, _) = armed(config);
    engine.env_mut().full_auto_override = Some(20);
    hold_right_click(&mut engine, actor, true);

    assert!(fire(&mut engine, actor, "minigun"));
    step(&mut engine, 19);
    assert_eq!(engine.env().shots_by(actor), 20);
}

#[test]
fn full_auto_runs_dry_into_reload() {
    let config = weapon("minigun").full_auto(20).magazine(5, 40).build().unwrap();
    let (mut engine, actor, instance) = armed(config);
    hold_right_click(&mut engine, actor, true);

    assert!(fire(&mut engine, actor, "minigun"));
    step(&mut engine, 10);

    assert_eq!(engine.env().shots_by(actor), 5);
    assert_eq!(ammo_left(&engine, instance), 0);
    assert!(engine.is_reloading(actor));
    assert!(!engine.hand(actor, Hand::Main).unwrap().is_firing());
}

#[test]
fn keep_full_auto_on_reads_continuous_inputs() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    engine.env_mut().set_input(
        actor,
        InputSnapshot {
            sneaking: true,
            ..InputSnapshot::default()
        },
    );

    assert!(engine.keep_full_auto_on(actor, TriggerKind::StartSneak));
    assert!(!engine.keep_full_auto_on(actor, TriggerKind::StartSprint));
    assert!(!engine.keep_full_auto_on(actor, TriggerKind::DropItem));
}

#[test]
fn empty_magazine_reloads_to_full() {
    let config = weapon("rifle").magazine(3, 10).build().unwrap();
    let (mut engine, actor, instance) = armed(config);

    for _ in 0..3 {
        assert!(fire(&mut engine, actor, "rifle"));
    }
    assert!(engine.is_reloading(actor));
    assert!(!fire(&mut engine, actor, "rifle"));

    step(&mut engine, 9);
    assert!(engine.is_reloading(actor));
    step(&mut engine, 1);
    assert!(!engine.is_reloading(actor));
    assert_eq!(ammo_left(&engine, instance), 3);
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::ReloadCompleted { loaded: 3, .. })),
        1
    );
    assert!(fire(&mut engine, actor, "rifle"));
}

#[test]
fn partial_reloads_loop_until_inventory_is_dry() {
    let config = weapon("shotgun")
        .magazine(3, 4)
        .ammo_per_reload(1)
        .ammo_types(vec![AmmoType::item("shells")], false)
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);
    let shells = AmmoPool::Item("shells".to_string());
    engine.env_mut().stock(actor, shells.clone(), 2);

    for _ in 0..3 {
        fire(&mut engine, actor, "shotgun");
    }
    step(&mut engine, 8);

    assert_eq!(ammo_left(&engine, instance), 2);
    assert_eq!(engine.env().stocked(actor, &shells), 0);
    assert!(!engine.is_reloading(actor));
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::ReloadRequested { is_reload_loop: true, .. })),
        2
    );
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::SkinRefreshed { .. })),
        1
    );
}

#[test]
fn reload_without_ammo_refreshes_skin() {
    let config = weapon("rifle")
        .magazine(1, 10)
        .ammo_types(vec![AmmoType::item("rounds")], false)
        .build()
        .unwrap();
    let (mut engine, actor, _) = armed(config);

    assert!(fire(&mut engine, actor, "rifle"));
    assert!(!engine.is_reloading(actor));
    assert_eq!(reload_requests(&engine), 1);
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::SkinRefreshed { hand: Hand::Main })),
        1
    );
}

#[test]
fn reload_switches_to_ammo_type_in_stock() {
    let config = weapon("rifle")
        .magazine(1, 2)
        .ammo_types(vec![AmmoType::item("a"), AmmoType::item("b")], true)
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);
    engine
        .env_mut()
        .stock(actor, AmmoPool::Item("b".to_string()), 5);

    assert!(fire(&mut engine, actor, "rifle"));
    assert!(engine.is_reloading(actor));
    assert_eq!(engine.attributes().get(instance).unwrap().ammo_type_index, 1);
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::AmmoSwitched { index: 1, .. })),
        1
    );

    step(&mut engine, 2);
    assert_eq!(ammo_left(&engine, instance), 1);
}

#[test]
fn cancel_tasks_twice_reports_nothing_the_second_time() {
    let config = weapon("rifle").magazine(1, 10).build().unwrap();
    let (mut engine, actor, _) = armed(config);
    fire(&mut engine, actor, "rifle");
    step(&mut engine, 3);

    let first = engine.cancel_tasks(actor, Hand::Main);
    assert_eq!(first.reload.as_ref().map(|r| r.elapsed_ticks), Some(3));
    let second = engine.cancel_tasks(actor, Hand::Main);
    assert!(second.is_empty());

    assert!(engine.scheduler().is_empty());
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::ReloadCancelled { .. })),
        1
    );
}

#[test]
fn reload_is_cancelled_when_the_weapon_leaves_the_hand() {
    let config = weapon("rifle").magazine(1, 10).build().unwrap();
    let (mut engine, actor, instance) = armed(config);
    fire(&mut engine, actor, "rifle");
    engine.env_mut().take_item(actor, Hand::Main);

    step(&mut engine, 10);
    assert!(!engine.is_reloading(actor));
    assert_eq!(ammo_left(&engine, instance), 0);
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::ReloadCancelled { .. })),
        1
    );
}

#[test]
fn dual_wield_reloads_only_when_both_hands_are_empty() {
    let config = WeaponConfigBuilder::new(
        "pistol",
        TriggerBinding::both_hands(TriggerKind::RightClick),
    )
    .projectile("bullet", 60.0)
    .magazine(1, 10)
    .build()
    .unwrap();
    let mut engine = engine(vec![config]);
    let actor = engine.env_mut().spawn_actor();
    engine.env_mut().give_weapon(actor, Hand::Main, "pistol");
    engine.env_mut().give_weapon(actor, Hand::Off, "pistol");

    assert!(engine.try_use(actor, "pistol", Hand::Main, TriggerKind::RightClick, true, None));
    assert!(!engine.is_reloading(actor));

    assert!(engine.try_use(actor, "pistol", Hand::Off, TriggerKind::RightClick, true, None));
    assert!(engine.hand(actor, Hand::Off).unwrap().is_reloading());

    // other hand reloading blocks this one
    assert!(!engine.try_use(actor, "pistol", Hand::Main, TriggerKind::RightClick, true, None));
    let origins: Vec<_> = engine.env().fired.iter().map(|p| p.origin.x).collect();
    assert!(origins[0] < 0.0 && origins[1] > 0.0);
}

#[test]
fn firearm_action_cycles_after_each_shot() {
    let config = weapon("shotgun")
        .magazine(5, 10)
        .firearm_action(FirearmKind::Pump, 1, 2, 3)
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);

    assert!(fire(&mut engine, actor, "shotgun"));
    let state = |engine: &Engine| engine.attributes().get(instance).unwrap().firearm_state;
    assert_eq!(state(&engine), FirearmState::Open);
    assert!(!fire(&mut engine, actor, "shotgun"));

    step(&mut engine, 2);
    assert_eq!(state(&engine), FirearmState::Close);
    step(&mut engine, 3);
    assert_eq!(state(&engine), FirearmState::Ready);
    assert!(!engine.hand(actor, Hand::Main).unwrap().has_running_firearm_action());

    let path: Vec<&str> = engine
        .firearm_machine()
        .history(instance)
        .unwrap()
        .get_path()
        .into_iter()
        .map(|s| s.name())
        .collect();
    assert_eq!(path, vec!["Ready", "Open", "Close", "Ready"]);
    assert!(fire(&mut engine, actor, "shotgun"));
}

#[test]
fn firearm_frequency_skips_shots() {
    let config = weapon("rifle")
        .magazine(5, 10)
        .firearm_action(FirearmKind::Lever, 2, 1, 1)
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);

    assert!(fire(&mut engine, actor, "rifle"));
    assert_eq!(
        engine.attributes().get(instance).unwrap().firearm_state,
        FirearmState::Ready
    );
    assert!(fire(&mut engine, actor, "rifle"));
    assert_eq!(
        engine.attributes().get(instance).unwrap().firearm_state,
        FirearmState::Open
    );
}

#[test]
fn firearm_supplementary_tasks_run_within_the_cycle() {
    let config = weapon("shotgun")
        .magazine(5, 10)
        .firearm_action(FirearmKind::Pump, 1, 2, 3)
        .build()
        .unwrap();
    let (mut engine, actor, _) = armed(config);
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    engine.env_mut().firearm_supplements = vec![SupplementaryTask::new(1, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })];

    fire(&mut engine, actor, "shotgun");
    step(&mut engine, 5);

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert!(engine.scheduler().is_empty());
}

#[test]
fn cancelling_the_hand_resets_the_firearm() {
    let config = weapon("shotgun")
        .magazine(5, 10)
        .firearm_action(FirearmKind::Pump, 1, 2, 3)
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);
    fire(&mut engine, actor, "shotgun");

    let report = engine.cancel_tasks(actor, Hand::Main);
    assert!(report.firearm.is_some());
    assert_eq!(
        engine.attributes().get(instance).unwrap().firearm_state,
        FirearmState::Ready
    );
    assert!(engine.scheduler().is_empty());
}

#[test]
fn consumable_weapon_is_used_up() {
    let config = weapon("grenade").consume_item_on_shoot().build().unwrap();
    let mut engine = engine(vec![config]);
    let actor = engine.env_mut().spawn_actor();
    engine.env_mut().give_stack(actor, Hand::Main, "grenade", 2);

    assert!(fire(&mut engine, actor, "grenade"));
    assert!(fire(&mut engine, actor, "grenade"));
    assert!(!fire(&mut engine, actor, "grenade"));
    assert_eq!(engine.env().shots_by(actor), 2);
}

#[test]
fn selective_fire_switch_changes_mode() {
    let config = weapon("carbine")
        .magazine(30, 20)
        .burst(3, 2)
        .selective_fire(
            TriggerBinding::main_hand(TriggerKind::DropItem),
            SelectiveFireState::Single,
        )
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);

    assert!(engine.try_switch_selective_fire(
        actor,
        "carbine",
        Hand::Main,
        TriggerKind::DropItem,
        false
    ));
    assert_eq!(
        engine.attributes().get(instance).unwrap().selective_fire,
        SelectiveFireState::Burst
    );
    assert_eq!(
        engine.env().events,
        vec![HookEvent::SelectiveFireSwitched(SelectiveFireState::Burst)]
    );

    assert!(fire(&mut engine, actor, "carbine"));
    assert!(engine.hand(actor, Hand::Main).unwrap().is_using_burst());
}

#[test]
fn ammo_switch_returns_magazine_and_reloads() {
    let config = weapon("rifle")
        .magazine(4, 5)
        .ammo_types(vec![AmmoType::item("a"), AmmoType::item("b")], false)
        .ammo_switch(
            TriggerBinding::main_hand(TriggerKind::SwapHands),
            Some("click".to_string()),
        )
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);
    let a = AmmoPool::Item("a".to_string());
    let b = AmmoPool::Item("b".to_string());
    engine.env_mut().stock(actor, b.clone(), 10);

    assert!(fire(&mut engine, actor, "rifle"));
    assert!(engine.try_switch_ammo_type(actor, "rifle", Hand::Main, TriggerKind::SwapHands, false));
    assert_eq!(engine.env().stocked(actor, &a), 3);
    assert!(engine.is_reloading(actor));
    assert!(engine.env().events.contains(&HookEvent::AmmoSwitched {
        index: 1,
        mechanic: Some("click".to_string())
    }));

    step(&mut engine, 5);
    assert_eq!(ammo_left(&engine, instance), 4);
    assert_eq!(engine.env().stocked(actor, &b), 6);
}

#[test]
fn removing_an_actor_cancels_everything() {
    let config = weapon("rifle").magazine(1, 10).build().unwrap();
    let (mut engine, actor, _) = armed(config);
    fire(&mut engine, actor, "rifle");
    assert!(!engine.scheduler().is_empty());

    engine.remove_actor(actor);
    assert!(engine.scheduler().is_empty());
    assert!(engine.hand(actor, Hand::Main).is_none());
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::ReloadCancelled { .. })),
        1
    );
}

#[test]
fn checkpoint_carries_attributes_to_a_new_engine() {
    let config = weapon("shotgun")
        .magazine(5, 10)
        .firearm_action(FirearmKind::Pump, 1, 2, 3)
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config.clone());
    fire(&mut engine, actor, "shotgun");
    let json = engine.checkpoint().to_json().unwrap();

    let mut restored = self::engine(vec![config]);
    let checkpoint = crate::checkpoint::Checkpoint::from_json(&json).unwrap();
    restored.restore(&checkpoint).unwrap();

    let attrs = restored.attributes().get(instance).unwrap();
    assert_eq!(attrs.ammo_left, 4);
    assert_eq!(attrs.firearm_state, FirearmState::Open);
    assert!(restored.firearm_machine().history(instance).is_some());
}

#[test]
fn full_auto_hook_converts_semi_weapon() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    engine.env_mut().full_auto_override = Some(10);
    hold_right_click(&mut engine, actor, true);

    assert!(fire(&mut engine, actor, "rifle"));
    assert!(engine.hand(actor, Hand::Main).unwrap().is_firing());
    assert_eq!(
        engine.env().count_events(|e| matches!(
            e,
            HookEvent::FullAutoStarted {
                shots_per_second: 10,
                ..
            }
        )),
        1
    );

    step(&mut engine, 19);
    assert_eq!(engine.env().shots_by(actor), 10);
}

#[test]
fn semi_weapon_stays_single_without_hook_rate() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    hold_right_click(&mut engine, actor, true);

    assert!(fire(&mut engine, actor, "rifle"));
    assert!(!engine.hand(actor, Hand::Main).unwrap().is_firing());
    assert_eq!(
        engine
            .env()
            .count_events(|e| matches!(e, HookEvent::FullAutoStarted { .. })),
        1
    );
    step(&mut engine, 19);
    assert_eq!(engine.env().shots_by(actor), 1);
}

#[test]
fn hook_rate_is_clamped_to_the_maximum() {
    let (mut engine, actor, _) = armed(weapon("minigun").full_auto(10).build().unwrap());
    engine.env_mut().full_auto_override = Some(u32::MAX);
    hold_right_click(&mut engine, actor, true);

    assert!(fire(&mut engine, actor, "minigun"));
    assert_eq!(engine.env().shots_by(actor), 6);
    step(&mut engine, 19);
    assert_eq!(engine.env().shots_by(actor), MAX_SHOTS_PER_SECOND as usize);
}

#[test]
fn region_is_tested_where_the_actor_stands() {
    let (mut engine, actor, _) = armed(weapon("rifle").build().unwrap());
    let feet = engine.env().actors[&actor].location.y;

    // the eyes are inside the restricted band, the feet are not
    engine.env_mut().restricted_above = Some(feet + 1.0);
    assert!(fire(&mut engine, actor, "rifle"));

    engine.env_mut().restricted_above = Some(feet);
    assert!(!fire(&mut engine, actor, "rifle"));
    assert_eq!(engine.env().shots_by(actor), 1);
}

#[test]
fn used_up_weapon_is_forgotten() {
    let config = weapon("launcher")
        .magazine(2, 10)
        .destroy_when_empty()
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);

    assert!(fire(&mut engine, actor, "launcher"));
    assert_eq!(ammo_left(&engine, instance), 1);
    assert!(fire(&mut engine, actor, "launcher"));

    assert!(engine.attributes().get(instance).is_none());
    assert!(engine.env().actors[&actor].main_hand.is_none());
    assert_eq!(reload_requests(&engine), 0);
}

#[test]
fn forget_instance_drops_firearm_history() {
    let config = weapon("shotgun")
        .magazine(6, 20)
        .firearm_action(FirearmKind::Pump, 1, 2, 2)
        .build()
        .unwrap();
    let (mut engine, actor, instance) = armed(config);

    assert!(fire(&mut engine, actor, "shotgun"));
    step(&mut engine, 4);
    assert!(engine.firearm_machine().history(instance).is_some());

    let removed = engine.forget_instance(instance).unwrap();
    assert_eq!(removed.ammo_left, 5);
    assert!(engine.firearm_machine().history(instance).is_none());
    assert!(engine.attributes().get(instance).is_none());
    assert!(engine.forget_instance(instance).is_none());
}
