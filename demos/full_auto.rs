//! Full-Automatic Fire
//!
//! This example drives a submachine gun through one held trigger pull
//! against the in-memory sandbox world.
//!
//! Key concepts:
//! - Shots spread over the 20-tick second
//! - Holding the trigger keeps the repeating task alive
//! - Running dry hands over to a reload
//! - A host hook converting a semi-automatic rifle to full-auto
//!
//! Run with: cargo run --example full_auto

use firecontrol::config::{TriggerBinding, TriggerKind, WeaponConfigBuilder, WeaponRegistry};
use firecontrol::env::{Hand, InputSnapshot};
use firecontrol::sandbox::Sandbox;
use firecontrol::FireControlEngine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Full-Automatic Fire ===\n");

    let smg = WeaponConfigBuilder::new("smg", TriggerBinding::main_hand(TriggerKind::RightClick))
        .projectile("bullet", 70.0)
        .full_auto(15)
        .magazine(12, 30)
        .build()?;
    let rifle =
        WeaponConfigBuilder::new("rifle", TriggerBinding::main_hand(TriggerKind::RightClick))
            .projectile("bullet", 90.0)
            .build()?;

    let mut registry = WeaponRegistry::new();
    registry.insert(smg)?;
    registry.insert(rifle)?;
    let mut engine = FireControlEngine::new(Sandbox::new(), registry);

    let actor = engine.env_mut().spawn_actor();
    let instance = engine.env_mut().give_weapon(actor, Hand::Main, "smg");
    hold(&mut engine, actor, true);

    println!("Trigger pulled on the smg (15 shots/s, 12 round magazine)");
    engine.try_use(actor, "smg", Hand::Main, TriggerKind::RightClick, false, None);

    for tick in 1..=20 {
        engine.env_mut().advance_tick();
        engine.tick();
        let ammo = engine
            .attributes()
            .get(instance)
            .map_or(0, |attrs| attrs.ammo_left);
        println!(
            "  tick {tick:2}: fired {:2}, magazine {ammo:2}, reloading {}",
            engine.env().shots_by(actor),
            engine.is_reloading(actor)
        );
    }

    println!("\nReleasing the trigger and waiting out the reload");
    hold(&mut engine, actor, false);
    for _ in 0..30 {
        engine.env_mut().advance_tick();
        engine.tick();
    }
    let ammo = engine
        .attributes()
        .get(instance)
        .map_or(0, |attrs| attrs.ammo_left);
    println!("  magazine after reload: {ammo}");

    println!("\nA hook turns the semi-automatic rifle into a 10 shots/s weapon");
    let marksman = engine.env_mut().spawn_actor();
    engine.env_mut().give_weapon(marksman, Hand::Main, "rifle");
    engine.env_mut().full_auto_override = Some(10);
    hold(&mut engine, marksman, true);

    engine.try_use(marksman, "rifle", Hand::Main, TriggerKind::RightClick, false, None);
    for _ in 0..19 {
        engine.env_mut().advance_tick();
        engine.tick();
    }
    println!(
        "  rifle fired {} shots in one second",
        engine.env().shots_by(marksman)
    );

    Ok(())
}

fn hold(engine: &mut FireControlEngine<Sandbox>, actor: firecontrol::ActorId, held: bool) {
    let input = InputSnapshot {
        right_clicking: held,
        standing: true,
        ..InputSnapshot::default()
    };
    engine.env_mut().set_input(actor, input);
}
