//! Dual Wielding
//!
//! This example arms one actor with a pistol in each hand.
//!
//! Key concepts:
//! - Each hand fires from its own side of the body
//! - A hand with an empty magazine waits for its partner
//! - The reload starts once both weapons are empty
//!
//! Run with: cargo run --example dual_wield

use firecontrol::config::{TriggerBinding, TriggerKind, WeaponConfigBuilder, WeaponRegistry};
use firecontrol::env::Hand;
use firecontrol::sandbox::Sandbox;
use firecontrol::FireControlEngine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Dual Wielding ===\n");

    let pistol =
        WeaponConfigBuilder::new("pistol", TriggerBinding::both_hands(TriggerKind::RightClick))
            .projectile("bullet", 60.0)
            .magazine(2, 10)
            .build()?;

    let mut registry = WeaponRegistry::new();
    registry.insert(pistol)?;
    let mut engine = FireControlEngine::new(Sandbox::new(), registry);

    let actor = engine.env_mut().spawn_actor();
    engine.env_mut().give_weapon(actor, Hand::Main, "pistol");
    engine.env_mut().give_weapon(actor, Hand::Off, "pistol");

    for round in 1..=3 {
        for hand in [Hand::Main, Hand::Off] {
            let fired = engine.try_use(actor, "pistol", hand, TriggerKind::RightClick, true, None);
            println!(
                "  round {round}, {hand:?} hand: fired {fired}, reloading {}",
                engine.is_reloading(actor)
            );
        }
        engine.env_mut().advance_tick();
        engine.tick();
    }

    println!("\nMuzzle positions:");
    for projectile in &engine.env().fired {
        println!(
            "  {:?} hand at x = {:+.2}",
            projectile.hand, projectile.origin.x
        );
    }

    for _ in 0..10 {
        engine.env_mut().advance_tick();
        engine.tick();
    }
    println!("\nAfter the reload: reloading {}", engine.is_reloading(actor));

    Ok(())
}
