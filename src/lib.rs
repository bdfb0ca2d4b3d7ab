//! Firecontrol: a tick-driven weapon fire-control state machine
//!
//! Firecontrol decides, for one actor pulling one trigger on one hand,
//! whether a weapon fires, how many projectiles it emits and when, and how
//! firing hands off to reloading and to mechanical firearm actions. Game
//! specifics (projectiles, inventories, regions, permissions) stay behind
//! the traits in [`env`].
//!
//! # Core Concepts
//!
//! - **Weapons**: validated [`config::WeaponConfig`] definitions in a
//!   [`config::WeaponRegistry`]
//! - **Attributes**: per-instance persisted state (ammo, selective fire,
//!   firearm state)
//! - **Hands**: per-(actor, hand) sessions owning three cancellation
//!   domains: fire, reload and firearm action
//! - **Ticks**: every wait is a task on the [`schedule::TickScheduler`],
//!   advanced by [`FireControlEngine::tick`]
//!
//! # Example
//!
//! ```rust
//! use firecontrol::config::{TriggerBinding, TriggerKind, WeaponConfigBuilder, WeaponRegistry};
//! use firecontrol::env::Hand;
//! use firecontrol::sandbox::Sandbox;
//! use firecontrol::FireControlEngine;
//!
//! let trigger = TriggerBinding::main_hand(TriggerKind::RightClick);
//! let rifle = WeaponConfigBuilder::new("rifle", trigger)
//!     .projectile("bullet", 80.0)
//!     .magazine(2, 20)
//!     .build()
//!     .unwrap();
//! let mut registry = WeaponRegistry::new();
//! registry.insert(rifle).unwrap();
//!
//! let mut engine = FireControlEngine::new(Sandbox::new(), registry);
//! let actor = engine.env_mut().spawn_actor();
//! engine.env_mut().give_weapon(actor, Hand::Main, "rifle");
//!
//! let fire = |engine: &mut FireControlEngine<Sandbox>| {
//!     engine.try_use(actor, "rifle", Hand::Main, TriggerKind::RightClick, false, None)
//! };
//! assert!(fire(&mut engine));
//! assert!(fire(&mut engine));
//! // empty magazine: reload starts instead
//! assert!(!fire(&mut engine));
//! assert!(engine.is_reloading(actor));
//!
//! for _ in 0..20 {
//!     engine.env_mut().advance_tick();
//!     engine.tick();
//! }
//! assert!(fire(&mut engine));
//! assert_eq!(engine.env().fired.len(), 3);
//! ```

#[macro_use]
pub mod core;

pub mod ammo;
pub mod attributes;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod env;
pub mod firearm;
pub mod hand;
pub mod sandbox;
pub mod schedule;

// Re-export commonly used types
pub use attributes::{SelectiveFireState, WeaponAttributes};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use config::{ConfigError, WeaponConfig, WeaponConfigBuilder, WeaponRegistry};
pub use core::{Guard, State, StateHistory, StateTransition};
pub use engine::FireControlEngine;
pub use env::{ActorId, Environment, Hand, WeaponInstanceId};
pub use firearm::{FirearmError, FirearmState};
