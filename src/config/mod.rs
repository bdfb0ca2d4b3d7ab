//! Weapon definitions: serde types, trigger bindings, builder, validation
//! and the registry the engine reads from.
//!
//! Validation happens once, at load time. The engine only ever sees
//! definitions that passed it.

mod builder;
mod error;
mod registry;
mod trigger;
mod validate;
mod weapon;

pub use builder::WeaponConfigBuilder;
pub use error::{ConfigError, ConfigViolation};
pub use registry::{LoadReport, WeaponRegistry};
pub use trigger::{Circumstance, CircumstanceView, TriggerBinding, TriggerKind};
pub use validate::validate;
pub use weapon::{
    AmmoConfig, BurstConfig, FirearmActionConfig, InfoConfig, ReloadConfig, ScopeConfig,
    SelectiveFireConfig, ShootConfig, WeaponConfig,
};
