//! Serde weapon definitions.
//!
//! Delays are stored in ticks as authored and converted to milliseconds
//! where timing gates compare wall-clock instants.

use super::trigger::TriggerBinding;
use crate::ammo::AmmoType;
use crate::attributes::SelectiveFireState;
use crate::core::time::TICKS_PER_SECOND;
use crate::firearm::FirearmKind;
use serde::{Deserialize, Serialize};

fn one() -> u32 {
    1
}

fn default_projectile_speed() -> f64 {
    80.0
}

/// One weapon definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Weapon id; filled from the table key when loading a registry file.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub info: InfoConfig,
    pub shoot: ShootConfig,
    #[serde(default)]
    pub scope: Option<ScopeConfig>,
    #[serde(default)]
    pub reload: Option<ReloadConfig>,
    #[serde(default)]
    pub firearm_action: Option<FirearmActionConfig>,
}

impl WeaponConfig {
    /// Magazine size, or `None` for weapons that never run dry.
    pub fn magazine_size(&self) -> Option<u32> {
        self.reload.as_ref().map(|r| r.magazine_size)
    }

    pub fn ammo(&self) -> Option<&AmmoConfig> {
        self.reload.as_ref().and_then(|r| r.ammo.as_ref())
    }

    pub fn uses_selective_fire(&self) -> bool {
        self.shoot.selective_fire.is_some()
    }

    /// Selective-fire state a fresh instance starts in.
    pub fn default_selective_fire(&self) -> SelectiveFireState {
        self.shoot
            .selective_fire
            .as_ref()
            .map(|s| s.default)
            .unwrap_or_default()
    }

    pub fn equip_delay_ticks(&self) -> u32 {
        self.info.weapon_equip_delay
    }

    pub fn scope_delay_ticks(&self) -> u32 {
        self.scope
            .as_ref()
            .map(|s| s.shoot_delay_after_scope)
            .unwrap_or(0)
    }

    pub fn reload_delay_ticks(&self) -> u32 {
        self.reload
            .as_ref()
            .map(|r| r.shoot_delay_after_reload)
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoConfig {
    /// Ticks after equipping before the weapon may fire.
    #[serde(default)]
    pub weapon_equip_delay: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShootConfig {
    pub trigger: TriggerBinding,
    /// Projectile template handed to the factory; `None` fires no projectile.
    #[serde(default)]
    pub projectile: Option<String>,
    /// Blocks per second.
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed: f64,
    #[serde(default = "one")]
    pub projectiles_per_shot: u32,
    #[serde(default = "one")]
    pub ammo_per_shot: u32,
    /// Ticks between two accepted shots of this weapon.
    #[serde(default)]
    pub delay_between_shots: u32,
    #[serde(default)]
    pub fully_automatic_shots_per_second: u32,
    #[serde(default)]
    pub burst: Option<BurstConfig>,
    #[serde(default)]
    pub selective_fire: Option<SelectiveFireConfig>,
    #[serde(default)]
    pub consume_item_on_shoot: bool,
    #[serde(default)]
    pub destroy_when_empty: bool,
    #[serde(default)]
    pub reset_fall_distance: bool,
}

impl ShootConfig {
    pub fn new(trigger: TriggerBinding) -> Self {
        Self {
            trigger,
            projectile: None,
            projectile_speed: default_projectile_speed(),
            projectiles_per_shot: 1,
            ammo_per_shot: 1,
            delay_between_shots: 0,
            fully_automatic_shots_per_second: 0,
            burst: None,
            selective_fire: None,
            consume_item_on_shoot: false,
            destroy_when_empty: false,
            reset_fall_distance: false,
        }
    }

    /// Speed in blocks per tick.
    pub fn speed_per_tick(&self) -> f64 {
        self.projectile_speed / f64::from(TICKS_PER_SECOND)
    }

    /// Burst settings when both counts are non-zero.
    pub fn usable_burst(&self) -> Option<BurstConfig> {
        self.burst
            .filter(|b| b.shots_per_burst > 0 && b.ticks_between_each_shot > 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstConfig {
    pub shots_per_burst: u32,
    pub ticks_between_each_shot: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectiveFireConfig {
    pub trigger: TriggerBinding,
    #[serde(default)]
    pub default: SelectiveFireState,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopeConfig {
    #[serde(default)]
    pub trigger: TriggerBinding,
    #[serde(default)]
    pub shoot_delay_after_scope: u32,
    #[serde(default)]
    pub unscope_after_shot: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReloadConfig {
    pub magazine_size: u32,
    /// Rounds loaded per reload cycle; `None` fills the magazine at once.
    #[serde(default)]
    pub ammo_per_reload: Option<u32>,
    /// Ticks a reload cycle takes.
    pub reload_duration: u32,
    #[serde(default)]
    pub shoot_delay_after_reload: u32,
    #[serde(default)]
    pub ammo: Option<AmmoConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmmoConfig {
    pub ammo_types: Vec<AmmoType>,
    #[serde(default)]
    pub switch_automatically_when_empty: bool,
    #[serde(default)]
    pub switch_trigger: Option<TriggerBinding>,
    /// Named side effect run once per ammo type switch.
    #[serde(default)]
    pub switch_mechanic: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirearmActionConfig {
    pub kind: FirearmKind,
    /// Cycle once every `frequency` shots.
    #[serde(default = "one")]
    pub frequency: u32,
    /// Ticks from OPEN to CLOSE.
    pub open_time: u32,
    /// Ticks from CLOSE to READY.
    pub close_time: u32,
}
