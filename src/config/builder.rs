//! Fluent builder for weapon definitions.

use super::error::ConfigError;
use super::trigger::TriggerBinding;
use super::validate::validate;
use super::weapon::{
    AmmoConfig, BurstConfig, FirearmActionConfig, InfoConfig, ReloadConfig, ScopeConfig,
    SelectiveFireConfig, ShootConfig, WeaponConfig,
};
use crate::ammo::AmmoType;
use crate::attributes::SelectiveFireState;
use crate::firearm::FirearmKind;
use stillwater::validation::Validation;

/// Builder for constructing weapon definitions with a fluent API.
///
/// `build()` runs the same validation as registry loading.
///
/// # Example
///
/// ```
/// use firecontrol::config::{TriggerBinding, TriggerKind, WeaponConfigBuilder};
///
/// let trigger = TriggerBinding::main_hand(TriggerKind::RightClick);
/// let rifle = WeaponConfigBuilder::new("rifle", trigger)
///     .magazine(30, 40)
///     .full_auto(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(rifle.magazine_size(), Some(30));
/// ```
pub struct WeaponConfigBuilder {
    config: WeaponConfig,
}

impl WeaponConfigBuilder {
    pub fn new(id: impl Into<String>, trigger: TriggerBinding) -> Self {
        Self {
            config: WeaponConfig {
                id: id.into(),
                info: InfoConfig::default(),
                shoot: ShootConfig::new(trigger),
                scope: None,
                reload: None,
                firearm_action: None,
            },
        }
    }

    pub fn projectile(mut self, template: impl Into<String>, speed: f64) -> Self {
        self.config.shoot.projectile = Some(template.into());
        self.config.shoot.projectile_speed = speed;
        self
    }

    pub fn projectiles_per_shot(mut self, amount: u32) -> Self {
        self.config.shoot.projectiles_per_shot = amount;
        self
    }

    pub fn ammo_per_shot(mut self, amount: u32) -> Self {
        self.config.shoot.ammo_per_shot = amount;
        self
    }

    /// Ticks between two accepted shots.
    pub fn delay_between_shots(mut self, ticks: u32) -> Self {
        self.config.shoot.delay_between_shots = ticks;
        self
    }

    pub fn full_auto(mut self, shots_per_second: u32) -> Self {
        self.config.shoot.fully_automatic_shots_per_second = shots_per_second;
        self
    }

    pub fn burst(mut self, shots_per_burst: u32, ticks_between_each_shot: u32) -> Self {
        self.config.shoot.burst = Some(BurstConfig {
            shots_per_burst,
            ticks_between_each_shot,
        });
        self
    }

    pub fn selective_fire(mut self, trigger: TriggerBinding, default: SelectiveFireState) -> Self {
        self.config.shoot.selective_fire = Some(SelectiveFireConfig { trigger, default });
        self
    }

    pub fn consume_item_on_shoot(mut self) -> Self {
        self.config.shoot.consume_item_on_shoot = true;
        self
    }

    pub fn destroy_when_empty(mut self) -> Self {
        self.config.shoot.destroy_when_empty = true;
        self
    }

    pub fn reset_fall_distance(mut self) -> Self {
        self.config.shoot.reset_fall_distance = true;
        self
    }

    pub fn equip_delay(mut self, ticks: u32) -> Self {
        self.config.info.weapon_equip_delay = ticks;
        self
    }

    pub fn scope(mut self, trigger: TriggerBinding, shoot_delay_after_scope: u32) -> Self {
        self.config.scope = Some(ScopeConfig {
            trigger,
            shoot_delay_after_scope,
            unscope_after_shot: false,
        });
        self
    }

    pub fn unscope_after_shot(mut self) -> Self {
        if let Some(scope) = self.config.scope.as_mut() {
            scope.unscope_after_shot = true;
        }
        self
    }

    /// Magazine of `size` rounds refilled in `reload_duration` ticks.
    pub fn magazine(mut self, size: u32, reload_duration: u32) -> Self {
        self.config.reload = Some(ReloadConfig {
            magazine_size: size,
            ammo_per_reload: None,
            reload_duration,
            shoot_delay_after_reload: 0,
            ammo: None,
        });
        self
    }

    /// Load `amount` rounds per reload cycle instead of a full magazine.
    pub fn ammo_per_reload(mut self, amount: u32) -> Self {
        if let Some(reload) = self.config.reload.as_mut() {
            reload.ammo_per_reload = Some(amount);
        }
        self
    }

    pub fn shoot_delay_after_reload(mut self, ticks: u32) -> Self {
        if let Some(reload) = self.config.reload.as_mut() {
            reload.shoot_delay_after_reload = ticks;
        }
        self
    }

    /// Draw reloads from `ammo_types`; requires a magazine.
    pub fn ammo_types(mut self, ammo_types: Vec<AmmoType>, auto_switch: bool) -> Self {
        if let Some(reload) = self.config.reload.as_mut() {
            reload.ammo = Some(AmmoConfig {
                ammo_types,
                switch_automatically_when_empty: auto_switch,
                switch_trigger: None,
                switch_mechanic: None,
            });
        }
        self
    }

    pub fn ammo_switch(mut self, trigger: TriggerBinding, mechanic: Option<String>) -> Self {
        if let Some(ammo) = self.config.reload.as_mut().and_then(|r| r.ammo.as_mut()) {
            ammo.switch_trigger = Some(trigger);
            ammo.switch_mechanic = mechanic;
        }
        self
    }

    pub fn firearm_action(
        mut self,
        kind: FirearmKind,
        frequency: u32,
        open_time: u32,
        close_time: u32,
    ) -> Self {
        self.config.firearm_action = Some(FirearmActionConfig {
            kind,
            frequency,
            open_time,
            close_time,
        });
        self
    }

    /// Validate and return the definition.
    pub fn build(self) -> Result<WeaponConfig, ConfigError> {
        match validate(&self.config) {
            Validation::Success(_) => Ok(self.config),
            Validation::Failure(violations) => Err(ConfigError::Invalid {
                weapon: self.config.id,
                violations,
            }),
        }
    }
}
