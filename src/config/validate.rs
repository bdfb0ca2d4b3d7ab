//! Load-time validation of weapon definitions.
//!
//! Every rule runs, and every failure is reported, so a broken definition
//! shows all of its problems at once.

use super::error::ConfigViolation;
use super::weapon::WeaponConfig;
use crate::core::time::MAX_SHOTS_PER_SECOND;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

const MAX_PROJECTILES_PER_SHOT: u32 = 100;
const MAX_SHOTS_PER_BURST: u32 = 100;

fn ensure(condition: bool, violation: impl FnOnce() -> ConfigViolation) -> Check {
    if condition {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

fn positive(weapon: &str, field: &'static str, value: f64) -> Check {
    ensure(value > 0.0, || ConfigViolation::NotPositive {
        weapon: weapon.to_string(),
        field,
        value,
    })
}

fn in_range(weapon: &str, field: &'static str, min: u32, max: u32, value: u32) -> Check {
    ensure((min..=max).contains(&value), || ConfigViolation::OutOfRange {
        weapon: weapon.to_string(),
        field,
        min,
        max,
        value,
    })
}

/// Validate one definition, accumulating all violations.
pub fn validate(config: &WeaponConfig) -> Check {
    let id = config.id.as_str();
    let shoot = &config.shoot;
    let mut checks: Vec<Check> = vec![
        ensure(shoot.trigger.slots().next().is_some(), || {
            ConfigViolation::MissingTrigger {
                weapon: id.to_string(),
            }
        }),
        positive(id, "projectile_speed", shoot.projectile_speed),
        in_range(
            id,
            "projectiles_per_shot",
            1,
            MAX_PROJECTILES_PER_SHOT,
            shoot.projectiles_per_shot,
        ),
        positive(id, "ammo_per_shot", f64::from(shoot.ammo_per_shot)),
        in_range(
            id,
            "fully_automatic_shots_per_second",
            0,
            MAX_SHOTS_PER_SECOND,
            shoot.fully_automatic_shots_per_second,
        ),
    ];

    if let Some(burst) = shoot.burst {
        checks.push(in_range(
            id,
            "shots_per_burst",
            1,
            MAX_SHOTS_PER_BURST,
            burst.shots_per_burst,
        ));
        checks.push(positive(
            id,
            "ticks_between_each_shot",
            f64::from(burst.ticks_between_each_shot),
        ));
    }

    if shoot.selective_fire.is_some() {
        checks.push(ensure(
            shoot.burst.is_some() || shoot.fully_automatic_shots_per_second > 0,
            || ConfigViolation::SelectiveFireWithoutModes {
                weapon: id.to_string(),
            },
        ));
    }

    if shoot.fully_automatic_shots_per_second > 0 {
        for (slot, kind) in shoot.trigger.slots() {
            checks.push(ensure(kind.is_continuous(), || {
                ConfigViolation::NonContinuousFullAuto {
                    weapon: id.to_string(),
                    slot,
                    trigger: format!("{kind:?}"),
                }
            }));
        }
    }

    if let Some(reload) = &config.reload {
        checks.push(positive(id, "magazine_size", f64::from(reload.magazine_size)));
        checks.push(positive(
            id,
            "reload_duration",
            f64::from(reload.reload_duration),
        ));
        if let Some(per_reload) = reload.ammo_per_reload {
            checks.push(positive(id, "ammo_per_reload", f64::from(per_reload)));
        }
        if let Some(ammo) = &reload.ammo {
            checks.push(ensure(!ammo.ammo_types.is_empty(), || {
                ConfigViolation::NoAmmoTypes {
                    weapon: id.to_string(),
                }
            }));
        }
    }

    if let Some(action) = &config.firearm_action {
        checks.push(positive(id, "frequency", f64::from(action.frequency)));
    }

    Validation::all_vec(checks).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BurstConfig, SelectiveFireConfig, ShootConfig, TriggerBinding, TriggerKind,
    };

    fn weapon(shoot: ShootConfig) -> WeaponConfig {
        WeaponConfig {
            id: "test".to_string(),
            info: Default::default(),
            shoot,
            scope: None,
            reload: None,
            firearm_action: None,
        }
    }

    #[test]
    fn valid_definition_passes() {
        let config = weapon(ShootConfig::new(TriggerBinding::main_hand(
            TriggerKind::RightClick,
        )));
        assert!(validate(&config).is_success());
    }

    #[test]
    fn accumulates_every_violation() {
        let mut shoot = ShootConfig::new(TriggerBinding::main_hand(TriggerKind::LeftClick));
        shoot.projectile_speed = 0.0;
        shoot.projectiles_per_shot = 0;
        shoot.fully_automatic_shots_per_second = 20;
        shoot.burst = Some(BurstConfig {
            shots_per_burst: 101,
            ticks_between_each_shot: 1,
        });

        match validate(&weapon(shoot)) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigViolation::NonContinuousFullAuto { .. })));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ConfigViolation::OutOfRange {
                        field: "shots_per_burst",
                        ..
                    }
                )));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn selective_fire_requires_a_mode() {
        let mut shoot = ShootConfig::new(TriggerBinding::main_hand(TriggerKind::RightClick));
        shoot.selective_fire = Some(SelectiveFireConfig {
            trigger: TriggerBinding::main_hand(TriggerKind::SwapHands),
            default: Default::default(),
        });

        let result = validate(&weapon(shoot));
        assert!(result.is_failure());
        if let Validation::Failure(errors) = result {
            assert!(errors
                .iter()
                .any(|e| matches!(e, ConfigViolation::SelectiveFireWithoutModes { .. })));
        }
    }

    #[test]
    fn unbound_trigger_is_rejected() {
        let config = weapon(ShootConfig::new(TriggerBinding::default()));
        assert!(validate(&config).is_failure());
    }
}
