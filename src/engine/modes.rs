//! Single, burst and full-automatic fire.

use super::{target, FireControlEngine};
use crate::ammo::AmmoSystem;
use crate::config::{TriggerKind, WeaponConfig};
use crate::core::time::{MAX_SHOTS_PER_SECOND, TICKS_PER_SECOND};
use crate::env::{ActorId, Environment, Hand, Location, ShotContext, Vector3, WeaponInstanceId};
use crate::hand::{FireMode, FireTask};
use crate::schedule::{Task, TaskHandle, TaskTarget};
use std::sync::Arc;

/// Shots due on tick `tick_index` of a second spread over 20 ticks.
///
/// Shot `n` of the second lands on the first tick at or after
/// `n * 20 / shots_per_second`, so ten shots per second fire every other
/// tick.
pub fn shots_for_tick(shots_per_second: u32, tick_index: u32) -> u32 {
    let t = u64::from(tick_index % TICKS_PER_SECOND);
    let due_by =
        |ticks: u64| (ticks * u64::from(shots_per_second)).div_ceil(u64::from(TICKS_PER_SECOND));
    u32::try_from(due_by(t + 1) - due_by(t)).unwrap_or(u32::MAX)
}

impl<E: Environment> FireControlEngine<E> {
    pub(super) fn single_shot(
        &mut self,
        actor: ActorId,
        config: &WeaponConfig,
        hand: Hand,
        instance: WeaponInstanceId,
        dual_wield: bool,
        is_melee: bool,
    ) -> bool {
        if !self.consume_magazine(instance, config) {
            return false;
        }
        let origin = self.shoot_location(actor, hand, dual_wield);
        self.shoot(actor, &config.id, origin, hand, true, is_melee);
        if self.consume_item_after_shot(actor, hand, instance, config) {
            return true;
        }
        self.reload_or_cycle(actor, config, hand, instance, dual_wield);
        true
    }

    pub(super) fn burst_shot(
        &mut self,
        actor: ActorId,
        config: &WeaponConfig,
        hand: Hand,
        instance: WeaponInstanceId,
        dual_wield: bool,
    ) -> bool {
        let Some(burst) = config.shoot.usable_burst() else {
            return false;
        };
        let target = target(actor, hand, &config.id, instance);
        let period = burst.ticks_between_each_shot;
        let task = Task::Burst {
            target: target.clone(),
            dual_wield,
        };
        let handle = self.scheduler.schedule_repeating(task, period, period);
        let fire = FireTask {
            handle,
            mode: FireMode::Burst {
                shots_fired: 0,
                shots_per_burst: burst.shots_per_burst,
            },
        };
        if !self.hands.get_mut(actor, hand).start_fire(fire) {
            self.scheduler.cancel(handle);
            return false;
        }
        tracing::debug!(
            %actor,
            weapon = %config.id,
            shots = burst.shots_per_burst,
            "Burst started"
        );
        self.run_burst(handle, &target, dual_wield);
        true
    }

    pub(super) fn full_auto_shot(
        &mut self,
        actor: ActorId,
        config: &WeaponConfig,
        hand: Hand,
        instance: WeaponInstanceId,
        trigger: TriggerKind,
        dual_wield: bool,
    ) -> bool {
        // The hook runs even at rate 0 so a host can convert a weapon.
        let configured = config.shoot.fully_automatic_shots_per_second;
        let ctx = ShotContext {
            actor,
            weapon_id: &config.id,
            instance,
            hand,
        };
        let Some(requested) = self.env.full_auto_start(&ctx, configured).resolve(configured) else {
            return false;
        };
        if requested == 0 {
            return false;
        }
        let shots_per_second = requested.min(MAX_SHOTS_PER_SECOND);
        if shots_per_second < requested {
            tracing::warn!(
                %actor,
                weapon = %config.id,
                requested,
                max = MAX_SHOTS_PER_SECOND,
                "Full-auto rate clamped"
            );
        }

        let target = target(actor, hand, &config.id, instance);
        let task = Task::FullAuto {
            target: target.clone(),
            trigger,
            dual_wield,
        };
        let handle = self.scheduler.schedule_repeating(task, 1, 1);
        let fire = FireTask {
            handle,
            mode: FireMode::FullAuto {
                shots_per_second,
                tick_index: 0,
            },
        };
        if !self.hands.get_mut(actor, hand).start_fire(fire) {
            self.scheduler.cancel(handle);
            return false;
        }
        tracing::debug!(%actor, weapon = %config.id, shots_per_second, "Full-auto started");
        self.run_full_auto(handle, &target, trigger, dual_wield);
        true
    }

    /// One shot of a running burst.
    pub(super) fn run_burst(&mut self, handle: TaskHandle, target: &TaskTarget, dual_wield: bool) {
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(&target.weapon_id) else {
            self.end_fire(target, handle);
            return;
        };
        if !self.still_held(target) || self.hands.is_actor_reloading(target.actor) {
            self.end_fire(target, handle);
            return;
        }
        let first = matches!(
            self.hands.get(target.actor, target.hand).and_then(|s| s.fire_task()),
            Some(FireTask {
                mode: FireMode::Burst { shots_fired: 0, .. },
                ..
            })
        );

        if !self.consume_magazine(target.instance, config) {
            self.end_fire(target, handle);
            self.start_reload_if_both_weapons_empty(
                target.actor,
                &target.weapon_id,
                target.hand,
                dual_wield,
                false,
            );
            return;
        }
        let origin = self.shoot_location(target.actor, target.hand, dual_wield);
        self.shoot(target.actor, &target.weapon_id, origin, target.hand, first, false);
        if self.consume_item_after_shot(target.actor, target.hand, target.instance, config) {
            return;
        }

        let finished = match self
            .hands
            .existing_mut(target.actor, target.hand)
            .and_then(|state| state.fire_mode_mut(handle))
        {
            Some(FireMode::Burst {
                shots_fired,
                shots_per_burst,
            }) => {
                *shots_fired += 1;
                *shots_fired >= *shots_per_burst
            }
            _ => {
                self.scheduler.cancel(handle);
                return;
            }
        };
        if finished {
            self.end_fire(target, handle);
            self.reload_or_cycle(target.actor, config, target.hand, target.instance, dual_wield);
        }
    }

    /// One tick of running full-automatic fire.
    pub(super) fn run_full_auto(
        &mut self,
        handle: TaskHandle,
        target: &TaskTarget,
        trigger: TriggerKind,
        dual_wield: bool,
    ) {
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(&target.weapon_id) else {
            self.end_fire(target, handle);
            return;
        };
        let (shots_per_second, tick_index) = match self
            .hands
            .existing_mut(target.actor, target.hand)
            .and_then(|state| state.fire_mode_mut(handle))
        {
            Some(FireMode::FullAuto {
                shots_per_second,
                tick_index,
            }) => {
                let current = *tick_index;
                *tick_index += 1;
                (*shots_per_second, current)
            }
            _ => {
                self.scheduler.cancel(handle);
                return;
            }
        };

        // the first tick runs inside the trigger event itself
        let held = tick_index == 0 || {
            let view = self.circumstances(target.actor, target.hand, dual_wield);
            config.shoot.trigger.check_circumstances(&view)
                && self.keep_full_auto_on(target.actor, trigger)
        };
        if !self.still_held(target) || !held || self.hands.is_actor_reloading(target.actor) {
            tracing::trace!(actor = %target.actor, "Full-auto released");
            self.end_fire(target, handle);
            return;
        }

        let shots = shots_for_tick(shots_per_second, tick_index);
        if shots == 0 {
            return;
        }
        let origin = self.shoot_location(target.actor, target.hand, dual_wield);
        for shot in 0..shots {
            if !self.consume_magazine(target.instance, config) {
                self.end_fire(target, handle);
                self.start_reload_if_both_weapons_empty(
                    target.actor,
                    &target.weapon_id,
                    target.hand,
                    dual_wield,
                    false,
                );
                return;
            }
            self.shoot(target.actor, &target.weapon_id, origin, target.hand, shot == 0, false);
            if self.consume_item_after_shot(target.actor, target.hand, target.instance, config) {
                return;
            }
        }

        if self.ammo_left(target.instance, config) == Some(0) {
            self.end_fire(target, handle);
            self.start_reload_if_both_weapons_empty(
                target.actor,
                &target.weapon_id,
                target.hand,
                dual_wield,
                false,
            );
        }
    }

    /// Take one shot's worth of rounds out of the magazine.
    fn consume_magazine(&mut self, instance: WeaponInstanceId, config: &WeaponConfig) -> bool {
        if config.magazine_size().is_none() {
            return true;
        }
        let amount = config.shoot.ammo_per_shot;
        AmmoSystem::consume(self.attrs(instance, config), amount)
    }

    /// Use up the held item when the weapon is thrown away with its shot.
    /// Returns true when the stack ran out; the hand is cancelled and the
    /// instance forgotten.
    fn consume_item_after_shot(
        &mut self,
        actor: ActorId,
        hand: Hand,
        instance: WeaponInstanceId,
        config: &WeaponConfig,
    ) -> bool {
        let destroy =
            config.shoot.destroy_when_empty && self.ammo_left(instance, config) == Some(0);
        if !destroy && !config.shoot.consume_item_on_shoot {
            return false;
        }
        if self.env.consume_item(actor, hand) > 0 {
            return false;
        }
        tracing::debug!(%actor, weapon = %config.id, "Weapon stack used up");
        self.cancel_tasks(actor, hand);
        self.forget_instance(instance);
        true
    }

    /// After a finished shot sequence: reload when empty, otherwise cycle
    /// the firearm action.
    fn reload_or_cycle(
        &mut self,
        actor: ActorId,
        config: &WeaponConfig,
        hand: Hand,
        instance: WeaponInstanceId,
        dual_wield: bool,
    ) {
        if self.ammo_left(instance, config) == Some(0) {
            self.start_reload_if_both_weapons_empty(actor, &config.id, hand, dual_wield, false);
        } else {
            self.do_shoot_firearm_actions(actor, &config.id, hand);
        }
    }

    /// Muzzle position: the eye, shifted sideways towards the firing hand
    /// when dual wielding.
    fn shoot_location(&self, actor: ActorId, hand: Hand, dual_wield: bool) -> Location {
        let eye = self.env.eye_location(actor);
        if !dual_wield {
            return eye;
        }
        let yaw = eye.yaw.to_radians();
        let right = Vector3::new(-yaw.cos(), 0.0, -yaw.sin());
        let side = if hand.is_main() { 1.0 } else { -1.0 };
        let offset = right.scale(side * self.env.body_width(actor) / 2.0);
        Location {
            x: eye.x + offset.x,
            z: eye.z + offset.z,
            ..eye
        }
    }
}
