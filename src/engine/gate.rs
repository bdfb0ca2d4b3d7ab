//! Trigger resolution and the shot gating pipeline.

use super::{FireControlEngine, WEAPON_SHOOT_FLAG};
use crate::attributes::SelectiveFireState;
use crate::config::{CircumstanceView, TriggerKind, WeaponConfig};
use crate::core::time::{has_millis_passed, ticks_to_millis};
use crate::env::{ActorId, Environment, Hand, ShotContext};
use crate::firearm::FirearmState;
use chrono::{DateTime, Utc};
use std::sync::Arc;

impl<E: Environment> FireControlEngine<E> {
    /// Handle a trigger event for the weapon in `hand`.
    ///
    /// Melee on the main hand is answered by the world's melee handler.
    /// Anything else must match the weapon's trigger binding before the
    /// gating pipeline runs.
    pub fn try_use(
        &mut self,
        actor: ActorId,
        weapon_id: &str,
        hand: Hand,
        trigger: TriggerKind,
        dual_wield: bool,
        known_victim: Option<ActorId>,
    ) -> bool {
        if trigger == TriggerKind::Melee && hand.is_main() {
            return self.env.try_melee(actor, weapon_id, hand, known_victim);
        }

        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(weapon_id) else {
            return false;
        };
        let view = self.circumstances(actor, hand, dual_wield);
        if !config.shoot.trigger.check(trigger, hand, dual_wield, &view) {
            return false;
        }
        self.shoot_without_trigger(actor, weapon_id, hand, trigger, dual_wield)
    }

    /// Run the gating pipeline and dispatch to a fire mode.
    ///
    /// Each gate denies without side effects, except the ammo and firearm
    /// gates which may start a reload or resume a firearm cycle before
    /// denying.
    pub fn shoot_without_trigger(
        &mut self,
        actor: ActorId,
        weapon_id: &str,
        hand: Hand,
        trigger: TriggerKind,
        dual_wield: bool,
    ) -> bool {
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(weapon_id) else {
            return false;
        };
        let Some(item) = self.held_weapon(actor, hand, weapon_id) else {
            return false;
        };
        let is_melee = trigger == TriggerKind::Melee;

        if self.hands.is_firing(actor, hand) {
            return false;
        }

        let ctx = ShotContext {
            actor,
            weapon_id,
            instance: item.instance,
            hand,
        };
        if self.env.pre_shoot(&ctx).is_denied() {
            tracing::trace!(%actor, weapon = weapon_id, "Shot vetoed by pre-shoot hook");
            return false;
        }

        let location = self.env.location(actor);
        let verdict = self.env.test_flag(&location, Some(actor), WEAPON_SHOOT_FLAG);
        if !verdict.allowed {
            if let Some(message) = verdict.message.filter(|m| !m.is_empty()) {
                self.env.send_message(actor, &message);
            }
            return false;
        }

        if !self.env.has_permission(actor, weapon_id) {
            if self.env.is_player(actor) {
                let message = format!("You do not have permission to use {weapon_id}");
                self.env.send_message(actor, &message);
            }
            return false;
        }

        if config.shoot.consume_item_on_shoot {
            if item.amount == 0 {
                return false;
            }
        } else {
            self.env.normalize_weapon_stack(actor, hand);
        }

        if self.hands.is_reloading(actor, hand.other()) {
            return false;
        }

        let ammo_left = self.ammo_left(item.instance, config);

        if config.firearm_action.is_some()
            && self.attrs(item.instance, config).firearm_state != FirearmState::Ready
        {
            if ammo_left == Some(0) {
                self.start_reload_if_both_weapons_empty(actor, weapon_id, hand, dual_wield, false);
            } else {
                self.stop_reloading(actor, hand);
                self.do_shoot_firearm_actions(actor, weapon_id, hand);
            }
            return false;
        }

        if ammo_left == Some(0) {
            self.start_reload_if_both_weapons_empty(actor, weapon_id, hand, dual_wield, false);
            return false;
        }

        if self.hands.is_reloading(actor, hand) {
            self.stop_reloading(actor, hand);
        }

        let selective = config
            .uses_selective_fire()
            .then(|| self.attrs(item.instance, config).selective_fire);
        let now = self.env.now();
        if !self.timing_gates_pass(actor, hand, config, selective, is_melee, now) {
            return false;
        }

        if is_melee {
            return self.single_shot(actor, config, hand, item.instance, dual_wield, true);
        }
        match selective {
            Some(SelectiveFireState::Single) => {
                self.single_shot(actor, config, hand, item.instance, dual_wield, false)
            }
            Some(SelectiveFireState::Burst) => {
                self.burst_shot(actor, config, hand, item.instance, dual_wield)
            }
            Some(SelectiveFireState::Auto) => {
                self.full_auto_shot(actor, config, hand, item.instance, trigger, dual_wield)
            }
            None => {
                self.full_auto_shot(actor, config, hand, item.instance, trigger, dual_wield)
                    || self.burst_shot(actor, config, hand, item.instance, dual_wield)
                    || self.single_shot(actor, config, hand, item.instance, dual_wield, false)
            }
        }
    }

    /// Whether the held input behind `trigger` still holds for `actor`.
    pub fn keep_full_auto_on(&self, actor: ActorId, trigger: TriggerKind) -> bool {
        trigger.is_held(&self.env.input(actor))
    }

    pub(super) fn circumstances(
        &self,
        actor: ActorId,
        hand: Hand,
        dual_wield: bool,
    ) -> CircumstanceView {
        CircumstanceView {
            input: self.env.input(actor),
            reloading: self.hands.is_actor_reloading(actor),
            zooming: self.hands.get(actor, hand).is_some_and(|s| s.is_zooming()),
            dual_wielding: dual_wield,
        }
    }

    fn timing_gates_pass(
        &self,
        actor: ActorId,
        hand: Hand,
        config: &WeaponConfig,
        selective: Option<SelectiveFireState>,
        is_melee: bool,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(state) = self.hands.get(actor, hand) else {
            return true;
        };
        let passed = |since: Option<DateTime<Utc>>, ticks: u32| {
            ticks == 0 || has_millis_passed(since, now, ticks_to_millis(ticks))
        };

        let gates_shot_delay = selective != Some(SelectiveFireState::Auto) && !is_melee;
        if gates_shot_delay
            && !passed(state.last_shot_time(&config.id), config.shoot.delay_between_shots)
        {
            tracing::trace!(%actor, weapon = %config.id, "Delay between shots not elapsed");
            return false;
        }

        passed(state.last_equip_time(), config.equip_delay_ticks())
            && passed(state.last_scope_time(), config.scope_delay_ticks())
            && passed(state.last_reload_time(), config.reload_delay_ticks())
    }
}
