//! Selective-fire and ammo-type switching.

use super::FireControlEngine;
use crate::ammo::AmmoSystem;
use crate::attributes::SelectiveFireState;
use crate::config::{TriggerKind, WeaponConfig};
use crate::core::State;
use crate::env::{ActorId, Environment, Hand, ShotContext};
use std::sync::Arc;

/// Whether `config` can actually fire in `mode`.
fn supports(config: &WeaponConfig, mode: SelectiveFireState) -> bool {
    match mode {
        SelectiveFireState::Single => true,
        SelectiveFireState::Burst => config.shoot.usable_burst().is_some(),
        SelectiveFireState::Auto => config.shoot.fully_automatic_shots_per_second > 0,
    }
}

/// Next mode after `current` in SINGLE → BURST → AUTO order, skipping the
/// ones the weapon lacks.
fn next_mode(config: &WeaponConfig, current: SelectiveFireState) -> SelectiveFireState {
    let mut candidate = current.next();
    while candidate != current {
        if supports(config, candidate) {
            return candidate;
        }
        candidate = candidate.next();
    }
    current
}

impl<E: Environment> FireControlEngine<E> {
    /// Cycle the selective-fire mode when `trigger` is the weapon's
    /// selective-fire trigger.
    pub fn try_switch_selective_fire(
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
        let Some(selective) = &config.shoot.selective_fire else {
            return false;
        };
        let view = self.circumstances(actor, hand, dual_wield);
        if !selective.trigger.check(trigger, hand, dual_wield, &view) {
            return false;
        }
        let Some(item) = self.held_weapon(actor, hand, weapon_id) else {
            return false;
        };

        let attrs = self.attrs(item.instance, config);
        let current = attrs.selective_fire;
        let next = next_mode(config, current);
        if next == current {
            return false;
        }
        attrs.selective_fire = next;

        self.cancel_tasks(actor, hand);
        tracing::debug!(
            %actor,
            weapon = weapon_id,
            from = current.name(),
            to = next.name(),
            "Selective fire switched"
        );
        let ctx = ShotContext {
            actor,
            weapon_id,
            instance: item.instance,
            hand,
        };
        self.env.selective_fire_switched(&ctx, next);
        true
    }

    /// Move to the next ammo type when `trigger` is the weapon's ammo-switch
    /// trigger. The loaded rounds go back to the inventory and the weapon
    /// reloads with the new type.
    pub fn try_switch_ammo_type(
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
        let Some(ammo) = config.ammo() else {
            return false;
        };
        let Some(binding) = &ammo.switch_trigger else {
            return false;
        };
        if ammo.ammo_types.len() < 2 {
            return false;
        }
        let view = self.circumstances(actor, hand, dual_wield);
        if !binding.check(trigger, hand, dual_wield, &view) {
            return false;
        }
        let Some(item) = self.held_weapon(actor, hand, weapon_id) else {
            return false;
        };

        self.cancel_tasks(actor, hand);

        let system = AmmoSystem::new(ammo);
        let attrs = self.attributes.get_or_init(item.instance, config);
        let returned = std::mem::take(&mut attrs.ammo_left);
        if returned > 0 {
            system.give_ammo(&mut self.env, actor, attrs, returned);
        }
        let next = (attrs.ammo_type_index + 1) % system.len();
        attrs.ammo_type_index = next;

        tracing::debug!(%actor, weapon = weapon_id, index = next, returned, "Ammo type switched");
        let ctx = ShotContext {
            actor,
            weapon_id,
            instance: item.instance,
            hand,
        };
        self.env
            .ammo_switched(&ctx, ammo.switch_mechanic.as_deref(), next);
        self.start_reload(actor, weapon_id, hand, dual_wield, false);
        true
    }
}
