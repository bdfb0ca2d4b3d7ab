//! Handing off to reload and taking the result back.

use super::{target, FireControlEngine};
use crate::ammo::{AmmoSystem, Switched};
use crate::config::AmmoConfig;
use crate::env::{ActorId, Environment, Hand, ReloadRequest, ShotContext};
use crate::hand::TaskOwner;
use crate::schedule::{Task, TaskHandle, TaskTarget};
use std::sync::Arc;

impl<E: Environment> FireControlEngine<E> {
    /// Reload the weapon in `hand` once it ran dry.
    ///
    /// Nothing happens while either hand reloads. When dual wielding, the
    /// reload waits until the other hand's weapon is empty too, so both
    /// reload together.
    pub fn start_reload_if_both_weapons_empty(
        &mut self,
        actor: ActorId,
        weapon_id: &str,
        hand: Hand,
        dual_wield: bool,
        is_reload_loop: bool,
    ) {
        if self.hands.is_actor_reloading(actor) {
            return;
        }
        if dual_wield && !self.other_hand_empty(actor, hand) {
            return;
        }
        self.cancel_tasks(actor, hand);
        if !self.start_reload(actor, weapon_id, hand, dual_wield, is_reload_loop) {
            self.env.refresh_skin(actor, weapon_id, hand);
        }
    }

    /// Start one reload cycle; returns whether a reload is now running.
    pub fn start_reload(
        &mut self,
        actor: ActorId,
        weapon_id: &str,
        hand: Hand,
        dual_wield: bool,
        is_reload_loop: bool,
    ) -> bool {
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(weapon_id) else {
            return false;
        };
        let Some(reload) = &config.reload else {
            return false;
        };
        let Some(item) = self.held_weapon(actor, hand, weapon_id) else {
            return false;
        };
        if self.hands.is_reloading(actor, hand) {
            return false;
        }
        if self.attrs(item.instance, config).ammo_left >= reload.magazine_size {
            return false;
        }

        let ctx = ShotContext {
            actor,
            weapon_id,
            instance: item.instance,
            hand,
        };
        let request = ReloadRequest {
            ctx,
            dual_wield,
            is_reload_loop,
        };
        if self.env.pre_reload(&request).is_denied() {
            tracing::trace!(%actor, weapon = weapon_id, "Reload vetoed by pre-reload hook");
            return false;
        }

        if let Some(ammo) = &reload.ammo {
            let attrs = self.attributes.get_or_init(item.instance, config);
            let found = AmmoSystem::new(ammo).has_ammo(&self.env, actor, attrs);
            self.notify_ammo_switched(&ctx, ammo, &found);
            if !found.value {
                tracing::trace!(%actor, weapon = weapon_id, "No ammo to reload with");
                return false;
            }
        }

        let tick = self.scheduler.current_tick();
        let task = Task::ReloadComplete {
            target: target(actor, hand, weapon_id, item.instance),
            dual_wield,
        };
        let handle = self.scheduler.schedule_delayed(task, reload.reload_duration);
        let owner = TaskOwner {
            weapon_id: weapon_id.to_string(),
            instance: item.instance,
        };
        self.hands.get_mut(actor, hand).add_reload_task(handle, owner, tick);
        tracing::debug!(
            %actor,
            weapon = weapon_id,
            ?hand,
            ticks = reload.reload_duration,
            "Reload started"
        );
        true
    }

    /// The reload task came due: load what the inventory allows.
    pub(super) fn complete_reload(
        &mut self,
        handle: TaskHandle,
        target: &TaskTarget,
        dual_wield: bool,
    ) {
        if !self.still_held(target) {
            self.stop_reloading(target.actor, target.hand);
            return;
        }
        if let Some(state) = self.hands.existing_mut(target.actor, target.hand) {
            state.remove_reload_task(handle);
        }
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(&target.weapon_id) else {
            return;
        };
        let Some(reload) = &config.reload else {
            return;
        };

        let ctx = ShotContext {
            actor: target.actor,
            weapon_id: &target.weapon_id,
            instance: target.instance,
            hand: target.hand,
        };
        let attrs = self.attributes.get_or_init(target.instance, config);
        let missing = reload.magazine_size.saturating_sub(attrs.ammo_left);
        let wanted = reload.ammo_per_reload.map_or(missing, |n| n.min(missing));
        let loaded = match &reload.ammo {
            Some(ammo) => {
                let system = AmmoSystem::new(ammo);
                let available = system.max_ammo(&self.env, target.actor, attrs);
                let removed =
                    system.remove_ammo(&mut self.env, target.actor, attrs, wanted.min(available));
                let loaded = removed.value;
                self.notify_ammo_switched(&ctx, ammo, &removed);
                loaded
            }
            None => wanted,
        };

        let attrs = self.attributes.get_or_init(target.instance, config);
        attrs.ammo_left += loaded;
        let full = attrs.ammo_left >= reload.magazine_size;

        let now = self.env.now();
        self.hands
            .get_mut(target.actor, target.hand)
            .set_last_reload_time(now);
        tracing::debug!(
            actor = %target.actor,
            weapon = %target.weapon_id,
            loaded,
            full,
            "Reload complete"
        );
        self.env.reload_complete(&ctx, loaded);

        if !full && loaded > 0 {
            self.start_reload_if_both_weapons_empty(
                target.actor,
                &target.weapon_id,
                target.hand,
                dual_wield,
                true,
            );
        }
    }

    /// Whether the weapon in the other hand has nothing left to fire.
    /// Items that are no weapon count as empty.
    fn other_hand_empty(&mut self, actor: ActorId, hand: Hand) -> bool {
        let Some(other) = self.env.held_item(actor, hand.other()) else {
            return true;
        };
        let weapons = Arc::clone(&self.weapons);
        match weapons.get(&other.weapon_id) {
            Some(config) => self.ammo_left(other.instance, config) == Some(0),
            None => true,
        }
    }

    pub(super) fn notify_ammo_switched<T>(
        &mut self,
        ctx: &ShotContext<'_>,
        ammo: &AmmoConfig,
        result: &Switched<T>,
    ) {
        if let Some(index) = result.switched_to {
            self.env
                .ammo_switched(ctx, ammo.switch_mechanic.as_deref(), index);
        }
    }
}
