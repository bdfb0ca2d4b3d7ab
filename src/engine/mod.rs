//! The fire-control engine.
//!
//! [`FireControlEngine`] owns every piece of mutable fire-control state:
//! per-instance attributes, per-hand sessions, the tick scheduler and the
//! firearm machine. The host environment is consulted for everything else
//! through the traits in [`crate::env`].
//!
//! All operations take `&mut self`; a host that drives the engine from
//! several threads wraps it in a mutex. Denials are reported as `false`
//! and leave no side effect behind.

mod firearm;
mod gate;
mod modes;
mod reload;
mod shoot;
mod switch;

#[cfg(test)]
mod tests;

use crate::attributes::{AttributeTable, WeaponAttributes};
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::config::{WeaponConfig, WeaponRegistry};
use crate::env::{ActorId, Environment, Hand, HeldItem, ShotContext, WeaponInstanceId};
use crate::firearm::FirearmActionMachine;
use crate::hand::{CancelReport, FirearmCancel, HandRegistry, HandState, ReloadCancel};
use crate::schedule::{Task, TaskHandle, TaskTarget, TickScheduler};
use std::sync::Arc;

/// Region flag consulted before every shot.
pub const WEAPON_SHOOT_FLAG: &str = "weapon-shoot";

pub struct FireControlEngine<E: Environment> {
    env: E,
    weapons: Arc<WeaponRegistry>,
    attributes: AttributeTable,
    hands: HandRegistry,
    scheduler: TickScheduler,
    firearm: FirearmActionMachine,
}

impl<E: Environment> FireControlEngine<E> {
    pub fn new(env: E, weapons: WeaponRegistry) -> Self {
        Self {
            env,
            weapons: Arc::new(weapons),
            attributes: AttributeTable::new(),
            hands: HandRegistry::new(),
            scheduler: TickScheduler::new(),
            firearm: FirearmActionMachine::new(),
        }
    }

    pub fn with_firearm_machine(mut self, machine: FirearmActionMachine) -> Self {
        self.firearm = machine;
        self
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn weapons(&self) -> &WeaponRegistry {
        &self.weapons
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeTable {
        &mut self.attributes
    }

    pub fn hand(&self, actor: ActorId, hand: Hand) -> Option<&HandState> {
        self.hands.get(actor, hand)
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn firearm_machine(&self) -> &FirearmActionMachine {
        &self.firearm
    }

    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// Whether either hand of `actor` is reloading.
    pub fn is_reloading(&self, actor: ActorId) -> bool {
        self.hands.is_actor_reloading(actor)
    }

    /// Snapshot the attribute table and firearm histories.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::capture(
            &self.attributes,
            &self.firearm,
            self.scheduler.current_tick(),
            self.env.now(),
        )
    }

    pub fn restore(&mut self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        checkpoint.restore_into(&mut self.attributes, &mut self.firearm)
    }

    /// Advance the scheduler one tick and run every task due on it.
    pub fn tick(&mut self) {
        for handle in self.scheduler.advance() {
            // an earlier task of this tick may have cancelled it
            let Some(task) = self.scheduler.take_due(handle) else {
                continue;
            };
            match task {
                Task::FullAuto {
                    target,
                    trigger,
                    dual_wield,
                } => self.run_full_auto(handle, &target, trigger, dual_wield),
                Task::Burst { target, dual_wield } => self.run_burst(handle, &target, dual_wield),
                Task::ReloadComplete { target, dual_wield } => {
                    self.complete_reload(handle, &target, dual_wield)
                }
                Task::FirearmStage { target, to } => self.run_firearm_stage(handle, &target, to),
                Task::Supplementary { actor, hand, task } => {
                    if let Some(state) = self.hands.existing_mut(actor, hand) {
                        state.remove_firearm_task(handle);
                    }
                    (task.action)();
                }
            }
        }
    }

    /// Cancel everything running on a hand: fire slot, reload, firearm
    /// action and zoom. Calling it again reports nothing.
    pub fn cancel_tasks(&mut self, actor: ActorId, hand: Hand) -> CancelReport {
        let tick = self.scheduler.current_tick();
        let Some(state) = self.hands.existing_mut(actor, hand) else {
            return CancelReport::default();
        };
        let report = state.cancel_tasks(tick);
        self.apply_cancel(actor, hand, &report);
        report
    }

    /// Record an equip on `hand`. Switching to a different weapon cancels
    /// whatever the hand was doing.
    pub fn equip(&mut self, actor: ActorId, hand: Hand, weapon_id: Option<&str>) {
        let changed = self
            .hands
            .get(actor, hand)
            .map_or(true, |state| state.current_weapon() != weapon_id);
        if changed {
            self.cancel_tasks(actor, hand);
        }
        let now = self.env.now();
        self.hands
            .get_mut(actor, hand)
            .equip(weapon_id.map(str::to_string), now);
        tracing::debug!(%actor, ?hand, weapon = ?weapon_id, "Weapon equipped");
    }

    pub fn set_zoom(&mut self, actor: ActorId, hand: Hand, zooming: bool) {
        let now = self.env.now();
        self.hands.get_mut(actor, hand).set_zooming(zooming, now);
    }

    /// Drop an actor that left: cancel both hands and forget their state.
    pub fn remove_actor(&mut self, actor: ActorId) {
        let tick = self.scheduler.current_tick();
        for (hand, mut state) in self.hands.remove_actor(actor) {
            let report = state.cancel_tasks(tick);
            self.apply_cancel(actor, hand, &report);
        }
        tracing::debug!(%actor, "Actor removed");
    }

    /// Drop the persisted attributes and firearm history of a weapon
    /// instance that left the world. Hosts call this when they destroy an
    /// item; used-up stacks are forgotten automatically.
    pub fn forget_instance(&mut self, instance: WeaponInstanceId) -> Option<WeaponAttributes> {
        self.firearm.forget(instance);
        let removed = self.attributes.remove(instance);
        tracing::debug!(%instance, had_attributes = removed.is_some(), "Weapon instance forgotten");
        removed
    }

    fn apply_cancel(&mut self, actor: ActorId, hand: Hand, report: &CancelReport) {
        if report.is_empty() {
            return;
        }
        for handle in report.handles() {
            self.scheduler.cancel(handle);
        }
        if let Some(reload) = &report.reload {
            self.notify_reload_cancelled(actor, hand, reload);
        }
        if let Some(FirearmCancel {
            owner: Some(owner), ..
        }) = &report.firearm
        {
            self.force_firearm_ready(owner.instance);
        }
        tracing::debug!(
            %actor,
            ?hand,
            fire = report.fire.is_some(),
            reload = report.reload.is_some(),
            firearm = report.firearm.is_some(),
            "Cancelled hand tasks"
        );
    }

    /// Cancel only the reload domain of a hand.
    fn stop_reloading(&mut self, actor: ActorId, hand: Hand) {
        let tick = self.scheduler.current_tick();
        let Some(cancel) = self
            .hands
            .existing_mut(actor, hand)
            .and_then(|state| state.cancel_reload(tick))
        else {
            return;
        };
        for handle in &cancel.handles {
            self.scheduler.cancel(*handle);
        }
        self.notify_reload_cancelled(actor, hand, &cancel);
    }

    /// Cancel only the firearm-action domain of a hand.
    fn stop_firearm_actions(&mut self, actor: ActorId, hand: Hand) -> Option<FirearmCancel> {
        let cancel = self.hands.existing_mut(actor, hand)?.cancel_firearm()?;
        for handle in &cancel.handles {
            self.scheduler.cancel(*handle);
        }
        Some(cancel)
    }

    fn notify_reload_cancelled(&mut self, actor: ActorId, hand: Hand, cancel: &ReloadCancel) {
        let Some(owner) = &cancel.owner else {
            return;
        };
        tracing::debug!(%actor, ?hand, elapsed = cancel.elapsed_ticks, "Reload cancelled");
        let ctx = ShotContext {
            actor,
            weapon_id: &owner.weapon_id,
            instance: owner.instance,
            hand,
        };
        self.env.reload_cancelled(&ctx, cancel.elapsed_ticks);
    }

    fn force_firearm_ready(&mut self, instance: WeaponInstanceId) {
        let now = self.env.now();
        let tick = self.scheduler.current_tick();
        if let Some(attrs) = self.attributes.get_mut(instance) {
            self.firearm.force_ready(instance, attrs, now, tick);
        }
    }

    /// Stop a repeating fire task and free the hand's fire slot.
    fn end_fire(&mut self, target: &TaskTarget, handle: TaskHandle) {
        self.scheduler.cancel(handle);
        if let Some(state) = self.hands.existing_mut(target.actor, target.hand) {
            state.clear_fire(handle);
        }
    }

    /// The item in `hand` when it is an instance of `weapon_id`.
    fn held_weapon(&self, actor: ActorId, hand: Hand, weapon_id: &str) -> Option<HeldItem> {
        self.env
            .held_item(actor, hand)
            .filter(|item| item.weapon_id == weapon_id)
    }

    /// Whether the instance a task was scheduled for is still in its hand.
    fn still_held(&self, target: &TaskTarget) -> bool {
        self.env
            .held_item(target.actor, target.hand)
            .is_some_and(|item| item.instance == target.instance)
    }

    fn attrs(
        &mut self,
        instance: WeaponInstanceId,
        config: &WeaponConfig,
    ) -> &mut WeaponAttributes {
        self.attributes.get_or_init(instance, config)
    }

    /// Rounds left in the magazine; `None` for weapons that never reload.
    fn ammo_left(&mut self, instance: WeaponInstanceId, config: &WeaponConfig) -> Option<u32> {
        config.magazine_size()?;
        Some(self.attrs(instance, config).ammo_left)
    }
}

fn target(actor: ActorId, hand: Hand, weapon_id: &str, instance: WeaponInstanceId) -> TaskTarget {
    TaskTarget {
        actor,
        hand,
        weapon_id: weapon_id.to_string(),
        instance,
    }
}
