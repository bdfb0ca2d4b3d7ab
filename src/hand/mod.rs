//! Per-(actor, hand) session state.
//!
//! A [`HandState`] remembers when things last happened on a hand and which
//! scheduled tasks currently belong to it. Tasks are grouped into three
//! disjoint cancellation domains: the fire slot (burst or full-auto),
//! reload tasks and firearm-action tasks.

mod task_set;

pub use task_set::TaskSet;

use crate::env::{ActorId, Hand, WeaponInstanceId};
use crate::schedule::TaskHandle;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Running burst or full-automatic fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireMode {
    Burst {
        shots_fired: u32,
        shots_per_burst: u32,
    },
    FullAuto {
        shots_per_second: u32,
        /// Ticks run so far.
        tick_index: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FireTask {
    pub handle: TaskHandle,
    pub mode: FireMode,
}

/// Weapon a reload or firearm cycle is running for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskOwner {
    pub weapon_id: String,
    pub instance: WeaponInstanceId,
}

/// Reload tasks removed by a cancel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReloadCancel {
    pub handles: Vec<TaskHandle>,
    pub owner: Option<TaskOwner>,
    pub elapsed_ticks: u64,
}

/// Firearm-action tasks removed by a cancel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirearmCancel {
    pub handles: Vec<TaskHandle>,
    pub owner: Option<TaskOwner>,
}

/// Everything a [`HandState::cancel_tasks`] call took down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CancelReport {
    pub fire: Option<FireTask>,
    pub reload: Option<ReloadCancel>,
    pub firearm: Option<FirearmCancel>,
    pub unzoomed: bool,
}

impl CancelReport {
    pub fn is_empty(&self) -> bool {
        self.fire.is_none() && self.reload.is_none() && self.firearm.is_none() && !self.unzoomed
    }

    /// Every scheduler handle that must be cancelled.
    pub fn handles(&self) -> Vec<TaskHandle> {
        let mut handles: Vec<TaskHandle> = self.fire.iter().map(|f| f.handle).collect();
        if let Some(reload) = &self.reload {
            handles.extend(&reload.handles);
        }
        if let Some(firearm) = &self.firearm {
            handles.extend(&firearm.handles);
        }
        handles
    }
}

#[derive(Debug, Default)]
pub struct HandState {
    fire: Option<FireTask>,
    reload: TaskSet,
    reload_started: u64,
    reload_owner: Option<TaskOwner>,
    firearm: TaskSet,
    firearm_owner: Option<TaskOwner>,
    last_shot: HashMap<String, DateTime<Utc>>,
    last_scope: Option<DateTime<Utc>>,
    last_equip: Option<DateTime<Utc>>,
    last_reload: Option<DateTime<Utc>>,
    spread_change: f64,
    current_weapon: Option<String>,
    zooming: bool,
}

impl HandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_firing(&self) -> bool {
        self.fire.is_some()
    }

    pub fn is_using_burst(&self) -> bool {
        matches!(self.fire, Some(FireTask { mode: FireMode::Burst { .. }, .. }))
    }

    pub fn is_using_full_auto(&self) -> bool {
        matches!(self.fire, Some(FireTask { mode: FireMode::FullAuto { .. }, .. }))
    }

    pub fn fire_task(&self) -> Option<&FireTask> {
        self.fire.as_ref()
    }

    /// Occupy the fire slot; refused while another fire task runs.
    pub fn start_fire(&mut self, task: FireTask) -> bool {
        if self.fire.is_some() {
            return false;
        }
        self.fire = Some(task);
        true
    }

    /// Mutable access to the fire task owning `handle`.
    pub fn fire_mode_mut(&mut self, handle: TaskHandle) -> Option<&mut FireMode> {
        self.fire
            .as_mut()
            .filter(|task| task.handle == handle)
            .map(|task| &mut task.mode)
    }

    /// Free the fire slot if `handle` still owns it.
    pub fn clear_fire(&mut self, handle: TaskHandle) -> Option<FireTask> {
        if self.fire.is_some_and(|task| task.handle == handle) {
            self.fire.take()
        } else {
            None
        }
    }

    pub fn is_reloading(&self) -> bool {
        !self.reload.is_empty()
    }

    pub fn reload_owner(&self) -> Option<&TaskOwner> {
        self.reload_owner.as_ref()
    }

    /// Track a reload task; the first one marks the reload start.
    pub fn add_reload_task(&mut self, handle: TaskHandle, owner: TaskOwner, tick: u64) {
        if self.reload.is_empty() {
            self.reload_started = tick;
        }
        self.reload_owner = Some(owner);
        self.reload.insert(handle);
    }

    /// Ticks since the running reload started.
    pub fn reload_elapsed(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.reload_started)
    }

    /// Drop a finished reload task; returns whether it was tracked.
    pub fn remove_reload_task(&mut self, handle: TaskHandle) -> bool {
        let removed = self.reload.remove(handle);
        if self.reload.is_empty() {
            self.reload_owner = None;
        }
        removed
    }

    /// Take every reload task. `None` when no reload was running.
    pub fn cancel_reload(&mut self, tick: u64) -> Option<ReloadCancel> {
        if self.reload.is_empty() {
            return None;
        }
        Some(ReloadCancel {
            handles: self.reload.drain(),
            owner: self.reload_owner.take(),
            elapsed_ticks: self.reload_elapsed(tick),
        })
    }

    pub fn has_running_firearm_action(&self) -> bool {
        !self.firearm.is_empty()
    }

    pub fn add_firearm_task(&mut self, handle: TaskHandle, owner: TaskOwner) {
        self.firearm_owner = Some(owner);
        self.firearm.insert(handle);
    }

    pub fn remove_firearm_task(&mut self, handle: TaskHandle) -> bool {
        let removed = self.firearm.remove(handle);
        if self.firearm.is_empty() {
            self.firearm_owner = None;
        }
        removed
    }

    /// Take every firearm-action task. `None` when none was running.
    pub fn cancel_firearm(&mut self) -> Option<FirearmCancel> {
        if self.firearm.is_empty() {
            return None;
        }
        Some(FirearmCancel {
            handles: self.firearm.drain(),
            owner: self.firearm_owner.take(),
        })
    }

    /// Cancel fire slot, reload, firearm action and zoom as one operation.
    ///
    /// A second call with nothing running returns an empty report.
    pub fn cancel_tasks(&mut self, tick: u64) -> CancelReport {
        CancelReport {
            fire: self.fire.take(),
            reload: self.cancel_reload(tick),
            firearm: self.cancel_firearm(),
            unzoomed: std::mem::take(&mut self.zooming),
        }
    }

    pub fn last_shot_time(&self, weapon_id: &str) -> Option<DateTime<Utc>> {
        self.last_shot.get(weapon_id).copied()
    }

    pub fn set_last_shot_time(&mut self, weapon_id: &str, at: DateTime<Utc>) {
        self.last_shot.insert(weapon_id.to_string(), at);
    }

    pub fn last_scope_time(&self) -> Option<DateTime<Utc>> {
        self.last_scope
    }

    pub fn last_equip_time(&self) -> Option<DateTime<Utc>> {
        self.last_equip
    }

    pub fn last_reload_time(&self) -> Option<DateTime<Utc>> {
        self.last_reload
    }

    pub fn set_last_reload_time(&mut self, at: DateTime<Utc>) {
        self.last_reload = Some(at);
    }

    pub fn spread_change(&self) -> f64 {
        self.spread_change
    }

    /// Add to the spread accumulator. Only the first shot of a burst or
    /// full-auto tick counts.
    pub fn add_spread_change(&mut self, amount: f64) {
        self.spread_change += amount;
    }

    pub fn current_weapon(&self) -> Option<&str> {
        self.current_weapon.as_deref()
    }

    /// Record an equip; returns the previously held weapon id.
    pub fn equip(&mut self, weapon_id: Option<String>, at: DateTime<Utc>) -> Option<String> {
        self.last_equip = Some(at);
        self.spread_change = 0.0;
        std::mem::replace(&mut self.current_weapon, weapon_id)
    }

    pub fn is_zooming(&self) -> bool {
        self.zooming
    }

    /// Change zoom; entering zoom records the scope instant.
    pub fn set_zooming(&mut self, zooming: bool, at: DateTime<Utc>) {
        if zooming && !self.zooming {
            self.last_scope = Some(at);
        }
        self.zooming = zooming;
    }
}

/// Every hand of every active actor.
#[derive(Debug, Default)]
pub struct HandRegistry {
    hands: HashMap<(ActorId, Hand), HandState>,
}

impl HandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: ActorId, hand: Hand) -> Option<&HandState> {
        self.hands.get(&(actor, hand))
    }

    /// The hand's state, created on first access.
    pub fn get_mut(&mut self, actor: ActorId, hand: Hand) -> &mut HandState {
        self.hands.entry((actor, hand)).or_default()
    }

    pub fn existing_mut(&mut self, actor: ActorId, hand: Hand) -> Option<&mut HandState> {
        self.hands.get_mut(&(actor, hand))
    }

    pub fn is_reloading(&self, actor: ActorId, hand: Hand) -> bool {
        self.get(actor, hand).is_some_and(HandState::is_reloading)
    }

    /// Whether either hand of `actor` is reloading.
    pub fn is_actor_reloading(&self, actor: ActorId) -> bool {
        Hand::BOTH.iter().any(|hand| self.is_reloading(actor, *hand))
    }

    pub fn is_firing(&self, actor: ActorId, hand: Hand) -> bool {
        self.get(actor, hand).is_some_and(HandState::is_firing)
    }

    /// Destroy both hands of `actor`, returning what was still running.
    pub fn remove_actor(&mut self, actor: ActorId) -> Vec<(Hand, HandState)> {
        Hand::BOTH
            .iter()
            .filter_map(|hand| self.hands.remove(&(actor, *hand)).map(|state| (*hand, state)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}
