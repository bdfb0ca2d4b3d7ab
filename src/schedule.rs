//! Tick-driven task scheduler.
//!
//! Tasks are plain data describing what to run; the engine interprets them
//! when they come due. Handles stay valid until the task finishes or is
//! cancelled, and cancelling is idempotent.

use crate::config::TriggerKind;
use crate::env::{ActorId, Hand, SupplementaryTask, WeaponInstanceId};
use crate::firearm::FirearmState;
use std::collections::BTreeMap;
use std::fmt;

/// Cancellable handle of a scheduled task.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TaskHandle(u64);

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// The weapon a scheduled task acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskTarget {
    pub actor: ActorId,
    pub hand: Hand,
    pub weapon_id: String,
    pub instance: WeaponInstanceId,
}

#[derive(Clone, Debug)]
pub enum Task {
    /// One tick of full-automatic fire, kept alive while `trigger` is held.
    FullAuto {
        target: TaskTarget,
        trigger: TriggerKind,
        dual_wield: bool,
    },
    /// One shot of a burst.
    Burst { target: TaskTarget, dual_wield: bool },
    /// End of a reload cycle.
    ReloadComplete { target: TaskTarget, dual_wield: bool },
    /// Timed firearm transition into `to`.
    FirearmStage { target: TaskTarget, to: FirearmState },
    /// Host side effect attached to a firearm stage.
    Supplementary {
        actor: ActorId,
        hand: Hand,
        task: SupplementaryTask,
    },
}

#[derive(Debug)]
struct Entry {
    task: Task,
    due: u64,
    period: Option<u64>,
}

#[derive(Debug, Default)]
pub struct TickScheduler {
    tick: u64,
    next_id: u64,
    entries: BTreeMap<TaskHandle, Entry>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed since creation.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    fn insert(&mut self, task: Task, delay: u32, period: Option<u64>) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        // a zero delay still waits for the next tick
        let due = self.tick + u64::from(delay.max(1));
        self.entries.insert(handle, Entry { task, due, period });
        handle
    }

    /// Run `task` once after `delay` ticks.
    pub fn schedule_delayed(&mut self, task: Task, delay: u32) -> TaskHandle {
        self.insert(task, delay, None)
    }

    /// Run `task` after `delay` ticks, then every `period` ticks.
    pub fn schedule_repeating(&mut self, task: Task, delay: u32, period: u32) -> TaskHandle {
        self.insert(task, delay, Some(u64::from(period.max(1))))
    }

    /// Cancel `handle`; returns whether it was still scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every scheduled task, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (TaskHandle, &Task)> {
        self.entries.iter().map(|(handle, entry)| (*handle, &entry.task))
    }

    /// Move to the next tick and list the handles due on it, oldest first.
    pub fn advance(&mut self) -> Vec<TaskHandle> {
        self.tick += 1;
        self.entries
            .iter()
            .filter(|(_, entry)| entry.due <= self.tick)
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Claim a due task for running.
    ///
    /// One-shot tasks are removed, repeating ones move to their next due
    /// tick. Returns `None` when the task was cancelled after `advance`.
    pub fn take_due(&mut self, handle: TaskHandle) -> Option<Task> {
        let entry = self.entries.get_mut(&handle)?;
        if entry.due > self.tick {
            return None;
        }
        match entry.period {
            Some(period) => {
                entry.due += period;
                Some(entry.task.clone())
            }
            None => self.entries.remove(&handle).map(|entry| entry.task),
        }
    }
}
