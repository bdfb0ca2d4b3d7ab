//! Named group of task handles cancelled as a unit.

use crate::schedule::TaskHandle;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskSet {
    handles: BTreeSet<TaskHandle>,
}

impl TaskSet {
    pub fn insert(&mut self, handle: TaskHandle) -> bool {
        self.handles.insert(handle)
    }

    pub fn remove(&mut self, handle: TaskHandle) -> bool {
        self.handles.remove(&handle)
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Remove and return every handle, oldest first.
    pub fn drain(&mut self) -> Vec<TaskHandle> {
        std::mem::take(&mut self.handles).into_iter().collect()
    }
}
