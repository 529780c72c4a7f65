//! Deferred action scheduler
//!
//! A cooperative one-shot timer driven by the simulation clock. Actions are
//! plain data; whoever runs them must re-check that their targets still
//! exist. Due actions run in due-time order, ties in schedule order.

use std::collections::BTreeMap;
use std::time::Duration;
use crate::teleport::SpinStep;

/// Handle to a scheduled action, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Something to do later
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    /// Spawn the pending map of a load. Stale generations are ignored.
    SpawnPass { generation: u64 },
    /// One step of a teleporter prop animation
    SpinStep(SpinStep),
    /// Put the file watcher flag back after the editor wrote a document
    RestoreWatcher { enabled: bool },
}

/// An action whose time has come
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask {
    pub id: TaskId,
    pub due: Duration,
    pub action: DeferredAction,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    tasks: BTreeMap<(Duration, TaskId), DeferredAction>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule an action `delay` after the current time, saturating at the
    /// end of time
    pub fn after(&mut self, delay: Duration, action: DeferredAction) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert((self.now.saturating_add(delay), id), action);
        id
    }

    /// Cancel a scheduled action. Returns false if it already ran.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let key = self.tasks.keys().find(|(_, task)| *task == id).copied();
        match key {
            Some(key) => self.tasks.remove(&key).is_some(),
            None => false,
        }
    }

    /// Pop the earliest action due at or before `until`, moving the clock to
    /// its due time. Actions scheduled while handling it are relative to that
    /// time, so chains keep exact spacing.
    pub fn pop_due(&mut self, until: Duration) -> Option<DueTask> {
        let (&(due, id), _) = self.tasks.first_key_value()?;
        if due > until {
            return None;
        }
        let action = self.tasks.remove(&(due, id))?;
        self.now = self.now.max(due);
        Some(DueTask { id, due, action })
    }

    /// Move the clock forward without running anything
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Drop pending actions matching a predicate
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&DeferredAction) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, action| !predicate(action));
        before - self.tasks.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = &DeferredAction> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
