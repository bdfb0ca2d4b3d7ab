//! State transition history tracking.
//!
//! Immutable, bounded record of the transitions a weapon instance went
//! through. The firearm action machine keeps one per instance so the
//! observed READY → OPEN → CLOSE → READY sequence can be inspected.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of transitions kept before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Record of a single state transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Wall-clock instant of the transition
    pub timestamp: DateTime<Utc>,
    /// Scheduler tick the transition ran on
    pub tick: u64,
}

/// Ordered history of state transitions.
///
/// `record` returns a new history with the transition appended, dropping
/// the oldest entries once `limit` is exceeded.
///
/// # Example
///
/// ```rust
/// use firecontrol::core::{StateHistory, StateTransition};
/// use firecontrol::firearm::FirearmState;
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: FirearmState::Ready,
///         to: FirearmState::Open,
///         timestamp: Utc::now(),
///         tick: 1,
///     })
///     .record(StateTransition {
///         from: FirearmState::Open,
///         to: FirearmState::Close,
///         timestamp: Utc::now(),
///         tick: 5,
///     });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&FirearmState::Ready, &FirearmState::Open, &FirearmState::Close]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
    limit: usize,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history with the default limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a new empty history keeping at most `limit` transitions.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        if transitions.len() > self.limit {
            let overflow = transitions.len() - self.limit;
            transitions.drain(..overflow);
        }
        Self {
            transitions,
            limit: self.limit,
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest kept transition followed by
    /// the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Duration between the first and last kept transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all kept transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }
}
