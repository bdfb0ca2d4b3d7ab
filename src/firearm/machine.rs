//! Guarded READY → OPEN → CLOSE → READY machine.
//!
//! The machine holds the legal transition table and the per-instance
//! history. The current state itself lives in the instance's
//! [`WeaponAttributes`], so it survives the held item being swapped out.

use super::error::FirearmError;
use super::state::FirearmState;
use crate::attributes::WeaponAttributes;
use crate::core::{Guard, State, StateHistory, StateTransition};
use crate::env::WeaponInstanceId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Entry into `to`, allowed from states the guard accepts.
#[derive(Clone, Debug)]
pub struct FirearmTransition {
    pub to: FirearmState,
    pub guard: Guard<FirearmState>,
}

impl FirearmTransition {
    /// Transition into `to` allowed only from `from`.
    pub fn new(from: FirearmState, to: FirearmState) -> Self {
        Self {
            to,
            guard: Guard::new(move |current: &FirearmState| *current == from),
        }
    }

    pub fn can_execute(&self, current: &FirearmState, to: &FirearmState) -> bool {
        self.to == *to && self.guard.check(current)
    }
}

#[derive(Debug)]
pub struct FirearmActionMachine {
    transitions: Vec<FirearmTransition>,
    histories: HashMap<WeaponInstanceId, StateHistory<FirearmState>>,
    history_limit: usize,
}

impl Default for FirearmActionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl FirearmActionMachine {
    /// Machine with the one-directional cycle of [`FirearmState`].
    pub fn new() -> Self {
        let transitions = FirearmState::ALL
            .iter()
            .map(|state| FirearmTransition::new(*state, state.next()))
            .collect();
        Self {
            transitions,
            histories: HashMap::new(),
            history_limit: crate::core::DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn is_legal(&self, from: FirearmState, to: FirearmState) -> bool {
        self.transitions.iter().any(|t| t.can_execute(&from, &to))
    }

    /// Move `attrs` to `to` along a legal edge.
    pub fn change_state(
        &mut self,
        instance: WeaponInstanceId,
        attrs: &mut WeaponAttributes,
        to: FirearmState,
        now: DateTime<Utc>,
        tick: u64,
    ) -> Result<(), FirearmError> {
        let from = attrs.firearm_state;
        if !self.is_legal(from, to) {
            return Err(FirearmError::IllegalTransition { from, to });
        }
        tracing::trace!(%instance, from = from.name(), to = to.name(), tick, "Firearm transition");
        attrs.firearm_state = to;
        self.record(instance, from, to, now, tick);
        Ok(())
    }

    /// Reset to READY after the firearm-action tasks were cancelled.
    pub fn force_ready(
        &mut self,
        instance: WeaponInstanceId,
        attrs: &mut WeaponAttributes,
        now: DateTime<Utc>,
        tick: u64,
    ) {
        let from = attrs.firearm_state;
        if from.is_resting() {
            return;
        }
        tracing::debug!(%instance, from = from.name(), tick, "Firearm action forced to READY");
        attrs.firearm_state = FirearmState::Ready;
        self.record(instance, from, FirearmState::Ready, now, tick);
    }

    pub fn history(&self, instance: WeaponInstanceId) -> Option<&StateHistory<FirearmState>> {
        self.histories.get(&instance)
    }

    /// Every recorded history, keyed by instance.
    pub fn histories(
        &self,
    ) -> impl Iterator<Item = (&WeaponInstanceId, &StateHistory<FirearmState>)> {
        self.histories.iter()
    }

    /// Drop the history of an instance that no longer exists.
    pub fn forget(&mut self, instance: WeaponInstanceId) {
        self.histories.remove(&instance);
    }

    /// Replace the history of `instance`, e.g. from a checkpoint.
    pub fn restore_history(
        &mut self,
        instance: WeaponInstanceId,
        history: StateHistory<FirearmState>,
    ) {
        self.histories.insert(instance, history);
    }

    fn record(
        &mut self,
        instance: WeaponInstanceId,
        from: FirearmState,
        to: FirearmState,
        timestamp: DateTime<Utc>,
        tick: u64,
    ) {
        let limit = self.history_limit;
        let history = self
            .histories
            .entry(instance)
            .or_insert_with(|| StateHistory::with_limit(limit));
        *history = history.record(StateTransition {
            from,
            to,
            timestamp,
            tick,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::SelectiveFireState;

    fn attrs() -> WeaponAttributes {
        WeaponAttributes {
            ammo_type_index: 0,
            ammo_left: 5,
            selective_fire: SelectiveFireState::Single,
            firearm_state: FirearmState::Ready,
            shot_count: 0,
        }
    }

    #[test]
    fn full_cycle_is_recorded() {
        let mut machine = FirearmActionMachine::new();
        let instance = WeaponInstanceId::new();
        let mut attrs = attrs();
        let now = Utc::now();

        for (tick, to) in [FirearmState::Open, FirearmState::Close, FirearmState::Ready]
            .into_iter()
            .enumerate()
        {
            machine
                .change_state(instance, &mut attrs, to, now, tick as u64)
                .unwrap();
        }

        let history = machine.history(instance).unwrap();
        assert_eq!(
            history.get_path(),
            vec![
                &FirearmState::Ready,
                &FirearmState::Open,
                &FirearmState::Close,
                &FirearmState::Ready
            ]
        );
    }

    #[test]
    fn open_cannot_skip_close() {
        let mut machine = FirearmActionMachine::new();
        let instance = WeaponInstanceId::new();
        let mut attrs = attrs();
        attrs.firearm_state = FirearmState::Open;

        let result = machine.change_state(instance, &mut attrs, FirearmState::Ready, Utc::now(), 0);
        assert_eq!(
            result,
            Err(FirearmError::IllegalTransition {
                from: FirearmState::Open,
                to: FirearmState::Ready
            })
        );
        assert_eq!(attrs.firearm_state, FirearmState::Open);
        assert!(machine.history(instance).is_none());
    }

    #[test]
    fn force_ready_resets_and_records() {
        let mut machine = FirearmActionMachine::new();
        let instance = WeaponInstanceId::new();
        let mut attrs = attrs();
        attrs.firearm_state = FirearmState::Open;

        machine.force_ready(instance, &mut attrs, Utc::now(), 3);
        assert_eq!(attrs.firearm_state, FirearmState::Ready);
        assert_eq!(machine.history(instance).map(|h| h.transitions().len()), Some(1));

        machine.force_ready(instance, &mut attrs, Utc::now(), 4);
        assert_eq!(machine.history(instance).map(|h| h.transitions().len()), Some(1));
    }

    #[test]
    fn history_is_bounded() {
        let mut machine = FirearmActionMachine::new().with_history_limit(2);
        let instance = WeaponInstanceId::new();
        let mut attrs = attrs();
        let now = Utc::now();

        for tick in 0..6 {
            let to = attrs.firearm_state.next();
            machine.change_state(instance, &mut attrs, to, now, tick).unwrap();
        }
        assert_eq!(machine.history(instance).map(|h| h.transitions().len()), Some(2));

        machine.forget(instance);
        assert!(machine.history(instance).is_none());
    }
}
