//! Ammunition: reserve ammo types drawn on reload and the magazine count
//! carried by each weapon instance.
//!
//! Reserve ammo lives in the actor's [`AmmoInventory`]. Each [`AmmoType`]
//! converts rounds into units of its pool. The magazine (`ammo_left`) only
//! goes down through [`AmmoSystem::consume`].

use crate::attributes::WeaponAttributes;
use crate::config::AmmoConfig;
use crate::env::{ActorId, AmmoInventory};
use serde::{Deserialize, Serialize};

fn one() -> u32 {
    1
}

/// Inventory pool an ammo type draws from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoPool {
    Item(String),
    Experience,
    Money,
}

/// Closed set of reserve ammo kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AmmoType {
    /// One item per round.
    Item { name: String },
    /// Experience points paid per round.
    Experience {
        name: String,
        #[serde(default = "one")]
        per_round: u32,
    },
    /// Currency paid per round.
    Money {
        name: String,
        #[serde(default = "one")]
        per_round: u32,
    },
}

impl AmmoType {
    pub fn item(name: impl Into<String>) -> Self {
        Self::Item { name: name.into() }
    }

    pub fn experience(name: impl Into<String>, per_round: u32) -> Self {
        Self::Experience {
            name: name.into(),
            per_round,
        }
    }

    pub fn money(name: impl Into<String>, per_round: u32) -> Self {
        Self::Money {
            name: name.into(),
            per_round,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Item { name } | Self::Experience { name, .. } | Self::Money { name, .. } => name,
        }
    }

    pub fn pool(&self) -> AmmoPool {
        match self {
            Self::Item { name } => AmmoPool::Item(name.clone()),
            Self::Experience { .. } => AmmoPool::Experience,
            Self::Money { .. } => AmmoPool::Money,
        }
    }

    fn per_round(&self) -> u32 {
        match self {
            Self::Item { .. } => 1,
            Self::Experience { per_round, .. } | Self::Money { per_round, .. } => {
                (*per_round).max(1)
            }
        }
    }

    /// Whether at least one round can be drawn.
    pub fn has_ammo(&self, inventory: &impl AmmoInventory, actor: ActorId) -> bool {
        inventory.has_ammo(actor, &self.pool(), self.per_round())
    }

    /// Draw up to `rounds`; returns the rounds actually drawn.
    pub fn remove_ammo(
        &self,
        inventory: &mut impl AmmoInventory,
        actor: ActorId,
        rounds: u32,
    ) -> u32 {
        let available = self.max_ammo(inventory, actor);
        let taken = rounds.min(available);
        if taken > 0 {
            inventory.remove_ammo(actor, &self.pool(), taken * self.per_round());
        }
        taken
    }

    pub fn give_ammo(&self, inventory: &mut impl AmmoInventory, actor: ActorId, rounds: u32) {
        if rounds > 0 {
            inventory.give_ammo(actor, &self.pool(), rounds.saturating_mul(self.per_round()));
        }
    }

    /// Rounds the actor can currently afford.
    pub fn max_ammo(&self, inventory: &impl AmmoInventory, actor: ActorId) -> u32 {
        inventory.max_ammo(actor, &self.pool()) / self.per_round()
    }
}

/// Result of an ammo lookup that may have switched the current type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Switched<T> {
    pub value: T,
    /// New ammo type index when the lookup switched to it.
    pub switched_to: Option<usize>,
}

impl<T> Switched<T> {
    fn stay(value: T) -> Self {
        Self {
            value,
            switched_to: None,
        }
    }
}

/// Reserve ammo logic of one weapon definition.
#[derive(Clone, Copy, Debug)]
pub struct AmmoSystem<'a> {
    config: &'a AmmoConfig,
}

impl<'a> AmmoSystem<'a> {
    pub fn new(config: &'a AmmoConfig) -> Self {
        Self { config }
    }

    /// Remove `amount` rounds from the magazine, all or nothing.
    pub fn consume(attrs: &mut WeaponAttributes, amount: u32) -> bool {
        match attrs.ammo_left.checked_sub(amount) {
            Some(left) => {
                attrs.ammo_left = left;
                true
            }
            None => false,
        }
    }

    pub fn current(&self, attrs: &WeaponAttributes) -> Option<&'a AmmoType> {
        self.config
            .ammo_types
            .get(attrs.ammo_type_index)
            .or_else(|| self.config.ammo_types.first())
    }

    fn current_index(&self, attrs: &WeaponAttributes) -> usize {
        if attrs.ammo_type_index < self.config.ammo_types.len() {
            attrs.ammo_type_index
        } else {
            0
        }
    }

    fn can_switch(&self) -> bool {
        self.config.switch_automatically_when_empty && self.config.ammo_types.len() > 1
    }

    /// Other indices in declaration order, skipping the current one.
    fn alternatives(&self, current: usize) -> impl Iterator<Item = (usize, &'a AmmoType)> {
        self.config
            .ammo_types
            .iter()
            .enumerate()
            .filter(move |(index, _)| *index != current)
    }

    pub fn has_ammo(
        &self,
        inventory: &impl AmmoInventory,
        actor: ActorId,
        attrs: &mut WeaponAttributes,
    ) -> Switched<bool> {
        let current = self.current_index(attrs);
        if self
            .current(attrs)
            .is_some_and(|ammo| ammo.has_ammo(inventory, actor))
        {
            return Switched::stay(true);
        }
        if !self.can_switch() {
            return Switched::stay(false);
        }

        for (index, ammo) in self.alternatives(current) {
            if ammo.has_ammo(inventory, actor) {
                tracing::debug!(%actor, from = current, to = index, "Switched ammo type");
                attrs.ammo_type_index = index;
                return Switched {
                    value: true,
                    switched_to: Some(index),
                };
            }
        }
        Switched::stay(false)
    }

    /// Draw up to `amount` rounds; returns how many were drawn.
    pub fn remove_ammo(
        &self,
        inventory: &mut impl AmmoInventory,
        actor: ActorId,
        attrs: &mut WeaponAttributes,
        amount: u32,
    ) -> Switched<u32> {
        let current = self.current_index(attrs);
        let removed = self
            .current(attrs)
            .map(|ammo| ammo.remove_ammo(inventory, actor, amount))
            .unwrap_or(0);
        if removed != 0 || !self.can_switch() {
            return Switched::stay(removed);
        }

        for (index, ammo) in self.alternatives(current) {
            let removed = ammo.remove_ammo(inventory, actor, amount);
            if removed != 0 {
                tracing::debug!(%actor, from = current, to = index, "Switched ammo type");
                attrs.ammo_type_index = index;
                return Switched {
                    value: removed,
                    switched_to: Some(index),
                };
            }
        }
        Switched::stay(0)
    }

    pub fn give_ammo(
        &self,
        inventory: &mut impl AmmoInventory,
        actor: ActorId,
        attrs: &WeaponAttributes,
        amount: u32,
    ) {
        if let Some(ammo) = self.current(attrs) {
            ammo.give_ammo(inventory, actor, amount);
        }
    }

    pub fn max_ammo(
        &self,
        inventory: &impl AmmoInventory,
        actor: ActorId,
        attrs: &WeaponAttributes,
    ) -> u32 {
        self.current(attrs)
            .map(|ammo| ammo.max_ammo(inventory, actor))
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.config.ammo_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.ammo_types.is_empty()
    }
}
