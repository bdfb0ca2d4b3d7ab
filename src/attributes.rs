//! Per-instance weapon attributes.
//!
//! Attributes belong to a physical weapon item, identified by its
//! [`WeaponInstanceId`]. The engine reads and writes them only through the
//! [`AttributeTable`].

use crate::config::WeaponConfig;
use crate::env::WeaponInstanceId;
use crate::firearm::FirearmState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

cycle_state! {
    /// Fire mode chosen by selective fire.
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum SelectiveFireState {
        Single,
        Burst,
        Auto,
    }
    resting: Single
}

impl Default for SelectiveFireState {
    fn default() -> Self {
        Self::Single
    }
}

/// Persisted state of one weapon instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponAttributes {
    pub ammo_type_index: usize,
    pub ammo_left: u32,
    pub selective_fire: SelectiveFireState,
    pub firearm_state: FirearmState,
    /// Shots fired over the instance's lifetime.
    pub shot_count: u64,
}

impl WeaponAttributes {
    /// Attributes of a freshly created instance: full magazine, configured
    /// selective-fire state, firearm READY.
    pub fn fresh(config: &WeaponConfig) -> Self {
        Self {
            ammo_type_index: 0,
            ammo_left: config.magazine_size().unwrap_or(0),
            selective_fire: config.default_selective_fire(),
            firearm_state: FirearmState::Ready,
            shot_count: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AttributeTable {
    entries: HashMap<WeaponInstanceId, WeaponAttributes>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, instance: WeaponInstanceId) -> Option<&WeaponAttributes> {
        self.entries.get(&instance)
    }

    pub fn get_mut(&mut self, instance: WeaponInstanceId) -> Option<&mut WeaponAttributes> {
        self.entries.get_mut(&instance)
    }

    /// Attributes of `instance`, initialised from `config` on first access.
    pub fn get_or_init(
        &mut self,
        instance: WeaponInstanceId,
        config: &WeaponConfig,
    ) -> &mut WeaponAttributes {
        self.entries.entry(instance).or_insert_with(|| {
            tracing::trace!(%instance, weapon = %config.id, "Initialised weapon attributes");
            WeaponAttributes::fresh(config)
        })
    }

    pub fn insert(&mut self, instance: WeaponInstanceId, attributes: WeaponAttributes) {
        self.entries.insert(instance, attributes);
    }

    pub fn remove(&mut self, instance: WeaponInstanceId) -> Option<WeaponAttributes> {
        self.entries.remove(&instance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WeaponInstanceId, &WeaponAttributes)> {
        self.entries.iter()
    }
}
