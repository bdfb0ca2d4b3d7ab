//! Checkpoints of persisted weapon state.
//!
//! Weapon attributes normally live on the item itself. A [`Checkpoint`]
//! captures the whole attribute table plus the firearm histories so a host
//! can carry them over a restart. Scheduled tasks are not captured; a
//! restored weapon whose firearm was mid-cycle resumes it on the next
//! trigger.

use crate::attributes::{AttributeTable, WeaponAttributes};
use crate::core::StateHistory;
use crate::env::WeaponInstanceId;
use crate::firearm::{FirearmActionMachine, FirearmState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Attributes of one weapon instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub instance: WeaponInstanceId,
    pub attributes: WeaponAttributes,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub instance: WeaponInstanceId,
    pub history: StateHistory<FirearmState>,
}

/// Serializable snapshot of per-instance weapon state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Scheduler tick at capture time
    pub tick: u64,

    /// Attributes, ordered by instance
    pub attributes: Vec<AttributeEntry>,

    /// Firearm histories, ordered by instance
    pub histories: Vec<HistoryEntry>,
}

impl Checkpoint {
    /// Snapshot `table` and the histories held by `machine`.
    pub fn capture(
        table: &AttributeTable,
        machine: &FirearmActionMachine,
        tick: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut attributes: Vec<AttributeEntry> = table
            .iter()
            .map(|(instance, attributes)| AttributeEntry {
                instance: *instance,
                attributes: attributes.clone(),
            })
            .collect();
        attributes.sort_by_key(|entry| entry.instance);

        let mut histories: Vec<HistoryEntry> = machine
            .histories()
            .map(|(instance, history)| HistoryEntry {
                instance: *instance,
                history: history.clone(),
            })
            .collect();
        histories.sort_by_key(|entry| entry.instance);

        Self {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            tick,
            attributes,
            histories,
        }
    }

    /// Check version and that no instance appears twice.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        let mut seen = HashSet::new();
        for entry in &self.attributes {
            if !seen.insert(entry.instance) {
                return Err(CheckpointError::ValidationFailed(format!(
                    "instance {} appears more than once",
                    entry.instance
                )));
            }
        }
        Ok(())
    }

    /// Write the captured state back. Existing entries for the same
    /// instances are overwritten; others are left alone.
    pub fn restore_into(
        &self,
        table: &mut AttributeTable,
        machine: &mut FirearmActionMachine,
    ) -> Result<(), CheckpointError> {
        self.validate()?;
        for entry in &self.attributes {
            table.insert(entry.instance, entry.attributes.clone());
        }
        for entry in &self.histories {
            machine.restore_history(entry.instance, entry.history.clone());
        }
        tracing::debug!(
            id = %self.id,
            attributes = self.attributes.len(),
            histories = self.histories.len(),
            "Checkpoint restored"
        );
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Write as JSON to a temporary file, then rename it over `path`.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let json = self.to_json()?;
        let temp = path.with_extension("tmp");
        let io = |source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&temp, json).map_err(io)?;
        fs::rename(&temp, path).map_err(io)
    }

    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let json = fs::read_to_string(path).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::SelectiveFireState;

    fn attrs(ammo_left: u32, firearm_state: FirearmState) -> WeaponAttributes {
        WeaponAttributes {
            ammo_type_index: 1,
            ammo_left,
            selective_fire: SelectiveFireState::Burst,
            firearm_state,
            shot_count: 12,
        }
    }

    fn populated() -> (AttributeTable, FirearmActionMachine, WeaponInstanceId) {
        let mut table = AttributeTable::new();
        let mut machine = FirearmActionMachine::new();
        let pumped = WeaponInstanceId::new();
        let mut pumped_attrs = attrs(3, FirearmState::Ready);
        machine
            .change_state(pumped, &mut pumped_attrs, FirearmState::Open, Utc::now(), 4)
            .unwrap();
        table.insert(pumped, pumped_attrs);
        table.insert(WeaponInstanceId::new(), attrs(7, FirearmState::Ready));
        (table, machine, pumped)
    }

    #[test]
    fn json_round_trip_restores_attributes_and_history() {
        let (table, machine, pumped) = populated();
        let checkpoint = Checkpoint::capture(&table, &machine, 40, Utc::now());

        let json = checkpoint.to_json().unwrap();
        let restored = Checkpoint::from_json(&json).unwrap();
        assert_eq!(restored.attributes, checkpoint.attributes);
        assert_eq!(restored.tick, 40);

        let mut fresh_table = AttributeTable::new();
        let mut fresh_machine = FirearmActionMachine::new();
        restored
            .restore_into(&mut fresh_table, &mut fresh_machine)
            .unwrap();

        assert_eq!(fresh_table.len(), 2);
        assert_eq!(
            fresh_table.get(pumped).map(|a| a.firearm_state),
            Some(FirearmState::Open)
        );
        assert_eq!(
            fresh_machine.history(pumped).map(|h| h.transitions().len()),
            Some(1)
        );
    }

    #[test]
    fn binary_round_trip() {
        let (table, machine, _) = populated();
        let checkpoint = Checkpoint::capture(&table, &machine, 0, Utc::now());

        let bytes = checkpoint.to_binary().unwrap();
        let restored = Checkpoint::from_binary(&bytes).unwrap();
        assert_eq!(restored.id, checkpoint.id);
        assert_eq!(restored.attributes, checkpoint.attributes);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let (table, machine, _) = populated();
        let mut checkpoint = Checkpoint::capture(&table, &machine, 0, Utc::now());
        checkpoint.version = CHECKPOINT_VERSION + 1;

        let json = checkpoint.to_json().unwrap();
        assert!(matches!(
            Checkpoint::from_json(&json),
            Err(CheckpointError::UnsupportedVersion { found, .. }) if found == CHECKPOINT_VERSION + 1
        ));
    }

    #[test]
    fn duplicate_instances_fail_validation() {
        let (table, machine, _) = populated();
        let mut checkpoint = Checkpoint::capture(&table, &machine, 0, Utc::now());
        let duplicate = checkpoint.attributes[0].clone();
        checkpoint.attributes.push(duplicate);

        assert!(matches!(
            checkpoint.validate(),
            Err(CheckpointError::ValidationFailed(_))
        ));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let (table, machine, _) = populated();
        let checkpoint = Checkpoint::capture(&table, &machine, 9, Utc::now());
        let path = std::env::temp_dir().join(format!("firecontrol-{}.json", checkpoint.id));

        checkpoint.save(&path).unwrap();
        let loaded = Checkpoint::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.attributes, checkpoint.attributes);
        assert!(matches!(
            Checkpoint::load(&path),
            Err(CheckpointError::Io { .. })
        ));
    }

    #[test]
    fn malformed_json_fails_to_deserialize() {
        assert!(matches!(
            Checkpoint::from_json("{ not json"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
