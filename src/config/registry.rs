//! Registry of validated weapon definitions.
//!
//! Weapon files are tables keyed by weapon id, in JSON or TOML. Each
//! definition is validated on its own: a broken one is logged and left
//! out, the rest still load.

use super::error::ConfigError;
use super::validate::validate;
use super::weapon::WeaponConfig;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use stillwater::validation::Validation;

/// Outcome of loading one weapon file.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    /// Always `ConfigError::Invalid`.
    pub rejected: Vec<ConfigError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct WeaponRegistry {
    weapons: HashMap<String, WeaponConfig>,
}

impl WeaponRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, weapon_id: &str) -> Option<&WeaponConfig> {
        self.weapons.get(weapon_id)
    }

    pub fn contains(&self, weapon_id: &str) -> bool {
        self.weapons.contains_key(weapon_id)
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.weapons.keys().map(String::as_str)
    }

    /// Validate and add one definition, replacing any with the same id.
    pub fn insert(&mut self, config: WeaponConfig) -> Result<(), ConfigError> {
        match validate(&config) {
            Validation::Success(_) => {
                tracing::debug!(weapon = %config.id, "Registered weapon");
                self.weapons.insert(config.id.clone(), config);
                Ok(())
            }
            Validation::Failure(violations) => Err(ConfigError::Invalid {
                weapon: config.id,
                violations,
            }),
        }
    }

    pub fn load_json(&mut self, content: &str) -> Result<LoadReport, ConfigError> {
        let table: BTreeMap<String, WeaponConfig> = serde_json::from_str(content)?;
        Ok(self.load_table(table))
    }

    pub fn load_toml(&mut self, content: &str) -> Result<LoadReport, ConfigError> {
        let table: BTreeMap<String, WeaponConfig> = toml::from_str(content)?;
        Ok(self.load_table(table))
    }

    /// Load a `.json` or `.toml` weapon file.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        if extension != "json" && extension != "toml" {
            return Err(ConfigError::UnsupportedFormat(extension));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if extension == "json" {
            self.load_json(&content)
        } else {
            self.load_toml(&content)
        }
    }

    fn load_table(&mut self, table: BTreeMap<String, WeaponConfig>) -> LoadReport {
        let mut report = LoadReport::default();
        for (id, mut config) in table {
            config.id = id.clone();
            match self.insert(config) {
                Ok(()) => report.loaded.push(id),
                Err(error) => {
                    tracing::warn!(weapon = %id, error = %error, "Rejected weapon definition");
                    if let ConfigError::Invalid { violations, .. } = &error {
                        for violation in violations.iter() {
                            tracing::warn!(weapon = %id, "{violation}");
                        }
                    }
                    report.rejected.push(error);
                }
            }
        }
        report
    }
}
