//! Workspace settings from `actions.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "actions.yaml";

/// Environment variable naming the config directory
pub const CONFIG_DIR_ENV: &str = "EA_CONFIG_DIR";

/// Rules file used when the settings do not name one
pub const DEFAULT_RULES_FILE: &str = "rules.yaml";

/// Settings for loading and persisting rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Rules file, relative to the config directory
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,

    /// Whether imported rules are written to `.storage/`
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Log filter directive used when `EA_LOG` is not set (e.g. "info,ea_rules=debug")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

fn default_rules_file() -> PathBuf {
    PathBuf::from(DEFAULT_RULES_FILE)
}

fn default_persist() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            persist: default_persist(),
            log_filter: None,
        }
    }
}

impl Settings {
    /// Load settings from the config directory, falling back to defaults
    /// when `actions.yaml` does not exist
    pub fn load(config_dir: &Path) -> ConfigResult<Self> {
        if !config_dir.join(SETTINGS_FILE).is_file() {
            debug!("No {} in {:?}, using defaults", SETTINGS_FILE, config_dir);
            return Ok(Self::default());
        }

        let value = load_yaml(config_dir, SETTINGS_FILE)?;
        let settings: Settings = if value.is_null() {
            Settings::default()
        } else {
            serde_yaml::from_value(value).map_err(|e| ConfigError::InvalidValue {
                key: SETTINGS_FILE.to_string(),
                reason: e.to_string(),
            })?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values that cannot work
    pub fn validate(&self) -> ConfigResult<()> {
        let is_yaml = matches!(
            self.rules_file.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        if !is_yaml {
            return Err(ConfigError::InvalidValue {
                key: "rules_file".to_string(),
                reason: format!("{:?} is not a .yaml file", self.rules_file),
            });
        }
        Ok(())
    }

    /// Absolute path of the rules file
    pub fn rules_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.rules_file)
    }
}

/// Pick the config directory: explicit path, then `EA_CONFIG_DIR`, then the
/// current directory
pub fn resolve_config_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.rules_path(dir.path()),
            dir.path().join(DEFAULT_RULES_FILE)
        );
    }

    #[test]
    fn test_load_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "rules_file: rules/main.yml\npersist: false\nlog_filter: debug\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.rules_file, PathBuf::from("rules/main.yml"));
        assert!(!settings.persist);
        assert_eq!(settings.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "rules_file: rules.json\n").unwrap();
        assert!(matches!(
            Settings::load(dir.path()),
            Err(ConfigError::InvalidValue { key, .. }) if key == "rules_file"
        ));

        std::fs::write(dir.path().join(SETTINGS_FILE), "persist: maybe\n").unwrap();
        assert!(Settings::load(dir.path()).is_err());
    }

    #[test]
    fn test_resolve_config_dir_prefers_explicit() {
        let dir = resolve_config_dir(Some(PathBuf::from("/etc/actions")));
        assert_eq!(dir, PathBuf::from("/etc/actions"));
    }
}
