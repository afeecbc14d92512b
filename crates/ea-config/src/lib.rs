//! Configuration loading for EarTrumpet Actions
//!
//! Rules are written in YAML. This crate loads rule files with support for
//! splitting them across files:
//!
//! - `!include path` - Include another YAML file
//! - `!include_dir_list dir` - Include all YAML files in a directory as a list
//! - `!include_dir_merge_list dir` - Merge lists from all YAML files
//! - `!env_var VAR [default]` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use ea_config::{load_rules, Settings};
//!
//! let settings = Settings::load(config_dir)?;
//! let rules = load_rules(config_dir, &settings.rules_file)?;
//! ```

mod error;
mod loader;
mod rules;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, YamlLoader};
pub use rules::{load_rules, parse_rules};
pub use settings::{
    resolve_config_dir, Settings, CONFIG_DIR_ENV, DEFAULT_RULES_FILE, SETTINGS_FILE,
};

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
