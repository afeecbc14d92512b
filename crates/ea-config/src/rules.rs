//! Typed rule loading

use ea_rules::RuleConfig;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::YamlLoader;

/// Load a rules file and parse every rule in it
///
/// The file holds either a list of rules or a mapping with a `rules` list.
pub fn load_rules(
    config_dir: impl Into<PathBuf>,
    file: impl AsRef<Path>,
) -> ConfigResult<Vec<RuleConfig>> {
    let config_dir = config_dir.into();
    let path = config_dir.join(file.as_ref());
    let value = YamlLoader::new(config_dir).load_file(file)?;
    let rules = parse_rules(value, &path)?;
    info!("Loaded {} rules from {:?}", rules.len(), path);
    Ok(rules)
}

/// Parse already-loaded YAML into rule configs
pub fn parse_rules(value: Value, source: &Path) -> ConfigResult<Vec<RuleConfig>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        Value::Mapping(mut map) => match map.remove("rules") {
            Some(Value::Sequence(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    key: "rules".to_string(),
                    reason: "expected a list of rules".to_string(),
                })
            }
        },
        _ => {
            return Err(ConfigError::InvalidValue {
                key: source.display().to_string(),
                reason: "expected a list of rules or a mapping with 'rules'".to_string(),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_yaml::from_value(item).map_err(|source_err| ConfigError::InvalidRule {
                path: source.to_path_buf(),
                index,
                source: source_err,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ConfigResult<Vec<RuleConfig>> {
        parse_rules(serde_yaml::from_str(yaml).unwrap(), Path::new("rules.yaml"))
    }

    #[test]
    fn test_list_and_mapping_forms() {
        let list = parse("- triggers:\n  - trigger: event\n").unwrap();
        assert_eq!(list.len(), 1);

        let mapping = parse("rules:\n  - triggers:\n    - trigger: event\n").unwrap();
        assert_eq!(mapping.len(), 1);

        assert!(parse("rules:\n").unwrap().is_empty());
        assert!(parse("~").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_rule_reports_index() {
        let result = parse(
            "- triggers:\n  - trigger: event\n- triggers:\n  - trigger: volume_changed\n",
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRule { index: 1, .. })
        ));
    }

    #[test]
    fn test_wrong_shape() {
        assert!(matches!(
            parse("rules: 5\n"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("just a string\n"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
