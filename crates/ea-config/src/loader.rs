//! YAML loader for rule files
//!
//! Resolves these tags while loading:
//! - `!include path` - Replace the node with the content of another file
//! - `!include_dir_list dir` - One list item per YAML file in a directory
//! - `!include_dir_merge_list dir` - Concatenate the lists of every YAML file in a directory
//! - `!env_var VAR [default]` - Value of an environment variable
//!
//! Relative paths resolve against the directory of the file containing the
//! tag. Any other tag is an error.

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::value::TaggedValue;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader resolving include and env_var tags
pub struct YamlLoader {
    /// Base directory for top-level relative paths
    config_dir: PathBuf,
    /// Files currently being loaded, outermost first
    loading: Vec<PathBuf>,
}

impl YamlLoader {
    /// Create a loader rooted at the given config directory
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            loading: Vec::new(),
        }
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load a file and resolve its tags
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.config_dir.join(path.as_ref());
        let path = fs::canonicalize(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;
        debug!("Loading YAML file: {:?}", path);

        if self.loading.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.loading.push(path.clone());
        let result = self.load_str(&content, &path);
        self.loading.pop();

        result
    }

    /// Parse YAML text and resolve its tags
    ///
    /// `source_path` names the text in errors and anchors relative includes.
    pub fn load_str(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        self.resolve(value, source_path)
    }

    fn resolve(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.resolve_tag(*tagged, source_path),
            Value::Mapping(map) => {
                let mut resolved = serde_yaml::Mapping::with_capacity(map.len());
                for (k, v) in map {
                    resolved.insert(k, self.resolve(v, source_path)?);
                }
                Ok(Value::Mapping(resolved))
            }
            Value::Sequence(seq) => seq
                .into_iter()
                .map(|v| self.resolve(v, source_path))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Sequence),
            other => Ok(other),
        }
    }

    fn resolve_tag(&mut self, tagged: TaggedValue, source_path: &Path) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        trace!("Resolving tag '{}' with value {:?}", tag, tagged.value);

        match tag.as_str() {
            "!include" => {
                let path = self.tag_path(&tag, &tagged.value, source_path)?;
                self.load_file(path)
            }
            "!include_dir_list" => {
                let dir = self.tag_path(&tag, &tagged.value, source_path)?;
                let items = self
                    .yaml_files(&dir)?
                    .into_iter()
                    .map(|file| self.load_file(file))
                    .collect::<ConfigResult<Vec<_>>>()?;
                Ok(Value::Sequence(items))
            }
            "!include_dir_merge_list" => {
                let dir = self.tag_path(&tag, &tagged.value, source_path)?;
                let mut items = Vec::new();
                for file in self.yaml_files(&dir)? {
                    match self.load_file(file)? {
                        Value::Sequence(seq) => items.extend(seq),
                        Value::Null => {}
                        other => items.push(other),
                    }
                }
                Ok(Value::Sequence(items))
            }
            "!env_var" => env_var(&tagged.value),
            _ => Err(ConfigError::InvalidValue {
                key: tag.clone(),
                reason: "unsupported tag".to_string(),
            }),
        }
    }

    /// Resolve a tag's path argument relative to the including file
    fn tag_path(&self, tag: &str, value: &Value, source_path: &Path) -> ConfigResult<PathBuf> {
        let Value::String(raw) = value else {
            return Err(ConfigError::InvalidIncludePath {
                path: format!("{:?}", value),
                reason: format!("{} expects a path string", tag),
            });
        };

        let base_dir = source_path.parent().unwrap_or(&self.config_dir);
        Ok(base_dir.join(raw))
    }

    /// YAML files directly inside a directory, sorted by name
    fn yaml_files(&self, dir: &Path) -> ConfigResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ConfigError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let entries = fs::read_dir(dir).map_err(|e| ConfigError::ReadFile {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|ext| ext.to_str()),
                        Some("yaml" | "yml")
                    )
            })
            .collect();

        files.sort();
        debug!("Found {} YAML files in {:?}", files.len(), dir);
        Ok(files)
    }
}

/// `!env_var NAME` or `!env_var NAME fallback`
fn env_var(value: &Value) -> ConfigResult<Value> {
    let Value::String(spec) = value else {
        return Err(ConfigError::InvalidValue {
            key: "!env_var".to_string(),
            reason: "environment variable name must be a string".to_string(),
        });
    };

    let mut parts = spec.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let fallback = parts.next().map(str::trim);

    match (std::env::var(name), fallback) {
        (Ok(v), _) => {
            debug!("Substituted env var: {}", name);
            Ok(Value::String(v))
        }
        (Err(_), Some(fallback)) => Ok(Value::String(fallback.to_string())),
        (Err(_), None) => Err(ConfigError::EnvVarNotFound {
            var: name.to_string(),
        }),
    }
}

/// Load a YAML file relative to a config directory, resolving tags
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    YamlLoader::new(config_dir).load_file(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn get<'a>(value: &'a Value, key: &str) -> &'a Value {
        value
            .as_mapping()
            .unwrap()
            .get(&Value::String(key.to_string()))
            .unwrap()
    }

    #[test]
    fn test_load_plain_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "rules.yaml", "- id: one\n- id: two\n");

        let value = load_yaml(dir.path(), "rules.yaml").unwrap();
        assert_eq!(value.as_sequence().unwrap().len(), 2);
    }

    #[test]
    fn test_include_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "nested/hotkeys.yaml", "- trigger: hotkey\n  hotkey: F1\n");
        write_file(dir.path(), "nested/rule.yaml", "triggers: !include hotkeys.yaml\n");
        write_file(dir.path(), "rules.yaml", "- !include nested/rule.yaml\n");

        let value = load_yaml(dir.path(), "rules.yaml").unwrap();
        let rule = &value.as_sequence().unwrap()[0];
        let triggers = get(rule, "triggers").as_sequence().unwrap();
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn test_include_dir_list() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "rules/b.yaml", "id: b\n");
        write_file(dir.path(), "rules/a.yml", "id: a\n");
        write_file(dir.path(), "rules/notes.txt", "ignored\n");
        write_file(dir.path(), "main.yaml", "rules: !include_dir_list rules\n");

        let value = load_yaml(dir.path(), "main.yaml").unwrap();
        let rules = get(&value, "rules").as_sequence().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(get(&rules[0], "id"), &Value::String("a".to_string()));
    }

    #[test]
    fn test_include_dir_merge_list() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "rules/one.yaml", "- id: a\n- id: b\n");
        write_file(dir.path(), "rules/two.yaml", "- id: c\n");
        write_file(dir.path(), "main.yaml", "!include_dir_merge_list rules\n");

        let value = load_yaml(dir.path(), "main.yaml").unwrap();
        assert_eq!(value.as_sequence().unwrap().len(), 3);
    }

    #[test]
    fn test_env_var_with_fallback() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("EA_LOADER_TEST_KEY", "Ctrl+F9");
        write_file(
            dir.path(),
            "rules.yaml",
            "set: !env_var EA_LOADER_TEST_KEY\nunset: !env_var EA_LOADER_TEST_MISSING Ctrl+F10\n",
        );

        let value = load_yaml(dir.path(), "rules.yaml").unwrap();
        assert_eq!(get(&value, "set"), &Value::String("Ctrl+F9".to_string()));
        assert_eq!(get(&value, "unset"), &Value::String("Ctrl+F10".to_string()));

        std::env::remove_var("EA_LOADER_TEST_KEY");
    }

    #[test]
    fn test_missing_env_var() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "rules.yaml", "key: !env_var EA_LOADER_TEST_NEVER_SET\n");

        let result = load_yaml(dir.path(), "rules.yaml");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_circular_include_detection() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "a: !include ./a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }

    #[test]
    fn test_unsupported_tag() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "rules.yaml", "password: !secret mine\n");

        let result = load_yaml(dir.path(), "rules.yaml");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_file_and_dir() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_yaml(dir.path(), "missing.yaml"),
            Err(ConfigError::ReadFile { .. })
        ));

        write_file(dir.path(), "main.yaml", "rules: !include_dir_list nowhere\n");
        assert!(matches!(
            load_yaml(dir.path(), "main.yaml"),
            Err(ConfigError::DirectoryNotFound { .. })
        ));
    }
}
