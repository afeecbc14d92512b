//! Rule management
//!
//! A rule ties one or more triggers to the conditions and actions that run
//! when any of them fires. Conditions and actions are kept as raw JSON; this
//! workspace only models triggers.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ea_triggers::{Hotkey, Trigger, TriggerError, TriggerKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, info};

use crate::storage::StorageError;

/// Rule errors
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule not found: {0}")]
    NotFound(String),

    #[error("Invalid rule configuration: {0}")]
    InvalidConfig(String),

    #[error("Rule {rule_id}, trigger #{index}: {source}")]
    Trigger {
        rule_id: String,
        index: usize,
        #[source]
        source: TriggerError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for rule operations
pub type RuleResult<T> = Result<T, RuleError>;

/// Rule configuration as written in a rules file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Unique ID (optional, generated if not provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none", alias = "alias")]
    pub display_name: Option<String>,

    /// Triggers that start the rule
    #[serde(default, alias = "trigger")]
    pub triggers: Vec<Trigger>,

    /// Conditions that must hold (opaque)
    #[serde(default, alias = "condition", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<serde_json::Value>,

    /// Actions to run (opaque)
    #[serde(default, alias = "action", skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<serde_json::Value>,

    /// Whether the rule is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A loaded rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier
    pub id: String,

    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    pub triggers: Vec<Trigger>,

    #[serde(default)]
    pub conditions: Vec<serde_json::Value>,

    #[serde(default)]
    pub actions: Vec<serde_json::Value>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl Rule {
    /// Create from config
    pub fn from_config(config: RuleConfig) -> Self {
        let id = config.id.unwrap_or_else(|| ulid::Ulid::new().to_string());
        let now = Utc::now();

        Self {
            id,
            display_name: config.display_name,
            triggers: config.triggers,
            conditions: config.conditions,
            actions: config.actions,
            enabled: config.enabled,
            created_at: now,
            modified_at: now,
        }
    }

    /// Convert back to the rules-file shape
    pub fn to_config(&self) -> RuleConfig {
        RuleConfig {
            id: Some(self.id.clone()),
            display_name: self.display_name.clone(),
            triggers: self.triggers.clone(),
            conditions: self.conditions.clone(),
            actions: self.actions.clone(),
            enabled: self.enabled,
        }
    }

    /// Get display name (name or ID)
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    /// Whether any trigger of this rule has the given kind
    pub fn has_kind(&self, kind: TriggerKind) -> bool {
        self.triggers.iter().any(|t| t.kind() == kind)
    }

    /// Validate every trigger, stopping at the first failure
    pub fn validate(&self) -> RuleResult<()> {
        if self.triggers.is_empty() {
            return Err(RuleError::InvalidConfig(format!(
                "rule {} has no triggers",
                self.display_name()
            )));
        }
        for (index, trigger) in self.triggers.iter().enumerate() {
            trigger.validate().map_err(|source| RuleError::Trigger {
                rule_id: self.id.clone(),
                index,
                source,
            })?;
        }
        Ok(())
    }
}

/// Two or more enabled rules bound to the same chord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyConflict {
    pub hotkey: Hotkey,
    pub rule_ids: Vec<String>,
}

/// Manages all rules
pub struct RuleManager {
    /// All rules by ID
    rules: DashMap<String, Rule>,
}

impl RuleManager {
    /// Create a new rule manager
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
        }
    }

    /// Load rules from configs
    pub fn load(&self, configs: Vec<RuleConfig>) -> RuleResult<()> {
        for config in configs {
            self.add(config)?;
        }
        Ok(())
    }

    /// Insert already-built rules, e.g. from storage
    pub fn restore(&self, rules: Vec<Rule>) {
        for rule in rules {
            debug!("Restored rule: {} ({})", rule.display_name(), rule.id);
            self.rules.insert(rule.id.clone(), rule);
        }
    }

    /// Get a rule by ID
    pub fn get(&self, id: &str) -> Option<Rule> {
        self.rules.get(id).map(|r| r.value().clone())
    }

    /// Get all rules, ordered by display name then ID
    pub fn all(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by(|a, b| {
            a.display_name()
                .cmp(b.display_name())
                .then_with(|| a.id.cmp(&b.id))
        });
        rules
    }

    /// Get rule count
    pub fn count(&self) -> usize {
        self.rules.len()
    }

    /// Add a new rule
    pub fn add(&self, config: RuleConfig) -> RuleResult<String> {
        let rule = Rule::from_config(config);
        let id = rule.id.clone();

        match self.rules.entry(id.clone()) {
            Entry::Occupied(_) => Err(duplicate_id(&id)),
            Entry::Vacant(slot) => {
                info!("Added rule: {} ({})", rule.display_name(), rule.id);
                slot.insert(rule);
                Ok(id)
            }
        }
    }

    /// Enable a rule
    pub fn enable(&self, id: &str) -> RuleResult<()> {
        self.set_enabled(id, true)
    }

    /// Disable a rule
    pub fn disable(&self, id: &str) -> RuleResult<()> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> RuleResult<()> {
        let mut rule = self
            .rules
            .get_mut(id)
            .ok_or_else(|| RuleError::NotFound(id.to_string()))?;

        if rule.enabled != enabled {
            rule.enabled = enabled;
            rule.modified_at = Utc::now();
        }
        info!(
            "{} rule: {}",
            if enabled { "Enabled" } else { "Disabled" },
            rule.display_name()
        );
        Ok(())
    }

    /// Toggle a rule, returning the new state
    pub fn toggle(&self, id: &str) -> RuleResult<bool> {
        let enabled = self
            .rules
            .get(id)
            .map(|r| r.enabled)
            .ok_or_else(|| RuleError::NotFound(id.to_string()))?;
        self.set_enabled(id, !enabled)?;
        Ok(!enabled)
    }

    /// Remove a rule
    pub fn remove(&self, id: &str) -> RuleResult<Rule> {
        let rule = self
            .rules
            .remove(id)
            .map(|(_, r)| r)
            .ok_or_else(|| RuleError::NotFound(id.to_string()))?;
        info!("Removed rule: {}", rule.display_name());
        Ok(rule)
    }

    /// Replace all rules with the given configs
    ///
    /// Nothing changes unless every config is accepted.
    pub fn reload(&self, configs: Vec<RuleConfig>) -> RuleResult<()> {
        let mut staged: HashMap<String, Rule> = HashMap::with_capacity(configs.len());
        for config in configs {
            let rule = Rule::from_config(config);
            if staged.contains_key(&rule.id) {
                return Err(duplicate_id(&rule.id));
            }
            staged.insert(rule.id.clone(), rule);
        }

        self.rules.retain(|id, _| staged.contains_key(id));
        for (id, rule) in staged {
            self.rules.insert(id, rule);
        }

        info!("Reloaded {} rules", self.rules.len());
        Ok(())
    }

    /// Rules with at least one trigger of the given kind
    pub fn rules_with_kind(&self, kind: TriggerKind) -> Vec<Rule> {
        self.all()
            .into_iter()
            .filter(|r| r.has_kind(kind))
            .collect()
    }

    /// Chords bound by more than one enabled rule
    pub fn hotkey_conflicts(&self) -> Vec<HotkeyConflict> {
        let mut by_chord: BTreeMap<String, (Hotkey, Vec<String>)> = BTreeMap::new();

        for rule in self.all().into_iter().filter(|r| r.enabled) {
            for hotkey in rule.triggers.iter().filter_map(Trigger::hotkey) {
                if !hotkey.is_set() {
                    continue;
                }
                // Named keys keep their spelling, so compare without case
                let entry = by_chord
                    .entry(hotkey.to_string().to_lowercase())
                    .or_insert_with(|| (hotkey.clone(), Vec::new()));
                if !entry.1.contains(&rule.id) {
                    entry.1.push(rule.id.clone());
                }
            }
        }

        by_chord
            .into_values()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(hotkey, rule_ids)| HotkeyConflict { hotkey, rule_ids })
            .collect()
    }

    /// Validate every rule, collecting all failures
    pub fn validate_all(&self) -> Vec<RuleError> {
        self.all()
            .iter()
            .filter_map(|rule| rule.validate().err())
            .collect()
    }
}

fn duplicate_id(id: &str) -> RuleError {
    RuleError::InvalidConfig(format!("Rule with ID {} already exists", id))
}

impl Default for RuleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> RuleConfig {
        serde_json::from_str(
            r#"{
                "id": "mute_on_call",
                "display_name": "Mute music during calls",
                "triggers": [
                    {"trigger": "app_event", "app": "teams.exe", "event": "playing_sound"},
                    {"trigger": "hotkey", "hotkey": "Ctrl+Alt+M"}
                ],
                "actions": [
                    {"action": "set_app_mute", "app": "spotify.exe", "mute": true}
                ]
            }"#,
        )
        .unwrap()
    }

    fn hotkey_rule(id: &str, chord: &str) -> RuleConfig {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "triggers": [{"trigger": "hotkey", "hotkey": chord}]
        }))
        .unwrap()
    }

    #[test]
    fn test_config_parsing() {
        let config = sample_config();
        assert_eq!(config.id, Some("mute_on_call".to_string()));
        assert_eq!(config.triggers.len(), 2);
        assert!(config.conditions.is_empty());
        assert_eq!(config.actions.len(), 1);
        assert!(config.enabled);
    }

    #[test]
    fn test_singular_aliases() {
        let config: RuleConfig = serde_json::from_value(serde_json::json!({
            "alias": "Startup volume",
            "trigger": [{"trigger": "event", "event": "startup"}],
            "action": [{"action": "set_default_volume", "volume": 30}]
        }))
        .unwrap();
        assert_eq!(config.display_name.as_deref(), Some("Startup volume"));
        assert_eq!(config.triggers.len(), 1);
        assert_eq!(config.actions.len(), 1);
    }

    #[test]
    fn test_generated_id() {
        let mut config = sample_config();
        config.id = None;
        let rule = Rule::from_config(config);
        assert_eq!(rule.id.len(), 26);
        assert_eq!(rule.to_config().id.as_deref(), Some(rule.id.as_str()));
    }

    #[test]
    fn test_manager_add_get_remove() {
        let manager = RuleManager::new();
        let id = manager.add(sample_config()).unwrap();
        assert_eq!(manager.count(), 1);

        let rule = manager.get(&id).unwrap();
        assert_eq!(rule.display_name(), "Mute music during calls");

        assert!(matches!(
            manager.add(sample_config()),
            Err(RuleError::InvalidConfig(_))
        ));

        manager.remove(&id).unwrap();
        assert!(manager.get(&id).is_none());
        assert!(matches!(manager.remove(&id), Err(RuleError::NotFound(_))));
    }

    #[test]
    fn test_enable_disable_toggle() {
        let manager = RuleManager::new();
        let id = manager.add(sample_config()).unwrap();

        manager.disable(&id).unwrap();
        assert!(!manager.get(&id).unwrap().enabled);

        assert!(manager.toggle(&id).unwrap());
        assert!(manager.get(&id).unwrap().enabled);

        assert!(matches!(
            manager.enable("missing"),
            Err(RuleError::NotFound(_))
        ));
    }

    #[test]
    fn test_rules_with_kind() {
        let manager = RuleManager::new();
        manager.add(sample_config()).unwrap();
        manager.add(hotkey_rule("other", "Win+F1")).unwrap();

        assert_eq!(manager.rules_with_kind(TriggerKind::Hotkey).len(), 2);
        assert_eq!(manager.rules_with_kind(TriggerKind::AppEvent).len(), 1);
        assert!(manager.rules_with_kind(TriggerKind::Process).is_empty());
    }

    #[test]
    fn test_hotkey_conflicts() {
        let manager = RuleManager::new();
        manager.add(sample_config()).unwrap();
        manager.add(hotkey_rule("second", "ctrl+alt+m")).unwrap();
        manager.add(hotkey_rule("third", "Ctrl+Shift+M")).unwrap();

        let conflicts = manager.hotkey_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].hotkey.to_string(), "Ctrl+Alt+M");
        assert_eq!(conflicts[0].rule_ids.len(), 2);

        // Disabled rules do not hold a chord
        manager.disable("second").unwrap();
        assert!(manager.hotkey_conflicts().is_empty());
    }

    #[test]
    fn test_validate_all() {
        let manager = RuleManager::new();
        manager.add(sample_config()).unwrap();
        manager
            .add(
                serde_json::from_value(serde_json::json!({
                    "id": "broken",
                    "triggers": [
                        {"trigger": "event"},
                        {"trigger": "process", "process_name": ""}
                    ]
                }))
                .unwrap(),
            )
            .unwrap();
        manager
            .add(serde_json::from_value(serde_json::json!({"id": "empty"})).unwrap())
            .unwrap();

        let errors = manager.validate_all();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            RuleError::Trigger { rule_id, index: 1, .. } if rule_id == "broken"
        )));
        assert!(errors
            .iter()
            .any(|e| matches!(e, RuleError::InvalidConfig(_))));
    }

    #[test]
    fn test_reload() {
        let manager = RuleManager::new();
        manager.add(sample_config()).unwrap();
        manager
            .reload(vec![hotkey_rule("a", "F1"), hotkey_rule("b", "F2")])
            .unwrap();
        assert_eq!(manager.count(), 2);
        assert!(manager.get("mute_on_call").is_none());
    }

    #[test]
    fn test_failed_reload_keeps_rules() {
        let manager = RuleManager::new();
        manager
            .load(vec![hotkey_rule("old1", "F1"), hotkey_rule("old2", "F2")])
            .unwrap();

        let result = manager.reload(vec![
            hotkey_rule("new1", "F3"),
            hotkey_rule("dup", "F4"),
            hotkey_rule("dup", "F5"),
        ]);
        assert!(matches!(result, Err(RuleError::InvalidConfig(_))));

        assert_eq!(manager.count(), 2);
        assert!(manager.get("old1").is_some());
        assert!(manager.get("old2").is_some());
        assert!(manager.get("new1").is_none());
    }

    #[test]
    fn test_concurrent_add_same_id() {
        let manager = std::sync::Arc::new(RuleManager::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let manager = manager.clone();
                let config = hotkey_rule("shared", &format!("F{}", n + 1));
                std::thread::spawn(move || manager.add(config))
            })
            .collect();

        let added = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(added, 1);
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_named_key_conflicts_ignore_case() {
        let manager = RuleManager::new();
        manager.add(hotkey_rule("louder", "Alt+VolumeUp")).unwrap();
        manager.add(hotkey_rule("also_louder", "alt+volumeup")).unwrap();

        let conflicts = manager.hotkey_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].rule_ids.len(), 2);
    }

    #[test]
    fn test_unknown_rule_field_rejected() {
        let result = serde_json::from_value::<RuleConfig>(serde_json::json!({
            "id": "typo",
            "trigers": [{"trigger": "event"}]
        }));
        assert!(result.is_err());
    }
}
