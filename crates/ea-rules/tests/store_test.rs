//! Rule set persistence tests

use ea_rules::{Rule, RuleConfig, RuleError, RuleManager, RuleStore, Storage, StorageError};
use ea_triggers::{Trigger, TriggerKind};
use serde_json::json;
use tempfile::TempDir;

fn config(value: serde_json::Value) -> RuleConfig {
    serde_json::from_value(value).unwrap()
}

fn populated_manager() -> RuleManager {
    let every_kind: Vec<serde_json::Value> = TriggerKind::ALL
        .iter()
        .map(|k| serde_json::to_value(Trigger::new_default(*k)).unwrap())
        .collect();

    let manager = RuleManager::new();
    manager
        .load(vec![
            config(json!({
                "id": "every_kind",
                "display_name": "Every trigger kind",
                "triggers": every_kind,
            })),
            config(json!({
                "id": "game_mode",
                "display_name": "Game mode",
                "triggers": [
                    {"trigger": "ProcessTrigger", "process_name": "game.exe", "event": "started"}
                ],
                "conditions": [{"condition": "device_is_default", "device": "headset"}],
                "actions": [{"action": "set_default_device", "device": "headset"}],
                "enabled": false
            })),
        ])
        .unwrap();
    manager
}

#[tokio::test]
async fn test_save_and_load_rules() {
    let temp_dir = TempDir::new().unwrap();
    let store = RuleStore::new(Storage::new(temp_dir.path()));

    let manager = populated_manager();
    store.save_from(&manager).await.unwrap();
    assert!(store.storage().contains("actions.rules").await);

    let restored = RuleManager::new();
    assert_eq!(store.load_into(&restored).await.unwrap(), 2);

    let original: Vec<Rule> = manager.all();
    let loaded: Vec<Rule> = restored.all();
    assert_eq!(loaded, original);

    let every = restored.get("every_kind").unwrap();
    let kinds: Vec<TriggerKind> = every.triggers.iter().map(Trigger::kind).collect();
    assert_eq!(kinds, TriggerKind::ALL.to_vec());

    let game = restored.get("game_mode").unwrap();
    assert!(!game.enabled);
    assert_eq!(game.conditions.len(), 1);
}

#[tokio::test]
async fn test_load_without_stored_rules() {
    let temp_dir = TempDir::new().unwrap();
    let store = RuleStore::new(Storage::new(temp_dir.path()));

    let manager = RuleManager::new();
    assert_eq!(store.load_into(&manager).await.unwrap(), 0);
    assert_eq!(manager.count(), 0);
}

#[tokio::test]
async fn test_stored_unknown_kind_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Storage::new(temp_dir.path());
    std::fs::create_dir_all(storage.dir()).unwrap();
    std::fs::write(
        storage.path_for("actions.rules"),
        serde_json::to_string(&json!({
            "version": 1,
            "minor_version": 1,
            "key": "actions.rules",
            "data": {
                "rules": [{
                    "id": "future",
                    "triggers": [{"trigger": "volume_threshold", "level": 80}]
                }]
            }
        }))
        .unwrap(),
    )
    .unwrap();

    let store = RuleStore::new(storage);
    let result = store.load_into(&RuleManager::new()).await;
    assert!(matches!(
        result,
        Err(RuleError::Storage(StorageError::Json(_)))
    ));
}
