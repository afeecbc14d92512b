//! Persistence of the rule set

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::rule::{Rule, RuleManager, RuleResult};
use crate::storage::{Storable, Storage};

/// Storage key for the rule set
pub const STORAGE_KEY: &str = "actions.rules";
/// Current storage version
pub const STORAGE_VERSION: u32 = 1;
/// Current minor version
pub const STORAGE_MINOR_VERSION: u32 = 1;

/// Rule set data for storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetData {
    pub rules: Vec<Rule>,
}

impl Storable for RuleSetData {
    const KEY: &'static str = STORAGE_KEY;
    const VERSION: u32 = STORAGE_VERSION;
    const MINOR_VERSION: u32 = STORAGE_MINOR_VERSION;
}

/// Reads and writes the rule set of a [`RuleManager`]
#[derive(Debug, Clone)]
pub struct RuleStore {
    storage: Storage,
}

impl RuleStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Load stored rules into the manager, returning how many were loaded
    pub async fn load_into(&self, manager: &RuleManager) -> RuleResult<usize> {
        let data: RuleSetData = self
            .storage
            .load_with_migration(None)
            .await?
            .unwrap_or_default();

        let count = data.rules.len();
        manager.restore(data.rules);
        info!("Loaded {} stored rules", count);
        Ok(count)
    }

    /// Persist every rule of the manager
    pub async fn save_from(&self, manager: &RuleManager) -> RuleResult<()> {
        let data = RuleSetData {
            rules: manager.all(),
        };
        self.storage.save(&data.to_document()).await?;
        info!("Saved {} rules", data.rules.len());
        Ok(())
    }
}
