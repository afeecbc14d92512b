//! Rules
//!
//! This crate provides the parent structure that references triggers: a
//! rule holds one or more triggers together with the (opaque) conditions
//! and actions that run when one of them fires.
//!
//! # Architecture
//!
//! ```text
//! RULE = TRIGGERS → CONDITIONS → ACTIONS
//! ```
//!
//! # Key Types
//!
//! - [`RuleConfig`] - Rule as written in a rules file
//! - [`Rule`] - Loaded rule with an assigned ID
//! - [`RuleManager`] - Manages all rules
//! - [`RuleStore`] - Persists the rule set under `.storage/`

pub mod rule;
pub mod storage;
pub mod store;

pub use rule::{HotkeyConflict, Rule, RuleConfig, RuleError, RuleManager, RuleResult};
pub use storage::{Migration, Storable, Storage, StorageError, StorageResult, StoredDocument};
pub use store::{RuleSetData, RuleStore};
