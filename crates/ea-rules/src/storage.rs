//! Versioned JSON documents under `<config_dir>/.storage/`
//!
//! Every document is wrapped with its format version so that older files
//! can be detected and migrated on load.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Name of the storage directory inside the config directory
pub const STORAGE_DIR: &str = ".storage";

const TEMP_SUFFIX: &str = ".tmp";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored document not found: {key}")]
    NotFound { key: String },

    #[error("Stored document {key} is version {found}, this build reads version {expected}")]
    MigrationRequired {
        key: String,
        found: u32,
        expected: u32,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A stored document
///
/// ```json
/// {
///   "version": 1,
///   "minor_version": 1,
///   "key": "actions.rules",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument<T> {
    /// Bumped on incompatible changes
    pub version: u32,
    /// Bumped on compatible additions
    pub minor_version: u32,
    /// Document key, also the file name
    pub key: String,
    pub data: T,
}

/// Types persisted as a single document
pub trait Storable: Serialize + DeserializeOwned {
    const KEY: &'static str;
    const VERSION: u32;
    const MINOR_VERSION: u32;

    /// Wrap a value for writing
    fn to_document(&self) -> StoredDocument<&Self> {
        StoredDocument {
            version: Self::VERSION,
            minor_version: Self::MINOR_VERSION,
            key: Self::KEY.to_string(),
            data: self,
        }
    }
}

/// Upgrades the raw `data` of an older major version
pub type Migration<T> = fn(serde_json::Value, u32) -> StorageResult<T>;

/// Document store rooted at `<config_dir>/.storage/`
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Create a store for the given config directory
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: config_dir.as_ref().join(STORAGE_DIR),
        }
    }

    /// Directory holding the documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of a document
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Whether a document exists
    pub async fn contains(&self, key: &str) -> bool {
        fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    /// Read a document, `None` if it was never written
    pub async fn load<T>(&self, key: &str) -> StorageResult<Option<StoredDocument<T>>>
    where
        T: DeserializeOwned,
    {
        let Some(content) = self.read_raw(key).await? else {
            debug!("No stored document: {}", key);
            return Ok(None);
        };
        let document: StoredDocument<T> = serde_json::from_str(&content)?;

        debug!(
            "Read stored document: {} (v{}.{})",
            key, document.version, document.minor_version
        );
        Ok(Some(document))
    }

    /// Read a document that must exist
    pub async fn load_required<T>(&self, key: &str) -> StorageResult<StoredDocument<T>>
    where
        T: DeserializeOwned,
    {
        self.load(key).await?.ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })
    }

    /// Write a document
    ///
    /// The content goes to `<key>.<ulid>.tmp` first and is renamed over the
    /// target, so readers never observe a half-written file and concurrent
    /// writers never share a temp file.
    pub async fn save<T>(&self, document: &StoredDocument<T>) -> StorageResult<()>
    where
        T: Serialize,
    {
        fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(&document.key);
        let temp_path = self.path_for(&format!(
            "{}.{}{}",
            document.key,
            ulid::Ulid::new(),
            TEMP_SUFFIX
        ));
        let content = serde_json::to_string_pretty(document)?;

        fs::write(&temp_path, content).await?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(
            "Wrote stored document: {} (v{}.{})",
            document.key, document.version, document.minor_version
        );
        Ok(())
    }

    /// Delete a document; deleting a missing document is not an error
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!("Removed stored document: {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Keys of all stored documents, sorted
    pub async fn list_keys(&self) -> StorageResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.ends_with(TEMP_SUFFIX) {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn read_raw(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a versioned value, migrating older major versions when possible
    pub async fn load_with_migration<T>(
        &self,
        migrate: Option<Migration<T>>,
    ) -> StorageResult<Option<T>>
    where
        T: Storable,
    {
        let Some(content) = self.read_raw(T::KEY).await? else {
            return Ok(None);
        };

        #[derive(Deserialize)]
        struct Header {
            version: u32,
            minor_version: u32,
        }

        let header: Header = serde_json::from_str(&content)?;

        if header.version != T::VERSION {
            let Some(migrate) = migrate else {
                return Err(StorageError::MigrationRequired {
                    key: T::KEY.to_string(),
                    found: header.version,
                    expected: T::VERSION,
                });
            };
            let mut raw: serde_json::Value = serde_json::from_str(&content)?;
            let data = raw
                .get_mut("data")
                .map(serde_json::Value::take)
                .unwrap_or(serde_json::Value::Null);
            debug!(
                "Migrating {} from v{} to v{}",
                T::KEY,
                header.version,
                T::VERSION
            );
            return migrate(data, header.version).map(Some);
        }

        if header.minor_version < T::MINOR_VERSION {
            warn!(
                "Stored {} has older minor version ({} < {})",
                T::KEY,
                header.minor_version,
                T::MINOR_VERSION
            );
        }

        let document: StoredDocument<T> = serde_json::from_str(&content)?;
        Ok(Some(document.data))
    }
}
