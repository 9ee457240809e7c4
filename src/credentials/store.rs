//! Durable persistence for the credential set.
//!
//! The set is small, so the store is deliberately whole-set: `load` returns
//! everything, `save` replaces everything. [`FileStore`] keeps the set as
//! pretty-printed JSON under a data directory; [`MemoryStore`] backs tests.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, warn};
use ulid::Ulid;

/// Fixed filename inside the configured data directory.
const CREDENTIALS_FILE: &str = "credentials.json";

/// One identity's stored credential. The hash is a PHC string carrying its
/// own salt and parameters.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    pub password_hash: String,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("password_hash", &"***")
            .finish()
    }
}

/// Full persisted state: email -> credential record.
pub type CredentialSet = BTreeMap<String, CredentialRecord>;

/// Load/save contract the credential service depends on.
///
/// `load` on missing state yields an empty set. `save` replaces the prior
/// contents and must not leave a partially written set readable by a
/// concurrent `load`.
pub trait CredentialStore: Send + Sync {
    /// # Errors
    /// Returns an error if the backing medium cannot be read.
    fn load(&self) -> Result<CredentialSet>;

    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn save(&self, set: &CredentialSet) -> Result<()>;
}

/// File-backed store: one JSON document per data directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(CREDENTIALS_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<CredentialSet> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(CredentialSet::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(set) => Ok(set),
            Err(err) => {
                // Unparseable state degrades to an empty set so the service
                // stays available; the occurrence is recorded, not hidden.
                warn!(
                    "Credential file {} is corrupt, treating as empty: {err}",
                    self.path.display()
                );
                Ok(CredentialSet::new())
            }
        }
    }

    fn save(&self, set: &CredentialSet) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("Credential file has no parent directory"))?;

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

        let json = serde_json::to_string_pretty(set).context("Failed to serialize credentials")?;

        // Write to a sibling temp file and rename so a concurrent load never
        // observes a half-written set.
        let tmp = dir.join(format!(".{CREDENTIALS_FILE}.{}", Ulid::new()));
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;

        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err)
                .with_context(|| format!("Failed to replace {}", self.path.display()));
        }

        debug!("Credentials saved to {}", self.path.display());

        Ok(())
    }
}

/// In-memory store with the same contract, for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<CredentialSet>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<CredentialSet> {
        self.inner
            .lock()
            .map(|set| set.clone())
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }

    fn save(&self, set: &CredentialSet) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        *inner = set.clone();
        Ok(())
    }
}
