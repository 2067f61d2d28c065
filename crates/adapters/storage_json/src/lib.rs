//! # relayhub-adapter-storage-json
//!
//! Durable relay state in a single JSON document.
//!
//! ## Responsibilities
//! - Implement [`RelayStateStore`] over a file on disk
//! - Rewrite the whole document on every save (temp sibling file, fsync,
//!   rename, then fsync of the directory) so a crash mid-write leaves the
//!   previous document intact
//! - Report a missing file as "nothing stored yet"
//!
//! ## Dependency rule
//! Depends on `relayhub-app` (for the port trait) and `relayhub-domain`
//! (for the record type).

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use relayhub_app::ports::RelayStateStore;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::snapshot::PersistedRelay;

/// Errors raised while reading or writing the document.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed relay state document")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<StorageError> for RelayHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// [`RelayStateStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hidden sibling used for the atomic rewrite, e.g. `.relayStates.json.tmp`.
    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or(OsStr::new("relay-state")));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_document(&self, json: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        file.write_all(json)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        self.sync_parent().await
    }

    /// Flush the directory entry so the rename survives a power loss.
    #[cfg(unix)]
    async fn sync_parent(&self) -> Result<(), StorageError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        tokio::fs::File::open(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?
            .sync_all()
            .await
            .map_err(|e| StorageError::io(parent, e))
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_async)]
    async fn sync_parent(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl RelayStateStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Vec<PersistedRelay>>, RelayHubError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no relay state document yet");
                return Ok(None);
            }
            Err(err) => return Err(StorageError::io(&self.path, err).into()),
        };
        let relays: Vec<PersistedRelay> =
            serde_json::from_slice(&bytes).map_err(StorageError::from)?;
        tracing::debug!(path = %self.path.display(), count = relays.len(), "relay state loaded");
        Ok(Some(relays))
    }

    async fn save(&self, relays: &[PersistedRelay]) -> Result<(), RelayHubError> {
        let json = serde_json::to_vec_pretty(relays).map_err(StorageError::from)?;
        self.write_document(&json).await?;
        tracing::debug!(path = %self.path.display(), count = relays.len(), "relay state saved");
        Ok(())
    }
}
