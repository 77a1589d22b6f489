//! On-disk cache of silence boundaries.
//!
//! Detection over a long recording takes a while, and the same file is
//! usually cut several times while tuning a project. Results are stored as
//! JSON, one file per source and parameter set:
//!
//! ```text
//! <cache dir>/<sha256(path, size, mtime, parameters)>.json
//! ```
//!
//! Touching or replacing the media file changes the key, so stale entries
//! are never served.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::SilenceDetectionConfig;
use crate::error::{MediaError, MediaResult};

/// Cached detection result.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    source: String,
    config: SilenceDetectionConfig,
    timestamps: Vec<f64>,
}

/// Silence boundary cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct TimestampCache {
    dir: PathBuf,
}

impl TimestampCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for a source file and configuration.
    pub async fn key(&self, source: &Path, config: &SilenceDetectionConfig) -> MediaResult<String> {
        let metadata = tokio::fs::metadata(source)
            .await
            .map_err(|_| MediaError::FileNotFound(source.to_path_buf()))?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(source.to_string_lossy().as_bytes());
        hasher.update(metadata.len().to_le_bytes());
        hasher.update(mtime.to_le_bytes());
        hasher.update(serde_json::to_vec(config)?);

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Load cached boundaries, if any.
    ///
    /// Unreadable entries are treated as missing.
    pub async fn load(
        &self,
        source: &Path,
        config: &SilenceDetectionConfig,
    ) -> MediaResult<Option<Vec<f64>>> {
        let path = self.entry_path(&self.key(source, config).await?);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => {
                debug!(entry = %path.display(), "Silence cache hit");
                Ok(Some(entry.timestamps))
            }
            Err(e) => {
                warn!(entry = %path.display(), error = %e, "Ignoring corrupt silence cache entry");
                Ok(None)
            }
        }
    }

    /// Store boundaries for a source file and configuration.
    pub async fn store(
        &self,
        source: &Path,
        config: &SilenceDetectionConfig,
        timestamps: &[f64],
    ) -> MediaResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| MediaError::cache(format!("cannot create {}: {}", self.dir.display(), e)))?;

        let path = self.entry_path(&self.key(source, config).await?);
        let entry = CacheEntry {
            source: source.to_string_lossy().into_owned(),
            config: config.clone(),
            timestamps: timestamps.to_vec(),
        };

        tokio::fs::write(&path, serde_json::to_vec_pretty(&entry)?).await?;
        debug!(entry = %path.display(), "Silence cache stored");

        Ok(path)
    }

    /// Store boundaries, logging instead of failing when the cache is unusable.
    pub async fn remember(
        &self,
        source: &Path,
        config: &SilenceDetectionConfig,
        timestamps: &[f64],
    ) -> Option<PathBuf> {
        match self.store(source, config, timestamps).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Could not cache silence boundaries");
                None
            }
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for TimestampCache {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("vmh-cache"))
    }
}
