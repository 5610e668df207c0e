//! File-backed result cache
//!
//! One JSON file per fingerprint, named by the fingerprint's SHA-256 digest.
//! Entries survive restarts. Writes go through a temporary file and a rename
//! so a reader never observes a half-written entry; concurrent writers for
//! the same key end with the last rename.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

use crate::config::DEFAULT_CACHE_TTL_DAYS;
use crate::core::Fingerprint;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{CacheEntry, ResultCache};
use shared::{node_debug, node_info};

pub struct FileResultCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::days(DEFAULT_CACHE_TTL_DAYS),
        }
    }

    /// Configure validity window (fluent API)
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.json", fingerprint.digest()))
    }

    /// Write a complete entry, replacing any existing one
    pub async fn store_entry(&self, fingerprint: &Fingerprint, entry: &CacheEntry) -> OrchestratorResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| OrchestratorError::cache(format!("creating {}: {e}", self.dir.display())))?;

        let path = self.entry_path(fingerprint);
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4()));
        let content = serde_json::to_vec(entry)?;

        fs::write(&tmp, content)
            .await
            .map_err(|e| OrchestratorError::cache(format!("writing {}: {e}", tmp.display())))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(OrchestratorError::cache(format!("replacing {}: {e}", path.display())));
        }
        Ok(())
    }

    async fn remove(&self, fingerprint: &Fingerprint) -> OrchestratorResult<()> {
        match fs::remove_file(self.entry_path(fingerprint)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OrchestratorError::cache(e.to_string())),
        }
    }
}

#[async_trait]
impl ResultCache for FileResultCache {
    async fn lookup(&self, fingerprint: &Fingerprint) -> OrchestratorResult<Option<CacheEntry>> {
        let path = self.entry_path(fingerprint);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OrchestratorError::cache(format!("reading {}: {e}", path.display()))),
        };

        let entry: CacheEntry = serde_json::from_slice(&content)
            .map_err(|e| OrchestratorError::cache(format!("corrupt entry {}: {e}", path.display())))?;

        if entry.fingerprint != fingerprint.as_str() {
            node_debug!(path = %path.display(), "Cache digest collision, treating as miss");
            return Ok(None);
        }

        if Utc::now() - entry.computed_at > self.ttl {
            node_info!(computed_at = %entry.computed_at, "Cached result expired, removing");
            self.remove(fingerprint).await?;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    async fn store(&self, fingerprint: &Fingerprint, payload: Value) -> OrchestratorResult<()> {
        let entry = CacheEntry {
            fingerprint: fingerprint.as_str().to_string(),
            payload,
            computed_at: Utc::now(),
        };
        self.store_entry(fingerprint, &entry).await
    }
}
