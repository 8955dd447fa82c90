use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::cache_context;

/// When and where a cached export came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub bytes: usize,
}

/// Last good copy of each downloaded match log, plus a JSON sidecar with its metadata
pub struct Cache {
    cache_dir: PathBuf,
}

impl Cache {
    /// Create a new cache instance
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    /// Store raw CSV bytes under `key`, replacing any previous copy
    pub fn save_raw(&self, key: &str, source: &str, data: &[u8]) -> Result<()> {
        let file_path = self.build_raw_path(key);
        fs::write(&file_path, data).with_context(|| cache_context("write", key))?;

        let meta = CacheMeta {
            source: source.to_string(),
            fetched_at: Utc::now(),
            bytes: data.len(),
        };
        let json =
            serde_json::to_string_pretty(&meta).context("Failed to serialize cache metadata")?;
        fs::write(self.build_meta_path(key), json).with_context(|| cache_context("write", key))?;

        info!("Saved {} bytes to cache: {}", data.len(), file_path.display());
        Ok(())
    }

    /// Load raw CSV bytes, `None` if nothing was ever cached for `key`
    pub fn load_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let file_path = self.build_raw_path(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let data = fs::read(&file_path).with_context(|| cache_context("read", key))?;

        info!("Loaded data from cache: {}", file_path.display());
        Ok(Some(data))
    }

    pub fn load_meta(&self, key: &str) -> Result<Option<CacheMeta>> {
        let file_path = self.build_meta_path(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path).with_context(|| cache_context("read", key))?;
        let meta = serde_json::from_str(&json).context("Failed to deserialize cache metadata")?;
        Ok(Some(meta))
    }

    /// Check if cached data exists
    pub fn exists(&self, key: &str) -> bool {
        self.build_raw_path(key).exists()
    }

    fn build_raw_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", key))
    }

    fn build_meta_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip_with_meta() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().join("cache")).unwrap();

        assert!(!cache.exists("singles"));
        assert_eq!(cache.load_raw("singles").unwrap(), None);

        let csv = b"date,winner,loser,score,venue\n";
        cache.save_raw("singles", "https://example.test/export", csv).unwrap();

        assert!(cache.exists("singles"));
        assert_eq!(cache.load_raw("singles").unwrap().as_deref(), Some(&csv[..]));
        let meta = cache.load_meta("singles").unwrap().unwrap();
        assert_eq!(meta.bytes, csv.len());
        assert_eq!(meta.source, "https://example.test/export");
    }
}
