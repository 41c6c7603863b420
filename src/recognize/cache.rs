use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{CuesyncError, Result};
use super::common::Word;

/// Cached recognition result for one audio file and recognizer setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCacheEntry {
    pub audio_path: String,
    pub recognizer: String,
    pub model: String,
    pub language: String,
    pub cached_at: DateTime<Utc>,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub total_files: u64,
    pub total_size: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

/// Parameters that identify a recognition run
#[derive(Debug, Clone, Copy)]
pub struct CacheKey<'a> {
    pub audio_path: &'a Path,
    pub recognizer: &'a str,
    pub model: &'a str,
    pub language: &'a str,
}

pub struct WordCache {
    dir: PathBuf,
}

impl WordCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hash of the audio path, its modification time and the recognizer settings
    pub fn generate_key(key: &CacheKey<'_>) -> Result<String> {
        let metadata = std::fs::metadata(key.audio_path)
            .map_err(|e| CuesyncError::Cache(format!("Failed to read file metadata: {}", e)))?;

        let modified = metadata.modified()
            .map_err(|e| CuesyncError::Cache(format!("Failed to get modification time: {}", e)))?
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut hasher = DefaultHasher::new();
        key.audio_path.to_string_lossy().hash(&mut hasher);
        modified.hash(&mut hasher);
        key.recognizer.hash(&mut hasher);
        key.model.hash(&mut hasher);
        key.language.hash(&mut hasher);

        Ok(format!("{:016x}", hasher.finish()))
    }

    fn entry_path(&self, cache_key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key))
    }

    pub async fn load(&self, key: &CacheKey<'_>) -> Result<Option<Vec<Word>>> {
        let cache_key = Self::generate_key(key)?;
        let path = self.entry_path(&cache_key);

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("No cached word stream for {}", key.audio_path.display());
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await
            .map_err(|e| CuesyncError::Cache(format!("Failed to read cache entry: {}", e)))?;

        match serde_json::from_str::<WordCacheEntry>(&content) {
            Ok(entry) if !entry.words.is_empty() => {
                info!(
                    "Using cached word stream ({} words, cached {})",
                    entry.words.len(),
                    entry.cached_at.format("%Y-%m-%d %H:%M:%S")
                );
                Ok(Some(entry.words))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    pub async fn store(&self, key: &CacheKey<'_>, words: &[Word]) -> Result<()> {
        let cache_key = Self::generate_key(key)?;
        tokio::fs::create_dir_all(&self.dir).await
            .map_err(|e| CuesyncError::Cache(format!("Failed to create cache dir: {}", e)))?;

        let entry = WordCacheEntry {
            audio_path: key.audio_path.display().to_string(),
            recognizer: key.recognizer.to_string(),
            model: key.model.to_string(),
            language: key.language.to_string(),
            cached_at: Utc::now(),
            words: words.to_vec(),
        };

        let path = self.entry_path(&cache_key);
        tokio::fs::write(&path, serde_json::to_string(&entry)?).await
            .map_err(|e| CuesyncError::Cache(format!("Failed to write cache entry: {}", e)))?;

        debug!("Cached {} words at {}", words.len(), path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<u64> {
        let mut count = 0;
        if let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if entry.path().extension().is_some_and(|ext| ext == "json")
                    && tokio::fs::remove_file(entry.path()).await.is_ok()
                {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();

        if let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if !entry.path().extension().is_some_and(|ext| ext == "json") {
                    continue;
                }
                stats.total_files += 1;

                if let Ok(metadata) = entry.metadata().await {
                    stats.total_size += metadata.len();

                    if let Ok(modified) = metadata.modified() {
                        let timestamp: DateTime<Utc> = modified.into();
                        stats.oldest_entry = Some(stats.oldest_entry.map_or(timestamp, |o| o.min(timestamp)));
                        stats.newest_entry = Some(stats.newest_entry.map_or(timestamp, |n| n.max(timestamp)));
                    }
                }
            }
        }

        Ok(stats)
    }
}
