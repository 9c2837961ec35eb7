//! The Cache Manager: a directory of JSON files, one per entry, keyed by the
//! MD5 hash of the entry's normalized absolute source path. All reads and
//! writes are fail-soft — a corrupt, unreadable, or locked entry is treated
//! as a miss; correctness is derived from re-analysis, never from the cache.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default cache-entry lifetime: 7 days.
pub const DEFAULT_MAX_AGE_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// The on-disk shape of one cache entry: `{fileHash, timestamp, analysis}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "fileHash")]
    pub file_hash: String,
    pub timestamp: u64,
    pub analysis: Value,
}

/// Aggregate statistics over the cache directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub count: usize,
    pub total_bytes: u64,
    pub oldest_timestamp: Option<u64>,
}

/// A directory-backed, content-hash-keyed cache of per-file analysis
/// artifacts.
pub struct CacheManager {
    dir: PathBuf,
    max_age_ms: u64,
}

impl CacheManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), max_age_ms: DEFAULT_MAX_AGE_MS }
    }

    pub fn with_max_age_ms(mut self, max_age_ms: u64) -> Self {
        self.max_age_ms = max_age_ms;
        self
    }

    /// Normalizes `path` to an absolute form and hashes it to the 32-hex
    /// digest used as the cache-entry filename.
    pub fn key_for(&self, path: &Path) -> String {
        let normalized = path_clean::clean(path);
        let mut hasher = Md5::new();
        hasher.update(normalized.to_string_lossy().as_bytes());
        hex_encode(&hasher.finalize())
    }

    fn entry_path(&self, path: &Path) -> PathBuf {
        self.dir.join(format!("{}.json", self.key_for(path)))
    }

    /// Returns the cached analysis payload for `path` if present, not
    /// expired, and the file's current content hash matches the stored hash.
    /// Any failure along the way (missing file, corrupt JSON, stale hash) is
    /// a plain miss.
    pub fn get(&self, path: &Path, current_content_hash: &str) -> Option<Value> {
        let raw = fs::read_to_string(self.entry_path(path)).ok()?;
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;
        if entry.file_hash != current_content_hash {
            return None;
        }
        let now = now_ms();
        if now.saturating_sub(entry.timestamp) > self.max_age_ms {
            return None;
        }
        Some(entry.analysis)
    }

    /// Writes (or overwrites) the cache entry for `path`. Best-effort: write
    /// failures are swallowed by the caller via the `Result`, which callers
    /// are expected to log and discard rather than propagate.
    pub fn set(&self, path: &Path, content_hash: &str, analysis: Value) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry { file_hash: content_hash.to_string(), timestamp: now_ms(), analysis };
        let serialized = serde_json::to_vec(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.entry_path(path), serialized)
    }

    /// Deletes the entry for `path`, ignoring absence.
    pub fn invalidate(&self, path: &Path) {
        let _ = fs::remove_file(self.entry_path(path));
    }

    /// Empties the cache directory.
    pub fn clear(&self) -> std::io::Result<()> {
        if self.dir.is_dir() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Computes aggregate statistics over the cache directory.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        let Ok(read_dir) = fs::read_dir(&self.dir) else { return stats };
        for entry in read_dir.flatten() {
            let Ok(metadata) = entry.metadata() else { continue };
            if !metadata.is_file() {
                continue;
            }
            stats.count += 1;
            stats.total_bytes += metadata.len();
            if let Ok(raw) = fs::read_to_string(entry.path()) {
                if let Ok(parsed) = serde_json::from_str::<CacheEntry>(&raw) {
                    stats.oldest_timestamp =
                        Some(stats.oldest_timestamp.map_or(parsed.timestamp, |oldest| oldest.min(parsed.timestamp)));
                }
            }
        }
        stats
    }

    /// Removes every entry whose timestamp is older than `max_age_ms`, and
    /// every entry that cannot be parsed as the expected JSON shape.
    pub fn prune_expired(&self) -> std::io::Result<usize> {
        let mut removed = 0;
        let Ok(read_dir) = fs::read_dir(&self.dir) else { return Ok(0) };
        let now = now_ms();
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let should_remove = match fs::read_to_string(&path).ok().and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok()) {
                Some(parsed) => now.saturating_sub(parsed.timestamp) > self.max_age_ms,
                None => true,
            };
            if should_remove {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn set_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path());
        let path = Path::new("/proj/src/a.ts");
        cache.set(path, "hash1", json!({"nodes": []})).unwrap();
        let hit = cache.get(path, "hash1");
        assert_eq!(hit, Some(json!({"nodes": []})));
    }

    #[test]
    fn get_misses_on_content_hash_mismatch() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path());
        let path = Path::new("/proj/src/a.ts");
        cache.set(path, "hash1", json!({})).unwrap();
        assert!(cache.get(path, "hash2").is_none());
    }

    #[test]
    fn get_misses_when_entry_is_expired() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path()).with_max_age_ms(0);
        let path = Path::new("/proj/src/a.ts");
        cache.set(path, "hash1", json!({})).unwrap();
        assert!(cache.get(path, "hash1").is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path());
        let path = Path::new("/proj/src/a.ts");
        cache.set(path, "hash1", json!({})).unwrap();
        cache.invalidate(path);
        assert!(cache.get(path, "hash1").is_none());
    }

    #[test]
    fn prune_expired_removes_unparseable_entries() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("garbage.json"), "not json").unwrap();
        let removed = cache.prune_expired().unwrap();
        assert_eq!(removed, 1);
    }

    #[test]
    fn key_for_is_stable_for_the_same_normalized_path() {
        let cache = CacheManager::new(".");
        assert_eq!(cache.key_for(Path::new("/a/b/c.ts")), cache.key_for(Path::new("/a/b/./c.ts")));
    }
}
