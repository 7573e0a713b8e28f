//! # Key-Value Storage
//!
//! History and favorites persist through a small key-value collaborator so
//! the calculators never touch the storage medium directly:
//! - [`MemoryStore`]: process-local map, used by tests and throwaway sessions
//! - [`FileStore`]: one JSON file per key inside a data directory
//!
//! The file backend keeps the safety features of a document editor:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **File locking**: a `.lock` file with owner metadata plus an OS-level
//!   exclusive lock (via fs2) while a write is in flight
//! - **Version validation**: every value is wrapped in a versioned
//!   [`Envelope`] and rejected if written by an incompatible schema
//!
//! ## Example
//!
//! ```rust
//! use calc_core::storage::{decode, encode, KeyValueStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.set("calcuMasterFavorites", &encode(&vec!["/unit-converter"])?)?;
//!
//! let raw = store.get("calcuMasterFavorites")?.unwrap_or_default();
//! let paths: Vec<String> = decode(&raw)?;
//! assert_eq!(paths, vec!["/unit-converter"]);
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Current persisted schema version
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Minimal key-value collaborator with string values.
pub trait KeyValueStore {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> CalcResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> CalcResult<()>;

    /// Delete a value. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> CalcResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> CalcResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> CalcResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> CalcResult<()> {
        (**self).remove(key)
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Versioned wrapper around every persisted value.
///
/// ```json
/// { "version": "0.1.0", "data": ["/unit-converter", "/bmi-calculator"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Envelope {
            version: SCHEMA_VERSION.to_string(),
            data,
        }
    }
}

/// Wrap `data` in an [`Envelope`] and serialize it to JSON.
pub fn encode<T: Serialize>(data: &T) -> CalcResult<String> {
    serde_json::to_string(&Envelope::new(data)).map_err(CalcError::serialization)
}

/// Parse an [`Envelope`] and return its payload after the version check.
pub fn decode<T: DeserializeOwned>(raw: &str) -> CalcResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(raw).map_err(CalcError::serialization)?;
    validate_version(&envelope.version)?;
    Ok(envelope.data)
}

/// Validate that a stored version is compatible with the current schema.
pub fn validate_version(stored_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        stored_version: stored_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let stored: Vec<u32> = stored_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if stored.is_empty() || current.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if stored[0] != current[0] {
        return Err(mismatch());
    }

    // 0.x: a newer minor may have breaking changes
    if current[0] == 0 && stored.len() > 1 && current.len() > 1 && stored[1] > current[1] {
        return Err(mismatch());
    }

    Ok(())
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CalcResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CalcResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CalcResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// File backend
// ============================================================================

/// Directory of `<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    owner: String,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// `owner` is recorded in lock files so a blocked writer can report who
    /// holds the store.
    pub fn open(dir: impl Into<PathBuf>, owner: impl Into<String>) -> CalcResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CalcError::storage("create directory", dir.display().to_string(), e.to_string()))?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(FileStore {
            dir,
            owner: owner.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the JSON file holding `key`.
    pub fn path_for(&self, key: &str) -> CalcResult<PathBuf> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CalcError::invalid_input(
                "key",
                key,
                "Keys may only contain ASCII letters, digits, '-' and '_'",
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CalcResult<Option<String>> {
        let path = self.path_for(key)?;
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CalcError::storage("open", key, e.to_string())),
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CalcError::storage("read", key, e.to_string()))?;
        Ok(Some(contents))
    }

    fn set(&mut self, key: &str, value: &str) -> CalcResult<()> {
        let path = self.path_for(key)?;
        let _lock = StoreLock::acquire(&path, self.owner.clone())?;
        write_atomic(&path, value)
    }

    fn remove(&mut self, key: &str) -> CalcResult<()> {
        let path = self.path_for(key)?;
        let _lock = StoreLock::acquire(&path, self.owner.clone())?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CalcError::storage("remove", key, e.to_string())),
        }
    }
}

/// Write `contents` to `path` via a synced temp file and a rename.
fn write_atomic(path: &Path, contents: &str) -> CalcResult<()> {
    let tmp_path = path.with_extension("json.tmp");
    let display = |p: &Path| p.display().to_string();

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::storage("create temp file", display(&tmp_path), e.to_string()))?;

    tmp_file
        .write_all(contents.as_bytes())
        .map_err(|e| CalcError::storage("write temp file", display(&tmp_path), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| CalcError::storage("sync temp file", display(&tmp_path), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::storage("rename to final", display(path), e.to_string())
    })
}

// ============================================================================
// Locking
// ============================================================================

/// Metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who took the lock (user name or session label)
    pub owner: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(owner: impl Into<String>) -> Self {
        LockInfo {
            owner: owner.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// A lock is stale once its process is gone (same machine) or it is
    /// older than 24 hours.
    pub fn is_stale(&self) -> bool {
        if let Some(our_machine) = hostname() {
            if self.machine == our_machine && !process_alive(self.pid) {
                return true;
            }
        }
        (Utc::now() - self.locked_at).num_hours() > 24
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    fs::metadata(format!("/proc/{}", pid)).is_ok()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive write lock on one store file, released on drop.
///
/// Combines an OS advisory lock (fs2) with a `.lock` file carrying
/// [`LockInfo`] so a blocked writer can say who holds it.
pub struct StoreLock {
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl StoreLock {
    /// Acquire the lock for `path`.
    ///
    /// # Errors
    ///
    /// * `StoreLocked` - another live process holds the lock
    /// * `StorageError` - the lock file could not be written
    pub fn acquire(path: &Path, owner: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(owner);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(CalcError::store_locked(
                    path.display().to_string(),
                    format!("{} ({}, pid {})", existing.owner, existing.machine, existing.pid),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            tracing::warn!(
                lock = %lock_path.display(),
                owner = %existing.owner,
                pid = existing.pid,
                "taking over stale store lock"
            );
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::storage("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::store_locked(path.display().to_string(), "another process", "unknown")
        })?;

        // Holder info is only replaced once the OS lock is ours.
        lock_file
            .set_len(0)
            .map_err(|e| CalcError::storage("reset lock", lock_path.display().to_string(), e.to_string()))?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| CalcError::storage("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| CalcError::storage("sync lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(StoreLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live lock holder for `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/data/calcuMasterHistory.json"));
        assert_eq!(lock_path, Path::new("/data/calcuMasterHistory.json.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("cli");
        assert_eq!(info.owner, "cli");
        assert!(info.pid > 0);
        assert!(!info.is_stale());
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("cli");
        info.machine = "some-other-host".to_string();
        info.locked_at = Utc::now() - chrono::Duration::hours(30);
        assert!(info.is_stale());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("nested"), "test").unwrap();

        assert_eq!(store.get("calcuMasterHistory").unwrap(), None);
        store.set("calcuMasterHistory", "[1,2,3]").unwrap();
        assert_eq!(store.get("calcuMasterHistory").unwrap().as_deref(), Some("[1,2,3]"));

        let path = store.path_for("calcuMasterHistory").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert!(!lock_path_for(&path).exists());

        store.remove("calcuMasterHistory").unwrap();
        assert_eq!(store.get("calcuMasterHistory").unwrap(), None);
        store.remove("calcuMasterHistory").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path(), "test").unwrap();
        assert!(matches!(store.path_for("../escape"), Err(CalcError::InvalidInput { .. })));
        assert!(store.path_for("").is_err());
    }

    #[test]
    fn test_live_lock_blocks_writer() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path(), "second").unwrap();
        let path = store.path_for("calcuMasterFavorites").unwrap();

        let lock = StoreLock::acquire(&path, "first").unwrap();
        assert_eq!(StoreLock::check(&path).map(|i| i.owner), Some("first".to_string()));

        let err = store.set("calcuMasterFavorites", "[]").unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), "STORE_LOCKED");

        drop(lock);
        assert!(StoreLock::check(&path).is_none());
        store.set("calcuMasterFavorites", "[]").unwrap();
    }

    #[test]
    fn test_stale_lock_is_taken_over() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path(), "cli").unwrap();
        let path = store.path_for("calcuMasterHistory").unwrap();

        let mut stale = LockInfo::new("crashed");
        stale.locked_at = Utc::now() - chrono::Duration::hours(48);
        fs::write(lock_path_for(&path), serde_json::to_string(&stale).unwrap()).unwrap();

        store.set("calcuMasterHistory", "[]").unwrap();
        assert_eq!(store.get("calcuMasterHistory").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_losing_writer_keeps_holder_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calcuMasterHistory.json");
        let lock_path = lock_path_for(&path);

        let mut stale = LockInfo::new("holder");
        stale.locked_at = Utc::now() - chrono::Duration::hours(48);
        let written = serde_json::to_string(&stale).unwrap();
        fs::write(&lock_path, &written).unwrap();
        let holder = File::open(&lock_path).unwrap();
        holder.try_lock_exclusive().unwrap();

        let err = StoreLock::acquire(&path, "second").err().unwrap();
        assert_eq!(err.error_code(), "STORE_LOCKED");
        assert_eq!(fs::read_to_string(&lock_path).unwrap(), written);

        holder.unlock().unwrap();
        let lock = StoreLock::acquire(&path, "second").unwrap();
        assert_eq!(read_lock_info(&lock_path).map(|i| i.owner), Some("second".to_string()));
        drop(lock);
    }

    #[test]
    fn test_envelope_roundtrip() {
        let raw = encode(&vec![1, 2, 3]).unwrap();
        assert!(raw.contains("\"version\":\"0.1.0\""));
        let data: Vec<i32> = decode(&raw).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(matches!(decode::<Vec<i32>>("not json"), Err(CalcError::SerializationError { .. })));
        assert!(matches!(
            decode::<Vec<i32>>(r#"{"version":"2.0.0","data":[]}"#),
            Err(CalcError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
