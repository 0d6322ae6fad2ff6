//! # File I/O
//!
//! Worksheet files on a shop's shared drive:
//! - **Atomic saves**: write `.lcw.tmp`, fsync, rename over the target
//! - **File locking**: one estimator edits a worksheet at a time
//! - **Version validation**: refuse files written by a newer schema
//!
//! Worksheets are `.lcw` files containing pretty JSON. Lock files use the
//! `.lcw.lock` extension and record who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lasercalc_core::file_io::{save_worksheet, FileLock};
//! use lasercalc_core::worksheet::Worksheet;
//! use std::path::Path;
//!
//! let ws = Worksheet::new("Dana", "Q-2291", "Northside Fab");
//! let path = Path::new("q-2291.lcw");
//!
//! let lock = FileLock::acquire(path, "dana@shop.example")?;
//! save_worksheet(&ws, path)?;
//! drop(lock);
//! # Ok::<(), lasercalc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::worksheet::{ShopSettings, Worksheet, SCHEMA_VERSION};

/// Locks older than this are taken over regardless of owner
pub const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in .lcw.lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive worksheet lock, released on drop.
///
/// Holds an OS-level lock (fs2) on the `.lcw.lock` file, whose JSON body
/// tells other estimators who has the worksheet open.
pub struct FileLock {
    worksheet_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a worksheet.
    ///
    /// Returns `CalcError::FileLocked` when a live lock exists. A stale lock
    /// (dead pid on this host, or older than 24 hours) is taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = FileLock::check(path) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }
        if lock_path.exists() {
            tracing::warn!(path = %lock_path.display(), "taking over stale lock");
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| {
            CalcError::SerializationError {
                reason: e.to_string(),
            }
        })?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            CalcError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        tracing::debug!(path = %path.display(), user = %info.user_id, "worksheet locked");
        Ok(FileLock {
            worksheet_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a file is locked without acquiring the lock.
    ///
    /// Returns `Some(LockInfo)` if locked, `None` if available.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    pub fn worksheet_path(&self) -> &Path {
        &self.worksheet_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // OS lock goes with _lock_file
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `job.lcw` → `job.lcw.lock`
fn lock_path_for(worksheet_path: &Path) -> PathBuf {
    let mut lock_path = worksheet_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })
}

/// A lock is stale when its process is gone from this host or it is more
/// than a day old.
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

/// Save a worksheet with atomic write semantics.
///
/// Writes `.lcw.tmp`, syncs it and renames it over the target, so an
/// interrupted save never leaves a truncated worksheet.
pub fn save_worksheet(worksheet: &Worksheet, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(worksheet).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("lcw.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), items = worksheet.item_count(), "worksheet saved");
    Ok(())
}

/// Load a worksheet, checking its schema version.
///
/// # Errors
///
/// * `CalcError::VersionMismatch` - written by an incompatible schema
/// * `CalcError::SerializationError` - not a worksheet
/// * `CalcError::FileError` - I/O failure
pub fn load_worksheet(path: &Path) -> CalcResult<Worksheet> {
    let contents = read_to_string(path, "read")?;

    let worksheet: Worksheet = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid worksheet {}: {}", path.display(), e),
    })?;

    validate_version(&worksheet.meta.version)?;
    Ok(worksheet)
}

/// Load a worksheet and report whether someone else holds its lock.
pub fn load_worksheet_with_lock_check(path: &Path) -> CalcResult<(Worksheet, Option<LockInfo>)> {
    let worksheet = load_worksheet(path)?;
    let lock_info = FileLock::check(path);
    Ok((worksheet, lock_info))
}

/// Load standalone shop settings. A missing file yields the defaults;
/// fields absent from the file keep their default values.
pub fn load_settings(path: &Path) -> CalcResult<ShopSettings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "settings file not found, using defaults");
        return Ok(ShopSettings::default());
    }
    let contents = read_to_string(path, "read settings")?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid settings {}: {}", path.display(), e),
    })
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Major versions must match; in 0.x a newer minor is rejected too.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    let (Some(&file_major), Some(&current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    if current_major == 0 {
        if let (Some(&file_minor), Some(&current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{CalculationItem, KerfInput};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn worksheet_path(dir: &TempDir, name: &str) -> PathBuf {
        dir.path().join(format!("{}.lcw", name))
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/shop/quotes/q-2291.lcw"));
        assert_eq!(lock_path, Path::new("/shop/quotes/q-2291.lcw.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("dana@shop.example");
        assert_eq!(info.user_id, "dana@shop.example");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = worksheet_path(&dir, "roundtrip");

        let mut ws = Worksheet::new("Dana", "Q-2291", "Northside Fab");
        let id = ws.add_item(CalculationItem::Kerf(KerfInput::default()));
        save_worksheet(&ws, &path).unwrap();

        let loaded = load_worksheet(&path).unwrap();
        assert_eq!(loaded.meta.estimator, "Dana");
        assert_eq!(loaded.meta.customer, "Northside Fab");
        assert_eq!(loaded.get_item(&id), ws.get_item(&id));
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = worksheet_path(&dir, "atomic");

        save_worksheet(&Worksheet::default(), &path).unwrap();

        assert!(!path.with_extension("lcw.tmp").exists());
        assert!(path.exists());
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let path = worksheet_path(&dir, "locked");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "dana@shop.example").unwrap();
        assert_eq!(lock.info.user_id, "dana@shop.example");
        assert_eq!(lock.worksheet_path(), path.as_path());

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_old_lock_is_taken_over() {
        let dir = TempDir::new().unwrap();
        let path = worksheet_path(&dir, "stale");
        let stale = LockInfo {
            user_id: "gone@shop.example".to_string(),
            machine: "some-other-host".to_string(),
            pid: 1,
            locked_at: Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1),
        };
        fs::write(lock_path_for(&path), serde_json::to_string(&stale).unwrap()).unwrap();

        assert!(FileLock::check(&path).is_none());
        let lock = FileLock::acquire(&path, "dana@shop.example").unwrap();
        assert_eq!(lock.info.user_id, "dana@shop.example");
    }

    #[test]
    fn test_recent_foreign_lock_blocks() {
        let dir = TempDir::new().unwrap();
        let path = worksheet_path(&dir, "busy");
        let held = LockInfo {
            user_id: "sam@shop.example".to_string(),
            machine: "some-other-host".to_string(),
            pid: 1,
            locked_at: Utc::now(),
        };
        fs::write(lock_path_for(&path), serde_json::to_string(&held).unwrap()).unwrap();

        let err = FileLock::acquire(&path, "dana@shop.example").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.is_recoverable());
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

    #[test]
    fn test_load_rejects_newer_schema() {
        let dir = TempDir::new().unwrap();
        let path = worksheet_path(&dir, "future");
        let mut ws = Worksheet::default();
        ws.meta.version = "0.9.0".to_string();
        save_worksheet(&ws, &path).unwrap();

        let err = load_worksheet(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_worksheet(&worksheet_path(&dir, "nope")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_with_lock_check() {
        let dir = TempDir::new().unwrap();
        let path = worksheet_path(&dir, "lock_check");
        save_worksheet(&Worksheet::new("Dana", "Q-1", "Acme"), &path).unwrap();

        let (loaded, lock_info) = load_worksheet_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.job_id, "Q-1");
        assert!(lock_info.is_none());
    }

    #[test]
    fn test_load_settings() {
        let dir = TempDir::new().unwrap();
        let missing = load_settings(&dir.path().join("shop.json")).unwrap();
        assert_eq!(missing, ShopSettings::default());

        let path = dir.path().join("shop.json");
        fs::write(&path, r#"{ "electricity_rate": 0.18 }"#).unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.electricity_rate, 0.18);
        assert_eq!(settings.setup_labor_rate, ShopSettings::default().setup_labor_rate);

        fs::write(&path, "not json").unwrap();
        assert_eq!(load_settings(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
    }
}
