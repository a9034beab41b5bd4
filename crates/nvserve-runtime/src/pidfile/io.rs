//! PID-file lock store.
//!
//! Layout inside the lock directory:
//! ```text
//! <name>        JSON-encoded LockRecord
//! <name>.lock   advisory lock file (never removed)
//! <name>.tmp    scratch file for atomic publish
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use nvserve_core::paths::lock_dir;
use nvserve_core::{LockGuard, LockName, LockProbe, LockRecord, LockStore, LockStoreError};
use tracing::debug;

/// Lock store backed by files in a single directory.
#[derive(Debug, Clone)]
pub struct PidFileStore {
    dir: PathBuf,
}

/// Keeps the advisory lock held until dropped.
struct HeldLock {
    file: File,
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl PidFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `NVSERVE_RUN_DIR` or the temp directory.
    pub fn from_env() -> Self {
        Self::new(lock_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the record for `name`.
    pub fn record_path(&self, name: &LockName) -> PathBuf {
        self.dir.join(name.as_str())
    }

    fn lock_path(&self, name: &LockName) -> PathBuf {
        self.dir.join(format!("{name}.lock"))
    }

    fn temp_path(&self, name: &LockName) -> PathBuf {
        self.dir.join(format!("{name}.tmp"))
    }
}

impl LockStore for PidFileStore {
    fn acquire(&self, name: &LockName) -> Result<LockGuard, LockStoreError> {
        let path = self.lock_path(name);
        let unavailable = |source: io::Error| LockStoreError::Unavailable {
            target: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(unavailable)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(unavailable)?;

        file.lock_exclusive().map_err(unavailable)?;
        debug!(lock = %path.display(), "Acquired instance lock");

        Ok(LockGuard::new(name.clone(), HeldLock { file }))
    }

    fn probe(&self, guard: &LockGuard) -> Result<LockProbe, LockStoreError> {
        let path = self.record_path(guard.name());
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LockProbe::NoRecord),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Ok(LockProbe::Corrupt(format!("not valid UTF-8: {e}")));
            }
            Err(source) => {
                return Err(LockStoreError::Read {
                    target: path.display().to_string(),
                    source,
                });
            }
        };

        Ok(parse_record(guard.name(), &content))
    }

    fn publish(&self, guard: &LockGuard, record: &LockRecord) -> Result<(), LockStoreError> {
        let final_path = self.record_path(guard.name());
        let temp_path = self.temp_path(guard.name());

        write_atomic(&temp_path, &final_path, record).map_err(|source| LockStoreError::Write {
            target: final_path.display().to_string(),
            source,
        })?;

        debug!(record = %final_path.display(), pid = record.pid, "Published lock record");
        Ok(())
    }

    fn clear(&self, guard: &LockGuard) -> Result<(), LockStoreError> {
        let path = self.record_path(guard.name());
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LockStoreError::Write {
                target: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Write to `<name>.tmp`, fsync, then rename over the record.
fn write_atomic(temp_path: &Path, final_path: &Path, record: &LockRecord) -> io::Result<()> {
    let mut content = serde_json::to_vec_pretty(record).map_err(io::Error::other)?;
    content.push(b'\n');

    let mut file = File::create(temp_path)?;
    file.write_all(&content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, final_path)
}

fn parse_record(name: &LockName, content: &str) -> LockProbe {
    if content.trim().is_empty() {
        return LockProbe::Corrupt("record is empty".to_string());
    }

    match serde_json::from_str::<LockRecord>(content) {
        Ok(record) if &record.lock_name == name => LockProbe::Record(record),
        Ok(record) => LockProbe::Corrupt(format!(
            "record belongs to lock '{}', expected '{name}'",
            record.lock_name
        )),
        Err(e) => LockProbe::Corrupt(e.to_string()),
    }
}
