//! Workout state persistence with file locking.
//!
//! The session talks to a [`StateStore`]; [`FileStateStore`] keeps the
//! snapshot in a single JSON file. Every write lands through one atomic
//! rename, so readers never observe a partially applied transition.
//!
//! Read-modify-write cycles hold an exclusive lock on a `<file>.lock`
//! sidecar. The data file itself is replaced on every write, so a lock on
//! it would not survive the rename. The job queue shares these helpers.

use crate::{Error, Result, WorkoutState};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persistence collaborator for the workout snapshot
pub trait StateStore {
    /// Read the latest snapshot; never-written stores return the default state
    fn read_state(&self) -> Result<WorkoutState>;

    /// Replace the whole snapshot (setup)
    fn write_initial(&mut self, state: &WorkoutState) -> Result<()>;

    /// Update only the fields a completed set touches
    fn write_after_set(&mut self, current_reps: i32, rest_period_end: DateTime<Utc>) -> Result<()>;

    /// Forget everything (app reset)
    fn clear(&mut self) -> Result<()>;
}

/// Exclusive writer lock for one data file, released on drop
pub(crate) struct WriteLock {
    file: File,
}

impl WriteLock {
    /// Block until no other writer holds the lock for `path`
    pub(crate) fn acquire(path: &Path) -> Result<Self> {
        let lock_path = lock_path_for(path);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

/// Read a JSON document, falling back to `T::default()`
///
/// A missing file is a first run. An unreadable or corrupted file logs a
/// warning and also yields the default.
pub(crate) fn load_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No file at {:?}, using defaults", path);
            return Ok(T::default());
        }
        Err(e) => {
            tracing::warn!("Unable to read {:?}: {}. Using defaults.", path, e);
            return Ok(T::default());
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Using defaults.", path, e);
            Ok(T::default())
        }
    }
}

/// Write `value` to a temp file beside `path`, fsync it, then rename over `path`
///
/// Callers that read before writing must hold the [`WriteLock`].
pub(crate) fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::State(format!("path {:?} has no parent directory", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved {:?}", path);
    Ok(())
}

/// Load, modify and save a JSON document under the writer lock
///
/// If `f` fails nothing is written.
pub(crate) fn update_json<T, R, F>(path: &Path, f: F) -> Result<R>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnOnce(&mut T) -> Result<R>,
{
    let _lock = WriteLock::acquire(path)?;
    let mut value: T = load_json(path)?;
    let result = f(&mut value)?;
    save_json_atomic(path, &value)?;
    Ok(result)
}

/// JSON-file-backed state store
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for FileStateStore {
    fn read_state(&self) -> Result<WorkoutState> {
        load_json(&self.path)
    }

    fn write_initial(&mut self, state: &WorkoutState) -> Result<()> {
        let _lock = WriteLock::acquire(&self.path)?;
        save_json_atomic(&self.path, state)?;
        tracing::info!("Saved new workout for {:?}", state.exercise_name);
        Ok(())
    }

    fn write_after_set(&mut self, current_reps: i32, rest_period_end: DateTime<Utc>) -> Result<()> {
        update_json(&self.path, |state: &mut WorkoutState| {
            if !state.is_setup_complete {
                return Err(Error::State(
                    "cannot record a set before the workout is set up".into(),
                ));
            }
            state.current_reps = current_reps;
            state.rest_period_end = rest_period_end;
            Ok(())
        })
    }

    fn clear(&mut self) -> Result<()> {
        let _lock = WriteLock::acquire(&self.path)?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Removed state file {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
