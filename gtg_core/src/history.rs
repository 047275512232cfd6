//! Append-only set log.
//!
//! Completed sets are appended to a JSONL (JSON Lines) file with file locking
//! so that concurrent `gtg` invocations never interleave partial lines.

use crate::{Result, SetRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Set log trait for journaling completed sets
pub trait SetLog {
    fn append(&mut self, record: &SetRecord) -> Result<()>;
}

/// JSONL-based set log with file locking
pub struct JsonlSetLog {
    path: PathBuf,
}

impl JsonlSetLog {
    /// Create a new JSONL set log for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SetLog for JsonlSetLog {
    fn append(&mut self, record: &SetRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended set {} to log", record.id);
        Ok(())
    }
}

/// Read all sets from a log file, oldest first
pub fn read_sets(path: &Path) -> Result<Vec<SetRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SetRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse set at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sets from log", records.len());
    Ok(records)
}

/// The most recent `limit` sets, newest first
pub fn recent_sets(path: &Path, limit: usize) -> Result<Vec<SetRecord>> {
    let mut records = read_sets(path)?;
    records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    records.truncate(limit);
    Ok(records)
}
