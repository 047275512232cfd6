//! Deferred one-shot reminder jobs.
//!
//! Jobs are keyed: at most one pending job exists per key, and the
//! [`ExistingJobPolicy`] of a new request decides whether it supersedes the
//! pending one. [`FileJobQueue`] keeps pending jobs on disk so they survive
//! the process that scheduled them; something else (cron, a systemd timer,
//! `gtg notify`) calls [`FileJobQueue::run_due`] later.

use crate::notify::{NotificationSink, ReminderJob};
use crate::state::{load_json, save_json_atomic, update_json, WriteLock};
use crate::{Error, ReminderPayload, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Fixed key for the session's rest-over reminder
pub const WORKOUT_REMINDER_KEY: &str = "gtg_workout_notification";

/// What to do when a job with the same key is still pending
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExistingJobPolicy {
    /// Cancel the pending job and enqueue the new one
    Replace,
    /// Leave the pending job alone and drop the new request
    Keep,
}

/// A request to run the reminder job once after `delay`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRequest {
    pub key: String,
    pub delay: Duration,
    pub payload: ReminderPayload,
    pub policy: ExistingJobPolicy,
    pub requested_at: DateTime<Utc>,
}

/// A job waiting for its fire time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledJob {
    pub id: Uuid,
    pub key: String,
    pub payload: ReminderPayload,
    pub scheduled_at: DateTime<Utc>,
    pub fire_at: DateTime<Utc>,
}

impl ScheduledJob {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.fire_at <= now
    }
}

/// Deferred job scheduler collaborator
pub trait ReminderScheduler {
    /// Enqueue a one-shot job, returning the id of the job left pending
    fn schedule_once(&mut self, request: JobRequest) -> Result<Uuid>;

    /// Cancel a pending job; returns whether one existed
    fn cancel(&mut self, key: &str) -> Result<bool>;
}

/// Pending jobs, one per key
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobTable {
    #[serde(default)]
    pub jobs: BTreeMap<String, ScheduledJob>,
}

impl JobTable {
    /// Apply a request to the table under its policy
    pub fn enqueue(&mut self, request: JobRequest) -> Result<Uuid> {
        if request.delay < Duration::zero() {
            return Err(Error::Scheduler(format!(
                "negative delay for job {:?}",
                request.key
            )));
        }

        if request.policy == ExistingJobPolicy::Keep {
            if let Some(existing) = self.jobs.get(&request.key) {
                tracing::debug!(
                    "Keeping pending job {} for key {:?}",
                    existing.id,
                    request.key
                );
                return Ok(existing.id);
            }
        }

        let job = ScheduledJob {
            id: Uuid::new_v4(),
            key: request.key.clone(),
            payload: request.payload,
            scheduled_at: request.requested_at,
            fire_at: request.requested_at + request.delay,
        };
        let id = job.id;

        if let Some(previous) = self.jobs.insert(request.key, job) {
            tracing::debug!("Replaced pending job {}", previous.id);
        }
        Ok(id)
    }

    /// Remove and return every job due at `now`, earliest first
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        let due_keys: Vec<String> = self
            .jobs
            .values()
            .filter(|job| job.is_due(now))
            .map(|job| job.key.clone())
            .collect();

        let mut due: Vec<ScheduledJob> = due_keys
            .iter()
            .filter_map(|key| self.jobs.remove(key))
            .collect();
        due.sort_by_key(|job| job.fire_at);
        due
    }
}

/// JSON-file-backed job queue
pub struct FileJobQueue {
    path: PathBuf,
}

impl FileJobQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All pending jobs, earliest first
    pub fn pending(&self) -> Result<Vec<ScheduledJob>> {
        let table: JobTable = load_json(&self.path)?;
        let mut jobs: Vec<ScheduledJob> = table.jobs.into_values().collect();
        jobs.sort_by_key(|job| job.fire_at);
        Ok(jobs)
    }

    /// Fire every job due at `now`; returns how many ran
    ///
    /// Due jobs are removed from disk before they run, so a crash mid-run
    /// drops a reminder rather than repeating it.
    pub fn run_due(
        &mut self,
        now: DateTime<Utc>,
        title: &str,
        sink: &mut dyn NotificationSink,
    ) -> Result<usize> {
        let due = {
            let _lock = WriteLock::acquire(&self.path)?;
            let mut table: JobTable = load_json(&self.path)?;
            let due = table.take_due(now);
            if due.is_empty() {
                tracing::debug!("No reminders due at {}", now);
                return Ok(0);
            }
            save_json_atomic(&self.path, &table)?;
            due
        };

        for job in &due {
            ReminderJob::run(&job.payload, title, sink);
        }
        tracing::info!("Ran {} due reminder(s)", due.len());
        Ok(due.len())
    }
}

impl ReminderScheduler for FileJobQueue {
    fn schedule_once(&mut self, request: JobRequest) -> Result<Uuid> {
        let key = request.key.clone();
        let fire_at = request.requested_at + request.delay;
        let id = update_json(&self.path, |table: &mut JobTable| table.enqueue(request))?;
        tracing::info!("Scheduled job {} ({:?}) for {}", id, key, fire_at);
        Ok(id)
    }

    fn cancel(&mut self, key: &str) -> Result<bool> {
        let _lock = WriteLock::acquire(&self.path)?;
        let mut table: JobTable = load_json(&self.path)?;
        let removed = table.jobs.remove(key).is_some();
        if removed {
            save_json_atomic(&self.path, &table)?;
            tracing::info!("Cancelled pending job {:?}", key);
        }
        Ok(removed)
    }
}
