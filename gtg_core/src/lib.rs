#![forbid(unsafe_code)]

//! Core domain model and business logic for the grease-the-groove trainer.
//!
//! This crate provides:
//! - Domain types (workout snapshot, phases, ratings, reminders)
//! - Rep target rules
//! - The workout session state machine
//! - Persistence (state file, job queue, set log)
//! - Reminder notifications

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod progression;
pub mod state;
pub mod scheduler;
pub mod notify;
pub mod history;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use progression::{initial_reps, next_reps};
pub use state::{FileStateStore, StateStore};
pub use scheduler::{
    ExistingJobPolicy, FileJobQueue, JobRequest, ReminderScheduler, ScheduledJob,
    WORKOUT_REMINDER_KEY,
};
pub use notify::{GatedSink, NotificationSink, ReminderJob};
pub use history::{read_sets, recent_sets, JsonlSetLog, SetLog};
pub use session::WorkoutSession;
