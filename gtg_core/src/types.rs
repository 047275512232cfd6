//! Core domain types for the grease-the-groove workout system.
//!
//! This module defines the fundamental types used throughout the system:
//! - The persisted workout snapshot
//! - Session phases and the rest projection
//! - Difficulty ratings and reminder payloads
//! - Set log records

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

// ============================================================================
// Persisted State
// ============================================================================

/// The persisted workout snapshot
///
/// Every field defaults when absent so a fresh or partially written store
/// reads back as "first run" rather than an error.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkoutState {
    pub exercise_name: String,
    pub max_reps: i32,
    pub rest_duration_minutes: i32,
    pub current_reps: i32,
    pub is_setup_complete: bool,
    /// `DateTime::<Utc>::UNIX_EPOCH` when no rest period is active
    pub rest_period_end: DateTime<Utc>,
}

impl Default for WorkoutState {
    fn default() -> Self {
        Self {
            exercise_name: String::new(),
            max_reps: 0,
            rest_duration_minutes: 0,
            current_reps: 0,
            is_setup_complete: false,
            rest_period_end: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl WorkoutState {
    /// Build the snapshot written by the setup transition
    pub fn configured(
        exercise_name: impl Into<String>,
        max_reps: i32,
        rest_duration_minutes: i32,
        initial_reps: i32,
    ) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            max_reps,
            rest_duration_minutes,
            current_reps: initial_reps,
            is_setup_complete: true,
            rest_period_end: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Configured rest period as a duration
    pub fn rest_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.rest_duration_minutes))
    }
}

// ============================================================================
// Session Phase and Projection
// ============================================================================

/// Phase of the workout session state machine
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing has been read from the store yet
    Uninitialized,
    AwaitingSetup,
    Ready,
    Resting,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::AwaitingSetup => "awaiting setup",
            SessionPhase::Ready => "ready",
            SessionPhase::Resting => "resting",
        };
        f.write_str(label)
    }
}

/// Time left in the rest period, never negative
///
/// Reaches exactly zero at `rest_period_end` and stays there.
pub fn rest_remaining(rest_period_end: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (rest_period_end - now).max(Duration::zero())
}

/// A point-in-time view of the session derived from the latest snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub remaining: Duration,
}

impl SessionStatus {
    /// Project a status from an optional snapshot at `now`
    pub fn project(snapshot: Option<&WorkoutState>, now: DateTime<Utc>) -> Self {
        let Some(state) = snapshot else {
            return Self {
                phase: SessionPhase::Uninitialized,
                remaining: Duration::zero(),
            };
        };

        if !state.is_setup_complete {
            return Self {
                phase: SessionPhase::AwaitingSetup,
                remaining: Duration::zero(),
            };
        }

        let remaining = rest_remaining(state.rest_period_end, now);
        let phase = if remaining > Duration::zero() {
            SessionPhase::Resting
        } else {
            SessionPhase::Ready
        };

        Self { phase, remaining }
    }
}

// ============================================================================
// Ratings and Outcomes
// ============================================================================

/// Post-set difficulty rating (RPE), 1 = trivial through 10 = maximal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "i32", into = "i32")]
pub struct DifficultyRating(u8);

impl DifficultyRating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 10;

    /// Validate a raw rating; values outside 1..=10 are rejected, not clamped
    pub fn new(value: i32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidInput(format!(
                "difficulty rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }
}

impl TryFrom<i32> for DifficultyRating {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DifficultyRating> for i32 {
    fn from(rating: DifficultyRating) -> Self {
        rating.value()
    }
}

/// Data carried by a deferred reminder job
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderPayload {
    pub exercise_name: String,
    pub reps: i32,
}

/// Result of a successful set-completion transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetOutcome {
    /// Target the user just performed
    pub target_reps: i32,
    pub next_reps: i32,
    pub rest_ends_at: DateTime<Utc>,
    /// Validated rating the set was recorded with
    pub difficulty: DifficultyRating,
    pub job_id: Uuid,
}

// ============================================================================
// Set Log
// ============================================================================

/// A journaled completed set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    pub id: Uuid,
    pub exercise_name: String,
    pub target_reps: i32,
    pub difficulty: DifficultyRating,
    pub next_reps: i32,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_missing_fields_default_to_first_run() {
        let state: WorkoutState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, WorkoutState::default());
        assert!(!state.is_setup_complete);
        assert_eq!(state.rest_period_end, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_partial_fields_keep_present_values() {
        let state: WorkoutState =
            serde_json::from_str(r#"{"exercise_name":"Pushups","current_reps":7}"#).unwrap();
        assert_eq!(state.exercise_name, "Pushups");
        assert_eq!(state.current_reps, 7);
        assert_eq!(state.max_reps, 0);
    }

    #[test]
    fn test_rest_remaining_never_negative() {
        assert_eq!(rest_remaining(at(60), at(0)), Duration::seconds(60));
        assert_eq!(rest_remaining(at(60), at(60)), Duration::zero());
        assert_eq!(rest_remaining(at(60), at(3600)), Duration::zero());
        assert_eq!(rest_remaining(DateTime::<Utc>::UNIX_EPOCH, at(0)), Duration::zero());
    }

    #[test]
    fn test_projection_phases() {
        let now = at(0);
        assert_eq!(
            SessionStatus::project(None, now).phase,
            SessionPhase::Uninitialized
        );

        let fresh = WorkoutState::default();
        assert_eq!(
            SessionStatus::project(Some(&fresh), now).phase,
            SessionPhase::AwaitingSetup
        );

        let mut state = WorkoutState::configured("Pushups", 20, 90, 11);
        assert_eq!(
            SessionStatus::project(Some(&state), now).phase,
            SessionPhase::Ready
        );

        state.rest_period_end = at(30);
        let status = SessionStatus::project(Some(&state), now);
        assert_eq!(status.phase, SessionPhase::Resting);
        assert_eq!(status.remaining, Duration::seconds(30));

        // Exactly at the end instant the rest is over
        let status = SessionStatus::project(Some(&state), at(30));
        assert_eq!(status.phase, SessionPhase::Ready);
        assert_eq!(status.remaining, Duration::zero());
    }

    #[test]
    fn test_difficulty_rating_bounds() {
        assert!(DifficultyRating::new(0).is_err());
        assert!(DifficultyRating::new(11).is_err());
        assert!(DifficultyRating::new(-3).is_err());
        assert_eq!(DifficultyRating::new(1).unwrap().value(), 1);
        assert_eq!(DifficultyRating::new(10).unwrap().value(), 10);
    }

    #[test]
    fn test_difficulty_rating_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<DifficultyRating>("7").is_ok());
        assert!(serde_json::from_str::<DifficultyRating>("12").is_err());
    }
}
