//! Workout session state machine.
//!
//! ```text
//! Uninitialized -> AwaitingSetup -> Ready <-> Resting
//!                        ^                       |
//!                        +------- reset ---------+
//! ```
//!
//! The session never keeps a countdown. Whether it is resting, and for how
//! long, is projected from the persisted `rest_period_end` at the instant the
//! caller observes it. Transitions write to the store first and only then
//! advance the in-memory snapshot.

use crate::progression::{initial_reps, next_reps};
use crate::scheduler::{ExistingJobPolicy, JobRequest, ReminderScheduler, WORKOUT_REMINDER_KEY};
use crate::state::StateStore;
use crate::{
    DifficultyRating, Error, ReminderPayload, Result, SessionPhase, SessionStatus, SetOutcome,
    WorkoutState,
};
use chrono::{DateTime, Utc};

type Observer = Box<dyn Fn(&WorkoutState)>;

/// Orchestrates setup and set completion against injected collaborators
pub struct WorkoutSession<S, J> {
    store: S,
    scheduler: J,
    snapshot: Option<WorkoutState>,
    observers: Vec<Observer>,
}

impl<S: StateStore, J: ReminderScheduler> WorkoutSession<S, J> {
    /// Create a session; nothing is read until the first transition or refresh
    pub fn new(store: S, scheduler: J) -> Self {
        Self {
            store,
            scheduler,
            snapshot: None,
            observers: Vec::new(),
        }
    }

    /// Create a session and immediately read the latest snapshot
    pub fn open(store: S, scheduler: J) -> Result<Self> {
        let mut session = Self::new(store, scheduler);
        session.refresh()?;
        Ok(session)
    }

    /// Register a callback that receives every snapshot the session loads or writes
    pub fn subscribe(&mut self, observer: impl Fn(&WorkoutState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Re-read the store and publish the result to observers
    pub fn refresh(&mut self) -> Result<&WorkoutState> {
        let state = self.store.read_state()?;
        Ok(self.publish(state))
    }

    /// Latest snapshot, if any has been read
    pub fn snapshot(&self) -> Option<&WorkoutState> {
        self.snapshot.as_ref()
    }

    /// Project phase and rest remaining at `now` from the latest snapshot
    pub fn observe(&self, now: DateTime<Utc>) -> SessionStatus {
        SessionStatus::project(self.snapshot.as_ref(), now)
    }

    /// Configure the workout and compute the starting rep target
    ///
    /// Only valid while awaiting setup. Writes the full snapshot once and
    /// schedules nothing. `now` only matters for reporting the phase a
    /// rejected call ran into.
    pub fn setup(
        &mut self,
        exercise_name: &str,
        max_reps: i32,
        rest_duration_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<&WorkoutState> {
        let exercise_name = exercise_name.trim();
        if exercise_name.is_empty() {
            return Err(Error::InvalidInput("exercise name must not be empty".into()));
        }
        if max_reps < 1 {
            return Err(Error::InvalidInput(format!(
                "max reps must be at least 1, got {}",
                max_reps
            )));
        }
        if rest_duration_minutes < 1 {
            return Err(Error::InvalidInput(format!(
                "rest duration must be at least 1 minute, got {}",
                rest_duration_minutes
            )));
        }

        let current = self.refresh()?;
        if current.is_setup_complete {
            let phase = SessionStatus::project(Some(current), now).phase;
            return Err(Error::InvalidTransition {
                phase,
                action: "set up the workout",
            });
        }

        let reps = initial_reps(max_reps, rest_duration_minutes);
        let state = WorkoutState::configured(exercise_name, max_reps, rest_duration_minutes, reps);
        self.store.write_initial(&state)?;

        tracing::info!(
            "Workout set up: {} (max {}, rest {} min), starting at {} reps",
            exercise_name,
            max_reps,
            rest_duration_minutes,
            reps
        );
        Ok(self.publish(state))
    }

    /// Record a finished set and start the rest period
    ///
    /// Only valid while ready. The rating must be within 1..=10. On success
    /// the new target and rest end are persisted in one write, then the
    /// rest-over reminder is scheduled, replacing any pending one.
    pub fn complete_set(&mut self, difficulty: i32, now: DateTime<Utc>) -> Result<SetOutcome> {
        let rating = DifficultyRating::new(difficulty)?;

        let mut state = self.refresh()?.clone();
        let phase = SessionStatus::project(Some(&state), now).phase;
        if phase != SessionPhase::Ready {
            return Err(Error::InvalidTransition {
                phase,
                action: "complete a set",
            });
        }

        let target_reps = state.current_reps;
        let next = next_reps(target_reps, rating);
        let delay = state.rest_duration();
        let rest_ends_at = now + delay;

        self.store.write_after_set(next, rest_ends_at)?;

        state.current_reps = next;
        state.rest_period_end = rest_ends_at;
        let payload = ReminderPayload {
            exercise_name: state.exercise_name.clone(),
            reps: next,
        };
        self.publish(state);

        let job_id = self.scheduler.schedule_once(JobRequest {
            key: WORKOUT_REMINDER_KEY.into(),
            delay,
            payload,
            policy: ExistingJobPolicy::Replace,
            requested_at: now,
        })?;

        tracing::info!(
            "Set complete at {} reps (rating {}), next target {}, resting until {}",
            target_reps,
            rating.value(),
            next,
            rest_ends_at
        );

        Ok(SetOutcome {
            target_reps,
            next_reps: next,
            rest_ends_at,
            difficulty: rating,
            job_id,
        })
    }

    /// Forget the workout and cancel any pending reminder
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        if self.scheduler.cancel(WORKOUT_REMINDER_KEY)? {
            tracing::debug!("Cancelled pending reminder during reset");
        }
        self.publish(WorkoutState::default());
        tracing::info!("Workout reset");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &J {
        &self.scheduler
    }

    fn publish(&mut self, state: WorkoutState) -> &WorkoutState {
        for observer in &self.observers {
            observer(&state);
        }
        self.snapshot.insert(state)
    }
}
