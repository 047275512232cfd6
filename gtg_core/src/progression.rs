//! Rep target rules.
//!
//! - Initial target: a fraction of the user's max reps, smaller for short rests
//! - Next target: nudged up or down by one based on the post-set rating

use crate::DifficultyRating;

/// Rest periods at or below this many minutes use the lighter starting fraction
pub const SHORT_REST_LIMIT_MINUTES: i32 = 60;

const SHORT_REST_FRACTION: f64 = 0.45;
const LONG_REST_FRACTION: f64 = 0.55;

/// Ratings at or below this felt easy
pub const EASY_RATING_CEILING: i32 = 3;

/// Ratings at or above this felt hard
pub const HARD_RATING_FLOOR: i32 = 7;

/// Compute the starting rep target for a new workout
///
/// `floor(max_reps * fraction)`, never below 1. Non-positive inputs still
/// produce 1.
pub fn initial_reps(max_reps: i32, rest_duration_minutes: i32) -> i32 {
    let fraction = if rest_duration_minutes <= SHORT_REST_LIMIT_MINUTES {
        SHORT_REST_FRACTION
    } else {
        LONG_REST_FRACTION
    };

    let reps = (f64::from(max_reps) * fraction).floor() as i32;
    reps.max(1)
}

/// Compute the next rep target from the current one and the set's rating
///
/// Ratings 1..=3 add a rep, 7..=10 remove one (floored at 1), 4..=6 hold.
pub fn next_reps(current_reps: i32, rating: DifficultyRating) -> i32 {
    let rating = rating.value();
    let next = if rating <= EASY_RATING_CEILING {
        current_reps.saturating_add(1)
    } else if rating >= HARD_RATING_FLOOR {
        current_reps.saturating_sub(1).max(1)
    } else {
        current_reps
    };

    tracing::debug!(
        "Rep progression: rating {} moves target {} -> {}",
        rating,
        current_reps,
        next
    );
    next
}
