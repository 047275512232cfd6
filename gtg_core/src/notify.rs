//! Rest-over reminders.
//!
//! The reminder job runs after the session that scheduled it may be gone, so
//! it works only from its own payload and hands the rendered message to a
//! [`NotificationSink`].

use crate::ReminderPayload;

/// Default notification title
pub const DEFAULT_TITLE: &str = "Time for your next set!";

const FALLBACK_EXERCISE: &str = "your exercise";

/// Destination for user-facing notifications
///
/// Fire-and-forget: delivery problems are the sink's business.
pub trait NotificationSink {
    fn notify(&mut self, title: &str, body: &str);
}

/// Sink that only posts when the user has granted permission
pub struct GatedSink<S> {
    inner: S,
    permitted: bool,
}

impl<S: NotificationSink> GatedSink<S> {
    pub fn new(inner: S, permitted: bool) -> Self {
        Self { inner, permitted }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: NotificationSink> NotificationSink for GatedSink<S> {
    fn notify(&mut self, title: &str, body: &str) {
        if self.permitted {
            self.inner.notify(title, body);
        } else {
            tracing::debug!("Notification permission absent, dropping {:?}", title);
        }
    }
}

/// The deferred "rest is over" job
pub struct ReminderJob;

impl ReminderJob {
    /// Body text for a payload, with fallbacks for blank data
    pub fn body(payload: &ReminderPayload) -> String {
        let exercise = if payload.exercise_name.trim().is_empty() {
            FALLBACK_EXERCISE
        } else {
            payload.exercise_name.as_str()
        };
        let reps = if payload.reps > 0 { payload.reps } else { 1 };
        format!("Perform {} reps of {}.", reps, exercise)
    }

    /// Post the reminder for `payload`
    pub fn run(payload: &ReminderPayload, title: &str, sink: &mut dyn NotificationSink) {
        let body = Self::body(payload);
        tracing::info!("Firing reminder: {}", body);
        sink.notify(title, &body);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Collects notifications for assertions
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub sent: Vec<(String, String)>,
    }

    impl NotificationSink for RecordingSink {
        fn notify(&mut self, title: &str, body: &str) {
            self.sent.push((title.to_string(), body.to_string()));
        }
    }

    fn payload(name: &str, reps: i32) -> ReminderPayload {
        ReminderPayload {
            exercise_name: name.into(),
            reps,
        }
    }

    #[test]
    fn test_reminder_message() {
        let mut sink = RecordingSink::default();
        ReminderJob::run(&payload("Pushups", 12), DEFAULT_TITLE, &mut sink);

        assert_eq!(
            sink.sent,
            vec![(
                "Time for your next set!".to_string(),
                "Perform 12 reps of Pushups.".to_string()
            )]
        );
    }

    #[test]
    fn test_reminder_fallbacks() {
        assert_eq!(
            ReminderJob::body(&payload("  ", 0)),
            "Perform 1 reps of your exercise."
        );
    }

    #[test]
    fn test_gated_sink_drops_without_permission() {
        let mut denied = GatedSink::new(RecordingSink::default(), false);
        ReminderJob::run(&payload("Squats", 8), DEFAULT_TITLE, &mut denied);
        assert!(denied.into_inner().sent.is_empty());

        let mut allowed = GatedSink::new(RecordingSink::default(), true);
        ReminderJob::run(&payload("Squats", 8), DEFAULT_TITLE, &mut allowed);
        assert_eq!(allowed.into_inner().sent.len(), 1);
    }
}
