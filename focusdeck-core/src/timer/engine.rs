//! Countdown state machine.

use super::CompletionSink;
use crate::types::{SessionRecord, SessionType, TimerSettings};

/// Result of a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Countdown is now running
    Started,
    /// A work session needs a subject before it can start; the caller should
    /// prompt for one and retry. This is a flow interrupt, not an error.
    SubjectRequired,
    /// The countdown was already running; nothing changed
    AlreadyRunning,
}

/// What happened when a countdown reached zero.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Kind of countdown that finished
    pub session_type: SessionType,
    /// The persisted record for a work completion. None for breaks (never
    /// persisted) and for work completions whose write failed.
    pub record: Option<SessionRecord>,
    /// Session type that was auto-started by chaining, if any
    pub auto_started: Option<SessionType>,
}

/// Single-countdown timer state machine.
///
/// States: Idle (not running) and Running, per session type. At most one
/// countdown is active at a time; [`TimerEngine::tick`] is a no-op while
/// paused.
pub struct TimerEngine {
    user_id: String,
    settings: TimerSettings,
    session_type: SessionType,
    remaining_secs: i64,
    running: bool,
    selected_subject_id: Option<String>,
}

impl TimerEngine {
    /// Create an idle work-session engine from a user's settings.
    pub fn new(user_id: impl Into<String>, settings: TimerSettings) -> Self {
        let remaining_secs = settings.duration_secs(SessionType::Work);
        Self {
            user_id: user_id.into(),
            settings,
            session_type: SessionType::Work,
            remaining_secs,
            running: false,
            selected_subject_id: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn remaining_secs(&self) -> i64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn selected_subject_id(&self) -> Option<&str> {
        self.selected_subject_id.as_deref()
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Fraction of the current countdown already elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let total = self.settings.duration_secs(self.session_type);
        if total <= 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Remaining time formatted as `MM:SS`.
    pub fn remaining_display(&self) -> String {
        let mins = self.remaining_secs / 60;
        let secs = self.remaining_secs % 60;
        format!("{:02}:{:02}", mins, secs)
    }

    /// Select (or clear) the subject the next work completion is tagged with.
    pub fn select_subject(&mut self, subject_id: Option<String>) {
        self.selected_subject_id = subject_id;
    }

    /// Idle -> Running.
    ///
    /// An untagged work session refuses to start and signals
    /// [`StartOutcome::SubjectRequired`] instead.
    pub fn start(&mut self) -> StartOutcome {
        if self.running {
            return StartOutcome::AlreadyRunning;
        }

        if self.session_type == SessionType::Work && self.selected_subject_id.is_none() {
            tracing::debug!("refusing to start untagged work session");
            return StartOutcome::SubjectRequired;
        }

        self.running = true;
        tracing::debug!(
            session_type = %self.session_type,
            remaining_secs = self.remaining_secs,
            "countdown started"
        );
        StartOutcome::Started
    }

    /// Running -> Idle, preserving the remaining time.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Any state -> Idle(current type) with the configured duration restored.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_secs = self.settings.duration_secs(self.session_type);
    }

    /// Any state -> Idle(new type); stops the countdown and reloads the
    /// duration. The selected subject is kept.
    pub fn switch_type(&mut self, session_type: SessionType) {
        self.running = false;
        self.session_type = session_type;
        self.remaining_secs = self.settings.duration_secs(session_type);
    }

    /// Swap in fresh settings; while idle the displayed duration refreshes.
    pub fn settings_changed(&mut self, settings: TimerSettings) {
        self.settings = settings;
        if !self.running {
            self.remaining_secs = self.settings.duration_secs(self.session_type);
        }
    }

    /// Advance the countdown by one second.
    ///
    /// No-op while paused. Returns the completion when the countdown reaches
    /// zero: work completions are handed to `sink` (failure logged and
    /// swallowed), then auto-chaining per settings decides the next state.
    pub fn tick(&mut self, sink: &dyn CompletionSink) -> Option<Completion> {
        if !self.running {
            return None;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs > 0 {
            return None;
        }
        self.remaining_secs = 0;

        Some(self.complete(sink))
    }

    fn complete(&mut self, sink: &dyn CompletionSink) -> Completion {
        let completed_type = self.session_type;
        self.running = false;

        // Only work completions are persisted; the countdown already reached
        // zero, so a failed write must not roll the state back.
        let record = if completed_type.is_work() {
            let duration = self.settings.duration_minutes(SessionType::Work);
            match sink.record_completion(
                &self.user_id,
                self.selected_subject_id.as_deref(),
                duration,
                SessionType::Work,
            ) {
                Ok(record) => {
                    tracing::info!(
                        record_id = %record.id,
                        duration_minutes = duration,
                        "work session recorded"
                    );
                    Some(record)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to record completed session");
                    None
                }
            }
        } else {
            None
        };

        let auto_started = if completed_type.is_work() && self.settings.auto_start_breaks {
            self.session_type = SessionType::ShortBreak;
            self.remaining_secs = self.settings.duration_secs(SessionType::ShortBreak);
            self.running = true;
            Some(SessionType::ShortBreak)
        } else if !completed_type.is_work() && self.settings.auto_start_pomodoros {
            self.session_type = SessionType::Work;
            self.remaining_secs = self.settings.duration_secs(SessionType::Work);
            self.running = true;
            Some(SessionType::Work)
        } else {
            // Back to Idle(current type) with a full countdown loaded
            self.remaining_secs = self.settings.duration_secs(completed_type);
            None
        };

        Completion {
            session_type: completed_type,
            record,
            auto_started,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use chrono::Utc;
    use std::cell::RefCell;

    /// Sink that records every completion it is handed.
    #[derive(Default)]
    struct RecordingSink {
        calls: RefCell<Vec<(Option<String>, i64, SessionType)>>,
    }

    impl CompletionSink for RecordingSink {
        fn record_completion(
            &self,
            user_id: &str,
            subject_id: Option<&str>,
            duration_minutes: i64,
            session_type: SessionType,
        ) -> Result<SessionRecord> {
            self.calls.borrow_mut().push((
                subject_id.map(|s| s.to_string()),
                duration_minutes,
                session_type,
            ));
            Ok(SessionRecord {
                id: "rec-1".to_string(),
                user_id: user_id.to_string(),
                subject_id: subject_id.map(|s| s.to_string()),
                duration_minutes,
                session_type,
                completed_at: Utc::now(),
            })
        }
    }

    /// Sink whose writes always fail.
    struct FailingSink;

    impl CompletionSink for FailingSink {
        fn record_completion(
            &self,
            _user_id: &str,
            _subject_id: Option<&str>,
            _duration_minutes: i64,
            _session_type: SessionType,
        ) -> Result<SessionRecord> {
            Err(Error::Validation("storage unavailable".into()))
        }
    }

    fn settings(study: i64) -> TimerSettings {
        TimerSettings {
            study_duration: study,
            ..Default::default()
        }
    }

    fn tagged_engine(study: i64) -> TimerEngine {
        let mut engine = TimerEngine::new("u1", settings(study));
        engine.select_subject(Some("subj-math".to_string()));
        engine
    }

    #[test]
    fn test_full_countdown_yields_one_completion() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(1);
        assert_eq!(engine.start(), StartOutcome::Started);

        let mut completions = 0;
        for _ in 0..60 {
            if engine.tick(&sink).is_some() {
                completions += 1;
            }
        }

        assert_eq!(completions, 1);
        assert_eq!(sink.calls.borrow().len(), 1);
        assert!(!engine.is_running());
        // Idle state reloads the full countdown
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn test_completion_carries_subject_and_duration() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(1);
        engine.start();

        let completion = (0..60).find_map(|_| engine.tick(&sink)).unwrap();
        assert_eq!(completion.session_type, SessionType::Work);
        let record = completion.record.unwrap();
        assert_eq!(record.subject_id.as_deref(), Some("subj-math"));
        assert_eq!(record.duration_minutes, 1);
    }

    #[test]
    fn test_tick_is_noop_while_paused() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(25);
        engine.start();
        engine.tick(&sink);
        let remaining = engine.remaining_secs();

        engine.pause();
        for _ in 0..100 {
            assert!(engine.tick(&sink).is_none());
        }
        assert_eq!(engine.remaining_secs(), remaining);
    }

    #[test]
    fn test_reset_restores_configured_duration() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(25);
        engine.start();
        for _ in 0..10 {
            engine.tick(&sink);
        }
        assert_eq!(engine.remaining_secs(), 25 * 60 - 10);

        engine.reset();
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 25 * 60);

        // Reset from idle too
        engine.reset();
        assert_eq!(engine.remaining_secs(), 25 * 60);
    }

    #[test]
    fn test_untagged_work_start_requires_subject() {
        let mut engine = TimerEngine::new("u1", settings(25));
        assert_eq!(engine.start(), StartOutcome::SubjectRequired);
        assert!(!engine.is_running());

        engine.select_subject(Some("subj-math".to_string()));
        assert_eq!(engine.start(), StartOutcome::Started);
    }

    #[test]
    fn test_breaks_start_without_subject() {
        let mut engine = TimerEngine::new("u1", settings(25));
        engine.switch_type(SessionType::ShortBreak);
        assert_eq!(engine.start(), StartOutcome::Started);
    }

    #[test]
    fn test_switch_type_stops_and_reloads() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(25);
        engine.start();
        engine.tick(&sink);

        engine.switch_type(SessionType::LongBreak);
        assert!(!engine.is_running());
        assert_eq!(engine.session_type(), SessionType::LongBreak);
        assert_eq!(engine.remaining_secs(), 15 * 60);
        // Subject selection survives type switches
        assert_eq!(engine.selected_subject_id(), Some("subj-math"));
    }

    #[test]
    fn test_auto_start_breaks_chains_immediately() {
        let sink = RecordingSink::default();
        let mut engine = TimerEngine::new(
            "u1",
            TimerSettings {
                study_duration: 1,
                auto_start_breaks: true,
                ..Default::default()
            },
        );
        engine.select_subject(Some("subj-math".to_string()));
        engine.start();

        let completion = (0..60).find_map(|_| engine.tick(&sink)).unwrap();
        assert_eq!(completion.auto_started, Some(SessionType::ShortBreak));
        assert!(engine.is_running());
        assert_eq!(engine.session_type(), SessionType::ShortBreak);
        assert_eq!(engine.remaining_secs(), 5 * 60);
    }

    #[test]
    fn test_no_auto_start_leaves_timer_idle() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(1);
        engine.start();

        let completion = (0..60).find_map(|_| engine.tick(&sink)).unwrap();
        assert!(completion.auto_started.is_none());
        assert!(!engine.is_running());
        assert_eq!(engine.session_type(), SessionType::Work);
    }

    #[test]
    fn test_auto_start_pomodoros_chains_after_break() {
        let sink = RecordingSink::default();
        let mut engine = TimerEngine::new(
            "u1",
            TimerSettings {
                short_break: 1,
                auto_start_pomodoros: true,
                ..Default::default()
            },
        );
        engine.switch_type(SessionType::ShortBreak);
        engine.start();

        let completion = (0..60).find_map(|_| engine.tick(&sink)).unwrap();
        assert_eq!(completion.session_type, SessionType::ShortBreak);
        assert_eq!(completion.auto_started, Some(SessionType::Work));
        assert!(engine.is_running());
        assert_eq!(engine.session_type(), SessionType::Work);
    }

    #[test]
    fn test_break_completion_is_not_persisted() {
        let sink = RecordingSink::default();
        let mut engine = TimerEngine::new(
            "u1",
            TimerSettings {
                short_break: 1,
                ..Default::default()
            },
        );
        engine.switch_type(SessionType::ShortBreak);
        engine.start();

        let completion = (0..60).find_map(|_| engine.tick(&sink)).unwrap();
        assert!(completion.record.is_none());
        assert!(sink.calls.borrow().is_empty());
    }

    #[test]
    fn test_failed_write_does_not_block_transition() {
        let mut engine = TimerEngine::new(
            "u1",
            TimerSettings {
                study_duration: 1,
                auto_start_breaks: true,
                ..Default::default()
            },
        );
        engine.select_subject(Some("subj-math".to_string()));
        engine.start();

        let completion = (0..60).find_map(|_| engine.tick(&FailingSink)).unwrap();
        // Write failed, record absent, but chaining still happened
        assert!(completion.record.is_none());
        assert_eq!(completion.auto_started, Some(SessionType::ShortBreak));
        assert!(engine.is_running());
    }

    #[test]
    fn test_settings_changed_refreshes_idle_countdown() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(25);
        engine.settings_changed(settings(50));
        assert_eq!(engine.remaining_secs(), 50 * 60);

        // A running countdown is left alone
        engine.start();
        engine.tick(&sink);
        let remaining = engine.remaining_secs();
        engine.settings_changed(settings(10));
        assert_eq!(engine.remaining_secs(), remaining);
    }

    #[test]
    fn test_remaining_display() {
        let engine = TimerEngine::new("u1", settings(25));
        assert_eq!(engine.remaining_display(), "25:00");
    }

    #[test]
    fn test_progress_fraction() {
        let sink = RecordingSink::default();
        let mut engine = tagged_engine(1);
        assert_eq!(engine.progress(), 0.0);
        engine.start();
        for _ in 0..30 {
            engine.tick(&sink);
        }
        assert!((engine.progress() - 0.5).abs() < 1e-9);
    }
}
