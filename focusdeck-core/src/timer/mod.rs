//! Timer engine for focusdeck
//!
//! A wall-clock-agnostic countdown state machine: the hosting shell calls
//! [`TimerEngine::tick`] once per second while the countdown runs. The engine
//! never owns a clock or a thread, which keeps every transition unit-testable.
//!
//! Completed work sessions are handed to a [`CompletionSink`] (the database
//! in production). The write is best-effort: a failed insert is logged and
//! swallowed, and the local state advances regardless.

mod engine;

pub use engine::{Completion, StartOutcome, TimerEngine};

use crate::db::Database;
use crate::error::Result;
use crate::types::{SessionRecord, SessionType};

/// Storage seam for the engine's completion path.
///
/// Implementations must assign `id` and `completed_at` themselves; the engine
/// only reports what ran.
pub trait CompletionSink {
    /// Persist a completed session, returning the stored record.
    fn record_completion(
        &self,
        user_id: &str,
        subject_id: Option<&str>,
        duration_minutes: i64,
        session_type: SessionType,
    ) -> Result<SessionRecord>;
}

impl CompletionSink for Database {
    fn record_completion(
        &self,
        user_id: &str,
        subject_id: Option<&str>,
        duration_minutes: i64,
        session_type: SessionType,
    ) -> Result<SessionRecord> {
        self.insert_session(user_id, subject_id, duration_minutes, session_type)
    }
}
