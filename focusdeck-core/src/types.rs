//! Core domain types for focusdeck
//!
//! These types form the canonical data model shared by the timer engine,
//! the statistics aggregator, and the API surface.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **SessionRecord** | A completed countdown, persisted when it reaches zero naturally |
//! | **Subject** | A study topic a work session can be tagged with |
//! | **TimerSettings** | Per-user durations and auto-chaining flags |
//! | **TimeRange** | Lookback window for statistics (week, month, year) |
//!
//! SessionRecords are append-only: the timer engine creates them and the
//! statistics aggregator reads them, nothing mutates or deletes them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Session type
// ============================================

/// Kind of countdown a session record was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// A study session; the only kind counted toward statistics
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
        }
    }

    /// Returns the display label for this session type
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionType::Work => "Study",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    /// True for the work kind; break completions are never persisted
    pub fn is_work(&self) -> bool {
        matches!(self, SessionType::Work)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(SessionType::Work),
            "short_break" => Ok(SessionType::ShortBreak),
            "long_break" => Ok(SessionType::LongBreak),
            _ => Err(format!("unknown session type: {}", s)),
        }
    }
}

// ============================================
// Session records
// ============================================

/// A completed countdown persisted to storage.
///
/// Created only when a countdown reaches zero naturally; manual reset or
/// type switches never produce a record. `completed_at` is assigned by the
/// storage layer at insert time, not by the timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Unique identifier, assigned at creation
    pub id: String,
    /// Owner, immutable
    pub user_id: String,
    /// Tagged subject; None for untagged work (breaks never carry one)
    pub subject_id: Option<String>,
    /// Configured length of the session actually run, in minutes
    pub duration_minutes: i64,
    /// Kind of countdown that completed
    pub session_type: SessionType,
    /// When the countdown reached zero (server-assigned on write)
    pub completed_at: DateTime<Utc>,
}

// ============================================
// Subjects
// ============================================

/// A study topic owned by a user.
///
/// Work sessions can be tagged with a subject; the statistics aggregator
/// groups study time by subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Unique identifier
    pub id: String,
    /// Owner
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Display color (hex string, e.g. "#4F46E5")
    pub color: String,
    /// Optional course level (e.g. "HL", "SL")
    pub level: Option<String>,
    /// When this subject was created
    pub created_at: DateTime<Utc>,
}

// ============================================
// Timer settings
// ============================================

/// Per-user timer configuration.
///
/// Read-only input to the timer engine; mutated only through the settings
/// workflow ([`crate::api::update_settings`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Work countdown length in minutes
    pub study_duration: i64,
    /// Short break countdown length in minutes
    pub short_break: i64,
    /// Long break countdown length in minutes
    pub long_break: i64,
    /// Chain a short break automatically after a work completion
    pub auto_start_breaks: bool,
    /// Chain a work session automatically after a break completion
    pub auto_start_pomodoros: bool,
    /// Whether completion notifications are enabled
    pub notifications_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            study_duration: 25,
            short_break: 5,
            long_break: 15,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            notifications_enabled: true,
        }
    }
}

impl TimerSettings {
    /// Configured duration in minutes for a session type
    pub fn duration_minutes(&self, session_type: SessionType) -> i64 {
        match session_type {
            SessionType::Work => self.study_duration,
            SessionType::ShortBreak => self.short_break,
            SessionType::LongBreak => self.long_break,
        }
    }

    /// Configured duration in seconds for a session type
    pub fn duration_secs(&self, session_type: SessionType) -> i64 {
        self.duration_minutes(session_type) * 60
    }

    /// Reject non-positive durations before they reach storage
    pub fn validate(&self) -> crate::error::Result<()> {
        for (field, value) in [
            ("study_duration", self.study_duration),
            ("short_break", self.short_break),
            ("long_break", self.long_break),
        ] {
            if value <= 0 {
                return Err(crate::error::Error::Validation(format!(
                    "{} must be a positive number of minutes, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

/// Partial update to [`TimerSettings`]; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub study_duration: Option<i64>,
    pub short_break: Option<i64>,
    pub long_break: Option<i64>,
    pub auto_start_breaks: Option<bool>,
    pub auto_start_pomodoros: Option<bool>,
    pub notifications_enabled: Option<bool>,
}

impl SettingsPatch {
    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.study_duration.is_none()
            && self.short_break.is_none()
            && self.long_break.is_none()
            && self.auto_start_breaks.is_none()
            && self.auto_start_pomodoros.is_none()
            && self.notifications_enabled.is_none()
    }

    /// Apply this patch on top of existing settings
    pub fn apply_to(&self, settings: &TimerSettings) -> TimerSettings {
        TimerSettings {
            study_duration: self.study_duration.unwrap_or(settings.study_duration),
            short_break: self.short_break.unwrap_or(settings.short_break),
            long_break: self.long_break.unwrap_or(settings.long_break),
            auto_start_breaks: self.auto_start_breaks.unwrap_or(settings.auto_start_breaks),
            auto_start_pomodoros: self
                .auto_start_pomodoros
                .unwrap_or(settings.auto_start_pomodoros),
            notifications_enabled: self
                .notifications_enabled
                .unwrap_or(settings.notifications_enabled),
        }
    }
}

// ============================================
// Time ranges
// ============================================

/// Lookback window for statistics queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Trailing 7 days, bucketed by calendar day
    #[default]
    Week,
    /// Trailing 30 days, bucketed by ISO week
    Month,
    /// Trailing 365 days, bucketed by ISO week
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    /// Number of days this range looks back from the query time
    pub fn lookback_days(&self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 365,
        }
    }

    /// Window start for a query issued at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.lookback_days())
    }

    /// Cycle to the next range (for UI toggling)
    pub fn next(&self) -> Self {
        match self {
            TimeRange::Week => TimeRange::Month,
            TimeRange::Month => TimeRange::Year,
            TimeRange::Year => TimeRange::Week,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            _ => Err(format!("unknown time range: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_type_round_trip() {
        for st in [
            SessionType::Work,
            SessionType::ShortBreak,
            SessionType::LongBreak,
        ] {
            let parsed: SessionType = st.as_str().parse().unwrap();
            assert_eq!(parsed, st);
        }
        assert!("coffee".parse::<SessionType>().is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = TimerSettings::default();
        assert_eq!(settings.study_duration, 25);
        assert_eq!(settings.short_break, 5);
        assert_eq!(settings.long_break, 15);
        assert!(!settings.auto_start_breaks);
        assert!(!settings.auto_start_pomodoros);
        assert!(settings.notifications_enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation_rejects_non_positive() {
        let settings = TimerSettings {
            short_break: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_patch_apply() {
        let base = TimerSettings::default();
        let patch = SettingsPatch {
            study_duration: Some(50),
            auto_start_breaks: Some(true),
            ..Default::default()
        };
        let updated = patch.apply_to(&base);
        assert_eq!(updated.study_duration, 50);
        assert!(updated.auto_start_breaks);
        // Untouched fields keep their values
        assert_eq!(updated.short_break, 5);
        assert!(updated.notifications_enabled);
    }

    #[test]
    fn test_settings_patch_rejects_unknown_fields() {
        let result: Result<SettingsPatch, _> =
            serde_json::from_str(r#"{"studyDuration": 30, "theme": "dark"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_time_range_lookback() {
        assert_eq!(TimeRange::Week.lookback_days(), 7);
        assert_eq!(TimeRange::Month.lookback_days(), 30);
        assert_eq!(TimeRange::Year.lookback_days(), 365);

        let now = Utc::now();
        assert_eq!(now - TimeRange::Week.cutoff(now), Duration::days(7));
    }

    #[test]
    fn test_duration_lookup() {
        let settings = TimerSettings::default();
        assert_eq!(settings.duration_minutes(SessionType::Work), 25);
        assert_eq!(settings.duration_secs(SessionType::ShortBreak), 300);
    }
}
