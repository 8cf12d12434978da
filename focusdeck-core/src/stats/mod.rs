//! Statistics aggregation over persisted session records
//!
//! [`compute_stats`] is a pure read: one query for the user's work sessions
//! in the window, one for their subjects, then in-process aggregation. It
//! holds no locks beyond the storage read and is safe to call concurrently
//! with a running timer; a just-completed session may or may not be visible
//! to an overlapping read.
//!
//! Bucketing policy:
//! - `week` groups by calendar day (weekday label, e.g. "Mon")
//! - `month` and `year` group by ISO week (label e.g. "2026-W35")
//!
//! The subject breakdown honors the requested time range, and only work
//! sessions count; break completions are never part of statistics.

use crate::db::Database;
use crate::error::Result;
use crate::types::{SessionRecord, SessionType, TimeRange};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

/// One time bucket of the breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodStats {
    /// Bucket label: weekday abbreviation for day buckets, "YYYY-Www" for
    /// ISO week buckets
    pub period: String,
    /// Work sessions completed in this bucket
    pub sessions: i64,
    /// Study minutes accumulated in this bucket
    pub minutes: i64,
}

/// Aggregated study time for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectStats {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Work sessions tagged with this subject in the window
    pub sessions: i64,
    /// Study minutes tagged with this subject in the window
    pub minutes: i64,
}

/// Read-only summary for a user and time range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Count of work sessions in the window
    pub total_sessions: i64,
    /// Sum of work minutes in the window
    pub total_minutes: i64,
    /// Time buckets, ordered by earliest completion ascending
    pub time_breakdown: Vec<PeriodStats>,
    /// One entry per owned subject, minutes descending, idle subjects last
    pub subject_breakdown: Vec<SubjectStats>,
}

/// Bucket key for grouping completions; ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BucketKey {
    /// (year, ordinal day)
    Day(i32, u32),
    /// (ISO year, ISO week)
    IsoWeek(i32, u32),
}

impl BucketKey {
    fn for_range(range: TimeRange, ts: DateTime<Utc>) -> Self {
        match range {
            TimeRange::Week => BucketKey::Day(ts.year(), ts.ordinal()),
            TimeRange::Month | TimeRange::Year => {
                let iso = ts.iso_week();
                BucketKey::IsoWeek(iso.year(), iso.week())
            }
        }
    }

    fn label(&self, ts: DateTime<Utc>) -> String {
        match self {
            BucketKey::Day(..) => ts.format("%a").to_string(),
            BucketKey::IsoWeek(year, week) => format!("{}-W{:02}", year, week),
        }
    }
}

/// Compute the stats summary for a user over a lookback window ending now.
pub fn compute_stats(db: &Database, user_id: &str, range: TimeRange) -> Result<StatsSummary> {
    compute_stats_at(db, user_id, range, Utc::now())
}

/// Compute the stats summary with an explicit query time (for tests).
pub fn compute_stats_at(
    db: &Database,
    user_id: &str,
    range: TimeRange,
    now: DateTime<Utc>,
) -> Result<StatsSummary> {
    let since = range.cutoff(now);

    let mut sessions = db.sessions_since(user_id, since, Some(SessionType::Work))?;
    // Bucketing walks completions oldest-first
    sessions.sort_by_key(|s| s.completed_at);

    let subjects = db.list_subjects(user_id)?;

    let total_sessions = sessions.len() as i64;
    let total_minutes = sessions.iter().map(|s| s.duration_minutes).sum();

    let time_breakdown = bucket_by_period(&sessions, range);
    let subject_breakdown = bucket_by_subject(&sessions, subjects);

    tracing::debug!(
        user_id,
        range = %range,
        total_sessions,
        total_minutes,
        "stats computed"
    );

    Ok(StatsSummary {
        total_sessions,
        total_minutes,
        time_breakdown,
        subject_breakdown,
    })
}

/// Group completions into day or ISO-week buckets, ordered by the earliest
/// completion in each bucket.
fn bucket_by_period(sessions: &[SessionRecord], range: TimeRange) -> Vec<PeriodStats> {
    let mut buckets: Vec<(BucketKey, PeriodStats)> = Vec::new();

    for session in sessions {
        let key = BucketKey::for_range(range, session.completed_at);
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, stats)) => {
                stats.sessions += 1;
                stats.minutes += session.duration_minutes;
            }
            None => buckets.push((
                key,
                PeriodStats {
                    period: key.label(session.completed_at),
                    sessions: 1,
                    minutes: session.duration_minutes,
                },
            )),
        }
    }

    // Input is sorted ascending, so first-seen order is earliest-completion order
    buckets.into_iter().map(|(_, stats)| stats).collect()
}

/// Aggregate per owned subject, zero-filled for subjects with no sessions,
/// ordered minutes descending with idle subjects last.
fn bucket_by_subject(
    sessions: &[SessionRecord],
    subjects: Vec<crate::types::Subject>,
) -> Vec<SubjectStats> {
    let mut breakdown: Vec<SubjectStats> = subjects
        .into_iter()
        .map(|subject| SubjectStats {
            id: subject.id,
            name: subject.name,
            color: subject.color,
            sessions: 0,
            minutes: 0,
        })
        .collect();

    for session in sessions {
        let Some(subject_id) = &session.subject_id else {
            continue;
        };
        if let Some(stats) = breakdown.iter_mut().find(|s| &s.id == subject_id) {
            stats.sessions += 1;
            stats.minutes += session.duration_minutes;
        }
    }

    // Stable sort keeps creation order among equals (idle subjects stay last
    // in their original order)
    breakdown.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    breakdown
}
