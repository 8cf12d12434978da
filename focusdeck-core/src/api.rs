//! JSON query surface consumed by the UI layer
//!
//! Each endpoint has a validated request schema: unknown fields and missing
//! required fields are rejected at the boundary, before any storage call.
//! Responses mirror the shapes the UI expects (`camelCase`, wrapped in an
//! object keyed by entity, stats returned bare).

use crate::db::{Database, SessionWithSubject};
use crate::error::{Error, Result};
use crate::stats::{self, StatsSummary};
use crate::types::{SessionRecord, SessionType, SettingsPatch, Subject, TimeRange, TimerSettings};
use serde::Deserialize;

/// Body of `POST session`: a completion reported by a timer client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSessionRequest {
    /// Subject tag; absent or null for untagged work
    #[serde(default)]
    pub subject_id: Option<String>,
    /// Configured length of the completed countdown
    pub duration_minutes: i64,
    /// Kind of countdown that completed
    pub session_type: SessionType,
}

/// Body of `POST subject`: a new study topic.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSubjectRequest {
    pub name: String,
    /// Display color as a hex string
    pub color: String,
    /// Optional course level (e.g. "HL", "SL")
    #[serde(default)]
    pub level: Option<String>,
}

/// Query of `GET stats` and `GET sessions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RangeQuery {
    /// Lookback window; defaults to `week` when omitted
    #[serde(default)]
    pub time_range: TimeRange,
}

/// Tagged union of every request the API accepts.
///
/// Externally tagged JSON, e.g. `{"create_session": {...}}`; each variant
/// body enforces its own schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiRequest {
    CreateSession(CreateSessionRequest),
    GetStats(RangeQuery),
    ListSessions(RangeQuery),
    GetSettings,
    UpdateSettings(SettingsPatch),
    CreateSubject(CreateSubjectRequest),
    ListSubjects,
}

/// Parse a raw JSON request body, surfacing schema violations as validation
/// errors.
pub fn parse_request(body: &str) -> Result<ApiRequest> {
    serde_json::from_str(body).map_err(|e| Error::Validation(format!("invalid request: {}", e)))
}

/// Dispatch a parsed request against storage, producing the response JSON.
pub fn handle(db: &Database, user_id: &str, request: ApiRequest) -> Result<serde_json::Value> {
    match request {
        ApiRequest::CreateSession(req) => {
            let record = create_session(db, user_id, &req)?;
            Ok(serde_json::json!({ "session": record }))
        }
        ApiRequest::GetStats(query) => {
            let summary = get_stats(db, user_id, &query)?;
            Ok(serde_json::to_value(summary)?)
        }
        ApiRequest::ListSessions(query) => {
            let sessions = list_sessions(db, user_id, &query)?;
            Ok(serde_json::json!({ "sessions": sessions }))
        }
        ApiRequest::GetSettings => {
            let settings = get_settings(db, user_id)?;
            Ok(serde_json::json!({ "settings": settings }))
        }
        ApiRequest::UpdateSettings(patch) => {
            let settings = update_settings(db, user_id, &patch)?;
            Ok(serde_json::json!({ "settings": settings }))
        }
        ApiRequest::CreateSubject(req) => {
            let subject = create_subject(db, user_id, &req)?;
            Ok(serde_json::json!({ "subject": subject }))
        }
        ApiRequest::ListSubjects => {
            let subjects = list_subjects(db, user_id)?;
            Ok(serde_json::json!({ "subjects": subjects }))
        }
    }
}

/// `POST session` - persist a completed countdown.
///
/// Validation failures reject the write; the reporting timer's local state
/// has already advanced and is unaffected either way.
pub fn create_session(
    db: &Database,
    user_id: &str,
    req: &CreateSessionRequest,
) -> Result<SessionRecord> {
    db.insert_session(
        user_id,
        req.subject_id.as_deref(),
        req.duration_minutes,
        req.session_type,
    )
}

/// `GET stats` - the aggregated summary for a time range.
pub fn get_stats(db: &Database, user_id: &str, query: &RangeQuery) -> Result<StatsSummary> {
    stats::compute_stats(db, user_id, query.time_range)
}

/// `GET sessions` - records in the window, newest first, with subject
/// display fields joined in.
pub fn list_sessions(
    db: &Database,
    user_id: &str,
    query: &RangeQuery,
) -> Result<Vec<SessionWithSubject>> {
    let since = query.time_range.cutoff(chrono::Utc::now());
    db.sessions_with_subjects(user_id, since)
}

/// `GET settings` - the user's timer settings, created with defaults on
/// first access.
pub fn get_settings(db: &Database, user_id: &str) -> Result<TimerSettings> {
    db.get_or_create_settings(user_id)
}

/// `PUT settings` - partial update, upserting defaults when no row exists.
pub fn update_settings(db: &Database, user_id: &str, patch: &SettingsPatch) -> Result<TimerSettings> {
    db.update_settings(user_id, patch)
}

/// `POST subject` - create a study topic for the user.
pub fn create_subject(db: &Database, user_id: &str, req: &CreateSubjectRequest) -> Result<Subject> {
    db.insert_subject(user_id, &req.name, &req.color, req.level.as_deref())
}

/// `GET subjects` - the user's subjects, oldest first.
pub fn list_subjects(db: &Database, user_id: &str) -> Result<Vec<Subject>> {
    db.list_subjects(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_parse_create_session() {
        let req = parse_request(
            r#"{"create_session": {"subjectId": null, "durationMinutes": 25, "sessionType": "work"}}"#,
        )
        .unwrap();
        match req {
            ApiRequest::CreateSession(body) => {
                assert_eq!(body.duration_minutes, 25);
                assert_eq!(body.session_type, SessionType::Work);
                assert!(body.subject_id.is_none());
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let result = parse_request(
            r#"{"create_session": {"durationMinutes": 25, "sessionType": "work", "theme": "dark"}}"#,
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        // sessionType missing
        let result = parse_request(r#"{"create_session": {"durationMinutes": 25}}"#);
        assert!(matches!(result, Err(Error::Validation(_))));

        // durationMinutes missing
        let result = parse_request(r#"{"create_session": {"sessionType": "work"}}"#);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_rejects_unknown_session_type() {
        let result = parse_request(
            r#"{"create_session": {"durationMinutes": 25, "sessionType": "nap"}}"#,
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_stats_time_range_defaults_to_week() {
        let req = parse_request(r#"{"get_stats": {}}"#).unwrap();
        match req {
            ApiRequest::GetStats(query) => assert_eq!(query.time_range, TimeRange::Week),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_handle_create_session_and_stats() {
        let db = test_db();
        let subject = db.insert_subject("u1", "Math", "#111111", None).unwrap();

        let request = parse_request(&format!(
            r#"{{"create_session": {{"subjectId": "{}", "durationMinutes": 25, "sessionType": "work"}}}}"#,
            subject.id
        ))
        .unwrap();
        let response = handle(&db, "u1", request).unwrap();
        assert_eq!(response["session"]["durationMinutes"], 25);
        assert_eq!(response["session"]["sessionType"], "work");
        assert!(response["session"]["id"].is_string());
        assert!(response["session"]["completedAt"].is_string());

        let response = handle(&db, "u1", parse_request(r#"{"get_stats": {}}"#).unwrap()).unwrap();
        assert_eq!(response["totalSessions"], 1);
        assert_eq!(response["totalMinutes"], 25);
        assert_eq!(response["subjectBreakdown"][0]["name"], "Math");
    }

    #[test]
    fn test_handle_invalid_duration_does_not_insert() {
        let db = test_db();
        let request = parse_request(
            r#"{"create_session": {"durationMinutes": 0, "sessionType": "work"}}"#,
        )
        .unwrap();
        assert!(handle(&db, "u1", request).is_err());

        let response = handle(&db, "u1", parse_request(r#"{"get_stats": {}}"#).unwrap()).unwrap();
        assert_eq!(response["totalSessions"], 0);
    }

    #[test]
    fn test_handle_settings_round_trip() {
        let db = test_db();

        let response = handle(&db, "u1", ApiRequest::GetSettings).unwrap();
        assert_eq!(response["settings"]["study_duration"], 25);

        let request =
            parse_request(r#"{"update_settings": {"studyDuration": 50, "autoStartBreaks": true}}"#)
                .unwrap();
        let response = handle(&db, "u1", request).unwrap();
        assert_eq!(response["settings"]["study_duration"], 50);
        assert_eq!(response["settings"]["auto_start_breaks"], true);
    }

    #[test]
    fn test_handle_subject_create_and_list() {
        let db = test_db();

        let request = parse_request(
            r##"{"create_subject": {"name": "Chemistry", "color": "#F59E0B", "level": "HL"}}"##,
        )
        .unwrap();
        let response = handle(&db, "u1", request).unwrap();
        assert_eq!(response["subject"]["name"], "Chemistry");
        assert_eq!(response["subject"]["level"], "HL");

        let response = handle(&db, "u1", parse_request(r#""list_subjects""#).unwrap()).unwrap();
        assert_eq!(response["subjects"].as_array().unwrap().len(), 1);
        assert_eq!(response["subjects"][0]["color"], "#F59E0B");
    }

    #[test]
    fn test_create_subject_rejects_empty_name() {
        let db = test_db();
        let request =
            parse_request(r##"{"create_subject": {"name": "  ", "color": "#000000"}}"##).unwrap();
        assert!(handle(&db, "u1", request).is_err());
    }

    #[test]
    fn test_list_sessions_newest_first() {
        let db = test_db();
        for _ in 0..3 {
            handle(
                &db,
                "u1",
                parse_request(
                    r#"{"create_session": {"durationMinutes": 25, "sessionType": "work"}}"#,
                )
                .unwrap(),
            )
            .unwrap();
        }

        let response =
            handle(&db, "u1", parse_request(r#"{"list_sessions": {}}"#).unwrap()).unwrap();
        let sessions = response["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 3);
    }
}
