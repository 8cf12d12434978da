//! Database repository layer
//!
//! Provides query and insert operations for all entity types.

use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;

/// A session record joined with its subject's display fields.
///
/// Used by the session-list API so callers can render subject names without
/// a second query.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithSubject {
    #[serde(flatten)]
    pub record: SessionRecord,
    /// Subject name (None for untagged or break sessions)
    pub subject_name: Option<String>,
    /// Subject color (None for untagged or break sessions)
    pub subject_color: Option<String>,
}

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Subject operations
    // ============================================

    /// Create a subject for a user
    pub fn insert_subject(
        &self,
        user_id: &str,
        name: &str,
        color: &str,
        level: Option<&str>,
    ) -> Result<Subject> {
        if name.trim().is_empty() {
            return Err(Error::Validation("subject name must not be empty".into()));
        }

        let subject = Subject {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            level: level.map(|s| s.to_string()),
            created_at: Utc::now(),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO subjects (id, user_id, name, color, level, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                subject.id,
                subject.user_id,
                subject.name,
                subject.color,
                subject.level,
                subject.created_at.to_rfc3339(),
            ],
        )?;

        Ok(subject)
    }

    /// Get a subject by ID
    pub fn get_subject(&self, id: &str) -> Result<Option<Subject>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM subjects WHERE id = ?", [id], |row| {
            Self::row_to_subject(row)
        })
        .optional()
        .map_err(Error::from)
    }

    /// List all subjects owned by a user, oldest first
    pub fn list_subjects(&self, user_id: &str) -> Result<Vec<Subject>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM subjects WHERE user_id = ? ORDER BY created_at ASC")?;

        let subjects = stmt
            .query_map([user_id], Self::row_to_subject)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subjects)
    }

    fn row_to_subject(row: &Row) -> rusqlite::Result<Subject> {
        let created_at_str: String = row.get("created_at")?;

        Ok(Subject {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            level: row.get("level")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    // ============================================
    // Settings operations
    // ============================================

    /// Get a user's timer settings, creating the default row on first access
    pub fn get_or_create_settings(&self, user_id: &str) -> Result<TimerSettings> {
        self.get_or_seed_settings(user_id, &TimerSettings::default())
    }

    /// Get a user's timer settings, seeding from `seed` on first access.
    ///
    /// Used by shells that carry timer defaults in their config file; once a
    /// row exists the stored settings win.
    pub fn get_or_seed_settings(&self, user_id: &str, seed: &TimerSettings) -> Result<TimerSettings> {
        if let Some(settings) = self.get_settings(user_id)? {
            return Ok(settings);
        }

        seed.validate()?;
        self.write_settings(user_id, seed)?;
        Ok(seed.clone())
    }

    /// Get a user's timer settings if a row exists
    pub fn get_settings(&self, user_id: &str) -> Result<Option<TimerSettings>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM user_settings WHERE user_id = ?",
            [user_id],
            Self::row_to_settings,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Apply a partial update, upserting defaults when no row exists yet
    pub fn update_settings(&self, user_id: &str, patch: &SettingsPatch) -> Result<TimerSettings> {
        if patch.is_empty() {
            return Err(Error::Validation("no fields to update".into()));
        }

        let current = self
            .get_settings(user_id)?
            .unwrap_or_else(TimerSettings::default);
        let updated = patch.apply_to(&current);
        updated.validate()?;

        self.write_settings(user_id, &updated)?;
        Ok(updated)
    }

    fn write_settings(&self, user_id: &str, settings: &TimerSettings) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO user_settings (user_id, study_duration, short_break, long_break,
                                       auto_start_breaks, auto_start_pomodoros,
                                       notifications_enabled, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                study_duration = excluded.study_duration,
                short_break = excluded.short_break,
                long_break = excluded.long_break,
                auto_start_breaks = excluded.auto_start_breaks,
                auto_start_pomodoros = excluded.auto_start_pomodoros,
                notifications_enabled = excluded.notifications_enabled,
                updated_at = excluded.updated_at
            "#,
            params![
                user_id,
                settings.study_duration,
                settings.short_break,
                settings.long_break,
                settings.auto_start_breaks,
                settings.auto_start_pomodoros,
                settings.notifications_enabled,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn row_to_settings(row: &Row) -> rusqlite::Result<TimerSettings> {
        Ok(TimerSettings {
            study_duration: row.get("study_duration")?,
            short_break: row.get("short_break")?,
            long_break: row.get("long_break")?,
            auto_start_breaks: row.get("auto_start_breaks")?,
            auto_start_pomodoros: row.get("auto_start_pomodoros")?,
            notifications_enabled: row.get("notifications_enabled")?,
        })
    }

    // ============================================
    // Session record operations
    // ============================================

    /// Persist a completed session.
    ///
    /// Validates before insert and assigns `id` and `completed_at` here, so a
    /// client-reported completion cannot backdate itself. Records are
    /// append-only; there is no update or delete path.
    pub fn insert_session(
        &self,
        user_id: &str,
        subject_id: Option<&str>,
        duration_minutes: i64,
        session_type: SessionType,
    ) -> Result<SessionRecord> {
        if duration_minutes <= 0 {
            return Err(Error::Validation(format!(
                "duration_minutes must be positive, got {}",
                duration_minutes
            )));
        }

        // A tagged session must reference a subject owned by the same user
        if let Some(sid) = subject_id {
            match self.get_subject(sid)? {
                Some(subject) if subject.user_id == user_id => {}
                Some(_) => {
                    return Err(Error::Validation(format!(
                        "subject {} is not owned by user {}",
                        sid, user_id
                    )))
                }
                None => return Err(Error::SubjectNotFound(sid.to_string())),
            }
        }

        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            subject_id: subject_id.map(|s| s.to_string()),
            duration_minutes,
            session_type,
            completed_at: Utc::now(),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO pomodoro_sessions (id, user_id, subject_id, duration_minutes,
                                           session_type, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.user_id,
                record.subject_id,
                record.duration_minutes,
                record.session_type.as_str(),
                record.completed_at.to_rfc3339(),
            ],
        )?;

        Ok(record)
    }

    /// List a user's session records completed at or after `since`.
    ///
    /// Optionally filtered by session type; newest first.
    pub fn sessions_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        session_type: Option<SessionType>,
    ) -> Result<Vec<SessionRecord>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from(
            "SELECT * FROM pomodoro_sessions WHERE user_id = ? AND completed_at >= ?",
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(user_id.to_string()), Box::new(since.to_rfc3339())];

        if let Some(st) = session_type {
            sql.push_str(" AND session_type = ?");
            params.push(Box::new(st.as_str().to_string()));
        }

        sql.push_str(" ORDER BY completed_at DESC");

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let sessions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_session)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// List session records with subject name/color joined in, newest first.
    pub fn sessions_with_subjects(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SessionWithSubject>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT
                ps.id, ps.user_id, ps.subject_id, ps.duration_minutes,
                ps.session_type, ps.completed_at,
                s.name as subject_name,
                s.color as subject_color
            FROM pomodoro_sessions ps
            LEFT JOIN subjects s ON ps.subject_id = s.id
            WHERE ps.user_id = ?1 AND ps.completed_at >= ?2
            ORDER BY ps.completed_at DESC
            "#,
        )?;

        let sessions = stmt
            .query_map(params![user_id, since.to_rfc3339()], |row| {
                Ok(SessionWithSubject {
                    record: Self::row_to_session(row)?,
                    subject_name: row.get("subject_name")?,
                    subject_color: row.get("subject_color")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    fn row_to_session(row: &Row) -> rusqlite::Result<SessionRecord> {
        let session_type_str: String = row.get("session_type")?;
        let completed_at_str: String = row.get("completed_at")?;

        Ok(SessionRecord {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            subject_id: row.get("subject_id")?,
            duration_minutes: row.get("duration_minutes")?,
            session_type: session_type_str.parse().unwrap_or(SessionType::Work),
            completed_at: DateTime::parse_from_rfc3339(&completed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
