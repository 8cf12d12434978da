//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- Subjects a user can tag work sessions with
    CREATE TABLE IF NOT EXISTS subjects (
        id           TEXT PRIMARY KEY,
        user_id      TEXT NOT NULL,
        name         TEXT NOT NULL,
        color        TEXT NOT NULL,
        level        TEXT,
        created_at   DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_subjects_user ON subjects(user_id);

    -- Per-user timer settings (one row per user)
    CREATE TABLE IF NOT EXISTS user_settings (
        user_id               TEXT PRIMARY KEY,
        study_duration        INTEGER NOT NULL DEFAULT 25,
        short_break           INTEGER NOT NULL DEFAULT 5,
        long_break            INTEGER NOT NULL DEFAULT 15,
        auto_start_breaks     INTEGER NOT NULL DEFAULT 0,
        auto_start_pomodoros  INTEGER NOT NULL DEFAULT 0,
        notifications_enabled INTEGER NOT NULL DEFAULT 1,
        updated_at            DATETIME NOT NULL
    );

    -- Completed countdowns; append-only
    CREATE TABLE IF NOT EXISTS pomodoro_sessions (
        id               TEXT PRIMARY KEY,
        user_id          TEXT NOT NULL,
        subject_id       TEXT REFERENCES subjects(id),
        duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
        session_type     TEXT NOT NULL,      -- 'work', 'short_break', 'long_break'
        completed_at     DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_user ON pomodoro_sessions(user_id);
    CREATE INDEX IF NOT EXISTS idx_sessions_completed ON pomodoro_sessions(completed_at);
    CREATE INDEX IF NOT EXISTS idx_sessions_subject ON pomodoro_sessions(subject_id);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run migrations twice - should be idempotent
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        // Check version
        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let tables = ["subjects", "user_settings", "pomodoro_sessions"];

        for table in tables {
            let exists: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_duration_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO pomodoro_sessions (id, user_id, duration_minutes, session_type, completed_at)
             VALUES ('s1', 'u1', 0, 'work', '2026-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err(), "zero duration should violate CHECK");
    }
}
