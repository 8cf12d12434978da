//! # focusdeck-core
//!
//! Core library for focusdeck - a Pomodoro study timer and statistics engine.
//!
//! This library provides:
//! - Domain types for session records, subjects, and timer settings
//! - Database storage layer with SQLite
//! - The countdown timer state machine
//! - Statistics aggregation over persisted sessions
//! - A validated JSON API surface for UI layers
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! The timer engine runs client-side and hands completed work sessions to
//! storage (best-effort, fire-and-forget). The statistics aggregator later
//! reads the accumulated records and produces read-only summaries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use focusdeck_core::{Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use timer::{Completion, CompletionSink, StartOutcome, TimerEngine};
pub use types::*;

// Public modules
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod stats;
pub mod timer;
pub mod types;
