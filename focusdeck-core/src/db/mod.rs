//! Database layer for focusdeck
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - Append-only session record storage

pub mod repo;
pub mod schema;

pub use repo::{Database, SessionWithSubject};
