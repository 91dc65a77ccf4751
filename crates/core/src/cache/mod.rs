//! SQLite-backed storage for the offline worker.
//!
//! This module provides persistent cache storage using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - Named cache generations with an install marker
//! - Request-keyed response snapshots (SHA-256 of method and URL)
//! - A flat key/value store holding pending contact submissions
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod local_storage;
pub mod migrations;
pub mod pending;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedResponse;
pub use pending::{PENDING_FORMS_KEY, PendingSubmission, SubmissionId};
