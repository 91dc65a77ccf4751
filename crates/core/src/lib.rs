//! Core types and shared functionality for pawcache.
//!
//! This crate provides:
//! - Cache storage with SQLite backend (generations, responses, local storage)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedResponse, PendingSubmission, SubmissionId};
pub use config::AppConfig;
pub use error::Error;
