//! Cache-related MCP tools.
//!
//! This module provides read access to the worker's cache generations.

pub mod get;

pub use get::{CacheGetParams, get_impl};
