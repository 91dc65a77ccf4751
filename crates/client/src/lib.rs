//! Worker engine for pawcache.
//!
//! This crate provides the network seam, the request router, the caching
//! strategies, lifecycle and background sync, plus the contact link builder
//! shared by the server.

pub mod contact;
pub mod fetch;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use contact::ContactForm;
pub use fetch::{Destination, FetchClient, FetchConfig, FetchRequest, FetchResponse, Network, RequestMode};
pub use worker::{
    FetchOutcome, LogNotifier, Notification, Notifier, ResponseSource, Router, ServiceWorker, Strategy, SyncReport,
    WorkerConfig, WorkerMessage, WorkerResponse, WorkerState, WorkerStatus,
};
