//! Offline caching worker.
//!
//! ### Lifecycle
//! - [`ServiceWorker::install`] precaches the manifest into a fresh generation;
//!   any failed fetch leaves the worker redundant and stores nothing.
//! - [`ServiceWorker::activate`] drops every other generation and starts
//!   intercepting fetches.
//!
//! ### Fetch handling
//! - [`Router`] picks a [`Strategy`] per request; ignored requests come back
//!   as [`FetchOutcome::Ignored`] for the host to handle.
//! - Cache writes triggered by a fetch run in the background on the worker's
//!   task tracker and never delay the response. [`ServiceWorker::settle`]
//!   waits for them.
//!
//! ### Background sync
//! - [`ServiceWorker::handle_sync`] flushes queued contact submissions.

mod fetch;
mod lifecycle;
mod message;
mod notify;
mod router;
mod state;
mod strategies;
mod sync;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use pawcache_core::{AppConfig, CacheDb, CachedResponse, Error};
use reqwest::Method;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio_util::task::TaskTracker;
use url::Url;

use crate::fetch::{FetchResponse, Network, resolve};

pub use message::WorkerMessage;
pub use notify::{LogNotifier, Notification, Notifier};
pub use router::{Router, Strategy};
pub use state::WorkerState;
pub use sync::SyncReport;

/// Immutable settings resolved from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub origin: Url,
    pub cache_name: String,
    /// Precache manifest, resolved and in order.
    pub precache: Vec<Url>,
    pub offline_page: Url,
    pub offline_image: Url,
    pub sync_tag: String,
    pub contact_endpoint: Url,
    pub notification: Notification,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let resolve_one = |input: &str| resolve(&origin, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")));

        let precache = config
            .precache_urls
            .iter()
            .map(|u| resolve_one(u))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            precache,
            offline_page: resolve_one(&config.offline_page)?,
            offline_image: resolve_one(&config.offline_image)?,
            contact_endpoint: resolve_one(&config.contact_endpoint)?,
            cache_name: config.cache_name.clone(),
            sync_tag: config.sync_tag.clone(),
            notification: Notification {
                title: config.notification_title.clone(),
                body: config.notification_body.clone(),
                icon: config.notification_icon.clone(),
            },
            origin,
        })
    }
}

/// Where a response handed back to the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    /// A designated offline asset stood in for the request.
    OfflineFallback,
}

/// Response returned to the page for an intercepted request.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub source: ResponseSource,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl WorkerResponse {
    fn from_network(response: FetchResponse) -> Self {
        Self {
            source: ResponseSource::Network,
            headers: response.header_pairs(),
            url: response.url.to_string(),
            status: response.status.as_u16(),
            status_text: response.status.canonical_reason().unwrap_or_default().to_string(),
            body: response.bytes,
        }
    }

    fn from_cache(cached: CachedResponse, source: ResponseSource) -> Self {
        Self {
            source,
            url: cached.url,
            status: cached.status,
            status_text: cached.status_text,
            headers: cached.headers,
            body: Bytes::from(cached.body),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Result of offering a request to the worker.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The worker is not activated, so nothing was routed.
    Inactive,
    /// Routed to [`Strategy::Ignore`]; the host handles the request itself.
    Ignored,
    Responded(WorkerResponse),
}

/// Snapshot of worker state for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub cache_name: String,
    pub skip_waiting: bool,
    pub clients_claimed: bool,
    pub generations: Vec<String>,
    pub entries: u64,
    pub pending_submissions: usize,
}

/// Writes network responses into the current generation off the response path.
#[derive(Clone)]
struct CacheWriter {
    db: CacheDb,
    cache_name: Arc<str>,
    tasks: TaskTracker,
}

impl CacheWriter {
    fn store_in_background(&self, method: &Method, response: &FetchResponse) {
        let db = self.db.clone();
        let cache_name = self.cache_name.clone();
        let entry = response.to_cached(method);
        self.tasks.spawn(async move {
            if let Err(e) = db.put_response(&cache_name, &entry).await {
                tracing::warn!(url = %entry.url, error = %e, "background cache write failed");
            }
        });
    }
}

/// The offline caching worker for one cache generation.
pub struct ServiceWorker {
    config: WorkerConfig,
    router: Router,
    db: CacheDb,
    network: Arc<dyn Network>,
    notifier: Arc<dyn Notifier>,
    writer: CacheWriter,
    tasks: TaskTracker,
    /// Held across close/wait/reopen so overlapping settles don't reopen under each other.
    settling: Mutex<()>,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
    clients_claimed: AtomicBool,
}

impl ServiceWorker {
    pub fn new(config: WorkerConfig, router: Router, db: CacheDb, network: Arc<dyn Network>) -> Self {
        let tasks = TaskTracker::new();
        let writer = CacheWriter { db: db.clone(), cache_name: Arc::from(config.cache_name.as_str()), tasks: tasks.clone() };
        Self {
            config,
            router,
            db,
            network,
            notifier: Arc::new(LogNotifier),
            writer,
            tasks,
            settling: Mutex::new(()),
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
        }
    }

    /// Build a worker from application config.
    pub fn from_app_config(config: &AppConfig, db: CacheDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        Ok(Self::new(WorkerConfig::from_app_config(config)?, Router::from_app_config(config), db, network))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// Wait until every background revalidation and cache write has finished.
    pub async fn settle(&self) {
        let _settling = self.settling.lock().await;
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    pub async fn status(&self) -> Result<WorkerStatus, Error> {
        let cache_name = self.config.cache_name.clone();
        Ok(WorkerStatus {
            state: self.state().await,
            skip_waiting: self.skip_waiting_requested(),
            clients_claimed: self.clients_claimed(),
            generations: self.db.generation_names().await?,
            entries: self.db.entry_count(&cache_name).await?,
            pending_submissions: self.db.pending_submissions().await?.len(),
            cache_name,
        })
    }

    async fn set_state(&self, next: WorkerState) {
        let mut state = self.state.write().await;
        let prev = std::mem::replace(&mut *state, next);
        tracing::debug!(from = %prev, to = %next, "worker state change");
    }
}
