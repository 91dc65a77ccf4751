//! Install and activate.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use pawcache_core::{CachedResponse, Error};
use reqwest::Method;
use tokio::task::JoinSet;
use url::Url;

use super::{ServiceWorker, WorkerState};
use crate::fetch::{FetchRequest, Network, RequestMode};

async fn precache_one(network: Arc<dyn Network>, url: Url) -> Result<CachedResponse, Error> {
    let request = FetchRequest::get(url.clone()).with_mode(RequestMode::SameOrigin);
    let response = network
        .fetch(&request)
        .await
        .map_err(|e| Error::InstallFailed { url: url.to_string(), reason: e.to_string() })?;

    if !response.status.is_success() {
        return Err(Error::InstallFailed { url: url.to_string(), reason: format!("status {}", response.status) });
    }

    Ok(response.to_cached(&Method::GET))
}

impl ServiceWorker {
    /// Precache the manifest into the current generation.
    ///
    /// All manifest URLs are fetched concurrently and stored in one
    /// transaction only after every fetch succeeded. On success the worker
    /// is installed and asks to skip waiting; on failure it is redundant and
    /// the generation holds no entries.
    ///
    /// Returns the number of entries stored.
    pub async fn install(&self) -> Result<usize, Error> {
        {
            let mut state = self.state.write().await;
            if !state.can_install() {
                return Err(Error::InvalidState(format!("cannot install from state {}", *state)));
            }
            *state = WorkerState::Installing;
        }

        let cache_name = self.config.cache_name.as_str();
        tracing::info!(cache = cache_name, urls = self.config.precache.len(), "installing");

        match self.precache().await {
            Ok(count) => {
                self.set_state(WorkerState::Installed).await;
                self.skip_waiting();
                tracing::info!(cache = cache_name, entries = count, "installed");
                Ok(count)
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                tracing::error!(cache = cache_name, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let cache_name = &self.config.cache_name;
        self.db.open_generation(cache_name).await?;

        let mut fetches = JoinSet::new();
        for (index, url) in self.config.precache.iter().enumerate() {
            let network = self.network.clone();
            let url = url.clone();
            fetches.spawn(async move { (index, precache_one(network, url).await) });
        }

        let mut entries: Vec<Option<CachedResponse>> = vec![None; self.config.precache.len()];
        while let Some(joined) = fetches.join_next().await {
            let (index, result) = joined.map_err(|e| Error::Network(format!("precache task failed: {e}")))?;
            match result {
                Ok(entry) => entries[index] = Some(entry),
                Err(e) => {
                    fetches.abort_all();
                    return Err(e);
                }
            }
        }

        let entries: Vec<CachedResponse> = entries.into_iter().flatten().collect();
        self.db.install_generation(cache_name, entries).await
    }

    /// Activate this version.
    ///
    /// Deletes every generation except the current one, claims open clients
    /// and starts intercepting fetches. Returns the names of the deleted
    /// generations.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Installed {
                return Err(Error::InvalidState(format!("cannot activate from state {}", *state)));
            }
            *state = WorkerState::Activating;
        }

        let cache_name = self.config.cache_name.as_str();
        match self.drop_other_generations().await {
            Ok(deleted) => {
                self.claim_clients();
                self.set_state(WorkerState::Activated).await;
                tracing::info!(cache = cache_name, deleted = deleted.len(), "activated");
                Ok(deleted)
            }
            Err(e) => {
                // Generations deleted before the failure stay deleted; a retry finishes the rest.
                self.set_state(WorkerState::Installed).await;
                tracing::error!(cache = cache_name, error = %e, "activation failed");
                Err(e)
            }
        }
    }

    async fn drop_other_generations(&self) -> Result<Vec<String>, Error> {
        let cache_name = self.config.cache_name.as_str();
        if !self.db.is_installed(cache_name).await? {
            return Err(Error::InvalidState(format!("generation {cache_name} is not installed")));
        }

        let mut deleted = Vec::new();
        for name in self.db.generation_names().await? {
            if name != cache_name && self.db.delete_generation(&name).await? {
                tracing::info!(cache = %name, "deleted old cache generation");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Ask to activate without waiting for older versions to release clients.
    pub fn skip_waiting(&self) {
        if !self.skip_waiting.swap(true, Ordering::SeqCst) {
            tracing::debug!("skip waiting requested");
        }
    }

    fn claim_clients(&self) {
        self.clients_claimed.store(true, Ordering::SeqCst);
    }

    /// Install, then activate if this version asked to skip waiting.
    pub async fn start(&self) -> Result<WorkerState, Error> {
        self.install().await?;
        if self.skip_waiting_requested() {
            self.activate().await?;
        }
        Ok(self.state().await)
    }
}
