//! Caching strategies.

use std::sync::Arc;

use pawcache_core::{CachedResponse, Error};
use reqwest::StatusCode;

use super::{CacheWriter, ResponseSource, ServiceWorker, WorkerResponse};
use crate::fetch::{Destination, FetchRequest, FetchResponse, Network};

async fn revalidate(
    network: Arc<dyn Network>, writer: CacheWriter, request: FetchRequest,
) -> Result<FetchResponse, Error> {
    let response = network.fetch(&request).await.inspect_err(|e| {
        tracing::debug!(url = %request.url, error = %e, "revalidation failed");
    })?;
    if response.is_cacheable() {
        writer.store_in_background(&request.method, &response);
    }
    Ok(response)
}

impl ServiceWorker {
    /// Serve the cached copy immediately and refresh it in the background.
    ///
    /// Without a cached copy the request waits on the network. If that fails
    /// too, navigations get the offline page and images the offline image.
    pub(crate) async fn stale_while_revalidate(&self, request: &FetchRequest) -> Result<WorkerResponse, Error> {
        let cached = self.match_cache(request).await?;
        let refresh = self
            .tasks
            .spawn(revalidate(self.network.clone(), self.writer.clone(), request.clone()));

        if let Some(cached) = cached {
            return Ok(WorkerResponse::from_cache(cached, ResponseSource::Cache));
        }

        let fetched = refresh
            .await
            .map_err(|e| Error::Network(format!("revalidation task failed: {e}")))?;
        match fetched {
            Ok(response) => Ok(WorkerResponse::from_network(response)),
            Err(e) => self.offline_fallback(request, e).await,
        }
    }

    /// Prefer the network; fall back to the cached copy when offline.
    ///
    /// A 200 response refreshes the cache in the background. With neither
    /// network nor a cached copy, navigations get the offline page and other
    /// requests fail with `Error::Offline`.
    pub(crate) async fn network_first(&self, request: &FetchRequest) -> Result<WorkerResponse, Error> {
        let network_err = match self.network.fetch(request).await {
            Ok(response) => {
                if response.status == StatusCode::OK {
                    self.writer.store_in_background(&request.method, &response);
                }
                return Ok(WorkerResponse::from_network(response));
            }
            Err(e) => e,
        };

        if let Some(cached) = self.match_cache(request).await? {
            tracing::debug!(url = %request.url, "network unavailable; serving cached copy");
            return Ok(WorkerResponse::from_cache(cached, ResponseSource::Cache));
        }

        let offline = Error::Offline(format!("{} ({network_err})", request.url));
        if request.is_navigation() { self.offline_fallback(request, offline).await } else { Err(offline) }
    }

    /// Serve from cache, else network; failed navigations get the offline page.
    pub(crate) async fn cache_first(&self, request: &FetchRequest) -> Result<WorkerResponse, Error> {
        if let Some(cached) = self.match_cache(request).await? {
            return Ok(WorkerResponse::from_cache(cached, ResponseSource::Cache));
        }

        match self.network.fetch(request).await {
            Ok(response) => Ok(WorkerResponse::from_network(response)),
            Err(e) if request.is_navigation() => self.offline_fallback(request, e).await,
            Err(e) => Err(e),
        }
    }

    async fn match_cache(&self, request: &FetchRequest) -> Result<Option<CachedResponse>, Error> {
        self.db
            .match_response(&self.config.cache_name, request.method.as_str(), request.url.as_str())
            .await
    }

    /// Substitute the designated offline asset for a failed request.
    ///
    /// Returns `err` unchanged when the request has no offline asset or the
    /// asset is missing from the current generation.
    async fn offline_fallback(&self, request: &FetchRequest, err: Error) -> Result<WorkerResponse, Error> {
        let asset = if request.is_navigation() {
            &self.config.offline_page
        } else if request.destination == Destination::Image {
            &self.config.offline_image
        } else {
            return Err(err);
        };

        match self.db.match_response(&self.config.cache_name, "GET", asset.as_str()).await? {
            Some(cached) => {
                tracing::info!(url = %request.url, fallback = %asset, error = %err, "serving offline fallback");
                Ok(WorkerResponse::from_cache(cached, ResponseSource::OfflineFallback))
            }
            None => Err(err),
        }
    }
}
