//! Fetch interception.

use pawcache_core::Error;

use super::{FetchOutcome, ServiceWorker, Strategy};
use crate::fetch::FetchRequest;

impl ServiceWorker {
    /// Offer an intercepted request to the worker.
    ///
    /// Returns [`FetchOutcome::Inactive`] before activation and
    /// [`FetchOutcome::Ignored`] when the router ignores the request.
    pub async fn handle_fetch(&self, mut request: FetchRequest) -> Result<FetchOutcome, Error> {
        if !self.state().await.can_intercept_fetch() {
            return Ok(FetchOutcome::Inactive);
        }

        request.url.set_fragment(None);
        let strategy = self.router.classify(&request);
        tracing::debug!(method = %request.method, url = %request.url, ?strategy, "fetch");

        let response = match strategy {
            Strategy::Ignore => return Ok(FetchOutcome::Ignored),
            Strategy::NetworkFirst => self.network_first(&request).await?,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(&request).await?,
            Strategy::CacheFirst => self.cache_first(&request).await?,
        };
        Ok(FetchOutcome::Responded(response))
    }
}
