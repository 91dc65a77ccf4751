//! Background sync of queued contact submissions.

use pawcache_core::{Error, PendingSubmission};
use serde::Serialize;

use super::ServiceWorker;
use crate::fetch::FetchRequest;

/// Outcome of one contact-form flush.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Submissions delivered and removed from the queue.
    pub delivered: usize,
    /// Submissions still queued afterwards.
    pub remaining: usize,
    /// Whether the user was notified.
    pub notified: bool,
    /// Error that stopped the flush, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<String>,
}

impl ServiceWorker {
    /// Handle a background sync trigger.
    ///
    /// Only the configured contact-form tag does anything; other tags return
    /// `Ok(None)`.
    pub async fn handle_sync(&self, tag: &str) -> Result<Option<SyncReport>, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return Ok(None);
        }
        self.sync_contact_forms().await.map(Some)
    }

    /// Deliver queued submissions in order, stopping at the first failure.
    ///
    /// Each submission leaves the queue only after its delivery succeeded,
    /// so a failed flush is retried from the failed entry next time.
    pub async fn sync_contact_forms(&self) -> Result<SyncReport, Error> {
        let pending = self.db.pending_submissions().await?;
        let mut report = SyncReport::default();

        for submission in &pending {
            if let Err(e) = self.deliver(submission).await {
                tracing::error!(id = %submission.id, error = %e, "error syncing contact forms");
                report.failed = Some(e.to_string());
                break;
            }
            report.delivered += 1;
        }

        if report.failed.is_none() && !pending.is_empty() {
            self.notifier.show(&self.config.notification);
            report.notified = true;
        }

        report.remaining = self.db.pending_submissions().await?.len();
        tracing::info!(
            delivered = report.delivered,
            remaining = report.remaining,
            notified = report.notified,
            "contact form sync finished"
        );
        Ok(report)
    }

    async fn deliver(&self, submission: &PendingSubmission) -> Result<(), Error> {
        let body = serde_json::to_vec(submission)?;
        let request = FetchRequest::post_json(self.config.contact_endpoint.clone(), body);
        let response = self.network.fetch(&request).await?;

        if !response.status.is_success() {
            return Err(Error::SyncFailed(format!(
                "{} answered {} for submission {}",
                self.config.contact_endpoint, response.status, submission.id
            )));
        }

        self.db.remove_submission(&submission.id).await?;
        tracing::debug!(id = %submission.id, "submission delivered");
        Ok(())
    }
}
