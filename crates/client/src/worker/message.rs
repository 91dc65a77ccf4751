//! Messages posted to the worker by pages.

use pawcache_core::Error;
use serde::{Deserialize, Serialize};

use super::{ServiceWorker, WorkerState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    /// Any other message type; ignored.
    #[serde(other)]
    Unknown,
}

impl ServiceWorker {
    /// Handle a page message and return the resulting worker state.
    ///
    /// `SKIP_WAITING` activates a worker that is installed and waiting. A
    /// worker still installing keeps the request and activates from
    /// [`ServiceWorker::start`].
    pub async fn handle_message(&self, message: &WorkerMessage) -> Result<WorkerState, Error> {
        match message {
            WorkerMessage::SkipWaiting => {
                self.skip_waiting();
                if self.state().await == WorkerState::Installed {
                    self.activate().await?;
                }
            }
            WorkerMessage::Unknown => tracing::debug!("ignoring unknown worker message"),
        }
        Ok(self.state().await)
    }
}
