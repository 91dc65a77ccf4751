//! User notifications raised by the worker.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Sink for notifications; the host decides how they reach the user.
pub trait Notifier: Send + Sync {
    fn show(&self, notification: &Notification);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, notification: &Notification) {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            icon = %notification.icon,
            "notification raised"
        );
    }
}
