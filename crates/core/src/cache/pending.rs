//! Pending contact submissions queued while offline.
//!
//! Pages append submissions to a JSON array under [`PENDING_FORMS_KEY`]; the
//! background sync flush removes them by id once delivered. A record that
//! cannot be parsed is read as an empty queue.

use std::fmt;

use super::connection::CacheDb;
use super::local_storage::{read_item, write_item};
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_rusqlite::rusqlite;

/// Local storage key holding the pending submission array.
pub const PENDING_FORMS_KEY: &str = "pendingForms";

/// Identifier of a pending submission; pages use either timestamps or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionId::Number(n) => write!(f, "{n}"),
            SubmissionId::Text(s) => f.write_str(s),
        }
    }
}

/// A queued contact form submission: an id plus arbitrary form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PendingSubmission {
    pub fn new(id: SubmissionId) -> Self {
        Self { id, fields: Map::new() }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }
}

fn decode_pending(raw: Option<String>) -> Vec<PendingSubmission> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(error = %e, "pending submissions record is malformed; treating as empty");
            Vec::new()
        }
    }
}

fn read_pending(conn: &rusqlite::Connection) -> Result<Vec<PendingSubmission>, Error> {
    Ok(decode_pending(read_item(conn, PENDING_FORMS_KEY)?))
}

fn write_pending(conn: &rusqlite::Connection, pending: &[PendingSubmission]) -> Result<(), Error> {
    let json = serde_json::to_string(pending)?;
    write_item(conn, PENDING_FORMS_KEY, &json)
}

impl CacheDb {
    /// Pending submissions in queue order.
    pub async fn pending_submissions(&self) -> Result<Vec<PendingSubmission>, Error> {
        self.conn
            .call(|conn| read_pending(conn))
            .await
            .map_err(Error::from)
    }

    /// Append a submission to the queue.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if a submission with the same id is
    /// already queued, since removal after delivery is by id.
    pub async fn enqueue_submission(&self, submission: PendingSubmission) -> Result<usize, Error> {
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                let mut pending = read_pending(&tx)?;
                if pending.iter().any(|p| p.id == submission.id) {
                    return Err(Error::InvalidInput(format!("submission {} is already pending", submission.id)));
                }
                pending.push(submission);
                write_pending(&tx, &pending)?;
                tx.commit()?;
                Ok(pending.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove a delivered submission by id.
    ///
    /// Returns false if no pending submission had that id.
    pub async fn remove_submission(&self, id: &SubmissionId) -> Result<bool, Error> {
        let id = id.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                let mut pending = read_pending(&tx)?;
                let before = pending.len();
                pending.retain(|p| p.id != id);
                write_pending(&tx, &pending)?;
                tx.commit()?;
                Ok(pending.len() < before)
            })
            .await
            .map_err(Error::from)
    }
}
