//! Flat key/value storage shared between pages and the worker.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

pub(crate) fn read_item(conn: &rusqlite::Connection, key: &str) -> Result<Option<String>, Error> {
    let value = conn
        .query_row("SELECT value FROM local_storage WHERE key = ?1", params![key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

pub(crate) fn write_item(conn: &rusqlite::Connection, key: &str, value: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

// The worker reaches local storage only through the pending queue.
impl CacheDb {
    #[cfg(test)]
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| read_item(conn, &key))
            .await
            .map_err(Error::from)
    }

    #[cfg(test)]
    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();
        self.conn
            .call(move |conn| write_item(conn, &key, &value))
            .await
            .map_err(Error::from)
    }

    #[cfg(test)]
    /// Returns false if the key was not present.
    pub async fn remove_item(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}
