//! Cached response CRUD operations.
//!
//! Entries are keyed by (generation name, request key). Writes are upserts,
//! so concurrent stores for the same request resolve last-write-wins.

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// A stored response snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub url: String,
    pub method: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// `basic` for same-origin responses, `cors` otherwise.
    pub response_type: String,
    pub stored_at: String,
}

impl CachedResponse {
    /// Build a same-origin snapshot with no headers.
    pub fn new(method: &str, url: &str, status: u16, body: Vec<u8>) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_ascii_uppercase(),
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body,
            response_type: "basic".into(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Request key this snapshot is stored under.
    pub fn key(&self) -> String {
        compute_request_key(&self.method, &self.url)
    }
}

pub(crate) fn upsert_entry(conn: &rusqlite::Connection, cache_name: &str, entry: &CachedResponse) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&entry.headers)?;
    conn.execute(
        "INSERT INTO cache_entries (
            cache_name, key_hash, url, method, status, status_text,
            headers_json, body, response_type, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(cache_name, key_hash) DO UPDATE SET
            url = excluded.url,
            method = excluded.method,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            response_type = excluded.response_type,
            stored_at = excluded.stored_at",
        params![
            cache_name,
            entry.key(),
            &entry.url,
            &entry.method,
            entry.status,
            &entry.status_text,
            headers_json,
            &entry.body,
            &entry.response_type,
            &entry.stored_at,
        ],
    )?;
    Ok(())
}

type EntryRow = (String, String, u16, String, String, Vec<u8>, String, String);

impl CacheDb {
    /// Store a response in the named generation, creating it if absent.
    ///
    /// Replaces any prior entry for the same request.
    pub async fn put_response(&self, cache_name: &str, response: &CachedResponse) -> Result<(), Error> {
        let cache_name = cache_name.to_string();
        let response = response.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_generations (name, created_at) VALUES (?1, ?2)",
                    params![cache_name, now],
                )?;
                upsert_entry(&tx, &cache_name, &response)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request in the named generation.
    ///
    /// Returns None if nothing is stored for that request.
    pub async fn match_response(
        &self, cache_name: &str, method: &str, url: &str,
    ) -> Result<Option<CachedResponse>, Error> {
        let cache_name = cache_name.to_string();
        let key = compute_request_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let row: Option<EntryRow> = conn
                    .query_row(
                        "SELECT url, method, status, status_text, headers_json, body, response_type, stored_at
                         FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                        params![cache_name, key],
                        |row| {
                            Ok((
                                row.get(0)?,
                                row.get(1)?,
                                row.get(2)?,
                                row.get(3)?,
                                row.get(4)?,
                                row.get(5)?,
                                row.get(6)?,
                                row.get(7)?,
                            ))
                        },
                    )
                    .optional()?;

                let Some((url, method, status, status_text, headers_json, body, response_type, stored_at)) = row else {
                    return Ok(None);
                };

                Ok(Some(CachedResponse {
                    url,
                    method,
                    status,
                    status_text,
                    headers: serde_json::from_str(&headers_json)?,
                    body,
                    response_type,
                    stored_at,
                }))
            })
            .await
            .map_err(Error::from)
    }

    /// Remove a single request from the named generation.
    #[cfg(test)]
    pub async fn delete_response(&self, cache_name: &str, method: &str, url: &str) -> Result<bool, Error> {
        let cache_name = cache_name.to_string();
        let key = compute_request_key(method, url);
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![cache_name, key],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// URLs stored in the named generation, sorted.
    pub async fn cache_keys(&self, cache_name: &str) -> Result<Vec<String>, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE cache_name = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![cache_name], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn entry_count(&self, cache_name: &str) -> Result<u64, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE cache_name = ?1",
                    params![cache_name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
