// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned cache store operations.
//!
//! A cache store is a named bucket of responses keyed by request URL. Stores
//! are only ever created whole and deleted whole.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{format_timestamp, parse_json, Database};
use crate::error::Result;
use crate::http::Response;

impl Database {
    /// Create a cache store if it does not exist yet.
    pub fn open_cache_store(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
            params![name, format_timestamp(Utc::now())],
        )?;
        Ok(())
    }

    /// Names of all cache stores, in creation order.
    pub fn cache_store_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM cache_stores ORDER BY created_at ASC, name ASC")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Delete a cache store and every response in it.
    ///
    /// Returns false if the store did not exist.
    pub fn delete_cache_store(&self, name: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cache_entries WHERE store = ?1", params![name])?;
        let deleted = tx.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Store a response under a URL, replacing any previous one.
    pub fn put_cached(&self, store: &str, url: &str, response: &Response) -> Result<()> {
        self.put_cached_all(store, &[(url.to_string(), response.clone())])
    }

    /// Store several responses in one transaction. Either all land or none do.
    pub fn put_cached_all(&self, store: &str, responses: &[(String, Response)]) -> Result<()> {
        let now = format_timestamp(Utc::now());
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
            params![store, now],
        )?;
        for (url, response) in responses {
            tx.execute(
                "INSERT OR REPLACE INTO cache_entries (store, url, status, headers, body, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    store,
                    url,
                    response.status,
                    serde_json::to_string(&response.headers)?,
                    response.body,
                    now,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Look up a response by exact URL in one store.
    pub fn get_cached(&self, store: &str, url: &str) -> Result<Option<Response>> {
        let response = self
            .conn
            .query_row(
                "SELECT status, headers, body FROM cache_entries WHERE store = ?1 AND url = ?2",
                params![store, url],
                |row| {
                    let headers: String = row.get(1)?;
                    Ok(Response {
                        status: row.get(0)?,
                        headers: parse_json(&headers, "headers")?,
                        body: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(response)
    }

    /// URLs cached in a store, sorted.
    pub fn cached_urls(&self, store: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM cache_entries WHERE store = ?1 ORDER BY url ASC")?;
        let urls = stmt
            .query_map(params![store], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(urls)
    }
}
