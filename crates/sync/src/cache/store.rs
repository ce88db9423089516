// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Storage seam for versioned cache stores.

use es_core::Response;

/// Durable storage behind the cache router.
///
/// A store is a named bucket of responses keyed by full request URL. Only the
/// router writes to it.
pub trait CacheStore: Send + Sync {
    fn open_cache(&self, name: &str) -> es_core::Result<()>;
    /// Names of every existing store, oldest first.
    fn cache_names(&self) -> es_core::Result<Vec<String>>;
    /// Returns false if the store did not exist.
    fn delete_cache(&self, name: &str) -> es_core::Result<bool>;
    fn put_cached(&self, store: &str, url: &str, response: &Response) -> es_core::Result<()>;
    /// Store every response or none.
    fn put_cached_all(&self, store: &str, responses: &[(String, Response)]) -> es_core::Result<()>;
    fn get_cached(&self, store: &str, url: &str) -> es_core::Result<Option<Response>>;
    fn cached_urls(&self, store: &str) -> es_core::Result<Vec<String>>;
}
