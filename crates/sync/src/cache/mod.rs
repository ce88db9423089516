// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request-level cache routing.
//!
//! ```text
//!  Request ──► RouteRules ──► Strategy
//!                               │
//!        ┌──────────────┬───────┴───────┬──────────────┐
//!   cache-first    network-first   network-only    passthrough
//!   store ► fetch  fetch ► store       fetch          fetch
//! ```
//!
//! Stores are versioned by name (`<prefix>-precache-<version>` and
//! `<prefix>-runtime-<version>`); activating a version deletes every other
//! store carrying the prefix.

mod fetch;
mod router;
mod rules;
mod store;

pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use router::{CacheError, CacheRouter, ResponseSource, RoutedResponse, RouterConfig};
pub use rules::{RouteRules, Strategy, DEFAULT_CACHE_FIRST, DEFAULT_NETWORK_FIRST};
pub use store::CacheStore;
