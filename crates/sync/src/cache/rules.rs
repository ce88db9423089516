// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! URL pattern rules selecting a caching strategy.

use std::fmt;

use es_core::{Method, Request};
use regex::Regex;

/// Resolution discipline for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Serve from the cache store, fetching and storing on a miss.
    CacheFirst,
    /// Fetch, falling back to the cache store when the network fails.
    NetworkFirst,
    /// Fetch; never read or write the cache store.
    NetworkOnly,
    /// No rule matched, or the request is not cacheable at all.
    Passthrough,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::NetworkOnly => "network-only",
            Strategy::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static assets and reference data.
pub const DEFAULT_CACHE_FIRST: &[&str] = &[
    r"\.css$",
    r"\.js$",
    r"\.woff2?$",
    r"\.png$",
    r"\.jpe?g$",
    r"\.svg$",
    r"\.gif$",
    r"equipment-catalog\.json$",
];

/// API calls.
pub const DEFAULT_NETWORK_FIRST: &[&str] = &[r"/api/"];

/// Three pattern sets matched against the request path.
///
/// Precedence is network-only, then cache-first, then network-first.
#[derive(Debug, Clone)]
pub struct RouteRules {
    network_only: Vec<Regex>,
    cache_first: Vec<Regex>,
    network_first: Vec<Regex>,
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p.as_ref())).collect()
}

impl RouteRules {
    pub fn new<S: AsRef<str>>(
        cache_first: &[S],
        network_first: &[S],
        network_only: &[S],
    ) -> Result<Self, regex::Error> {
        Ok(RouteRules {
            network_only: compile(network_only)?,
            cache_first: compile(cache_first)?,
            network_first: compile(network_first)?,
        })
    }

    /// Rules that route every request to the network.
    pub fn empty() -> Self {
        RouteRules {
            network_only: Vec::new(),
            cache_first: Vec::new(),
            network_first: Vec::new(),
        }
    }

    pub fn strategy_for(&self, request: &Request) -> Strategy {
        if request.method != Method::Get || !request.is_http() {
            return Strategy::Passthrough;
        }
        let path = request.path();
        let matches = |set: &[Regex]| set.iter().any(|re| re.is_match(path));
        if matches(&self.network_only) {
            Strategy::NetworkOnly
        } else if matches(&self.cache_first) {
            Strategy::CacheFirst
        } else if matches(&self.network_first) {
            Strategy::NetworkFirst
        } else {
            Strategy::Passthrough
        }
    }
}

impl Default for RouteRules {
    fn default() -> Self {
        RouteRules {
            network_only: Vec::new(),
            cache_first: DEFAULT_CACHE_FIRST
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            network_first: DEFAULT_NETWORK_FIRST
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
