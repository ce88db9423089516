// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! edgesync: offline-first store-and-forward sync services.
//!
//! ```text
//! mutations ──► SyncQueue ──► SyncOrchestrator ──► Transport ──► remote
//!                  │               ▲      │
//!                  │   ConnectivityMonitor  BackoffPolicy
//!                  ▼               ▲
//!           StatusIndicator    HealthProbe
//!
//! requests ──► CacheRouter ──► CacheStore | Fetcher
//! ```
//!
//! Every service is constructed explicitly with its storage and network
//! handles, so tests substitute in-memory storage and scripted transports.

pub mod auth;
pub mod backoff;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod env;
pub mod event;
pub mod observer;
pub mod orchestrator;
pub mod queue;
pub mod status;
pub mod store;
pub mod transport;

pub use auth::{AuthError, Credential, CredentialProvider, EnvCredential, StaticCredential};
pub use backoff::{retry, retry_if, BackoffPolicy, Retryable};
pub use cache::{
    CacheError, CacheRouter, CacheStore, FetchError, Fetcher, HttpFetcher, ResponseSource,
    RouteRules, RoutedResponse, RouterConfig, Strategy,
};
pub use config::{Config, ConfigError};
pub use connectivity::{ConnectivityMonitor, HealthProbe};
pub use event::{DrainReport, SyncEvent};
pub use observer::{Observers, Subscription};
pub use orchestrator::{OrchestratorConfig, SyncOrchestrator};
pub use queue::{QueueError, QueueResult, QueueStore, Resolution, SyncQueue};
pub use status::{IndicatorState, StatusIndicator};
pub use store::SqliteStore;
pub use transport::{Delivery, DeliveryError, HttpTransport, Transport};

#[cfg(test)]
mod test_helpers;
