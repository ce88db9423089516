// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of queued entries to the remote sync endpoint.
//!
//! The [`Transport`] trait is the network-call seam of the orchestrator; the
//! production implementation is [`HttpTransport`], tests use a scripted mock.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use es_core::{EntryId, OperationType, SyncEntry};
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde_json::Value;

use crate::auth::Credential;
use crate::backoff::Retryable;

/// Boxed future returned by the object-safe async traits in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Header carrying the client identifier on every sync request.
pub const CLIENT_ID_HEADER: &str = "X-Client-ID";

/// Successful outcome of a delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// The remote endpoint applied the mutation.
    Accepted,
    /// The remote resource changed since the entry was created.
    Conflict {
        /// Remote state, when the endpoint reported one.
        remote: Option<Value>,
    },
}

/// Failed delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// Connection refused, reset, DNS failure.
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// 5xx from the endpoint.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// 429 from the endpoint.
    #[error("rate limited by remote endpoint")]
    RateLimited,

    /// 4xx other than 409 and 429. The payload will not succeed as-is.
    #[error("rejected with {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The auth collaborator had no valid credential.
    #[error("no credential: {0}")]
    NoCredential(String),
}

impl DeliveryError {
    /// Returns true if the endpoint answered, even with an error.
    pub fn reached_remote(&self) -> bool {
        matches!(
            self,
            DeliveryError::Server { .. } | DeliveryError::RateLimited | DeliveryError::Rejected { .. }
        )
    }
}

impl Retryable for DeliveryError {
    fn is_retryable(&self) -> bool {
        !matches!(self, DeliveryError::Rejected { .. })
    }
}

/// Transport trait for delivering entries to the remote endpoint.
pub trait Transport: Send + Sync {
    /// Deliver one entry, authenticated with `credential`.
    fn deliver<'a>(
        &'a self,
        entry: &'a SyncEntry,
        credential: &'a Credential,
    ) -> BoxFuture<'a, Result<Delivery, DeliveryError>>;

    /// Returns true if the remote endpoint is reachable and healthy.
    fn health(&self) -> BoxFuture<'_, bool>;
}

/// Map an HTTP status and body to a delivery outcome.
pub fn classify_response(status: u16, body: &[u8]) -> Result<Delivery, DeliveryError> {
    match status {
        200..=299 => Ok(Delivery::Accepted),
        409 => Ok(Delivery::Conflict {
            remote: serde_json::from_slice(body).ok(),
        }),
        429 => Err(DeliveryError::RateLimited),
        500..=599 => Err(DeliveryError::Server {
            status,
            message: body_excerpt(body),
        }),
        _ => Err(DeliveryError::Rejected {
            status,
            message: body_excerpt(body),
        }),
    }
}

fn body_excerpt(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> DeliveryError {
    if e.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Network(e.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry<'a> {
    client_id: &'a str,
    entry_id: EntryId,
    resource: &'a str,
    operation: OperationType,
    payload: &'a Value,
    created_at: DateTime<Utc>,
}

/// HTTPS transport for the remote sync endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl HttpTransport {
    /// Create a transport; every request inherits `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn deliver<'a>(
        &'a self,
        entry: &'a SyncEntry,
        credential: &'a Credential,
    ) -> BoxFuture<'a, Result<Delivery, DeliveryError>> {
        Box::pin(async move {
            let body = WireEntry {
                client_id: &self.client_id,
                entry_id: entry.id,
                resource: &entry.resource,
                operation: entry.operation,
                payload: &entry.payload,
                created_at: entry.created_at,
            };
            let response = self
                .client
                .post(self.endpoint("sync"))
                .header(AUTHORIZATION, credential.header_value())
                .header(CLIENT_ID_HEADER, self.client_id.as_str())
                .json(&body)
                .send()
                .await
                .map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let bytes = response.bytes().await.map_err(map_reqwest_error)?;
            tracing::debug!(entry = entry.id, status, "sync endpoint responded");
            classify_response(status, &bytes)
        })
    }

    fn health(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let request = self
                .client
                .get(self.endpoint("health"))
                .header(CLIENT_ID_HEADER, self.client_id.as_str());
            match request.send().await {
                Ok(response) => response.status().is_success(),
                Err(e) => {
                    tracing::debug!(error = %e, "health check failed");
                    false
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
