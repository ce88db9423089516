// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network seam of the cache router.

use std::time::Duration;

use es_core::{Request, Response};

use crate::backoff::Retryable;
use crate::transport::BoxFuture;

/// The request never produced a response.
///
/// An HTTP error status is a response, not a fetch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// The request cannot be sent as built. Not retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::InvalidRequest(_))
    }
}

/// Performs one network round trip.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>>;
}

/// [`Fetcher`] backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(HttpFetcher {
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>> {
        Box::pin(async move {
            let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
            let mut builder = self.client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else if e.is_builder() {
                    FetchError::InvalidRequest(e.to_string())
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(Response {
                status,
                headers,
                body: body.to_vec(),
            })
        })
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
