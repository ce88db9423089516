// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for the edgesync services.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use es_core::{EntryId, Request, Response};

use crate::auth::Credential;
use crate::backoff::BackoffPolicy;
use crate::cache::{FetchError, Fetcher};
use crate::transport::{BoxFuture, Delivery, DeliveryError, Transport};

type DeliverHook = Box<dyn Fn(EntryId) + Send + Sync>;

/// Transport with scripted per-entry outcomes. Unscripted deliveries succeed.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<HashMap<EntryId, VecDeque<Result<Delivery, DeliveryError>>>>,
    calls: Mutex<Vec<EntryId>>,
    tokens: Mutex<Vec<String>>,
    unhealthy: AtomicBool,
    hook: Mutex<Option<DeliverHook>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for successive deliveries of `id`.
    pub fn script(&self, id: EntryId, outcomes: Vec<Result<Delivery, DeliveryError>>) {
        self.script
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .extend(outcomes);
    }

    /// Entry ids in the order they were delivered, one per attempt.
    pub fn calls(&self) -> Vec<EntryId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    /// Run `hook` at the start of every delivery.
    pub fn on_deliver(&self, hook: impl Fn(EntryId) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }
}

impl Transport for MockTransport {
    fn deliver<'a>(
        &'a self,
        entry: &'a es_core::SyncEntry,
        credential: &'a Credential,
    ) -> BoxFuture<'a, Result<Delivery, DeliveryError>> {
        Box::pin(async move {
            if let Some(hook) = self.hook.lock().unwrap().as_ref() {
                hook(entry.id);
            }
            self.calls.lock().unwrap().push(entry.id);
            self.tokens
                .lock()
                .unwrap()
                .push(credential.token().to_string());
            self.script
                .lock()
                .unwrap()
                .get_mut(&entry.id)
                .and_then(VecDeque::pop_front)
                .unwrap_or(Ok(Delivery::Accepted))
        })
    }

    fn health(&self) -> BoxFuture<'_, bool> {
        let healthy = !self.unhealthy.load(Ordering::SeqCst);
        Box::pin(async move { healthy })
    }
}

/// Fetcher serving canned responses by URL, with an offline switch.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: Response) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(request.url.clone());
            if self.offline.load(Ordering::SeqCst) {
                return Err(FetchError::Network("offline".to_string()));
            }
            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| Response::new(404, "not found")))
        })
    }
}

/// Fast backoff with several attempts, for virtual-time tests.
pub fn quick_backoff(attempts: u32) -> BackoffPolicy {
    BackoffPolicy::new(attempts, Duration::from_millis(10))
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets or removes environment variables and restores them on drop.
///
/// Holds a process-wide lock so tests touching the environment run one at a time.
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn lock() -> Self {
        EnvGuard {
            saved: Vec::new(),
            _lock: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub fn set(key: &'static str, value: &str) -> Self {
        Self::lock().and_set(key, value)
    }

    pub fn remove(key: &'static str) -> Self {
        Self::lock().and_remove(key)
    }

    pub fn and_set(mut self, key: &'static str, value: &str) -> Self {
        self.saved.push((key, std::env::var(key).ok()));
        std::env::set_var(key, value);
        self
    }

    pub fn and_remove(mut self, key: &'static str) -> Self {
        self.saved.push((key, std::env::var(key).ok()));
        std::env::remove_var(key);
        self
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.saved.drain(..).rev() {
            match original {
                Some(val) => std::env::set_var(key, val),
                None => std::env::remove_var(key),
            }
        }
    }
}
