// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit observer registry.
//!
//! Every `subscribe` returns a [`Subscription`] handle. Dropping the handle
//! (or calling [`Subscription::unsubscribe`]) removes the callback, so a
//! consumer cannot outlive its registration by accident.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback<T>>,
}

/// A set of callbacks notified with every published value.
pub struct Observers<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Observers {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Observers {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                callbacks: BTreeMap::new(),
            })),
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every subscriber with `value`, in subscription order.
    ///
    /// Callbacks run outside the registry lock and may subscribe or
    /// unsubscribe freely.
    pub fn publish(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self.lock().callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(value);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: 'static> Observers<T> {
    /// Register a callback. It stays registered while the handle lives.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.callbacks.insert(id, Arc::new(callback));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .callbacks
                        .remove(&id);
                }
            })),
        }
    }
}

/// Handle to a registered callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the callback now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the callback registered for as long as the registry lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
