// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counter(observers: &Observers<u32>) -> (Arc<AtomicUsize>, Subscription) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let sub = observers.subscribe(move |v| {
        seen.fetch_add(*v as usize, Ordering::SeqCst);
    });
    (count, sub)
}

#[test]
fn publish_reaches_all_subscribers() {
    let observers = Observers::new();
    let (a, _sub_a) = counter(&observers);
    let (b, _sub_b) = counter(&observers);

    observers.publish(&2);

    assert_eq!(a.load(Ordering::SeqCst), 2);
    assert_eq!(b.load(Ordering::SeqCst), 2);
}

#[test]
fn unsubscribe_stops_delivery() {
    let observers = Observers::new();
    let (count, sub) = counter(&observers);

    observers.publish(&1);
    sub.unsubscribe();
    observers.publish(&1);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(observers.is_empty());
}

#[test]
fn dropping_handle_unsubscribes() {
    let observers = Observers::new();
    let (count, sub) = counter(&observers);
    drop(sub);

    observers.publish(&5);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn detached_subscription_survives_handle() {
    let observers = Observers::new();
    let (count, sub) = counter(&observers);
    sub.detach();

    observers.publish(&3);
    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert_eq!(observers.len(), 1);
}

#[test]
fn handle_outliving_registry_is_harmless() {
    let observers = Observers::new();
    let (_count, sub) = counter(&observers);
    drop(observers);
    sub.unsubscribe();
}

#[test]
fn callback_may_unsubscribe_others_during_publish() {
    let observers: Observers<u32> = Observers::new();
    let (count, sub) = counter(&observers);
    let slot = Arc::new(Mutex::new(Some(sub)));
    let slot_in_cb = Arc::clone(&slot);
    let _killer = observers.subscribe(move |_| {
        slot_in_cb.lock().unwrap().take();
    });

    observers.publish(&1);
    observers.publish(&1);

    // First publish snapshotted both callbacks
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
