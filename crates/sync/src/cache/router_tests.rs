// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::store::SqliteStore;
use crate::test_helpers::MockFetcher;

const STYLES: &str = "https://rig.example/styles.css";
const JOBS: &str = "https://rig.example/api/jobs";

struct Harness {
    store: Arc<SqliteStore>,
    fetcher: Arc<MockFetcher>,
    router: CacheRouter<SqliteStore, MockFetcher>,
}

fn harness() -> Harness {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let fetcher = Arc::new(MockFetcher::new());
    let router = CacheRouter::new(
        Arc::clone(&store),
        Arc::clone(&fetcher),
        RouterConfig {
            version: "v1".to_string(),
            backoff: BackoffPolicy::no_retry(),
            ..RouterConfig::default()
        },
    );
    Harness {
        store,
        fetcher,
        router,
    }
}

fn css() -> Response {
    Response::new(200, "body { margin: 0 }").with_header("Content-Type", "text/css")
}

#[tokio::test]
async fn cache_first_fetches_once_then_serves_from_cache() {
    let h = harness();
    h.fetcher.respond(STYLES, css());

    let first = h.router.route(&Request::get(STYLES)).await.unwrap();
    assert_eq!(h.fetcher.call_count(), 1);
    assert_eq!(first.source, ResponseSource::Network);
    assert_eq!(first.strategy, Strategy::CacheFirst);

    let second = h.router.route(&Request::get(STYLES)).await.unwrap();
    assert_eq!(h.fetcher.call_count(), 1);
    assert_eq!(second.source, ResponseSource::Cache);
    assert_eq!(second.response, first.response);
}

#[tokio::test]
async fn cache_first_survives_going_offline() {
    let h = harness();
    h.fetcher.respond(STYLES, css());

    let online = h.router.route(&Request::get(STYLES)).await.unwrap();
    h.fetcher.set_offline(true);
    let offline = h.router.route(&Request::get(STYLES)).await.unwrap();

    assert_eq!(online.response, offline.response);
}

#[tokio::test]
async fn cache_first_miss_while_offline_propagates() {
    let h = harness();
    h.fetcher.set_offline(true);

    let err = h.router.route(&Request::get(STYLES)).await.unwrap_err();
    assert!(matches!(err, CacheError::Fetch(FetchError::Network(_))));
}

#[tokio::test]
async fn error_responses_are_served_but_not_cached() {
    let h = harness();
    h.fetcher
        .respond(STYLES, Response::new(206, "partial"));

    let routed = h.router.route(&Request::get(STYLES)).await.unwrap();
    assert_eq!(routed.response.status, 206);
    h.router.route(&Request::get(STYLES)).await.unwrap();

    assert_eq!(h.fetcher.call_count(), 2);
    assert!(h.store.cached_urls("edge-runtime-v1").unwrap().is_empty());

    let missing = h
        .router
        .route(&Request::get("https://rig.example/missing.png"))
        .await
        .unwrap();
    assert_eq!(missing.response.status, 404);
}

#[tokio::test]
async fn query_string_is_part_of_the_cache_key() {
    let h = harness();
    let v1 = "https://rig.example/app.js?v=1";
    let v2 = "https://rig.example/app.js?v=2";
    h.fetcher.respond(v1, Response::new(200, "one"));
    h.fetcher.respond(v2, Response::new(200, "two"));

    h.router.route(&Request::get(v1)).await.unwrap();
    let second = h.router.route(&Request::get(v2)).await.unwrap();

    assert_eq!(second.response.body, b"two");
    assert_eq!(h.fetcher.call_count(), 2);
}

#[tokio::test]
async fn network_first_refreshes_and_falls_back_to_cache() {
    let h = harness();
    h.fetcher.respond(JOBS, Response::new(200, "[1,2]"));

    let live = h.router.route(&Request::get(JOBS)).await.unwrap();
    assert_eq!(live.source, ResponseSource::Network);
    assert_eq!(live.strategy, Strategy::NetworkFirst);

    h.fetcher.set_offline(true);
    let fallback = h.router.route(&Request::get(JOBS)).await.unwrap();
    assert_eq!(fallback.source, ResponseSource::Cache);
    assert_eq!(fallback.response.body, b"[1,2]");
}

#[tokio::test]
async fn network_first_without_cache_propagates_failure() {
    let h = harness();
    h.fetcher.set_offline(true);
    assert!(h.router.route(&Request::get(JOBS)).await.is_err());
}

#[tokio::test]
async fn passthrough_never_touches_the_cache() {
    let h = harness();
    let page = "https://rig.example/planner.html";
    h.fetcher.respond(page, Response::new(200, "<html>"));

    let routed = h.router.route(&Request::get(page)).await.unwrap();
    h.fetcher.set_offline(true);

    assert_eq!(routed.strategy, Strategy::Passthrough);
    assert!(h.router.route(&Request::get(page)).await.is_err());
    assert!(h.store.cache_names().unwrap().is_empty());
}

#[tokio::test]
async fn non_get_requests_bypass_cache() {
    let h = harness();
    h.fetcher.respond(STYLES, css());
    let mut request = Request::get(STYLES);
    request.method = es_core::Method::Post;

    h.router.route(&request).await.unwrap();
    h.router.route(&request).await.unwrap();

    assert_eq!(h.fetcher.call_count(), 2);
}

#[tokio::test]
async fn install_populates_precache_store() {
    let h = harness();
    let urls = vec![STYLES.to_string(), "https://rig.example/app.js".to_string()];
    h.fetcher.respond(&urls[0], css());
    h.fetcher.respond(&urls[1], Response::new(200, "js"));

    assert_eq!(h.router.install(&urls).await.unwrap(), 2);
    h.fetcher.set_offline(true);

    let routed = h.router.route(&Request::get(STYLES)).await.unwrap();
    assert_eq!(routed.source, ResponseSource::Cache);
    assert_eq!(h.store.cached_urls("edge-precache-v1").unwrap().len(), 2);
}

#[tokio::test]
async fn install_is_all_or_nothing() {
    let h = harness();
    h.fetcher.respond(STYLES, css());
    let urls = vec![STYLES.to_string(), "https://rig.example/gone.js".to_string()];

    let err = h.router.install(&urls).await.unwrap_err();

    assert!(matches!(err, CacheError::Precache { status: 404, .. }));
    assert!(h.store.cached_urls("edge-precache-v1").unwrap().is_empty());
}

#[tokio::test]
async fn activate_version_deletes_previous_stores_wholesale() {
    let h = harness();
    h.fetcher.respond(STYLES, css());
    h.fetcher.respond(JOBS, Response::new(200, "[]"));
    h.router.install(&[STYLES.to_string()]).await.unwrap();
    h.router.route(&Request::get(JOBS)).await.unwrap();
    h.store
        .put_cached("other-app-v1", STYLES, &css())
        .unwrap();

    let deleted = h.router.activate_version("v2").unwrap();

    assert_eq!(deleted, vec!["edge-precache-v1", "edge-runtime-v1"]);
    assert_eq!(h.router.version(), "v2");
    let mut names = h.store.cache_names().unwrap();
    names.sort();
    assert_eq!(names, vec!["edge-runtime-v2", "other-app-v1"]);

    h.fetcher.set_offline(true);
    assert!(h.router.route(&Request::get(STYLES)).await.is_err());
}

#[tokio::test]
async fn clear_all_removes_every_store() {
    let h = harness();
    h.fetcher.respond(STYLES, css());
    h.router.route(&Request::get(STYLES)).await.unwrap();
    h.store.put_cached("other", STYLES, &css()).unwrap();

    assert_eq!(h.router.clear_all().unwrap(), 2);
    assert!(h.store.cache_names().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn network_fetches_are_retried_with_backoff() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.set_offline(true);
    let router = CacheRouter::new(
        store,
        Arc::clone(&fetcher),
        RouterConfig {
            backoff: crate::test_helpers::quick_backoff(3),
            ..RouterConfig::default()
        },
    );

    assert!(router.route(&Request::get(STYLES)).await.is_err());
    assert_eq!(fetcher.call_count(), 3);
}
