// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for RulesetSyncService
//!
//! - Listing filters unparsable entries and keeps store order
//! - Cached bodies are reused while validators match
//! - Concurrent requests share one download
//! - Download failures propagate without touching the cache
//! - Reset forces a re-download and clears exceptions
//! - Downloads running across a reset are not cached

use std::sync::Arc;
use std::time::Duration;

use rulesync_core::{
    MockObjectStore, ObjectEntry, RulesetCache, RulesetSyncService, RulesetType, SyncConfig,
    SyncError, TransportError,
};
use tempfile::TempDir;

use super::fixtures::{harness, ruleset, strings, EASYLIST_BODY, EASYLIST_KEY};

#[tokio::test]
async fn test_list_rulesets_parses_and_filters() {
    let h = harness();
    h.store.put("rulesets/privacy/trackers.json", "p1", b"[]");
    h.store.push_listing(ObjectEntry {
        key: "rulesets/privacy/partial.json".to_string(),
        validator: None,
        last_modified: Some(1),
        size: Some(1),
    });
    h.store.put("rulesets/readme.txt", "r1", b"hi");
    h.store.put("rulesets/odd", "x", b"[]");
    h.store.put(EASYLIST_KEY, "e1", EASYLIST_BODY);
    h.store.put("elsewhere/privacy/skip.json", "s1", b"[]");

    let rulesets = h.service.list_rulesets().await.unwrap();
    let ids: Vec<&str> = rulesets.iter().map(|r| r.id.as_str()).collect();

    // "rulesets/readme.txt" has two segments; "rulesets" is an unknown type
    assert_eq!(
        ids,
        vec![
            "rulesets/privacy/trackers.json",
            "rulesets/readme.txt",
            "rulesets/odd",
            EASYLIST_KEY,
        ]
    );
    assert_eq!(rulesets[0].ruleset_type, RulesetType::Privacy);
    assert_eq!(rulesets[1].ruleset_type, RulesetType::Unknown);
    assert_eq!(rulesets[3].ruleset_type, RulesetType::AdBlocking);
    assert_eq!(rulesets[3].validator, "e1");
}

#[tokio::test]
async fn test_list_rulesets_of_type() {
    let h = harness();
    h.store.put("rulesets/privacy/a.json", "1", b"[]");
    h.store.put("rulesets/social/b.json", "1", b"[]");
    h.store.put("rulesets/privacy/c.json", "1", b"[]");

    let privacy = h
        .service
        .list_rulesets_of_type(RulesetType::Privacy)
        .await
        .unwrap();
    assert_eq!(privacy.len(), 2);
    assert!(privacy.iter().all(|r| r.ruleset_type == RulesetType::Privacy));
}

#[tokio::test]
async fn test_list_rulesets_transport_error() {
    let h = harness();
    h.store.inject_error(TransportError::Unauthorized);

    let result = h.service.list_rulesets().await;
    assert!(matches!(
        result,
        Err(SyncError::Transport(TransportError::Unauthorized))
    ));
}

#[tokio::test]
async fn test_get_ruleset_uses_cache_when_validator_matches() {
    let h = harness();
    h.cache.save(&ruleset(EASYLIST_KEY, "tag"), b"[\"cached\"]").unwrap();
    h.store.put(EASYLIST_KEY, "tag", EASYLIST_BODY);

    let body = h.service.get_ruleset(&ruleset(EASYLIST_KEY, "tag")).await.unwrap();

    assert_eq!(body, b"[\"cached\"]");
    assert_eq!(h.store.download_count(), 0);
}

#[tokio::test]
async fn test_get_ruleset_downloads_on_validator_change() {
    let h = harness();
    h.cache.save(&ruleset(EASYLIST_KEY, "0"), b"[]").unwrap();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);

    let body = h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();

    assert_eq!(body, EASYLIST_BODY);
    assert_eq!(h.store.download_count(), 1);
    let cached = h.cache.read(EASYLIST_KEY).unwrap();
    assert_eq!(cached.meta.validator, "1");
    assert_eq!(cached.body, EASYLIST_BODY);

    // Second call is served from the refreshed cache
    h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();
    assert_eq!(h.store.download_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_ruleset_downloads_once() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.store.set_download_delay(Duration::from_millis(200));
    let service = Arc::new(h.service);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await })
        })
        .collect();

    for handle in handles {
        let body = handle.await.unwrap().unwrap();
        assert_eq!(body, EASYLIST_BODY);
    }
    assert_eq!(h.store.download_count(), 1);
    assert_eq!(h.cache.save_count(), 1);
    assert_eq!(service.coordinator().in_flight_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failure_reaches_every_caller() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.store.set_download_delay(Duration::from_millis(200));
    h.store.inject_error(TransportError::Http(503));
    let service = Arc::new(h.service);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(
            result,
            Err(SyncError::Transport(TransportError::Http(503)))
        ));
    }
    assert_eq!(h.store.download_count(), 1);
}

#[tokio::test]
async fn test_download_failure_does_not_write_cache() {
    let h = harness();
    h.cache.save(&ruleset(EASYLIST_KEY, "0"), b"[]").unwrap();
    h.store.inject_error(TransportError::Network("connection reset".to_string()));

    let result = h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await;

    assert!(matches!(result, Err(SyncError::Transport(_))));
    assert_eq!(h.cache.read(EASYLIST_KEY).unwrap().meta.validator, "0");
    assert_eq!(h.cache.save_count(), 1);
}

#[tokio::test]
async fn test_cache_save_failure_still_returns_body() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.cache.set_fail_writes(true);

    let body = h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();

    assert_eq!(body, EASYLIST_BODY);
    assert!(h.cache.read(EASYLIST_KEY).is_none());
}

#[tokio::test]
async fn test_failed_transfer_is_retried_on_next_call() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.store.inject_error(TransportError::Http(500));
    assert!(h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.is_err());

    h.store.clear_error();
    let body = h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();
    assert_eq!(body, EASYLIST_BODY);
    assert_eq!(h.store.download_count(), 2);
}

#[tokio::test]
async fn test_cancelled_waiter_does_not_break_transfer() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.store.set_download_delay(Duration::from_millis(100));

    let target = ruleset(EASYLIST_KEY, "1");
    let wait = h.service.get_ruleset(&target);
    assert!(tokio::time::timeout(Duration::from_millis(10), wait)
        .await
        .is_err());

    // The abandoned transfer still completes and fills the cache
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.service.coordinator().in_flight_count(), 0);
    assert_eq!(h.cache.read(EASYLIST_KEY).unwrap().body, EASYLIST_BODY);

    h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();
    assert_eq!(h.store.download_count(), 1);
}

#[tokio::test]
async fn test_get_content_blocker_applies_exceptions() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.service
        .add_exceptions(&strings(&["Example.com", "*cdn.net"]))
        .unwrap();

    let blocker = h
        .service
        .get_content_blocker(&ruleset(EASYLIST_KEY, "1"))
        .await
        .unwrap();

    assert!(blocker.body.contains(r#""if-domain":["*example.com","*cdn.net"]"#));
    assert_eq!(blocker.exceptions, strings(&["Example.com", "*cdn.net"]));
    assert_eq!(blocker.base_ruleset.validator, "1");
}

#[tokio::test]
async fn test_get_content_blocker_without_exceptions() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);

    let blocker = h
        .service
        .get_content_blocker(&ruleset(EASYLIST_KEY, "1"))
        .await
        .unwrap();

    assert_eq!(blocker.body.as_bytes(), EASYLIST_BODY);
}

#[tokio::test]
async fn test_get_content_blocker_malformed_ruleset() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", b"# hosts file\n0.0.0.0 ads.example\n");

    let result = h
        .service
        .get_content_blocker(&ruleset(EASYLIST_KEY, "1"))
        .await;
    assert!(matches!(result, Err(SyncError::Compile(_))));
}

#[test]
fn test_exception_operations_delegate() {
    let h = harness();

    h.service.add_exceptions(&strings(&["a.com", "b.com", "a.com"])).unwrap();
    h.service.remove_exceptions(&strings(&["a.com"])).unwrap();
    assert_eq!(h.service.get_exceptions().unwrap(), strings(&["b.com"]));

    h.service.remove_all_exceptions().unwrap();
    assert!(h.service.get_exceptions().unwrap().is_empty());

    let writes = h.exceptions.write_count();
    h.service.add_exceptions(&[]).unwrap();
    assert_eq!(h.exceptions.write_count(), writes);
}

#[test]
fn test_exception_write_failure_is_surfaced() {
    let h = harness();
    h.exceptions.set_fail_writes(true);

    let result = h.service.add_exceptions(&strings(&["a.com"]));
    assert!(matches!(result, Err(SyncError::Storage(_))));
    assert!(h.service.get_exceptions().unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_forces_download_and_clears_exceptions() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.service.add_exceptions(&strings(&["a.com"])).unwrap();
    h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();
    assert_eq!(h.store.download_count(), 1);

    h.service.reset().unwrap();

    assert!(h.service.get_exceptions().unwrap().is_empty());
    h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();
    assert_eq!(h.store.download_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_during_download_is_not_undone() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.store.set_download_delay(Duration::from_millis(200));
    let service = Arc::new(h.service);

    let early = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.reset().unwrap();
    assert_eq!(service.coordinator().in_flight_count(), 0);

    // The download started before the reset still answers its caller
    assert_eq!(early.await.unwrap().unwrap(), EASYLIST_BODY);
    assert!(h.cache.read(EASYLIST_KEY).is_none());
    assert_eq!(h.cache.save_count(), 0);

    service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();
    assert_eq!(h.store.download_count(), 2);
    assert!(h.cache.read(EASYLIST_KEY).is_some());
}

#[tokio::test]
async fn test_reset_reports_partial_failure() {
    let h = harness();
    h.store.put(EASYLIST_KEY, "1", EASYLIST_BODY);
    h.service.get_ruleset(&ruleset(EASYLIST_KEY, "1")).await.unwrap();
    h.service.add_exceptions(&strings(&["a.com"])).unwrap();
    h.exceptions.set_fail_writes(true);

    match h.service.reset() {
        Err(SyncError::Reset(err)) => {
            assert!(err.cache.is_none());
            assert!(err.exceptions.is_some());
        }
        other => panic!("expected reset error, got {:?}", other),
    }
    // The cache was still cleared
    assert!(h.cache.is_empty());
}

#[tokio::test]
async fn test_open_with_file_storage() {
    let temp = TempDir::new().unwrap();
    let config = SyncConfig::default()
        .with_storage_path(temp.path())
        .with_prefix("rulesets/");
    let store = Arc::new(MockObjectStore::new());
    store.put(EASYLIST_KEY, "1", EASYLIST_BODY);

    {
        let service = RulesetSyncService::open(&config, store.clone()).unwrap();
        assert_eq!(service.prefix(), "rulesets/");
        let rulesets = service.list_rulesets().await.unwrap();
        assert_eq!(rulesets.len(), 1);
        service.get_ruleset(&rulesets[0]).await.unwrap();
        service.add_exceptions(&strings(&["a.com"])).unwrap();
    }

    // A new service over the same storage reuses cache and exceptions
    let service = RulesetSyncService::open(&config, store.clone()).unwrap();
    let rulesets = service.list_rulesets().await.unwrap();
    let body = service.get_ruleset(&rulesets[0]).await.unwrap();
    assert_eq!(body, EASYLIST_BODY);
    assert_eq!(store.download_count(), 1);
    assert_eq!(service.get_exceptions().unwrap(), strings(&["a.com"]));

    service.reset().unwrap();
    assert!(service.get_exceptions().unwrap().is_empty());
    service.get_ruleset(&rulesets[0]).await.unwrap();
    assert_eq!(store.download_count(), 2);
}
