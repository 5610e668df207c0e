//! Tests for FileResultCache

use chrono::{Duration, Utc};
use serde_json::json;
use tempfile::TempDir;

use crate::core::Fingerprint;
use crate::services::FileResultCache;
use crate::traits::{CacheEntry, ResultCache};

fn key(raw: &str) -> Fingerprint {
    Fingerprint::from_raw(raw)
}

fn aged_entry(fingerprint: &Fingerprint, days: i64) -> CacheEntry {
    CacheEntry {
        fingerprint: fingerprint.as_str().to_string(),
        payload: json!([1, 2, 3]),
        computed_at: Utc::now() - Duration::days(days),
    }
}

#[tokio::test]
async fn test_miss_on_empty_cache() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path().join("cache"));
    assert_eq!(cache.lookup(&key("k")).await.unwrap(), None);
}

#[tokio::test]
async fn test_store_then_lookup() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path());
    let fingerprint = key(r#"{"attributes":[{"name":"age"}]}"#);

    cache.store(&fingerprint, json!({ "counts": [5, 7] })).await.unwrap();

    let entry = cache.lookup(&fingerprint).await.unwrap().unwrap();
    assert_eq!(entry.payload, json!({ "counts": [5, 7] }));
    assert!(Utc::now() - entry.computed_at < Duration::minutes(1));
    assert!(dir.path().join(format!("{}.json", fingerprint.digest())).exists());
}

#[tokio::test]
async fn test_store_overwrites_existing_entry() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path());
    let fingerprint = key("k");

    cache.store(&fingerprint, json!("first")).await.unwrap();
    cache.store(&fingerprint, json!("second")).await.unwrap();

    assert_eq!(cache.lookup(&fingerprint).await.unwrap().unwrap().payload, json!("second"));
}

#[tokio::test]
async fn test_entry_older_than_ttl_is_removed_and_missed() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path());
    let fingerprint = key("stale");

    cache.store_entry(&fingerprint, &aged_entry(&fingerprint, 31)).await.unwrap();
    let path = dir.path().join(format!("{}.json", fingerprint.digest()));
    assert!(path.exists());

    assert_eq!(cache.lookup(&fingerprint).await.unwrap(), None);
    assert!(!path.exists(), "expired entry should be deleted");
}

#[tokio::test]
async fn test_entry_within_ttl_is_served() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path());
    let fingerprint = key("fresh");

    cache.store_entry(&fingerprint, &aged_entry(&fingerprint, 29)).await.unwrap();
    assert!(cache.lookup(&fingerprint).await.unwrap().is_some());
}

#[tokio::test]
async fn test_custom_ttl() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path()).with_ttl(Duration::days(1));
    let fingerprint = key("short");

    cache.store_entry(&fingerprint, &aged_entry(&fingerprint, 2)).await.unwrap();
    assert_eq!(cache.lookup(&fingerprint).await.unwrap(), None);
}

#[tokio::test]
async fn test_mismatched_fingerprint_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path());
    let fingerprint = key("mine");

    let mut entry = aged_entry(&fingerprint, 0);
    entry.fingerprint = "someone else".to_string();
    cache.store_entry(&fingerprint, &entry).await.unwrap();

    assert_eq!(cache.lookup(&fingerprint).await.unwrap(), None);
}

#[tokio::test]
async fn test_corrupt_entry_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let cache = FileResultCache::new(dir.path());
    let fingerprint = key("corrupt");

    tokio::fs::write(dir.path().join(format!("{}.json", fingerprint.digest())), b"not json")
        .await
        .unwrap();
    assert!(cache.lookup(&fingerprint).await.is_err());
}
