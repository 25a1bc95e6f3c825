// core/tests/test_cache.rs
use std::sync::Arc;

use cardiowatch_core::{
    ActivityId, ActivityStats, CacheConfig, FileStore, KeyValueStore, MemoryStore, WatchStatsCache,
};

fn config(dir: &std::path::Path) -> CacheConfig {
    CacheConfig {
        data_dir: dir.to_path_buf(),
        persist_interval_ms: 60_000, // tester bruker flush() eksplisitt
        ..Default::default()
    }
}

fn stats(active: f64) -> ActivityStats {
    ActivityStats {
        active_calories: Some(active),
        basal_calories: Some(12.0),
        avg_heart_rate: Some(128.0),
        max_heart_rate: Some(161.0),
        start_time: 1_700_000_000_000.0,
        end_time: 1_700_000_900_000.0,
        ..Default::default()
    }
}

#[test]
fn set_persist_reload_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let v = stats(210.0);

    {
        let cache = WatchStatsCache::new(Arc::new(FileStore::new(dir.path())), &cfg);
        cache.set(ActivityId::from(42_i64), Some(v.clone()));
        assert!(cache.flush(), "flush skulle lykkes");
    }

    // Ny "prosess": tom cache til init() er kjørt
    let cache = WatchStatsCache::new(Arc::new(FileStore::new(dir.path())), &cfg);
    assert!(cache.get(&ActivityId::from(42_i64)).is_none());
    assert_eq!(cache.init(), 1);
    assert_eq!(cache.get(&ActivityId::from(42_i64)), Some(v));
}

#[test]
fn int_and_string_ids_are_the_same_key() {
    let cache = WatchStatsCache::new(Arc::new(MemoryStore::new()), &CacheConfig::default());
    cache.set(ActivityId::from(7_i64), Some(stats(1.0)));
    assert_eq!(cache.get(&ActivityId::from("7")), Some(stats(1.0)));
}

#[test]
fn set_none_removes_entry() {
    let cache = WatchStatsCache::new(Arc::new(MemoryStore::new()), &CacheConfig::default());
    let id = ActivityId::from(3_i64);
    cache.set(id.clone(), Some(stats(10.0)));
    cache.set(id.clone(), None);
    assert!(cache.get(&id).is_none());

    // Også uten tidligere verdi
    cache.set(ActivityId::from(99_i64), None);
    assert!(cache.get(&ActivityId::from(99_i64)).is_none());
}

#[test]
fn last_write_wins_per_key() {
    let cache = WatchStatsCache::new(Arc::new(MemoryStore::new()), &CacheConfig::default());
    let id = ActivityId::from(1_i64);
    for i in 0..5 {
        cache.set(id.clone(), Some(stats(i as f64)));
    }
    assert_eq!(cache.get(&id).unwrap().active_calories, Some(4.0));
}

#[test]
fn clear_all_resets_every_key_and_durable_copy() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let store = Arc::new(FileStore::new(dir.path()));
    let cache = WatchStatsCache::new(store.clone(), &cfg);

    let ids: Vec<ActivityId> = (1..=3_i64).map(ActivityId::from).collect();
    for id in &ids {
        cache.set(id.clone(), Some(stats(5.0)));
    }
    assert!(cache.flush());
    assert!(store.get_item(&cfg.stats_key).unwrap().is_some());

    cache.clear_all();
    for id in &ids {
        assert!(cache.get(id).is_none(), "{id} skulle være borte");
    }
    assert!(cache.is_empty());
    assert!(store.get_item(&cfg.stats_key).unwrap().is_none());
}

#[test]
fn clear_all_discards_pending_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let cfg = CacheConfig::default();
    let cache = WatchStatsCache::new(store.clone(), &cfg);
    cache.set(ActivityId::from(1_i64), Some(stats(5.0)));
    cache.clear_all();
    assert!(cache.flush());
    assert!(store.get_item(&cfg.stats_key).unwrap().is_none());
}

#[test]
fn malformed_durable_payload_starts_empty() {
    let store = Arc::new(MemoryStore::new());
    let cfg = CacheConfig::default();
    store.set_item(&cfg.stats_key, "{ dette er ikke json").unwrap();

    let cache = WatchStatsCache::new(store, &cfg);
    assert_eq!(cache.init(), 0);
    assert!(cache.is_empty());
}

#[test]
fn init_overwrites_same_key_and_keeps_others() {
    let store = Arc::new(MemoryStore::new());
    let cfg = CacheConfig::default();
    store
        .set_item(&cfg.stats_key, r#"{"1": {"activeCalories": 99, "startTime": 0, "endTime": 0}}"#)
        .unwrap();

    let cache = WatchStatsCache::new(store, &cfg);
    cache.set(ActivityId::from(1_i64), Some(stats(1.0)));
    cache.set(ActivityId::from(2_i64), Some(stats(2.0)));
    assert_eq!(cache.init(), 1);

    assert_eq!(cache.get(&ActivityId::from(1_i64)).unwrap().active_calories, Some(99.0));
    assert_eq!(cache.get(&ActivityId::from(2_i64)), Some(stats(2.0)));
}

#[test]
fn missing_file_store_dir_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("finnes").join("ikke");
    let cache = WatchStatsCache::new(Arc::new(FileStore::new(&nested)), &config(&nested));
    assert_eq!(cache.init(), 0);
    cache.set(ActivityId::from(8_i64), Some(stats(8.0)));
    assert!(cache.flush());
    assert!(nested.exists());
}

#[test]
fn fractional_timestamps_in_durable_map_are_loaded() {
    let store = Arc::new(MemoryStore::new());
    let cfg = CacheConfig::default();
    store
        .set_item(
            &cfg.stats_key,
            r#"{"1": {"activeCalories": 50, "startTime": 1700000000123.5, "endTime": 1700000600000.25},
                "2": {"activeCalories": 70, "startTime": 1700000000000, "endTime": 1700000300000}}"#,
        )
        .unwrap();

    let cache = WatchStatsCache::new(store, &cfg);
    assert_eq!(cache.init(), 2);
    assert_eq!(cache.get(&ActivityId::from(1_i64)).unwrap().start_time, 1_700_000_000_123.5);
    assert_eq!(cache.get(&ActivityId::from(2_i64)).unwrap().duration().num_minutes(), 5);
}
