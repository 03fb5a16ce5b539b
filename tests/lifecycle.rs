// End-to-end entry lifecycle against a real directory.

use chrono::Duration;
use serde_json::json;
use tempfile::TempDir;
use ttlcache::{CacheError, DeleteOutcome, Encoding, FileCache, FileCacheConfig, ManualClock};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_user_entry_expires_after_a_minute() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::starting_now();
    let cache = FileCache::builder(temp_dir.path())
        .encoding(Encoding::Json)
        .clock(clock.clone())
        .build();

    assert!(cache.set("user:1", &json!({"id": 1}), 1));
    let path = temp_dir.path().join("user_1.cache");
    assert!(path.exists());
    assert_eq!(cache.get::<serde_json::Value>("user:1"), Some(json!({"id": 1})));

    clock.advance(Duration::seconds(61));

    assert_eq!(cache.get::<serde_json::Value>("user:1"), None);
    assert!(!path.exists());
}

#[test]
fn test_state_machine_for_one_name() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::starting_now();
    let cache = FileCacheConfig::new(temp_dir.path()).build().with_clock(clock.clone());

    // Absent -> Live
    assert!(cache.get::<String>("greeting").is_none());
    assert!(cache.set("greeting", "hello", 2));
    assert_eq!(cache.get::<String>("greeting").as_deref(), Some("hello"));

    // Live -> Live
    assert!(cache.set("greeting", "hi", 2));
    assert_eq!(cache.get::<String>("greeting").as_deref(), Some("hi"));

    // Live -> Absent by delete
    assert_eq!(cache.delete("greeting"), DeleteOutcome::Deleted);
    assert_eq!(cache.delete("greeting"), DeleteOutcome::NotFound);

    // Live -> Absent by expiry
    assert!(cache.set("greeting", "hey", 2));
    clock.advance(Duration::minutes(2));
    assert!(!cache.contains("greeting"));
    assert!(matches!(
        cache.try_get::<String>("greeting"),
        Err(CacheError::FileMissing(_))
    ));
}

#[test]
fn test_remember_persists_computed_value() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCache::new(temp_dir.path(), "json").with_encoding(Encoding::Json);
    let mut calls = 0;

    let mut compute = || {
        calls += 1;
        vec!["a/b".to_string(), "ü".to_string()]
    };
    let first = cache.remember("list", 30, &mut compute);
    let second = cache.remember("list", 30, &mut compute);

    assert_eq!(first, second);
    assert_eq!(calls, 1);

    let text = std::fs::read_to_string(temp_dir.path().join("list.json")).unwrap();
    assert!(text.contains(r#"["a/b","ü"]"#));
}

#[test]
fn test_set_default_uses_configured_ttl() {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::starting_now();
    let cache = FileCache::builder(temp_dir.path())
        .default_ttl_minutes(10)
        .clock(clock.clone())
        .build();

    assert!(cache.set_default("n", &5u64));
    let entry = cache.entry::<u64>("n").unwrap();
    assert_eq!(entry.expires_in - entry.created_at, Duration::minutes(10));

    clock.advance(Duration::minutes(10));
    assert_eq!(cache.get::<u64>("n"), None);
}

#[test]
fn test_ensure_directory_enables_writes() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCache::new(temp_dir.path().join("nested/dir"), "cache");

    assert!(!cache.set("k", &1, 5));
    cache.ensure_directory().unwrap();
    assert!(cache.set("k", &1, 5));
    assert_eq!(cache.get::<i32>("k"), Some(1));
}
