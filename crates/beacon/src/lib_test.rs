//! End-to-end tests for the wired pipeline

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use beacon_protocol::{EventSerializer, JsonSerializer, Lz4JsonSerializer};

use super::{Beacon, BeaconConfig, DropPolicyConfig, Event};

// ============================================================================
// Test Helpers
// ============================================================================

fn config_in(dir: &TempDir) -> BeaconConfig {
    BeaconConfig {
        directory: dir.path().to_path_buf(),
        capacity: 100,
        base_delay_ms: 1,
        ..Default::default()
    }
}

/// Wait until exactly `count` non-empty segment files exist.
async fn wait_for_files(dir: &Path, count: usize) -> Vec<std::path::PathBuf> {
    for _ in 0..400 {
        let files: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| std::fs::metadata(p).map(|m| m.len() > 0).unwrap_or(false))
            .collect();
        if files.len() == count {
            return files;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {count} non-empty files in {}", dir.display());
}

// ============================================================================
// Tracking & Flushing
// ============================================================================

#[tokio::test]
async fn test_track_flush_persists_roundtrip() {
    let dir = TempDir::new().unwrap();
    let pipeline = Beacon::builder(config_in(&dir)).build();

    pipeline.track(Event::new("app.launch").with_attribute("cold_start", true));
    pipeline.track(Event::new("screen.view").with_attribute("screen", "home"));
    pipeline.flush().await;

    let files = wait_for_files(dir.path(), 1).await;
    let bytes = std::fs::read(&files[0]).unwrap();
    let decoded = JsonSerializer::new().decode(&bytes).unwrap();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].name, "app.launch");
    assert_eq!(decoded[1].name, "screen.view");

    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_compressed_pipeline_roundtrip() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.compression = true;
    let pipeline = Beacon::builder(config).build();

    pipeline.track(Event::new("network.request").with_attribute("status", 200i64));
    pipeline.flush().await;

    let files = wait_for_files(dir.path(), 1).await;
    let bytes = std::fs::read(&files[0]).unwrap();
    let decoded = Lz4JsonSerializer::new().decode(&bytes).unwrap();

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].name, "network.request");

    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_flush_without_events_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let pipeline = Beacon::builder(config_in(&dir)).build();

    pipeline.flush().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    pipeline.shutdown().await;
}

// ============================================================================
// Overload Behavior
// ============================================================================

#[tokio::test]
async fn test_overload_is_bounded_and_observable() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.capacity = 10;
    config.drop_policy = DropPolicyConfig::DropNewest;
    let pipeline = Beacon::builder(config).build();

    for i in 0..25 {
        pipeline.track(Event::new(format!("e{i}")));
    }

    assert_eq!(pipeline.buffered_len(), 10);
    assert_eq!(pipeline.dropped_count(), 15);

    pipeline.shutdown().await;
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_shutdown_flushes_remaining_events() {
    let dir = TempDir::new().unwrap();
    let pipeline = Beacon::builder(config_in(&dir)).build();
    pipeline.start();

    pipeline.track(Event::new("app.exit"));
    pipeline.shutdown().await;

    let files = wait_for_files(dir.path(), 1).await;
    let decoded = JsonSerializer::new()
        .decode(&std::fs::read(&files[0]).unwrap())
        .unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].name, "app.exit");
}

#[tokio::test]
async fn test_start_is_replaceable_and_shutdown_idempotent() {
    let dir = TempDir::new().unwrap();
    let pipeline = Beacon::builder(config_in(&dir)).build();

    pipeline.start();
    pipeline.start();
    pipeline.shutdown().await;
    pipeline.shutdown().await;
}
