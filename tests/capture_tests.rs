// SPDX-License-Identifier: MPL-2.0

//! Integration tests for snapshots taken by the default handler

mod common;

use common::MockCamera;
use qrscan::{
    CameraSession, CaptureCoordinator, Code, Config, LoggingHandler, ScanScreen,
    SnapshotConsumer, SnapshotResult,
};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct Collector(Mutex<Vec<SnapshotResult>>);

impl SnapshotConsumer for Collector {
    fn consume(&self, snapshot: &SnapshotResult) {
        self.0.lock().unwrap().push(snapshot.clone());
    }
}

#[tokio::test]
async fn test_snapshot_after_scan() {
    let camera = Arc::new(MockCamera::granted());
    let collector = Arc::new(Collector::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let config = Config {
        team_name: "blue".to_string(),
        ..Config::default()
    };

    let screen = ScanScreen::new(
        camera.clone(),
        Arc::new(LoggingHandler::new(true).with_reporter(tx)),
        &config,
    )
    .with_snapshot_consumer(collector.clone());
    screen.mount().await;

    screen.on_codes_scanned(&[Code::qr("ABC")]).finished().await;

    let handled = rx.recv().await.unwrap();
    assert_eq!(handled.payload, "ABC");
    assert_eq!(handled.team_name, "blue");
    let snapshot = handled.snapshot.unwrap();
    assert_eq!(snapshot.slug, "abc");
    assert!(snapshot.path.to_string_lossy().ends_with("-q85.jpg"));

    assert_eq!(collector.0.lock().unwrap().clone(), vec![snapshot]);
    assert_eq!(camera.snapshot_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_capture_failure_does_not_fail_scan() {
    let camera = Arc::new(MockCamera::granted().failing_snapshots());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let screen = ScanScreen::new(
        camera.clone(),
        Arc::new(LoggingHandler::new(true).with_reporter(tx)),
        &Config::default(),
    );
    screen.mount().await;

    screen.on_codes_scanned(&[Code::qr("ABC")]).finished().await;

    // Handler completed normally, without a snapshot
    let handled = rx.recv().await.unwrap();
    assert_eq!(handled.payload, "ABC");
    assert!(handled.snapshot.is_none());
    assert_eq!(camera.snapshot_calls.load(Ordering::SeqCst), 1);

    assert!(!screen.gate().is_locked());
    assert!(screen.on_codes_scanned(&[Code::qr("XYZ")]).is_admitted());
    screen.wait_idle().await;
}

#[tokio::test]
async fn test_capture_disabled() {
    let camera = Arc::new(MockCamera::granted());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let screen = ScanScreen::new(
        camera.clone(),
        Arc::new(LoggingHandler::new(false).with_reporter(tx)),
        &Config::default(),
    );
    screen.mount().await;

    screen.on_codes_scanned(&[Code::qr("ABC")]).finished().await;
    assert!(rx.recv().await.unwrap().snapshot.is_none());
    assert_eq!(camera.snapshot_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_capture_without_live_session_is_noop() {
    let camera = Arc::new(MockCamera::granted());
    let session: Arc<dyn CameraSession> = camera.clone();
    let coordinator = CaptureCoordinator::new(&session, 85);
    drop(session);
    drop(camera);

    assert!(coordinator.capture("abc").await.is_none());
}

#[tokio::test]
async fn test_quality_is_clamped() {
    let camera = Arc::new(MockCamera::granted());
    let session: Arc<dyn CameraSession> = camera.clone();

    let coordinator = CaptureCoordinator::new(&session, 0);
    assert_eq!(coordinator.quality(), 1);

    let snapshot = CaptureCoordinator::new(&session, 250)
        .capture("x")
        .await
        .unwrap();
    assert!(snapshot.path.to_string_lossy().ends_with("-q100.jpg"));
}
