// SPDX-License-Identifier: MPL-2.0

//! Shared test fixtures: a scripted camera session, a gated handler and QR images

#![allow(dead_code)]

use futures::future::BoxFuture;
use qrscan::{
    AppError, BackendError, CameraSession, CodeHandler, PermissionStatus, ScanRequest, Snapshot,
    TorchState,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Camera session with scripted permission, snapshot and torch behavior
pub struct MockCamera {
    pub status: PermissionStatus,
    /// Delay and outcome of the permission request; `None` = no request exposed
    pub request: Option<(Duration, PermissionStatus)>,
    pub available: bool,
    pub snapshot_fails: bool,
    pub request_calls: AtomicUsize,
    pub snapshot_calls: AtomicUsize,
    pub torch_calls: Mutex<Vec<TorchState>>,
}

impl MockCamera {
    pub fn granted() -> Self {
        Self {
            status: PermissionStatus::Flag(true),
            request: None,
            available: true,
            snapshot_fails: false,
            request_calls: AtomicUsize::new(0),
            snapshot_calls: AtomicUsize::new(0),
            torch_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(mut self, status: PermissionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_request(mut self, delay: Duration, outcome: PermissionStatus) -> Self {
        self.request = Some((delay, outcome));
        self
    }

    pub fn without_device(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn failing_snapshots(mut self) -> Self {
        self.snapshot_fails = true;
        self
    }

    pub fn torch_history(&self) -> Vec<TorchState> {
        self.torch_calls.lock().unwrap().clone()
    }
}

impl CameraSession for MockCamera {
    fn permission_status(&self) -> PermissionStatus {
        self.status.clone()
    }

    fn request_permission(&self) -> Option<BoxFuture<'_, PermissionStatus>> {
        let (delay, outcome) = self.request.clone()?;
        Some(Box::pin(async move {
            self.request_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            outcome
        }))
    }

    fn device_available(&self) -> bool {
        self.available
    }

    fn take_snapshot(&self, quality: u8) -> BoxFuture<'_, Result<Snapshot, BackendError>> {
        let n = self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        let fails = self.snapshot_fails;
        Box::pin(async move {
            if fails {
                Err(BackendError::CaptureFailed("camera busy".to_string()))
            } else {
                Ok(Snapshot {
                    path: PathBuf::from(format!("/tmp/snapshot-{}-q{}.jpg", n, quality)),
                })
            }
        })
    }

    fn set_torch(&self, state: TorchState) {
        self.torch_calls.lock().unwrap().push(state);
    }
}

/// What a [`GatedHandler`] should do once released
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    Fail,
    Panic,
    /// Never finish
    Hang,
}

/// Handler that records each call and blocks until the test releases it
pub struct GatedHandler {
    pub calls: Mutex<Vec<(String, String)>>,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub release: Semaphore,
    pub outcome: Mutex<Outcome>,
}

impl GatedHandler {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            release: Semaphore::new(0),
            outcome: Mutex::new(outcome),
        })
    }

    /// Handler that never blocks
    pub fn open(outcome: Outcome) -> Arc<Self> {
        let handler = Self::new(outcome);
        handler.release.add_permits(Semaphore::MAX_PERMITS / 2);
        handler
    }

    pub fn release_one(&self) {
        self.release.add_permits(1);
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn payloads(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn teams(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

impl CodeHandler for GatedHandler {
    fn handle(&self, request: ScanRequest) -> BoxFuture<'_, Result<(), AppError>> {
        self.calls
            .lock()
            .unwrap()
            .push((request.payload.clone(), request.session.team_name.clone()));
        let outcome = *self.outcome.lock().unwrap();
        if outcome == Outcome::Panic {
            panic!("handler exploded on {}", request.payload);
        }

        Box::pin(async move {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);

            if outcome == Outcome::Hang {
                std::future::pending::<()>().await;
            }
            if let Ok(permit) = self.release.acquire().await {
                permit.forget();
            }

            self.active.fetch_sub(1, Ordering::SeqCst);
            match outcome {
                Outcome::Fail => Err(AppError::Other("lookup failed".to_string())),
                _ => Ok(()),
            }
        })
    }
}

/// Payload of [`QR_NUMERIC`]
pub const QR_NUMERIC_PAYLOAD: &str = "4376471154038";

/// Version 1-M QR code, numeric mode, one string per module row (`#` = dark)
pub const QR_NUMERIC: [&str; 21] = [
    "#######.....#.#######",
    "#.....#..#....#.....#",
    "#.###.#...##..#.###.#",
    "#.###.#...#...#.###.#",
    "#.###.#..####.#.###.#",
    "#.....#.#.#...#.....#",
    "#######.#.#.#.#######",
    ".........#...........",
    "#..#.##.######.#.....",
    "###.#..##..#.#.#.##..",
    "#..#.####.##..###...#",
    "..#.#..#....#####....",
    "..#...##.#.#.###.##..",
    "........#.#..####.##.",
    "#######...###.#.####.",
    "#.....#.#.....##....#",
    "#.###.#..##.###..#.##",
    "#.###.#.#.#..####..##",
    "#.###.#..###.###.#..#",
    "#.....#..####..##..#.",
    "#######.###..#.###...",
];

/// Fresh directory under the system temp dir
pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("qrscan-{}-{}", tag, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Render a module grid as a black-on-white PNG with a four-module quiet zone
pub fn write_qr_png(path: &Path, grid: &[&str], module_px: u32) {
    let quiet = 4;
    let size = (grid.len() as u32 + 2 * quiet) * module_px;
    image::GrayImage::from_fn(size, size, |x, y| {
        let col = (x / module_px).checked_sub(quiet);
        let row = (y / module_px).checked_sub(quiet);
        let dark = match (row, col) {
            (Some(row), Some(col)) => grid
                .get(row as usize)
                .and_then(|line| line.as_bytes().get(col as usize))
                .is_some_and(|module| *module == b'#'),
            _ => false,
        };
        image::Luma([if dark { 0 } else { 255 }])
    })
    .save(path)
    .unwrap();
}

pub fn write_blank_png(path: &Path, size: u32) {
    image::GrayImage::from_pixel(size, size, image::Luma([255]))
        .save(path)
        .unwrap();
}
