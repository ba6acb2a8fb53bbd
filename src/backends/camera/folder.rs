// SPDX-License-Identifier: GPL-3.0-only

//! Image-folder camera
//!
//! A [`CameraSession`] that replays still images from a directory as camera
//! frames. Useful for headless scanning and for exercising the scanner
//! without hardware. Torch requests are forwarded to sysfs flash LEDs when
//! any were handed in.

use super::types::{CameraFrame, DetectionBatch, PermissionStatus, Snapshot, TorchState};
use super::{BackendError, BackendResult, CameraSession};
use crate::app::frame_processor::QrDetector;
use crate::constants::FRAME_EXTENSIONS;
use crate::flash::{self, FlashDevice};
use futures::Stream;
use futures::future::BoxFuture;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct FolderCamera {
    frames: Vec<PathBuf>,
    frame_interval: Duration,
    snapshot_dir: PathBuf,
    current: watch::Sender<Option<Arc<CameraFrame>>>,
    torch: watch::Sender<TorchState>,
    flash_devices: Arc<[FlashDevice]>,
    /// Serializes LED writes issued from blocking tasks
    flash_lock: Arc<Mutex<()>>,
}

impl FolderCamera {
    /// Open a directory of frames, sorted by file name
    pub fn open(
        dir: &Path,
        snapshot_dir: PathBuf,
        frame_interval: Duration,
    ) -> BackendResult<Self> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| BackendError::DeviceNotFound(format!("{}: {}", dir.display(), e)))?;

        let mut frames: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| is_frame_file(path))
            .collect();
        frames.sort();

        info!(dir = %dir.display(), frames = frames.len(), "Opened image-folder camera");

        Ok(Self {
            frames,
            frame_interval,
            snapshot_dir,
            current: watch::Sender::new(None),
            torch: watch::Sender::new(TorchState::Off),
            flash_devices: Arc::from(Vec::new()),
            flash_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Forward torch changes to these LEDs
    pub fn with_flash_devices(mut self, devices: Vec<FlashDevice>) -> Self {
        self.flash_devices = Arc::from(devices);
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Torch state last requested through [`CameraSession::set_torch`]
    pub fn torch_state(&self) -> TorchState {
        *self.torch.borrow()
    }

    /// Stream one detection batch per frame, in file order
    ///
    /// Frames that fail to load are skipped. The stream ends after the last
    /// frame.
    pub fn detections(
        self: &Arc<Self>,
        detector: QrDetector,
    ) -> impl Stream<Item = DetectionBatch> + Send + 'static {
        let camera = Arc::clone(self);

        async_stream::stream! {
            for (index, path) in camera.frames.iter().enumerate() {
                if index > 0 {
                    tokio::time::sleep(camera.frame_interval).await;
                }

                let frame = match load_frame(path.clone()).await {
                    Ok(frame) => Arc::new(frame),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable frame");
                        continue;
                    }
                };

                camera.current.send_replace(Some(Arc::clone(&frame)));
                let batch = detector.detect(frame).await;
                debug!(path = %path.display(), codes = batch.len(), "Frame analyzed");
                yield batch;
            }
        }
    }
}

impl CameraSession for FolderCamera {
    fn permission_status(&self) -> PermissionStatus {
        // Reading files needs no camera permission
        PermissionStatus::Flag(true)
    }

    fn request_permission(&self) -> Option<BoxFuture<'_, PermissionStatus>> {
        None
    }

    fn device_available(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Encode the most recently streamed frame
    ///
    /// This is whatever frame the detection stream loaded last, which may be
    /// newer than the frame the handled code was decoded from.
    fn take_snapshot(&self, quality: u8) -> BoxFuture<'_, BackendResult<Snapshot>> {
        let frame = self.current.borrow().clone();
        let dir = self.snapshot_dir.clone();
        let no_frames = self.frames.is_empty();

        Box::pin(async move {
            if no_frames {
                return Err(BackendError::NotAvailable("Image folder has no frames".to_string()));
            }
            let frame = frame.ok_or_else(|| {
                BackendError::CaptureFailed("No frame available for capture".to_string())
            })?;

            tokio::task::spawn_blocking(move || write_jpeg(&frame, &dir, quality))
                .await
                .map_err(|e| BackendError::Other(format!("Snapshot task failed: {}", e)))?
        })
    }

    fn set_torch(&self, state: TorchState) {
        self.torch.send_replace(state);
        if self.flash_devices.is_empty() {
            return;
        }

        // Writes apply the latest requested state, not `state`
        let devices = Arc::clone(&self.flash_devices);
        let lock = Arc::clone(&self.flash_lock);
        let requested = self.torch.subscribe();
        let write = move || {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            let state = *requested.borrow();
            flash::apply_all(&devices, state);
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(write);
            }
            Err(_) => write(),
        }
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| FRAME_EXTENSIONS.iter().any(|f| ext.eq_ignore_ascii_case(f)))
}

/// Decode an image file into an RGBA frame
pub async fn load_frame(path: PathBuf) -> BackendResult<CameraFrame> {
    tokio::task::spawn_blocking(move || -> BackendResult<CameraFrame> {
        let rgba = image::open(&path)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(CameraFrame {
            width,
            height,
            data: Arc::from(rgba.into_raw()),
            captured_at: Instant::now(),
        })
    })
    .await
    .map_err(|e| BackendError::Other(format!("Frame load task failed: {}", e)))?
}

fn write_jpeg(frame: &CameraFrame, dir: &Path, quality: u8) -> BackendResult<Snapshot> {
    let rgba = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.to_vec())
        .ok_or_else(|| BackendError::CaptureFailed("Frame size mismatch".to_string()))?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    std::fs::create_dir_all(dir)?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let path = dir.join(format!("snapshot_{}.jpg", timestamp));

    let file = std::fs::File::create(&path)?;
    let mut writer = std::io::BufWriter::new(file);
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
    encoder.encode_image(&rgb)?;
    writer.flush()?;

    debug!(path = %path.display(), quality, "Snapshot written");
    Ok(Snapshot { path })
}
