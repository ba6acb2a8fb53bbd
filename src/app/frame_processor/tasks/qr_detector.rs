// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Converts camera frames to grayscale and decodes every QR grid with rqrr.
//! Grids that fail to decode are dropped here, so decoder errors never reach
//! the scan gate.

use crate::backends::camera::types::{CameraFrame, Code, DetectionBatch};
use crate::constants::DETECTOR_MAX_DIMENSION;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// QR code detector
///
/// Frames larger than `max_dimension` are sampled down before detection.
pub struct QrDetector {
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    pub fn new() -> Self {
        Self {
            max_dimension: DETECTOR_MAX_DIMENSION,
        }
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Detect QR codes in a camera frame
    ///
    /// Runs on a blocking task to keep the async runtime responsive.
    pub async fn detect(&self, frame: Arc<CameraFrame>) -> DetectionBatch {
        let max_dim = self.max_dimension;

        tokio::task::spawn_blocking(move || detect_sync(&frame, max_dim))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR detection task panicked");
                Vec::new()
            })
    }
}

/// Synchronous QR detection
pub fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> DetectionBatch {
    if frame.width == 0 || frame.height == 0 {
        return Vec::new();
    }

    let start = std::time::Instant::now();
    let (proc_width, proc_height, scale) = scaled_size(frame.width, frame.height, max_dimension);

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(proc_width as usize, proc_height as usize, |x, y| {
            let src_x = ((x as f32 * scale) as u32).min(frame.width - 1);
            let src_y = ((y as f32 * scale) as u32).min(frame.height - 1);
            frame.luma(src_x, src_y)
        });

    let grids = prepared.detect_grids();
    trace!(
        proc_width,
        proc_height,
        scale,
        grids = grids.len(),
        detection_ms = start.elapsed().as_millis(),
        "QR grid search complete"
    );

    let mut batch = Vec::with_capacity(grids.len());
    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => {
                debug!(content = %content, "Detected QR code");
                batch.push(Code::qr(content));
            }
            Err(e) => {
                debug!(error = ?e, "Failed to decode QR code");
            }
        }
    }

    batch
}

/// Processing size for a frame and the source pixels per processed pixel
fn scaled_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32, f32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height, 1.0);
    }
    let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
    let new_width = ((width as f32 / scale) as u32).max(1);
    let new_height = ((height as f32 / scale) as u32).max(1);
    (new_width, new_height, scale)
}
