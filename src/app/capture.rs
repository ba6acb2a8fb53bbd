// SPDX-License-Identifier: MPL-2.0

//! Capture coordinator
//!
//! Best-effort still capture after a handled scan. A missing camera session
//! makes this a no-op and a failing capture is logged and dropped; neither
//! reaches the code handler as an error.

use crate::backends::camera::CameraSession;
use crate::constants::MAX_SLUG_LEN;
use crate::errors::ScanError;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Captured still plus the slug it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResult {
    pub path: PathBuf,
    pub slug: String,
}

/// Receives every snapshot the coordinator produces
pub trait SnapshotConsumer: Send + Sync {
    fn consume(&self, snapshot: &SnapshotResult);
}

#[derive(Clone)]
pub struct CaptureCoordinator {
    session: Weak<dyn CameraSession>,
    quality: u8,
    consumer: Option<Arc<dyn SnapshotConsumer>>,
}

impl CaptureCoordinator {
    pub fn new(session: &Arc<dyn CameraSession>, quality: u8) -> Self {
        Self {
            session: Arc::downgrade(session),
            quality: quality.clamp(1, 100),
            consumer: None,
        }
    }

    pub fn with_consumer(mut self, consumer: Arc<dyn SnapshotConsumer>) -> Self {
        self.consumer = Some(consumer);
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Take a snapshot tagged with `slug`
    ///
    /// Returns `None` when the session is gone or the capture failed.
    pub async fn capture(&self, slug: &str) -> Option<SnapshotResult> {
        let Some(session) = self.session.upgrade() else {
            debug!(slug, "Camera session gone, skipping snapshot");
            return None;
        };

        match session.take_snapshot(self.quality).await {
            Ok(snapshot) => {
                let result = SnapshotResult {
                    path: snapshot.path,
                    slug: slug.to_string(),
                };
                info!(path = %result.path.display(), slug, "Snapshot captured");
                if let Some(consumer) = &self.consumer {
                    consumer.consume(&result);
                }
                Some(result)
            }
            Err(e) => {
                let err = ScanError::CaptureFailure(e.to_string());
                warn!(error = %err, slug, "Snapshot failed");
                None
            }
        }
    }
}

/// File-name friendly slug for a payload
///
/// Lowercase ASCII alphanumerics, everything else folded into single dashes.
pub fn slugify(payload: &str) -> String {
    let mut slug = String::with_capacity(payload.len().min(MAX_SLUG_LEN));
    for c in payload.chars() {
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "scan".to_string()
    } else {
        trimmed.to_string()
    }
}
