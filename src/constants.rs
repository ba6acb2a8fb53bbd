// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// JPEG quality requested from the camera for scan snapshots
pub const DEFAULT_SNAPSHOT_QUALITY: u8 = 85;

/// Delay between frames delivered by the image-folder camera
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Permission values that count as granted when the platform reports a string
pub const GRANTED_PERMISSION_NAMES: [&str; 2] = ["authorized", "granted"];

/// Maximum slug length used when naming snapshot files
pub const MAX_SLUG_LEN: usize = 48;

/// Directory name used under the user's config and pictures directories
pub const APP_DIR_NAME: &str = "qrscan";

/// Frame file extensions the image-folder camera accepts
pub const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Largest frame edge passed to the QR detector; bigger frames are downscaled
pub const DETECTOR_MAX_DIMENSION: u32 = 1280;
