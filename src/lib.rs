// SPDX-License-Identifier: MPL-2.0

//! qrscan - a single-screen QR code scanner
//!
//! The crate is the scan-processing core of a camera screen: it turns
//! permission state into a ready flag, gates a stream of detection batches
//! so only one code handler runs at a time, takes an optional snapshot
//! after each handled code, and exposes a torch toggle.
//!
//! # Architecture
//!
//! - [`app`]: the scan screen and its components
//! - [`backends`]: camera session abstraction and the image-folder camera
//! - [`flash`]: sysfs torch LEDs
//! - [`config`]: user configuration
//! - [`errors`]: error taxonomy
//!
//! # Example
//!
//! ```ignore
//! let camera: Arc<dyn CameraSession> = Arc::new(FolderCamera::open(dir, snaps, interval)?);
//! let screen = ScanScreen::new(camera, Arc::new(LoggingHandler::new(true)), &Config::default());
//! screen.mount().await;
//! screen.on_codes_scanned(&[Code::qr("ABC")]);
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;

// Re-export commonly used types
pub use app::capture::{CaptureCoordinator, SnapshotConsumer, SnapshotResult};
pub use app::handler::{
    CodeHandler, HandledScan, LoggingHandler, ScanRequest, SessionContext, SessionHandle,
    handler_fn,
};
pub use app::state::{ReadinessState, ScreenState, ScreenView};
pub use app::{Admission, ScanScreen};
pub use backends::camera::{
    CameraSession, Code, CodeType, DetectionBatch, FolderCamera, PermissionStatus, Snapshot,
    TorchState,
};
pub use config::Config;
pub use errors::{AppError, AppResult, BackendError, ScanError};
