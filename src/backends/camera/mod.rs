// SPDX-License-Identifier: MPL-2.0

//! Camera session abstraction
//!
//! The scanner never talks to a camera driver directly. Everything it needs
//! from the device (permission, availability, snapshots, torch) goes through
//! the [`CameraSession`] trait.
//!
//! ```text
//! ┌─────────────────────┐
//! │   ScanScreen (app)  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraSession trait │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!     ┌──────────────┐
//!     │ FolderCamera │  ← Frames from image files
//!     └──────────────┘
//! ```

pub mod folder;
pub mod types;

pub use crate::errors::{BackendError, BackendResult};
pub use folder::FolderCamera;
pub use types::*;

use futures::future::BoxFuture;

/// Everything the scanner consumes from a live camera
///
/// Async operations return boxed futures so sessions can be shared as
/// `Arc<dyn CameraSession>`.
pub trait CameraSession: Send + Sync {
    /// Current permission status, in whatever shape the platform reports it
    fn permission_status(&self) -> PermissionStatus;

    /// Prompt for permission
    ///
    /// Returns `None` when the platform exposes no request call.
    fn request_permission(&self) -> Option<BoxFuture<'_, PermissionStatus>>;

    /// Whether a camera device is present
    fn device_available(&self) -> bool;

    /// Capture a still image at the given JPEG quality (1-100)
    ///
    /// The image is the session's current view, not the frame a handled code
    /// was decoded from; on a moving feed the two can differ.
    fn take_snapshot(&self, quality: u8) -> BoxFuture<'_, BackendResult<Snapshot>>;

    /// Switch the torch; fire-and-forget from the caller's perspective
    ///
    /// Must not block: called on the runtime thread during toggles.
    fn set_torch(&self, state: TorchState);
}
