// SPDX-License-Identifier: MPL-2.0

//! Error types for the scanner

use std::fmt;
use std::time::Duration;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Scan-processing errors
    Scan(ScanError),
    /// Camera collaborator errors
    Backend(BackendError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Failures that can occur while turning a detection into a handled scan.
///
/// None of these are fatal. They are logged where they happen and the
/// screen stays scannable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Camera permission was denied (readiness still resolves)
    PermissionDenied,
    /// No camera device is present
    DeviceUnavailable,
    /// The code handler returned an error or panicked
    HandlerFailure(String),
    /// The snapshot call failed
    CaptureFailure(String),
    /// The code handler exceeded the configured timeout
    HandlerTimeout(Duration),
}

/// Errors reported by a camera session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Still capture failed
    CaptureFailed(String),
    /// General I/O error
    Io(String),
    /// Other errors
    Other(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Scan(e) => write!(f, "Scan error: {}", e),
            AppError::Backend(e) => write!(f, "Camera error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::PermissionDenied => write!(f, "Camera permission denied"),
            ScanError::DeviceUnavailable => write!(f, "No camera device available"),
            ScanError::HandlerFailure(msg) => write!(f, "Code handler failed: {}", msg),
            ScanError::CaptureFailure(msg) => write!(f, "Snapshot failed: {}", msg),
            ScanError::HandlerTimeout(limit) => {
                write!(f, "Code handler timed out after {} ms", limit.as_millis())
            }
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            BackendError::Io(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ScanError {}
impl std::error::Error for BackendError {}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        AppError::Scan(err)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

impl From<image::ImageError> for BackendError {
    fn from(err: image::ImageError) -> Self {
        BackendError::CaptureFailed(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Backend(err.into())
    }
}
