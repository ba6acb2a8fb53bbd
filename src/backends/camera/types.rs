// SPDX-License-Identifier: GPL-3.0-only

//! Types exchanged with the camera session

use crate::constants::GRANTED_PERMISSION_NAMES;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Camera permission as reported by the platform
///
/// Some platforms answer with a plain flag, others with a named status
/// such as `"authorized"` or `"denied"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStatus {
    Flag(bool),
    Named(String),
}

impl PermissionStatus {
    /// Normalize both representations into granted / not granted
    pub fn is_granted(&self) -> bool {
        match self {
            PermissionStatus::Flag(granted) => *granted,
            PermissionStatus::Named(name) => GRANTED_PERMISSION_NAMES
                .iter()
                .any(|granted| name.trim().eq_ignore_ascii_case(granted)),
        }
    }
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        PermissionStatus::Flag(granted)
    }
}

impl From<&str> for PermissionStatus {
    fn from(name: &str) -> Self {
        PermissionStatus::Named(name.to_string())
    }
}

/// Symbology of a detected code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeType {
    Qr,
    Other(String),
}

/// One recognized code inside a detection batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub code_type: CodeType,
    /// Decoded payload; `None` when the decoder could not read the content
    pub value: Option<String>,
}

impl Code {
    pub fn qr(value: impl Into<String>) -> Self {
        Self {
            code_type: CodeType::Qr,
            value: Some(value.into()),
        }
    }

    pub fn is_qr(&self) -> bool {
        self.code_type == CodeType::Qr
    }
}

/// All codes observed in one frame analysis cycle, in decoder order
pub type DetectionBatch = Vec<Code>;

/// Torch (flashlight) state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorchState {
    #[default]
    Off,
    On,
}

impl TorchState {
    pub fn toggled(self) -> Self {
        match self {
            TorchState::Off => TorchState::On,
            TorchState::On => TorchState::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == TorchState::On
    }

    /// Icon name for the toggle button
    pub fn icon_name(self) -> &'static str {
        match self {
            TorchState::Off => "flash-off",
            TorchState::On => "flash",
        }
    }
}

/// Still image produced by the camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub path: PathBuf,
}

/// A decoded camera frame, RGBA8, tightly packed
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    /// Timestamp when the frame was produced
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Luma of the pixel at (x, y) using integer BT.601 weights
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        let offset = ((y * self.width + x) * 4) as usize;
        match self.data.get(offset..offset + 3) {
            Some(&[r, g, b]) => ((r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8) as u8,
            _ => 0,
        }
    }
}
