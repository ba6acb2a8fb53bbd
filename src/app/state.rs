// SPDX-License-Identifier: GPL-3.0-only

//! Screen state types

use crate::backends::camera::types::TorchState;

/// Camera readiness
///
/// Moves from `Uninitialized` to `Ready` once per mount and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessState {
    #[default]
    Uninitialized,
    Ready,
}

impl ReadinessState {
    pub fn is_ready(self) -> bool {
        self == ReadinessState::Ready
    }
}

/// Coarse screen state
///
/// Capturing is part of `Handling`; the torch is orthogonal to all of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Waiting for permission to settle
    Initializing,
    /// Scanning, gate open
    IdleReady,
    /// A code handler is in flight
    Handling,
}

/// Everything the presentation layer needs to draw the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenView {
    pub ready: bool,
    pub device_available: bool,
    /// Render-visible processing flag (drives the blocking overlay)
    pub processing: bool,
    pub torch: TorchState,
}

impl ScreenView {
    /// Live camera view instead of the loading placeholder
    pub fn show_camera(&self) -> bool {
        self.ready && self.device_available
    }

    /// Processing overlay on top of the camera view
    pub fn show_overlay(&self) -> bool {
        self.show_camera() && self.processing
    }

    /// Icon for the torch toggle, shown only over the live camera view
    pub fn torch_icon(&self) -> Option<&'static str> {
        self.show_camera().then(|| self.torch.icon_name())
    }

    pub fn title(&self) -> &'static str {
        if self.show_camera() {
            "Scan QR"
        } else {
            "Loading camera..."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_placeholder_until_ready() {
        let view = ScreenView {
            ready: false,
            device_available: true,
            processing: true,
            torch: TorchState::Off,
        };
        assert!(!view.show_camera());
        assert!(!view.show_overlay());
        assert_eq!(view.title(), "Loading camera...");
        assert_eq!(view.torch_icon(), None);

        let view = ScreenView { ready: true, ..view };
        assert!(view.show_camera());
        assert!(view.show_overlay());
        assert_eq!(view.torch_icon(), Some("flash-off"));
    }

    #[test]
    fn test_view_without_device() {
        let view = ScreenView {
            ready: true,
            device_available: false,
            processing: false,
            torch: TorchState::On,
        };
        assert!(!view.show_camera());
        assert_eq!(view.torch_icon(), None);
    }
}
