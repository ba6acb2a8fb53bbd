// SPDX-License-Identifier: GPL-3.0-only

//! Torch LED control via Linux sysfs
//!
//! Discovers LEDs exposed at `/sys/class/leds/*:flash` or `*:torch` and drives
//! them in torch mode through the `brightness` file.

use crate::backends::camera::types::TorchState;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default sysfs LED class directory
pub const SYSFS_LEDS_DIR: &str = "/sys/class/leds";

/// A flash LED device discovered via sysfs
#[derive(Debug, Clone)]
pub struct FlashDevice {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    max_brightness: u32,
    name: String,
}

impl FlashDevice {
    /// Device name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    pub fn apply(&self, state: TorchState) -> io::Result<()> {
        match state {
            TorchState::On => self.set_brightness(self.max_brightness),
            TorchState::Off => self.set_brightness(0),
        }
    }
}

/// Result of flash LED detection
///
/// Keeps "hardware exists" apart from "we can drive it" so callers can show
/// a permission hint instead of silently hiding the torch.
#[derive(Debug, Default)]
pub struct FlashHardware {
    /// Devices we can write to
    pub devices: Vec<FlashDevice>,
    /// Set when LEDs were found but none are writable
    pub permission_error: Option<String>,
}

impl FlashHardware {
    /// Scan the default sysfs directory
    pub fn detect() -> FlashHardware {
        Self::detect_in(Path::new(SYSFS_LEDS_DIR))
    }

    /// Scan a sysfs-style LED directory
    pub fn detect_in(leds_dir: &Path) -> FlashHardware {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(dir = %leds_dir.display(), "Cannot read LED directory, torch disabled");
            return FlashHardware::default();
        };

        let mut devices = Vec::new();
        let mut unwritable = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name_str) = name.to_str() else {
                continue;
            };
            if !name_str.ends_with(":flash") && !name_str.ends_with(":torch") {
                continue;
            }

            let led_path = entry.path();
            let Some(max_brightness) = read_max_brightness(&led_path) else {
                continue;
            };

            let brightness_path = led_path.join("brightness");
            match std::fs::OpenOptions::new().write(true).open(&brightness_path) {
                Ok(_) => {
                    info!(name = name_str, max_brightness, "Discovered flash LED");
                    devices.push(FlashDevice {
                        path: led_path,
                        max_brightness,
                        name: name_str.to_string(),
                    });
                }
                Err(e) => {
                    warn!(path = %brightness_path.display(), error = %e, "Flash LED not writable");
                    unwritable.push(name_str.to_string());
                }
            }
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name));

        let permission_error = (devices.is_empty() && !unwritable.is_empty()).then(|| {
            let username = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
            format!(
                "Flash LEDs detected ({}) but cannot be controlled.\n\n\
                 Add {username} to the group owning their brightness files \
                 (usually 'feedbackd'), then log out and back in.",
                unwritable.join(", ")
            )
        });

        FlashHardware {
            devices,
            permission_error,
        }
    }

    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }
}

fn read_max_brightness(led_path: &Path) -> Option<u32> {
    let path = led_path.join("max_brightness");
    match std::fs::read_to_string(&path) {
        Ok(s) => match s.trim().parse::<u32>() {
            Ok(v) if v > 0 => Some(v),
            _ => {
                warn!(path = %path.display(), "Invalid max_brightness value");
                None
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read max_brightness");
            None
        }
    }
}

/// Apply a torch state to every device, logging failures
pub fn apply_all(devices: &[FlashDevice], state: TorchState) {
    for dev in devices {
        if let Err(e) = dev.apply(state) {
            warn!(device = %dev.name, error = %e, ?state, "Failed to set flash LED");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_led(root: &Path, name: &str, max: &str) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("max_brightness"), max).unwrap();
        std::fs::write(dir.join("brightness"), "0").unwrap();
        dir
    }

    #[test]
    fn test_detect_and_apply() {
        let root = std::env::temp_dir().join(format!("qrscan-leds-{}", uuid::Uuid::new_v4()));
        let white = fake_led(&root, "white:flash", "255\n");
        fake_led(&root, "green:status", "1");
        fake_led(&root, "broken:torch", "0");

        let hw = FlashHardware::detect_in(&root);
        assert_eq!(hw.devices.len(), 1);
        assert_eq!(hw.devices[0].name(), "white:flash");
        assert!(hw.permission_error.is_none());

        apply_all(&hw.devices, TorchState::On);
        assert_eq!(std::fs::read_to_string(white.join("brightness")).unwrap(), "255");
        apply_all(&hw.devices, TorchState::Off);
        assert_eq!(std::fs::read_to_string(white.join("brightness")).unwrap(), "0");

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let hw = FlashHardware::detect_in(Path::new("/nonexistent/qrscan/leds"));
        assert!(!hw.has_devices());
        assert!(hw.permission_error.is_none());
    }
}
