// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Scanning a folder of frames through the scan screen
//! - Decoding a single image
//! - Listing flash LEDs

use qrscan::app::frame_processor::QrDetector;
use qrscan::backends::camera::folder::load_frame;
use qrscan::flash::FlashHardware;
use qrscan::{CameraSession, Config, FolderCamera, LoggingHandler, ScanScreen, TorchState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Scan a directory of frames until they run out or Ctrl-C
pub async fn scan_folder(
    frames: &Path,
    config: Config,
    torch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let flash = FlashHardware::detect();
    if torch && let Some(hint) = &flash.permission_error {
        eprintln!("{}", hint);
    }

    let camera = Arc::new(
        FolderCamera::open(frames, config.snapshot_dir(), config.frame_interval())?
            .with_flash_devices(flash.devices),
    );
    if camera.frame_count() == 0 {
        return Err(format!("No frames found in {}", frames.display()).into());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handler = Arc::new(LoggingHandler::new(config.capture_on_scan).with_reporter(tx));
    let session: Arc<dyn CameraSession> = camera.clone();
    let screen = ScanScreen::new(session, handler, &config);

    screen.mount().await;
    if !screen.view().show_camera() {
        return Err("Camera not available".into());
    }
    if torch {
        screen.toggle_torch();
    }

    println!("Scanning {} frames...", camera.frame_count());

    let printer = tokio::spawn(async move {
        let mut handled = 0usize;
        while let Some(scan) = rx.recv().await {
            handled += 1;
            match &scan.snapshot {
                Some(snapshot) => {
                    println!("{}  (snapshot: {})", scan.payload, snapshot.path.display())
                }
                None => println!("{}", scan.payload),
            }
        }
        handled
    });

    tokio::select! {
        _ = screen.run(camera.detections(QrDetector::new())) => {
            screen.wait_idle().await;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Interrupted");
        }
    }

    if screen.torch().state().is_on() {
        screen.torch().set(TorchState::Off);
    }

    // Dropping the screen drops the handler and its reporter
    drop(screen);
    let handled = printer.await.unwrap_or(0);
    println!("Handled {} code(s)", handled);
    Ok(())
}

/// Decode every QR code in one image
pub async fn decode_image(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Arc::new(load_frame(path.clone()).await?);
    let batch = QrDetector::new().detect(frame).await;

    if batch.is_empty() {
        println!("No QR codes found in {}", path.display());
        return Ok(());
    }

    for code in batch {
        if let Some(value) = code.value {
            println!("{}", value);
        }
    }
    Ok(())
}

/// List controllable flash LEDs
pub fn list_flash() -> Result<(), Box<dyn std::error::Error>> {
    let hardware = FlashHardware::detect();

    if let Some(error) = &hardware.permission_error {
        println!("{}", error);
        return Ok(());
    }
    if !hardware.has_devices() {
        println!("No flash LEDs found.");
        return Ok(());
    }

    println!("Flash LEDs:");
    for device in &hardware.devices {
        println!("  {} (max brightness {})", device.name(), device.max_brightness());
    }
    Ok(())
}
