// SPDX-License-Identifier: MPL-2.0

//! Scan screen
//!
//! Coordinates the pieces of a single scanning screen:
//!
//! - `readiness`: one-shot permission bootstrap
//! - `scan_gate`: at most one code handler in flight
//! - `handler`: application work per admitted code
//! - `capture`: best-effort snapshot after a scan
//! - `torch`: illumination toggle, independent of scanning
//! - `frame_processor`: QR detection over camera frames
//!
//! Detection batches are pushed in through [`ScanScreen::on_codes_scanned`]
//! (or a whole stream through [`ScanScreen::run`]). Admission is decided
//! synchronously; the handler runs on its own task so the detection stream
//! never waits for it.

pub mod capture;
pub mod frame_processor;
pub mod handler;
pub mod readiness;
pub mod scan_gate;
pub mod state;
pub mod torch;

use crate::backends::camera::CameraSession;
use crate::backends::camera::types::{Code, DetectionBatch, TorchState};
use crate::config::Config;
use crate::errors::ScanError;
use capture::{CaptureCoordinator, SnapshotConsumer};
use futures::{FutureExt, Stream, StreamExt};
use handler::{CodeHandler, ScanRequest, SessionContext, SessionHandle};
use readiness::Readiness;
use scan_gate::{GateGuard, ScanGate};
use state::{ScreenState, ScreenView};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use torch::TorchController;
use tracing::{Instrument, debug, info, info_span, trace, warn};
use uuid::Uuid;

/// Outcome of offering one detection batch to the screen
#[derive(Debug)]
pub enum Admission {
    /// A handler was started for the first code of the batch
    Admitted(JoinHandle<()>),
    /// A handler is already in flight; the batch was dropped
    Busy,
    /// Nothing usable in the batch (no QR code, or an empty payload)
    Ignored,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }

    /// Wait for the admitted handler, if any
    pub async fn finished(self) {
        if let Admission::Admitted(handle) = self
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Scan task did not complete");
        }
    }
}

pub struct ScanScreen {
    session: Arc<dyn CameraSession>,
    handler: Arc<dyn CodeHandler>,
    gate: Arc<ScanGate>,
    readiness: Readiness,
    torch: TorchController,
    capture: CaptureCoordinator,
    context: SessionHandle,
    handler_timeout: Option<Duration>,
}

impl ScanScreen {
    pub fn new(
        session: Arc<dyn CameraSession>,
        handler: Arc<dyn CodeHandler>,
        config: &Config,
    ) -> Self {
        let capture = CaptureCoordinator::new(&session, config.quality());
        let torch = TorchController::new(&session);
        let context = SessionHandle::new(SessionContext {
            team_name: config.team_name.clone(),
        });

        Self {
            session,
            handler,
            gate: ScanGate::new(),
            readiness: Readiness::new(),
            torch,
            capture,
            context,
            handler_timeout: config.handler_timeout(),
        }
    }

    /// Hand every snapshot to `consumer`
    pub fn with_snapshot_consumer(mut self, consumer: Arc<dyn SnapshotConsumer>) -> Self {
        self.capture = self.capture.with_consumer(consumer);
        self
    }

    /// Mount the screen: run the readiness bootstrap once
    ///
    /// Returns `false` if the screen was already mounted.
    pub async fn mount(&self) -> bool {
        let first = self.readiness.initialize(self.session.as_ref()).await;
        if first && !self.session.device_available() {
            warn!(error = %ScanError::DeviceUnavailable, "Camera ready but no device present");
        }
        first
    }

    /// Offer one detection batch
    ///
    /// Only QR codes are considered, and only the first of them. If a
    /// handler is in flight the whole batch is dropped; nothing is queued.
    /// Must be called from within a tokio runtime.
    pub fn on_codes_scanned(&self, batch: &[Code]) -> Admission {
        if self.gate.is_locked() {
            trace!(codes = batch.len(), "Handler in flight, dropping batch");
            return Admission::Busy;
        }

        let Some(code) = batch.iter().find(|code| code.is_qr()) else {
            return Admission::Ignored;
        };
        let payload = match code.value.as_deref() {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => return Admission::Ignored,
        };

        let Some(guard) = self.gate.try_acquire() else {
            return Admission::Busy;
        };

        let scan_id = Uuid::new_v4();
        info!(%scan_id, payload = %payload, "Detected QR");
        if batch.len() > 1 {
            debug!(dropped = batch.len() - 1, "Ignoring remaining codes in batch");
        }

        let span = info_span!("scan", %scan_id, payload = %payload);
        let task = handle_scan(
            guard,
            Arc::clone(&self.handler),
            self.context.clone(),
            self.capture.clone(),
            scan_id,
            payload,
            self.handler_timeout,
        );
        Admission::Admitted(tokio::spawn(task.instrument(span)))
    }

    /// Drive a detection stream until it ends
    ///
    /// Handlers are not awaited between batches. Returns once the stream is
    /// exhausted; use [`ScanScreen::wait_idle`] to let the last handler finish.
    pub async fn run<S>(&self, stream: S)
    where
        S: Stream<Item = DetectionBatch>,
    {
        let mut stream = std::pin::pin!(stream);
        let mut admitted = 0usize;
        while let Some(batch) = stream.next().await {
            if self.on_codes_scanned(&batch).is_admitted() {
                admitted += 1;
            }
        }
        debug!(admitted, "Detection stream ended");
    }

    /// Wait until no handler is in flight
    pub async fn wait_idle(&self) {
        self.gate.wait_idle().await;
    }

    pub fn toggle_torch(&self) -> TorchState {
        self.torch.toggle()
    }

    pub fn torch(&self) -> &TorchController {
        &self.torch
    }

    pub fn gate(&self) -> &Arc<ScanGate> {
        &self.gate
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub fn session_context(&self) -> &SessionHandle {
        &self.context
    }

    pub fn state(&self) -> ScreenState {
        if !self.readiness.is_ready() {
            ScreenState::Initializing
        } else if self.gate.is_locked() {
            ScreenState::Handling
        } else {
            ScreenState::IdleReady
        }
    }

    pub fn view(&self) -> ScreenView {
        ScreenView {
            ready: self.readiness.is_ready(),
            device_available: self.session.device_available(),
            processing: self.gate.processing(),
            torch: self.torch.state(),
        }
    }
}

/// Run one admitted scan to completion
///
/// The guard is held for the whole task and released on every exit,
/// including handler errors, panics and timeouts.
async fn handle_scan(
    guard: GateGuard,
    handler: Arc<dyn CodeHandler>,
    context: SessionHandle,
    capture: CaptureCoordinator,
    scan_id: Uuid,
    payload: String,
    timeout: Option<Duration>,
) {
    let _guard = guard;

    let work = AssertUnwindSafe(async {
        let request = ScanRequest {
            scan_id,
            payload,
            session: context.snapshot(),
            capture,
        };
        handler.handle(request).await
    })
    .catch_unwind();

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(error = %ScanError::HandlerTimeout(limit), "QR scan error");
                return;
            }
        },
        None => work.await,
    };

    match outcome {
        Ok(Ok(())) => info!("QR scanned successfully."),
        Ok(Err(e)) => {
            warn!(error = %ScanError::HandlerFailure(e.to_string()), "QR scan error");
        }
        Err(panic) => {
            let err = ScanError::HandlerFailure(panic_message(panic.as_ref()));
            warn!(error = %err, "QR scan error");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "handler panicked");
    }
}
