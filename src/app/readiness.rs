// SPDX-License-Identifier: GPL-3.0-only

//! Readiness initializer
//!
//! One-shot bootstrap run at mount: resolve camera permission into a single
//! "ready to scan" flag. A denied or unanswerable permission still ends in
//! `Ready` so the screen never waits forever; the view handles a missing
//! camera on its own.

use super::state::ReadinessState;
use crate::backends::camera::CameraSession;
use crate::errors::ScanError;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Readiness {
    started: AtomicBool,
    state: watch::Sender<ReadinessState>,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            started: AtomicBool::new(false),
            state: watch::Sender::new(ReadinessState::Uninitialized),
        }
    }
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReadinessState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReadinessState> {
        self.state.subscribe()
    }

    /// Run the bootstrap
    ///
    /// Only the first call does any work; later calls return `false`
    /// immediately, even if the permission status has changed since.
    pub async fn initialize(&self, session: &dyn CameraSession) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("Readiness already initialized, ignoring");
            return false;
        }

        let status = session.permission_status();
        if status.is_granted() {
            info!(?status, "Camera permission already granted");
        } else {
            match session.request_permission() {
                Some(request) => {
                    let outcome = request.await;
                    if outcome.is_granted() {
                        info!(?outcome, "Camera permission granted");
                    } else {
                        warn!(?outcome, error = %ScanError::PermissionDenied, "Continuing without camera permission");
                    }
                }
                None => {
                    warn!(?status, "Camera permission missing and no request available");
                }
            }
        }

        self.state.send_replace(ReadinessState::Ready);
        true
    }

    /// Wait until the bootstrap has finished
    pub async fn wait_ready(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|state| state.is_ready()).await;
    }
}
