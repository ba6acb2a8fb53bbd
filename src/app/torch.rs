// SPDX-License-Identifier: GPL-3.0-only

//! Torch controller
//!
//! Two-valued toggle that never touches the scan gate.

use crate::backends::camera::CameraSession;
use crate::backends::camera::types::TorchState;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::info;

pub struct TorchController {
    state: watch::Sender<TorchState>,
    session: Weak<dyn CameraSession>,
}

impl TorchController {
    pub fn new(session: &Arc<dyn CameraSession>) -> Self {
        Self {
            state: watch::Sender::new(TorchState::Off),
            session: Arc::downgrade(session),
        }
    }

    pub fn state(&self) -> TorchState {
        *self.state.borrow()
    }

    /// Receive every torch change, e.g. to redraw the toggle icon
    pub fn subscribe(&self) -> watch::Receiver<TorchState> {
        self.state.subscribe()
    }

    /// Flip the torch and return the new state
    pub fn toggle(&self) -> TorchState {
        let mut next = TorchState::Off;
        self.state.send_modify(|state| {
            *state = state.toggled();
            next = *state;
        });
        self.push(next);
        next
    }

    /// Force a state, e.g. switching the torch off when leaving the screen
    pub fn set(&self, state: TorchState) {
        self.state.send_replace(state);
        self.push(state);
    }

    fn push(&self, state: TorchState) {
        info!(?state, "Torch set");
        if let Some(session) = self.session.upgrade() {
            session.set_torch(state);
        }
    }
}
