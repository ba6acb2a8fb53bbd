// SPDX-License-Identifier: GPL-3.0-only

//! Scan gate
//!
//! Admits at most one code handler at a time. The lock is tracked twice:
//! an atomic flag that admission checks read and set in one step, and a
//! watch channel that only feeds the processing overlay. Both are reset
//! together when the [`GateGuard`] drops, on every exit path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::trace;

#[derive(Debug)]
pub struct ScanGate {
    locked: AtomicBool,
    processing: watch::Sender<bool>,
}

impl Default for ScanGate {
    fn default() -> Self {
        Self {
            locked: AtomicBool::new(false),
            processing: watch::Sender::new(false),
        }
    }
}

impl ScanGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Immediately consistent lock state, used for admission
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Render-visible processing flag
    pub fn processing(&self) -> bool {
        *self.processing.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.processing.subscribe()
    }

    /// Close the gate if it is open
    ///
    /// Returns `None` when a handler is already in flight. The gate stays
    /// closed until the returned guard is dropped.
    pub fn try_acquire(self: &Arc<Self>) -> Option<GateGuard> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.processing.send_replace(true);
        trace!("Scan gate closed");
        Some(GateGuard {
            gate: Arc::clone(self),
        })
    }

    /// Wait until the render-visible flag reports idle
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|processing| !*processing).await;
    }
}

/// Holds the gate closed; reopens it on drop
#[derive(Debug)]
pub struct GateGuard {
    gate: Arc<ScanGate>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        // Admission flag first so anyone woken by the overlay flag can scan
        self.gate.locked.store(false, Ordering::Release);
        self.gate.processing.send_replace(false);
        trace!("Scan gate reopened");
    }
}
