// SPDX-License-Identifier: GPL-3.0-only

//! Code handler
//!
//! The application-defined work done once per admitted detection. Handlers
//! may fail; the screen logs the failure and reopens the gate either way.

use super::capture::{CaptureCoordinator, SnapshotResult, slugify};
use crate::errors::AppResult;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::info;
use uuid::Uuid;

/// Auxiliary data read when a handler starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub team_name: String,
}

/// Shared, last-write-wins session context
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<watch::Sender<SessionContext>>,
}

impl SessionHandle {
    pub fn new(context: SessionContext) -> Self {
        Self {
            inner: Arc::new(watch::Sender::new(context)),
        }
    }

    pub fn set_team_name(&self, team_name: impl Into<String>) {
        let team_name = team_name.into();
        self.inner.send_modify(|ctx| ctx.team_name = team_name);
    }

    /// Copy of the latest context
    pub fn snapshot(&self) -> SessionContext {
        self.inner.borrow().clone()
    }
}

/// One admitted detection, handed to exactly one handler invocation
#[derive(Clone)]
pub struct ScanRequest {
    pub scan_id: Uuid,
    pub payload: String,
    /// Session context as of handler start, not detection time
    pub session: SessionContext,
    pub capture: CaptureCoordinator,
}

pub trait CodeHandler: Send + Sync + 'static {
    fn handle(&self, request: ScanRequest) -> BoxFuture<'_, AppResult<()>>;
}

/// Adapter turning an async closure into a [`CodeHandler`]
pub struct FnHandler<F>(F);

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(ScanRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    FnHandler(f)
}

impl<F, Fut> CodeHandler for FnHandler<F>
where
    F: Fn(ScanRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    fn handle(&self, request: ScanRequest) -> BoxFuture<'_, AppResult<()>> {
        Box::pin((self.0)(request))
    }
}

/// What the default handler did with a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledScan {
    pub scan_id: Uuid,
    pub payload: String,
    pub team_name: String,
    pub snapshot: Option<SnapshotResult>,
}

/// Default handler: log the code with the team name and optionally snapshot
pub struct LoggingHandler {
    capture_on_scan: bool,
    reporter: Option<mpsc::UnboundedSender<HandledScan>>,
}

impl LoggingHandler {
    pub fn new(capture_on_scan: bool) -> Self {
        Self {
            capture_on_scan,
            reporter: None,
        }
    }

    /// Also send every handled scan to `reporter`
    pub fn with_reporter(mut self, reporter: mpsc::UnboundedSender<HandledScan>) -> Self {
        self.reporter = Some(reporter);
        self
    }
}

impl CodeHandler for LoggingHandler {
    fn handle(&self, request: ScanRequest) -> BoxFuture<'_, AppResult<()>> {
        Box::pin(async move {
            info!(
                payload = %request.payload,
                team_name = %request.session.team_name,
                "Handling QR code"
            );

            let snapshot = if self.capture_on_scan {
                request.capture.capture(&slugify(&request.payload)).await
            } else {
                None
            };

            if let Some(reporter) = &self.reporter {
                // Receiver gone just means nobody is listening anymore
                let _ = reporter.send(HandledScan {
                    scan_id: request.scan_id,
                    payload: request.payload,
                    team_name: request.session.team_name,
                    snapshot,
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_handle_last_write_wins() {
        let handle = SessionHandle::new(SessionContext::default());
        let other = handle.clone();
        handle.set_team_name("red");
        other.set_team_name("blue");
        assert_eq!(handle.snapshot().team_name, "blue");
    }
}
