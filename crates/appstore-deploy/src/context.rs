//! Cancellation context for deployment engine calls.
//!
//! Only engine invocations honor cancellation; database work never does.
//! Cancelling after the install bookkeeping has committed leaves the rows
//! at `INIT`.

use tokio::sync::watch;

use crate::error::{EngineError, EngineResult};

/// Carries a cancellation signal into deployment engine calls.
#[derive(Debug, Clone)]
pub struct DeployContext {
    cancel: watch::Receiver<bool>,
}

/// Cancels every [`DeployContext`] created with it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl DeployContext {
    /// Create a context together with the handle that cancels it.
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { cancel: rx }, CancelHandle { tx })
    }

    /// A context that is never cancelled.
    pub fn background() -> Self {
        let (ctx, _handle) = Self::new();
        ctx
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Fail with [`EngineError::Cancelled`] once cancellation was requested.
    pub fn check(&self) -> EngineResult<()> {
        if self.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
