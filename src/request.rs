//! Request versioning
//!
//! Every image load takes a [`RequestToken`] from the shared [`RequestGate`].
//! Continuations check their token before touching shared state; a token
//! whose id no longer matches the live counter belongs to a superseded load
//! and its result is dropped. The in-flight work itself is never interrupted.

use crate::error::{CutoutError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, monotonically increasing request counter
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    live: Arc<AtomicU64>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier token
    pub fn begin(&self) -> RequestToken {
        let id = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Request {} started", id);
        RequestToken {
            id,
            live: Arc::clone(&self.live),
        }
    }

    /// Invalidate all outstanding tokens without starting a new request
    pub fn cancel(&self) {
        let id = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Requests before {} cancelled", id);
    }

    pub fn current(&self) -> u64 {
        self.live.load(Ordering::SeqCst)
    }
}

/// Identity of one request, captured when it started
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    live: Arc<AtomicU64>,
}

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.live.load(Ordering::SeqCst) == self.id
    }

    /// Checkpoint: fail with [`CutoutError::StaleRequest`] once superseded
    pub fn check(&self) -> Result<()> {
        if self.is_current() {
            Ok(())
        } else {
            tracing::debug!("Request {} is stale, dropping result", self.id);
            Err(CutoutError::StaleRequest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn newer_request_supersedes_older() {
        let gate = RequestGate::new();
        let a = gate.begin();
        assert!(a.is_current());

        let b = gate.begin();
        assert!(!a.is_current());
        assert!(b.is_current());
        assert!(b.id() > a.id());
        assert!(matches!(a.check(), Err(CutoutError::StaleRequest)));
        assert!(b.check().is_ok());
    }

    #[test]
    fn cancel_invalidates_without_new_request() {
        let gate = RequestGate::new();
        let token = gate.begin();
        gate.cancel();
        assert!(!token.is_current());
        assert_eq!(gate.current(), token.id() + 1);
    }

    #[test]
    fn tokens_are_checked_across_threads() {
        let gate = RequestGate::new();
        let token = gate.begin();
        let (done, inference_finished) = mpsc::channel::<()>();
        let worker = thread::spawn(move || {
            // Inference completes only after a newer load has started.
            inference_finished.recv().unwrap();
            token.is_current()
        });
        gate.begin();
        done.send(()).unwrap();
        assert!(!worker.join().unwrap());
    }
}
