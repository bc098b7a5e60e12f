//! Run-wide shutdown signal.
//!
//! A single `watch` channel shared by the workers and the retry
//! dispatcher. The controller triggers it exactly once per run; every
//! observer blocked in a timed wait wakes immediately.

use tokio::sync::watch;

/// Creates a linked shutdown handle/observer pair for one run.
#[must_use]
pub fn channel() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, Shutdown { rx })
}

/// Triggering half, owned by the controller.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Signals every observer that the run is stopping. Idempotent.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observing half, cloned into every worker and the dispatcher.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Returns true once the run is stopping.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the run is stopping. Cancel-safe.
    ///
    /// Also resolves if the handle was dropped without triggering, so a
    /// torn-down controller can never strand an observer.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|stopping| *stopping).await;
    }
}
