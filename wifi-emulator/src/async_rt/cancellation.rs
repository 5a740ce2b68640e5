use futures::future::Shared;
use futures::{FutureExt, select_biased};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cooperative stop request, observed by every clone of the token
#[derive(Clone)]
pub struct CancellationToken {
    rx: Shared<futures::channel::oneshot::Receiver<()>>,
}

impl CancellationToken {
    pub fn new() -> (Self, CancellationSignal) {
        let (tx, rx) = futures::channel::oneshot::channel();
        let token = Self { rx: rx.shared() };
        let signal = CancellationSignal {
            tx: Arc::new(Mutex::new(Some(tx))),
        };

        (token, signal)
    }

    pub fn is_cancelled(&self) -> bool {
        match self.rx.clone().now_or_never() {
            // Future is not ready
            None => false,
            // Sender sent a cancel signal
            Some(Ok(())) => true,
            // Sender dropped
            Some(Err(_)) => false,
        }
    }

    pub async fn cancelled(&self) {
        let result = self.rx.clone().await;
        if result.is_err() {
            // The sender was dropped, so a cancellation will never arrive
            futures::future::pending().await
        }
    }

    /// Runs the future to completion, unless a cancellation arrives first
    ///
    /// Returns `None` if cancelled, also when the cancellation was requested before calling
    pub async fn run_until_cancelled<F: Future>(&self, future: F) -> Option<F::Output> {
        let future = std::pin::pin!(future);
        select_biased! {
            _ = self.cancelled().fuse() => None,
            output = future.fuse() => Some(output),
        }
    }
}

/// The sending half of a [`CancellationToken`]
///
/// Clones share the same underlying signal, so any of them can cancel
#[derive(Clone)]
pub struct CancellationSignal {
    tx: Arc<Mutex<Option<futures::channel::oneshot::Sender<()>>>>,
}

impl CancellationSignal {
    pub fn cancel(&self) {
        if let Some(tx) = self.tx.lock().take() {
            tx.send(()).ok();
        }
    }
}
