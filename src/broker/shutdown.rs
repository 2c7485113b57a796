//! One-shot cancellation signal.
//!
//! `Shutdown` is a cloneable handle around a `watch` channel holding a single
//! flag. Any clone may trigger it, any number of times; every waiter observes
//! the flag once it flips to `true`, including waiters that start late.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Shutdown {
    flag: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Fire the signal. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.flag.send_if_modified(|fired| !std::mem::replace(fired, true));
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves once the signal has fired, immediately if it already has.
    ///
    /// Subscribes on every call; long-running loops should hold a
    /// `ShutdownListener` from `listen` instead.
    pub async fn triggered(&self) {
        self.listen().triggered().await;
    }

    pub fn listen(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.flag.subscribe(),
        }
    }
}

/// A long-lived subscription to a `Shutdown`.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolves once the signal has fired. Cancel-safe: dropping the future
    /// and calling again loses nothing.
    ///
    /// If every `Shutdown` handle is gone the signal can no longer fire, and
    /// this never resolves.
    pub async fn triggered(&mut self) {
        if self.rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
