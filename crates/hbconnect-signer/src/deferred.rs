//! Single-resolution deferred value.
//!
//! One producer resolves the value at most once; the consumer awaits it.
//! Dropping the producer without resolving makes the wait fail instead of
//! hang.

use tokio::sync::oneshot;

use crate::error::{Result, SignerError};

/// Create a connected resolver/deferred pair.
pub fn deferred<T>() -> (Resolver<T>, Deferred<T>) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx: Some(tx) }, Deferred { rx })
}

/// Producing half.
#[derive(Debug)]
pub struct Resolver<T> {
    tx: Option<oneshot::Sender<T>>,
}

impl<T> Resolver<T> {
    /// Resolve the value. A second call fails with `AlreadyResolved`.
    pub fn resolve(&mut self, value: T) -> Result<()> {
        let tx = self.tx.take().ok_or(SignerError::AlreadyResolved)?;
        // The consumer may already be gone; the value is then simply dropped.
        let _ = tx.send(value);
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.tx.is_none()
    }
}

/// Consuming half.
#[derive(Debug)]
pub struct Deferred<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Deferred<T> {
    /// Wait for the value. Returns `None` if the resolver was dropped
    /// without resolving.
    pub async fn wait(self) -> Option<T> {
        self.rx.await.ok()
    }
}
