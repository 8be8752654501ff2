//! Shared shutdown signal for the two halves of a chat session.

use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation signal shared by the send and receive channels.
///
/// Starts alive. Either channel shuts it down when its side of the
/// transport fails; the other notices through [`is_alive`] or by awaiting
/// [`cancelled`]. Shutting down is idempotent, so both channels failing at
/// once is harmless.
///
/// [`is_alive`]: Self::is_alive
/// [`cancelled`]: Self::cancelled
#[derive(Debug, Clone)]
pub struct Liveness {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(true);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn is_alive(&self) -> bool {
        *self.rx.borrow()
    }

    /// Marks the session as over. Returns `true` if this call did it.
    pub fn shut_down(&self) -> bool {
        self.tx.send_replace(false)
    }

    /// Completes once the session has been shut down.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives in `self`, so this only ends on shutdown.
        let _ = rx.wait_for(|alive| !*alive).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_alive_and_shuts_down_once() {
        let liveness = Liveness::new();
        let other = liveness.clone();
        assert!(liveness.is_alive());

        assert!(other.shut_down());
        assert!(!liveness.is_alive());
        assert!(!other.is_alive());

        assert!(!liveness.shut_down());
        assert!(!liveness.is_alive());
    }

    #[tokio::test]
    async fn cancelled_wakes_waiters() {
        let liveness = Liveness::new();
        let waiter = {
            let liveness = liveness.clone();
            tokio::spawn(async move { liveness.cancelled().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        liveness.shut_down();
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_when_already_down() {
        let liveness = Liveness::new();
        liveness.shut_down();
        tokio::time::timeout(Duration::from_secs(1), liveness.cancelled())
            .await
            .unwrap();
    }
}
