//! Shutdown and cancellation coordination.

use tokio::sync::watch;

/// Coordinator for cancelling in-flight calls.
///
/// The triggered state is sticky: a signal subscribed after [`trigger`](Self::trigger)
/// fires immediately.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to a cancellable call.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered, at once if it already was.
    ///
    /// A coordinator dropped without triggering never fires; the call then runs to completion.
    pub async fn recv(&mut self) {
        if self.rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_subscribers() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        a.recv().await;
        b.recv().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_after_trigger_fires_immediately() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();

        let mut late = shutdown.subscribe();
        let fired = tokio::time::timeout(Duration::from_millis(1), late.recv()).await;
        assert!(fired.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_then_drop_still_fires() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        shutdown.trigger();
        drop(shutdown);

        let fired = tokio::time::timeout(Duration::from_millis(1), signal.recv()).await;
        assert!(fired.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_coordinator_never_fires() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        drop(shutdown);

        let fired = tokio::time::timeout(Duration::from_secs(60), signal.recv()).await;
        assert!(fired.is_err());
    }
}
