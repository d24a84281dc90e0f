//! Cancellable deadline primitive.
//!
//! [`DeadlineTimer`] arms a one-shot deadline on its own task: if the
//! duration elapses first, the expiry action runs; if the timer is cancelled
//! first (explicitly or by dropping the handle), nothing runs. This is the
//! timer-cancels-on-event pattern the session loop races against its read
//! loop for the handshake deadline.

use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;

/// Default handshake deadline.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

/// Handle to an armed deadline. Dropping it cancels the deadline.
#[derive(Debug)]
pub struct DeadlineTimer {
    cancel: Option<oneshot::Sender<()>>,
}

impl DeadlineTimer {
    /// Arm a deadline: `on_expiry` runs if and only if `duration` elapses
    /// before the timer is cancelled.
    pub fn arm<F, Fut>(duration: Duration, on_expiry: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => on_expiry().await,
                // Resolves on explicit cancel or on sender drop.
                _ = cancel_rx => {}
            }
        });

        Self {
            cancel: Some(cancel_tx),
        }
    }

    /// Cancel the deadline. No effect if it already expired.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn fires_after_deadline() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let timer = DeadlineTimer::arm(Duration::from_secs(20), move || async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert!(fired.load(Ordering::SeqCst));
        drop(timer);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_expiry() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let timer = DeadlineTimer::arm(Duration::from_secs(20), move || async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let timer = DeadlineTimer::arm(Duration::from_secs(20), move || async move {
            flag.store(true, Ordering::SeqCst);
        });
        drop(timer);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
