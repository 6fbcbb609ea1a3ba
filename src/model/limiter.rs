use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, debug_span, info, Instrument};

/// Returned by [`ModelRateLimiter::acquire`] once the limiter is shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("model rate limiter has been shut down")]
pub struct LimiterClosed;

/// Token bucket shared by every extraction that calls the model
///
/// Create one at startup, share it behind an `Arc`, and call
/// [`shutdown`](Self::shutdown) on exit. Waiters queue on a fair mutex so
/// callers are served in arrival order.
pub struct ModelRateLimiter {
    limiter: DefaultDirectRateLimiter,
    queue: Mutex<()>,
    closed: AtomicBool,
    closing: Notify,
}

impl ModelRateLimiter {
    pub fn new(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::direct(quota),
            queue: Mutex::new(()),
            closed: AtomicBool::new(false),
            closing: Notify::new(),
        }
    }

    /// Allow `requests` model calls per minute, with bursts of the same size
    pub fn per_minute(requests: NonZeroU32) -> Self {
        Self::new(Quota::per_minute(requests))
    }

    /// Wait until a token is available
    pub async fn acquire(&self) -> Result<(), LimiterClosed> {
        let closing = self.closing.notified();
        tokio::pin!(closing);
        closing.as_mut().enable();

        if self.is_shut_down() {
            return Err(LimiterClosed);
        }

        let wait = async {
            let _turn = self.queue.lock().await;
            self.limiter.until_ready().await;
        };

        tokio::select! {
            _ = wait.instrument(debug_span!("limiter")) => {
                if self.is_shut_down() {
                    return Err(LimiterClosed);
                }
                debug!("Acquired model rate limit token");
                Ok(())
            }
            _ = &mut closing => Err(LimiterClosed),
        }
    }

    /// Reject new and pending acquisitions
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Shutting down model rate limiter");
        }
        self.closing.notify_waiters();
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
