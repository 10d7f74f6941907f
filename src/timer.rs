/// Timer abstraction driving the pick animation and notice expiry
///
/// Everything runs on one logical thread, so timers are not required to be
/// `Send`; the browser implementation wraps `setTimeout` promises.
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::time::Duration;

#[async_trait(?Send)]
pub trait Timer {
    /// Suspend the current operation for `duration`
    async fn sleep(&self, duration: Duration);

    /// Monotonic time since some fixed origin
    fn now(&self) -> Duration;
}

/// Timer backed by the tokio runtime clock
///
/// Only available with the `tokio-runtime` feature (not on WASM).
#[cfg(feature = "tokio-runtime")]
#[derive(Debug, Clone, Copy)]
pub struct TokioTimer {
    origin: tokio::time::Instant,
}

#[cfg(feature = "tokio-runtime")]
impl TokioTimer {
    pub fn new() -> Self {
        TokioTimer {
            origin: tokio::time::Instant::now(),
        }
    }
}

#[cfg(feature = "tokio-runtime")]
impl Default for TokioTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Timer with a virtual clock: sleeping returns at once and advances the clock.
///
/// Every requested sleep is recorded, so tests can check the animation timing
/// without waiting for it.
#[derive(Debug, Default)]
pub struct VirtualTimer {
    now: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl VirtualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Timer for VirtualTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Duration {
        self.now.get()
    }
}
