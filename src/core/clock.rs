//! Monotonic time sources sampled by timed conditions and the engine.
//!
//! Time is expressed as a [`Duration`] since the clock's own origin, so two
//! readings can be subtracted without caring about wall-clock adjustments.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time.
///
/// Timed conditions sample the clock at evaluation time, so the granularity
/// of a timed transition is exactly the caller's poll interval.
pub trait Clock: Debug + Send + Sync {
    /// Elapsed time since the clock's origin.
    fn now(&self) -> Duration;

    /// Pause the calling thread; used between ticks by `run`.
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock shared between a layout, its conditions and the engine.
pub type SharedClock = Arc<dyn Clock>;

/// Clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Convenience constructor returning the clock as a [`SharedClock`].
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually driven clock.
///
/// Clones share the same reading. `sleep` advances the reading instead of
/// blocking, which lets `run` loops execute instantly under test.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.now(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(to_nanos(duration), Ordering::SeqCst);
    }

    /// Set an absolute reading. Callers must not move the clock backwards.
    pub fn set(&self, reading: Duration) {
        self.nanos.store(to_nanos(reading), Ordering::SeqCst);
    }

    /// Clone of this clock as a [`SharedClock`].
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

fn to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
