//! Wall-clock source
//!
//! The scheduler works in local wall time. `SystemClock` reads the host
//! clock; `MockClock` derives wall time from tokio's clock so paused-time
//! tests move timers and wall time together.

use chrono::{Duration, Local, NaiveDateTime};
use tokio::time::Instant;

pub trait Clock: Send + Sync {
    /// Current local wall time
    fn now(&self) -> NaiveDateTime;
}

/// Host clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Wall clock anchored to a fixed time and advanced by tokio's clock
#[derive(Debug, Clone)]
pub struct MockClock {
    anchor: NaiveDateTime,
    started: Instant,
}

impl MockClock {
    pub fn new(anchor: NaiveDateTime) -> Self {
        Self {
            anchor,
            started: Instant::now(),
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.started);
        self.anchor + Duration::from_std(elapsed).unwrap_or_else(|_| Duration::zero())
    }
}
