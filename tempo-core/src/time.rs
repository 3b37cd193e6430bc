//! Timestamps and clock abstraction
//!
//! Every sample carries an epoch-relative millisecond timestamp. The store
//! and the algebra only ever compare and subtract timestamps, so the origin
//! does not matter as long as one recording session sticks to one clock.

/// Timestamp in milliseconds since epoch (or session start for test clocks)
pub type Timestamp = u64;

/// Signed elapsed seconds from `earlier` to `later`.
///
/// Negative when the arguments are reversed, which deltas rely on to keep
/// subtraction total.
pub fn seconds_between(earlier: Timestamp, later: Timestamp) -> f64 {
    if later >= earlier {
        (later - earlier) as f64 / 1000.0
    } else {
        -((earlier - later) as f64 / 1000.0)
    }
}

/// Source of time for session bookkeeping
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs session-relative)
    fn is_wall_clock(&self) -> bool;

    /// Get precision in milliseconds
    fn precision_ms(&self) -> u32;
}

/// System time source (requires std)
///
/// ```
/// use tempo_core::time::{SystemClock, TimeSource};
///
/// let clock = SystemClock;
/// assert!(clock.is_wall_clock());
/// assert!(clock.now() > 0);
/// ```
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Fixed time source for tests and scripted scenarios
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Create a clock pinned at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Pin the clock to a new timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move the clock forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}
