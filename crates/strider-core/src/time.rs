//! Fixed-timestep simulation time.
//!
//! The locomotion controller is only ever advanced by a constant `dt`. The
//! render loop runs at whatever rate the host gives it, so [`TickClock`]
//! converts variable frame deltas into a whole number of fixed ticks.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

// ---------------------------------------------------------------------------
// SimTime
// ---------------------------------------------------------------------------

/// Integer-nanosecond simulation clock with a tick counter.
///
/// Elapsed time is stored as a `u64` nanosecond count so that thousands of
/// fixed ticks do not accumulate floating-point drift.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct SimTime {
    nanos: u64,
    ticks: u64,
}

impl SimTime {
    /// Time zero, no ticks taken.
    #[must_use]
    pub const fn new() -> Self {
        Self { nanos: 0, ticks: 0 }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Number of fixed ticks taken so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC
    }

    /// Record one tick of `delta_nanos`.
    pub const fn tick(&mut self, delta_nanos: u64) {
        self.nanos = self.nanos.saturating_add(delta_nanos);
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Record one tick of `delta_secs` seconds.
    pub fn tick_secs(&mut self, delta_secs: f64) {
        self.tick(secs_to_nanos(delta_secs));
    }

    /// Back to time zero.
    pub const fn reset(&mut self) {
        self.nanos = 0;
        self.ticks = 0;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.nanos / 1_000_000_000;
        let millis = (self.nanos % 1_000_000_000) / 1_000_000;
        write!(f, "{secs}.{millis:03}s (tick {})", self.ticks)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn secs_to_nanos(secs: f64) -> u64 {
    if secs <= 0.0 {
        0
    } else {
        (secs * NANOS_PER_SEC).round() as u64
    }
}

// ---------------------------------------------------------------------------
// TickClock
// ---------------------------------------------------------------------------

/// Accumulates frame time and dispenses fixed ticks.
///
/// Implements the "fix your timestep" pattern with a per-frame cap on the
/// number of ticks, so a long stall cannot snowball into ever longer frames.
/// Whole ticks still pending when the cap is reached are discarded, which
/// keeps the backlog below one tick and [`alpha`](Self::alpha) meaningful.
///
/// ```
/// use std::time::Duration;
/// use strider_core::time::TickClock;
///
/// let mut clock = TickClock::new(0.01);
/// clock.feed(Duration::from_millis(35));
/// let mut ticks = 0;
/// while clock.next_tick() {
///     ticks += 1;
/// }
/// assert_eq!(ticks, 3);
/// ```
#[derive(Debug, Clone)]
pub struct TickClock {
    time: SimTime,
    pending_nanos: u64,
    tick_nanos: u64,
    tick_secs: f64,
    max_ticks_per_frame: u32,
    ticks_this_frame: u32,
    dropped_ticks: u64,
}

impl TickClock {
    /// Create a clock with a fixed tick length in seconds.
    pub fn new(tick_secs: f64) -> Self {
        Self {
            time: SimTime::new(),
            pending_nanos: 0,
            tick_nanos: secs_to_nanos(tick_secs),
            tick_secs,
            max_ticks_per_frame: 8,
            ticks_this_frame: 0,
            dropped_ticks: 0,
        }
    }

    /// Set the per-frame tick cap.
    #[must_use]
    pub const fn with_max_ticks_per_frame(mut self, max_ticks: u32) -> Self {
        self.max_ticks_per_frame = max_ticks;
        self
    }

    /// Feed a frame delta and reset the per-frame tick counter.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn feed(&mut self, delta: Duration) {
        self.pending_nanos = self.pending_nanos.saturating_add(delta.as_nanos() as u64);
        self.ticks_this_frame = 0;
    }

    /// Consume one tick if enough time is pending and the cap allows it.
    ///
    /// Advances [`SimTime`] on success. Hitting the cap discards the whole
    /// ticks left in the backlog and keeps the sub-tick remainder.
    pub const fn next_tick(&mut self) -> bool {
        if self.tick_nanos == 0 {
            return false;
        }
        if self.ticks_this_frame >= self.max_ticks_per_frame {
            self.dropped_ticks += self.pending_nanos / self.tick_nanos;
            self.pending_nanos %= self.tick_nanos;
            return false;
        }
        if self.pending_nanos < self.tick_nanos {
            return false;
        }
        self.pending_nanos -= self.tick_nanos;
        self.ticks_this_frame += 1;
        self.time.tick(self.tick_nanos);
        true
    }

    /// Fraction of the next tick already pending, in `[0, 1)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn alpha(&self) -> f64 {
        if self.tick_nanos == 0 {
            return 0.0;
        }
        (self.pending_nanos as f64 / self.tick_nanos as f64).min(1.0)
    }

    /// The fixed tick length in seconds.
    #[must_use]
    pub const fn dt(&self) -> f64 {
        self.tick_secs
    }

    /// Ticks discarded so far because a frame hit the per-frame cap.
    #[must_use]
    pub const fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Simulation time accumulated by consumed ticks.
    #[must_use]
    pub const fn time(&self) -> SimTime {
        self.time
    }

    /// Drop pending time and rewind to zero.
    pub const fn reset(&mut self) {
        self.time.reset();
        self.pending_nanos = 0;
        self.ticks_this_frame = 0;
        self.dropped_ticks = 0;
    }
}
