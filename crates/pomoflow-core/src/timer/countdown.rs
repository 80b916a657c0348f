//! Drift-corrected countdown arithmetic.
//!
//! A naive countdown subtracts one second per scheduler firing and drifts
//! as soon as the host fires late (throttled background timers, suspended
//! rendering). `Countdown` instead recomputes elapsed time from the
//! absolute start timestamp on every firing, so the wall-clock time to
//! completion matches the target no matter how irregularly the schedule
//! fires. The struct holds no timer of its own - the worker (or a test)
//! supplies each firing's timestamp.

/// Ephemeral state for one countdown run. Created on start, discarded on
/// stop or finish; never persisted.
#[derive(Debug, Clone)]
pub struct Countdown {
    /// Epoch milliseconds when the run was (last) armed.
    started_at_ms: u64,
    /// Whole seconds accounted for since start. Monotonic non-decreasing.
    elapsed_secs: u64,
    /// Total duration of the run in seconds.
    target_secs: u64,
    /// Displayed remaining seconds. Clamped at zero.
    remaining_secs: u64,
}

/// Result of accounting for one scheduler firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Remaining seconds to report.
    pub remaining_secs: u64,
    /// True once the run has consumed its full duration.
    pub finished: bool,
}

impl Countdown {
    pub fn new(target_secs: u64, now_ms: u64) -> Self {
        Self {
            started_at_ms: now_ms,
            elapsed_secs: 0,
            target_secs,
            remaining_secs: target_secs,
        }
    }

    /// Re-arm to a new duration: start timestamp and accounting reset, the
    /// run itself stays alive.
    pub fn rearm(&mut self, target_secs: u64, now_ms: u64) {
        *self = Self::new(target_secs, now_ms);
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn target_secs(&self) -> u64 {
        self.target_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Account for one scheduler firing at `now_ms`.
    ///
    /// The consumed gap is measured against the start timestamp, not
    /// accumulated per firing. The reported decrement is clamped two ways:
    /// down by the overshoot past the target, so a long stall lands the
    /// display exactly on zero rather than below it, and up to a minimum of
    /// one second, so every tick shows visible progress.
    pub fn advance(&mut self, now_ms: u64) -> Tick {
        let gap_from_start = round_to_secs(now_ms.saturating_sub(self.started_at_ms));
        let gap_secs = gap_from_start.saturating_sub(self.elapsed_secs);
        self.elapsed_secs += gap_secs;

        let overshoot = self.elapsed_secs.saturating_sub(self.target_secs);
        let reported = gap_secs.saturating_sub(overshoot).max(1);
        self.remaining_secs = self.remaining_secs.saturating_sub(reported);

        Tick {
            remaining_secs: self.remaining_secs,
            finished: self.elapsed_secs >= self.target_secs,
        }
    }
}

/// Milliseconds to the nearest whole second.
fn round_to_secs(ms: u64) -> u64 {
    (ms + 500) / 1000
}
