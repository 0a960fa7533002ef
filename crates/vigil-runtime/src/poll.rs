#![forbid(unsafe_code)]

//! Deadline-driven poller registry.
//!
//! Each registered poller is a callback plus a cadence. Scheduling is
//! recursive single-shot: a poller that fires is rescheduled at
//! `now + current_interval`, so a cadence change takes effect on the next
//! cycle without touching the deadline already pending. The host pumps the
//! registry from its event loop with [`PollRegistry::run_due`] and may
//! sleep until [`PollRegistry::next_deadline`] between pumps.
//!
//! # Key Invariants
//!
//! - At most one pending deadline per poller (structural: one field).
//! - `increase_all` never moves a pending deadline; it only changes the
//!   interval used at the next reschedule.
//! - A poller's `current_interval` never exceeds
//!   `base_interval * factor^max_backoff_steps`: each entry stops
//!   compounding after `max_backoff_steps` multiplications.
//! - `restore_all` on a registry already at baseline is a no-op.
//! - Callback failure is contained: an `Err` or panic from one poller is
//!   logged and counted, the poller is rescheduled regardless, and no
//!   other poller is affected.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Compounding ceiling: how many times a poller's interval may be
/// multiplied before it stops growing.
pub const DEFAULT_MAX_BACKOFF_STEPS: u32 = 10;

/// Floor applied to registration intervals. A zero interval would make
/// `run_due` fire the poller on every pump.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// What a poller callback returns. `Err` is logged and swallowed; the
/// poller keeps its schedule.
pub type PollResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Opaque handle identifying a registered poller.
///
/// Diagnostic only: there is no unregister operation, pollers live as
/// long as the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollerId(u64);

impl fmt::Display for PollerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poller#{}", self.0)
    }
}

/// Diagnostic snapshot of one poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerStats {
    /// Cadence configured at registration.
    pub base_interval: Duration,

    /// Cadence currently in effect for the next reschedule.
    pub current_interval: Duration,

    /// Backoff multiplications taken since the last restore.
    pub backoff_steps: u32,

    /// Total callback invocations, including failed ones.
    pub fires: u64,

    /// Callback invocations that returned `Err` or panicked.
    pub errors: u64,
}

struct PollerEntry {
    id: PollerId,
    callback: Box<dyn FnMut() -> PollResult>,
    base_interval: Duration,
    current_interval: Duration,
    next_due: Instant,
    backoff_steps: u32,
    fires: u64,
    errors: u64,
}

/// An open set of recurring callback tasks with collective backoff.
pub struct PollRegistry {
    pollers: Vec<PollerEntry>,
    max_backoff_steps: u32,
    degraded: bool,
    next_id: u64,
}

impl PollRegistry {
    /// Create an empty registry with the default compounding ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_backoff_steps(DEFAULT_MAX_BACKOFF_STEPS)
    }

    /// Create an empty registry with an explicit compounding ceiling.
    #[must_use]
    pub fn with_max_backoff_steps(max_backoff_steps: u32) -> Self {
        Self {
            pollers: Vec::new(),
            max_backoff_steps,
            degraded: false,
            next_id: 0,
        }
    }

    /// Number of registered pollers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pollers.len()
    }

    /// Whether no poller is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pollers.is_empty()
    }

    /// Whether intervals are currently degraded from baseline.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The compounding ceiling this registry enforces per poller.
    #[must_use]
    pub fn max_backoff_steps(&self) -> u32 {
        self.max_backoff_steps
    }

    /// Register a recurring poller. The first fire is scheduled at
    /// `now + interval`; after each fire the poller is rescheduled at its
    /// then-current interval.
    ///
    /// Intervals below one millisecond are clamped up to it.
    pub fn register<F>(&mut self, now: Instant, interval: Duration, callback: F) -> PollerId
    where
        F: FnMut() -> PollResult + 'static,
    {
        let clamped = interval.max(MIN_INTERVAL);
        if clamped != interval {
            tracing::warn!(?interval, ?clamped, "poller interval clamped");
        }
        let id = PollerId(self.next_id);
        self.next_id += 1;
        self.pollers.push(PollerEntry {
            id,
            callback: Box::new(callback),
            base_interval: clamped,
            current_interval: clamped,
            next_due: now + clamped,
            backoff_steps: 0,
            fires: 0,
            errors: 0,
        });
        tracing::debug!(%id, interval = ?clamped, "poller registered");
        id
    }

    /// Fire every poller whose deadline has passed and reschedule each at
    /// its current interval. A poller that missed several periods fires
    /// once, not once per missed period. Returns the number fired.
    pub fn run_due(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        for entry in &mut self.pollers {
            if entry.next_due <= now {
                Self::fire(entry);
                entry.next_due = now + entry.current_interval;
                fired += 1;
            }
        }
        if fired > 0 {
            tracing::trace!(fired, "pollers fired");
        }
        fired
    }

    /// Multiply every poller's current interval by `factor`, in place.
    ///
    /// Pending deadlines are untouched; the new interval applies from each
    /// poller's next reschedule. Entries that already took
    /// `max_backoff_steps` multiplications stop compounding. Marks the
    /// registry degraded. Factors below 1.0 (or non-finite) are rejected.
    pub fn increase_all(&mut self, factor: f64) {
        if !factor.is_finite() || factor < 1.0 {
            tracing::warn!(factor, "ignoring invalid backoff factor");
            return;
        }
        for entry in &mut self.pollers {
            if entry.backoff_steps < self.max_backoff_steps {
                entry.current_interval = entry.current_interval.mul_f64(factor);
                entry.backoff_steps += 1;
            }
        }
        self.degraded = true;
        tracing::debug!(factor, pollers = self.pollers.len(), "poller intervals increased");
    }

    /// Reset every poller to its base interval, firing each immediately
    /// and rescheduling it at the restored cadence. Returns the number
    /// fired.
    ///
    /// No-op (returns 0) when the registry is already at baseline, so
    /// repeated calls are idempotent. Pollers registered after a restore
    /// are unaffected by it.
    pub fn restore_all(&mut self, now: Instant) -> usize {
        if !self.degraded {
            return 0;
        }
        let mut fired = 0;
        for entry in &mut self.pollers {
            entry.current_interval = entry.base_interval;
            entry.backoff_steps = 0;
            Self::fire(entry);
            entry.next_due = now + entry.base_interval;
            fired += 1;
        }
        self.degraded = false;
        tracing::debug!(pollers = fired, "poller intervals restored to baseline");
        fired
    }

    /// The earliest pending deadline, if any poller is registered. Hosts
    /// can sleep until this instant between pumps.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pollers.iter().map(|entry| entry.next_due).min()
    }

    /// Diagnostic snapshot of one poller.
    #[must_use]
    pub fn stats(&self, id: PollerId) -> Option<PollerStats> {
        self.pollers.iter().find(|entry| entry.id == id).map(|entry| PollerStats {
            base_interval: entry.base_interval,
            current_interval: entry.current_interval,
            backoff_steps: entry.backoff_steps,
            fires: entry.fires,
            errors: entry.errors,
        })
    }

    fn fire(entry: &mut PollerEntry) {
        entry.fires += 1;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)()));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                entry.errors += 1;
                tracing::warn!(id = %entry.id, %error, "poller callback failed");
            }
            Err(_) => {
                entry.errors += 1;
                tracing::warn!(id = %entry.id, "poller callback panicked");
            }
        }
    }
}

impl Default for PollRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PollRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollRegistry")
            .field("pollers", &self.pollers.len())
            .field("max_backoff_steps", &self.max_backoff_steps)
            .field("degraded", &self.degraded)
            .finish()
    }
}
