#![forbid(unsafe_code)]

//! Vigil runtime: recurring pollers with idle-aware backoff.
//!
//! # Key Components
//!
//! - [`PollRegistry`] - an open set of recurring callback tasks, each on
//!   its own cadence, scheduled by deadline and pumped from the host's
//!   event loop
//! - [`IdleDriver`] - the activity/idle policy that collectively slows
//!   every poller during sustained inactivity and restores baseline
//!   cadence the instant the user returns
//!
//! # Role in Vigil
//! `vigil-runtime` is the background-work side of the library. It never
//! blocks: the host loop calls [`PollRegistry::run_due`] with the current
//! time (sleeping until [`PollRegistry::next_deadline`] if it wants), and
//! forwards its input events to [`IdleDriver::observe`]. Pollers run for
//! the lifetime of the host; there is no unregister.
//!
//! # How it fits in the system
//! The registry is independent of the overlay stack in `vigil-overlay`;
//! the two compose only by sharing the host's event loop. Activity
//! classification comes from `vigil-core`'s canonical events.

pub mod idle;
pub mod poll;

pub use idle::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_IDLE_TICK_PERIOD, DEFAULT_MAX_IDLE_TICKS, IdleConfig,
    IdleDriver,
};
pub use poll::{DEFAULT_MAX_BACKOFF_STEPS, PollRegistry, PollResult, PollerId, PollerStats};
