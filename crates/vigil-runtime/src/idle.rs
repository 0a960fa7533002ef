#![forbid(unsafe_code)]

//! Idle detection and the collective backoff policy.
//!
//! The host arranges a fixed-period background tick (see
//! [`IdleConfig::tick_period`]) and feeds it to
//! [`IdleDriver::on_idle_tick`]; every input event goes through
//! [`IdleDriver::observe`]. While the user is away the driver compounds
//! the registry's intervals once per tick, inside the window
//! `1 < idle_ticks < max_idle_ticks`: the first tick is grace, and past
//! the ceiling pollers keep running at the last reached cadence. The
//! moment activity is seen, the tick counter resets and the registry is
//! restored to baseline in the same call, so the two can never be
//! observed out of sync.

use std::time::{Duration, Instant};

use vigil_core::event::Event;

use crate::poll::PollRegistry;

/// Default cadence of the host's background idle tick.
pub const DEFAULT_IDLE_TICK_PERIOD: Duration = Duration::from_secs(30);

/// Default multiplier applied to every poller interval per idle tick.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.5;

/// Default ceiling on the idle-tick compounding window.
pub const DEFAULT_MAX_IDLE_TICKS: u32 = 10;

/// Tuning for the idle policy. All values are fixed at initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleConfig {
    /// How often the host fires the background idle tick.
    pub tick_period: Duration,

    /// Multiplier handed to [`PollRegistry::increase_all`] per idle tick.
    pub backoff_factor: f64,

    /// Idle ticks after which compounding stops.
    pub max_idle_ticks: u32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_IDLE_TICK_PERIOD,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            max_idle_ticks: DEFAULT_MAX_IDLE_TICKS,
        }
    }
}

/// Tracks user inactivity and drives the registry's backoff.
#[derive(Debug, Clone)]
pub struct IdleDriver {
    config: IdleConfig,
    idle_ticks: u32,
}

impl IdleDriver {
    /// Create a driver with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(IdleConfig::default())
    }

    /// Create a driver with explicit tuning.
    #[must_use]
    pub fn with_config(config: IdleConfig) -> Self {
        Self {
            config,
            idle_ticks: 0,
        }
    }

    /// The driver's tuning.
    #[must_use]
    pub fn config(&self) -> IdleConfig {
        self.config
    }

    /// Background ticks since the last observed activity.
    #[must_use]
    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    /// Whether at least one idle tick has elapsed without activity.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.idle_ticks > 0
    }

    /// The host fired its background idle tick.
    ///
    /// Advances the idle counter and, while
    /// `1 < idle_ticks < max_idle_ticks`, compounds the registry's
    /// intervals by one backoff step. The first idle tick never backs
    /// off; past the ceiling the counter keeps advancing but intervals
    /// stay where they are.
    pub fn on_idle_tick(&mut self, registry: &mut PollRegistry) {
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks > 1 && self.idle_ticks < self.config.max_idle_ticks {
            registry.increase_all(self.config.backoff_factor);
            tracing::debug!(idle_ticks = self.idle_ticks, "idle backoff step");
        }
    }

    /// User activity was detected.
    ///
    /// Resets the idle counter and restores the registry to baseline in
    /// the same synchronous call. Returns `true` if the driver was idle
    /// (the restore ran), `false` if this was just more activity.
    pub fn on_activity(&mut self, now: Instant, registry: &mut PollRegistry) -> bool {
        if self.idle_ticks == 0 {
            return false;
        }
        tracing::debug!(idle_ticks = self.idle_ticks, "activity after idle, restoring");
        self.idle_ticks = 0;
        registry.restore_all(now);
        true
    }

    /// Classify an event and treat it as activity if it qualifies.
    ///
    /// Returns `true` if the event was activity *and* ended an idle
    /// period.
    pub fn observe(&mut self, event: &Event, now: Instant, registry: &mut PollRegistry) -> bool {
        if event.is_user_activity() {
            self.on_activity(now, registry)
        } else {
            false
        }
    }
}

impl Default for IdleDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::event::{Event, KeyCode, KeyEvent, MouseEvent, MouseEventKind};

    fn registry_with_poller(now: Instant, interval: Duration) -> (PollRegistry, crate::poll::PollerId) {
        let mut registry = PollRegistry::new();
        let id = registry.register(now, interval, || Ok(()));
        (registry, id)
    }

    #[test]
    fn fresh_driver_is_not_idle() {
        let driver = IdleDriver::new();
        assert!(!driver.is_idle());
        assert_eq!(driver.idle_ticks(), 0);
    }

    #[test]
    fn first_idle_tick_does_not_back_off() {
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        driver.on_idle_tick(&mut registry);
        assert_eq!(driver.idle_ticks(), 1);
        assert_eq!(
            registry.stats(id).unwrap().current_interval,
            Duration::from_millis(1000)
        );
        assert!(!registry.is_degraded());
    }

    #[test]
    fn second_tick_starts_compounding() {
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        driver.on_idle_tick(&mut registry);
        driver.on_idle_tick(&mut registry);
        assert_eq!(
            registry.stats(id).unwrap().current_interval,
            Duration::from_millis(1500)
        );
        assert!(registry.is_degraded());
    }

    #[test]
    fn five_idle_ticks_reach_the_documented_cadence() {
        // 1000ms base, factor 1.5: ticks 2-5 back off, so 1000 * 1.5^4.
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        for _ in 0..5 {
            driver.on_idle_tick(&mut registry);
        }
        assert_eq!(
            registry.stats(id).unwrap().current_interval,
            Duration::from_micros(5_062_500)
        );
    }

    #[test]
    fn compounding_stops_at_the_tick_ceiling() {
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        for _ in 0..50 {
            driver.on_idle_tick(&mut registry);
        }
        // Ticks 2..max_idle_ticks-1 back off: max_idle_ticks - 2 steps.
        let steps = (DEFAULT_MAX_IDLE_TICKS - 2) as i32;
        let ceiling = Duration::from_millis(1000).mul_f64(DEFAULT_BACKOFF_FACTOR.powi(steps));
        assert_eq!(registry.stats(id).unwrap().current_interval, ceiling);
        assert_eq!(driver.idle_ticks(), 50);
    }

    #[test]
    fn activity_restores_exactly_to_baseline() {
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        for _ in 0..5 {
            driver.on_idle_tick(&mut registry);
        }
        let restored = driver.on_activity(now + Duration::from_secs(150), &mut registry);
        assert!(restored);
        assert_eq!(driver.idle_ticks(), 0);
        assert_eq!(
            registry.stats(id).unwrap().current_interval,
            Duration::from_millis(1000)
        );
        assert!(!registry.is_degraded());
    }

    #[test]
    fn activity_while_active_is_a_no_op() {
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        assert!(!driver.on_activity(now, &mut registry));
        // No spurious immediate fire.
        assert_eq!(registry.stats(id).unwrap().fires, 0);
    }

    #[test]
    fn restore_fires_pollers_immediately() {
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        driver.on_idle_tick(&mut registry);
        driver.on_idle_tick(&mut registry);
        driver.on_activity(now + Duration::from_secs(60), &mut registry);
        assert_eq!(registry.stats(id).unwrap().fires, 1);
    }

    #[test]
    fn observe_treats_mouse_as_activity() {
        let now = Instant::now();
        let (mut registry, _) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        driver.on_idle_tick(&mut registry);
        let moved = Event::Mouse(MouseEvent::new(MouseEventKind::Moved, 1, 1));
        assert!(driver.observe(&moved, now, &mut registry));
        assert_eq!(driver.idle_ticks(), 0);
    }

    #[test]
    fn observe_ignores_ticks_and_focus_loss() {
        let now = Instant::now();
        let (mut registry, _) = registry_with_poller(now, Duration::from_millis(1000));
        let mut driver = IdleDriver::new();

        driver.on_idle_tick(&mut registry);
        assert!(!driver.observe(&Event::Tick, now, &mut registry));
        assert!(!driver.observe(&Event::Focus(false), now, &mut registry));
        assert_eq!(driver.idle_ticks(), 1);

        let key = Event::Key(KeyEvent::new(KeyCode::Char('q')));
        assert!(driver.observe(&key, now, &mut registry));
        assert_eq!(driver.idle_ticks(), 0);
    }

    #[test]
    fn custom_config_window_is_respected() {
        let now = Instant::now();
        let (mut registry, id) = registry_with_poller(now, Duration::from_millis(100));
        let mut driver = IdleDriver::with_config(IdleConfig {
            tick_period: Duration::from_secs(5),
            backoff_factor: 2.0,
            max_idle_ticks: 4,
        });

        for _ in 0..10 {
            driver.on_idle_tick(&mut registry);
        }
        // Only ticks 2 and 3 fall inside 1 < t < 4.
        assert_eq!(
            registry.stats(id).unwrap().current_interval,
            Duration::from_millis(400)
        );
    }
}
