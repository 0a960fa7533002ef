//! End-to-end idle cycle: active use, sustained inactivity with
//! compounding backoff, then instant restoration on the first sign of
//! life. Time is virtual throughout; the registry only ever sees the
//! instants the host hands it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use vigil_core::event::{Event, MouseEvent, MouseEventKind};
use vigil_runtime::{IdleDriver, PollRegistry};

fn counting_poller(
    registry: &mut PollRegistry,
    now: Instant,
    interval: Duration,
) -> (vigil_runtime::PollerId, Rc<Cell<u64>>) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    let id = registry.register(now, interval, move || {
        inner.set(inner.get() + 1);
        Ok(())
    });
    (id, count)
}

#[test]
fn idle_backoff_and_restore_cycle() {
    let start = Instant::now();
    let mut registry = PollRegistry::new();
    let mut driver = IdleDriver::new();

    let (maintenance, maintenance_count) =
        counting_poller(&mut registry, start, Duration::from_millis(500));
    let (export, export_count) = counting_poller(&mut registry, start, Duration::from_millis(1000));

    // Active use: pump the loop every 250ms for three seconds.
    let mut now = start;
    for _ in 0..12 {
        now += Duration::from_millis(250);
        registry.run_due(now);
    }
    assert_eq!(maintenance_count.get(), 6);
    assert_eq!(export_count.get(), 3);
    assert!(!registry.is_degraded());

    // The user walks away: five background idle ticks. The first is
    // grace, ticks two through five each compound by 1.5x.
    for _ in 0..5 {
        driver.on_idle_tick(&mut registry);
    }
    assert_eq!(driver.idle_ticks(), 5);
    assert!(registry.is_degraded());
    assert_eq!(
        registry.stats(maintenance).unwrap().current_interval,
        Duration::from_micros(2_531_250)
    );
    assert_eq!(
        registry.stats(export).unwrap().current_interval,
        Duration::from_micros(5_062_500)
    );

    // Pollers keep running at the degraded cadence.
    now = start + Duration::from_secs(200);
    registry.run_due(now);
    assert_eq!(maintenance_count.get(), 7);
    assert_eq!(export_count.get(), 4);

    // First mouse twitch: counter resets and every poller is restored to
    // baseline with an immediate fire, in the same call.
    now += Duration::from_millis(1);
    let twitch = Event::Mouse(MouseEvent::new(MouseEventKind::Moved, 12, 4));
    assert!(driver.observe(&twitch, now, &mut registry));

    assert_eq!(driver.idle_ticks(), 0);
    assert!(!registry.is_degraded());
    assert_eq!(maintenance_count.get(), 8);
    assert_eq!(export_count.get(), 5);
    assert_eq!(
        registry.stats(maintenance).unwrap().current_interval,
        Duration::from_millis(500)
    );
    assert_eq!(
        registry.stats(export).unwrap().current_interval,
        Duration::from_millis(1000)
    );
    assert_eq!(
        registry.next_deadline(),
        Some(now + Duration::from_millis(500))
    );

    // More activity right away is a no-op: no double restore, no extra
    // fires.
    let key_now = now + Duration::from_millis(10);
    assert!(!driver.observe(&twitch, key_now, &mut registry));
    assert_eq!(maintenance_count.get(), 8);
    assert_eq!(export_count.get(), 5);
}
