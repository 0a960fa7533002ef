#![forbid(unsafe_code)]

//! Vigil public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports the common types from the internal crates and offers a
//! lightweight prelude for day-to-day usage.
//!
//! Vigil is focus containment and idle-aware background polling for
//! event-loop-driven UIs: [`OverlayStack`] keeps Tab/Shift+Tab inside the
//! topmost open dialog and restores focus on close, [`PollRegistry`] runs
//! recurring tasks on their own cadences, and [`IdleDriver`] slows the
//! whole registry down while the user is away.

// --- Core re-exports -------------------------------------------------------

pub use vigil_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
    PasteEvent,
};
pub use vigil_core::host::{FocusHost, StackLayer, SurfacePart};
pub use vigil_core::memory_tree::{MemoryTree, NodeId};

// --- Overlay re-exports ----------------------------------------------------

#[cfg(feature = "overlay")]
pub use vigil_overlay::{KeyDisposition, OverlayError, OverlayStack, nearest_focusable};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use vigil_runtime::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_IDLE_TICK_PERIOD, DEFAULT_MAX_BACKOFF_STEPS,
    DEFAULT_MAX_IDLE_TICKS, IdleConfig, IdleDriver, PollRegistry, PollResult, PollerId,
    PollerStats,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    //! Everyday imports for Vigil hosts.

    pub use crate::{Event, FocusHost, KeyCode, KeyEvent, Modifiers, StackLayer, SurfacePart};

    #[cfg(feature = "overlay")]
    pub use crate::{KeyDisposition, OverlayError, OverlayStack};

    #[cfg(feature = "runtime")]
    pub use crate::{IdleConfig, IdleDriver, PollRegistry, PollResult};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[cfg(all(feature = "overlay", feature = "runtime"))]
    #[test]
    fn facade_composes_both_subsystems() {
        use std::time::{Duration, Instant};
        use vigil_core::memory_tree::{MemoryTree, Section};

        let now = Instant::now();
        let mut registry = PollRegistry::new();
        let mut driver = IdleDriver::new();
        registry.register(now, Duration::from_secs(1), || Ok(()));

        let mut tree = MemoryTree::new();
        let trigger = tree.insert_button(tree.root(), Section::Chrome);
        let dialog = tree.insert_container(tree.root());
        tree.insert_focusable(dialog, Section::Body);

        let mut stack = OverlayStack::new();
        stack.on_will_show(&mut tree, dialog);
        stack.on_shown(&mut tree, dialog, Some(trigger)).unwrap();

        // The tab keydown that the overlay passes through still counts as
        // activity for the idle driver.
        let key = Event::Key(KeyEvent::new(KeyCode::Tab));
        driver.on_idle_tick(&mut registry);
        assert!(driver.observe(&key, now, &mut registry));

        stack.on_hidden(&mut tree, dialog);
        assert!(stack.is_empty());
    }
}
