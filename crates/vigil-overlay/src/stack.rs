#![forbid(unsafe_code)]

//! The dialog stack and tab trap.
//!
//! # How it works
//!
//! 1. `on_will_show` assigns the opening dialog a stacking layer strictly
//!    above everything assigned before it (backdrop included) and hands it
//!    to the host via [`FocusHost::raise`]. No focus changes yet.
//! 2. `on_shown` runs once the opening transition finishes: it records the
//!    triggering control, gives the dialog initial focus, computes the
//!    first/last tabbable pair, and pushes the dialog entry. The top entry
//!    is always the active tab trap.
//! 3. `on_key` handles only the wrap-around edges: Tab on the last
//!    tabbable wraps to the first, Shift+Tab on the first wraps to the
//!    last. Everything else passes through.
//! 4. `on_hidden` restores focus to the recorded trigger (or the nearest
//!    focusable neighbour if the trigger is gone), pops the entry, and
//!    reactivates the parent dialog's trap with freshly recomputed
//!    tabbables.
//!
//! # Invariants
//!
//! - Entry order is open order; the top entry is the trap target.
//! - The trigger stack stays LIFO-paired with `on_hidden` even when
//!   `on_shown` failed and pushed no entry.
//! - Layer assignments are strictly increasing for the life of the stack.
//!
//! Callers guarantee `will_show → shown → hidden` ordering per dialog and
//! strict LIFO nesting across dialogs; the stack will desynchronize under
//! interleavings that violate that contract.

use core::fmt;

use vigil_core::event::{KeyEvent, KeyEventKind};
use vigil_core::host::{FocusHost, StackLayer, SurfacePart};

/// First layer handed out by a fresh stack. Hosts put their base content
/// below this.
const LAYER_BASE: u32 = 100;

/// Errors raised while opening a dialog.
///
/// All three indicate a dialog authored without the content the focus
/// contract needs. They surface immediately from [`OverlayStack::on_shown`]
/// and must not be swallowed: letting such a dialog open would strand
/// keyboard focus for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayError {
    /// The dialog was shown without a triggering control, so focus could
    /// never be restored on close.
    MissingTrigger,

    /// The dialog has no focusable element anywhere, so initial focus
    /// cannot be placed.
    NoFocusableElement,

    /// The dialog has no tabbable descendants, so no tab trap can be
    /// computed.
    NoTabbableElement,
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::MissingTrigger => {
                write!(f, "dialog shown without a triggering control")
            }
            OverlayError::NoFocusableElement => {
                write!(f, "dialog contains no focusable element")
            }
            OverlayError::NoTabbableElement => {
                write!(f, "dialog contains no tabbable element")
            }
        }
    }
}

impl std::error::Error for OverlayError {}

/// What the key handler decided about an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The event was consumed (focus was wrapped); the caller must
    /// suppress the host's default handling.
    Handled,

    /// Not ours; let the host's default handling run.
    Pass,
}

#[derive(Debug, Clone, Copy)]
struct DialogEntry<N> {
    dialog: N,
    first_tabbable: N,
    last_tabbable: N,
}

/// A LIFO stack of open overlay dialogs with an active tab trap on top.
///
/// Generic over the host's node handle; all tree access goes through a
/// [`FocusHost`] passed into each operation.
#[derive(Debug, Clone)]
pub struct OverlayStack<N> {
    entries: Vec<DialogEntry<N>>,
    triggers: Vec<N>,
    next_layer: u32,
}

impl<N: Copy + Eq + fmt::Debug> OverlayStack<N> {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            triggers: Vec::new(),
            next_layer: LAYER_BASE,
        }
    }

    /// Number of dialogs currently open (shown and not yet hidden).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Whether no dialog is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded triggers awaiting their `on_hidden`.
    ///
    /// Equal to [`depth`](Self::depth) unless an `on_shown` failed, in
    /// which case the trigger stack runs ahead until the matching
    /// `on_hidden` drains it.
    #[must_use]
    pub fn trigger_depth(&self) -> usize {
        self.triggers.len()
    }

    /// The dialog currently holding the tab trap, if any.
    #[must_use]
    pub fn active_dialog(&self) -> Option<N> {
        self.entries.last().map(|entry| entry.dialog)
    }

    /// The active trap's `(first_tabbable, last_tabbable)` pair, if any.
    #[must_use]
    pub fn active_trap(&self) -> Option<(N, N)> {
        self.entries
            .last()
            .map(|entry| (entry.first_tabbable, entry.last_tabbable))
    }

    /// A dialog is starting its opening transition.
    ///
    /// Assigns the dialog and its backdrop layers strictly above every
    /// layer assigned before, so new dialogs always render on top. No
    /// focus changes happen here.
    pub fn on_will_show<H>(&mut self, host: &mut H, dialog: N)
    where
        H: FocusHost<Node = N>,
    {
        let layer = StackLayer::new(self.next_layer, self.next_layer + 1);
        self.next_layer += 2;
        host.raise(dialog, layer);
        #[cfg(feature = "tracing")]
        tracing::trace!(?dialog, %layer, "dialog raised");
    }

    /// A dialog finished its opening transition.
    ///
    /// Records `trigger` for focus restoration, places initial focus
    /// (body, then footer buttons, then anywhere in the dialog), computes
    /// the tab-trap bounds, and pushes the dialog entry.
    ///
    /// # Errors
    ///
    /// [`OverlayError::MissingTrigger`] if `trigger` is `None` (nothing is
    /// recorded); [`OverlayError::NoFocusableElement`] /
    /// [`OverlayError::NoTabbableElement`] if the dialog has no focusable
    /// content (the trigger stays recorded so the close signal still
    /// pairs up).
    pub fn on_shown<H>(
        &mut self,
        host: &mut H,
        dialog: N,
        trigger: Option<N>,
    ) -> Result<(), OverlayError>
    where
        H: FocusHost<Node = N>,
    {
        let trigger = trigger.ok_or(OverlayError::MissingTrigger)?;
        self.triggers.push(trigger);

        let initial = Self::initial_focus(host, dialog)?;
        host.focus(initial);

        let tabbables = host.focusables(dialog, SurfacePart::Whole);
        let (first, last) = match (tabbables.first(), tabbables.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(OverlayError::NoTabbableElement),
        };

        self.entries.push(DialogEntry {
            dialog,
            first_tabbable: first,
            last_tabbable: last,
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(?dialog, depth = self.entries.len(), "dialog shown, trap active");
        Ok(())
    }

    fn initial_focus<H>(host: &H, dialog: N) -> Result<N, OverlayError>
    where
        H: FocusHost<Node = N>,
    {
        for part in [SurfacePart::Body, SurfacePart::Footer, SurfacePart::Whole] {
            if let Some(&found) = host.focusables(dialog, part).first() {
                return Ok(found);
            }
        }
        Err(OverlayError::NoFocusableElement)
    }

    /// A dialog fully closed.
    ///
    /// Pops the recorded trigger and refocuses it if it is still attached
    /// and focusable; otherwise focuses the nearest focusable neighbour
    /// found by [`nearest_focusable`], or leaves focus alone if there is
    /// none. Then pops the dialog entry (guarded on the handle, so a
    /// failed `on_shown` cannot desynchronize the stack) and reactivates
    /// the parent dialog's trap with tabbables recomputed from the host's
    /// current state.
    pub fn on_hidden<H>(&mut self, host: &mut H, dialog: N)
    where
        H: FocusHost<Node = N>,
    {
        if let Some(trigger) = self.triggers.pop() {
            if host.is_attached(trigger) && host.is_focusable(trigger) {
                host.focus(trigger);
            } else if let Some(fallback) = nearest_focusable(host, trigger) {
                host.focus(fallback);
            } else {
                // Focus restore failed; leave focus where it is.
                #[cfg(feature = "tracing")]
                tracing::debug!(?trigger, "no focusable neighbour, focus not restored");
            }
        }

        if self.entries.last().is_some_and(|entry| entry.dialog == dialog) {
            self.entries.pop();
        }

        if let Some(top) = self.entries.last_mut() {
            let tabbables = host.focusables(top.dialog, SurfacePart::Whole);
            match (tabbables.first(), tabbables.last()) {
                (Some(&first), Some(&last)) => {
                    top.first_tabbable = first;
                    top.last_tabbable = last;
                }
                _ => {
                    // Parent lost all focusables while covered; keep the
                    // last known pair (both are unfocusable now, so the
                    // trap edges simply stop matching).
                    #[cfg(feature = "tracing")]
                    tracing::warn!(dialog = ?top.dialog, "parent dialog has no tabbables left");
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?dialog, depth = self.entries.len(), "dialog hidden");
    }

    /// Global keydown hook for the tab trap.
    ///
    /// Only the wrap-around edges are handled: Shift+Tab (or BackTab) on
    /// the active dialog's first tabbable wraps focus to its last, and
    /// plain Tab on the last wraps to the first. Any other key, focus
    /// position, or key-release passes through untouched; in-between tab
    /// movement stays inside the dialog because the dialog's own structure
    /// constrains it.
    pub fn on_key<H>(&self, host: &mut H, key: KeyEvent) -> KeyDisposition
    where
        H: FocusHost<Node = N>,
    {
        let Some(entry) = self.entries.last() else {
            return KeyDisposition::Pass;
        };
        if key.kind == KeyEventKind::Release {
            return KeyDisposition::Pass;
        }
        if !key.is_tab_forward() && !key.is_tab_backward() {
            return KeyDisposition::Pass;
        }
        let Some(focused) = host.focused() else {
            return KeyDisposition::Pass;
        };

        if key.is_tab_backward() && focused == entry.first_tabbable {
            host.focus(entry.last_tabbable);
            KeyDisposition::Handled
        } else if key.is_tab_forward() && focused == entry.last_tabbable {
            host.focus(entry.first_tabbable);
            KeyDisposition::Handled
        } else {
            KeyDisposition::Pass
        }
    }
}

impl<N: Copy + Eq + fmt::Debug> Default for OverlayStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the nearest focusable node to a vacated position.
///
/// Scans the previous-sibling chain of `start`, then moves to the parent
/// (the parent itself is a candidate) and repeats, terminating at the
/// root. Works from detached nodes as long as the host retains their
/// position links.
pub fn nearest_focusable<H: FocusHost>(host: &H, start: H::Node) -> Option<H::Node> {
    let mut node = start;
    loop {
        let mut sibling = host.prev_sibling(node);
        while let Some(candidate) = sibling {
            if host.is_focusable(candidate) {
                return Some(candidate);
            }
            sibling = host.prev_sibling(candidate);
        }
        let parent = host.parent(node)?;
        if host.is_focusable(parent) {
            return Some(parent);
        }
        node = parent;
    }
}
