#![forbid(unsafe_code)]

//! The focus-host abstraction.
//!
//! Vigil owns no UI tree. The host application exposes its tree through
//! [`FocusHost`], and the overlay stack drives focus exclusively through
//! this trait. Anything with parent/child structure, a notion of
//! focusability, and a current-focus register can implement it: a retained
//! DOM, a TUI widget arena, or the in-memory reference tree in
//! [`crate::memory_tree`].
//!
//! # Contract
//!
//! - Node handles are cheap copies that stay valid (comparable) after the
//!   node is detached from the tree; queries on a detached node answer
//!   about its last known position.
//! - [`FocusHost::is_focusable`] must return `false` for detached nodes.
//! - [`FocusHost::focus`] on a node that is not currently focusable is a
//!   no-op, mirroring what document focus APIs do.
//! - [`FocusHost::focusables`] returns descendants in traversal (visual)
//!   order; the container itself is never included.

use core::fmt;

/// Which slice of a dialog a focusable-descendant query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfacePart {
    /// The dialog's body region.
    Body,

    /// Focusable *buttons* in the dialog's footer region. Focusable
    /// non-button footer content is excluded here (it is still reachable
    /// through [`SurfacePart::Whole`]).
    Footer,

    /// Every focusable descendant of the dialog, any region.
    Whole,
}

/// Stacking assignment for a dialog and its backdrop.
///
/// Layers are plain ordinals: larger paints above smaller. A dialog's
/// surface always sits directly above its own backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackLayer {
    /// Layer of the dimming backdrop behind the dialog.
    pub backdrop: u32,

    /// Layer of the dialog surface itself. Always above `backdrop`.
    pub surface: u32,
}

impl StackLayer {
    /// Create a stacking assignment. `surface` must be above `backdrop`.
    #[must_use]
    pub const fn new(backdrop: u32, surface: u32) -> Self {
        debug_assert!(surface > backdrop);
        Self { backdrop, surface }
    }
}

impl fmt::Display for StackLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backdrop={} surface={}", self.backdrop, self.surface)
    }
}

/// The seam between Vigil and the host UI tree.
///
/// All focus reads and writes performed by the overlay stack go through
/// this trait; Vigil never touches the tree behind the host's back.
pub trait FocusHost {
    /// Opaque handle to a node in the host tree.
    type Node: Copy + Eq + fmt::Debug;

    /// Whether the node is still part of the live tree.
    fn is_attached(&self, node: Self::Node) -> bool;

    /// Whether the node can currently receive keyboard focus.
    ///
    /// Detached nodes are never focusable.
    fn is_focusable(&self, node: Self::Node) -> bool;

    /// Move keyboard focus to the node. No-op if the node is not
    /// currently focusable.
    fn focus(&mut self, node: Self::Node);

    /// The node currently holding keyboard focus, if any.
    fn focused(&self) -> Option<Self::Node>;

    /// The node's parent, or `None` at the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// The sibling immediately before the node in its parent's child
    /// order, or `None` if the node is the first child (or the root).
    fn prev_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// The focusable descendants of `container` restricted to `part`, in
    /// traversal order.
    fn focusables(&self, container: Self::Node, part: SurfacePart) -> Vec<Self::Node>;

    /// Apply a stacking assignment to a dialog and its backdrop.
    fn raise(&mut self, dialog: Self::Node, layer: StackLayer);
}
