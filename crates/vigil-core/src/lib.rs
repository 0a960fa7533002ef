#![forbid(unsafe_code)]

//! Vigil core: canonical events and the focus-host abstraction.
//!
//! This crate is the leaf of the Vigil workspace. It defines:
//!
//! - [`event`] - the canonical input event types shared by every Vigil
//!   component, plus user-activity classification for idle detection.
//! - [`host`] - the [`FocusHost`](host::FocusHost) trait, the seam between
//!   Vigil's managers and whatever UI tree the host application renders.
//! - [`memory_tree`] - an in-memory reference host used by tests and
//!   embeddings.
//!
//! # Role in Vigil
//! `vigil-core` owns no behavior of its own beyond event classification.
//! `vigil-overlay` drives focus through [`host::FocusHost`];
//! `vigil-runtime` consumes [`event::Event`] to detect user activity.

pub mod event;
pub mod host;
pub mod memory_tree;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
    PasteEvent,
};
pub use host::{FocusHost, StackLayer, SurfacePart};
pub use memory_tree::{MemoryTree, NodeId};
