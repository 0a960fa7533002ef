#![forbid(unsafe_code)]

//! Vigil overlay: focus containment for stacked modal dialogs.
//!
//! This crate provides [`OverlayStack`], a LIFO stack of open overlay
//! dialogs that keeps keyboard focus where it belongs:
//!
//! - Tab and Shift+Tab never escape the topmost dialog (the wrap-around
//!   edges are handled here; everything in between is left to the host's
//!   normal traversal, which the dialog's own structure constrains).
//! - A newly shown dialog receives sensible initial focus: first focusable
//!   in its body, else the first footer button, else anything focusable.
//! - Closing a dialog returns focus to the control that opened it, with a
//!   graceful nearest-neighbour fallback when that control is gone.
//!
//! The stack owns no UI: the host tree is reached exclusively through
//! [`vigil_core::FocusHost`]. Dialog lifecycle signals (`will_show`,
//! `shown`, `hidden`) come from whatever dialog framework the host uses;
//! the caller guarantees per-dialog signal ordering and strict LIFO
//! nesting, as those are properties of the framework's transition
//! machinery, not of this crate.

pub mod stack;

pub use stack::{KeyDisposition, OverlayError, OverlayStack, nearest_focusable};
