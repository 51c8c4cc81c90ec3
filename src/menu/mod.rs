//! Outbound screens and inbound action tokens
//!
//! `action` parses opaque selection tokens into a tagged enum at the
//! boundary - nothing downstream re-parses raw strings. `screen` is the
//! transport-neutral description of what to render. `browse` is the
//! read-only navigation engine and `deletion` the two-phase destructive
//! workflow.

pub mod action;
pub mod admin;
pub mod browse;
pub mod deletion;
pub mod screen;

pub use action::{Action, DeleteTarget};
pub use screen::{Attachment, Button, Screen};
