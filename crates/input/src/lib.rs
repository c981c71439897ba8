//! Terminal input module (host-facing).
//!
//! Maps `crossterm` key events onto the DOM-style key codes the top-level
//! component listens for, and synthesizes key releases for terminals that
//! never report them.

pub mod hold;
pub mod map;

pub use hold::{HoldTracker, HOLD_GRACE_MS};
pub use map::{key_code, should_quit, to_host_event};
