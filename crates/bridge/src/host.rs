//! Host runtime contract
//!
//! The bridge never renders anything itself. It drives an externally
//! supplied host runtime through these primitives and keeps the handles the
//! host hands back.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bridge_tetris_vdom::{PropChange, Props};

/// Opaque reference to a live host instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostHandle(u64);

impl HostHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unknown host handle {0}")]
    UnknownHandle(HostHandle),

    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: HostHandle, child: HostHandle },

    #[error("index {index} out of range for {parent} with {len} children")]
    IndexOutOfRange {
        parent: HostHandle,
        index: usize,
        len: usize,
    },

    #[error("host runtime failure: {0}")]
    Runtime(String),
}

/// Instance primitives of a host UI runtime.
///
/// Indices follow list-insertion semantics: `insert_child` inserts before the
/// child currently at `index` (or appends at `len`); `move_child` detaches the
/// child and re-inserts it at `index` of the remaining list.
pub trait HostRuntime {
    fn create_element(
        &mut self,
        tag: &str,
        key: Option<&str>,
        props: &Props,
    ) -> Result<HostHandle, HostError>;

    fn create_text(&mut self, text: &str) -> Result<HostHandle, HostError>;

    fn insert_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError>;

    fn move_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError>;

    fn set_props(&mut self, handle: HostHandle, changes: &[PropChange]) -> Result<(), HostError>;

    fn set_text(&mut self, handle: HostHandle, text: &str) -> Result<(), HostError>;

    /// Detach `child` from `parent` and release it together with its subtree.
    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError>;

    /// Called once after every patch batch.
    fn commit(&mut self) -> Result<(), HostError> {
        Ok(())
    }
}
