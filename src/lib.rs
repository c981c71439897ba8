//! Bridge Tetris (workspace facade crate).
//!
//! Re-exports the member crates as `bridge_tetris::{types,core,vdom,bridge,input,term}`
//! and holds the pieces only the binary needs: configuration, logging setup
//! and the wall-clock gravity timer.

pub use bridge_tetris_bridge as bridge;
pub use bridge_tetris_core as core;
pub use bridge_tetris_input as input;
pub use bridge_tetris_term as term;
pub use bridge_tetris_types as types;
pub use bridge_tetris_vdom as vdom;

pub mod config;
pub mod logging;
pub mod timer;
