//! Virtual element tree and reconciler
//!
//! - [`node`]: the `VNode` tagged variant, props and path-qualified node ids
//! - [`render`]: the top-level component, a pure function of the game state
//! - [`reconcile`]: keyed diff producing `Create`/`Update`/`Move`/`Remove` patches
//!
//! ```
//! use bridge_tetris_core::GameState;
//! use bridge_tetris_vdom::{diff, render_app};
//!
//! let state = GameState::new(10, 25, 1).unwrap();
//! let tree = render_app(&state);
//! assert!(diff(&tree, &render_app(&state)).unwrap().is_empty());
//! ```

pub mod node;
pub mod reconcile;
pub mod render;

pub use node::{ComponentNode, HostElement, NodeId, PropValue, Props, VNode};
pub use reconcile::{create_all, diff, NodeSpec, Patch, PropChange, ReconcileError, TEXT_PROP};
pub use render::{render_app, KEY_DOWN_EVENT, KEY_UP_EVENT};
