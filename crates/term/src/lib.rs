//! Terminal host runtime.
//!
//! Implements the bridge's host contract for a terminal: element instances
//! live in memory, get painted onto a character screen, and changed screen
//! rows are written to the terminal. There are no widgets or layout engine.
//!
//! - [`host`]: `TerminalHost`, the `HostRuntime` implementation
//! - [`view`]: paints the instance tree (board, sidebar) onto a screen
//! - [`screen`]: character grid with per-position ink
//! - [`renderer`]: crossterm output, redrawing only rows that changed

pub mod host;
pub mod renderer;
pub mod screen;
pub mod view;

pub use host::TerminalHost;
pub use renderer::{encode_rows, TerminalRenderer};
pub use screen::{Ink, Rgb, Screen, Span, Weight};
pub use view::{HostView, Viewport};
