//! Error types for the board model and game engine.

use thiserror::Error;

/// Board construction and coordinate access failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid board dimension {width}x{height} (each side must be within 1..={max})")]
    InvalidDimension { width: i32, height: i32, max: i32 },

    #[error("cell ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: i16,
        y: i16,
        width: i16,
        height: i16,
    },
}

/// Invariant violations detected by the engine.
///
/// Invalid player moves are never reported here; they are rejected as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Board(#[from] BoardError),

    /// The active piece overlaps a filled or out-of-bounds cell at lock time.
    #[error("active piece overlaps occupied cell ({x}, {y})")]
    PieceOverlap { x: i16, y: i16 },
}
