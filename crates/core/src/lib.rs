//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the board model and the game engine. It has no
//! dependencies on rendering, the host runtime, or I/O:
//!
//! - **Deterministic**: the same seed produces the same piece sequence
//! - **Timer-free**: gravity ticks are delivered by an external scheduler
//! - **Portable**: usable headless, behind the virtual element bridge, or in a terminal
//!
//! # Module Structure
//!
//! - [`board`]: W x H grid with bounds-checked access and row clearing
//! - [`game_state`]: the engine state machine (spawn, fall, lock, clear, game over)
//! - [`pieces`]: tetromino shapes and rotation with wall kicks
//! - [`rng`]: 7-bag random piece generation and the pending-piece queue
//! - [`scoring`]: the configurable rules table (points, levels, gravity)
//! - [`error`]: board and engine error types
//!
//! # Example
//!
//! ```
//! use bridge_tetris_core::GameState;
//! use bridge_tetris_types::{GameAction, Phase};
//!
//! let mut game = GameState::new(10, 25, 12345).unwrap();
//! assert_eq!(game.phase(), Phase::Falling);
//!
//! game.apply(GameAction::MoveRight).unwrap();
//! game.apply(GameAction::RotateCw).unwrap();
//! game.apply(GameAction::HardDrop).unwrap();
//!
//! // Hard drop awards points per row fallen
//! assert!(game.score() > 0);
//! ```
//!
//! # Timing
//!
//! The engine never sleeps or polls a clock. Call
//! [`GameState::on_gravity_tick`](game_state::GameState::on_gravity_tick) every
//! [`GameState::gravity_interval_ms`](game_state::GameState::gravity_interval_ms)
//! milliseconds.

pub mod board;
pub mod error;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;

pub use bridge_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use error::{BoardError, EngineError};
pub use game_state::{GameState, Piece};
pub use pieces::{get_shape, try_rotate, KickSet};
pub use rng::{PieceQueue, SimpleRng};
pub use scoring::Rules;
