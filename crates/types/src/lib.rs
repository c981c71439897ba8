//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (engine logic, virtual element rendering, host runtimes).
//!
//! # Board Dimensions
//!
//! The board size is supplied at construction time. The defaults match the
//! mounted application:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 25 rows (indexed 0-24)
//! - **Fallback height**: 30 rows when a caller omits the height prop
//!
//! # Gravity Timing
//!
//! Timing values are in milliseconds. The engine holds no timers; these values
//! are reported to an external scheduler.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_GRAVITY_MS` | 500 | Gravity interval at level 1 |
//! | `GRAVITY_STEP_MS` | 40 | Interval reduction per level |
//! | `MIN_GRAVITY_MS` | 50 | Floor clamp for the gravity interval |
//! | `FAST_DROP_MS` | 50 | Interval while the down key is held |
//!
//! # Examples
//!
//! ```
//! use bridge_tetris_types::{Cell, GameAction, PieceKind, Rotation};
//!
//! let parsed = PieceKind::from_str("t").unwrap();
//! assert_eq!(parsed, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//!
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//!
//! assert!(Cell::Empty.is_empty());
//! assert_eq!(Cell::Filled(PieceKind::I).kind(), Some(PieceKind::I));
//! ```

/// Default board width in cells (10 columns)
pub const DEFAULT_BOARD_WIDTH: i32 = 10;

/// Default board height in cells (25 rows)
pub const DEFAULT_BOARD_HEIGHT: i32 = 25;

/// Height used when the component is constructed without a height prop.
pub const FALLBACK_BOARD_HEIGHT: i32 = 30;

/// Largest accepted board dimension. Coordinates are `i16`, and piece anchors
/// may sit a few cells outside the board.
pub const MAX_BOARD_DIMENSION: i32 = 1024;

/// Gravity interval at level 1
pub const BASE_GRAVITY_MS: u32 = 500;

/// Gravity interval reduction per level gained
pub const GRAVITY_STEP_MS: u32 = 40;

/// Lowest gravity interval reachable by levelling up
pub const MIN_GRAVITY_MS: u32 = 50;

/// Gravity interval while fast drop is held
pub const FAST_DROP_MS: u32 = 50;

/// Cumulative cleared rows needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Number of upcoming pieces kept visible in the pending queue
pub const PREVIEW_LEN: usize = 3;

/// Line clear scoring table (Classic Nintendo values)
///
/// Base points for clearing N rows at once:
/// - 0 rows: 0 points
/// - 1 row: 40 points
/// - 2 rows: 100 points
/// - 3 rows: 300 points
/// - 4 rows: 1200 points
///
/// Points are multiplied by the current level (which starts at 1).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Points per row for a soft drop
pub const SOFT_DROP_POINTS: u32 = 1;

/// Points per row for a hard drop
pub const HARD_DROP_POINTS: u32 = 2;

/// Tetromino piece types
///
/// The seven standard pieces:
/// - **I**: 4 in a row (cyan)
/// - **O**: 2x2 square (yellow)
/// - **T**: T-shape (purple)
/// - **S**: S-shape (green)
/// - **Z**: Z-shape (red)
/// - **J**: J-shape (blue)
/// - **L**: L-shape (orange)
///
/// The kind also serves as the color id of a filled board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every shape, in a fixed canonical order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use bridge_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("I"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("o"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Uppercase letter shown in a rendered cell.
    ///
    /// ```
    /// use bridge_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::J.letter(), "J");
    /// ```
    pub fn letter(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Rotation states following the Super Rotation System (SRS)
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use bridge_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    ///
    /// ```
    /// use bridge_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_ccw(), Rotation::West);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Orientation index (0 = North … 3 = West)
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

/// Commands accepted by the game engine.
///
/// These are produced by the top-level component's key handlers and by
/// embedders driving the engine directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down
    SoftDrop,
    /// Drop piece to its resting position and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Toggle pause state
    Pause,
    /// Rebuild a fresh game (the only command accepted after game over)
    Reset,
}

impl GameAction {
    /// Parse action from a camelCase name
    ///
    /// ```
    /// use bridge_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "pause" => Some(GameAction::Pause),
            "reset" => Some(GameAction::Reset),
            _ => None,
        }
    }

    /// Convert to camelCase name
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Pause => "pause",
            GameAction::Reset => "reset",
        }
    }
}

/// A cell on the game board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// Color id of a filled cell
    pub fn kind(&self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Filled(kind) => Some(*kind),
        }
    }
}

/// Game engine state machine phases.
///
/// `Locking`, `LineClear` and `Spawning` are transient: every engine operation
/// runs the machine until it rests in `Falling` or `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Spawning,
    Falling,
    Locking,
    LineClear,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Spawning => "spawning",
            Phase::Falling => "falling",
            Phase::Locking => "locking",
            Phase::LineClear => "lineClear",
            Phase::GameOver => "gameOver",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver)
    }
}

/// Event emitted after a piece locks.
///
/// Consumed by observers via `GameState::take_last_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub kind: PieceKind,
    pub lines_cleared: u32,
    pub points: u32,
    pub level: u32,
    pub level_up: bool,
}
