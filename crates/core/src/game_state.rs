//! Game state module - the engine state machine
//!
//! This module ties together all core components: board, pieces, RNG, and
//! scoring. Every operation runs the machine
//! `Spawning → Falling → Locking → LineClear → Spawning …` until it rests in
//! `Falling` or `GameOver`. The engine holds no timers: gravity ticks are
//! delivered from outside through [`GameState::on_gravity_tick`], at the
//! interval reported by [`GameState::gravity_interval_ms`].

use tracing::{debug, info};

use crate::board::Board;
use crate::error::EngineError;
use crate::pieces::{get_shape, spawn_anchor, try_rotate, PieceShape};
use crate::rng::PieceQueue;
use crate::scoring::Rules;
use crate::types::*;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i16,
    pub y: i16,
}

impl Piece {
    /// Create a piece at its spawn position on a board of `board_width` columns
    pub fn spawn(kind: PieceKind, board_width: i16) -> Self {
        let (x, y) = spawn_anchor(kind, board_width);
        Self {
            kind,
            rotation: Rotation::North,
            x,
            y,
        }
    }

    /// Get the shape (mino offsets) for current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute board coordinates of the four occupied cells
    pub fn cells(&self) -> [(i16, i16); 4] {
        self.shape().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Check if all minos are in bounds and on empty cells
    pub fn fits(&self, board: &Board) -> bool {
        self.cells().iter().all(|&(x, y)| board.is_free(x, y))
    }

    fn shifted(&self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    rules: Rules,
    active: Option<Piece>,
    queue: PieceQueue,
    phase: Phase,
    score: u32,
    level: u32,
    lines: u32,
    paused: bool,
    fast_drop: bool,
    /// Monotonic count of spawned pieces
    piece_id: u32,
    /// Increments on every reset
    episode_id: u32,
    last_event: Option<LockEvent>,
}

impl GameState {
    /// Create a game on an empty `width` x `height` board with default rules
    /// and spawn the first piece.
    pub fn new(width: i32, height: i32, seed: u32) -> Result<Self, EngineError> {
        Self::with_rules(width, height, seed, Rules::default())
    }

    pub fn with_rules(
        width: i32,
        height: i32,
        seed: u32,
        rules: Rules,
    ) -> Result<Self, EngineError> {
        let board = Board::new(width, height)?;
        Ok(Self::from_parts(board, PieceQueue::new(seed), rules))
    }

    /// Start a game on an existing board with an existing queue.
    ///
    /// The first piece is spawned immediately; if it does not fit the game is
    /// over from the start.
    pub fn from_parts(board: Board, queue: PieceQueue, rules: Rules) -> Self {
        let mut state = Self {
            board,
            rules,
            active: None,
            queue,
            phase: Phase::Spawning,
            score: 0,
            level: rules.level_for_lines(0),
            lines: 0,
            paused: false,
            fast_drop: false,
            piece_id: 0,
            episode_id: 0,
            last_event: None,
        };
        state.spawn();
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn active(&self) -> Option<Piece> {
        self.active
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn fast_drop(&self) -> bool {
        self.fast_drop
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn width(&self) -> i16 {
        self.board.width()
    }

    pub fn height(&self) -> i16 {
        self.board.height()
    }

    /// Next piece to spawn
    pub fn next_piece(&self) -> Option<PieceKind> {
        self.queue.peek()
    }

    /// Upcoming pieces, next first
    pub fn preview(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.preview()
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Whether gravity ticks currently have any effect
    pub fn accepts_ticks(&self) -> bool {
        self.phase == Phase::Falling && !self.paused
    }

    /// Interval at which the external scheduler should deliver gravity ticks
    pub fn gravity_interval_ms(&self) -> u32 {
        let normal = self.rules.gravity_interval_ms(self.level);
        if self.fast_drop {
            normal.min(self.rules.fast_drop_ms.max(1))
        } else {
            normal
        }
    }

    /// Enable or disable fast drop. Returns true if the flag changed.
    pub fn set_fast_drop(&mut self, enabled: bool) -> bool {
        if self.fast_drop == enabled {
            return false;
        }
        self.fast_drop = enabled;
        true
    }

    /// Spawning → Falling, or → GameOver if the spawn cells are not free
    fn spawn(&mut self) {
        let kind = self.queue.draw();
        let piece = Piece::spawn(kind, self.board.width());

        if !piece.fits(&self.board) {
            self.active = None;
            self.phase = Phase::GameOver;
            self.fast_drop = false;
            info!(?kind, score = self.score, level = self.level, "game over: spawn blocked");
            return;
        }

        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        self.phase = Phase::Falling;
        debug!(?kind, x = piece.x, y = piece.y, piece_id = self.piece_id, "piece spawned");
    }

    /// Locking → LineClear: write the active piece into the board
    fn lock(&mut self) -> Result<(), EngineError> {
        let Some(piece) = self.active.take() else {
            self.phase = Phase::Spawning;
            return Ok(());
        };

        let cells = piece.cells();
        // Validate everything before writing anything
        if let Some(&(x, y)) = cells.iter().find(|&&(x, y)| !self.board.is_free(x, y)) {
            self.active = Some(piece);
            return Err(EngineError::PieceOverlap { x, y });
        }
        for (x, y) in cells {
            self.board.set_cell(x, y, Cell::Filled(piece.kind))?;
        }

        self.last_event = Some(LockEvent {
            kind: piece.kind,
            lines_cleared: 0,
            points: 0,
            level: self.level,
            level_up: false,
        });
        self.phase = Phase::LineClear;
        debug!(kind = ?piece.kind, x = piece.x, y = piece.y, "piece locked");
        Ok(())
    }

    /// LineClear → Spawning: clear full rows, score and level
    fn clear_lines(&mut self) {
        let cleared = self.board.clear_full_rows();
        let count = cleared.len();

        if count > 0 {
            let points = self.rules.line_clear_points(count, self.level);
            self.score = self.score.saturating_add(points);
            self.lines += count as u32;

            let level = self.rules.level_for_lines(self.lines);
            let level_up = level > self.level;
            self.level = level;

            if let Some(event) = self.last_event.as_mut() {
                event.lines_cleared = count as u32;
                event.points = points;
                event.level = level;
                event.level_up = level_up;
            }
            debug!(?cleared, points, score = self.score, "rows cleared");
            if level_up {
                info!(
                    level,
                    gravity_ms = self.rules.gravity_interval_ms(level),
                    "level up"
                );
            }
        }

        self.phase = Phase::Spawning;
    }

    /// Run transient phases until the machine rests in Falling or GameOver
    fn settle(&mut self) -> Result<(), EngineError> {
        loop {
            match self.phase {
                Phase::Locking => self.lock()?,
                Phase::LineClear => self.clear_lines(),
                Phase::Spawning => self.spawn(),
                Phase::Falling | Phase::GameOver => return Ok(()),
            }
        }
    }

    /// Try to move the active piece; returns false (and changes nothing) if
    /// any candidate cell is out of bounds or filled
    pub fn try_shift(&mut self, dx: i16, dy: i16) -> bool {
        if !self.accepts_ticks() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let candidate = active.shifted(dx, dy);
        if !candidate.fits(&self.board) {
            return false;
        }
        self.active = Some(candidate);
        true
    }

    /// Try to rotate the active piece with wall kicks
    pub fn try_rotate(&mut self, clockwise: bool) -> bool {
        if !self.accepts_ticks() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let result = try_rotate(
            active.kind,
            active.rotation,
            active.x,
            active.y,
            clockwise,
            self.rules.kicks,
            |x, y| self.board.is_free(x, y),
        );

        let Some((rotation, (dx, dy))) = result else {
            return false;
        };
        self.active = Some(Piece {
            rotation,
            x: active.x + dx,
            y: active.y + dy,
            ..active
        });
        true
    }

    /// Rows the active piece can fall before resting
    pub fn drop_distance(&self) -> i16 {
        let Some(active) = self.active else {
            return 0;
        };
        let mut distance = 0;
        while active.shifted(0, distance + 1).fits(&self.board) {
            distance += 1;
        }
        distance
    }

    /// Drop the active piece to its resting row and lock it
    fn hard_drop(&mut self) -> Result<bool, EngineError> {
        if !self.accepts_ticks() {
            return Ok(false);
        }
        let Some(active) = self.active else {
            return Ok(false);
        };

        let distance = self.drop_distance();
        self.active = Some(active.shifted(0, distance));
        self.score = self
            .score
            .saturating_add(self.rules.drop_points(distance as u32, true));

        self.phase = Phase::Locking;
        self.settle()?;
        Ok(true)
    }

    /// Gravity tick: one row down, or lock if blocked.
    ///
    /// Returns true if the state changed.
    pub fn on_gravity_tick(&mut self) -> Result<bool, EngineError> {
        if !self.accepts_ticks() {
            return Ok(false);
        }
        if self.try_shift(0, 1) {
            return Ok(true);
        }

        self.phase = Phase::Locking;
        self.settle()?;
        Ok(true)
    }

    /// Apply a game action.
    ///
    /// Returns true if the state changed. Rejected moves are not errors.
    pub fn apply(&mut self, action: GameAction) -> Result<bool, EngineError> {
        if self.is_game_over() && action != GameAction::Reset {
            return Ok(false);
        }

        match action {
            GameAction::MoveLeft => Ok(self.try_shift(-1, 0)),
            GameAction::MoveRight => Ok(self.try_shift(1, 0)),
            GameAction::SoftDrop => {
                let moved = self.try_shift(0, 1);
                if moved {
                    self.score = self
                        .score
                        .saturating_add(self.rules.drop_points(1, false));
                }
                Ok(moved)
            }
            GameAction::HardDrop => self.hard_drop(),
            GameAction::RotateCw => Ok(self.try_rotate(true)),
            GameAction::RotateCcw => Ok(self.try_rotate(false)),
            GameAction::Pause => {
                self.paused = !self.paused;
                debug!(paused = self.paused, "pause toggled");
                Ok(true)
            }
            GameAction::Reset => {
                self.reset()?;
                Ok(true)
            }
        }
    }

    /// Rebuild a fresh game with the same dimensions and rules. The piece
    /// sequence continues from the current RNG state.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        let board = Board::new(self.width() as i32, self.height() as i32)?;
        let queue = PieceQueue::new(self.queue.seed());
        let episode_id = self.episode_id.wrapping_add(1);

        *self = Self::from_parts(board, queue, self.rules);
        self.episode_id = episode_id;
        info!(episode_id, "game reset");
        Ok(())
    }

    /// What a renderer shows at (x, y): the active piece over the locked board
    pub fn visible_cell(&self, x: i16, y: i16) -> Result<Cell, EngineError> {
        let cell = self.board.cell_at(x, y)?;
        if let Some(active) = self.active {
            if active.cells().contains(&(x, y)) {
                return Ok(Cell::Filled(active.kind));
            }
        }
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(width: i32, height: i32, pieces: &[PieceKind]) -> GameState {
        let board = Board::new(width, height).unwrap();
        GameState::from_parts(board, PieceQueue::scripted(7, pieces), Rules::default())
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(10, 25, 12345).unwrap();

        assert_eq!(state.phase(), Phase::Falling);
        assert!(state.active().is_some());
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.lines(), 0);
        assert_eq!(state.piece_id(), 1);
        assert!(!state.paused());
        assert_eq!(state.preview().count(), PREVIEW_LEN);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(matches!(
            GameState::new(0, 25, 1),
            Err(EngineError::Board(crate::BoardError::InvalidDimension { .. }))
        ));
    }

    #[test]
    fn test_spawn_i_piece_on_top_row() {
        let state = scripted(10, 25, &[PieceKind::I]);
        let active = state.active().unwrap();
        assert_eq!(active.kind, PieceKind::I);
        assert_eq!(active.cells(), [(3, 0), (4, 0), (5, 0), (6, 0)]);
    }

    #[test]
    fn test_try_shift() {
        let mut state = scripted(10, 25, &[PieceKind::T]);
        let initial_x = state.active().unwrap().x;

        assert!(state.try_shift(1, 0));
        assert_eq!(state.active().unwrap().x, initial_x + 1);

        assert!(state.try_shift(-1, 0));
        assert_eq!(state.active().unwrap().x, initial_x);

        // Can't move up past the top row
        assert!(!state.try_shift(0, -1));
    }

    #[test]
    fn test_shift_collision_leaves_state_unchanged() {
        let mut state = scripted(10, 25, &[PieceKind::T]);

        let mut moved = 0;
        for _ in 0..10 {
            if state.try_shift(-1, 0) {
                moved += 1;
            }
        }
        // T spawns at x = 3 with its left mino on column 3
        assert_eq!(moved, 3);
        let before = state.active();
        assert!(!state.apply(GameAction::MoveLeft).unwrap());
        assert_eq!(state.active(), before);
    }

    #[test]
    fn test_rotate_round_trip() {
        let mut state = scripted(10, 25, &[PieceKind::T]);
        state.try_shift(0, 2);

        assert!(state.try_rotate(true));
        assert_eq!(state.active().unwrap().rotation, Rotation::East);

        assert!(state.try_rotate(false));
        assert_eq!(state.active().unwrap().rotation, Rotation::North);
    }

    #[test]
    fn test_gravity_tick_moves_down_then_locks() {
        let mut state = scripted(10, 4, &[PieceKind::O, PieceKind::T]);
        let start_y = state.active().unwrap().y;

        assert!(state.on_gravity_tick().unwrap());
        assert_eq!(state.active().unwrap().y, start_y + 1);

        // O occupies two rows; a 4-row board leaves two rows of fall
        assert!(state.on_gravity_tick().unwrap());
        assert!(state.on_gravity_tick().unwrap());

        assert_eq!(state.phase(), Phase::Falling);
        assert_eq!(state.active().unwrap().kind, PieceKind::T);
        assert_eq!(state.board().filled_count(), 4);
        let event = state.take_last_event().unwrap();
        assert_eq!(event.kind, PieceKind::O);
        assert_eq!(event.lines_cleared, 0);
    }

    #[test]
    fn test_hard_drop_scores_distance() {
        let mut state = scripted(10, 25, &[PieceKind::O]);
        let distance = state.drop_distance();
        assert_eq!(distance, 23);

        assert!(state.apply(GameAction::HardDrop).unwrap());
        assert_eq!(state.score(), 2 * distance as u32);
        assert_eq!(
            state.board().cell_at(4, 24).unwrap(),
            Cell::Filled(PieceKind::O)
        );
    }

    #[test]
    fn test_soft_drop_scoring() {
        let mut state = scripted(10, 25, &[PieceKind::T]);
        assert!(state.apply(GameAction::SoftDrop).unwrap());
        assert_eq!(state.score(), 1);
    }

    #[test]
    fn test_game_over_detection() {
        let mut board = Board::new(10, 25).unwrap();
        for x in 3..=6 {
            for y in 0..=1 {
                board.set_cell(x, y, Cell::Filled(PieceKind::Z)).unwrap();
            }
        }
        let mut state = GameState::from_parts(board, PieceQueue::new(3), Rules::default());

        assert_eq!(state.phase(), Phase::GameOver);
        assert!(state.active().is_none());

        // Terminal: every command except reset is a no-op
        for action in [
            GameAction::MoveLeft,
            GameAction::RotateCw,
            GameAction::HardDrop,
            GameAction::Pause,
        ] {
            assert!(!state.apply(action).unwrap());
        }
        assert!(!state.on_gravity_tick().unwrap());

        assert!(state.apply(GameAction::Reset).unwrap());
        assert_eq!(state.phase(), Phase::Falling);
        assert_eq!(state.board().filled_count(), 0);
        assert_eq!(state.episode_id(), 1);
    }

    #[test]
    fn test_pause_blocks_commands_and_ticks() {
        let mut state = scripted(10, 25, &[PieceKind::T]);
        assert!(state.apply(GameAction::Pause).unwrap());
        let before = state.active();

        assert!(!state.apply(GameAction::MoveRight).unwrap());
        assert!(!state.on_gravity_tick().unwrap());
        assert_eq!(state.active(), before);

        assert!(state.apply(GameAction::Pause).unwrap());
        assert!(state.apply(GameAction::MoveRight).unwrap());
    }

    #[test]
    fn test_fast_drop_interval() {
        let mut state = GameState::new(10, 25, 1).unwrap();
        assert_eq!(state.gravity_interval_ms(), 500);

        assert!(state.set_fast_drop(true));
        assert!(!state.set_fast_drop(true));
        assert_eq!(state.gravity_interval_ms(), 50);

        assert!(state.set_fast_drop(false));
        assert_eq!(state.gravity_interval_ms(), 500);
    }

    #[test]
    fn test_level_progression_speeds_up_gravity() {
        // 4-wide board: every horizontal I clears a row
        let mut state = scripted(4, 8, &[PieceKind::I; 12]);
        let mut last_interval = state.gravity_interval_ms();

        for _ in 0..10 {
            assert!(state.apply(GameAction::HardDrop).unwrap());
        }
        assert_eq!(state.lines(), 10);
        assert_eq!(state.level(), 2);
        assert!(state.gravity_interval_ms() < last_interval);
        last_interval = state.gravity_interval_ms();
        assert_eq!(last_interval, 460);
    }

    #[test]
    fn test_lock_overlap_is_reported() {
        let mut state = scripted(10, 25, &[PieceKind::O]);
        let cells = state.active().unwrap().cells();
        // Corrupt the board underneath the active piece
        state
            .board
            .set_cell(cells[0].0, cells[0].1, Cell::Filled(PieceKind::L))
            .unwrap();
        state.phase = Phase::Locking;

        assert!(matches!(
            state.settle(),
            Err(EngineError::PieceOverlap { .. })
        ));
    }

    #[test]
    fn test_visible_cell_overlays_active_piece() {
        let state = scripted(10, 25, &[PieceKind::I]);
        assert_eq!(state.visible_cell(3, 0).unwrap(), Cell::Filled(PieceKind::I));
        assert_eq!(state.visible_cell(3, 1).unwrap(), Cell::Empty);
        assert!(state.visible_cell(10, 0).is_err());
    }
}
