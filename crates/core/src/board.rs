//! Board module - manages the play field grid
//!
//! The board is a W x H grid where each cell is either empty or filled with a
//! piece kind. Dimensions are fixed at construction. Uses a flat array for
//! cache locality.
//! Coordinates: (x, y) where x grows left to right and y grows top to bottom.

use tracing::trace;

use crate::error::BoardError;
use crate::types::{Cell, MAX_BOARD_DIMENSION};

/// The game board - flat row-major storage of `width * height` cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: i16,
    height: i16,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board.
    ///
    /// Fails with [`BoardError::InvalidDimension`] if either side is not positive
    /// or exceeds [`MAX_BOARD_DIMENSION`].
    pub fn new(width: i32, height: i32) -> Result<Self, BoardError> {
        let valid = 1..=MAX_BOARD_DIMENSION;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(BoardError::InvalidDimension {
                width,
                height,
                max: MAX_BOARD_DIMENSION,
            });
        }

        Ok(Self {
            width: width as i16,
            height: height as i16,
            cells: vec![Cell::Empty; (width * height) as usize],
        })
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i16, y: i16) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    fn out_of_bounds(&self, x: i16, y: i16) -> BoardError {
        BoardError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn in_bounds(&self, x: i16, y: i16) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Get the cell at (x, y)
    pub fn cell_at(&self, x: i16, y: i16) -> Result<Cell, BoardError> {
        self.index(x, y)
            .map(|idx| self.cells[idx])
            .ok_or_else(|| self.out_of_bounds(x, y))
    }

    /// Overwrite the cell at (x, y)
    pub fn set_cell(&mut self, x: i16, y: i16, cell: Cell) -> Result<(), BoardError> {
        let idx = self.index(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Check if position is within bounds and empty
    pub fn is_free(&self, x: i16, y: i16) -> bool {
        matches!(self.index(x, y), Some(idx) if self.cells[idx].is_empty())
    }

    /// Check if a row has no empty cell. Out-of-range rows are never full.
    pub fn is_row_full(&self, row: i16) -> bool {
        self.row(row)
            .map(|cells| cells.iter().all(Cell::is_filled))
            .unwrap_or(false)
    }

    /// Indices of every full row, top to bottom
    pub fn full_rows(&self) -> Vec<i16> {
        (0..self.height).filter(|&row| self.is_row_full(row)).collect()
    }

    /// Borrow one row of cells
    pub fn row(&self, row: i16) -> Option<&[Cell]> {
        if row < 0 || row >= self.height {
            return None;
        }
        let width = self.width as usize;
        let start = row as usize * width;
        Some(&self.cells[start..start + width])
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width as usize)
    }

    /// Remove `row`, shift every row above it down by one and insert an empty
    /// row at the top. Width and height are preserved.
    pub fn clear_row(&mut self, row: i16) -> Result<(), BoardError> {
        if row < 0 || row >= self.height {
            return Err(self.out_of_bounds(0, row));
        }
        self.collapse_onto(row as usize);
        Ok(())
    }

    /// Shift rows `0..row` down by one over `row` and blank the top row.
    /// `row` must be below `height`.
    fn collapse_onto(&mut self, row: usize) {
        let width = self.width as usize;
        let end = (row + 1) * width;

        // copy_within handles the overlapping shift
        self.cells.copy_within(0..end - width, width);
        self.cells[..width].fill(Cell::Empty);

        trace!(row, "row cleared");
    }

    /// Clear all full rows and return the indices they occupied before the
    /// clear, bottom to top.
    pub fn clear_full_rows(&mut self) -> Vec<i16> {
        let mut cleared = Vec::new();
        let mut row = self.height - 1;

        // Re-check the same index after a clear: the row above has shifted into it.
        let mut shift = 0;
        while row >= 0 {
            if self.is_row_full(row) {
                cleared.push(row - shift);
                shift += 1;
                self.collapse_onto(row as usize);
            } else {
                row -= 1;
            }
        }

        cleared
    }

    /// Number of filled cells on the board
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_filled()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn fill_row(board: &mut Board, row: i16, kind: PieceKind) {
        for x in 0..board.width() {
            board.set_cell(x, row, Cell::Filled(kind)).unwrap();
        }
    }

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(10, 25).unwrap();
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(9, 0), Some(9));
        assert_eq!(board.index(0, 1), Some(10));
        assert_eq!(board.index(9, 24), Some(249));
        assert_eq!(board.index(-1, 0), None);
        assert_eq!(board.index(10, 0), None);
        assert_eq!(board.index(0, 25), None);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Board::new(0, 25),
            Err(BoardError::InvalidDimension { width: 0, .. })
        ));
        assert!(matches!(
            Board::new(10, -3),
            Err(BoardError::InvalidDimension { height: -3, .. })
        ));
        assert!(Board::new(MAX_BOARD_DIMENSION + 1, 5).is_err());
        assert!(Board::new(1, 1).is_ok());
    }

    #[test]
    fn test_clear_row_shifts_rows_above() {
        let mut board = Board::new(4, 5).unwrap();
        board.set_cell(0, 0, Cell::Filled(PieceKind::T)).unwrap();
        board.set_cell(1, 1, Cell::Filled(PieceKind::S)).unwrap();
        fill_row(&mut board, 2, PieceKind::I);
        board.set_cell(3, 3, Cell::Filled(PieceKind::Z)).unwrap();

        board.clear_row(2).unwrap();

        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 5);
        assert_eq!(board.cells().len(), 20);
        assert!(board.row(0).unwrap().iter().all(Cell::is_empty));
        assert_eq!(board.cell_at(0, 1).unwrap(), Cell::Filled(PieceKind::T));
        assert_eq!(board.cell_at(1, 2).unwrap(), Cell::Filled(PieceKind::S));
        // Rows below the cleared one are untouched
        assert_eq!(board.cell_at(3, 3).unwrap(), Cell::Filled(PieceKind::Z));
        assert_eq!(board.filled_count(), 3);
    }

    #[test]
    fn test_clear_row_out_of_range() {
        let mut board = Board::new(4, 5).unwrap();
        assert!(board.clear_row(5).is_err());
        assert!(board.clear_row(-1).is_err());
    }

    #[test]
    fn test_clear_full_rows_reports_original_indices() {
        let mut board = Board::new(4, 6).unwrap();
        fill_row(&mut board, 5, PieceKind::I);
        board.set_cell(0, 4, Cell::Filled(PieceKind::O)).unwrap();
        fill_row(&mut board, 3, PieceKind::L);
        fill_row(&mut board, 2, PieceKind::J);

        assert_eq!(board.full_rows(), vec![2, 3, 5]);
        let cleared = board.clear_full_rows();
        assert_eq!(cleared, vec![5, 3, 2]);
        assert_eq!(board.filled_count(), 1);
        assert_eq!(board.cell_at(0, 5).unwrap(), Cell::Filled(PieceKind::O));
    }

    #[test]
    fn test_clear_full_rows_at_both_edges() {
        let mut board = Board::new(3, 4).unwrap();
        fill_row(&mut board, 0, PieceKind::T);
        board.set_cell(1, 1, Cell::Filled(PieceKind::S)).unwrap();
        fill_row(&mut board, 3, PieceKind::Z);

        assert_eq!(board.clear_full_rows(), vec![3, 0]);
        assert_eq!(board.filled_count(), 1);
        assert_eq!(board.cell_at(1, 2).unwrap(), Cell::Filled(PieceKind::S));
        assert!(board.row(0).unwrap().iter().all(Cell::is_empty));
    }
}
