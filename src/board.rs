//! Game board representation and collision detection

use crate::tetromino::{ColorId, Shape};

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled with a palette color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(ColorId),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// 0 for empty, otherwise the 1-based color id
    pub fn color_id(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Filled(color) => color.get(),
        }
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top, row increases downward
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        let row = row as usize;
        let col = col as usize;
        if row >= BOARD_HEIGHT || col >= BOARD_WIDTH {
            return None;
        }
        Some(self.cells[row][col])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let row = row as usize;
        let col = col as usize;
        if row >= BOARD_HEIGHT || col >= BOARD_WIDTH {
            return false;
        }
        self.cells[row][col] = cell;
        true
    }

    /// Whether a cell is filled. Anything outside the grid counts as occupied,
    /// so walls and floor need no separate bounds test.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_none_or(|cell| cell.is_filled())
    }

    /// Check whether `shape` anchored at (row, col) hits a wall, the floor,
    /// or a filled cell
    pub fn collides(&self, shape: &Shape, row: i32, col: i32) -> bool {
        shape
            .filled_cells()
            .any(|(dr, dc)| self.is_occupied(row + dr as i32, col + dc as i32))
    }

    /// Write `color` into every cell covered by `shape` at (row, col).
    ///
    /// The placement must already have passed [`Board::collides`].
    pub fn merge_shape(&mut self, shape: &Shape, row: i32, col: i32, color: ColorId) {
        debug_assert!(
            !self.collides(shape, row, col),
            "merging a shape onto occupied or out-of-bounds cells"
        );
        for (dr, dc) in shape.filled_cells() {
            self.set(row + dr as i32, col + dc as i32, Cell::Filled(color));
        }
    }

    /// Indices of completely filled rows, top to bottom
    pub fn completed_rows(&self) -> Vec<usize> {
        (0..BOARD_HEIGHT)
            .filter(|&row| self.is_line_full(row))
            .collect()
    }

    /// Delete the given rows and drop everything above them, filling the top
    /// with empty rows. Indices outside the board are ignored.
    pub fn remove_rows(&mut self, rows: &[usize]) {
        let mut write_row = BOARD_HEIGHT;

        for read_row in (0..BOARD_HEIGHT).rev() {
            if rows.contains(&read_row) {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                self.cells[write_row] = self.cells[read_row];
            }
        }

        for row in 0..write_row {
            self.cells[row] = [Cell::Empty; BOARD_WIDTH];
        }
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// The grid as color ids, 0 meaning empty
    pub fn color_ids(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(Cell::color_id).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::TetrominoType;

    fn red() -> ColorId {
        TetrominoType::Z.color()
    }

    fn fill_row(board: &mut Board, row: i32, color: ColorId) {
        for col in 0..BOARD_WIDTH as i32 {
            board.set(row, col, Cell::Filled(color));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert!(board.completed_rows().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 5, Cell::Filled(red())));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(red())));
        assert_eq!(board.color_ids()[5][5], red().get());
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(BOARD_HEIGHT as i32, 0), None);
        assert_eq!(board.get(0, BOARD_WIDTH as i32), None);
    }

    #[test]
    fn test_outside_is_always_occupied() {
        let mut full = Board::new();
        for row in 0..BOARD_HEIGHT as i32 {
            fill_row(&mut full, row, red());
        }
        for board in [Board::new(), full] {
            for row in -3..BOARD_HEIGHT as i32 + 3 {
                assert!(board.is_occupied(row, -1));
                assert!(board.is_occupied(row, BOARD_WIDTH as i32));
            }
            for col in -3..BOARD_WIDTH as i32 + 3 {
                assert!(board.is_occupied(-1, col));
                assert!(board.is_occupied(BOARD_HEIGHT as i32, col));
            }
        }
    }

    #[test]
    fn test_collision_leaves_board_untouched() {
        let mut board = Board::new();
        board.set(10, 4, Cell::Filled(red()));
        let before = board.clone();
        let shape = TetrominoType::T.shape();

        for _ in 0..3 {
            assert!(board.collides(&shape, 9, 3));
            assert!(!board.collides(&shape, 0, 3));
            assert!(board.collides(&shape, 0, -1));
            assert!(board.collides(&shape, BOARD_HEIGHT as i32 - 1, 3));
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_merge_shape_only_touches_covered_cells() {
        let mut board = Board::new();
        board.set(19, 0, Cell::Filled(red()));
        let shape = TetrominoType::S.shape();
        let color = TetrominoType::S.color();

        board.merge_shape(&shape, 18, 4, color);

        for row in 0..BOARD_HEIGHT as i32 {
            for col in 0..BOARD_WIDTH as i32 {
                let expected = match (row, col) {
                    (18, 5) | (18, 6) | (19, 4) | (19, 5) => Cell::Filled(color),
                    (19, 0) => Cell::Filled(red()),
                    _ => Cell::Empty,
                };
                assert_eq!(board.get(row, col), Some(expected), "({row}, {col})");
            }
        }
    }

    #[test]
    fn test_completed_rows_ascending() {
        let mut board = Board::new();
        fill_row(&mut board, 19, red());
        fill_row(&mut board, 17, red());
        board.set(18, 0, Cell::Filled(red()));
        assert_eq!(board.completed_rows(), vec![17, 19]);
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::new();
        // Fill the bottom row
        fill_row(&mut board, 19, red());
        // Add a block on the row above
        board.set(18, 0, Cell::Filled(TetrominoType::I.color()));

        board.remove_rows(&[19]);
        // The block from row 18 should now be on row 19
        assert_eq!(board.get(19, 0), Some(Cell::Filled(TetrominoType::I.color())));
        assert!(board.get(18, 0).unwrap().is_empty());
        assert!(board.get(19, 1).unwrap().is_empty());
    }

    #[test]
    fn test_remove_rows_keeps_order_and_height() {
        let mut board = Board::new();
        // Mark rows 14..20 with distinct colors in column 0
        for row in 14..BOARD_HEIGHT as i32 {
            board.set(row, 0, Cell::Filled(ColorId::from_palette_index(row as usize)));
        }
        fill_row(&mut board, 15, red());
        fill_row(&mut board, 18, red());

        board.remove_rows(&[18, 15]);

        let column: Vec<u8> = board.color_ids().iter().map(|row| row[0]).collect();
        assert_eq!(column.len(), BOARD_HEIGHT);
        let id = |row: usize| ColorId::from_palette_index(row).get();
        assert_eq!(&column[..16], &[0; 16]);
        assert_eq!(&column[16..], &[id(14), id(16), id(17), id(19)]);
    }

    #[test]
    fn test_remove_rows_ignores_duplicates_and_out_of_range() {
        let mut board = Board::new();
        fill_row(&mut board, 19, red());
        board.set(18, 3, Cell::Filled(red()));

        board.remove_rows(&[19, 19, BOARD_HEIGHT + 5]);

        assert_eq!(board.get(19, 3), Some(Cell::Filled(red())));
        assert_eq!(board.color_ids().iter().flatten().filter(|&&c| c != 0).count(), 1);
    }
}
