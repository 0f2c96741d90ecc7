//! Active falling piece logic

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Board};
use crate::spawner::NextPiece;
use crate::tetromino::{ColorId, Shape, TetrominoType};

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub kind: TetrominoType,
    /// Current shape, rotated in place from the spawn copy
    pub shape: Shape,
    /// Color for the piece's whole lifetime
    pub color: ColorId,
    /// Board position of the shape's top-left cell
    /// Row 0 is the top, increases downward
    pub row: i32,
    pub col: i32,
}

impl Piece {
    /// Place a drawn piece at the top of the board, horizontally centered
    pub fn spawn(next: NextPiece) -> Self {
        let col = (BOARD_WIDTH - next.shape.width()) / 2;
        Self {
            kind: next.kind,
            shape: next.shape,
            color: next.color,
            row: 0,
            col: col as i32,
        }
    }

    /// Whether the piece fits at its current position
    pub fn fits(&self, board: &Board) -> bool {
        !board.collides(&self.shape, self.row, self.col)
    }

    /// Shift by (d_row, d_col) if the target is free, returns true if moved
    fn try_shift(&mut self, d_row: i32, d_col: i32, board: &Board) -> bool {
        if board.collides(&self.shape, self.row + d_row, self.col + d_col) {
            return false;
        }
        self.row += d_row;
        self.col += d_col;
        true
    }

    /// Try to move sideways by `d_col` columns
    pub fn try_move(&mut self, d_col: i32, board: &Board) -> bool {
        self.try_shift(0, d_col, board)
    }

    /// Try to move one row down. A false return means the piece has landed.
    pub fn try_descend(&mut self, board: &Board) -> bool {
        self.try_shift(1, 0, board)
    }

    /// Rotate 90 degrees clockwise about the bounding box origin.
    ///
    /// There are no wall kicks: the rotated box is pushed back inside the
    /// side walls and above the floor, then accepted only if it fits there.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let rotated = self.shape.rotated_cw();
        let (width, height) = (rotated.width() as i32, rotated.height() as i32);

        let mut col = self.col;
        let mut row = self.row;
        if col + width > BOARD_WIDTH as i32 {
            col = BOARD_WIDTH as i32 - width;
        }
        if col < 0 {
            col = 0;
        }
        if row + height > BOARD_HEIGHT as i32 {
            row = BOARD_HEIGHT as i32 - height;
        }

        if board.collides(&rotated, row, col) {
            return false;
        }

        self.shape = rotated;
        self.row = row;
        self.col = col;
        true
    }
}
