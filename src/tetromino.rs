//! Piece catalog: the seven tetromino templates and the color palette
//!
//! Shapes and colors are indexed independently. Shape `i` takes palette
//! entry `i % 12`, so the palette has room for more shapes than the catalog.

use serde::Serialize;

/// Largest bounding box any shape may occupy
pub const MAX_SHAPE_SIZE: usize = 4;

/// Block colors as 0xRRGGBB
pub const PALETTE: [u32; 12] = [
    0x00bfff, 0xffd700, 0xba55d3, 0x32cd32, 0xff6347, 0x4169e1, 0xff8c00, 0xff1493, 0x00fa9a,
    0x9370db, 0xff69b4, 0x20b2aa,
];

/// A palette color, stored 1-based so that 0 can mean "empty" on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub struct ColorId(u8);

impl ColorId {
    /// Color for a palette index, wrapping around the palette
    pub fn from_palette_index(index: usize) -> Self {
        Self((index % PALETTE.len()) as u8 + 1)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The palette color as 0xRRGGBB
    pub fn rgb(self) -> u32 {
        PALETTE[self.0 as usize - 1]
    }
}

impl From<ColorId> for u8 {
    fn from(color: ColorId) -> u8 {
        color.0
    }
}

/// A boolean cell matrix of at most 4x4, row 0 on top
///
/// `Shape` is a plain value: every piece in play holds its own copy and
/// rotation builds a new one, so catalog templates can never be mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    height: u8,
    width: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Build a shape from rows of 0/1 values
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        debug_assert!(
            !rows.is_empty() && rows.len() <= MAX_SHAPE_SIZE,
            "shape must have 1..=4 rows"
        );
        let width = rows.first().map_or(0, |row| row.len());
        debug_assert!(
            (1..=MAX_SHAPE_SIZE).contains(&width) && rows.iter().all(|row| row.len() == width),
            "shape rows must be rectangular and 1..=4 wide"
        );

        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter().enumerate().take(MAX_SHAPE_SIZE) {
            for (c, &value) in row.iter().enumerate().take(MAX_SHAPE_SIZE) {
                cells[r][c] = value != 0;
            }
        }

        Self {
            height: rows.len().min(MAX_SHAPE_SIZE) as u8,
            width: width.min(MAX_SHAPE_SIZE) as u8,
            cells,
        }
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// (row, col) offsets of every set cell, top to bottom
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let cells = self.cells;
        let (height, width) = (self.height(), self.width());
        (0..height)
            .flat_map(move |r| (0..width).filter_map(move |c| cells[r][c].then_some((r, c))))
    }

    /// Rotate 90 degrees clockwise: transpose, then reverse each row
    pub fn rotated_cw(&self) -> Shape {
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let height = self.height();
        for (r, row) in cells.iter_mut().enumerate().take(self.width()) {
            for (c, cell) in row.iter_mut().enumerate().take(height) {
                *cell = self.cells[height - 1 - c][r];
            }
        }
        Shape {
            height: self.width,
            width: self.height,
            cells,
        }
    }

    /// The matrix as nested rows, for snapshots
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.height())
            .map(|r| self.cells[r][..self.width()].to_vec())
            .collect()
    }
}

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoType {
    /// All catalog entries in catalog order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Position in the catalog
    pub fn index(&self) -> usize {
        match self {
            TetrominoType::I => 0,
            TetrominoType::O => 1,
            TetrominoType::T => 2,
            TetrominoType::S => 3,
            TetrominoType::Z => 4,
            TetrominoType::J => 5,
            TetrominoType::L => 6,
        }
    }

    /// Get the color for this tetromino
    pub fn color(&self) -> ColorId {
        ColorId::from_palette_index(self.index())
    }

    /// A fresh copy of the spawn-orientation shape
    pub fn shape(&self) -> Shape {
        match self {
            TetrominoType::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            TetrominoType::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            TetrominoType::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            TetrominoType::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            TetrominoType::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            TetrominoType::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            TetrominoType::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        }
    }
}
