//! Piece spawner with a single-piece lookahead
//!
//! Every draw is an independent uniform pick from the catalog, so the same
//! piece can come up several times in a row. The RNG is seedable so a game
//! can be replayed exactly.

use crate::tetromino::{ColorId, Shape, TetrominoType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A drawn catalog entry: kind, its own copy of the shape, and its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPiece {
    pub kind: TetrominoType,
    pub shape: Shape,
    pub color: ColorId,
}

impl NextPiece {
    pub fn from_kind(kind: TetrominoType) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            color: kind.color(),
        }
    }
}

/// The lookahead buffer and the RNG that refills it
#[derive(Debug, Clone)]
pub struct Spawner {
    next: NextPiece,
    rng: ChaCha8Rng,
}

impl Spawner {
    /// Create a spawner with the lookahead already filled
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = Self::draw(&mut rng);
        Self { next, rng }
    }

    /// The buffered piece, without consuming it
    pub fn peek_next(&self) -> &NextPiece {
        &self.next
    }

    /// Hand out the buffered piece and immediately draw its replacement
    pub fn advance(&mut self) -> NextPiece {
        let replacement = Self::draw(&mut self.rng);
        std::mem::replace(&mut self.next, replacement)
    }

    fn draw(rng: &mut ChaCha8Rng) -> NextPiece {
        let kinds = TetrominoType::all();
        NextPiece::from_kind(kinds[rng.gen_range(0..kinds.len())])
    }
}
