//! Defines the [`Move`] type, one step of a reported solution.

use std::fmt::Display;

use crate::algorithm::direction::Direction;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// One step of a solution: the tile that physically moves, and the direction
/// it moves in. Moves are always reported in the original (non-normalized)
/// frame of the puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    /// The tile that moves.
    pub tile: usize,
    /// The direction the tile moves in.
    pub direction: Direction,
}

impl Move {
    /// Creates a new [`Move`].
    #[must_use]
    pub fn new(tile: usize, direction: Direction) -> Self {
        Self { tile, direction }
    }
}

impl Display for Move {
    /// Formats the move as the tile number followed by the direction
    /// character, e.g. `7U`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.tile, self.direction)
    }
}
