//! Defines the [`Direction`] type.

use rand::distr::{Distribution, StandardUniform};
use std::{
    fmt::{Display, Write as _},
    str::FromStr,
};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The directions in which a tile can be moved.
///
/// A direction always refers to the motion of the tile; the blank moves the
/// opposite way. This is also the alphabet of the cycle automaton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Moving the tile below the blank upwards.
    Up,
    /// Moving the tile right of the blank to the left.
    Left,
    /// Moving the tile above the blank downwards.
    Down,
    /// Moving the tile left of the blank to the right.
    Right,
}

impl Direction {
    /// All four directions, in expansion order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// The opposite direction. Swaps `Up` with `Down` and `Left` with `Right`.
    ///
    /// This is also the central 180° symmetry on directions, used when
    /// reporting solutions of parity-normalized puzzles.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
            Self::Right => Self::Left,
        }
    }

    /// Reflection in the main diagonal. Swaps `Up` with `Left` and `Down` with `Right`.
    #[must_use]
    pub fn transpose(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Up,
            Self::Down => Self::Right,
            Self::Right => Self::Down,
        }
    }

    /// Reflection through the vertical axis. Swaps `Left` with `Right`.
    #[must_use]
    pub fn reflect_left_right(self) -> Self {
        match self {
            Self::Up => Self::Up,
            Self::Left => Self::Right,
            Self::Down => Self::Down,
            Self::Right => Self::Left,
        }
    }

    /// Reflection through the horizontal axis. Swaps `Up` with `Down`.
    #[must_use]
    pub fn reflect_up_down(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Left,
            Self::Down => Self::Up,
            Self::Right => Self::Right,
        }
    }

    /// The direction of the tile sliding from cell `from` into the blank at
    /// cell `to`, on a board of the given width. The two cells must be
    /// neighbors.
    #[must_use]
    pub(crate) fn of_slide(from: usize, to: usize, width: usize) -> Self {
        if from == to + width {
            Self::Up
        } else if to == from + width {
            Self::Down
        } else if from == to + 1 {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// Displacement `(row, column)` of the blank when a tile moves in this
    /// direction. The blank moves opposite to the tile.
    #[must_use]
    pub(crate) fn blank_delta(self) -> (i32, i32) {
        match self {
            Self::Up => (1, 0),
            Self::Down => (-1, 0),
            Self::Left => (0, 1),
            Self::Right => (0, -1),
        }
    }
}

impl Display for Direction {
    /// Formats the direction as an upper case character: U, L, D, R
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(match self {
            Self::Up => 'U',
            Self::Left => 'L',
            Self::Down => 'D',
            Self::Right => 'R',
        })
    }
}

/// Error type for [`TryFrom<char>`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParseDirectionError {
    /// Found a character other than U, L, D, R.
    #[error("InvalidCharacter: character {0} must be one of 'U', 'L', 'D', 'R'")]
    InvalidCharacter(char),

    /// The string is empty.
    #[error("Empty: string is empty")]
    Empty,
}

impl TryFrom<char> for Direction {
    type Error = ParseDirectionError;

    /// Maps the characters 'U', 'L', 'D', 'R' to directions.
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'U' => Ok(Self::Up),
            'L' => Ok(Self::Left),
            'D' => Ok(Self::Down),
            'R' => Ok(Self::Right),
            _ => Err(Self::Error::InvalidCharacter(value)),
        }
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Maps the single-character strings "U", "L", "D", "R" to directions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(Self::Up),
            "L" => Ok(Self::Left),
            "D" => Ok(Self::Down),
            "R" => Ok(Self::Right),
            _ => Err(s
                .chars()
                .next()
                .map_or(Self::Err::Empty, Self::Err::InvalidCharacter)),
        }
    }
}

impl Distribution<Direction> for StandardUniform {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Direction {
        match rng.random_range(0..4) {
            0 => Direction::Up,
            1 => Direction::Left,
            2 => Direction::Down,
            3 => Direction::Right,
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use crate::algorithm::direction::{Direction, ParseDirectionError};

    #[test]
    fn test_from_str() {
        assert_eq!(Direction::from_str("U"), Ok(Direction::Up));
        assert_eq!(
            Direction::from_str("x"),
            Err(ParseDirectionError::InvalidCharacter('x'))
        );
        assert_eq!(Direction::from_str(""), Err(ParseDirectionError::Empty));
    }

    #[test]
    fn test_symmetries_are_involutions() {
        for d in Direction::ALL {
            assert_eq!(d.inverse().inverse(), d);
            assert_eq!(d.transpose().transpose(), d);
            assert_eq!(d.reflect_left_right().reflect_left_right(), d);
            assert_eq!(d.reflect_up_down().reflect_up_down(), d);
        }
    }

    #[test]
    fn test_of_slide() {
        // Blank in cell 5 of a 4-wide board.
        assert_eq!(Direction::of_slide(9, 5, 4), Direction::Up);
        assert_eq!(Direction::of_slide(1, 5, 4), Direction::Down);
        assert_eq!(Direction::of_slide(6, 5, 4), Direction::Left);
        assert_eq!(Direction::of_slide(4, 5, 4), Direction::Right);
    }
}
