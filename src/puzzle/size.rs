//! Defines a struct representing the size of a puzzle board.

use std::{
    fmt::{Display, Write},
    num::ParseIntError,
    str::FromStr,
};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The size of a puzzle board.
///
/// Degenerate 1×N and N×1 boards are allowed; the only requirement is that
/// the board holds at least two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size(usize, usize);

/// Error type for [`Size::new`].
#[derive(Clone, Debug, Error, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SizeError {
    /// Returned from [`Size::new`] when the board would hold fewer than two cells.
    #[error("InvalidSize: a {0}x{1} board must hold at least two cells")]
    InvalidSize(usize, usize),
}

impl Size {
    /// Creates a new [`Size`] with the given `width` and `height`.
    pub fn new(width: usize, height: usize) -> Result<Self, SizeError> {
        if width >= 1 && height >= 1 && width * height >= 2 {
            Ok(Self(width, height))
        } else {
            Err(SizeError::InvalidSize(width, height))
        }
    }

    /// The width of the [`Size`].
    pub fn width(&self) -> usize {
        self.0
    }

    /// The height of the [`Size`].
    pub fn height(&self) -> usize {
        self.1
    }

    /// The product of the width and height.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// The number of tiles in a puzzle of this size. Equals `self.area() - 1`.
    pub fn num_tiles(&self) -> usize {
        self.area() - 1
    }

    /// Checks whether a cell index is within bounds on a puzzle of this size.
    pub fn is_within_bounds(&self, cell: usize) -> bool {
        cell < self.area()
    }

    /// Whether the board is square.
    pub fn is_square(&self) -> bool {
        self.0 == self.1
    }

    /// The size of the board used to mine cycles for this size: both
    /// dimensions are inflated to `2d - 1` so that cycle geometry is
    /// decoupled from edge effects.
    pub(crate) fn inflate_for_cycling(&self) -> Self {
        Self(2 * self.0 - 1, 2 * self.1 - 1)
    }
}

impl From<Size> for (usize, usize) {
    fn from(size: Size) -> Self {
        (size.width(), size.height())
    }
}

impl Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_string())?;
        f.write_char('x')?;
        f.write_str(&self.1.to_string())
    }
}

/// Error type for [`Size::from_str`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseSizeError {
    /// The [`Size`] was not of the form `N` or `WxH`.
    #[error("ParseError: failed to parse size string")]
    ParseError,

    /// The width could not be parsed as an integer.
    #[error("ParseWidthError: {0}")]
    ParseWidthError(ParseIntError),

    /// The height could not be parsed as an integer.
    #[error("ParseHeightError: {0}")]
    ParseHeightError(ParseIntError),

    /// The dimensions parsed but do not form a valid size.
    #[error("InvalidSize: {0}")]
    InvalidSize(SizeError),
}

impl FromStr for Size {
    type Err = ParseSizeError;

    /// Parses a string into a [`Size`]. Acceptable formats are
    /// - `N` for some integer string `N`, representing a size where width and height are equal,
    /// - `WxH` for some integer strings `W` and `H`, representing the width and height.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = if let Ok(s) = s.parse::<usize>() {
            (s, s)
        } else {
            let (w, h) = s.split_once('x').ok_or(ParseSizeError::ParseError)?;
            (
                w.trim()
                    .parse::<usize>()
                    .map_err(ParseSizeError::ParseWidthError)?,
                h.trim()
                    .parse::<usize>()
                    .map_err(ParseSizeError::ParseHeightError)?,
            )
        };
        Self::new(w, h).map_err(ParseSizeError::InvalidSize)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn test_new() {
        assert!(Size::new(4, 4).is_ok());
        assert!(Size::new(1, 4).is_ok());
        assert!(Size::new(4, 1).is_ok());
        assert_eq!(Size::new(1, 1), Err(SizeError::InvalidSize(1, 1)));
        assert_eq!(Size::new(0, 5), Err(SizeError::InvalidSize(0, 5)));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Size::from_str("4"), Size::new(4, 4).map_err(ParseSizeError::InvalidSize));
        assert_eq!(Size::from_str("3x5"), Size::new(3, 5).map_err(ParseSizeError::InvalidSize));
        assert!(Size::from_str("x").is_err());
        assert!(Size::from_str("1x1").is_err());
    }

    #[test]
    fn test_inflate_for_cycling() {
        assert_eq!(Size::new(4, 4).unwrap().inflate_for_cycling(), Size(7, 7));
        assert_eq!(Size::new(3, 2).unwrap().inflate_for_cycling(), Size(5, 3));
    }
}
