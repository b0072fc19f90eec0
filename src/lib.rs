//! An optimal solver for sliding-tile puzzles (the 15-puzzle and its
//! rectangular generalizations).
//!
//! The entry point is [`Puzzle`], which wraps a board in a thread-safe
//! façade. A puzzle is created from a grid (or filled randomly), optionally
//! strengthened with an additive [`PatternDb`] and a [`CycleBank`], and then
//! solved with either IDA* or RBFS. Both engines return a shortest move
//! sequence.
//!
//! ```no_run
//! use taquin::puzzle::{puzzle::Puzzle, size::Size};
//!
//! let size = Size::new(4, 4).unwrap();
//! let puzzle = Puzzle::with_grid(
//!     size,
//!     &[14, 13, 15, 7, 11, 12, 9, 5, 6, 0, 2, 1, 4, 8, 10, 3],
//! )
//! .unwrap();
//! puzzle.attach_pdb(5).unwrap();
//! puzzle.attach_cycles(14).unwrap();
//! assert_eq!(puzzle.solve_ida().unwrap(), 57);
//! ```
//!
//! [`Puzzle`]: crate::puzzle::puzzle::Puzzle
//! [`PatternDb`]: crate::solver::pdb::PatternDb
//! [`CycleBank`]: crate::solver::cycles::CycleBank

pub mod algorithm;
pub mod puzzle;
pub mod solver;
