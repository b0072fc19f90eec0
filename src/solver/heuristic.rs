//! Defines the [`Heuristic`] trait and the [`ManhattanDistance`] heuristic.

use itertools::Itertools as _;
use num_traits::{AsPrimitive, PrimInt, Unsigned};

use crate::puzzle::board::Board;

/// Provides a function returning a lower bound on the number of moves needed
/// to solve a board.
pub(crate) trait Heuristic<T>
where
    T: PrimInt + Unsigned,
{
    /// Returns a lower bound on the number of moves needed to solve `board`.
    #[must_use]
    fn bound(&self, board: &Board) -> T;
}

/// Manhattan distance heuristic: the sum over non-blank tiles of the L1
/// distance between the tile's cell and its goal cell.
///
/// This is the full scan used to seed a search; during the search the value
/// is maintained incrementally, one tile at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ManhattanDistance;

impl<T> Heuristic<T> for ManhattanDistance
where
    T: PrimInt + Unsigned + 'static,
    usize: AsPrimitive<T>,
{
    fn bound(&self, board: &Board) -> T {
        let (w, h) = board.size().into();
        (0..w)
            .cartesian_product(0..h)
            .map(|(x, y)| {
                let tile = board.grid()[x + w * y];
                if tile == 0 {
                    0
                } else {
                    let goal = board.goal_pos()[tile];
                    x.abs_diff(goal % w) + y.abs_diff(goal / w)
                }
            })
            .sum::<usize>()
            .as_()
    }
}

/// The change in Manhattan distance when `tile` moves from cell `from` to
/// cell `to`: new L1 distance to goal minus old.
pub(crate) fn manhattan_delta(
    board_width: usize,
    goal_cell: usize,
    tile_from: usize,
    tile_to: usize,
) -> i32 {
    let w = board_width;
    let old = (tile_from / w).abs_diff(goal_cell / w) + (tile_from % w).abs_diff(goal_cell % w);
    let new = (tile_to / w).abs_diff(goal_cell / w) + (tile_to % w).abs_diff(goal_cell % w);
    new as i32 - old as i32
}
