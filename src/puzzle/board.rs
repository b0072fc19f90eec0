//! Defines [`Board`], the internal grid model the search engines operate on.
//!
//! A board always solves toward the canonical goal: blank in cell 0, tiles
//! `1..N-1` ascending. Instances whose parity is odd are normalized at
//! construction by a central 180° symmetry on both cells and tile numbers,
//! which maps them onto an equivalent even-parity instance; the inverse maps
//! are applied when reporting.

use crate::{
    algorithm::direction::Direction,
    puzzle::size::Size,
};

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The parity class of a puzzle instance: blank row plus inversion count of
/// the non-blank tiles, mod 2. Invariant under blank moves on even-width
/// boards; decides which of the two canonical goals the instance solves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    /// The instance solves to the blank-first goal as given.
    Even,
    /// The instance was normalized by a central symmetry.
    Odd,
}

/// Precomputed legal blank destinations for every cell, stored as a flat
/// neighbor array with a prefix-sum index so enumeration is allocation-free.
#[derive(Clone, Debug)]
pub(crate) struct MoveTable {
    neighbors: Vec<usize>,
    upper: Vec<usize>,
}

impl MoveTable {
    fn new(size: Size) -> Self {
        let (w, h) = size.into();
        let n = size.area();
        let mut neighbors = Vec::with_capacity(4 * n - 2 * (w + h));
        let mut upper = Vec::with_capacity(n);
        for cell in 0..n {
            if cell >= w {
                neighbors.push(cell - w);
            }
            if cell + w < n {
                neighbors.push(cell + w);
            }
            if cell % w > 0 {
                neighbors.push(cell - 1);
            }
            if cell % w < w - 1 {
                neighbors.push(cell + 1);
            }
            upper.push(neighbors.len());
        }
        Self { neighbors, upper }
    }

    /// The cells the blank may move to from `cell`.
    pub(crate) fn from_cell(&self, cell: usize) -> &[usize] {
        let start = if cell == 0 { 0 } else { self.upper[cell - 1] };
        &self.neighbors[start..self.upper[cell]]
    }
}

/// The grid model: tile placement, its inverse, the goal configuration, and
/// the move table. `grid[pos[t]] == t` and `pos[grid[c]] == c` always hold.
#[derive(Clone, Debug)]
pub(crate) struct Board {
    size: Size,
    grid: Vec<usize>,
    pos: Vec<usize>,
    goal_grid: Vec<usize>,
    goal_pos: Vec<usize>,
    parity: Parity,
    moves: MoveTable,
}

impl Board {
    /// Creates a board from a valid permutation of `0..size.area()`,
    /// normalizing odd-parity instances. The caller validates the grid.
    pub(crate) fn new(size: Size, grid: Vec<usize>) -> Self {
        let n = size.area();
        let goal_grid: Vec<usize> = (0..n).collect();
        let goal_pos = goal_grid.clone();

        let parity = parity_of(size, &grid, &goal_pos);
        let grid = match parity {
            Parity::Even => grid,
            Parity::Odd => central_symmetry(&grid),
        };

        let mut pos = vec![0; n];
        for (cell, &tile) in grid.iter().enumerate() {
            pos[tile] = cell;
        }

        Self {
            size,
            grid,
            pos,
            goal_grid,
            goal_pos,
            parity,
            moves: MoveTable::new(size),
        }
    }

    /// Creates a board with an explicit goal configuration and no parity
    /// normalization. Used by the cycle miner, whose goal is not canonical.
    pub(crate) fn with_goal(size: Size, grid: Vec<usize>, goal_grid: Vec<usize>) -> Self {
        let n = size.area();
        let mut pos = vec![0; n];
        for (cell, &tile) in grid.iter().enumerate() {
            pos[tile] = cell;
        }
        let mut goal_pos = vec![0; n];
        for (cell, &tile) in goal_grid.iter().enumerate() {
            goal_pos[tile] = cell;
        }
        Self {
            size,
            grid,
            pos,
            goal_grid,
            goal_pos,
            parity: Parity::Even,
            moves: MoveTable::new(size),
        }
    }

    pub(crate) fn size(&self) -> Size {
        self.size
    }

    /// Tiles by cell, in the normalized frame.
    pub(crate) fn grid(&self) -> &[usize] {
        &self.grid
    }

    /// Cells by tile, in the normalized frame.
    pub(crate) fn pos(&self) -> &[usize] {
        &self.pos
    }

    pub(crate) fn goal_grid(&self) -> &[usize] {
        &self.goal_grid
    }

    pub(crate) fn goal_pos(&self) -> &[usize] {
        &self.goal_pos
    }

    pub(crate) fn parity(&self) -> Parity {
        self.parity
    }

    pub(crate) fn moves(&self) -> &MoveTable {
        &self.moves
    }

    /// Tiles by cell in the original frame, undoing the normalization.
    pub(crate) fn original_grid(&self) -> Vec<usize> {
        match self.parity {
            Parity::Even => self.grid.clone(),
            Parity::Odd => central_symmetry(&self.grid),
        }
    }

    /// Maps a tile number from the normalized frame back to the original one.
    pub(crate) fn report_tile(&self, tile: usize) -> usize {
        match self.parity {
            Parity::Even => tile,
            Parity::Odd => self.size.area() - tile,
        }
    }

    /// Maps a direction from the normalized frame back to the original one.
    pub(crate) fn report_direction(&self, direction: Direction) -> Direction {
        match self.parity {
            Parity::Even => direction,
            Parity::Odd => direction.inverse(),
        }
    }
}

/// Blank row plus inversions of the non-blank tiles with respect to the goal
/// ordering, mod 2.
fn parity_of(size: Size, grid: &[usize], goal_pos: &[usize]) -> Parity {
    let w = size.width();
    let blank_row = grid.iter().position(|&t| t == 0).unwrap() / w;

    let mut count = blank_row;
    for p1 in 0..grid.len() {
        for p2 in p1 + 1..grid.len() {
            if grid[p1] != 0 && grid[p2] != 0 && goal_pos[grid[p1]] > goal_pos[grid[p2]] {
                count += 1;
            }
        }
    }

    if count % 2 == 0 {
        Parity::Even
    } else {
        Parity::Odd
    }
}

/// Central 180° symmetry: cell `c` maps to `N-1-c` and tile `t` to `N-t`.
/// An involution, so it also undoes itself.
fn central_symmetry(grid: &[usize]) -> Vec<usize> {
    let n = grid.len();
    (0..n)
        .map(|cell| {
            let tile = grid[n - 1 - cell];
            if tile == 0 {
                0
            } else {
                n - tile
            }
        })
        .collect()
}
