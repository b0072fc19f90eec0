//! Defines [`PatternDb`], an additive pattern database heuristic.
//!
//! The non-blank tiles of the goal are partitioned into disjoint patterns.
//! For each pattern, a table holds the exact minimum number of tile moves
//! needed to bring the pattern's tiles from any placement to their goal
//! cells, assuming the blank moves freely (blank moves are not counted).
//! Summing the tables over the disjoint patterns is admissible and much
//! tighter than the Manhattan distance.

use num_traits::{AsPrimitive, PrimInt, Unsigned};

use crate::{
    puzzle::{
        board::Board,
        cancel::{CancelToken, Canceled},
        size::Size,
    },
    solver::{heuristic::Heuristic, search::Diag},
};

/// One pattern: the tiles it tracks and the distance table indexed by the
/// base-N concatenation of the tiles' cells.
#[derive(Debug, PartialEq, Eq)]
struct Pattern {
    tiles: Vec<usize>,
    table: Vec<i8>,
}

/// Position and tile maps for the diagonal-mirror evaluation, present when
/// the board is square and the goal blank sits on the main diagonal.
#[derive(Debug, PartialEq, Eq)]
struct Mirror {
    pos: Vec<usize>,
    tile: Vec<usize>,
}

/// An additive pattern database for one board shape and goal.
///
/// Immutable once built; puzzle instances of the same shape share it through
/// an [`Arc`](std::sync::Arc).
#[derive(Debug, PartialEq, Eq)]
pub struct PatternDb {
    size: Size,
    patterns: Vec<Pattern>,
    mirror: Option<Mirror>,
}

impl PatternDb {
    /// Builds the database for the goal of `board`, with patterns of at most
    /// `max_pattern_size` tiles (capped so every table index fits in 32
    /// bits). Polls `cancel` between patterns.
    pub(crate) fn build(
        board: &Board,
        max_pattern_size: usize,
        cancel: &CancelToken,
        diag: &mut Diag<'_>,
    ) -> Result<Self, Canceled> {
        let size = board.size();
        let pattern_size = capped_pattern_size(size.area(), max_pattern_size);
        diag.say(format_args!(
            "Create heuristic database using breadth-first search (pattern max size is {pattern_size}{})...",
            if pattern_size < max_pattern_size {
                ", restricted by hardware capabilities"
            } else {
                ""
            }
        ));

        let mirror = Mirror::for_goal(size, board.goal_grid(), board.goal_pos());

        diag.say(format_args!("Patterns for target:"));
        let mut patterns = Vec::new();
        for (tiles, positions) in partition(size, board.goal_grid(), pattern_size) {
            if cancel.take() {
                return Err(Canceled);
            }
            diag.say(format_args!(
                "Tiles{}",
                tiles
                    .iter()
                    .map(|&t| format!(" {}", board.report_tile(t)))
                    .collect::<String>()
            ));
            let table = build_table(size, &positions);
            patterns.push(Pattern { tiles, table });
        }
        diag.say(format_args!(
            "Create heuristic database using breadth-first search...DONE"
        ));

        Ok(Self {
            size,
            patterns,
            mirror,
        })
    }

    /// The board shape this database was built for.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// The number of disjoint patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// The additive heuristic for the configuration described by `pos`
    /// (cell of each tile). With a mirror present, the maximum of the direct
    /// and mirrored sums is returned; both are admissible, so the maximum is
    /// too.
    pub(crate) fn evaluate(&self, pos: &[usize]) -> i32 {
        let n = self.size.area();
        let mut sum = 0_i32;
        for pattern in &self.patterns {
            let mut index = 0_usize;
            for &tile in &pattern.tiles {
                index = index * n + pos[tile];
            }
            sum += i32::from(pattern.table[index]);
        }

        if let Some(mirror) = &self.mirror {
            let mut mirrored = 0_i32;
            for pattern in &self.patterns {
                let mut index = 0_usize;
                for &tile in &pattern.tiles {
                    index = index * n + mirror.pos[pos[mirror.tile[tile]]];
                }
                mirrored += i32::from(pattern.table[index]);
            }
            if mirrored > sum {
                sum = mirrored;
            }
        }

        sum
    }
}

impl<T> Heuristic<T> for PatternDb
where
    T: PrimInt + Unsigned + 'static,
    usize: AsPrimitive<T>,
{
    fn bound(&self, board: &Board) -> T {
        (self.evaluate(board.pos()) as usize).as_()
    }
}

impl Mirror {
    /// `pos[c]` is the reflection of cell `c` in the main diagonal;
    /// `tile[t]` is the tile whose goal cell is the reflection of `t`'s.
    /// Only defined when the goal blank lies on the diagonal of a square
    /// board, which is what makes the mirrored sum a valid bound.
    fn for_goal(size: Size, goal_grid: &[usize], goal_pos: &[usize]) -> Option<Self> {
        let (w, _) = size.into();
        if !size.is_square() || goal_pos[0] % (w + 1) != 0 {
            return None;
        }

        let n = size.area();
        let pos: Vec<usize> = (0..n).map(|c| w * (c % w) + c / w).collect();
        let mut tile = vec![0; n];
        for c in 0..n {
            tile[goal_grid[c]] = goal_grid[pos[c]];
        }
        Some(Self { pos, tile })
    }
}

/// The largest usable pattern size: `k` such that a base-N index of `k`
/// digits still fits in 32 bits, capped at the requested size.
fn capped_pattern_size(area: usize, requested: usize) -> usize {
    let mut k = 0;
    let mut max = 1_u128;
    while k < requested && max * area as u128 - 1 <= u128::from(u32::MAX) {
        max *= area as u128;
        k += 1;
    }
    k
}

/// Greedily fills patterns of up to `pattern_size` tiles, scanning the goal
/// in row-serpentine order (every other row reversed; the whole serpentine
/// reversed when `pattern_size` is even). Keeps each pattern geometrically
/// contiguous. Returns `(tiles, goal cells)` per pattern.
fn partition(size: Size, goal_grid: &[usize], pattern_size: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let (w, _) = size.into();
    let n = size.area();
    let count = (n - 2 + pattern_size) / pattern_size;

    let mut result = Vec::with_capacity(count);
    let mut start = 0;
    for _ in 0..count {
        let mut tiles = Vec::new();
        let mut positions = Vec::new();
        let mut p = start;
        while tiles.len() < pattern_size && p < n {
            let row = p / w;
            let mut cell = if row % 2 == 1 {
                (row + 1) * w - p % w - 1
            } else {
                p
            };
            if pattern_size % 2 == 0 {
                cell = n - 1 - cell;
            }
            if goal_grid[cell] != 0 {
                tiles.push(goal_grid[cell]);
                positions.push(cell);
            }
            p += 1;
        }

        if !tiles.is_empty() {
            result.push((tiles, positions));
        }
        if p == n {
            break;
        }
        start = p;
    }
    result
}

/// Builds one pattern's distance table by breadth-first search from the goal
/// placement. Every cell starts at −1; placements putting two tiles on the
/// same cell are overwritten to 0 (forbidden) before the goal distance is
/// written, so the search never expands them.
fn build_table(size: Size, goal_cells: &[usize]) -> Vec<i8> {
    let (w, _) = size.into();
    let n = size.area();
    let k = goal_cells.len();
    let space = n.pow(k as u32);

    let mut table = vec![-1_i8; space];

    let mut cells = vec![0_usize; k];
    for entry in table.iter_mut() {
        'collision: for j1 in 0..k {
            for j2 in j1 + 1..k {
                if cells[j1] == cells[j2] {
                    *entry = 0;
                    break 'collision;
                }
            }
        }
        for cell in cells.iter_mut() {
            *cell += 1;
            if *cell >= n {
                *cell = 0;
            } else {
                break;
            }
        }
    }

    let goal_index = goal_cells.iter().fold(0_usize, |acc, &c| acc * n + c);
    table[goal_index] = 0;

    let mut queue = Vec::with_capacity(space);
    queue.push(goal_index as u32);
    let mut head = 0;

    let mut next_cells = vec![0_usize; k];
    while head < queue.len() {
        let index = queue[head] as usize;
        head += 1;
        let distance = table[index];

        let mut rest = index;
        for j in (0..k).rev() {
            cells[j] = rest % n;
            rest /= n;
        }

        for tile in 0..k {
            for dir in 0..4 {
                let cell = cells[tile];
                let moved = match dir {
                    0 if cell >= w => cell - w,
                    1 if cell < n - w => cell + w,
                    2 if cell % w != 0 => cell - 1,
                    3 if (cell + 1) % w != 0 => cell + 1,
                    _ => continue,
                };

                next_cells.copy_from_slice(&cells);
                next_cells[tile] = moved;
                let next_index = next_cells.iter().fold(0_usize, |acc, &c| acc * n + c);

                // Already reached, or a forbidden placement.
                if table[next_index] >= 0 {
                    continue;
                }

                table[next_index] = distance + 1;
                queue.push(next_index as u32);
            }
        }
    }

    table
}
