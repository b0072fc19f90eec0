//! Mines zero-displacement move sequences ("cycles") and registers them in
//! the automaton.
//!
//! Cycles are searched on an inflated (2W−1)×(2H−1) board whose goal has
//! the blank at the center and whose start is one slide away from it, so
//! that cycle geometry is independent of edges: a cycle mined here is valid
//! on any board position where its zone fits. The miner runs IDA* with the
//! start as its own goal; every solution is the closing of a cycle. Each
//! found cycle is registered under all sixteen symmetry variants and then
//! forbidden, and the search restarts at the same bound until the bound
//! exceeds the requested maximum length.

use crate::{
    algorithm::direction::Direction,
    puzzle::{
        board::Board,
        cancel::{CancelToken, Canceled},
        size::Size,
    },
    solver::{
        cycles::automaton::{Automaton, Zone},
        ida::{IdaEngine, Root},
        search::{SearchContext, Status},
    },
};

/// Mines all cycles of length at most `max_length` for boards of shape
/// `size` and returns the compiled automaton. Polls `cancel` once per
/// search pass.
pub(crate) fn mine(
    size: Size,
    max_length: usize,
    cancel: &CancelToken,
) -> Result<Automaton, Canceled> {
    let inflated = size.inflate_for_cycling();
    let (board, seed) = cycling_board(inflated);

    let mut automaton = Automaton::new();
    automaton.compile();

    let mut engine = IdaEngine::new(inflated.area());
    let mut bound = 1_i32;

    while (bound as usize) < max_length {
        if cancel.take() {
            return Err(Canceled);
        }

        let seeded = automaton.step(Automaton::START, seed);
        let mut status = Status::Searching;
        let found = {
            let ctx = SearchContext {
                board: &board,
                pdb: None,
                cycles: Some(&automaton),
                skip_up_at_root: true,
            };
            let root = Root {
                grid: board.grid(),
                pos: board.pos(),
                d2sol: 1,
                state: seeded,
            };
            engine.search(&ctx, root, bound, &mut status)
        };

        match status {
            Status::Solved => {
                let mut cycle = Vec::with_capacity(found as usize + 1);
                cycle.push(seed);
                cycle.extend(engine.moves(found as usize));
                register_cycle(&mut automaton, &cycle);
                automaton.compile();
            }
            Status::Searching => {
                if found < 0 || found == i32::MAX {
                    break;
                }
                bound = found;
            }
            Status::Aborted => break,
        }
    }

    Ok(automaton)
}

/// The inflated board the miner searches on, plus the direction of the one
/// slide separating its start from its goal (`Left` on boards wider than
/// one cell). The goal has the blank at the center; the start swaps the
/// blank with its successor cell.
fn cycling_board(size: Size) -> (Board, Direction) {
    let n = size.area();
    let center = (n - 1) / 2;

    let goal: Vec<usize> = (0..n)
        .map(|cell| {
            if cell < center {
                cell + 1
            } else if cell > center {
                cell
            } else {
                0
            }
        })
        .collect();

    let mut grid = goal.clone();
    grid[center] = grid[center + 1];
    grid[center + 1] = 0;

    let seed = Direction::of_slide(center + 1, center, size.width());
    (Board::with_goal(size, grid, goal), seed)
}

/// Registers a raw cycle and its symmetry closure: the eight combinations
/// of horizontal flip, vertical flip, and quarter-turn relabel, each paired
/// with its time reversal. Only the first half of each variant is stored
/// (time reversal makes the halves interchangeable); the zone records the
/// bounding box of the blank over the unstored second half, which is what
/// the search would traverse to close the cycle.
fn register_cycle(automaton: &mut Automaton, moves: &[Direction]) {
    let length = moves.len();
    let half = length / 2 + 1;

    let mut key = vec![Direction::Up; length];
    let mut revkey = vec![Direction::Up; length];

    for variant in 0..8_u8 {
        for (i, &raw) in moves.iter().enumerate() {
            let mut dir = raw;
            if variant & 1 != 0 {
                dir = dir.reflect_left_right();
            }
            if variant & 2 != 0 {
                dir = dir.reflect_up_down();
            }
            if variant & 4 != 0 {
                dir = dir.transpose();
            }
            key[i] = dir;
            revkey[length - 1 - i] = dir.inverse();
        }

        let ordering = key.cmp(&revkey);

        automaton.register(&key[..half], zone_over(&key[half..]));
        match ordering {
            std::cmp::Ordering::Equal => {}
            std::cmp::Ordering::Greater => {
                automaton.register(&revkey[..half], zone_over(&revkey[half..]));
                automaton.register(&key[..half - 1], zone_over(&key[half - 1..]));
            }
            std::cmp::Ordering::Less => {
                automaton.register(&revkey[..half], zone_over(&revkey[half..]));
                automaton.register(&revkey[..half - 1], zone_over(&revkey[half - 1..]));
            }
        }
    }
}

/// The bounding box of the blank's cumulative displacement over a move
/// sequence, origin included.
fn zone_over(moves: &[Direction]) -> Zone {
    let mut zone = Zone::default();
    let (mut row, mut col) = (0, 0);
    for &dir in moves {
        let (dr, dc) = dir.blank_delta();
        row += dr;
        col += dc;
        zone.extend(row, col);
    }
    zone
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::direction::Direction::{Down, Left, Right, Up};

    #[test]
    fn test_cycling_board_shape() {
        let (board, seed) = cycling_board(Size::new(7, 7).unwrap());
        assert_eq!(seed, Left);
        // Goal blank at the center, start blank one cell to the right.
        assert_eq!(board.goal_pos()[0], 24);
        assert_eq!(board.pos()[0], 25);
        // One slide apart.
        assert_eq!(board.grid()[24], board.goal_grid()[25]);
    }

    #[test]
    fn test_cycling_board_line() {
        let (board, seed) = cycling_board(Size::new(1, 7).unwrap());
        assert_eq!(seed, Up);
        assert_eq!(board.goal_pos()[0], 3);
        assert_eq!(board.pos()[0], 4);
    }

    #[test]
    fn test_zone_over() {
        // Tile moves l, l, u: the blank drifts right twice then down once.
        let zone = zone_over(&[Left, Left, Up]);
        assert_eq!(
            zone,
            Zone {
                row_min: 0,
                row_max: 1,
                col_min: 0,
                col_max: 2,
            }
        );
    }

    #[test]
    fn test_register_cycle_lr() {
        let mut automaton = Automaton::new();
        register_cycle(&mut automaton, &[Left, Right]);
        automaton.compile();

        // The length-2 cycles close over an empty second half, so their
        // zones are the origin box and every inverse pair is recognized.
        for (a, b) in [(Left, Right), (Right, Left), (Up, Down), (Down, Up)] {
            let state = automaton.step(automaton.step(Automaton::START, a), b);
            assert!(
                automaton.zone_fits(state, 0, Size::new(2, 2).unwrap()),
                "{a}{b} should be recognized as a cycle"
            );
        }
    }

    #[test]
    fn test_mine_smallest_bank() {
        let bank = mine(Size::new(4, 4).unwrap(), 2, &CancelToken::new()).unwrap();
        // Only the four inverse pairs fit in two moves.
        assert_eq!(bank.keyword_count(), 4);
    }

    #[test]
    fn test_mine_finds_longer_cycles() {
        let bank = mine(Size::new(4, 4).unwrap(), 12, &CancelToken::new()).unwrap();
        // Twelve moves cover the inverse pairs, the 3-cycles of a 2x2 block
        // (length 12), and more besides.
        assert!(bank.keyword_count() > 4);

        // The canonical 2x2 rotor: "rdlu rdlu rdlu" leaves the board
        // unchanged. Its first half must be a registered keyword.
        let word = [Right, Down, Left, Up, Right, Down, Left];
        let mut state = Automaton::START;
        for dir in word {
            state = bank.step(state, dir);
        }
        assert!(!bank.matches(state).is_empty());
    }

    #[test]
    fn test_mine_canceled() {
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(mine(Size::new(4, 4).unwrap(), 8, &cancel).is_err());
    }
}
