//! Defines [`Puzzle`], the thread-safe puzzle façade.
//!
//! A `Puzzle` owns a board plus optional shared databases and serializes all
//! access through a readers-writers lock: property lookups and the source
//! side of sharing take the lock for reading; attaching, sharing into,
//! stream and handler updates, and the solves take it for writing. Distinct
//! instances are fully independent, so threads may each drive their own
//! puzzle while sharing the same pattern database and cycle bank.

use std::{
    io::Write,
    mem,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use rand::{seq::SliceRandom as _, Rng};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::{
    algorithm::{direction::Direction, puzzle_move::Move},
    puzzle::{
        board::{Board, Parity},
        cancel::{CancelToken, Canceled},
        size::Size,
    },
    solver::{
        cycles::CycleBank,
        ida::IdaEngine,
        pdb::PatternDb,
        rbfs::RbfsEngine,
        search::{Diag, Outcome, SearchContext},
    },
};

/// A diagnostic sink attached to a puzzle.
pub type DiagStream = Box<dyn Write + Send + Sync>;

/// A callback invoked once per reported solution step with the step number
/// (starting at 1), the tile that moves, and its direction, all in the
/// original frame.
pub type MoveHandler = Box<dyn FnMut(usize, usize, Direction) + Send + Sync>;

/// Error type for [`Puzzle`] construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PuzzleError {
    /// The grid does not hold exactly one tile per cell.
    #[error("WrongLength: expected {expected} cells, got {actual}")]
    WrongLength {
        /// Cell count of the requested size.
        expected: usize,
        /// Length of the grid that was passed.
        actual: usize,
    },

    /// The grid holds a tile out of range (0 to `width * height - 1`).
    #[error("TileOutOfRange: tile {0} is out of range")]
    TileOutOfRange(usize),

    /// The grid holds the same tile more than once.
    #[error("DuplicateTile: tile {0} appears more than once")]
    DuplicateTile(usize),
}

/// Error type for the solves and the database builds.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveError {
    /// The operation observed its [`CancelToken`] and unwound cleanly.
    #[error("Canceled: the operation was canceled")]
    Canceled,

    /// The search ran out of representable bounds without solving.
    #[error("Exhausted: the search space was exhausted without a solution")]
    Exhausted,
}

/// The solve flag of a puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveStatus {
    /// The last search was canceled or exhausted.
    Aborted,
    /// No search has completed since construction or the last reset.
    Unsolved,
    /// The last search found an optimal solution.
    Solved,
}

struct Inner {
    board: Board,
    pdb: Option<Arc<PatternDb>>,
    cycles: Option<Arc<CycleBank>>,
    stream: Option<DiagStream>,
    handler: Option<MoveHandler>,
    status: SolveStatus,
    solution: Vec<Move>,
}

/// A sliding-tile puzzle instance with optional attached databases.
pub struct Puzzle {
    inner: RwLock<Inner>,
    cancel: CancelToken,
}

impl std::fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Puzzle").finish_non_exhaustive()
    }
}

enum Engine {
    Ida,
    Rbfs,
}

impl Puzzle {
    /// Creates a puzzle from a grid listing the tile in each cell, row-major
    /// with cell 0 in the top-left corner and 0 denoting the blank. The grid
    /// must be a permutation of `0..size.area()`.
    pub fn with_grid(size: Size, grid: &[usize]) -> Result<Self, PuzzleError> {
        let n = size.area();
        if grid.len() != n {
            return Err(PuzzleError::WrongLength {
                expected: n,
                actual: grid.len(),
            });
        }
        let mut seen = vec![false; n];
        for &tile in grid {
            if tile >= n {
                return Err(PuzzleError::TileOutOfRange(tile));
            }
            if seen[tile] {
                return Err(PuzzleError::DuplicateTile(tile));
            }
            seen[tile] = true;
        }

        Ok(Self::from_board(Board::new(size, grid.to_vec())))
    }

    /// Creates a puzzle with a uniformly random grid drawn from `rng`.
    ///
    /// Every permutation is equally likely; parity normalization makes any
    /// of them solvable on even-width boards.
    pub fn random_with_rng<R: Rng + ?Sized>(size: Size, rng: &mut R) -> Self {
        let mut grid: Vec<usize> = (0..size.area()).collect();
        grid.shuffle(rng);
        Self::from_board(Board::new(size, grid))
    }

    /// Equivalent to [`Puzzle::random_with_rng`] using [`rand::rng`].
    #[cfg(feature = "thread_rng")]
    pub fn random(size: Size) -> Self {
        Self::random_with_rng(size, &mut rand::rng())
    }

    fn from_board(board: Board) -> Self {
        Self {
            inner: RwLock::new(Inner {
                board,
                pdb: None,
                cycles: None,
                stream: None,
                handler: None,
                status: SolveStatus::Unsolved,
                solution: Vec::new(),
            }),
            cancel: CancelToken::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("puzzle lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("puzzle lock poisoned")
    }

    /// The board shape.
    #[must_use]
    pub fn size(&self) -> Size {
        self.read().board.size()
    }

    /// The parity class computed at construction.
    #[must_use]
    pub fn parity(&self) -> Parity {
        self.read().board.parity()
    }

    /// The solve flag.
    #[must_use]
    pub fn status(&self) -> SolveStatus {
        self.read().status
    }

    /// The current grid, in the original (non-normalized) frame.
    #[must_use]
    pub fn grid(&self) -> Vec<usize> {
        self.read().board.original_grid()
    }

    /// The last solution found, in the original frame. Empty before the
    /// first successful solve and for an already-solved configuration.
    #[must_use]
    pub fn solution(&self) -> Vec<Move> {
        self.read().solution.clone()
    }

    /// A handle that cancels this puzzle's long-running operations.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether a pattern database is attached.
    #[must_use]
    pub fn has_pdb(&self) -> bool {
        self.read().pdb.is_some()
    }

    /// Whether a cycle bank is attached.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        self.read().cycles.is_some()
    }

    /// Attaches a diagnostic stream, returning the previous one.
    pub fn set_stream(&self, stream: Option<DiagStream>) -> Option<DiagStream> {
        mem::replace(&mut self.write().stream, stream)
    }

    /// Attaches a per-move callback, returning the previous one.
    pub fn set_move_handler(&self, handler: Option<MoveHandler>) -> Option<MoveHandler> {
        mem::replace(&mut self.write().handler, handler)
    }

    /// Mines cycles of length at most `max_length` and attaches the bank,
    /// replacing any previous one. A zero length is a no-op.
    pub fn attach_cycles(&self, max_length: usize) -> Result<(), SolveError> {
        if max_length == 0 {
            return Ok(());
        }
        if self.cancel.take() {
            return Err(SolveError::Canceled);
        }

        let mut guard = self.write();
        let inner = &mut *guard;
        let mut diag = Diag(inner.stream.as_deref_mut().map(|w| w as &mut dyn Write));
        diag.say(format_args!(
            "Search for cycles and record cycles in bank using IDA* (up to {max_length} moves)..."
        ));

        match CycleBank::build(inner.board.size(), max_length, &self.cancel) {
            Ok(bank) => {
                diag.say(format_args!(
                    "{} forbidden sequences of moves have been found.",
                    bank.keyword_count()
                ));
                inner.cycles = Some(Arc::new(bank));
                diag.say(format_args!("Cycle bank attached."));
                Ok(())
            }
            Err(Canceled) => {
                diag.say(format_args!("Processing canceled."));
                Err(SolveError::Canceled)
            }
        }
    }

    /// Builds the additive pattern database for this puzzle's goal, with
    /// patterns of at most `max_pattern_size` tiles, and attaches it. A zero
    /// size is a no-op.
    pub fn attach_pdb(&self, max_pattern_size: usize) -> Result<(), SolveError> {
        if max_pattern_size == 0 {
            return Ok(());
        }
        if self.cancel.take() {
            return Err(SolveError::Canceled);
        }

        let mut guard = self.write();
        let inner = &mut *guard;
        let mut diag = Diag(inner.stream.as_deref_mut().map(|w| w as &mut dyn Write));

        match PatternDb::build(&inner.board, max_pattern_size, &self.cancel, &mut diag) {
            Ok(db) => {
                inner.pdb = Some(Arc::new(db));
                diag.say(format_args!("Heuristic database attached."));
                Ok(())
            }
            Err(Canceled) => {
                diag.say(format_args!("Processing canceled."));
                Err(SolveError::Canceled)
            }
        }
    }

    /// Shares this puzzle's cycle bank with `dest`. Requires equal shapes.
    /// Returns whether `dest` ends up holding a bank it did not already
    /// hold; sharing from a puzzle without a bank clears the destination.
    pub fn share_cycles(&self, dest: &Self) -> bool {
        if std::ptr::eq(self, dest) {
            return true;
        }

        let src = self.read();
        let mut dst = dest.write();
        if src.board.size() != dst.board.size() {
            return false;
        }

        let already_shared = match (&src.cycles, &dst.cycles) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if already_shared {
            return false;
        }

        dst.cycles = src.cycles.clone();
        dst.cycles.is_some()
    }

    /// Shares this puzzle's pattern database with `dest`. Requires equal
    /// shapes and equal goal grids. Returns whether `dest` ends up holding
    /// a database it did not already hold; sharing from a puzzle without one
    /// clears the destination.
    pub fn share_pdb(&self, dest: &Self) -> bool {
        if std::ptr::eq(self, dest) {
            return true;
        }

        let src = self.read();
        let mut dst = dest.write();
        if src.board.size() != dst.board.size() || src.board.goal_grid() != dst.board.goal_grid() {
            return false;
        }

        let already_shared = match (&src.pdb, &dst.pdb) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if already_shared {
            return false;
        }

        dst.pdb = src.pdb.clone();
        dst.pdb.is_some()
    }

    /// Solves the puzzle with IDA*, returning the optimal move count. The
    /// solution becomes available through [`Puzzle::solution`]. A puzzle may
    /// be re-solved any number of times.
    pub fn solve_ida(&self) -> Result<usize, SolveError> {
        self.solve(Engine::Ida)
    }

    /// Solves the puzzle with RBFS, returning the optimal move count.
    pub fn solve_rbfs(&self) -> Result<usize, SolveError> {
        self.solve(Engine::Rbfs)
    }

    fn solve(&self, engine: Engine) -> Result<usize, SolveError> {
        if self.cancel.take() {
            let mut inner = self.write();
            inner.status = SolveStatus::Aborted;
            inner.solution.clear();
            return Err(SolveError::Canceled);
        }

        let mut guard = self.write();
        let inner = &mut *guard;
        inner.status = SolveStatus::Unsolved;
        inner.solution.clear();

        let Inner {
            board,
            pdb,
            cycles,
            stream,
            handler,
            status,
            solution,
        } = inner;

        let mut diag = Diag(stream.as_deref_mut().map(|w| w as &mut dyn Write));
        diag.say(format_args!("Solve puzzle..."));
        match engine {
            Engine::Ida => diag.say(format_args!("  Using IDA*...")),
            Engine::Rbfs => diag.say(format_args!("  Using RBFS...")),
        }
        if pdb.is_some() {
            diag.say(format_args!("  Using heuristic database."));
        }
        if cycles.is_some() {
            diag.say(format_args!("  Using cycle detection."));
        }

        let ctx = SearchContext {
            board,
            pdb: pdb.as_deref(),
            cycles: cycles.as_deref().map(CycleBank::automaton),
            skip_up_at_root: false,
        };
        let d2sol = ctx.root_heuristic();
        diag.say(format_args!("Distance to target: {d2sol}"));

        let area = board.size().area();
        let outcome = match engine {
            Engine::Ida => IdaEngine::new(area).run(&ctx, d2sol, &self.cancel, &mut diag),
            Engine::Rbfs => RbfsEngine::new(area).run(&ctx, d2sol, &self.cancel, &mut diag),
        };

        match outcome {
            Outcome::Solved {
                length,
                moves,
                generated,
            } => {
                *status = SolveStatus::Solved;
                if length > 0 {
                    diag.say(format_args!("Solved:\n Depth: {length}\n Path:"));

                    let width = board.size().width();
                    let mut grid = board.grid().to_vec();
                    let mut blank = board.pos()[0];
                    for (i, &dir) in moves.iter().enumerate() {
                        let from = match dir {
                            Direction::Up => blank + width,
                            Direction::Down => blank - width,
                            Direction::Left => blank + 1,
                            Direction::Right => blank - 1,
                        };
                        let tile = grid[from];
                        let step = Move::new(board.report_tile(tile), board.report_direction(dir));

                        if let Some(h) = handler.as_mut() {
                            h(i + 1, step.tile, step.direction);
                        } else {
                            diag.fragment(format_args!(" {step}"));
                        }

                        grid[blank] = tile;
                        grid[from] = 0;
                        blank = from;
                        solution.push(step);
                    }

                    diag.fragment(format_args!("\n Generated nodes:"));
                    let total: u64 = generated.iter().sum();
                    for (depth, count) in generated.iter().enumerate() {
                        diag.fragment(format_args!(" {}:{count}", depth + 1));
                    }
                    diag.say(format_args!(" TOTAL:{total}"));
                }
                Ok(length)
            }
            Outcome::Canceled => {
                *status = SolveStatus::Aborted;
                Err(SolveError::Canceled)
            }
            Outcome::Exhausted => {
                *status = SolveStatus::Aborted;
                Err(SolveError::Exhausted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rand::{Rng, SeedableRng as _};
    use rand_xoshiro::Xoroshiro128StarStar;

    use super::*;

    const SEED: [u8; 16] = [
        160, 108, 126, 255, 147, 210, 122, 252, 71, 77, 144, 13, 167, 11, 225, 93,
    ];

    const KORF_1: [usize; 16] = [14, 13, 15, 7, 11, 12, 9, 5, 6, 0, 2, 1, 4, 8, 10, 3];
    const KORF_17: [usize; 16] = [15, 14, 0, 4, 11, 1, 6, 13, 7, 5, 8, 9, 3, 2, 10, 12];
    const KORF_88: [usize; 16] = [15, 2, 12, 11, 14, 13, 9, 5, 1, 3, 8, 7, 0, 10, 6, 4];
    const EIGHT_WORST: [usize; 9] = [8, 6, 7, 2, 5, 4, 3, 0, 1];

    fn puzzle(w: usize, h: usize, grid: &[usize]) -> Puzzle {
        Puzzle::with_grid(Size::new(w, h).unwrap(), grid).unwrap()
    }

    /// Applies the reported solution to the original grid, checking that
    /// every step slides a neighbor of the blank, and returns the end grid.
    fn replay(puzzle: &Puzzle) -> Vec<usize> {
        let w = puzzle.size().width();
        let mut grid = puzzle.grid();
        for step in puzzle.solution() {
            let blank = grid.iter().position(|&t| t == 0).unwrap();
            let from = match step.direction {
                Direction::Up => blank + w,
                Direction::Down => blank - w,
                Direction::Left => blank + 1,
                Direction::Right => blank - 1,
            };
            assert_eq!(grid[from], step.tile, "step {step} does not match the board");
            grid.swap(blank, from);
        }
        grid
    }

    /// The goal the solution must reach in the original frame: blank first
    /// for even parity, blank last for normalized instances.
    fn expected_goal(puzzle: &Puzzle) -> Vec<usize> {
        let n = puzzle.size().area();
        match puzzle.parity() {
            Parity::Even => (0..n).collect(),
            Parity::Odd => (1..n).chain([0]).collect(),
        }
    }

    /// A grid reached from the goal by a random walk of legal blank moves,
    /// so its optimum is at most `steps`.
    fn scrambled<R: Rng>(size: Size, steps: usize, rng: &mut R) -> Vec<usize> {
        let w = size.width();
        let n = size.area();
        let mut grid: Vec<usize> = (0..n).collect();
        let mut blank = 0;
        for _ in 0..steps {
            let mut neighbors = Vec::with_capacity(4);
            if blank >= w {
                neighbors.push(blank - w);
            }
            if blank + w < n {
                neighbors.push(blank + w);
            }
            if blank % w > 0 {
                neighbors.push(blank - 1);
            }
            if blank % w < w - 1 {
                neighbors.push(blank + 1);
            }
            let dest = neighbors[rng.random_range(0..neighbors.len())];
            grid.swap(blank, dest);
            blank = dest;
        }
        grid
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_grids() {
        let size = Size::new(3, 3).unwrap();
        assert_eq!(
            Puzzle::with_grid(size, &[0, 1, 2]).unwrap_err(),
            PuzzleError::WrongLength {
                expected: 9,
                actual: 3
            }
        );
        assert_eq!(
            Puzzle::with_grid(size, &[0, 1, 2, 3, 4, 5, 6, 7, 9]).unwrap_err(),
            PuzzleError::TileOutOfRange(9)
        );
        assert_eq!(
            Puzzle::with_grid(size, &[0, 1, 2, 3, 4, 5, 6, 7, 7]).unwrap_err(),
            PuzzleError::DuplicateTile(7)
        );
    }

    #[test]
    fn test_identity_blank_first() {
        let p = puzzle(4, 4, &(0..16).collect::<Vec<_>>());
        assert_eq!(p.parity(), Parity::Even);
        assert_eq!(p.status(), SolveStatus::Unsolved);
        assert_eq!(p.solve_ida().unwrap(), 0);
        assert!(p.solution().is_empty());
        assert_eq!(p.status(), SolveStatus::Solved);
        assert_eq!(p.solve_rbfs().unwrap(), 0);
    }

    #[test]
    fn test_identity_blank_last() {
        let grid: Vec<usize> = (1..16).chain([0]).collect();
        let p = puzzle(4, 4, &grid);
        assert_eq!(p.parity(), Parity::Odd);
        assert_eq!(p.solve_ida().unwrap(), 0);
        assert_eq!(p.solve_rbfs().unwrap(), 0);
        assert_eq!(p.grid(), grid);
    }

    #[test]
    fn test_three_by_three_scenario() {
        let p = puzzle(3, 3, &EIGHT_WORST);
        p.attach_pdb(4).unwrap();
        p.attach_cycles(8).unwrap();
        assert!(p.has_pdb() && p.has_cycles());
        assert_eq!(p.solve_ida().unwrap(), 31);
        assert_eq!(p.solution().len(), 31);
        assert_eq!(replay(&p), expected_goal(&p));
        assert_eq!(p.solve_rbfs().unwrap(), 31);
        assert_eq!(replay(&p), expected_goal(&p));
    }

    macro_rules! korf_scenario {
        ($($name:ident: $grid:expr => $optimal:expr;)*) => {
            $(::paste::paste! {
                #[test]
                #[ignore = "several minutes of search; run with --ignored"]
                fn [<test_ $name>]() {
                    let p = puzzle(4, 4, &$grid);
                    p.attach_pdb(5).unwrap();
                    p.attach_cycles(12).unwrap();
                    assert_eq!(p.solve_ida().unwrap(), $optimal);
                    assert_eq!(replay(&p), expected_goal(&p));
                    assert_eq!(p.solve_rbfs().unwrap(), $optimal);
                    assert_eq!(replay(&p), expected_goal(&p));
                }
            })*
        };
    }

    korf_scenario! {
        korf_1: KORF_1 => 57;
        korf_17: KORF_17 => 66;
        korf_88: KORF_88 => 65;
    }

    #[test]
    fn test_walk_instances_engines_agree() {
        let mut rng = Xoroshiro128StarStar::from_seed(SEED);
        let size = Size::new(4, 4).unwrap();
        let source = puzzle(4, 4, &(0..16).collect::<Vec<_>>());
        source.attach_pdb(4).unwrap();
        source.attach_cycles(8).unwrap();

        for _ in 0..5 {
            let p = Puzzle::with_grid(size, &scrambled(size, 16, &mut rng)).unwrap();
            assert!(source.share_pdb(&p));
            assert!(source.share_cycles(&p));
            let length = p.solve_ida().unwrap();
            assert!(length <= 16);
            assert_eq!(replay(&p), expected_goal(&p));
            assert_eq!(p.solve_rbfs().unwrap(), length);
            assert_eq!(replay(&p), expected_goal(&p));
        }
    }

    #[test]
    fn test_oblong_board() {
        let mut rng = Xoroshiro128StarStar::from_seed(SEED);
        let size = Size::new(4, 3).unwrap();
        let p = Puzzle::with_grid(size, &scrambled(size, 14, &mut rng)).unwrap();
        p.attach_pdb(3).unwrap();
        let length = p.solve_ida().unwrap();
        assert!(length <= 14);
        assert_eq!(replay(&p), expected_goal(&p));
        assert_eq!(p.solve_rbfs().unwrap(), length);
    }

    #[test]
    fn test_line_boards() {
        // 1xN: this instance is odd, so it solves toward the blank-last goal.
        let p = puzzle(1, 4, &[1, 0, 2, 3]);
        assert_eq!(p.parity(), Parity::Odd);
        assert_eq!(p.solve_ida().unwrap(), 2);
        assert_eq!(replay(&p), vec![1, 2, 3, 0]);
        assert_eq!(p.solve_rbfs().unwrap(), 2);

        // Nx1, even parity.
        let p = puzzle(4, 1, &[1, 0, 2, 3]);
        assert_eq!(p.parity(), Parity::Even);
        assert_eq!(p.solve_ida().unwrap(), 1);
        assert_eq!(replay(&p), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_share_requires_equal_shape() {
        let a = puzzle(3, 3, &(0..9).collect::<Vec<_>>());
        a.attach_pdb(3).unwrap();
        a.attach_cycles(4).unwrap();

        let other_shape = puzzle(4, 4, &(0..16).collect::<Vec<_>>());
        assert!(!a.share_pdb(&other_shape));
        assert!(!a.share_cycles(&other_shape));
        assert!(!other_shape.has_pdb() && !other_shape.has_cycles());

        let same_shape = puzzle(3, 3, &EIGHT_WORST);
        assert!(a.share_pdb(&same_shape));
        assert!(a.share_cycles(&same_shape));
        assert!(same_shape.has_pdb() && same_shape.has_cycles());

        // Sharing what is already shared changes nothing.
        assert!(!a.share_pdb(&same_shape));
        // Self-share is a success without effect.
        assert!(a.share_pdb(&a));
    }

    #[test]
    fn test_share_from_empty_clears_destination() {
        let a = puzzle(3, 3, &(0..9).collect::<Vec<_>>());
        let b = puzzle(3, 3, &EIGHT_WORST);
        b.attach_pdb(3).unwrap();
        assert!(!a.share_pdb(&b));
        assert!(!b.has_pdb());
    }

    #[test]
    fn test_shared_pdb_outlives_source() {
        let a = puzzle(3, 3, &(0..9).collect::<Vec<_>>());
        a.attach_pdb(3).unwrap();
        let b = puzzle(3, 3, &EIGHT_WORST);
        assert!(a.share_pdb(&b));
        drop(a);
        assert_eq!(b.solve_ida().unwrap(), 31);
    }

    #[test]
    fn test_resolve_same_instance() {
        let p = puzzle(3, 3, &[1, 4, 2, 3, 5, 0, 6, 7, 8]);
        let first = p.solve_ida().unwrap();
        let second = p.solve_ida().unwrap();
        assert_eq!(first, second);
        p.attach_pdb(3).unwrap();
        assert_eq!(p.solve_ida().unwrap(), first);
        assert_eq!(p.solve_rbfs().unwrap(), first);
    }

    #[test]
    fn test_move_handler_reports_each_step() {
        let p = puzzle(3, 3, &[1, 2, 0, 3, 4, 5, 6, 7, 8]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let previous = p.set_move_handler(Some(Box::new(move |step, tile, direction| {
            sink.lock().unwrap().push((step, tile, direction));
        })));
        assert!(previous.is_none());

        let length = p.solve_ida().unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), length);
        assert!(seen.iter().enumerate().all(|(i, &(step, ..))| step == i + 1));
        let reported: Vec<_> = seen.iter().map(|&(_, tile, dir)| (tile, dir)).collect();
        let solution: Vec<_> = p.solution().iter().map(|m| (m.tile, m.direction)).collect();
        assert_eq!(reported, solution);

        assert!(p.set_move_handler(None).is_some());
    }

    #[test]
    fn test_stream_diagnostics() {
        let p = puzzle(3, 3, &[1, 0, 2, 3, 4, 5, 6, 7, 8]);
        let buf = SharedBuf::default();
        assert!(p.set_stream(Some(Box::new(buf.clone()))).is_none());

        p.solve_ida().unwrap();
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("Using IDA*"));
        assert!(text.contains("Distance to target: 1"));
        assert!(text.contains("Depth: 1."));
        assert!(text.contains("Solved:"));
        assert!(text.contains("TOTAL:"));

        assert!(p.set_stream(None).is_some());
    }

    #[test]
    fn test_cancel_then_resolve() {
        let p = puzzle(3, 3, &[1, 0, 2, 3, 4, 5, 6, 7, 8]);
        p.cancel_token().cancel();
        assert_eq!(p.solve_ida(), Err(SolveError::Canceled));
        assert_eq!(p.status(), SolveStatus::Aborted);
        assert!(p.solution().is_empty());

        // The cancellation was consumed; the puzzle works again.
        assert_eq!(p.solve_ida(), Ok(1));
        assert_eq!(p.status(), SolveStatus::Solved);
    }

    #[test]
    fn test_cancel_blocks_attach() {
        let p = puzzle(3, 3, &(0..9).collect::<Vec<_>>());
        p.cancel_token().cancel();
        assert_eq!(p.attach_pdb(3), Err(SolveError::Canceled));
        assert!(!p.has_pdb());
        assert_eq!(p.attach_pdb(3), Ok(()));
        assert!(p.has_pdb());
    }

    #[test]
    fn test_concurrent_instances_share_databases() {
        let mut rng = Xoroshiro128StarStar::from_seed(SEED);
        let size = Size::new(4, 4).unwrap();
        let source = puzzle(4, 4, &(0..16).collect::<Vec<_>>());
        source.attach_pdb(3).unwrap();
        source.attach_cycles(6).unwrap();

        let puzzles: Vec<Puzzle> = (0..4)
            .map(|_| {
                let p = Puzzle::with_grid(size, &scrambled(size, 12, &mut rng)).unwrap();
                assert!(source.share_pdb(&p));
                assert!(source.share_cycles(&p));
                p
            })
            .collect();
        drop(source);

        std::thread::scope(|scope| {
            for p in &puzzles {
                scope.spawn(move || {
                    let length = p.solve_ida().unwrap();
                    assert!(length <= 12);
                    assert_eq!(p.solve_rbfs().unwrap(), length);
                });
            }
        });

        for p in &puzzles {
            assert_eq!(p.status(), SolveStatus::Solved);
            assert_eq!(replay(p), expected_goal(p));
        }
    }

    #[test]
    fn test_random_is_seed_deterministic() {
        let size = Size::new(4, 4).unwrap();
        let mut a = Xoroshiro128StarStar::seed_from_u64(7);
        let mut b = Xoroshiro128StarStar::seed_from_u64(7);
        assert_eq!(
            Puzzle::random_with_rng(size, &mut a).grid(),
            Puzzle::random_with_rng(size, &mut b).grid()
        );
    }

    #[test]
    #[ignore = "a full random 4x4 can take minutes; run with --ignored"]
    fn test_random_4x4_solves_after_normalization() {
        let mut rng = Xoroshiro128StarStar::from_seed(SEED);
        let p = Puzzle::random_with_rng(Size::new(4, 4).unwrap(), &mut rng);
        p.attach_pdb(5).unwrap();
        p.attach_cycles(12).unwrap();
        let length = p.solve_ida().unwrap();
        assert_eq!(replay(&p), expected_goal(&p));
        assert_eq!(p.solve_rbfs().unwrap(), length);
    }
}
