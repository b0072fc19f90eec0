//! The successor model shared by the two search engines: the search context
//! bundling board, heuristic and pruning machinery, plus the diagnostic
//! sink.

use std::io::Write;

use crate::{
    algorithm::direction::Direction,
    puzzle::board::Board,
    solver::{
        cycles::automaton::{Automaton, StateId},
        heuristic::{manhattan_delta, Heuristic as _, ManhattanDistance},
        pdb::PatternDb,
    },
};

/// Diagnostic sink. Messages go to the puzzle's attached stream when one is
/// set and are dropped otherwise; write errors are ignored.
pub(crate) struct Diag<'a>(pub Option<&'a mut dyn Write>);

impl Diag<'_> {
    /// Writes a full line.
    pub(crate) fn say(&mut self, args: std::fmt::Arguments<'_>) {
        if let Some(w) = self.0.as_mut() {
            let _ = w.write_fmt(args);
            let _ = w.write_all(b"\n");
            let _ = w.flush();
        }
    }

    /// Writes a fragment without a newline, for progressive output such as
    /// the depth counter.
    pub(crate) fn fragment(&mut self, args: std::fmt::Arguments<'_>) {
        if let Some(w) = self.0.as_mut() {
            let _ = w.write_fmt(args);
            let _ = w.flush();
        }
    }
}

/// Search progress flag threaded through the recursions, the in-Rust form of
/// the original's −1/0/+1 `solved` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Status {
    Searching,
    Solved,
    Aborted,
}

/// What a full engine run produced.
pub(crate) enum Outcome {
    /// An optimal solution: its length, the per-depth chosen directions, and
    /// the per-depth generated-node counters for diagnostics.
    Solved {
        length: usize,
        moves: Vec<Direction>,
        generated: Vec<u64>,
    },
    /// The run observed its cancel token.
    Canceled,
    /// The search space was exhausted without a solution.
    Exhausted,
}

/// Everything a search needs to expand nodes: the board (move table, goal),
/// the heuristic source, and the optional cycle automaton.
pub(crate) struct SearchContext<'a> {
    pub board: &'a Board,
    pub pdb: Option<&'a PatternDb>,
    pub cycles: Option<&'a Automaton>,
    /// The miner's restriction: the first move of a pass never slides a tile
    /// upward.
    pub skip_up_at_root: bool,
}

impl SearchContext<'_> {
    /// The heuristic of the root configuration.
    pub(crate) fn root_heuristic(&self) -> i32 {
        match self.pdb {
            Some(db) => db.evaluate(self.board.pos()),
            None => {
                let bound: u32 = ManhattanDistance.bound(self.board);
                bound as i32
            }
        }
    }

    /// The heuristic of a successor in which `tile` slid from `from` into
    /// the blank at `to`. `child_pos` is the successor's tile-position
    /// array. Manhattan is maintained incrementally; a pattern database is
    /// re-evaluated in full.
    pub(crate) fn child_heuristic(
        &self,
        parent_d2sol: i32,
        tile: usize,
        from: usize,
        to: usize,
        child_pos: &[usize],
    ) -> i32 {
        match self.pdb {
            Some(db) => db.evaluate(child_pos),
            None => {
                parent_d2sol
                    + manhattan_delta(
                        self.board.size().width(),
                        self.board.goal_pos()[tile],
                        from,
                        to,
                    )
            }
        }
    }

    /// The automaton state a search starts from.
    pub(crate) fn start_state(&self) -> StateId {
        Automaton::START
    }

    /// Advances the automaton by a candidate move. Returns the successor
    /// state and whether the move is provably futile: some recognized cycle
    /// would close strictly inside the board from the blank's destination
    /// cell `dest`.
    pub(crate) fn advance_cycles(&self, state: StateId, dir: Direction, dest: usize) -> (StateId, bool) {
        match self.cycles {
            Some(automaton) => {
                let next = automaton.step(state, dir);
                (next, automaton.zone_fits(next, dest, self.board.size()))
            }
            None => (state, false),
        }
    }
}
