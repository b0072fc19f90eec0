//! The IDA* engine: iterative-deepening depth-first search with the
//! heuristic as f-bound.
//!
//! Each depth level owns a preallocated scratch frame holding the successor
//! `grid`/`pos` copies, the direction chosen at that level, and a
//! generated-node counter. Frames grow monotonically as the bound grows and
//! are reused across bound iterations, so no allocation happens inside the
//! recursion.

use crate::{
    algorithm::direction::Direction,
    puzzle::cancel::CancelToken,
    solver::{
        cycles::automaton::StateId,
        search::{Diag, Outcome, SearchContext, Status},
    },
};

/// Per-depth scratch state.
struct Frame {
    dir: Direction,
    grid: Vec<usize>,
    pos: Vec<usize>,
    generated: u64,
}

impl Frame {
    fn new(area: usize) -> Self {
        Self {
            dir: Direction::Up,
            grid: vec![0; area],
            pos: vec![0; area],
            generated: 0,
        }
    }
}

/// A view of the node a recursion level expands.
struct Node<'a> {
    grid: &'a [usize],
    pos: &'a [usize],
    d2sol: i32,
    state: StateId,
    at_root: bool,
}

/// The root configuration of a search pass.
pub(crate) struct Root<'a> {
    pub grid: &'a [usize],
    pub pos: &'a [usize],
    pub d2sol: i32,
    pub state: StateId,
}

/// The engine: the frame pool plus the recursion over it.
pub(crate) struct IdaEngine {
    area: usize,
    frames: Vec<Frame>,
}

impl IdaEngine {
    pub(crate) fn new(area: usize) -> Self {
        Self {
            area,
            frames: Vec::new(),
        }
    }

    /// One depth-first pass with the given bound. Returns the minimum
    /// over-bound f-value (the next bound) when the pass fails, or the
    /// solution length when `status` comes back [`Status::Solved`].
    pub(crate) fn search(
        &mut self,
        ctx: &SearchContext<'_>,
        root: Root<'_>,
        bound: i32,
        status: &mut Status,
    ) -> i32 {
        while self.frames.len() < bound as usize {
            self.frames.push(Frame::new(self.area));
        }
        *status = Status::Searching;
        let node = Node {
            grid: root.grid,
            pos: root.pos,
            d2sol: root.d2sol,
            state: root.state,
            at_root: true,
        };
        dfs(ctx, node, bound, 0, &mut self.frames[..bound as usize], status)
    }

    /// The directions chosen along the solution path, once solved.
    pub(crate) fn moves(&self, length: usize) -> Vec<Direction> {
        self.frames[..length].iter().map(|f| f.dir).collect()
    }

    /// Generated-node counters per depth.
    pub(crate) fn generated(&self) -> Vec<u64> {
        self.frames.iter().map(|f| f.generated).collect()
    }

    /// The full outer loop: grows the bound from the root heuristic until
    /// solved, exhausted, or canceled (polled once per bound increment).
    pub(crate) fn run(
        &mut self,
        ctx: &SearchContext<'_>,
        root_d2sol: i32,
        cancel: &CancelToken,
        diag: &mut Diag<'_>,
    ) -> Outcome {
        if root_d2sol == 0 {
            return Outcome::Solved {
                length: 0,
                moves: Vec::new(),
                generated: Vec::new(),
            };
        }

        let mut status = Status::Searching;
        let mut bound = root_d2sol;
        diag.fragment(format_args!("Depth: "));
        loop {
            diag.fragment(format_args!("{bound}."));
            if cancel.take() {
                diag.say(format_args!("\nProcessing canceled."));
                return Outcome::Canceled;
            }

            let root = Root {
                grid: ctx.board.grid(),
                pos: ctx.board.pos(),
                d2sol: root_d2sol,
                state: ctx.start_state(),
            };
            let next = self.search(ctx, root, bound, &mut status);

            match status {
                Status::Solved => {
                    diag.fragment(format_args!("\n"));
                    debug_assert_eq!(next, bound);
                    return Outcome::Solved {
                        length: bound as usize,
                        moves: self.moves(bound as usize),
                        generated: self.generated(),
                    };
                }
                Status::Aborted => return Outcome::Exhausted,
                Status::Searching => {
                    if next < 0 || next == i32::MAX {
                        return Outcome::Exhausted;
                    }
                    bound = next;
                }
            }
        }
    }
}

/// One recursion level. `depth` is the remaining move budget, `last` the
/// blank displacement that produced this node (0 at the root). Returns the
/// minimum f-value among children that exceeded the budget, −1 when every
/// branch overflowed, or the remaining solution length once solved.
fn dfs(
    ctx: &SearchContext<'_>,
    node: Node<'_>,
    depth: i32,
    last: isize,
    frames: &mut [Frame],
    status: &mut Status,
) -> i32 {
    if node.d2sol == 0 {
        *status = Status::Solved;
        return 0;
    }

    let (frame, rest) = frames.split_first_mut().unwrap();
    let width = ctx.board.size().width();
    let blank = node.pos[0];

    let mut next_bound = i32::MAX;
    for &dest in ctx.board.moves().from_cell(blank) {
        let delta = dest as isize - blank as isize;
        let dir = Direction::of_slide(dest, blank, width);

        let mut state = node.state;
        if ctx.cycles.is_some() {
            if node.at_root && ctx.skip_up_at_root && delta == width as isize {
                continue;
            }
            let (advanced, futile) = ctx.advance_cycles(state, dir, dest);
            if futile {
                continue;
            }
            state = advanced;
        } else if delta == -last {
            // Undoing the previous move never shortens a path.
            continue;
        }

        frame.generated += 1;
        frame.dir = dir;
        frame.grid.copy_from_slice(node.grid);
        frame.pos.copy_from_slice(node.pos);
        let tile = frame.grid[dest];
        frame.grid[blank] = tile;
        frame.grid[dest] = 0;
        frame.pos[0] = dest;
        frame.pos[tile] = blank;

        let child_d2sol = ctx.child_heuristic(node.d2sol, tile, dest, blank, &frame.pos);

        let mut value = child_d2sol;
        if value < depth {
            let child = Node {
                grid: &frame.grid,
                pos: &frame.pos,
                d2sol: child_d2sol,
                state,
                at_root: false,
            };
            value = dfs(ctx, child, depth - 1, delta, rest, status);
        }
        if value >= 0 && value < i32::MAX {
            value += 1;
        }

        match *status {
            Status::Aborted => return i32::MAX,
            Status::Solved => return value,
            Status::Searching => {}
        }

        if value < 0 {
            continue;
        }
        if value < next_bound {
            next_bound = value;
        }
    }

    if next_bound < i32::MAX {
        next_bound
    } else {
        -1
    }
}
