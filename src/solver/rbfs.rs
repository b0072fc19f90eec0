//! The RBFS engine: recursive best-first search with F-value backup.
//!
//! Each recursion level expands at most four children into its depth's
//! preallocated frame, then repeatedly recurses on the child with the
//! smallest F, bounded by the second-smallest (or the inherited bound),
//! writing the recursion's return value back into the child's F. Frames are
//! addressed by depth index rather than borrowed across calls so the pool
//! can grow inside the recursion, as the original did.

use crate::{
    algorithm::direction::Direction,
    puzzle::cancel::CancelToken,
    solver::{
        cycles::automaton::{Automaton, StateId},
        search::{Diag, Outcome, SearchContext, Status},
    },
};

/// Per-depth scratch: one `grid`/`pos` buffer per candidate child, the
/// direction finally chosen at this depth, and a generated-node counter.
struct Frame {
    dir: Direction,
    grids: [Vec<usize>; 4],
    poss: [Vec<usize>; 4],
    generated: u64,
}

impl Frame {
    fn new(area: usize) -> Self {
        Self {
            dir: Direction::Up,
            grids: std::array::from_fn(|_| vec![0; area]),
            poss: std::array::from_fn(|_| vec![0; area]),
            generated: 0,
        }
    }
}

/// Copyable child metadata; the child's configuration lives in its depth's
/// frame under `slot`.
#[derive(Clone, Copy)]
struct Child {
    slot: usize,
    dir: Direction,
    delta: isize,
    d2sol: i32,
    f: i32,
    state: StateId,
}

pub(crate) struct RbfsEngine {
    area: usize,
    frames: Vec<Frame>,
}

impl RbfsEngine {
    pub(crate) fn new(area: usize) -> Self {
        Self {
            area,
            frames: Vec::new(),
        }
    }

    /// Runs the search to completion. The cancel token is polled whenever
    /// the recursion reaches a new maximum depth.
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
        diag.fragment(format_args!("Depth: "));
        let length = self.rbfs(
            ctx,
            0,
            None,
            root_d2sol,
            ctx.start_state(),
            0,
            root_d2sol,
            i32::MAX,
            &mut status,
            cancel,
            diag,
        );
        diag.fragment(format_args!("\n"));

        match status {
            Status::Solved => Outcome::Solved {
                length: length as usize,
                moves: self.frames[..length as usize].iter().map(|f| f.dir).collect(),
                generated: self.frames.iter().map(|f| f.generated).collect(),
            },
            Status::Aborted if cancel.take() => {
                diag.say(format_args!("Processing canceled."));
                Outcome::Canceled
            }
            _ => Outcome::Exhausted,
        }
    }

    /// One node expansion. The node's configuration is `frames[depth-1]`
    /// slot `slot`, or the board itself at the root. `v` is the inherited
    /// F-value, `max_f` the bound above which control backtracks. Returns
    /// the node's backed-up F, or the solution length once solved.
    #[allow(clippy::too_many_arguments)]
    fn rbfs(
        &mut self,
        ctx: &SearchContext<'_>,
        depth: usize,
        slot: Option<usize>,
        d2sol: i32,
        state: StateId,
        last: isize,
        v: i32,
        max_f: i32,
        status: &mut Status,
        cancel: &CancelToken,
        diag: &mut Diag<'_>,
    ) -> i32 {
        if d2sol == 0 {
            *status = Status::Solved;
            return depth as i32;
        }
        // f would no longer be representable.
        if d2sol > i32::MAX - depth as i32 {
            *status = Status::Aborted;
            return i32::MAX;
        }
        if d2sol > max_f - depth as i32 {
            return depth as i32 + d2sol;
        }

        if self.frames.len() <= depth {
            self.frames.push(Frame::new(self.area));
            diag.fragment(format_args!("{}.", depth + 1));
            if cancel.is_canceled() {
                *status = Status::Aborted;
                return i32::MAX;
            }
        }

        let mut children = [Child {
            slot: 0,
            dir: Direction::Up,
            delta: 0,
            d2sol: 0,
            f: 0,
            state: Automaton::START,
        }; 4];
        let mut count = 0;

        {
            let (head, tail) = self.frames.split_at_mut(depth);
            let frame = &mut tail[0];
            let (node_grid, node_pos): (&[usize], &[usize]) = match slot {
                None => (ctx.board.grid(), ctx.board.pos()),
                Some(s) => {
                    let parent = head.last().unwrap();
                    (&parent.grids[s], &parent.poss[s])
                }
            };

            let width = ctx.board.size().width();
            let blank = node_pos[0];

            for &dest in ctx.board.moves().from_cell(blank) {
                let delta = dest as isize - blank as isize;
                let dir = Direction::of_slide(dest, blank, width);

                let mut child_state = state;
                if ctx.cycles.is_some() {
                    if depth == 0 && ctx.skip_up_at_root && delta == width as isize {
                        continue;
                    }
                    let (advanced, futile) = ctx.advance_cycles(child_state, dir, dest);
                    if futile {
                        continue;
                    }
                    child_state = advanced;
                } else if delta == -last {
                    continue;
                }

                frame.generated += 1;
                let c = count;
                count += 1;

                frame.grids[c].copy_from_slice(node_grid);
                frame.poss[c].copy_from_slice(node_pos);
                let tile = frame.grids[c][dest];
                frame.grids[c][blank] = tile;
                frame.grids[c][dest] = 0;
                frame.poss[c][0] = dest;
                frame.poss[c][tile] = blank;

                let child_d2sol = ctx.child_heuristic(d2sol, tile, dest, blank, &frame.poss[c]);

                let mut f = depth as i32 + 1 + child_d2sol;
                let node_f = depth as i32 + d2sol;
                // A child whose f sits below the inherited value was already
                // explored to V in an earlier pass; resume from there.
                if f < v && node_f < v {
                    f = v;
                }

                children[c] = Child {
                    slot: c,
                    dir,
                    delta,
                    d2sol: child_d2sol,
                    f,
                    state: child_state,
                };
            }
        }

        if count == 0 {
            return i32::MAX;
        }

        let chosen = if count == 1 {
            let mut child = children[0];
            while *status == Status::Searching && child.f <= max_f {
                child.f = self.rbfs(
                    ctx,
                    depth + 1,
                    Some(child.slot),
                    child.d2sol,
                    child.state,
                    child.delta,
                    child.f,
                    max_f,
                    status,
                    cancel,
                    diag,
                );
            }
            child
        } else {
            loop {
                let (mut best, mut second) = if children[1].f < children[0].f {
                    (1, 0)
                } else {
                    (0, 1)
                };
                for i in 2..count {
                    if children[i].f < children[best].f {
                        second = best;
                        best = i;
                    } else if children[i].f < children[second].f {
                        second = i;
                    }
                }

                if children[best].f > max_f {
                    break children[best];
                }

                let bound = children[second].f.min(max_f);
                children[best].f = self.rbfs(
                    ctx,
                    depth + 1,
                    Some(children[best].slot),
                    children[best].d2sol,
                    children[best].state,
                    children[best].delta,
                    children[best].f,
                    bound,
                    status,
                    cancel,
                    diag,
                );

                if *status != Status::Searching {
                    break children[best];
                }
            }
        };

        self.frames[depth].dir = chosen.dir;
        chosen.f
    }
}
