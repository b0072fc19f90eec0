//! A small Aho-Corasick machine over the four-direction move alphabet.
//!
//! Keywords are half-cycles; each carries a [`Zone`] payload predicting the
//! bounding box the blank would traverse to close the cycle. States are
//! dense `u32` indices so a search frame can hold its automaton state by
//! value. Registration builds a plain trie; [`Automaton::compile`] resolves
//! failure links breadth-first, merges the match lists through the failure
//! chain, and flattens everything into a per-state `[u32; 4]` transition
//! table.

use crate::{algorithm::direction::Direction, puzzle::size::Size};

/// Identifier of an automaton state.
pub(crate) type StateId = u32;

const NONE: u32 = u32::MAX;

/// The bounding box, relative to the blank's current cell, of the blank's
/// cumulative displacement over the closing half of a recognized cycle. The
/// origin is always inside the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Zone {
    pub row_min: i32,
    pub row_max: i32,
    pub col_min: i32,
    pub col_max: i32,
}

impl Zone {
    /// Grows the box to contain the displacement `(row, col)`.
    pub(crate) fn extend(&mut self, row: i32, col: i32) {
        if row < self.row_min {
            self.row_min = row;
        }
        if row > self.row_max {
            self.row_max = row;
        }
        if col < self.col_min {
            self.col_min = col;
        }
        if col > self.col_max {
            self.col_max = col;
        }
    }

    /// Whether the box, shifted to the blank's cell `(row, col)`, lies
    /// strictly inside the board. Upper bounds are strict: a cycle touching
    /// the last row or column is not considered contained.
    pub(crate) fn fits(&self, row: i32, col: i32, size: Size) -> bool {
        self.row_min + row >= 0
            && self.row_max + row < size.height() as i32
            && self.col_min + col >= 0
            && self.col_max + col < size.width() as i32
    }
}

#[derive(Clone, Debug)]
struct State {
    /// Trie edges; `NONE` where no keyword continues.
    children: [u32; 4],
    /// Failure-resolved transitions, valid after `compile`.
    next: [u32; 4],
    fail: u32,
    /// The keyword ending exactly at this state, if any.
    keyword: Option<u32>,
    /// Keywords matched when the machine is in this state (own keyword plus
    /// everything reachable through failure links), valid after `compile`.
    matches: Vec<u32>,
}

impl State {
    fn new() -> Self {
        Self {
            children: [NONE; 4],
            next: [NONE; 4],
            fail: Automaton::START,
            keyword: None,
            matches: Vec::new(),
        }
    }
}

/// The machine: a trie of registered keywords plus the compiled transition
/// and match tables.
#[derive(Clone, Debug)]
pub(crate) struct Automaton {
    states: Vec<State>,
    zones: Vec<Zone>,
}

impl Automaton {
    /// The state every search starts in.
    pub(crate) const START: StateId = 0;

    pub(crate) fn new() -> Self {
        Self {
            states: vec![State::new()],
            zones: Vec::new(),
        }
    }

    /// The number of registered keywords.
    pub(crate) fn keyword_count(&self) -> usize {
        self.zones.len()
    }

    /// Registers a keyword with its zone payload. Returns false, keeping the
    /// existing payload, when the keyword is already present. [`compile`]
    /// must run before the machine is stepped again.
    ///
    /// [`compile`]: Automaton::compile
    pub(crate) fn register(&mut self, word: &[Direction], zone: Zone) -> bool {
        let mut state = Self::START as usize;
        for &dir in word {
            let symbol = dir as usize;
            let child = self.states[state].children[symbol];
            state = if child == NONE {
                let id = self.states.len() as u32;
                self.states[state].children[symbol] = id;
                self.states.push(State::new());
                id as usize
            } else {
                child as usize
            };
        }

        if self.states[state].keyword.is_some() {
            return false;
        }
        let id = self.zones.len() as u32;
        self.zones.push(zone);
        self.states[state].keyword = Some(id);
        true
    }

    /// Resolves failure links breadth-first from the root, merges match
    /// lists down the failure chains, and flattens the goto function into
    /// the per-state transition tables. Idempotent; cheap relative to any
    /// search that uses the machine.
    pub(crate) fn compile(&mut self) {
        let mut queue = Vec::with_capacity(self.states.len());

        for symbol in 0..4 {
            let child = self.states[0].children[symbol];
            if child == NONE {
                self.states[0].next[symbol] = Self::START;
            } else {
                self.states[child as usize].fail = Self::START;
                self.states[0].next[symbol] = child;
                queue.push(child);
            }
        }

        let mut head = 0;
        while head < queue.len() {
            let state = queue[head] as usize;
            head += 1;

            let fail = self.states[state].fail as usize;
            let mut matches = Vec::new();
            if let Some(keyword) = self.states[state].keyword {
                matches.push(keyword);
            }
            matches.extend_from_slice(&self.states[fail].matches);
            self.states[state].matches = matches;

            for symbol in 0..4 {
                let child = self.states[state].children[symbol];
                let fail_next = self.states[fail].next[symbol];
                if child == NONE {
                    self.states[state].next[symbol] = fail_next;
                } else {
                    self.states[child as usize].fail = fail_next;
                    self.states[state].next[symbol] = child;
                    queue.push(child);
                }
            }
        }
    }

    /// Advances the machine by one symbol.
    pub(crate) fn step(&self, state: StateId, dir: Direction) -> StateId {
        self.states[state as usize].next[dir as usize]
    }

    /// The keywords matched in `state`.
    pub(crate) fn matches(&self, state: StateId) -> &[u32] {
        &self.states[state as usize].matches
    }

    /// Whether any keyword matched in `state` closes strictly inside the
    /// board when the blank stands on `cell`. A true result proves the move
    /// that produced `state` futile.
    pub(crate) fn zone_fits(&self, state: StateId, cell: usize, size: Size) -> bool {
        let matches = self.matches(state);
        if matches.is_empty() {
            return false;
        }
        let w = size.width();
        let row = (cell / w) as i32;
        let col = (cell % w) as i32;
        matches
            .iter()
            .any(|&keyword| self.zones[keyword as usize].fits(row, col, size))
    }

    /// Walks the machine over a word from the start state.
    #[cfg(test)]
    fn walk(&self, word: &[Direction]) -> StateId {
        word.iter()
            .fold(Self::START, |state, &dir| self.step(state, dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::direction::Direction::{Down, Left, Right, Up};

    fn compiled(words: &[&[Direction]]) -> Automaton {
        let mut automaton = Automaton::new();
        for word in words {
            assert!(automaton.register(word, Zone::default()));
        }
        automaton.compile();
        automaton
    }

    #[test]
    fn test_register_dedup() {
        let mut automaton = Automaton::new();
        assert!(automaton.register(&[Left, Right], Zone::default()));
        assert!(!automaton.register(&[Left, Right], Zone::default()));
        assert!(automaton.register(&[Left, Right, Up], Zone::default()));
        assert_eq!(automaton.keyword_count(), 2);
    }

    #[test]
    fn test_match_at_end_of_keyword() {
        let automaton = compiled(&[&[Left, Right]]);
        let state = automaton.walk(&[Left, Right]);
        assert_eq!(automaton.matches(state), &[0]);
        assert!(automaton.matches(automaton.walk(&[Left])).is_empty());
    }

    #[test]
    fn test_suffix_match_through_fail_links() {
        // "dlr" ends with the keyword "lr".
        let automaton = compiled(&[&[Left, Right], &[Down, Left, Right]]);
        let state = automaton.walk(&[Down, Left, Right]);
        let mut matched = automaton.matches(state).to_vec();
        matched.sort_unstable();
        assert_eq!(matched, vec![0, 1]);
    }

    #[test]
    fn test_mismatch_restarts_via_fail() {
        let automaton = compiled(&[&[Left, Left, Right]]);
        // "lllr" still matches: the failure link keeps the "ll" prefix.
        let state = automaton.walk(&[Left, Left, Left, Right]);
        assert_eq!(automaton.matches(state), &[0]);
    }

    #[test]
    fn test_empty_machine_steps_in_place() {
        let mut automaton = Automaton::new();
        automaton.compile();
        for dir in Direction::ALL {
            assert_eq!(automaton.step(Automaton::START, dir), Automaton::START);
        }
    }

    #[test]
    fn test_zone_fits_strict_bounds() {
        let size = Size::new(4, 4).unwrap();
        let zone = Zone {
            row_min: -1,
            row_max: 1,
            col_min: 0,
            col_max: 2,
        };
        assert!(zone.fits(1, 1, size));
        assert!(zone.fits(2, 0, size));
        assert!(!zone.fits(0, 1, size)); // row -1 leaves the board
        assert!(!zone.fits(3, 1, size)); // row 4 is out (strict upper bound)
        assert!(!zone.fits(1, 2, size)); // col 4 is out
    }

    #[test]
    fn test_zone_fits_consults_all_matches() {
        let mut automaton = Automaton::new();
        // A keyword whose zone never fits a 2-high board, and a suffix
        // keyword whose zone always does.
        automaton.register(
            &[Up, Left, Right],
            Zone {
                row_min: -5,
                row_max: 5,
                col_min: 0,
                col_max: 0,
            },
        );
        automaton.register(&[Left, Right], Zone::default());
        automaton.compile();

        let size = Size::new(4, 2).unwrap();
        let state = automaton.walk(&[Up, Left, Right]);
        assert_eq!(automaton.matches(state).len(), 2);
        assert!(automaton.zone_fits(state, 5, size));
    }
}
