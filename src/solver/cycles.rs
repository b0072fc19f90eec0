//! Duplicate-path pruning: the cycle automaton and the miner that fills it.

pub(crate) mod automaton;
mod miner;

use crate::puzzle::{
    cancel::{CancelToken, Canceled},
    size::Size,
};

use self::automaton::Automaton;

/// A bank of known zero-displacement move sequences for one board shape,
/// compiled into an Aho-Corasick automaton the search engines advance one
/// move at a time.
///
/// Immutable once built; puzzle instances of the same shape share it through
/// an [`Arc`](std::sync::Arc).
#[derive(Debug)]
pub struct CycleBank {
    size: Size,
    automaton: Automaton,
}

impl CycleBank {
    /// Mines cycles of length at most `max_length` on the inflated board
    /// for `size` and compiles the automaton. Polls `cancel` between mining
    /// passes.
    pub(crate) fn build(
        size: Size,
        max_length: usize,
        cancel: &CancelToken,
    ) -> Result<Self, Canceled> {
        let automaton = miner::mine(size, max_length, cancel)?;
        Ok(Self { size, automaton })
    }

    /// The board shape this bank was mined for.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// The number of forbidden move sequences in the bank.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.automaton.keyword_count()
    }

    pub(crate) fn automaton(&self) -> &Automaton {
        &self.automaton
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_smoke() {
        let bank = CycleBank::build(Size::new(3, 3).unwrap(), 6, &CancelToken::new()).unwrap();
        assert_eq!(bank.size(), Size::new(3, 3).unwrap());
        // At least the four inverse pairs are always found.
        assert!(bank.keyword_count() >= 4);
    }
}
