//! Contains the puzzle façade and its supporting types: the board model,
//! sizes, and cancellation.

pub(crate) mod board;
pub mod cancel;
pub mod puzzle;
pub mod size;

pub use board::Parity;
