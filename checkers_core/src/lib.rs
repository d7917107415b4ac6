//! Checkers engine: an N×N board, move-tree generation with multi-capture
//! chains, and a depth/time bounded minimax search for the computer side.

pub mod engine;
pub mod logic;
