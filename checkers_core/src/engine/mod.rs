use crate::engine::config::EngineConfig;
use crate::engine::search::MinimaxEngine;
use crate::logic::board::{Board, Piece, Side};
use crate::logic::move_tree::{MoveTree, NodeId};
use crate::logic::rules::MoveError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod config;
pub mod search;


#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no legal move found for {side:?}")]
    NoLegalMoves { side: Side },
    #[error(transparent)]
    Move(#[from] MoveError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
}

/// Value of a searched position and the board that achieves it: the best
/// child for an inner node, the position itself at a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: i32,
    pub board: Board,
}

/// The computer's chosen move.
///
/// `node` is the final landing square inside `tree`; walking its `before`
/// links back to the root recovers the intermediate squares.
#[derive(Debug, Clone)]
pub struct BestMove {
    pub tree: MoveTree,
    pub node: NodeId,
    pub board: Board,
    pub score: i32,
    pub stats: SearchStats,
}

impl BestMove {
    /// Square the moving piece started from.
    pub fn origin(&self) -> (usize, usize) {
        let root = self.tree.root();
        (root.row, root.col)
    }

    pub fn path(&self) -> Vec<(usize, usize)> {
        self.tree.path(self.node)
    }

    pub fn captured(&self) -> Vec<Piece> {
        self.tree.captured(self.node)
    }
}

pub trait Searcher {
    fn find_best_move(&mut self, board: &Board, depth: u8) -> Result<BestMove, SearchError>;
}

/// One-shot search with an explicit depth, time budget and pruning switch.
pub fn find_best_move(
    board: &Board,
    depth: u8,
    time_limit_seconds: Option<f64>,
    alpha_beta_enabled: bool,
) -> Result<BestMove, SearchError> {
    let config = EngineConfig {
        max_depth: depth,
        time_limit_seconds,
        alpha_beta_enabled,
    };
    let mut engine = MinimaxEngine::new(Arc::new(config));
    engine.find_best_move(board, depth)
}
