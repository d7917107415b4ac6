use crate::engine::config::EngineConfig;
use crate::engine::{BestMove, Evaluation, SearchError, SearchStats, Searcher};
use crate::logic::board::{Board, Side};
use crate::logic::move_tree::NodeId;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimax over cloned boards, maximizing for the Computer.
///
/// Alpha-beta pruning and the wall-clock budget both come from the config.
/// The board handed in is never mutated.
pub struct MinimaxEngine {
    config: Arc<EngineConfig>,
    nodes_searched: u64,
    start_time: Instant,
    time_limit: Option<Duration>,
    out_of_time: bool,
}

impl MinimaxEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            nodes_searched: 0,
            start_time: Instant::now(),
            time_limit: None,
            out_of_time: false,
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        self.config = config;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Nodes visited by the last search.
    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    fn start_clock(&mut self) {
        self.nodes_searched = 0;
        self.start_time = Instant::now();
        self.time_limit = self.config.time_limit();
        self.out_of_time = false;
    }

    fn check_time(&mut self) -> bool {
        let Some(limit) = self.time_limit else {
            return false;
        };

        if self.start_time.elapsed() > limit {
            if !self.out_of_time {
                log::debug!(
                    "Time budget of {}ms spent after {} nodes",
                    limit.as_millis(),
                    self.nodes_searched
                );
            }
            self.out_of_time = true;
        }
        self.out_of_time
    }

    /// Searches `board` to `depth` plies with the given window.
    ///
    /// Restarts the clock, so a time budget applies to this call alone.
    pub fn search(
        &mut self,
        board: &Board,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
    ) -> Result<Evaluation, SearchError> {
        self.start_clock();
        self.minimax(board, depth, alpha, beta, maximizing)
    }

    fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> Result<Evaluation, SearchError> {
        self.nodes_searched += 1;

        if depth == 0 || board.winner().is_some() || self.check_time() {
            return Ok(Evaluation {
                score: board.heuristic(),
                board: board.clone(),
            });
        }

        let side = if maximizing {
            Side::Computer
        } else {
            Side::Player
        };

        let mut best: Option<Evaluation> = None;
        for child in board.get_all_moves(side)? {
            let score = self
                .minimax(&child, depth - 1, alpha, beta, !maximizing)?
                .score;

            // Only a strictly better score replaces the current best
            let improves = match &best {
                None => true,
                Some(current) if maximizing => score > current.score,
                Some(current) => score < current.score,
            };
            if improves {
                best = Some(Evaluation {
                    score,
                    board: child,
                });
            }

            if self.config.alpha_beta_enabled {
                if maximizing {
                    alpha = alpha.max(score);
                } else {
                    beta = beta.min(score);
                }
                if beta <= alpha {
                    break;
                }
            }
        }

        // A side that cannot move has lost
        Ok(best.unwrap_or_else(|| Evaluation {
            score: if maximizing { i32::MIN } else { i32::MAX },
            board: board.clone(),
        }))
    }
}

impl Searcher for MinimaxEngine {
    /// Scores every Computer move at `depth - 1` and keeps the first one with
    /// the highest score.
    fn find_best_move(&mut self, board: &Board, depth: u8) -> Result<BestMove, SearchError> {
        self.start_clock();

        let mut alpha = i32::MIN;
        let beta = i32::MAX;
        let trees = board.move_trees(Side::Computer);
        let mut best: Option<(usize, NodeId, i32, Board)> = None;

        'trees: for (tree_idx, tree) in trees.iter().enumerate() {
            for node in tree.all_terminal_moves() {
                let state = board.state_from_move(tree, node)?;
                let score = self
                    .minimax(&state, depth.saturating_sub(1), alpha, beta, false)?
                    .score;

                let improves = best
                    .as_ref()
                    .is_none_or(|(_, _, best_score, _)| score > *best_score);
                if improves {
                    let root = tree.root();
                    log::debug!(
                        "Best score: {score} ({}, {}) -> {:?}",
                        root.row,
                        root.col,
                        tree.path(node)
                    );
                    best = Some((tree_idx, node, score, state));
                }

                if self.config.alpha_beta_enabled {
                    alpha = alpha.max(score);
                    if beta <= alpha {
                        break 'trees;
                    }
                }
            }
        }

        let Some((tree_idx, node, score, state)) = best else {
            return Err(SearchError::NoLegalMoves {
                side: Side::Computer,
            });
        };
        let tree = trees
            .into_iter()
            .nth(tree_idx)
            .ok_or(SearchError::NoLegalMoves {
                side: Side::Computer,
            })?;

        let elapsed = self.start_time.elapsed();
        let stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        };
        log::info!(
            "Search finished: depth={}, nodes={}, time={}ms, score={score}",
            stats.depth,
            stats.nodes,
            stats.time_ms
        );

        Ok(BestMove {
            tree,
            node,
            board: state,
            score,
            stats,
        })
    }
}
