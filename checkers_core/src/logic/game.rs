use crate::engine::{SearchError, SearchStats, Searcher};
use crate::logic::board::{Board, Piece, Side, DEFAULT_BOARD_SIZE};
use crate::logic::rules::{piece_of_side, validate_move, MoveError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won(Side),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub turn: Side,
    pub status: GameStatus,
}

/// What the computer played, step by step.
#[derive(Debug, Clone)]
pub struct ComputerTurn {
    /// Landing squares from the first step to the last.
    pub path: Vec<(usize, usize)>,
    /// Board after each step of `path`; the last one is the new position.
    pub frames: Vec<Board>,
    pub captured: Vec<Piece>,
    pub score: i32,
    pub stats: SearchStats,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

impl GameState {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            board: Board::new(size),
            turn: Side::Player,
            status: GameStatus::Playing,
        }
    }

    const fn ensure_playing(&self) -> Result<(), MoveError> {
        match self.status {
            GameStatus::Playing => Ok(()),
            GameStatus::Won(_) => Err(MoveError::GameOver),
        }
    }

    /// Destinations for the piece on `(row, col)`, which must belong to the
    /// side on move.
    pub fn valid_moves(
        &self,
        row: usize,
        col: usize,
    ) -> Result<HashMap<(usize, usize), Vec<Piece>>, MoveError> {
        self.ensure_playing()?;
        let piece = piece_of_side(&self.board, self.turn, (row, col))?;
        Ok(self.board.get_valid_moves(&piece))
    }

    /// Plays a move for the side on move and returns the captured pieces.
    pub fn make_move(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<Vec<Piece>, MoveError> {
        self.ensure_playing()?;
        let (piece, captured) = validate_move(&self.board, self.turn, from, to)?;

        if !captured.is_empty() {
            self.board.remove(&captured);
        }
        self.board.move_piece(&piece, to.0, to.1);

        self.turn = self.turn.opposite();
        self.update_status();

        Ok(captured)
    }

    /// Lets `searcher` pick the computer's move and plays it.
    pub fn play_computer_turn<S: Searcher>(
        &mut self,
        searcher: &mut S,
        depth: u8,
    ) -> Result<ComputerTurn, SearchError> {
        self.ensure_playing()?;
        if self.turn != Side::Computer {
            return Err(MoveError::NotYourTurn.into());
        }

        let best = searcher.find_best_move(&self.board, depth)?;

        let mut frames = Vec::new();
        for node in best.tree.path_nodes(best.node) {
            frames.push(self.board.state_from_move(&best.tree, node)?);
        }

        let turn = ComputerTurn {
            path: best.path(),
            frames,
            captured: best.captured(),
            score: best.score,
            stats: best.stats,
        };

        self.board = best.board;
        self.turn = self.turn.opposite();
        self.update_status();

        Ok(turn)
    }

    fn update_status(&mut self) {
        if let Some(winner) = self.board.winner() {
            self.status = GameStatus::Won(winner);
        }
    }
}
