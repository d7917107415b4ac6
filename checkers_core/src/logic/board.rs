use crate::logic::move_tree::{MoveTree, NodeId};
use crate::logic::rules::{is_dark_square, MoveError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_BOARD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Computer,
}

impl Side {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Computer,
            Self::Computer => Self::Player,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Computer => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub row: usize,
    pub col: usize,
    pub side: Side,
    pub king: bool,
}

impl Piece {
    pub const fn new(row: usize, col: usize, side: Side) -> Self {
        Self {
            row,
            col,
            side,
            king: false,
        }
    }

    /// Player men advance towards row 0; kings go both ways.
    pub const fn can_move_up(&self) -> bool {
        self.king || matches!(self.side, Side::Player)
    }

    pub const fn can_move_down(&self) -> bool {
        self.king || matches!(self.side, Side::Computer)
    }
}

/// Square grid of optional pieces plus per-side piece and king counters.
///
/// `grid[row * size + col]` holds `Some(p)` only when `p.row == row` and
/// `p.col == col`, and the counters always match what is on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardSnapshot")]
pub struct Board {
    size: usize,
    grid: Vec<Option<Piece>>,
    pieces_left: [i32; 2],
    kings: [i32; 2],
}

/// Reasons a deserialized board is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("grid holds {found} cells, a {size}x{size} board needs {expected}")]
    GridSize {
        size: usize,
        expected: usize,
        found: usize,
    },
    #[error("piece stored at ({row}, {col}) claims to stand on ({claimed_row}, {claimed_col})")]
    MisplacedPiece {
        row: usize,
        col: usize,
        claimed_row: usize,
        claimed_col: usize,
    },
    #[error("piece on light square ({row}, {col})")]
    LightSquare { row: usize, col: usize },
}

/// Wire form of a [`Board`]. Counters are rebuilt from the grid, so any
/// serialized `pieces_left` or `kings` fields are ignored.
#[derive(Deserialize)]
struct BoardSnapshot {
    size: usize,
    grid: Vec<Option<Piece>>,
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = SnapshotError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self, Self::Error> {
        let BoardSnapshot { size, grid } = snapshot;
        let expected = size.saturating_mul(size);
        if grid.len() != expected {
            return Err(SnapshotError::GridSize {
                size,
                expected,
                found: grid.len(),
            });
        }

        let mut board = Self::empty(size);
        for (idx, cell) in grid.into_iter().enumerate() {
            let Some(piece) = cell else {
                continue;
            };
            let (row, col) = (idx / size, idx % size);
            if (piece.row, piece.col) != (row, col) {
                return Err(SnapshotError::MisplacedPiece {
                    row,
                    col,
                    claimed_row: piece.row,
                    claimed_col: piece.col,
                });
            }
            if !is_dark_square(row, col) {
                return Err(SnapshotError::LightSquare { row, col });
            }
            board.place(piece);
        }

        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

impl Board {
    /// Creates the starting position: `size / 2 - 1` rows of men per side on
    /// the dark squares, Computer on top, Player at the bottom.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let mut board = Self::empty(size);
        let back_rows = (size / 2).saturating_sub(1);

        for row in 0..size {
            let side = if row < back_rows {
                Side::Computer
            } else if row >= size - back_rows {
                Side::Player
            } else {
                continue;
            };

            for col in (0..size).filter(|&col| is_dark_square(row, col)) {
                board.place(Piece::new(row, col, side));
            }
        }

        board
    }

    #[must_use]
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            grid: vec![None; size * size],
            pieces_left: [0; 2],
            kings: [0; 2],
        }
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    pub const fn pieces_left(&self, side: Side) -> i32 {
        self.pieces_left[side.index()]
    }

    pub const fn kings(&self, side: Side) -> i32 {
        self.kings[side.index()]
    }

    /// Out-of-range coordinates are a caller bug and panic.
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            self.contains(row, col),
            "square ({row}, {col}) is outside a {size}x{size} board",
            size = self.size
        );
        row * self.size + col
    }

    #[allow(clippy::indexing_slicing)]
    pub fn get_piece(&self, row: usize, col: usize) -> Option<Piece> {
        self.grid[self.index(row, col)]
    }

    #[allow(clippy::indexing_slicing)]
    fn cell_mut(&mut self, row: usize, col: usize) -> &mut Option<Piece> {
        let idx = self.index(row, col);
        &mut self.grid[idx]
    }

    fn place(&mut self, piece: Piece) {
        *self.cell_mut(piece.row, piece.col) = Some(piece);
        self.pieces_left[piece.side.index()] += 1;
        if piece.king {
            self.kings[piece.side.index()] += 1;
        }
    }

    /// Puts a new piece on an empty dark square, keeping the counters in step.
    pub fn add_piece(
        &mut self,
        row: usize,
        col: usize,
        side: Side,
        king: bool,
    ) -> Result<Piece, MoveError> {
        if !self.contains(row, col) {
            return Err(MoveError::OutOfBounds);
        }
        if !is_dark_square(row, col) {
            return Err(MoveError::NotPlayableSquare);
        }
        if self.get_piece(row, col).is_some() {
            return Err(MoveError::SquareOccupied);
        }

        let piece = Piece {
            row,
            col,
            side,
            king,
        };
        self.place(piece);
        Ok(piece)
    }

    /// Square reached by stepping `(d_row, d_col)` from `(row, col)`, if it is
    /// still on the board.
    pub fn offset(
        &self,
        row: usize,
        col: usize,
        d_row: isize,
        d_col: isize,
    ) -> Option<(usize, usize)> {
        let row = row.checked_add_signed(d_row)?;
        let col = col.checked_add_signed(d_col)?;
        self.contains(row, col).then_some((row, col))
    }

    /// Moves the piece standing on `piece`'s square to `(row, col)`.
    ///
    /// Grid contents are swapped, the stored coordinates follow the piece and
    /// a man landing on the first or last row is crowned. Legality is not
    /// checked here.
    pub fn move_piece(&mut self, piece: &Piece, row: usize, col: usize) {
        let from = self.index(piece.row, piece.col);
        let to = self.index(row, col);
        self.grid.swap(from, to);

        let last_row = self.size - 1;
        let mut crowned = None;
        if let Some(moved) = self.cell_mut(row, col) {
            moved.row = row;
            moved.col = col;
            if (row == 0 || row == last_row) && !moved.king {
                moved.king = true;
                crowned = Some(moved.side);
            }
        }

        if let Some(side) = crowned {
            self.kings[side.index()] += 1;
        }
    }

    /// Clears the squares of captured pieces and updates the counters.
    pub fn remove(&mut self, pieces: &[Piece]) {
        for piece in pieces {
            if let Some(removed) = self.cell_mut(piece.row, piece.col).take() {
                self.pieces_left[removed.side.index()] -= 1;
                if removed.king {
                    self.kings[removed.side.index()] -= 1;
                }
            }
        }
    }

    /// All pieces of `side` in row-major order.
    pub fn get_pieces_by_side(&self, side: Side) -> Vec<Piece> {
        self.grid
            .iter()
            .flatten()
            .filter(|piece| piece.side == side)
            .copied()
            .collect()
    }

    pub const fn winner(&self) -> Option<Side> {
        if self.pieces_left(Side::Player) <= 0 {
            Some(Side::Computer)
        } else if self.pieces_left(Side::Computer) <= 0 {
            Some(Side::Player)
        } else {
            None
        }
    }

    /// Material plus king balance; positive favours the Computer.
    pub const fn heuristic(&self) -> i32 {
        self.pieces_left(Side::Computer) - self.pieces_left(Side::Player)
            + (self.kings(Side::Computer) - self.kings(Side::Player))
    }

    /// Applies a move and its captures to this board and hands it back.
    /// Clone first if the current position must survive.
    #[must_use]
    pub fn simulate_move(
        mut self,
        piece: &Piece,
        dest: (usize, usize),
        captured: &[Piece],
    ) -> Self {
        self.move_piece(piece, dest.0, dest.1);
        if !captured.is_empty() {
            self.remove(captured);
        }
        self
    }

    /// Legal destinations of `piece`, each mapped to the pieces jumped on the
    /// way there.
    pub fn get_valid_moves(&self, piece: &Piece) -> HashMap<(usize, usize), Vec<Piece>> {
        MoveTree::build(self, piece).flatten()
    }

    /// One move tree per piece of `side`, in row-major piece order.
    pub fn move_trees(&self, side: Side) -> Vec<MoveTree> {
        self.get_pieces_by_side(side)
            .iter()
            .map(|piece| MoveTree::build(self, piece))
            .collect()
    }

    /// Every board reachable by one full move of `side`.
    pub fn get_all_moves(&self, side: Side) -> Result<Vec<Self>, MoveError> {
        let mut boards = Vec::new();
        for tree in self.move_trees(side) {
            for node in tree.all_terminal_moves() {
                boards.push(self.state_from_move(&tree, node)?);
            }
        }
        Ok(boards)
    }

    /// Board after playing the chain that ends at `node`.
    ///
    /// The tree's root square must still hold the moving piece on this board.
    pub fn state_from_move(&self, tree: &MoveTree, node: NodeId) -> Result<Self, MoveError> {
        let landing = tree.get(node).ok_or(MoveError::MoveNotInTree)?;
        if landing.before.is_none() {
            return Err(MoveError::MoveNotInTree);
        }

        let root = tree.root();
        if !self.contains(root.row, root.col) {
            return Err(MoveError::OutOfBounds);
        }
        let piece = self
            .get_piece(root.row, root.col)
            .ok_or(MoveError::NoPieceAtSource)?;

        let captured = tree.captured(node);
        Ok(self
            .clone()
            .simulate_move(&piece, (landing.row, landing.col), &captured))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.grid.chunks(self.size.max(1)).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                let symbol = match cell {
                    None => '.',
                    Some(piece) => match (piece.side, piece.king) {
                        (Side::Player, false) => 'p',
                        (Side::Player, true) => 'P',
                        (Side::Computer, false) => 'c',
                        (Side::Computer, true) => 'C',
                    },
                };
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_on_grid(board: &Board, side: Side) -> (i32, i32) {
        let pieces = board.get_pieces_by_side(side);
        let kings = pieces.iter().filter(|p| p.king).count();
        (pieces.len() as i32, kings as i32)
    }

    #[test]
    fn test_standard_layout() {
        let board = Board::new(8);

        assert_eq!(board.pieces_left(Side::Player), 12);
        assert_eq!(board.pieces_left(Side::Computer), 12);
        assert_eq!(board.kings(Side::Player), 0);

        for piece in board.get_pieces_by_side(Side::Computer) {
            assert!(piece.row < 3);
            assert!(is_dark_square(piece.row, piece.col));
        }
        for piece in board.get_pieces_by_side(Side::Player) {
            assert!(piece.row >= 5);
            assert!(is_dark_square(piece.row, piece.col));
        }
        for row in 3..5 {
            for col in 0..8 {
                assert!(board.get_piece(row, col).is_none());
            }
        }
    }

    #[test]
    fn test_ten_by_ten_layout() {
        let board = Board::new(10);
        assert_eq!(board.pieces_left(Side::Player), 20);
        assert_eq!(board.pieces_left(Side::Computer), 20);
        assert_eq!(count_on_grid(&board, Side::Player), (20, 0));
    }

    #[test]
    fn test_pieces_by_side_row_major() {
        let board = Board::new(8);
        let pieces = board.get_pieces_by_side(Side::Computer);
        let squares: Vec<_> = pieces.iter().take(5).map(|p| (p.row, p.col)).collect();
        assert_eq!(squares, vec![(0, 1), (0, 3), (0, 5), (0, 7), (1, 0)]);
    }

    #[test]
    fn test_move_updates_grid_and_coordinates() {
        let mut board = Board::new(8);
        let piece = board.get_piece(5, 0).unwrap();

        board.move_piece(&piece, 4, 1);

        assert!(board.get_piece(5, 0).is_none());
        let moved = board.get_piece(4, 1).unwrap();
        assert_eq!((moved.row, moved.col), (4, 1));
        assert!(!moved.king);
    }

    #[test]
    fn test_promotion_happens_once() {
        let mut board = Board::empty(8);
        let piece = board.add_piece(1, 2, Side::Player, false).unwrap();

        board.move_piece(&piece, 0, 1);
        let king = board.get_piece(0, 1).unwrap();
        assert!(king.king);
        assert_eq!(board.kings(Side::Player), 1);

        board.move_piece(&king, 1, 2);
        let king = board.get_piece(1, 2).unwrap();
        board.move_piece(&king, 0, 3);

        assert!(board.get_piece(0, 3).unwrap().king);
        assert_eq!(board.kings(Side::Player), 1);
    }

    #[test]
    fn test_computer_promotes_on_last_row() {
        let mut board = Board::empty(8);
        let piece = board.add_piece(6, 1, Side::Computer, false).unwrap();

        board.move_piece(&piece, 7, 0);

        assert!(board.get_piece(7, 0).unwrap().king);
        assert_eq!(board.kings(Side::Computer), 1);
        assert_eq!(board.heuristic(), 2);
    }

    #[test]
    fn test_remove_updates_counters() {
        let mut board = Board::empty(8);
        let man = board.add_piece(3, 2, Side::Player, false).unwrap();
        let king = board.add_piece(3, 4, Side::Player, true).unwrap();
        board.add_piece(5, 2, Side::Player, false).unwrap();
        board.add_piece(0, 1, Side::Computer, false).unwrap();

        assert_eq!(board.kings(Side::Player), 1);
        board.remove(&[man, king]);

        assert!(board.get_piece(3, 2).is_none());
        assert!(board.get_piece(3, 4).is_none());
        assert_eq!(board.pieces_left(Side::Player), 1);
        assert_eq!(board.kings(Side::Player), 0);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_remove_ignores_already_empty_square() {
        let mut board = Board::empty(8);
        let man = board.add_piece(3, 2, Side::Player, false).unwrap();
        board.remove(&[man]);
        board.remove(&[man]);
        assert_eq!(board.pieces_left(Side::Player), 0);
    }

    #[test]
    fn test_simulate_move_without_captures_keeps_counts() {
        let board = Board::new(8);
        let piece = board.get_piece(2, 1).unwrap();

        let next = board.clone().simulate_move(&piece, (3, 0), &[]);

        assert_eq!(next.pieces_left(Side::Player), board.pieces_left(Side::Player));
        assert_eq!(next.pieces_left(Side::Computer), board.pieces_left(Side::Computer));
        assert_eq!(next.kings(Side::Computer), 0);
        assert!(next.get_piece(3, 0).is_some());
        // the input board stays untouched
        assert!(board.get_piece(3, 0).is_none());
    }

    #[test]
    fn test_simulate_move_with_capture() {
        let mut board = Board::empty(8);
        let mover = board.add_piece(2, 1, Side::Computer, false).unwrap();
        let victim = board.add_piece(3, 2, Side::Player, true).unwrap();
        board.add_piece(7, 0, Side::Player, false).unwrap();

        let next = board.simulate_move(&mover, (4, 3), &[victim]);

        assert_eq!(next.pieces_left(Side::Player), 1);
        assert_eq!(next.kings(Side::Player), 0);
        assert!(next.get_piece(3, 2).is_none());
        assert_eq!(next.heuristic(), 0);
    }

    #[test]
    fn test_winner() {
        let mut board = Board::empty(8);
        board.add_piece(2, 1, Side::Computer, false).unwrap();
        assert_eq!(board.winner(), Some(Side::Computer));

        let mut board = Board::empty(8);
        board.add_piece(5, 0, Side::Player, false).unwrap();
        assert_eq!(board.winner(), Some(Side::Player));

        assert_eq!(Board::new(8).winner(), None);
    }

    #[test]
    fn test_heuristic() {
        let mut board = Board::empty(8);
        board.add_piece(0, 1, Side::Computer, true).unwrap();
        board.add_piece(0, 3, Side::Computer, false).unwrap();
        board.add_piece(7, 0, Side::Player, false).unwrap();
        assert_eq!(board.heuristic(), 2);
        assert_eq!(Board::new(8).heuristic(), 0);
    }

    #[test]
    fn test_add_piece_rejects_bad_squares() {
        let mut board = Board::empty(8);
        assert_eq!(
            board.add_piece(0, 0, Side::Player, false),
            Err(MoveError::NotPlayableSquare)
        );
        assert_eq!(
            board.add_piece(8, 1, Side::Player, false),
            Err(MoveError::OutOfBounds)
        );
        board.add_piece(0, 1, Side::Player, false).unwrap();
        assert_eq!(
            board.add_piece(0, 1, Side::Computer, false),
            Err(MoveError::SquareOccupied)
        );
        assert_eq!(board.pieces_left(Side::Computer), 0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_get_piece_out_of_range_panics() {
        let board = Board::new(8);
        let _ = board.get_piece(3, 8);
    }

    #[test]
    fn test_offset() {
        let board = Board::new(8);
        assert_eq!(board.offset(0, 0, -1, 1), None);
        assert_eq!(board.offset(7, 7, 1, -1), None);
        assert_eq!(board.offset(3, 3, 2, -2), Some((5, 1)));
    }

    #[test]
    fn test_display() {
        let mut board = Board::empty(4);
        board.add_piece(0, 1, Side::Computer, false).unwrap();
        board.add_piece(3, 2, Side::Player, true).unwrap();
        assert_eq!(board.to_string(), ". c . .\n. . . .\n. . . .\n. . P .");
    }

    #[test]
    fn test_get_all_moves_opening() {
        let board = Board::new(8);

        let boards = board.get_all_moves(Side::Player).unwrap();

        assert_eq!(boards.len(), 7);
        for next in &boards {
            assert_eq!(next.pieces_left(Side::Player), 12);
            assert_eq!(next.pieces_left(Side::Computer), 12);
            assert_eq!(count_on_grid(next, Side::Player), (12, 0));
        }
        assert_eq!(board.get_all_moves(Side::Computer).unwrap().len(), 7);
    }

    #[test]
    fn test_serde_roundtrip() {
        let board = Board::new(8);
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn test_deserialize_rejects_wrong_grid_length() {
        let json = r#"{"size":8,"grid":[],"pieces_left":[1,1],"kings":[0,0]}"#;

        let err = serde_json::from_str::<Board>(json).unwrap_err();

        assert!(err.to_string().contains("needs 64"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_misplaced_piece() {
        let mut board = Board::empty(8);
        board.add_piece(5, 0, Side::Player, false).unwrap();
        let mut value = serde_json::to_value(&board).unwrap();
        // the piece still says (5, 0) but now sits in the cell of (0, 1)
        value["grid"][1] = value["grid"][40].take();

        let err = serde_json::from_value::<Board>(value).unwrap_err();

        assert!(err.to_string().contains("claims to stand on (5, 0)"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_light_square() {
        let mut value = serde_json::to_value(Board::empty(8)).unwrap();
        value["grid"][0] = serde_json::json!({
            "row": 0,
            "col": 0,
            "side": "Player",
            "king": false
        });

        let err = serde_json::from_value::<Board>(value).unwrap_err();

        assert!(err.to_string().contains("light square (0, 0)"), "{err}");
    }

    #[test]
    fn test_deserialize_recounts_pieces() {
        let mut board = Board::empty(8);
        board.add_piece(5, 0, Side::Player, true).unwrap();
        let mut value = serde_json::to_value(&board).unwrap();
        value["pieces_left"] = serde_json::json!([3, 0]);
        value["kings"] = serde_json::json!([0, 2]);

        let restored: Board = serde_json::from_value(value).unwrap();

        assert_eq!(restored.pieces_left(Side::Player), 1);
        assert_eq!(restored.kings(Side::Player), 1);
        assert_eq!(restored.kings(Side::Computer), 0);
        assert_eq!(restored, board);
    }

    #[test]
    fn test_snapshot_errors() {
        let short = BoardSnapshot {
            size: 2,
            grid: vec![None; 3],
        };
        assert_eq!(
            Board::try_from(short),
            Err(SnapshotError::GridSize {
                size: 2,
                expected: 4,
                found: 3
            })
        );

        let mut grid = vec![None; 4];
        grid[2] = Some(Piece::new(1, 0, Side::Computer));
        let board = Board::try_from(BoardSnapshot { size: 2, grid }).unwrap();
        assert_eq!(board.pieces_left(Side::Computer), 1);
    }
}
