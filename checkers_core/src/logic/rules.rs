use crate::logic::board::{Board, Piece, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("square is outside the board")]
    OutOfBounds,
    #[error("pieces may only stand on dark squares")]
    NotPlayableSquare,
    #[error("square is already occupied")]
    SquareOccupied,
    #[error("piece not found")]
    NoPieceAtSource,
    #[error("piece belongs to the side not on move")]
    NotYourTurn,
    #[error("destination is not reachable by the selected piece")]
    InvalidDestination,
    #[error("move is null")]
    MoveNotInTree,
    #[error("game is already over")]
    GameOver,
}

/// Pieces only ever stand on squares where `row + col` is odd.
pub const fn is_dark_square(row: usize, col: usize) -> bool {
    (row + col) % 2 == 1
}

/// Checks that `side` may move the piece on `from` to `to`.
///
/// Returns the moving piece and the pieces captured on the way, which is
/// exactly what the caller needs to hand to `Board::remove` and
/// `Board::move_piece`.
pub fn validate_move(
    board: &Board,
    side: Side,
    from: (usize, usize),
    to: (usize, usize),
) -> Result<(Piece, Vec<Piece>), MoveError> {
    let piece = piece_of_side(board, side, from)?;

    if !board.contains(to.0, to.1) {
        return Err(MoveError::OutOfBounds);
    }

    let mut moves = board.get_valid_moves(&piece);
    let captured = moves.remove(&to).ok_or(MoveError::InvalidDestination)?;
    Ok((piece, captured))
}

/// Looks up the piece on `square` and checks that it belongs to `side`.
pub fn piece_of_side(
    board: &Board,
    side: Side,
    square: (usize, usize),
) -> Result<Piece, MoveError> {
    let (row, col) = square;
    if !board.contains(row, col) {
        return Err(MoveError::OutOfBounds);
    }

    let piece = board.get_piece(row, col).ok_or(MoveError::NoPieceAtSource)?;
    if piece.side != side {
        return Err(MoveError::NotYourTurn);
    }
    Ok(piece)
}
