use thiserror::Error;

use crate::board::{PieceKind, Square};
use crate::movegen::Move;

/// Errors surfaced by the position and move API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid coordinate {0}: must be within 0..8")]
    InvalidCoordinate(i16),

    #[error("invalid square notation: {0:?}")]
    InvalidSquare(String),

    #[error("invalid move notation: {0:?}")]
    InvalidMoveNotation(String),

    #[error("illegal move: {0}")]
    IllegalMove(Move),

    #[error("no piece of the side to move on {0}")]
    NoPieceToMove(Square),

    #[error("a pawn cannot promote to {0:?}")]
    InvalidPromotion(PieceKind),

    #[error("no moves to undo")]
    EmptyHistory,

    #[error("the game is already over")]
    GameOver,
}
