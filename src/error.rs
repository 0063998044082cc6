//! Error taxonomy for the engine core.
//!
//! Every recoverable failure leaves the position and history untouched.
//! A terminal game is not an error from the search side: searches report
//! "no legal move" as an absent best move, and callers branch on the
//! session state to tell checkmate from stalemate.

use thiserror::Error;

use crate::position::Move;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// The move is not legal in the current position.
    #[error("illegal move {0}")]
    IllegalMove(Move),

    /// Undo was requested with no moves on the history stack.
    #[error("no moves to undo")]
    EmptyHistory,

    /// Skill level outside the supported 1..=20 range.
    #[error("invalid skill level {0}, expected 1..=20")]
    InvalidSkillLevel(u8),

    /// The game has reached a terminal state; only undo or reset apply.
    #[error("game is over")]
    GameOver,

    /// A FEN string could not be parsed.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}
