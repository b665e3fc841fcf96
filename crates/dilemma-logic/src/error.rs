//! Engine error kinds
//!
//! Every error is a local validation failure: the call that returned it left
//! the game exactly as it was.

use thiserror::Error;
use crate::game::GameState;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("stake must be positive (got={stake})")]
    InvalidStake { stake: i64 },

    #[error("game is not active (state={state})")]
    GameNotActive { state: GameState },

    #[error("no move recorded for the current round")]
    NoPendingMove,

    #[error("game is not finished (state={state})")]
    GameNotFinished { state: GameState },

    #[error("payoff matrix is not a prisoner's dilemma: {0}")]
    InvalidPayoffMatrix(&'static str),

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("arithmetic overflow")]
    Overflow,
}

pub type Result<T> = core::result::Result<T, EngineError>;
