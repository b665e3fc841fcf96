//! Contract error codes

use thiserror::Error;
use dilemma_logic::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("no game with id {id}")]
    UnknownGame { id: u32 },

    #[error("player address must not be empty")]
    InvalidAddress,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = core::result::Result<T, ContractError>;
