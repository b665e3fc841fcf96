//! Dilemma Logic for Catalyst
//!
//! Core game logic for a five-round Prisoner's Dilemma played against a
//! scripted opponent. This crate is compiled to:
//! - Native (for the mock contract and tests)
//! - WASM (for the browser front end)

mod config;
mod engine;
mod error;
mod game;
mod payoff;
mod random;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use game::{Game, GameState, Outcome, RoundResult, Settlement};
pub use payoff::PayoffMatrix;
pub use random::SeededRng;
pub use strategy::{execute_strategy, from_fn, FromFn, Move, Opponent, OpponentPolicy, Scripted, Strategy};

/// Rounds per game. A game is finished exactly when this many rounds resolved.
pub const MAX_ROUNDS: u8 = 5;

/// Stake (in NST) committed by each party when no stake is given.
pub const DEFAULT_STAKE: i64 = 25;

/// Payoff for one round under the classic matrix
/// Returns (player, opponent)
pub fn payoff(player: Move, opponent: Move) -> (i64, i64) {
    PayoffMatrix::CLASSIC.payoff(player, opponent)
}
