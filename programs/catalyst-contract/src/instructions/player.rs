//! Player instructions

use tracing::{debug, warn};
use dilemma_logic::{from_fn, Game, Move, OpponentPolicy, RoundResult};
use crate::error::{ContractError, Result};
use crate::state::GameRecord;
use crate::MockContract;

/// Start a game for the current player address; returns the new game id
pub fn start_game(contract: &mut MockContract, stake: Option<i64>) -> Result<u32> {
    let stake = stake.unwrap_or(contract.config.default_stake);
    let id = contract
        .game_id
        .checked_add(1)
        .ok_or(dilemma_logic::EngineError::Overflow)?;
    let game = Game::new(id, stake, contract.config.payoffs).map_err(|e| {
        warn!(stake, error = %e, "start_game rejected");
        e
    })?;

    let player = contract.player_address.clone();
    debug!(game_id = id, player = %player, "game registered");

    contract
        .games
        .insert(id, GameRecord::new(player, contract.ai_address.clone(), game));
    contract.game_id = id;
    Ok(id)
}

/// Play one round with both moves supplied by the caller
pub fn submit_move(
    contract: &mut MockContract,
    game_id: u32,
    player_move: Move,
    ai_move: Move,
) -> Result<RoundResult> {
    play_round(contract, game_id, player_move, &mut from_fn(|_, _| ai_move))
}

/// Play one round, drawing the opponent's move from `policy`
pub fn play_round<P>(
    contract: &mut MockContract,
    game_id: u32,
    player_move: Move,
    policy: &mut P,
) -> Result<RoundResult>
where
    P: OpponentPolicy + ?Sized,
{
    let record = contract
        .games
        .get_mut(&game_id)
        .ok_or(ContractError::UnknownGame { id: game_id })?;
    // Work on a copy so a rejected call leaves the stored game untouched
    let mut game = record.game.clone();
    if let Err(e) = game.record_move(player_move) {
        warn!(game_id, error = %e, "submit_move rejected");
        return Err(e.into());
    }
    let result = game.resolve_round(policy)?.clone();
    record.game = game;

    Ok(result)
}
