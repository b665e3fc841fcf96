//! Game settlement

use tracing::info;
use dilemma_logic::Settlement;
use crate::error::{ContractError, Result};
use crate::MockContract;

/// Final balances of a finished game.
///
/// The first call folds the result into the player's stats; later calls
/// return the same settlement without counting the game twice.
pub fn end_game(contract: &mut MockContract, game_id: u32) -> Result<Settlement> {
    let record = contract
        .games
        .get_mut(&game_id)
        .ok_or(ContractError::UnknownGame { id: game_id })?;
    let settlement = record.game.settle()?;

    if !record.settled {
        record.settled = true;
        let stats = contract.stats.entry(record.player.clone()).or_default();
        stats.record(settlement);

        info!(
            game_id,
            player = %record.player,
            player_balance = settlement.player_balance,
            outcome = ?settlement.outcome,
            wins = stats.wins,
            losses = stats.losses,
            draws = stats.draws,
            "game settled"
        );
    }

    Ok(settlement)
}
