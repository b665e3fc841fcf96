//! Admin instructions

use tracing::info;
use dilemma_logic::EngineConfig;
use crate::error::{ContractError, Result};
use crate::MockContract;

/// Replace the engine config used for games started from now on
pub fn update_config(contract: &mut MockContract, config: EngineConfig) -> Result<()> {
    config.validate()?;

    info!(
        default_stake = config.default_stake,
        temptation = config.payoffs.temptation,
        reward = config.payoffs.reward,
        punishment = config.payoffs.punishment,
        sucker = config.payoffs.sucker,
        "config updated"
    );
    contract.config = config;
    Ok(())
}

/// Set the wallet that subsequent games are started for
pub fn set_player_address(contract: &mut MockContract, address: &str) -> Result<()> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ContractError::InvalidAddress);
    }

    info!(address, "player address set");
    contract.player_address = address.to_string();
    Ok(())
}
