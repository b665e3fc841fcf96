//! Record definitions

use serde::{Deserialize, Serialize};
use dilemma_logic::{Game, Outcome, Settlement};

/// Address used for the player until the front end sets one
pub const DEFAULT_PLAYER_ADDRESS: &str = "0x123456789abcdef";

/// Address of the house opponent
pub const AI_ADDRESS: &str = "0x222a7c348B60B9091E5e1dC89c7Eb1847AC395B4";

/// One game as stored by the contract
#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    /// Player wallet at the time the game started
    pub player: String,
    /// Opponent wallet
    pub ai: String,
    pub game: Game,
    /// Set once `end_game` has folded this game into the player's stats
    pub settled: bool,
}

impl GameRecord {
    pub fn new(player: String, ai: String, game: Game) -> Self {
        Self {
            player,
            ai,
            game,
            settled: false,
        }
    }
}

/// Running results for one player address
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Best balance held, starting from the first game's stake
    pub highest: i64,
    pub last_result: Option<Settlement>,
}

impl PlayerStats {
    pub fn record(&mut self, settlement: Settlement) {
        self.games += 1;
        match settlement.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        if self.games == 1 {
            self.highest = settlement.stake;
        }
        self.highest = self.highest.max(settlement.player_balance);
        self.last_result = Some(settlement);
    }
}
