//! Catalyst mock contract
//!
//! An in-memory stand-in for the on-chain Catalyst game contract. It keeps
//! every game it has started, keyed by a monotonically assigned id, and
//! settles finished games into per-player statistics. Nothing is persisted.

use std::collections::{BTreeMap, HashMap};

use dilemma_logic::{EngineConfig, Move, OpponentPolicy, RoundResult, Settlement};

mod error;
mod instructions;
mod state;

pub use error::{ContractError, Result};
pub use state::{GameRecord, PlayerStats, AI_ADDRESS, DEFAULT_PLAYER_ADDRESS};

/// Registry of games and player results.
///
/// Constructed and owned by its caller; mutations take `&mut self`.
#[derive(Debug)]
pub struct MockContract {
    pub(crate) config: EngineConfig,
    /// Id of the most recently started game, 0 before the first
    pub(crate) game_id: u32,
    pub(crate) games: BTreeMap<u32, GameRecord>,
    pub(crate) player_address: String,
    pub(crate) ai_address: String,
    pub(crate) stats: HashMap<String, PlayerStats>,
}

impl Default for MockContract {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            game_id: 0,
            games: BTreeMap::new(),
            player_address: DEFAULT_PLAYER_ADDRESS.to_string(),
            ai_address: AI_ADDRESS.to_string(),
            stats: HashMap::new(),
        }
    }
}

impl MockContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let mut contract = Self::default();
        instructions::update_config(&mut contract, config)?;
        Ok(contract)
    }

    /// Replace the engine config for games started from now on
    pub fn update_config(&mut self, config: EngineConfig) -> Result<()> {
        instructions::update_config(self, config)
    }

    /// Set the wallet that subsequent games belong to
    pub fn set_player_address(&mut self, address: &str) -> Result<()> {
        instructions::set_player_address(self, address)
    }

    /// Start a game; `None` uses the configured default stake
    pub fn start_game(&mut self, stake: Option<i64>) -> Result<u32> {
        instructions::start_game(self, stake)
    }

    /// Play one round with both moves given
    pub fn submit_move(&mut self, game_id: u32, player_move: Move, ai_move: Move) -> Result<RoundResult> {
        instructions::submit_move(self, game_id, player_move, ai_move)
    }

    /// Play one round against an opponent policy
    pub fn play_round<P>(&mut self, game_id: u32, player_move: Move, policy: &mut P) -> Result<RoundResult>
    where
        P: OpponentPolicy + ?Sized,
    {
        instructions::play_round(self, game_id, player_move, policy)
    }

    /// Settle a finished game
    pub fn end_game(&mut self, game_id: u32) -> Result<Settlement> {
        instructions::end_game(self, game_id)
    }

    pub fn current_game_id(&self) -> u32 {
        self.game_id
    }

    pub fn get_game(&self, game_id: u32) -> Option<&GameRecord> {
        self.games.get(&game_id)
    }

    pub fn games(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.values()
    }

    pub fn player_address(&self) -> &str {
        &self.player_address
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self, address: &str) -> Option<&PlayerStats> {
        self.stats.get(address)
    }
}
