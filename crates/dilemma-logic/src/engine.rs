//! Game engine: owns the current game and the opponent policy
//!
//! Callers construct their own engine; nothing here is global. Every
//! operation takes `&mut self`, so one engine has exactly one writer.

use tracing::{debug, info};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::game::{Game, GameState, Settlement};
use crate::strategy::{Move, Opponent, OpponentPolicy};

pub struct Engine<P = Opponent> {
    config: EngineConfig,
    policy: P,
    game: Option<Game>,
    /// Id of the most recently started game, 0 before the first
    last_id: u32,
}

impl Engine<Opponent> {
    /// Engine with the default config and a uniform random opponent
    pub fn seeded(seed: u64) -> Self {
        Self::new(Opponent::random(seed))
    }
}

impl<P: OpponentPolicy> Engine<P> {
    pub fn new(policy: P) -> Self {
        Self {
            config: EngineConfig::default(),
            policy,
            game: None,
            last_id: 0,
        }
    }

    pub fn with_config(config: EngineConfig, policy: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            policy,
            game: None,
            last_id: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Swap the opponent; takes effect from the next resolved round
    pub fn set_policy(&mut self, policy: P) {
        self.policy = policy;
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    /// `Idle` when no game is held
    pub fn state(&self) -> GameState {
        self.game.as_ref().map(Game::state).unwrap_or_default()
    }

    pub fn last_game_id(&self) -> u32 {
        self.last_id
    }

    /// Start a new game, replacing any current one.
    ///
    /// `None` uses the configured default stake. On error the previous game
    /// (if any) is kept and no id is consumed. On success the policy is told
    /// the new game id before the first round.
    pub fn start(&mut self, stake: Option<i64>) -> Result<&Game> {
        let stake = stake.unwrap_or(self.config.default_stake);
        let id = self.last_id.checked_add(1).ok_or(EngineError::Overflow)?;
        let game = Game::new(id, stake, self.config.payoffs)?;

        if let Some(previous) = self.game.as_ref() {
            debug!(game_id = previous.id(), state = %previous.state(), "game replaced");
        }

        self.last_id = id;
        self.policy.on_game_start(id);
        Ok(&*self.game.insert(game))
    }

    pub fn record_move(&mut self, mv: Move) -> Result<&Game> {
        let game = self.game.as_mut().ok_or(EngineError::GameNotActive {
            state: GameState::Idle,
        })?;
        game.record_move(mv)?;
        Ok(&*game)
    }

    /// Resolve the pending round against the engine's opponent policy
    pub fn resolve_round(&mut self) -> Result<&Game> {
        let game = self.game.as_mut().ok_or(EngineError::GameNotActive {
            state: GameState::Idle,
        })?;
        game.resolve_round(&mut self.policy)?;
        Ok(&*game)
    }

    /// Final balances of the current game
    pub fn settle(&self) -> Result<Settlement> {
        match self.game.as_ref() {
            Some(game) => game.settle(),
            None => Err(EngineError::GameNotFinished { state: GameState::Idle }),
        }
    }

    /// Drop the current game
    pub fn reset(&mut self) {
        if let Some(game) = self.game.take() {
            info!(game_id = game.id(), state = %game.state(), "game reset");
        }
    }
}
