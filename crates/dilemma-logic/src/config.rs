//! Engine configuration

use serde::{Deserialize, Serialize};
use crate::error::{EngineError, Result};
use crate::payoff::PayoffMatrix;
use crate::DEFAULT_STAKE;

/// Tunables for a game engine.
///
/// The round count is not configurable; every game lasts [`crate::MAX_ROUNDS`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Stake used when `start` is called without one
    pub default_stake: i64,
    pub payoffs: PayoffMatrix,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_stake: DEFAULT_STAKE,
            payoffs: PayoffMatrix::CLASSIC,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_stake <= 0 {
            return Err(EngineError::InvalidStake { stake: self.default_stake });
        }
        self.payoffs.validate()
    }
}
