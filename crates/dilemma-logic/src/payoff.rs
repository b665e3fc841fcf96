//! Payoff matrix

use serde::{Deserialize, Serialize};
use crate::error::{EngineError, Result};
use crate::strategy::Move;

/// Point changes for each pair of moves, in NST.
///
/// A valid matrix is a true dilemma: `temptation > reward > punishment > sucker`
/// and mutual cooperation beats alternating exploitation (`2R > T + S`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    /// Defecting against a cooperator
    pub temptation: i64,
    /// Both cooperate
    pub reward: i64,
    /// Both defect
    pub punishment: i64,
    /// Cooperating against a defector
    pub sucker: i64,
}

impl PayoffMatrix {
    /// Small-integer scale used by the game: T=4, R=2, P=-1, S=-3
    pub const CLASSIC: Self = Self {
        temptation: 4,
        reward: 2,
        punishment: -1,
        sucker: -3,
    };

    /// Returns (player, opponent)
    pub fn payoff(&self, player: Move, opponent: Move) -> (i64, i64) {
        match (player, opponent) {
            (Move::Cooperate, Move::Cooperate) => (self.reward, self.reward),
            (Move::Cooperate, Move::Defect) => (self.sucker, self.temptation),
            (Move::Defect, Move::Cooperate) => (self.temptation, self.sucker),
            (Move::Defect, Move::Defect) => (self.punishment, self.punishment),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.temptation <= self.reward {
            return Err(EngineError::InvalidPayoffMatrix("temptation must exceed reward"));
        }
        if self.reward <= self.punishment {
            return Err(EngineError::InvalidPayoffMatrix("reward must exceed punishment"));
        }
        if self.punishment <= self.sucker {
            return Err(EngineError::InvalidPayoffMatrix("punishment must exceed sucker"));
        }
        let mutual = self.reward.checked_mul(2).ok_or(EngineError::Overflow)?;
        let alternating = self.temptation.checked_add(self.sucker).ok_or(EngineError::Overflow)?;
        if mutual <= alternating {
            return Err(EngineError::InvalidPayoffMatrix(
                "mutual cooperation must beat alternating exploitation",
            ));
        }
        Ok(())
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self::CLASSIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_is_valid() {
        assert!(PayoffMatrix::CLASSIC.validate().is_ok());
    }

    #[test]
    fn test_large_scale_variant_is_valid() {
        // The fixed-point scale some front ends used: 7 / 3 / 1 / -5
        let scaled = PayoffMatrix { temptation: 7, reward: 3, punishment: 1, sucker: -5 };
        assert!(scaled.validate().is_ok());
        assert_eq!(scaled.payoff(Move::Cooperate, Move::Defect), (-5, 7));
    }

    #[test]
    fn test_rejects_broken_ordering() {
        let flat = PayoffMatrix { temptation: 2, ..PayoffMatrix::CLASSIC };
        assert_eq!(
            flat.validate(),
            Err(EngineError::InvalidPayoffMatrix("temptation must exceed reward"))
        );

        let inverted = PayoffMatrix { punishment: -5, ..PayoffMatrix::CLASSIC };
        assert_eq!(
            inverted.validate(),
            Err(EngineError::InvalidPayoffMatrix("punishment must exceed sucker"))
        );
    }

    #[test]
    fn test_rejects_alternation_advantage() {
        // T + S = 10 > 2R = 4
        let m = PayoffMatrix { temptation: 12, reward: 2, punishment: -1, sucker: -2 };
        assert!(matches!(m.validate(), Err(EngineError::InvalidPayoffMatrix(_))));
    }
}
