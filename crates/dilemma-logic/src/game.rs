//! Game state machine and round ledger

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::error::{EngineError, Result};
use crate::payoff::PayoffMatrix;
use crate::strategy::{Move, OpponentPolicy};
use crate::MAX_ROUNDS;

/// Game lifecycle. `Idle` means no game has been started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Idle,
    Active,
    Finished,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::Idle => f.write_str("Idle"),
            GameState::Active => f.write_str("Active"),
            GameState::Finished => f.write_str("Finished"),
        }
    }
}

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based position in the history
    pub round_index: u8,
    pub player_move: Move,
    pub opponent_move: Move,
    pub player_payoff: i64,
    pub opponent_payoff: i64,
    /// Player balance after this round
    pub player_balance: i64,
    /// Opponent balance after this round
    pub opponent_balance: i64,
}

/// How the player fared against their own stake
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Final balances of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub game_id: u32,
    pub stake: i64,
    pub player_balance: i64,
    pub opponent_balance: i64,
    pub outcome: Outcome,
}

/// One simulation instance.
///
/// Fields are only reachable through accessors: every mutation goes through
/// [`Game::record_move`] or [`Game::resolve_round`], which keep
/// `history.len() == round`, `Finished <=> round == MAX_ROUNDS` and the
/// balance ledger in step. A failed call leaves the game untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Game {
    id: u32,
    state: GameState,
    round: u8,
    history: Vec<RoundResult>,
    pending_move: Option<Move>,
    player_balance: i64,
    opponent_balance: i64,
    stake: i64,
    payoffs: PayoffMatrix,
}

impl Game {
    /// Start an active game with both parties staked
    pub fn new(id: u32, stake: i64, payoffs: PayoffMatrix) -> Result<Self> {
        if stake <= 0 {
            return Err(EngineError::InvalidStake { stake });
        }
        payoffs.validate()?;

        info!(game_id = id, stake, "game started");

        Ok(Self {
            id,
            state: GameState::Active,
            round: 0,
            history: Vec::with_capacity(MAX_ROUNDS as usize),
            pending_move: None,
            player_balance: stake,
            opponent_balance: stake,
            stake,
            payoffs,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Rounds resolved so far
    pub fn round(&self) -> u8 {
        self.round
    }

    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    pub fn pending_move(&self) -> Option<Move> {
        self.pending_move
    }

    pub fn player_balance(&self) -> i64 {
        self.player_balance
    }

    pub fn opponent_balance(&self) -> i64 {
        self.opponent_balance
    }

    pub fn stake(&self) -> i64 {
        self.stake
    }

    pub fn payoffs(&self) -> &PayoffMatrix {
        &self.payoffs
    }

    /// Sum of payoffs across the history, (player, opponent).
    ///
    /// Partial sums can leave `i64` range under extreme matrices even though
    /// every balance stays in range; `None` in that case.
    pub fn payoff_totals(&self) -> Option<(i64, i64)> {
        let (player, opponent) = self.wide_payoff_totals();
        Some((i64::try_from(player).ok()?, i64::try_from(opponent).ok()?))
    }

    fn wide_payoff_totals(&self) -> (i128, i128) {
        self.history.iter().fold((0, 0), |(p, o), r| {
            (p + i128::from(r.player_payoff), o + i128::from(r.opponent_payoff))
        })
    }

    /// Check the cached balances against stake + payoff totals
    pub fn reconciles(&self) -> bool {
        let (player_total, opponent_total) = self.wide_payoff_totals();
        let stake = i128::from(self.stake);
        self.history.len() == self.round as usize
            && i128::from(self.player_balance) == stake + player_total
            && i128::from(self.opponent_balance) == stake + opponent_total
    }

    /// Select the player's move for the current round.
    ///
    /// Overwrites an earlier selection; does not advance the round.
    pub fn record_move(&mut self, mv: Move) -> Result<()> {
        self.require_active()?;

        if let Some(previous) = self.pending_move.replace(mv) {
            debug!(game_id = self.id, %previous, current = %mv, "pending move replaced");
        }
        Ok(())
    }

    /// Resolve the current round against the opponent's move.
    ///
    /// The policy is consulted once, and only after the round is known to be
    /// playable: if either opponent reply would overflow a balance the call
    /// fails with `Overflow` without touching the policy, so a retry sees the
    /// same opponent. On success the round is appended, balances move, the
    /// pending move is cleared and the game finishes when the last round is
    /// played.
    pub fn resolve_round<P>(&mut self, policy: &mut P) -> Result<&RoundResult>
    where
        P: OpponentPolicy + ?Sized,
    {
        self.require_active()?;
        let player_move = self.pending_move.ok_or(EngineError::NoPendingMove)?;

        for reply in [Move::Cooperate, Move::Defect] {
            self.balances_after(player_move, reply)?;
        }

        let opponent_move = policy.next_move(&self.history, self.round);
        let (player_payoff, opponent_payoff) = self.payoffs.payoff(player_move, opponent_move);
        let (player_balance, opponent_balance) = self.balances_after(player_move, opponent_move)?;
        let round = self.round + 1;

        let result = RoundResult {
            round_index: round,
            player_move,
            opponent_move,
            player_payoff,
            opponent_payoff,
            player_balance,
            opponent_balance,
        };

        info!(
            game_id = self.id,
            round,
            %player_move,
            %opponent_move,
            player_payoff,
            opponent_payoff,
            player_balance,
            opponent_balance,
            "round resolved"
        );

        self.history.push(result);
        self.round = round;
        self.player_balance = player_balance;
        self.opponent_balance = opponent_balance;
        self.pending_move = None;

        if self.round == MAX_ROUNDS {
            self.state = GameState::Finished;
            info!(
                game_id = self.id,
                player_balance,
                opponent_balance,
                "game finished"
            );
        }

        Ok(&self.history[self.history.len() - 1])
    }

    /// Final balances; only available once the game is finished
    pub fn settle(&self) -> Result<Settlement> {
        if self.state != GameState::Finished {
            return Err(EngineError::GameNotFinished { state: self.state });
        }

        let outcome = match self.player_balance.cmp(&self.stake) {
            core::cmp::Ordering::Greater => Outcome::Win,
            core::cmp::Ordering::Less => Outcome::Loss,
            core::cmp::Ordering::Equal => Outcome::Draw,
        };

        Ok(Settlement {
            game_id: self.id,
            stake: self.stake,
            player_balance: self.player_balance,
            opponent_balance: self.opponent_balance,
            outcome,
        })
    }

    fn balances_after(&self, player_move: Move, opponent_move: Move) -> Result<(i64, i64)> {
        let (player_payoff, opponent_payoff) = self.payoffs.payoff(player_move, opponent_move);
        let player = self
            .player_balance
            .checked_add(player_payoff)
            .ok_or(EngineError::Overflow)?;
        let opponent = self
            .opponent_balance
            .checked_add(opponent_payoff)
            .ok_or(EngineError::Overflow)?;
        Ok((player, opponent))
    }

    fn require_active(&self) -> Result<()> {
        if self.state != GameState::Active {
            return Err(EngineError::GameNotActive { state: self.state });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{Opponent, Scripted};
    use proptest::prelude::*;

    fn new_game(stake: i64) -> Game {
        Game::new(1, stake, PayoffMatrix::CLASSIC).unwrap()
    }

    fn play(game: &mut Game, player: Move, policy: &mut impl OpponentPolicy) {
        game.record_move(player).unwrap();
        game.resolve_round(policy).unwrap();
    }

    #[test]
    fn test_new_game_is_active_and_staked() {
        let game = new_game(25);
        assert_eq!(game.state(), GameState::Active);
        assert_eq!(game.round(), 0);
        assert!(game.history().is_empty());
        assert_eq!(game.pending_move(), None);
        assert_eq!(game.player_balance(), 25);
        assert_eq!(game.opponent_balance(), 25);
        assert_eq!(game.stake(), 25);
    }

    #[test]
    fn test_non_positive_stake_rejected() {
        assert_eq!(
            Game::new(1, 0, PayoffMatrix::CLASSIC),
            Err(EngineError::InvalidStake { stake: 0 })
        );
        assert_eq!(
            Game::new(1, -5, PayoffMatrix::CLASSIC),
            Err(EngineError::InvalidStake { stake: -5 })
        );
    }

    #[test]
    fn test_cooperate_against_defect() {
        let mut game = new_game(25);
        game.record_move(Move::Cooperate).unwrap();
        let result = game.resolve_round(&mut Scripted::constant(Move::Defect)).unwrap().clone();

        assert_eq!(result.round_index, 1);
        assert_eq!(result.player_move, Move::Cooperate);
        assert_eq!(result.opponent_move, Move::Defect);
        assert_eq!(result.player_payoff, -3);
        assert_eq!(result.opponent_payoff, 4);
        assert_eq!(game.player_balance(), 22);
        assert_eq!(game.opponent_balance(), 29);
        assert_eq!(game.state(), GameState::Active);
        assert_eq!(game.round(), 1);
        assert_eq!(game.pending_move(), None);
    }

    #[test]
    fn test_defect_against_always_cooperate() {
        let mut game = new_game(25);
        let mut opponent = Opponent::new(crate::Strategy::AlwaysCooperate, 0);
        for _ in 0..MAX_ROUNDS {
            play(&mut game, Move::Defect, &mut opponent);
        }

        assert_eq!(game.payoff_totals(), Some((20, -15)));
        assert_eq!(game.player_balance(), 45);
        assert_eq!(game.opponent_balance(), 10);
        assert_eq!(game.state(), GameState::Finished);
    }

    #[test]
    fn test_finishes_after_five_rounds() {
        let mut game = new_game(25);
        let mut opponent = Opponent::random(42);
        for i in 0..MAX_ROUNDS {
            assert_eq!(game.state(), GameState::Active, "finished early at round {}", i);
            play(&mut game, Move::Cooperate, &mut opponent);
        }
        assert_eq!(game.state(), GameState::Finished);
        assert_eq!(game.history().len(), 5);
        assert_eq!(game.round(), MAX_ROUNDS);
    }

    #[test]
    fn test_resolve_without_move() {
        let mut game = new_game(25);
        let err = game.resolve_round(&mut Scripted::constant(Move::Defect)).unwrap_err();
        assert_eq!(err, EngineError::NoPendingMove);
        assert_eq!(game.round(), 0);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_resolve_without_move_does_not_consult_policy() {
        let mut game = new_game(25);
        let mut calls = 0;
        let mut policy = crate::strategy::from_fn(|_, _| {
            calls += 1;
            Move::Cooperate
        });
        assert!(game.resolve_round(&mut policy).is_err());
        drop(policy);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_finished_game_rejects_moves() {
        let mut game = new_game(25);
        let mut opponent = Scripted::constant(Move::Cooperate);
        for _ in 0..MAX_ROUNDS {
            play(&mut game, Move::Cooperate, &mut opponent);
        }
        let before = game.clone();

        assert_eq!(
            game.record_move(Move::Defect),
            Err(EngineError::GameNotActive { state: GameState::Finished })
        );
        assert_eq!(
            game.resolve_round(&mut opponent).unwrap_err(),
            EngineError::GameNotActive { state: GameState::Finished }
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_move_can_be_changed_before_resolve() {
        let mut game = new_game(25);
        game.record_move(Move::Cooperate).unwrap();
        game.record_move(Move::Defect).unwrap();
        assert_eq!(game.pending_move(), Some(Move::Defect));
        assert_eq!(game.round(), 0);

        let result = game.resolve_round(&mut Scripted::constant(Move::Cooperate)).unwrap();
        assert_eq!(result.player_move, Move::Defect);
    }

    #[test]
    fn test_policy_called_once_per_round_with_history() {
        let mut game = new_game(25);
        let mut seen = Vec::new();
        let mut policy = crate::strategy::from_fn(|history: &[RoundResult], round| {
            seen.push((history.len(), round));
            Move::Cooperate
        });
        for _ in 0..3 {
            game.record_move(Move::Cooperate).unwrap();
            game.resolve_round(&mut policy).unwrap();
        }
        drop(policy);
        assert_eq!(seen, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_running_balances_in_history() {
        let mut game = new_game(15);
        let mut opponent = Scripted::new(vec![Move::Cooperate, Move::Defect, Move::Defect]);
        play(&mut game, Move::Cooperate, &mut opponent); // +2 / +2
        play(&mut game, Move::Cooperate, &mut opponent); // -3 / +4
        play(&mut game, Move::Defect, &mut opponent); // -1 / -1

        let balances: Vec<_> = game
            .history()
            .iter()
            .map(|r| (r.player_balance, r.opponent_balance))
            .collect();
        assert_eq!(balances, vec![(17, 17), (14, 21), (13, 20)]);
        assert!(game.reconciles());
    }

    #[test]
    fn test_settle_requires_finished() {
        let game = new_game(25);
        assert_eq!(
            game.settle(),
            Err(EngineError::GameNotFinished { state: GameState::Active })
        );
    }

    #[test]
    fn test_settle_outcomes() {
        let mut win = new_game(25);
        let mut lose = new_game(25);
        let mut draw = new_game(25);
        let mut cooperator = Scripted::constant(Move::Cooperate);
        let mut defector = Scripted::constant(Move::Defect);
        // -1 x4, +4 once: back to the stake
        let mut even = Scripted::new(vec![
            Move::Defect, Move::Defect, Move::Defect, Move::Defect, Move::Cooperate,
        ]);

        for _ in 0..MAX_ROUNDS {
            play(&mut win, Move::Defect, &mut cooperator);
            play(&mut lose, Move::Cooperate, &mut defector);
            play(&mut draw, Move::Defect, &mut even);
        }

        let settled = win.settle().unwrap();
        assert_eq!(settled.outcome, Outcome::Win);
        assert_eq!(settled.player_balance, 45);
        assert_eq!(settled.opponent_balance, 10);

        let settled = lose.settle().unwrap();
        assert_eq!(settled.outcome, Outcome::Loss);
        assert_eq!(settled.player_balance, 10);

        let settled = draw.settle().unwrap();
        assert_eq!(settled.outcome, Outcome::Draw);
        assert_eq!(settled.player_balance, 25);
        assert_eq!(settled.game_id, 1);
    }

    #[test]
    fn test_overflow_leaves_game_untouched() {
        let mut game = Game::new(1, i64::MAX - 1, PayoffMatrix::CLASSIC).unwrap();
        game.record_move(Move::Defect).unwrap();
        let before = game.clone();

        let mut calls = 0;
        let mut policy = crate::strategy::from_fn(|_, _| {
            calls += 1;
            Move::Cooperate
        });
        let err = game.resolve_round(&mut policy).unwrap_err();
        drop(policy);
        assert_eq!(err, EngineError::Overflow);
        assert_eq!(game, before);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_overflowing_round_does_not_advance_scripted_opponent() {
        let mut game = Game::new(1, i64::MAX - 1, PayoffMatrix::CLASSIC).unwrap();
        let mut script = Scripted::new(vec![Move::Defect, Move::Cooperate]);
        game.record_move(Move::Cooperate).unwrap();
        assert_eq!(game.resolve_round(&mut script).unwrap_err(), EngineError::Overflow);

        // The script still starts from its first move
        assert_eq!(script.next_move(&[], 0), Move::Defect);
    }

    #[test]
    fn test_extreme_payoffs_reconcile_without_panicking() {
        let payoffs = PayoffMatrix { temptation: 3, reward: 2, punishment: -1, sucker: i64::MIN / 2 };
        assert!(payoffs.validate().is_ok());

        let mut game = Game::new(1, 5, payoffs).unwrap();
        play(&mut game, Move::Cooperate, &mut Scripted::constant(Move::Defect));
        play(&mut game, Move::Cooperate, &mut Scripted::constant(Move::Defect));
        play(&mut game, Move::Defect, &mut Scripted::constant(Move::Defect));

        // Balances stay in range while the raw payoff sum does not
        assert_eq!(game.player_balance(), i64::MIN + 4);
        assert_eq!(game.opponent_balance(), 10);
        assert_eq!(game.payoff_totals(), None);
        assert!(game.reconciles());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = new_game(25);
        play(&mut game, Move::Cooperate, &mut Scripted::constant(Move::Defect));
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["state"], "Active");
        assert_eq!(json["round"], 1);
        assert_eq!(json["player_balance"], 22);
        assert_eq!(json["history"][0]["opponent_move"], "Defect");
    }

    fn arb_move() -> impl Strategy<Value = Move> {
        prop_oneof![Just(Move::Cooperate), Just(Move::Defect)]
    }

    proptest! {
        /// The ledger reconciles after every resolved round, whatever is played.
        #[test]
        fn prop_ledger_reconciles(
            stake in 1i64..10_000,
            moves in proptest::collection::vec((arb_move(), arb_move()), 0..=5),
        ) {
            let mut game = new_game(stake);
            let opponent_moves: Vec<Move> = moves.iter().map(|(_, o)| *o).collect();
            let mut opponent = Scripted::new(opponent_moves);

            for (i, (player, _)) in moves.iter().enumerate() {
                game.record_move(*player).unwrap();
                game.resolve_round(&mut opponent).unwrap();

                prop_assert_eq!(game.round() as usize, i + 1);
                prop_assert_eq!(game.history().len(), game.round() as usize);
                prop_assert!(game.reconciles());
                prop_assert_eq!(game.pending_move(), None);
                prop_assert_eq!(
                    game.state() == GameState::Finished,
                    game.round() == MAX_ROUNDS
                );
            }

            let (player_total, _) = game.payoff_totals().unwrap();
            prop_assert_eq!(game.player_balance(), stake + player_total);
        }

        /// Each round's payoffs come straight from the matrix.
        #[test]
        fn prop_round_payoffs_match_matrix(player in arb_move(), opponent in arb_move()) {
            let mut game = new_game(25);
            game.record_move(player).unwrap();
            let result = game.resolve_round(&mut Scripted::constant(opponent)).unwrap();
            prop_assert_eq!(
                (result.player_payoff, result.opponent_payoff),
                crate::payoff(player, opponent)
            );
        }
    }
}
