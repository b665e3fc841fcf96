//! Opponent strategies and the policy seam the engine draws moves from

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::game::RoundResult;
use crate::random::SeededRng;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Cooperate => f.write_str("Cooperate"),
            Move::Defect => f.write_str("Defect"),
        }
    }
}

impl FromStr for Move {
    type Err = String;

    /// Accepts the move name in any case, or the front end's numeric
    /// encoding (1 = cooperate, 2 = defect)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cooperate" | "c" | "1" => Ok(Move::Cooperate),
            "defect" | "d" | "2" => Ok(Move::Defect),
            other => Err(format!("unknown move: {}", other)),
        }
    }
}

/// Source of the opponent's move for each round.
///
/// The engine calls `next_move` exactly once per resolved round, passing the
/// rounds completed so far and the 0-based index of the round being played.
pub trait OpponentPolicy {
    fn next_move(&mut self, history: &[RoundResult], round: u8) -> Move;

    /// Called by the engine each time it starts a game
    fn on_game_start(&mut self, _game_id: u32) {}
}

impl<P: OpponentPolicy + ?Sized> OpponentPolicy for &mut P {
    fn next_move(&mut self, history: &[RoundResult], round: u8) -> Move {
        (**self).next_move(history, round)
    }

    fn on_game_start(&mut self, game_id: u32) {
        (**self).on_game_start(game_id)
    }
}

impl<P: OpponentPolicy + ?Sized> OpponentPolicy for Box<P> {
    fn next_move(&mut self, history: &[RoundResult], round: u8) -> Move {
        (**self).next_move(history, round)
    }

    fn on_game_start(&mut self, game_id: u32) {
        (**self).on_game_start(game_id)
    }
}

/// Built-in opponent behaviour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Coin flip each round.
    Random,
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Copy the player's last move. Start with cooperate.
    TitForTat,
    /// Cooperate until the player defects once, then always defect.
    GrimTrigger,
    /// Win-stay, lose-switch: cooperate after matching moves, defect otherwise.
    Pavlov,
}

impl Strategy {
    /// Personas the scripted host picks from at game start
    pub const ROSTER: [Strategy; 3] = [
        Strategy::AlwaysCooperate,
        Strategy::AlwaysDefect,
        Strategy::TitForTat,
    ];

    /// Uniform pick from [`Strategy::ROSTER`]
    pub fn pick(rng: &mut SeededRng) -> Self {
        Self::ROSTER[rng.next_range(Self::ROSTER.len() as u32) as usize]
    }

    /// Post-game reveal of how the opponent played
    pub fn describe(&self) -> &'static str {
        match self {
            Strategy::Random => "I was just playing randomly this time!",
            Strategy::AlwaysCooperate => "I always chose to cooperate, no matter what you did!",
            Strategy::AlwaysDefect => "I always chose to defect, every single round!",
            Strategy::TitForTat => {
                "I copied your previous move each round. If you cooperated, I did too; if you defected, so did I!"
            }
            Strategy::GrimTrigger => "I cooperated until you defected once, then never forgave you.",
            Strategy::Pavlov => "I cooperated whenever we matched last round and defected when we didn't.",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Random
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Random" => Ok(Strategy::Random),
            "AlwaysCooperate" => Ok(Strategy::AlwaysCooperate),
            "AlwaysDefect" => Ok(Strategy::AlwaysDefect),
            "TitForTat" => Ok(Strategy::TitForTat),
            "GrimTrigger" => Ok(Strategy::GrimTrigger),
            "Pavlov" => Ok(Strategy::Pavlov),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Execute a strategy for one round
///
/// # Arguments
/// * `strategy` - The strategy to execute
/// * `history` - Rounds completed so far in this game
/// * `rng` - Random number generator, only consumed by `Random`
pub fn execute_strategy(strategy: Strategy, history: &[RoundResult], rng: &mut SeededRng) -> Move {
    match strategy {
        Strategy::Random => {
            if rng.next_bool() {
                Move::Cooperate
            } else {
                Move::Defect
            }
        }
        Strategy::AlwaysCooperate => Move::Cooperate,
        Strategy::AlwaysDefect => Move::Defect,
        Strategy::TitForTat => history
            .last()
            .map(|r| r.player_move)
            .unwrap_or(Move::Cooperate),
        Strategy::GrimTrigger => {
            if history.iter().any(|r| r.player_move == Move::Defect) {
                Move::Defect
            } else {
                Move::Cooperate
            }
        }
        Strategy::Pavlov => match history.last() {
            None => Move::Cooperate,
            Some(r) if r.player_move == r.opponent_move => Move::Cooperate,
            Some(_) => Move::Defect,
        },
    }
}

/// A built-in strategy bound to its own random stream.
///
/// Every game gets a fresh stream derived from the seed and the game id.
/// A roster opponent also draws a new persona for each game.
#[derive(Clone, Debug)]
pub struct Opponent {
    pub strategy: Strategy,
    roster: bool,
    seed: SeededRng,
    rng: SeededRng,
}

impl Opponent {
    pub fn new(strategy: Strategy, seed: u64) -> Self {
        let seed = SeededRng::new(seed);
        Self {
            strategy,
            roster: false,
            rng: seed.clone(),
            seed,
        }
    }

    /// Uniform random opponent
    pub fn random(seed: u64) -> Self {
        Self::new(Strategy::Random, seed)
    }

    /// Persona drawn from the roster, redrawn whenever a game starts
    pub fn from_roster(seed: u64) -> Self {
        let mut opponent = Self::new(Strategy::default(), seed);
        opponent.roster = true;
        opponent.strategy = Strategy::pick(&mut opponent.rng);
        opponent
    }
}

impl OpponentPolicy for Opponent {
    fn next_move(&mut self, history: &[RoundResult], _round: u8) -> Move {
        execute_strategy(self.strategy, history, &mut self.rng)
    }

    fn on_game_start(&mut self, game_id: u32) {
        self.rng = self.seed.for_game(game_id);
        if self.roster {
            self.strategy = Strategy::pick(&mut self.rng);
            debug!(game_id, strategy = ?self.strategy, "roster persona drawn");
        }
    }
}

/// Fixed move sequence, repeated from the start once exhausted.
/// An empty script cooperates.
#[derive(Clone, Debug, Default)]
pub struct Scripted {
    moves: Vec<Move>,
    cursor: usize,
}

impl Scripted {
    pub fn new(moves: impl Into<Vec<Move>>) -> Self {
        Self {
            moves: moves.into(),
            cursor: 0,
        }
    }

    /// Same move every round
    pub fn constant(mv: Move) -> Self {
        Self::new(vec![mv])
    }
}

impl OpponentPolicy for Scripted {
    fn next_move(&mut self, _history: &[RoundResult], _round: u8) -> Move {
        if self.moves.is_empty() {
            return Move::Cooperate;
        }
        let mv = self.moves[self.cursor % self.moves.len()];
        self.cursor += 1;
        mv
    }
}

/// Policy backed by a closure, see [`from_fn`]
#[derive(Clone, Debug)]
pub struct FromFn<F>(F);

/// Wrap `f(history, round)` as an [`OpponentPolicy`]
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&[RoundResult], u8) -> Move,
{
    FromFn(f)
}

impl<F> OpponentPolicy for FromFn<F>
where
    F: FnMut(&[RoundResult], u8) -> Move,
{
    fn next_move(&mut self, history: &[RoundResult], round: u8) -> Move {
        (self.0)(history, round)
    }
}
