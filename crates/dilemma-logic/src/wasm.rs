//! WASM bindings for the browser front end

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;
use crate::{payoff, Engine, EngineConfig, Move, Opponent, Strategy};

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn parse_move(mv: &str) -> Result<Move, JsError> {
    mv.parse::<Move>().map_err(|e| JsError::new(&e))
}

fn browser_seed() -> u64 {
    (js_sys::Math::random() * (1u64 << 53) as f64) as u64
}

fn build_session(opponent: Opponent, config_json: Option<String>) -> Result<GameSession, JsError> {
    let config = match config_json {
        Some(json) => EngineConfig::from_json(&json).map_err(|e| JsError::new(&e.to_string()))?,
        None => EngineConfig::default(),
    };
    let engine = Engine::with_config(config, opponent)
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(GameSession { engine })
}

/// One player's session: holds at most one game at a time
#[wasm_bindgen]
pub struct GameSession {
    engine: Engine<Opponent>,
}

#[wasm_bindgen]
impl GameSession {
    /// Create a session against `strategy` (default `Random`).
    ///
    /// `"Roster"` draws a persona from the roster at every game start.
    ///
    /// `config_json` follows `EngineConfig`; omitted fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(strategy: Option<String>, config_json: Option<String>) -> Result<GameSession, JsError> {
        let strategy = match strategy.as_deref() {
            None => Strategy::Random,
            Some("Roster") => {
                return build_session(Opponent::from_roster(browser_seed()), config_json);
            }
            Some(name) => name
                .parse::<Strategy>()
                .map_err(|e| JsError::new(&e))?,
        };
        build_session(Opponent::new(strategy, browser_seed()), config_json)
    }

    /// Start a new game and return its snapshot
    pub fn start(&mut self, stake: Option<i32>) -> Result<JsValue, JsError> {
        let game = self
            .engine
            .start(stake.map(i64::from))
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_js(game)
    }

    /// Select "Cooperate" or "Defect" (or 1 / 2) for the current round
    #[wasm_bindgen(js_name = recordMove)]
    pub fn record_move(&mut self, mv: &str) -> Result<JsValue, JsError> {
        let mv = parse_move(mv)?;
        let game = self
            .engine
            .record_move(mv)
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_js(game)
    }

    #[wasm_bindgen(js_name = resolveRound)]
    pub fn resolve_round(&mut self) -> Result<JsValue, JsError> {
        let game = self
            .engine
            .resolve_round()
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_js(game)
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Current game, or `null` when idle
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        match self.engine.game() {
            Some(game) => to_js(game),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn state(&self) -> String {
        self.engine.state().to_string()
    }

    /// Final balances and outcome of a finished game
    pub fn settle(&self) -> Result<JsValue, JsError> {
        let settlement = self
            .engine
            .settle()
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&settlement)
    }

    /// How the opponent played, for the post-game reveal
    #[wasm_bindgen(js_name = opponentDescription)]
    pub fn opponent_description(&self) -> String {
        self.engine.policy().strategy.describe().to_string()
    }
}

#[derive(serde::Serialize)]
struct PayoffRow {
    player: Move,
    opponent: Move,
    player_payoff: i64,
    opponent_payoff: i64,
}

/// The classic payoff table, one row per move pair
#[wasm_bindgen]
pub fn get_payoff_table() -> Result<JsValue, JsError> {
    let moves = [Move::Cooperate, Move::Defect];
    let rows: Vec<PayoffRow> = moves
        .iter()
        .flat_map(|p| moves.iter().map(move |o| (*p, *o)))
        .map(|(player, opponent)| {
            let (player_payoff, opponent_payoff) = payoff(player, opponent);
            PayoffRow { player, opponent, player_payoff, opponent_payoff }
        })
        .collect();
    to_js(&rows)
}

#[derive(serde::Serialize)]
struct StrategyInfo {
    id: String,
    description: &'static str,
}

/// All opponent strategies a session can be created with
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = [
        Strategy::Random,
        Strategy::AlwaysCooperate,
        Strategy::AlwaysDefect,
        Strategy::TitForTat,
        Strategy::GrimTrigger,
        Strategy::Pavlov,
    ]
    .iter()
    .map(|s| StrategyInfo {
        id: format!("{:?}", s),
        description: s.describe(),
    })
    .collect();
    to_js(&types)
}
