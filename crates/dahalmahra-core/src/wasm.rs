//! WebAssembly bindings for the Dahalmahra engine.
//!
//! This module exposes a local four-seat game to JavaScript through wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::bot::{Bot, BotDifficulty};
use crate::card::{Card, Suit};
use crate::game::GameState;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Seat four players from a JSON array of names and start round one
    #[wasm_bindgen(constructor)]
    pub fn new(player_names_json: &str) -> Result<WasmGame, JsValue> {
        let player_names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;

        let mut state = GameState::new("local");
        for name in player_names {
            state.add_player(name).map_err(to_js)?;
        }
        state.set_up_teams().map_err(to_js)?;
        state.start_new_round().map_err(to_js)?;

        Ok(WasmGame { state })
    }

    /// Get the full game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get one seat's view as JSON
    #[wasm_bindgen(js_name = getView)]
    pub fn get_view(&self, player: u8) -> Result<String, JsValue> {
        let view = self.state.view_for(player).map_err(to_js)?;
        Ok(serde_json::to_string(&view).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Seat to play, if cards are being played
    #[wasm_bindgen(js_name = getCurrentTurn)]
    pub fn get_current_turn(&self) -> Option<u8> {
        self.state.current_turn()
    }

    /// Legal cards for a seat as a JSON array
    #[wasm_bindgen(js_name = getPlayableCards)]
    pub fn get_playable_cards(&self, player: u8) -> String {
        serde_json::to_string(&self.state.playable_cards(player)).unwrap_or_else(|_| "[]".to_string())
    }

    /// Start the next round once the previous one is archived
    #[wasm_bindgen(js_name = startNewRound)]
    pub fn start_new_round(&mut self) -> Result<String, JsValue> {
        let events = self.state.start_new_round().map_err(to_js)?;
        Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Name the master suit, e.g. `"Hearts"`
    #[wasm_bindgen(js_name = chooseMasterSuit)]
    pub fn choose_master_suit(&mut self, player: u8, suit_json: &str) -> Result<String, JsValue> {
        let suit: Suit = serde_json::from_str(suit_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid suit JSON: {}", e)))?;
        self.apply(player, GameAction::ChooseMasterSuit(suit))
    }

    /// Play a card given as `{"suit": ..., "rank": ...}`
    #[wasm_bindgen(js_name = playCard)]
    pub fn play_card(&mut self, player: u8, card_json: &str) -> Result<String, JsValue> {
        let card: Card = serde_json::from_str(card_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid card JSON: {}", e)))?;
        self.apply(player, GameAction::PlayCard(card))
    }

    /// Get a bot's suggested action for a seat
    /// difficulty: "Easy" or "Medium"
    #[wasm_bindgen(js_name = getBotAction)]
    pub fn get_bot_action(&self, player: u8, difficulty: &str) -> String {
        let diff = match difficulty {
            "Easy" => BotDifficulty::Easy,
            _ => BotDifficulty::Medium,
        };

        let mut bot = Bot::new(player, diff);
        match bot.choose_action(&self.state) {
            Some(action) => serde_json::to_string(&action).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }
}

impl WasmGame {
    fn apply(&mut self, player: u8, action: GameAction) -> Result<String, JsValue> {
        let events = self.state.apply_action(player, action).map_err(to_js)?;
        Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
    }
}

fn to_js(err: crate::game::GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
