//! WASM bindings for the browser worker.
//!
//! The worker posts `{ state, timeLimit }` and expects `{ move }` back; the
//! state and move use the same JSON shapes as the CLI.

use gobblet_core::{GameState, MoveRecord, StateRecord};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use crate::engine::{budget_from_millis, Engine};

/// Choose a move for `state` within `time_limit_ms` milliseconds.
/// Returns a move record, or null when there is no legal move.
#[wasm_bindgen(js_name = chooseMove)]
pub fn choose_move(state: JsValue, time_limit_ms: f64) -> Result<JsValue, JsError> {
    let record: StateRecord = serde_wasm_bindgen::from_value(state)?;
    let state = GameState::try_from(&record)?;
    let budget = budget_from_millis(time_limit_ms);

    let chosen = Engine::default().choose_move(&state, budget)?;
    // json_compatible turns `None` into null instead of undefined.
    Ok(chosen.map(MoveRecord::from).serialize(&Serializer::json_compatible())?)
}

/// Legal moves for `state`, as move records.
#[wasm_bindgen(js_name = legalMoves)]
pub fn legal_moves(state: JsValue) -> Result<JsValue, JsError> {
    let record: StateRecord = serde_wasm_bindgen::from_value(state)?;
    let state = GameState::try_from(&record)?;
    let moves: Vec<MoveRecord> = state.generate_moves().into_iter().map(MoveRecord::from).collect();
    Ok(serde_wasm_bindgen::to_value(&moves)?)
}
