use crate::solver::StrategyReport;
use crate::{Board, Hand, Meld, MoveSearchEngine, SearchConfig, Strategy, Tile, classify};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Result of an opponent move search
#[derive(Serialize)]
pub struct MoveResponse {
    /// Whether a move that places at least one tile was found
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    pub score: i32,
    /// Every set on the board after the move
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Vec<Vec<Tile>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_tiles_used: Option<Vec<Tile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub candidates_evaluated: usize,
    pub elapsed_ms: f64,
    pub reports: Vec<StrategyReport>,
}

impl MoveResponse {
    fn failure(error: String) -> Self {
        MoveResponse {
            success: false,
            strategy: None,
            score: 0,
            board: None,
            hand_tiles_used: None,
            error: Some(error),
            candidates_evaluated: 0,
            elapsed_ms: 0.0,
            reports: Vec::new(),
        }
    }
}

/// Main WASM API: find the computer opponent's move
///
/// # Arguments
/// * `hand_json` - JSON array of tile strings (e.g., ["r1", "b5", "k13"])
/// * `board_json` - JSON array of meld objects (e.g., [{"type": "run", "tiles": ["r1", "r2", "r3"]}])
/// * `config_json` - Search configuration object; empty string for defaults
/// * `seed` - Seed for the search's random sampling
///
/// # Returns
/// JSON string with MoveResponse containing success, the new board, or error
#[wasm_bindgen]
pub fn find_opponent_move(hand_json: &str, board_json: &str, config_json: &str, seed: u64) -> String {
    let response = find_internal(hand_json, board_json, config_json, seed).unwrap_or_else(MoveResponse::failure);
    serde_json::to_string(&response)
        .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e))
}

fn find_internal(hand_json: &str, board_json: &str, config_json: &str, seed: u64) -> Result<MoveResponse, String> {
    let tiles: Vec<Tile> = serde_json::from_str(hand_json).map_err(|e| format!("Invalid hand JSON: {}", e))?;
    let hand = Hand::from_tiles(tiles);

    let melds: Vec<Meld> = serde_json::from_str(board_json).map_err(|e| format!("Invalid board JSON: {}", e))?;
    for meld in &melds {
        if classify(&meld.tiles) != Some(meld.meld_type) {
            let tiles: Vec<String> = meld.tiles.iter().map(Tile::to_string).collect();
            return Err(format!("Invalid meld: [{}]", tiles.join(", ")));
        }
    }
    let sets: Vec<&[Tile]> = melds.iter().map(|meld| meld.tiles.as_slice()).collect();
    let board = Board::from_sets(&sets).map_err(|e| e.to_string())?;

    let config = if config_json.trim().is_empty() {
        SearchConfig::default()
    } else {
        SearchConfig::from_json(config_json).map_err(|e| e.to_string())?
    };

    let mut engine = MoveSearchEngine::seeded(config, seed);
    let result = engine.find_move(&board, &hand).map_err(|e| e.to_string())?;
    let summary = result.chosen.as_ref().map(|chosen| chosen.summary());

    Ok(MoveResponse {
        success: summary.is_some(),
        strategy: result.strategy,
        score: result.score(),
        error: summary.is_none().then(|| "No beneficial move found".to_string()),
        board: summary.as_ref().map(|s| s.sets.clone()),
        hand_tiles_used: summary.map(|s| s.hand_tiles_used),
        candidates_evaluated: result.candidates_evaluated,
        elapsed_ms: result.elapsed_ms,
        reports: result.reports,
    })
}

/// Get the git commit hash that this WASM module was built from
///
/// Returns the first 8 characters of the commit hash, or "unknown" if not available
#[wasm_bindgen]
pub fn get_build_commit() -> String {
    env!("BUILD_COMMIT").to_string()
}
