#![cfg(target_arch = "wasm32")]

use rummy_engine::wasm_api::{find_opponent_move, get_build_commit};
use serde_json::Value;
use wasm_bindgen_test::*;

fn call(hand: &str, board: &str, config: &str) -> Value {
    serde_json::from_str(&find_opponent_move(hand, board, config, 42)).unwrap()
}

#[wasm_bindgen_test]
fn test_plays_run_from_hand() {
    let response = call(r#"["r1", "r2", "r3", "k9"]"#, "[]", "");
    assert_eq!(response["success"], true);
    assert_eq!(response["strategy"], "simple");
    assert_eq!(response["score"], 3);
    assert_eq!(response["board"], serde_json::json!([["r1", "r2", "r3"]]));
    assert_eq!(response["hand_tiles_used"], serde_json::json!(["r1", "r2", "r3"]));
}

#[wasm_bindgen_test]
fn test_extends_board_run() {
    let response = call(r#"["b7"]"#, r#"[{"type": "run", "tiles": ["b4", "b5", "b6"]}]"#, "{}");
    assert_eq!(response["strategy"], "moderate");
    assert_eq!(response["board"], serde_json::json!([["b4", "b5", "b6", "b7"]]));
}

#[wasm_bindgen_test]
fn test_no_move_is_reported() {
    let response = call(r#"["k9"]"#, "[]", "");
    assert_eq!(response["success"], false);
    assert_eq!(response["score"], 0);
    assert!(response.get("board").is_none());
    assert_eq!(response["reports"].as_array().unwrap().len(), 4);
}

#[wasm_bindgen_test]
fn test_bad_input_is_an_error() {
    let bad_tile = call(r#"["x1"]"#, "[]", "");
    assert_eq!(bad_tile["success"], false);
    assert!(bad_tile["error"].as_str().unwrap().contains("Invalid hand JSON"));

    let bad_meld = call("[]", r#"[{"type": "group", "tiles": ["r1", "r2", "r3"]}]"#, "");
    assert!(bad_meld["error"].as_str().unwrap().contains("Invalid meld"));

    let bad_config = call("[]", "[]", r#"{"group_sample_limit": 0}"#);
    assert!(bad_config["error"].as_str().unwrap().contains("group_sample_limit"));

    let third_copy = call(r#"["r1", "r1", "r1"]"#, "[]", "");
    assert!(third_copy["error"].as_str().unwrap().contains("more than two copies"));
}

#[wasm_bindgen_test]
fn test_build_commit_is_set() {
    assert!(!get_build_commit().is_empty());
}
