//! WebAssembly module for the farm inventory pages
//!
//! Exposes the same ledger and feed-cost computations the server runs, so
//! entry previews and the ratio editor agree with what gets stored.

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

use shared::{
    calculate_feed_cost, compute_ending, parse_quantity, validate_ratio_percentages, FeedInputs,
    Ingredient, RatioTable,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"farm inventory wasm loaded".into());
}

/// Ending stock from raw form values, coerced the same way the server does
#[wasm_bindgen]
pub fn compute_ending_stock(opening: &str, received: &str, dispatched: &str, lost: &str) -> f64 {
    compute_ending(
        parse_quantity(opening),
        parse_quantity(received),
        parse_quantity(dispatched),
        parse_quantity(lost),
    ) as f64
}

/// Whether a stock level is at or below its minimum
#[wasm_bindgen]
pub fn is_low_stock(stock: f64, minimum: f64) -> bool {
    stock <= minimum
}

/// Validate ratio editor percentages, e.g. `{"Maize": 70, "Oil Cakes": 20, ...}`
#[wasm_bindgen]
pub fn validate_ratios(percentages_json: &str) -> Result<(), JsValue> {
    check_ratios(percentages_json).map_err(|e| JsValue::from_str(&e))
}

/// Feed-cost breakdown as JSON.
///
/// `ratios_json` is the stored override document; an empty string uses the
/// default ratios.
#[wasm_bindgen]
pub fn calculate_feed(ratios_json: &str, inputs_json: &str) -> Result<String, JsValue> {
    feed_breakdown(ratios_json, inputs_json).map_err(|e| JsValue::from_str(&e))
}

fn check_ratios(percentages_json: &str) -> Result<(), String> {
    let percentages: BTreeMap<Ingredient, i64> = serde_json::from_str(percentages_json)
        .map_err(|e| format!("Invalid percentages JSON: {}", e))?;
    validate_ratio_percentages(&percentages).map_err(|e| e.to_string())
}

fn feed_breakdown(ratios_json: &str, inputs_json: &str) -> Result<String, String> {
    let ratios = if ratios_json.trim().is_empty() {
        RatioTable::default()
    } else {
        let doc: serde_json::Value = serde_json::from_str(ratios_json)
            .map_err(|e| format!("Invalid ratios JSON: {}", e))?;
        RatioTable::from_overrides(&doc)
    };
    let inputs: FeedInputs = serde_json::from_str(inputs_json)
        .map_err(|e| format!("Invalid inputs JSON: {}", e))?;

    let breakdown = calculate_feed_cost(&ratios, &inputs).map_err(|e| e.to_string())?;
    serde_json::to_string(&breakdown).map_err(|e| e.to_string())
}
