//! WebAssembly module for the Shortfall Items desk form
//!
//! Provides client-side computation for:
//! - Source warehouse resolution
//! - Shortfall and draft shortfall arithmetic
//! - Grouping of shortfall rows by work order

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("shortfall-items wasm ready"));
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

fn to_decimal(name: &str, value: f64) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|_| format!("{} must be a finite number, got {}", name, value))
}

fn quantities(required_qty: f64, actual_qty: f64) -> Result<(Decimal, Decimal), String> {
    Ok((
        to_decimal("required_qty", required_qty)?,
        to_decimal("actual_qty", actual_qty)?,
    ))
}

/// Shortfall of an item, 0 when stock covers the requirement
#[wasm_bindgen]
pub fn compute_item_shortfall(required_qty: f64, actual_qty: f64) -> Result<f64, JsValue> {
    item_shortfall(required_qty, actual_qty).map_err(js_error)
}

/// Whether an item should appear on the shortfall report
#[wasm_bindgen]
pub fn has_shortfall(required_qty: f64, actual_qty: f64) -> Result<bool, JsValue> {
    let (required, actual) = quantities(required_qty, actual_qty).map_err(js_error)?;
    Ok(compute_shortfall(required, actual).is_some())
}

/// Shortfall of a requested item, clamped at zero
#[wasm_bindgen]
pub fn compute_request_shortfall(required_qty: f64, actual_qty: f64) -> Result<f64, JsValue> {
    request_shortfall(required_qty, actual_qty).map_err(js_error)
}

fn item_shortfall(required_qty: f64, actual_qty: f64) -> Result<f64, String> {
    let (required, actual) = quantities(required_qty, actual_qty)?;
    Ok(compute_shortfall(required, actual)
        .and_then(|s| s.to_f64())
        .unwrap_or(0.0))
}

fn request_shortfall(required_qty: f64, actual_qty: f64) -> Result<f64, String> {
    let (required, actual) = quantities(required_qty, actual_qty)?;
    Ok(compute_draft_shortfall(required, actual)
        .to_f64()
        .unwrap_or(0.0))
}

/// Resolve the source warehouse of a required item
///
/// Takes the item and work order as JSON and returns the warehouse name, or
/// an empty string when none resolves.
#[wasm_bindgen]
pub fn resolve_item_warehouse(item_json: &str, work_order_json: &str) -> Result<String, JsValue> {
    resolve_warehouse_json(item_json, work_order_json).map_err(js_error)
}

/// Group a JSON array of shortfall rows by work order
#[wasm_bindgen]
pub fn group_rows(rows_json: &str) -> Result<String, JsValue> {
    group_rows_json(rows_json).map_err(js_error)
}

fn resolve_warehouse_json(item_json: &str, work_order_json: &str) -> Result<String, String> {
    let item: RequiredItem =
        serde_json::from_str(item_json).map_err(|e| format!("Invalid item JSON: {}", e))?;
    let work_order: WorkOrder = serde_json::from_str(work_order_json)
        .map_err(|e| format!("Invalid work order JSON: {}", e))?;

    Ok(resolve_source_warehouse(&item, &work_order)
        .unwrap_or_default()
        .to_string())
}

fn group_rows_json(rows_json: &str) -> Result<String, String> {
    let rows: Vec<ShortfallRow> =
        serde_json::from_str(rows_json).map_err(|e| format!("Invalid rows JSON: {}", e))?;
    serde_json::to_string(&group_shortfall_rows(rows))
        .map_err(|e| format!("Failed to serialize groups: {}", e))
}
