//! Shortfall arithmetic and document validation
//!
//! Everything here is pure: no fetching, no clocks. The backend scanner and
//! the desk form bindings both build on these functions.

use rust_decimal::Decimal;

use crate::models::{
    BinSnapshot, DraftReportLine, MaterialRequestItem, RequiredItem, ShortfallGroup, ShortfallRow,
    WorkOrder,
};
use crate::types::NOT_AVAILABLE;

// ============================================================================
// Warehouse Resolution
// ============================================================================

/// Treat blank link fields as unset
pub fn normalize_link(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
}

/// Resolve the warehouse a required item is drawn from
///
/// Order: item override, work order source warehouse, work order WIP warehouse.
pub fn resolve_source_warehouse<'a>(
    item: &'a RequiredItem,
    work_order: &'a WorkOrder,
) -> Option<&'a str> {
    [
        item.source_warehouse.as_deref(),
        work_order.source_warehouse.as_deref(),
        work_order.wip_warehouse.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|w| !w.trim().is_empty())
}

// ============================================================================
// Shortfall Arithmetic
// ============================================================================

/// Shortfall of an actionable item, `None` when stock covers the requirement
pub fn compute_shortfall(required_qty: Decimal, actual_qty: Decimal) -> Option<Decimal> {
    let shortfall = required_qty - actual_qty;
    (shortfall > Decimal::ZERO).then_some(shortfall)
}

/// Shortfall of an already requested item, never negative
pub fn compute_draft_shortfall(required_qty: Decimal, actual_qty: Decimal) -> Decimal {
    (required_qty - actual_qty).max(Decimal::ZERO)
}

/// Build the report row for one required item, if it is short
pub fn build_shortfall_row(
    work_order: &WorkOrder,
    item: &RequiredItem,
    source_warehouse: &str,
    bin: Option<BinSnapshot>,
) -> Option<ShortfallRow> {
    let bin = BinSnapshot::or_empty(bin);
    let shortfall = compute_shortfall(item.required_qty, bin.actual_qty)?;

    Some(ShortfallRow {
        work_order: work_order.name.clone(),
        work_order_status: work_order.status.clone(),
        item_code: item.item_code.clone(),
        source_warehouse: source_warehouse.to_string(),
        target_warehouse: item.warehouse.clone(),
        required_qty: item.required_qty,
        actual_qty: bin.actual_qty,
        projected_qty: bin.projected_qty,
        shortfall,
    })
}

/// Build the draft report line for one request line
///
/// `matched` is the work order item with the same item code. The required
/// quantity is the work order's current requirement when matched, otherwise
/// the quantity on the request line.
pub fn build_draft_line(
    line: &MaterialRequestItem,
    matched: Option<&RequiredItem>,
    bin: Option<BinSnapshot>,
) -> DraftReportLine {
    let bin = BinSnapshot::or_empty(bin);
    let required_qty = matched.map(|i| i.required_qty).unwrap_or(line.qty);

    DraftReportLine {
        item_code: line.item_code.clone(),
        source_warehouse: draft_source_warehouse(matched)
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        target_warehouse: line
            .warehouse
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        required_qty,
        actual_qty: bin.actual_qty,
        projected_qty: bin.projected_qty,
        shortfall: compute_draft_shortfall(required_qty, bin.actual_qty),
    }
}

/// Source warehouse shown on a draft line, taken from the matched item only
pub fn draft_source_warehouse(matched: Option<&RequiredItem>) -> Option<&str> {
    matched
        .and_then(|i| i.source_warehouse.as_deref())
        .filter(|w| !w.trim().is_empty())
}

/// Group rows by work order, keeping first-seen order of groups and rows
pub fn group_shortfall_rows(rows: Vec<ShortfallRow>) -> Vec<ShortfallGroup> {
    let mut groups: Vec<ShortfallGroup> = Vec::new();

    for row in rows {
        match groups.iter_mut().find(|g| g.work_order == row.work_order) {
            Some(group) => group.rows.push(row),
            None => groups.push(ShortfallGroup {
                work_order: row.work_order.clone(),
                work_order_status: row.work_order_status.clone(),
                rows: vec![row],
            }),
        }
    }

    groups
}

// ============================================================================
// Document Validations
// ============================================================================

/// Validate a document name (work order, material request)
pub fn validate_document_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Document name cannot be empty");
    }
    if name.len() > 140 {
        return Err("Document name must be at most 140 characters");
    }
    if name.contains('/') {
        return Err("Document name cannot contain '/'");
    }
    Ok(())
}

/// Validate an item code
pub fn validate_item_code(item_code: &str) -> Result<(), &'static str> {
    if item_code.trim().is_empty() {
        return Err("Item code cannot be empty");
    }
    Ok(())
}

/// Validate a required or requested quantity
pub fn validate_quantity(qty: Decimal) -> Result<(), &'static str> {
    if qty < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

/// Validate every required item of a work order
pub fn validate_work_order(work_order: &WorkOrder) -> Result<(), &'static str> {
    validate_document_name(&work_order.name)?;
    for item in &work_order.required_items {
        validate_item_code(&item.item_code)?;
        validate_quantity(item.required_qty)?;
    }
    Ok(())
}
