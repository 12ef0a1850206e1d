//! Report rendering and data export
//!
//! Turns shortfall and draft reports into HTML panels, CSV files, and the
//! error panel shown when a report could not be built.

use askama::Template;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{DraftReport, ShortfallReport, NOT_AVAILABLE};

use crate::error::{AppError, AppResult};

/// Builds desk links to ERP documents
#[derive(Debug, Clone)]
pub struct DocumentLinks {
    desk_url: String,
}

impl DocumentLinks {
    pub fn new(desk_url: &str) -> Self {
        Self {
            desk_url: desk_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn work_order(&self, name: &str) -> String {
        format!("{}/app/work-order/{}", self.desk_url, encode_segment(name))
    }

    pub fn material_request(&self, name: &str) -> String {
        format!(
            "{}/app/material-request/{}",
            self.desk_url,
            encode_segment(name)
        )
    }
}

/// Percent-encode a document name as a single URL path segment
fn encode_segment(name: &str) -> String {
    let mut url = Url::parse("http://localhost/").expect("static URL is valid");
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().push(name);
    }
    url.path().trim_start_matches('/').to_string()
}

/// Route that raises a material request for a work order
pub fn create_request_action(work_order: &str) -> String {
    format!(
        "/api/v1/work-orders/{}/material-request",
        encode_segment(work_order)
    )
}

fn qty(value: Decimal) -> String {
    value.normalize().to_string()
}

struct ShortfallRowView {
    item_code: String,
    source_warehouse: String,
    target_warehouse: String,
    required_qty: String,
    actual_qty: String,
    projected_qty: String,
    shortfall: String,
}

struct ShortfallGroupView {
    work_order: String,
    status: String,
    link: String,
    action: String,
    rows: Vec<ShortfallRowView>,
}

#[derive(Template)]
#[template(path = "shortfall_report.html")]
struct ShortfallReportTemplate {
    generated_at: String,
    groups: Vec<ShortfallGroupView>,
}

struct DraftLineView {
    item_code: String,
    source_warehouse: String,
    target_warehouse: String,
    required_qty: String,
    actual_qty: String,
    projected_qty: String,
    shortfall: String,
}

struct DraftEntryView {
    material_request: String,
    request_link: String,
    work_order: String,
    work_order_link: String,
    work_order_status: String,
    lines: Vec<DraftLineView>,
}

#[derive(Template)]
#[template(path = "draft_report.html")]
struct DraftReportTemplate {
    generated_at: String,
    entries: Vec<DraftEntryView>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    code: String,
    message: String,
}

/// Flattened draft line for CSV export
#[derive(Debug, Serialize)]
pub struct DraftCsvRow {
    pub material_request: String,
    pub work_order: String,
    pub work_order_status: String,
    pub item_code: String,
    pub source_warehouse: String,
    pub target_warehouse: String,
    pub required_qty: Decimal,
    pub actual_qty: Decimal,
    pub projected_qty: Decimal,
    pub shortfall: Decimal,
}

/// Renders reports for the desk
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    links: DocumentLinks,
}

impl ReportRenderer {
    pub fn new(links: DocumentLinks) -> Self {
        Self { links }
    }

    /// Render the shortfall report, or the empty state when nothing is short
    pub fn render_shortfall_html(&self, report: &ShortfallReport) -> AppResult<String> {
        let groups = report
            .groups
            .iter()
            .map(|group| ShortfallGroupView {
                work_order: group.work_order.clone(),
                status: group.work_order_status.label().to_string(),
                link: self.links.work_order(&group.work_order),
                action: create_request_action(&group.work_order),
                rows: group
                    .rows
                    .iter()
                    .map(|row| ShortfallRowView {
                        item_code: row.item_code.clone(),
                        source_warehouse: row.source_warehouse.clone(),
                        target_warehouse: row
                            .target_warehouse
                            .clone()
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                        required_qty: qty(row.required_qty),
                        actual_qty: qty(row.actual_qty),
                        projected_qty: qty(row.projected_qty),
                        shortfall: qty(row.shortfall),
                    })
                    .collect(),
            })
            .collect();

        ShortfallReportTemplate {
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            groups,
        }
        .render()
        .map_err(|e| AppError::Internal(format!("Template rendering error: {}", e)))
    }

    /// Render the draft request report, or the empty state
    pub fn render_draft_html(&self, report: &DraftReport) -> AppResult<String> {
        let entries = report
            .entries
            .iter()
            .map(|entry| DraftEntryView {
                material_request: entry.material_request.clone(),
                request_link: self.links.material_request(&entry.material_request),
                work_order: entry
                    .work_order
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                work_order_link: entry
                    .work_order
                    .as_deref()
                    .map(|wo| self.links.work_order(wo))
                    .unwrap_or_default(),
                work_order_status: entry.work_order_status.clone(),
                lines: entry
                    .lines
                    .iter()
                    .map(|line| DraftLineView {
                        item_code: line.item_code.clone(),
                        source_warehouse: line.source_warehouse.clone(),
                        target_warehouse: line.target_warehouse.clone(),
                        required_qty: qty(line.required_qty),
                        actual_qty: qty(line.actual_qty),
                        projected_qty: qty(line.projected_qty),
                        shortfall: qty(line.shortfall),
                    })
                    .collect(),
            })
            .collect();

        DraftReportTemplate {
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            entries,
        }
        .render()
        .map_err(|e| AppError::Internal(format!("Template rendering error: {}", e)))
    }

    /// Render the panel shown in place of a report that failed to build
    pub fn render_error_html(error: &AppError) -> String {
        ErrorTemplate {
            code: error.code().to_string(),
            message: error.user_message(),
        }
        .render()
        .unwrap_or_else(|_| "<p>Report could not be loaded.</p>".to_string())
    }

    /// Flatten the shortfall report into CSV
    pub fn shortfall_csv(report: &ShortfallReport) -> AppResult<String> {
        let rows: Vec<_> = report.rows().collect();
        Self::export_to_csv(&rows)
    }

    /// Flatten the draft report into CSV, one row per request line
    pub fn draft_csv(report: &DraftReport) -> AppResult<String> {
        let rows: Vec<DraftCsvRow> = report
            .entries
            .iter()
            .flat_map(|entry| {
                entry.lines.iter().map(move |line| DraftCsvRow {
                    material_request: entry.material_request.clone(),
                    work_order: entry
                        .work_order
                        .clone()
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    work_order_status: entry.work_order_status.clone(),
                    item_code: line.item_code.clone(),
                    source_warehouse: line.source_warehouse.clone(),
                    target_warehouse: line.target_warehouse.clone(),
                    required_qty: line.required_qty,
                    actual_qty: line.actual_qty,
                    projected_qty: line.projected_qty,
                    shortfall: line.shortfall,
                })
            })
            .collect();
        Self::export_to_csv(&rows)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
