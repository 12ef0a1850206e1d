//! Report handlers
//!
//! Both reports render as HTML by default, with `?format=json` and
//! `?format=csv` for data export.

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::ReportFormat;

use crate::error::{AppError, AppResult};
use crate::services::ReportRenderer;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "html", "json" or "csv"
    /// Desk session id; a newer scan of the same client replaces the older one
    pub client: Option<String>,
}

fn parse_format(format: Option<&str>) -> AppResult<ReportFormat> {
    format
        .map(|f| f.parse::<ReportFormat>().map_err(|e| AppError::validation("format", e)))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Render the error panel in place of the report
fn error_panel(error: AppError) -> Response {
    tracing::error!("Report failed: {:?}", error);
    (
        error.status_code(),
        Html(ReportRenderer::render_error_html(&error)),
    )
        .into_response()
}

fn html(rendered: AppResult<String>) -> Response {
    match rendered {
        Ok(body) => Html(body).into_response(),
        Err(e) => error_panel(e),
    }
}

fn csv(rendered: AppResult<String>, disposition: &'static str) -> Response {
    match rendered {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Scan open work orders and show their shortfalls
pub async fn load_work_orders(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let format = match parse_format(query.format.as_deref()) {
        Ok(format) => format,
        Err(e) => return e.into_response(),
    };

    let requester = query.client.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let result = state.commands().on_refresh(requester).await;

    match (format, result) {
        (ReportFormat::Html, Ok(report)) => html(state.renderer().render_shortfall_html(&report)),
        (ReportFormat::Html, Err(e)) => error_panel(e),
        (ReportFormat::Json, Ok(report)) => Json(report).into_response(),
        (ReportFormat::Csv, Ok(report)) => csv(
            ReportRenderer::shortfall_csv(&report),
            "attachment; filename=\"shortfall_items.csv\"",
        ),
        (_, Err(e)) => e.into_response(),
    }
}

/// Show draft shortfall requests against current stock
pub async fn load_purchase_requests(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let format = match parse_format(query.format.as_deref()) {
        Ok(format) => format,
        Err(e) => return e.into_response(),
    };

    let result = state.commands().on_load_drafts().await;

    match (format, result) {
        (ReportFormat::Html, Ok(report)) => html(state.renderer().render_draft_html(&report)),
        (ReportFormat::Html, Err(e)) => error_panel(e),
        (ReportFormat::Json, Ok(report)) => Json(report).into_response(),
        (ReportFormat::Csv, Ok(report)) => csv(
            ReportRenderer::draft_csv(&report),
            "attachment; filename=\"draft_shortfall_requests.csv\"",
        ),
        (_, Err(e)) => e.into_response(),
    }
}
