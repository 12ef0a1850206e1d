//! Error handling for the Shortfall Items service
//!
//! Provides consistent JSON error responses. HTML report endpoints render
//! their own error panel from the same error values.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // ERP errors
    #[error("ERP request failed: {0}")]
    ErpUnavailable(String),

    #[error("ERP returned {status}: {body}")]
    ErpResponse { status: u16, body: String },

    #[error("Invalid {doctype} document '{name}': {reason}")]
    InvalidDocument {
        doctype: String,
        name: String,
        reason: String,
    },

    // Scan lifecycle
    #[error("Scan superseded by a newer scan")]
    ScanSuperseded,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_document(doctype: &str, name: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidDocument {
            doctype: doctype.to_string(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ErpUnavailable(_)
            | AppError::ErpResponse { .. }
            | AppError::InvalidDocument { .. } => StatusCode::BAD_GATEWAY,
            AppError::ScanSuperseded => StatusCode::CONFLICT,
            AppError::Configuration(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ErpUnavailable(_) => "ERP_UNAVAILABLE",
            AppError::ErpResponse { .. } => "ERP_ERROR",
            AppError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            AppError::ScanSuperseded => "SCAN_SUPERSEDED",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to a user
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::NotFound(resource) => format!("{} not found", resource),
            AppError::ErpUnavailable(_) => "The ERP could not be reached".to_string(),
            AppError::ErpResponse { status, .. } => {
                format!("The ERP rejected the request ({})", status)
            }
            AppError::InvalidDocument { doctype, name, .. } => {
                format!("{} {} could not be read", doctype, name)
            }
            AppError::ScanSuperseded => {
                "A newer scan replaced this one. Showing the latest results.".to_string()
            }
            AppError::Configuration(_) => "The service is misconfigured".to_string(),
            AppError::Internal(_) | AppError::InternalError(_) => {
                "An internal server error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_detail = ErrorDetail {
            code: self.code().to_string(),
            message: self.user_message(),
            field: match &self {
                AppError::Validation { field, .. } => Some(field.clone()),
                _ => None,
            },
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
