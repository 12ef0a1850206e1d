//! Common types used across the service

use serde::{Deserialize, Serialize};

/// Placeholder shown for a warehouse that could not be resolved
pub const NOT_AVAILABLE: &str = "N/A";

/// Three-state document lifecycle marker used by the ERP
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum DocStatus {
    Draft,
    Submitted,
    Cancelled,
}

impl DocStatus {
    pub fn code(&self) -> u8 {
        match self {
            DocStatus::Draft => 0,
            DocStatus::Submitted => 1,
            DocStatus::Cancelled => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocStatus::Draft => "Draft",
            DocStatus::Submitted => "Submitted",
            DocStatus::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<u8> for DocStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DocStatus::Draft),
            1 => Ok(DocStatus::Submitted),
            2 => Ok(DocStatus::Cancelled),
            other => Err(format!("unknown docstatus {}", other)),
        }
    }
}

impl From<DocStatus> for u8 {
    fn from(status: DocStatus) -> Self {
        status.code()
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which existing shortfall material requests keep a work order out of the scan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionPolicy {
    /// Any request that is not cancelled (draft or submitted)
    #[default]
    NonCancelled,
    /// Only requests still in draft
    DraftOnly,
}

impl ExclusionPolicy {
    /// Whether a request with the given docstatus suppresses its work order
    pub fn excludes(&self, status: DocStatus) -> bool {
        match self {
            ExclusionPolicy::NonCancelled => status != DocStatus::Cancelled,
            ExclusionPolicy::DraftOnly => status == DocStatus::Draft,
        }
    }
}

impl std::str::FromStr for ExclusionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "non_cancelled" => Ok(ExclusionPolicy::NonCancelled),
            "draft_only" => Ok(ExclusionPolicy::DraftOnly),
            other => Err(format!("unknown exclusion policy '{}'", other)),
        }
    }
}

/// Output format of a rendered report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
    Csv,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unsupported report format '{}'", other)),
        }
    }
}
