//! Business logic services for the Shortfall Items service

pub mod commands;
pub mod draft_report;
pub mod material_request;
pub mod reporting;
pub mod scanner;

pub use commands::{CreateRequestResponse, ShortfallCommands};
pub use draft_report::DraftReportBuilder;
pub use material_request::MaterialRequestIssuer;
pub use reporting::{DocumentLinks, ReportRenderer};
pub use scanner::{ScanSupervisor, ScanTicket, ShortfallScanner};
