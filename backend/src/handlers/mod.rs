//! HTTP handlers for the Shortfall Items service

pub mod health;
pub mod material_request;
pub mod reporting;

pub use health::health_check;
pub use material_request::create_material_request;
pub use reporting::{load_purchase_requests, load_work_orders};
