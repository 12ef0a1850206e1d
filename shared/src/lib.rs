//! Shared types and models for the Shortfall Items service
//!
//! This crate contains the document models, the derived report rows and the
//! pure shortfall arithmetic shared between the backend and the desk form
//! script (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
