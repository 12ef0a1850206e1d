//! Domain models for the Shortfall Items service

mod material_request;
mod shortfall;
mod stock;
mod work_order;

pub use material_request::*;
pub use shortfall::*;
pub use stock::*;
pub use work_order::*;
