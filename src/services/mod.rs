pub mod business_calendar;
pub mod sla_service;

pub use business_calendar::*;
pub use sla_service::*;
