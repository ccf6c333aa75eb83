pub mod config;
pub mod models;
pub mod services;

pub use config::*;
pub use models::*;
pub use services::*;
