pub mod sla;

pub use sla::*;
