//! Domain models for the clinic front desk.

mod counter;
mod patient;
mod service;

pub use counter::*;
pub use patient::*;
pub use service::*;
