//! Domain models for lung region scoring.

mod assignment;
mod patient;
mod region;
mod severity;

pub use assignment::*;
pub use patient::*;
pub use region::*;
pub use severity::*;
