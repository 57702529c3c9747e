//! Input/output helpers.
//!
//! - two-column series tables, read + write (`series`)
//! - analysis exports (CSV/JSON) (`export`)

pub mod export;
pub mod series;

pub use export::*;
pub use series::*;
