//! Series alignment and correlation.
//!
//! - same-date inner join of faith scores and market values (`align`)
//! - Pearson/Spearman analyses + classification (`engine`)

pub mod align;
pub mod engine;

pub use align::*;
pub use engine::*;
