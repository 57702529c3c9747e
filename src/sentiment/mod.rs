//! Keyword-based sentiment scoring.

pub mod scorer;
pub mod vocabulary;

pub use scorer::*;
pub use vocabulary::*;
