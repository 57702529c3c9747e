//! Terminal plots of aligned data (`ascii`).

pub mod ascii;

pub use ascii::*;
