//! Statistical utilities: correlation tests and the least squares trend line.

pub mod correlation;
pub mod ols;

pub use correlation::*;
pub use ols::*;
