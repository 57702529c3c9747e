//! `faith-signal` library crate.
//!
//! Measures day-level "faith" in crypto news coverage and correlates it with
//! same-day market value. The binary (`faith`) is a thin wrapper around this
//! library so the pipeline is testable without spawning processes.

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod sentiment;
