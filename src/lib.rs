//! `sales-dash` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - the aggregations are testable without spawning processes
//! - the TUI, the text report and the exporter share one render pass

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod geo;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
