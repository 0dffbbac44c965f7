//! Reporting utilities: currency metrics and formatted terminal output.

pub mod format;

pub use format::{format_currency, format_metrics, format_render};
