//! Input/output helpers.
//!
//! - CSV ingest of the sales spreadsheet (`ingest`)
//! - derived-table exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
