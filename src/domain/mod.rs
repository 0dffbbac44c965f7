//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - the sales row and the immutable base dataset (`SalesRecord`, `Dataset`)
//! - view selection (`View`, `ViewParams`)
//! - derived-table row shapes (`Grouped`, `CountryTotals`, scatter points)

pub mod types;

pub use types::*;
