//! Text charts for non-interactive output.

pub mod ascii;

pub use ascii::{render_bars, render_sparkline};
