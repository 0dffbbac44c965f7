//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - aggregated in-memory on every render pass
//! - exported to JSON/CSV
//! - printed by the text report

use std::sync::Arc;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

/// One row of the sales spreadsheet.
///
/// Categorical fields are optional: an empty cell is a missing value, which
/// forms its own group when aggregating. Numeric fields are optional too and
/// missing values are skipped by sums and means.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesRecord {
    pub order_date: Option<NaiveDate>,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub discount: Option<f64>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub segment: Option<String>,
    pub ship_mode: Option<String>,
    pub product_name: Option<String>,
}

/// The base dataset: loaded once, never mutated afterwards.
///
/// Cloning is cheap (the rows live behind an `Arc`), so independent render
/// passes can each hold a handle without locking.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<[SalesRecord]>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Top-level dashboard mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    SalesAnalysis,
    KeyInsights,
}

impl View {
    pub const ALL: [View; 2] = [View::SalesAnalysis, View::KeyInsights];

    pub fn display_name(self) -> &'static str {
        match self {
            View::SalesAnalysis => "Sales Analysis",
            View::KeyInsights => "Key Insights",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            View::SalesAnalysis => View::KeyInsights,
            View::KeyInsights => View::SalesAnalysis,
        }
    }
}

/// Which category the discount drill-down shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategorySelection {
    /// The first category encountered in the data.
    #[default]
    First,
    /// A category typed by the user. An exact name wins; otherwise
    /// `(blank)` names the missing value.
    Named(String),
    /// An option value exactly as listed by the selector.
    Value(Option<String>),
}

/// Everything a render pass depends on besides the dataset itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    pub view: View,
    pub category: CategorySelection,
}

/// One row of a grouped derived table.
///
/// `first_seen` is the index of the first input row that fell into this
/// group; it is the tie-breaker when ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouped<K, V = f64> {
    pub key: K,
    pub value: V,
    #[serde(skip)]
    pub first_seen: usize,
}

/// Country row for the map: both hover values travel with the key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTotals {
    pub country: Option<String>,
    pub sales: f64,
    pub profit: f64,
}

/// Point for the discount/sales drill-down scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountPoint {
    pub discount: Option<f64>,
    pub sales: Option<f64>,
    pub product_name: Option<String>,
}

/// Point for the sales/profit scatter; `category` is the colour channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesProfitPoint {
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub category: Option<String>,
}

/// Label used wherever a missing categorical value is shown to the user.
pub const MISSING_LABEL: &str = "(blank)";

pub fn key_label(key: &Option<String>) -> &str {
    key.as_deref().unwrap_or(MISSING_LABEL)
}
