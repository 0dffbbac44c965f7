//! Shared "render pass" logic used by both the CLI and the TUI.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! dataset -> metrics -> the tables of the selected view
//!
//! Every call recomputes from the base dataset. Nothing is cached between
//! passes, and the dataset is only ever read.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{self, derive_years};
use crate::domain::{
    CategorySelection, CountryTotals, Dataset, DiscountPoint, Grouped, SalesProfitPoint, View, ViewParams, key_label,
};
use crate::error::AppError;

/// The two headline numbers shown above every view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub total_sales: f64,
    pub total_profit: f64,
}

impl Metrics {
    pub fn compute(dataset: &Dataset) -> Self {
        Self {
            total_sales: aggregate::total_sales(dataset),
            total_profit: aggregate::total_profit(dataset),
        }
    }
}

/// Tables behind the "Sales Analysis" view.
#[derive(Debug, Clone, Serialize)]
pub struct SalesAnalysisTables {
    pub sales_over_time: Vec<Grouped<Option<NaiveDate>>>,
    pub sales_by_country: Vec<CountryTotals>,
    pub sales_by_category: Vec<Grouped<Option<String>>>,
    pub sales_by_segment: Vec<Grouped<Option<String>>>,
    pub sales_by_subcategory: Vec<Grouped<Option<String>>>,
    pub profit_by_year: Vec<Grouped<Option<i32>>>,
    pub sales_by_ship_mode: Vec<Grouped<Option<String>>>,
    pub category_options: Vec<Option<String>>,
    pub orders_by_category: Vec<Grouped<Option<String>, usize>>,
    /// `None` only when the dataset has no rows.
    pub selected_category: Option<Option<String>>,
    pub discount_scatter: Vec<DiscountPoint>,
}

/// Tables behind the "Key Insights" view.
#[derive(Debug, Clone, Serialize)]
pub struct KeyInsightsTables {
    pub top_subcategories_by_sales: Vec<Grouped<Option<String>>>,
    pub top_subcategories_by_profit: Vec<Grouped<Option<String>>>,
    pub avg_discount_by_subcategory: Vec<Grouped<Option<String>, Option<f64>>>,
    pub sales_vs_profit: Vec<SalesProfitPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum ViewTables {
    SalesAnalysis(SalesAnalysisTables),
    KeyInsights(KeyInsightsTables),
}

/// All computed outputs of a single render pass.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub metrics: Metrics,
    pub tables: ViewTables,
}

/// Compute everything the selected view shows.
///
/// Fails only when `params.category` names a category that is not in the data.
pub fn render_view(dataset: &Dataset, params: &ViewParams) -> Result<RenderOutput, AppError> {
    let metrics = Metrics::compute(dataset);
    let tables = match params.view {
        View::SalesAnalysis => ViewTables::SalesAnalysis(sales_analysis(dataset, &params.category)?),
        View::KeyInsights => ViewTables::KeyInsights(key_insights(dataset)),
    };
    Ok(RenderOutput { metrics, tables })
}

pub fn sales_analysis(dataset: &Dataset, category: &CategorySelection) -> Result<SalesAnalysisTables, AppError> {
    let category_options = aggregate::category_options(dataset);
    let selected_category = aggregate::resolve_category(&category_options, category);
    if selected_category.is_none() {
        match category {
            CategorySelection::First => {}
            CategorySelection::Named(name) => {
                return Err(AppError::new(3, format!("Unknown category '{name}'.")));
            }
            CategorySelection::Value(value) => {
                return Err(AppError::new(3, format!("Unknown category '{}'.", key_label(value))));
            }
        }
    }

    let discount_scatter = selected_category
        .as_ref()
        .map(|c| aggregate::filter_by_category(dataset, c))
        .unwrap_or_default();

    // The year column exists only on this working copy.
    let years = derive_years(dataset);

    Ok(SalesAnalysisTables {
        sales_over_time: aggregate::sales_over_time(dataset),
        sales_by_country: aggregate::sales_by_country(dataset),
        sales_by_category: aggregate::sales_by_category(dataset),
        sales_by_segment: aggregate::sales_by_segment(dataset),
        sales_by_subcategory: aggregate::sales_by_subcategory(dataset),
        profit_by_year: aggregate::profit_by_year(&years),
        sales_by_ship_mode: aggregate::sales_by_ship_mode(dataset),
        orders_by_category: aggregate::orders_by_category(dataset),
        category_options,
        selected_category,
        discount_scatter,
    })
}

pub fn key_insights(dataset: &Dataset) -> KeyInsightsTables {
    KeyInsightsTables {
        top_subcategories_by_sales: aggregate::top_subcategories_by_sales(dataset),
        top_subcategories_by_profit: aggregate::top_subcategories_by_profit(dataset),
        avg_discount_by_subcategory: aggregate::avg_discount_by_subcategory(dataset),
        sales_vs_profit: aggregate::sales_vs_profit(dataset),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn fixture() -> Dataset {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sales_small.csv");
        crate::io::ingest::load_dataset(&path).unwrap()
    }

    #[test]
    fn default_params_render_sales_analysis_for_first_category() {
        let ds = fixture();
        let out = render_view(&ds, &ViewParams::default()).unwrap();
        assert_eq!(out.metrics.total_sales, 1000.0);
        assert_eq!(out.metrics.total_profit, 76.0);

        let ViewTables::SalesAnalysis(t) = out.tables else {
            panic!("expected sales analysis tables");
        };
        assert_eq!(t.selected_category, Some(Some("Furniture".to_string())));
        assert_eq!(t.discount_scatter.len(), 3);
        assert_eq!(t.profit_by_year.len(), 3);
    }

    #[test]
    fn key_insights_view() {
        let ds = fixture();
        let params = ViewParams {
            view: View::KeyInsights,
            category: CategorySelection::First,
        };
        let ViewTables::KeyInsights(t) = render_view(&ds, &params).unwrap().tables else {
            panic!("expected key insights tables");
        };
        assert_eq!(t.top_subcategories_by_sales.len(), 5);
        assert_eq!(t.top_subcategories_by_sales[0].key.as_deref(), Some("Phones"));
        assert_eq!(t.top_subcategories_by_profit[0].key.as_deref(), Some("Phones"));
        assert_eq!(t.sales_vs_profit.len(), ds.len());
    }

    #[test]
    fn unknown_category_is_an_error() {
        let ds = fixture();
        let params = ViewParams {
            view: View::SalesAnalysis,
            category: CategorySelection::Named("Toys".to_string()),
        };
        let err = render_view(&ds, &params).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let params = ViewParams {
            view: View::SalesAnalysis,
            category: CategorySelection::Value(None),
        };
        assert_eq!(render_view(&ds, &params).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn empty_dataset_renders_empty_tables() {
        let ds = Dataset::default();
        let ViewTables::SalesAnalysis(t) = render_view(&ds, &ViewParams::default()).unwrap().tables else {
            panic!("expected sales analysis tables");
        };
        assert!(t.sales_over_time.is_empty());
        assert_eq!(t.selected_category, None);
        assert!(t.discount_scatter.is_empty());
    }

    #[test]
    fn concurrent_passes_share_the_dataset() {
        let ds = Arc::new(fixture());
        let handles: Vec<_> = View::ALL
            .into_iter()
            .map(|view| {
                let ds = Arc::clone(&ds);
                thread::spawn(move || {
                    let params = ViewParams {
                        view,
                        category: CategorySelection::First,
                    };
                    render_view(&ds, &params).map(|o| o.metrics)
                })
            })
            .collect();
        for h in handles {
            let metrics = h.join().unwrap().unwrap();
            assert_eq!(metrics.total_sales, 1000.0);
        }
    }
}
