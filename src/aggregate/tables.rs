//! The derived tables behind each chart.
//!
//! One function per chart input. Each is a pure function of the dataset (and,
//! for the drill-down scatter, the selected category).

use chrono::NaiveDate;

use super::{YearFrame, group_count, group_fold, group_mean, group_sum, top_n};
use crate::domain::{
    CategorySelection, CountryTotals, Dataset, DiscountPoint, Grouped, MISSING_LABEL, SalesProfitPoint, SalesRecord,
};

/// Rows kept by the "top subcategories" rankings.
pub const TOP_SUBCATEGORIES: usize = 5;

pub fn total_sales(dataset: &Dataset) -> f64 {
    dataset.records().iter().filter_map(|r| r.sales).sum()
}

pub fn total_profit(dataset: &Dataset) -> f64 {
    dataset.records().iter().filter_map(|r| r.profit).sum()
}

/// Sales per distinct order date, ascending by date.
pub fn sales_over_time(dataset: &Dataset) -> Vec<Grouped<Option<NaiveDate>>> {
    group_sum(dataset.records(), |r| r.order_date, |r| r.sales)
}

/// Sales and profit per country (map input).
pub fn sales_by_country(dataset: &Dataset) -> Vec<CountryTotals> {
    group_fold(
        dataset.records(),
        |r| r.country.clone(),
        || (0.0, 0.0),
        |acc, r| {
            acc.0 += r.sales.unwrap_or(0.0);
            acc.1 += r.profit.unwrap_or(0.0);
        },
    )
    .into_iter()
    .map(|(country, _, (sales, profit))| CountryTotals { country, sales, profit })
    .collect()
}

pub fn sales_by_category(dataset: &Dataset) -> Vec<Grouped<Option<String>>> {
    sales_by(dataset, |r| r.category.clone())
}

pub fn sales_by_segment(dataset: &Dataset) -> Vec<Grouped<Option<String>>> {
    sales_by(dataset, |r| r.segment.clone())
}

pub fn sales_by_subcategory(dataset: &Dataset) -> Vec<Grouped<Option<String>>> {
    sales_by(dataset, |r| r.sub_category.clone())
}

pub fn sales_by_ship_mode(dataset: &Dataset) -> Vec<Grouped<Option<String>>> {
    sales_by(dataset, |r| r.ship_mode.clone())
}

fn sales_by(
    dataset: &Dataset,
    key: impl Fn(&SalesRecord) -> Option<String>,
) -> Vec<Grouped<Option<String>>> {
    group_sum(dataset.records(), key, |r| r.sales)
}

/// Profit per order year, ascending by year.
pub fn profit_by_year(frame: &YearFrame<'_>) -> Vec<Grouped<Option<i32>>> {
    group_sum(frame.rows(), |row| row.year, |row| row.record.profit)
}

/// Distinct categories in first-encountered order (selector options).
pub fn category_options(dataset: &Dataset) -> Vec<Option<String>> {
    let mut out: Vec<Option<String>> = Vec::new();
    for r in dataset.records() {
        if !out.contains(&r.category) {
            out.push(r.category.clone());
        }
    }
    out
}

/// Number of orders per category, shown beside each selector option.
pub fn orders_by_category(dataset: &Dataset) -> Vec<Grouped<Option<String>, usize>> {
    group_count(dataset.records(), |r| r.category.clone())
}

/// Resolve a category selection against the options.
///
/// Returns `None` when the selection is not among the options, or when
/// `First` is asked of a dataset with no categories at all.
pub fn resolve_category(options: &[Option<String>], selection: &CategorySelection) -> Option<Option<String>> {
    match selection {
        CategorySelection::First => options.first().cloned(),
        CategorySelection::Value(value) => options.contains(value).then(|| value.clone()),
        CategorySelection::Named(name) => {
            let exact = Some(name.clone());
            if options.contains(&exact) {
                Some(exact)
            } else if name == MISSING_LABEL && options.contains(&None) {
                Some(None)
            } else {
                None
            }
        }
    }
}

/// Rows of one category, projected for the discount/sales scatter.
pub fn filter_by_category(dataset: &Dataset, category: &Option<String>) -> Vec<DiscountPoint> {
    dataset
        .records()
        .iter()
        .filter(|r| &r.category == category)
        .map(|r| DiscountPoint {
            discount: r.discount,
            sales: r.sales,
            product_name: r.product_name.clone(),
        })
        .collect()
}

pub fn top_subcategories_by_sales(dataset: &Dataset) -> Vec<Grouped<Option<String>>> {
    top_n(&sales_by_subcategory(dataset), TOP_SUBCATEGORIES)
}

pub fn top_subcategories_by_profit(dataset: &Dataset) -> Vec<Grouped<Option<String>>> {
    let profit = group_sum(dataset.records(), |r| r.sub_category.clone(), |r| r.profit);
    top_n(&profit, TOP_SUBCATEGORIES)
}

pub fn avg_discount_by_subcategory(dataset: &Dataset) -> Vec<Grouped<Option<String>, Option<f64>>> {
    group_mean(dataset.records(), |r| r.sub_category.clone(), |r| r.discount)
}

/// Every row as a sales/profit point, coloured by category.
pub fn sales_vs_profit(dataset: &Dataset) -> Vec<SalesProfitPoint> {
    dataset
        .records()
        .iter()
        .map(|r| SalesProfitPoint {
            sales: r.sales,
            profit: r.profit,
            category: r.category.clone(),
        })
        .collect()
}
