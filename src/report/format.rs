//! Formatted terminal output for the `report` subcommand.
//!
//! Formatting lives in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized

use std::fmt::Display;

use chrono::NaiveDate;

use crate::app::pipeline::{KeyInsightsTables, Metrics, RenderOutput, SalesAnalysisTables, ViewTables};
use crate::domain::{Grouped, key_label};
use crate::plot::ascii::{render_bars, render_sparkline};

/// Width of the ASCII bars printed under each table.
const BAR_WIDTH: usize = 40;

/// Currency with thousands separators and no decimals: `$1,234`, `$-56`.
///
/// Only the display is rounded; the underlying sums keep full precision.
pub fn format_currency(value: f64) -> String {
    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    format!("${sign}{}", group_thousands(digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_metrics(metrics: &Metrics) -> String {
    format!(
        "Total Sales: {}\nTotal Profit: {}\n",
        format_currency(metrics.total_sales),
        format_currency(metrics.total_profit)
    )
}

/// Format a full render pass: metrics, then every table of the view.
pub fn format_render(output: &RenderOutput) -> String {
    let mut out = String::new();
    out.push_str("=== Sales Dashboard ===\n");
    out.push_str(&format_metrics(&output.metrics));
    out.push('\n');

    match &output.tables {
        ViewTables::SalesAnalysis(t) => out.push_str(&format_sales_analysis(t)),
        ViewTables::KeyInsights(t) => out.push_str(&format_key_insights(t)),
    }
    out
}

fn format_sales_analysis(t: &SalesAnalysisTables) -> String {
    let mut out = String::new();

    out.push_str("Total Sales Over Time:\n");
    let series: Vec<f64> = t.sales_over_time.iter().map(|g| g.value).collect();
    out.push_str(&format!(
        "  {} dates | {} .. {}\n",
        t.sales_over_time.len(),
        fmt_date(t.sales_over_time.first().and_then(|g| g.key)),
        fmt_date(t.sales_over_time.last().and_then(|g| g.key)),
    ));
    out.push_str(&format!("  {}\n\n", render_sparkline(&series, BAR_WIDTH * 2)));

    let split = crate::geo::split_recognized(&t.sales_by_country);
    out.push_str("Sales by Country:\n");
    out.push_str(&format_two_columns(
        ("country", "sales", "profit"),
        split
            .placed
            .iter()
            .map(|c| (key_label(&c.country).to_string(), c.sales, c.profit)),
    ));
    out.push('\n');

    out.push_str(&format_grouped("Sales by Category", &t.sales_by_category, true));
    out.push_str(&format_grouped("Sales by Segment", &t.sales_by_segment, true));
    out.push_str(&format_grouped("Sales by Subcategory", &t.sales_by_subcategory, false));

    out.push_str("Profit over the years:\n");
    for g in &t.profit_by_year {
        let year = g.key.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("  {year:<6} {:>14}\n", format_currency(g.value)));
    }
    out.push('\n');

    out.push_str(&format_grouped("Total Sales by Ship Mode", &t.sales_by_ship_mode, true));

    let selected = t
        .selected_category
        .as_ref()
        .map(key_label)
        .unwrap_or("-");
    out.push_str(&format!(
        "Sales vs. Discount for {selected}: {} point(s)\n",
        t.discount_scatter.len()
    ));
    let options: Vec<String> = t
        .category_options
        .iter()
        .map(|o| {
            let orders = t
                .orders_by_category
                .iter()
                .find(|g| &g.key == o)
                .map_or(0, |g| g.value);
            format!("{} ({orders})", key_label(o))
        })
        .collect();
    out.push_str(&format!("  categories: {}\n", options.join(", ")));

    out
}

fn format_key_insights(t: &KeyInsightsTables) -> String {
    let mut out = String::new();
    out.push_str(&format_grouped(
        "Top 5 Subcategories with Highest Sales",
        &t.top_subcategories_by_sales,
        false,
    ));
    out.push_str(&format_grouped(
        "Top 5 Subcategories with Highest Profit",
        &t.top_subcategories_by_profit,
        false,
    ));

    out.push_str("Average Discount by Subcategory:\n");
    let labels: Vec<String> = t
        .avg_discount_by_subcategory
        .iter()
        .map(|g| key_label(&g.key).to_string())
        .collect();
    let values: Vec<f64> = t
        .avg_discount_by_subcategory
        .iter()
        .map(|g| g.value.unwrap_or(0.0))
        .collect();
    for (g, bar) in t
        .avg_discount_by_subcategory
        .iter()
        .zip(render_bars(&labels, &values, BAR_WIDTH))
    {
        let avg = g.value.map(|v| format!("{:.1}%", v * 100.0)).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("  {bar} {avg}\n"));
    }
    out.push('\n');

    out.push_str(&format!("Profit vs. Sales: {} point(s)\n", t.sales_vs_profit.len()));
    out
}

/// Label + currency value rows, with ASCII bars. `share` adds a percent column (pie charts).
fn format_grouped(title: &str, rows: &[Grouped<Option<String>>], share: bool) -> String {
    let mut out = format!("{title}:\n");
    let labels: Vec<String> = rows.iter().map(|g| key_label(&g.key).to_string()).collect();
    let values: Vec<f64> = rows.iter().map(|g| g.value).collect();
    let total: f64 = values.iter().sum();

    for (g, bar) in rows.iter().zip(render_bars(&labels, &values, BAR_WIDTH)) {
        let pct = if share && total != 0.0 {
            format!(" {:>5.1}%", g.value / total * 100.0)
        } else {
            String::new()
        };
        out.push_str(format!("  {bar} {:>14}{pct}", format_currency(g.value)).trim_end());
        out.push('\n');
    }
    out.push('\n');
    out
}

fn format_two_columns<L: Display>(
    header: (&str, &str, &str),
    rows: impl Iterator<Item = (L, f64, f64)>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {:<28} {:>14} {:>14}\n", header.0, header.1, header.2));
    out.push_str(&format!("  {:-<28} {:-<14} {:-<14}\n", "", "", ""));
    for (label, a, b) in rows {
        out.push_str(&format!(
            "  {:<28} {:>14} {:>14}\n",
            truncate(&label.to_string(), 28),
            format_currency(a),
            format_currency(b)
        ));
    }
    out
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::render_view;
    use crate::domain::{CategorySelection, Dataset, SalesRecord, View, ViewParams};

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(350.0), "$350");
        assert_eq!(format_currency(25.0), "$25");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(1234.4), "$1,234");
        assert_eq!(format_currency(999_999.0), "$999,999");
        assert_eq!(format_currency(12_642_501.9), "$12,642,502");
        assert_eq!(format_currency(-1234.0), "$-1,234");
        assert_eq!(format_currency(-56.2), "$-56");
    }

    #[test]
    fn truncate_long_labels() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdefgh", 5), "abcd.");
    }

    #[test]
    fn report_mentions_every_view_section() {
        let ds = Dataset::new(vec![
            SalesRecord {
                category: Some("Chairs".to_string()),
                sub_category: Some("Chairs".to_string()),
                country: Some("France".to_string()),
                sales: Some(100.0),
                profit: Some(10.0),
                ..SalesRecord::default()
            },
            SalesRecord {
                category: Some("Tables".to_string()),
                sub_category: Some("Tables".to_string()),
                country: Some("Atlantis".to_string()),
                sales: Some(250.0),
                profit: Some(15.0),
                ..SalesRecord::default()
            },
        ]);

        let txt = format_render(&render_view(&ds, &ViewParams::default()).unwrap());
        assert!(txt.contains("Total Sales: $350"));
        assert!(txt.contains("Total Profit: $25"));
        assert!(txt.contains("Sales vs. Discount for Chairs: 1 point(s)"));
        assert!(txt.contains("categories: Chairs (1)"));
        assert!(txt.contains("France"));
        assert!(!txt.contains("Atlantis"));

        let params = ViewParams {
            view: View::KeyInsights,
            category: CategorySelection::First,
        };
        let txt = format_render(&render_view(&ds, &params).unwrap());
        assert!(txt.contains("Top 5 Subcategories with Highest Profit"));
        assert!(txt.contains("Profit vs. Sales: 2 point(s)"));
    }
}
