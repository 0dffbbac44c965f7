//! Export the derived tables of a render pass.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one CSV per table, or one JSON document per view.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;

use crate::app::pipeline::{KeyInsightsTables, RenderOutput, SalesAnalysisTables, ViewTables};
use crate::domain::{Grouped, key_label};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Write every table of `output` into `dir`, returning the files written.
pub fn write_view_export(dir: &Path, output: &RenderOutput, format: ExportFormat) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let written = match format {
        ExportFormat::Json => vec![write_json(dir, output)?],
        ExportFormat::Csv => {
            let mut tables = TableWriter::new(dir);
            tables.write(
                "metrics",
                &["metric", "value"],
                [
                    vec!["total_sales".to_string(), output.metrics.total_sales.to_string()],
                    vec!["total_profit".to_string(), output.metrics.total_profit.to_string()],
                ],
            )?;
            match &output.tables {
                ViewTables::SalesAnalysis(t) => write_sales_analysis(&mut tables, t)?,
                ViewTables::KeyInsights(t) => write_key_insights(&mut tables, t)?,
            }
            tables.written
        }
    };

    log::info!("Exported {} file(s) to {}", written.len(), dir.display());
    Ok(written)
}

fn write_json(dir: &Path, output: &RenderOutput) -> Result<PathBuf, AppError> {
    let name = match output.tables {
        ViewTables::SalesAnalysis(_) => "sales_analysis.json",
        ViewTables::KeyInsights(_) => "key_insights.json",
    };
    let path = dir.join(name);
    let file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, output)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(path)
}

fn write_sales_analysis(tables: &mut TableWriter<'_>, t: &SalesAnalysisTables) -> Result<(), AppError> {
    tables.write(
        "sales_over_time",
        &["order_date", "sales"],
        t.sales_over_time.iter().map(|g| {
            vec![g.key.map(|d| d.to_string()).unwrap_or_default(), g.value.to_string()]
        }),
    )?;
    tables.write(
        "sales_by_country",
        &["country", "sales", "profit"],
        t.sales_by_country.iter().map(|c| {
            vec![
                c.country.clone().unwrap_or_default(),
                c.sales.to_string(),
                c.profit.to_string(),
            ]
        }),
    )?;
    tables.write("sales_by_category", &["category", "sales"], text_rows(&t.sales_by_category))?;
    tables.write(
        "orders_by_category",
        &["category", "orders"],
        t.orders_by_category
            .iter()
            .map(|g| vec![g.key.clone().unwrap_or_default(), g.value.to_string()]),
    )?;
    tables.write("sales_by_segment", &["segment", "sales"], text_rows(&t.sales_by_segment))?;
    tables.write("sales_by_subcategory", &["sub_category", "sales"], text_rows(&t.sales_by_subcategory))?;
    tables.write(
        "profit_by_year",
        &["year", "profit"],
        t.profit_by_year.iter().map(|g| {
            vec![g.key.map(|y| y.to_string()).unwrap_or_default(), g.value.to_string()]
        }),
    )?;
    tables.write("sales_by_ship_mode", &["ship_mode", "sales"], text_rows(&t.sales_by_ship_mode))?;
    tables.write(
        "sales_vs_discount",
        &["category", "discount", "sales", "product_name"],
        t.discount_scatter.iter().map(|p| {
            vec![
                t.selected_category.as_ref().map(key_label).unwrap_or_default().to_string(),
                opt_num(p.discount),
                opt_num(p.sales),
                p.product_name.clone().unwrap_or_default(),
            ]
        }),
    )
}

fn write_key_insights(tables: &mut TableWriter<'_>, t: &KeyInsightsTables) -> Result<(), AppError> {
    tables.write(
        "top_subcategories_by_sales",
        &["sub_category", "sales"],
        text_rows(&t.top_subcategories_by_sales),
    )?;
    tables.write(
        "top_subcategories_by_profit",
        &["sub_category", "profit"],
        text_rows(&t.top_subcategories_by_profit),
    )?;
    tables.write(
        "avg_discount_by_subcategory",
        &["sub_category", "discount"],
        t.avg_discount_by_subcategory
            .iter()
            .map(|g| vec![g.key.clone().unwrap_or_default(), opt_num(g.value)]),
    )?;
    tables.write(
        "sales_vs_profit",
        &["category", "sales", "profit"],
        t.sales_vs_profit.iter().map(|p| {
            vec![p.category.clone().unwrap_or_default(), opt_num(p.sales), opt_num(p.profit)]
        }),
    )
}

fn text_rows(rows: &[Grouped<Option<String>>]) -> impl Iterator<Item = Vec<String>> + '_ {
    rows.iter()
        .map(|g| vec![g.key.clone().unwrap_or_default(), g.value.to_string()])
}

fn opt_num(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes `<name>.csv` files into one directory and remembers what it wrote.
struct TableWriter<'a> {
    dir: &'a Path,
    written: Vec<PathBuf>,
}

impl<'a> TableWriter<'a> {
    fn new(dir: &'a Path) -> Self {
        Self {
            dir,
            written: Vec::new(),
        }
    }

    fn write(
        &mut self,
        name: &str,
        header: &[&str],
        rows: impl IntoIterator<Item = Vec<String>>,
    ) -> Result<(), AppError> {
        let path = self.dir.join(format!("{name}.csv"));
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

        writer
            .write_record(header)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
        for row in rows {
            writer
                .write_record(&row)
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;

        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::render_view;
    use crate::domain::{CategorySelection, Dataset, View, ViewParams};

    fn fixture() -> Dataset {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sales_small.csv");
        crate::io::ingest::load_dataset(&path).unwrap()
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sales-dash-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn csv_export_writes_one_file_per_table() {
        let ds = fixture();
        let output = render_view(&ds, &ViewParams::default()).unwrap();
        let dir = scratch_dir("csv");

        let written = write_view_export(&dir, &output, ExportFormat::Csv).unwrap();
        assert_eq!(written.len(), 10);

        let category = std::fs::read_to_string(dir.join("sales_by_category.csv")).unwrap();
        assert_eq!(
            category,
            "category,sales\nFurniture,350\nOffice Supplies,130\nTechnology,520\n"
        );
        let orders = std::fs::read_to_string(dir.join("orders_by_category.csv")).unwrap();
        assert_eq!(orders, "category,orders\nFurniture,3\nOffice Supplies,3\nTechnology,2\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn json_export_is_tagged_by_view() {
        let ds = fixture();
        let params = ViewParams {
            view: View::KeyInsights,
            category: CategorySelection::First,
        };
        let output = render_view(&ds, &params).unwrap();
        let dir = scratch_dir("json");

        let written = write_view_export(&dir, &output, ExportFormat::Json).unwrap();
        assert_eq!(written, vec![dir.join("key_insights.json")]);

        let doc: serde_json::Value =
            serde_json::from_reader(File::open(&written[0]).unwrap()).unwrap();
        assert_eq!(doc["tables"]["view"], "key-insights");
        assert_eq!(doc["metrics"]["total_sales"], 1000.0);
        assert_eq!(doc["tables"]["top_subcategories_by_sales"][0]["key"], "Phones");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
