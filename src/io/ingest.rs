//! Ingest of the sales spreadsheet.
//!
//! This module turns the workbook (or its CSV export) into the immutable `Dataset`.
//!
//! Design goals:
//! - **Strict schema**: every column the dashboard reads must be present (exit code 2)
//! - **Fail fast**: a malformed numeric or date cell aborts the load; there is no partial dashboard
//! - **Missing is not malformed**: empty cells become `None`; short rows are malformed
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Days, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{Dataset, SalesRecord};
use crate::error::LoadError;

pub const COL_ORDER_DATE: &str = "Order Date";
pub const COL_SALES: &str = "Sales";
pub const COL_PROFIT: &str = "Profit";
pub const COL_DISCOUNT: &str = "Discount";
pub const COL_COUNTRY: &str = "Country";
pub const COL_CATEGORY: &str = "Category";
pub const COL_SUB_CATEGORY: &str = "Sub-Category";
pub const COL_SEGMENT: &str = "Segment";
pub const COL_SHIP_MODE: &str = "Ship Mode";
pub const COL_PRODUCT_NAME: &str = "Product Name";

/// Columns the dashboard reads. Extra columns in the file are ignored.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_ORDER_DATE,
    COL_SALES,
    COL_PROFIT,
    COL_DISCOUNT,
    COL_COUNTRY,
    COL_CATEGORY,
    COL_SUB_CATEGORY,
    COL_SEGMENT,
    COL_SHIP_MODE,
    COL_PRODUCT_NAME,
];

/// File extensions read through the workbook reader; anything else is CSV.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load the sales dataset, choosing the reader by file extension.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let dataset = if is_workbook(path) {
        read_workbook(path)?
    } else {
        let file = File::open(path).map_err(|e| LoadError::Open(path.to_path_buf(), e))?;
        read_dataset(file)?
    };
    log::info!("Loaded {} sales rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Parse a dataset from any CSV source.
pub fn read_dataset<R: Read>(source: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().map_err(LoadError::Headers)?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|source| LoadError::Record { line, source })?;
        if record.len() != headers.len() {
            return Err(LoadError::RaggedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }
        records.push(columns.parse_row(&record, line)?);
    }

    Ok(Dataset::new(records))
}

/// Parse a dataset from the first worksheet of a workbook.
///
/// The first row holds the headers. Cells are turned into text and then go
/// through the same column resolution and parsing as CSV rows; numeric cells
/// in the date column are read as Excel serial dates.
pub fn read_workbook(path: &Path) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Workbook(path.to_path_buf(), e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoWorksheet(path.to_path_buf()))?
        .map_err(|e| LoadError::Workbook(path.to_path_buf(), e))?;

    let mut rows = range.rows();
    let headers: StringRecord = rows
        .next()
        .map(|cells| cells.iter().map(|c| workbook_cell(c, false)).collect())
        .unwrap_or_default();
    let columns = ColumnIndex::resolve(&headers)?;
    let date_column = columns.position(COL_ORDER_DATE);

    // Sheet row numbers are 1-based; the header sits on the first used row.
    let header_line = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut records = Vec::new();
    for (idx, cells) in rows.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let line = header_line + 1 + idx;
        let record: StringRecord = cells
            .iter()
            .enumerate()
            .map(|(i, c)| workbook_cell(c, Some(i) == date_column))
            .collect();
        records.push(columns.parse_row(&record, line)?);
    }

    Ok(Dataset::new(records))
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn workbook_cell(cell: &Data, date_column: bool) -> String {
    let serial = |v: f64| excel_serial_date(v).map_or_else(|| v.to_string(), |d| d.to_string());
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) => s.clone(),
        Data::DateTime(dt) => serial(dt.as_f64()),
        Data::Float(v) if date_column => serial(*v),
        Data::Int(v) if date_column => serial(*v as f64),
        other => other.to_string(),
    }
}

/// Excel 1900-system serial day to a date; the time of day is dropped.
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

/// Header name -> field position for the required columns.
#[derive(Debug)]
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let by_name: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();

        let mut positions = HashMap::with_capacity(REQUIRED_COLUMNS.len());
        for column in REQUIRED_COLUMNS {
            let idx = by_name
                .get(&normalize_header_name(column))
                .ok_or(LoadError::MissingColumn(column))?;
            positions.insert(column, *idx);
        }
        Ok(Self { positions })
    }

    fn position(&self, column: &'static str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    fn text(&self, record: &StringRecord, column: &'static str) -> Option<String> {
        self.cell(record, column).map(str::to_string)
    }

    fn cell<'a>(&self, record: &'a StringRecord, column: &'static str) -> Option<&'a str> {
        let idx = self.positions.get(column)?;
        record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn number(&self, record: &StringRecord, column: &'static str, line: usize) -> Result<Option<f64>, LoadError> {
        let Some(raw) = self.cell(record, column) else {
            return Ok(None);
        };
        parse_number(raw).map(Some).ok_or_else(|| LoadError::InvalidValue {
            line,
            column,
            value: raw.to_string(),
        })
    }

    fn date(&self, record: &StringRecord, column: &'static str, line: usize) -> Result<Option<NaiveDate>, LoadError> {
        let Some(raw) = self.cell(record, column) else {
            return Ok(None);
        };
        parse_date(raw).map(Some).ok_or_else(|| LoadError::InvalidValue {
            line,
            column,
            value: raw.to_string(),
        })
    }

    fn parse_row(&self, record: &StringRecord, line: usize) -> Result<SalesRecord, LoadError> {
        Ok(SalesRecord {
            order_date: self.date(record, COL_ORDER_DATE, line)?,
            sales: self.number(record, COL_SALES, line)?,
            profit: self.number(record, COL_PROFIT, line)?,
            discount: self.number(record, COL_DISCOUNT, line)?,
            country: self.text(record, COL_COUNTRY),
            category: self.text(record, COL_CATEGORY),
            sub_category: self.text(record, COL_SUB_CATEGORY),
            segment: self.text(record, COL_SEGMENT),
            ship_mode: self.text(record, COL_SHIP_MODE),
            product_name: self.text(record, COL_PRODUCT_NAME),
        })
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel emits UTF-8 CSVs with a BOM prefix on the first header; without
    // stripping it, `Order Date` would be reported missing.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn parse_number(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Spreadsheet exports write the order date in a handful of layouts. Slash
    // dates are read month-first, the way US-locale exports write them.
    const DATE_FMTS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y", "%d/%m/%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Order Date,Sales,Profit,Discount,Country,Category,Sub-Category,Segment,Ship Mode,Product Name\n";

    #[test]
    fn reads_rows_with_missing_cells() {
        let csv = format!(
            "{HEADER}2014-01-03,100.5,-3.25,0.2,France,Furniture,Chairs,Consumer,Standard Class,Chair A\n\
             ,,,,,,,,,\n"
        );
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);

        let first = &ds.records()[0];
        assert_eq!(first.order_date, NaiveDate::from_ymd_opt(2014, 1, 3));
        assert_eq!(first.sales, Some(100.5));
        assert_eq!(first.profit, Some(-3.25));
        assert_eq!(first.sub_category.as_deref(), Some("Chairs"));

        assert_eq!(ds.records()[1], SalesRecord::default());
    }

    #[test]
    fn header_matching_ignores_case_bom_and_extra_columns() {
        let csv = "\u{feff}row id, order date ,SALES,profit,discount,country,category,sub-category,segment,ship mode,product name\n\
                   7,2012-05-06,1,2,0,Chad,Technology,Phones,Corporate,First Class,Phone\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].country.as_deref(), Some("Chad"));
        assert_eq!(ds.records()[0].sales, Some(1.0));
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "Order Date,Sales,Profit,Discount,Country,Category,Segment,Ship Mode,Product Name\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Sub-Category")));
    }

    #[test]
    fn malformed_number_reports_line_and_column() {
        let csv = format!("{HEADER}2014-01-03,abc,1,0,France,Furniture,Chairs,Consumer,Standard Class,Chair A\n");
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidValue { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, COL_SALES);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let ds = read_dataset(HEADER.as_bytes()).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2013, 11, 25);
        assert_eq!(parse_date("2013-11-25"), expected);
        assert_eq!(parse_date("2013-11-25 00:00:00"), expected);
        assert_eq!(parse_date("25-11-2013"), expected);
        assert_eq!(parse_date("11/25/2013"), expected);
        assert_eq!(parse_date("25/11/2013"), expected);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn loads_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sales_small.csv");
        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.len(), 8);
    }

    #[test]
    fn short_row_is_ragged() {
        let csv = format!("{HEADER}2014-01-03,100,1\n");
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::RaggedRow { line, expected, found } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 10);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn long_row_is_ragged() {
        let csv = format!("{HEADER}2014-01-03,1,1,0,France,Furniture,Chairs,Consumer,Standard Class,Chair A,extra\n");
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::RaggedRow { line: 2, expected: 10, found: 11 }));
    }

    #[test]
    fn workbook_matches_csv_export() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let from_xlsx = load_dataset(&dir.join("sales_small.xlsx")).unwrap();
        let from_csv = load_dataset(&dir.join("sales_small.csv")).unwrap();
        assert_eq!(from_xlsx.len(), 8);
        assert_eq!(from_xlsx.records(), from_csv.records());
        assert_eq!(from_xlsx.records()[0].order_date, NaiveDate::from_ymd_opt(2011, 1, 7));
        assert_eq!(from_xlsx.records()[7].country.as_deref(), Some("Atlantis"));
    }

    #[test]
    fn workbook_cells_become_text() {
        assert_eq!(workbook_cell(&Data::Empty, false), "");
        assert_eq!(workbook_cell(&Data::Float(0.2), false), "0.2");
        assert_eq!(workbook_cell(&Data::Float(40550.0), true), "2011-01-07");
        assert_eq!(workbook_cell(&Data::Int(41632), true), "2013-12-24");
        assert_eq!(workbook_cell(&Data::String("Chad".to_string()), true), "Chad");
        assert_eq!(excel_serial_date(0.0), None);
        assert_eq!(excel_serial_date(f64::NAN), None);
    }

    #[test]
    fn workbook_is_chosen_by_extension() {
        assert!(is_workbook(Path::new("cleaned_data.xlsx")));
        assert!(is_workbook(Path::new("DATA.XLSX")));
        assert!(!is_workbook(Path::new("cleaned_data.csv")));
        assert!(!is_workbook(Path::new("cleaned_data")));

        let err = load_dataset(Path::new("definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Workbook(_, _)));
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = load_dataset(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Open(_, _)));
    }
}
