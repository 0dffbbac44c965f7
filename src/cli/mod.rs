//! Command-line parsing for the sales dashboard.
//!
//! Argument parsing and command dispatch stay separate from the aggregation
//! and rendering code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{CategorySelection, View, ViewParams};
use crate::io::export::ExportFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales dashboard for the cleaned superstore dataset")]
pub struct Cli {
    /// Cleaned sales data: the workbook (`.xlsx`, `.xls`, `.ods`) or its CSV export.
    #[arg(long, global = true, env = "SALES_DATA", default_value = "cleaned_data.xlsx")]
    pub data: PathBuf,

    /// Increase output logging verbosity.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
    /// Print one view as a plain-text report.
    Report(ViewArgs),
    /// Write the tables of one view to disk.
    Export(ExportArgs),
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Where `e` writes the current view's tables.
    #[arg(long, default_value = "export")]
    pub export_dir: PathBuf,
}

/// View selection shared by `report` and `export`.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Which analysis to show.
    #[arg(long, value_enum, default_value_t = View::SalesAnalysis)]
    pub view: View,

    /// Category for the discount drill-down (defaults to the first one in the data).
    #[arg(short, long)]
    pub category: Option<String>,
}

impl ViewArgs {
    pub fn params(&self) -> ViewParams {
        ViewParams {
            view: self.view,
            category: match &self.category {
                Some(name) => CategorySelection::Named(name.clone()),
                None => CategorySelection::First,
            },
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output directory.
    #[arg(short, long, default_value = "export")]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_with_category() {
        let cli = Cli::parse_from(["sales", "--data", "d.csv", "report", "--view", "key-insights", "-c", "Furniture"]);
        assert_eq!(cli.data, PathBuf::from("d.csv"));
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.params(), ViewParams {
            view: View::KeyInsights,
            category: CategorySelection::Named("Furniture".to_string()),
        });
    }

    #[test]
    fn export_defaults() {
        let cli = Cli::parse_from(["sales", "export", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.data, PathBuf::from("cleaned_data.xlsx"));
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.out, PathBuf::from("export"));
        assert_eq!(args.format, ExportFormat::Csv);
        assert_eq!(args.view.view, View::SalesAnalysis);
        assert_eq!(args.view.category, None);
        assert_eq!(args.view.params().category, CategorySelection::First);
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
