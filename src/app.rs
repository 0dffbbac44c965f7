//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the sales dataset once
//! - runs the dashboard, the text report or an export

use clap::Parser;

use crate::cli::{Command, ExportArgs, TuiArgs, ViewArgs};
use crate::domain::Dataset;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // `SALES_DATA` may come from a local `.env`.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    simple_logger::init_with_level(if cli.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })
    .map_err(|e| AppError::new(4, format!("Failed to initialize logger: {e}")))?;

    let dataset = crate::io::ingest::load_dataset(&cli.data)?;
    if dataset.is_empty() {
        log::warn!("{} has no data rows; every chart will be empty", cli.data.display());
    }

    match cli.command {
        Command::Tui(args) => handle_tui(dataset, args),
        Command::Report(args) => handle_report(&dataset, &args),
        Command::Export(args) => handle_export(&dataset, &args),
    }
}

fn handle_tui(dataset: Dataset, args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(dataset, args.export_dir)
}

fn handle_report(dataset: &Dataset, args: &ViewArgs) -> Result<(), AppError> {
    let output = pipeline::render_view(dataset, &args.params())?;
    println!("{}", crate::report::format_render(&output));
    Ok(())
}

fn handle_export(dataset: &Dataset, args: &ExportArgs) -> Result<(), AppError> {
    let output = pipeline::render_view(dataset, &args.view.params())?;
    let written = crate::io::export::write_view_export(&args.out, &output, args.format)?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

/// Rewrite argv so `sales` defaults to `sales tui`.
///
/// Rules:
/// - `sales`                          -> `sales tui`
/// - `sales --data x.csv ...`         -> `sales tui --data x.csv ...`
/// - `sales --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report" | "export");
    if is_subcommand {
        return argv;
    }

    // Global flags before a subcommand name are still valid clap input.
    if arg1.starts_with('-') && !argv.iter().skip(2).any(|a| matches!(a.as_str(), "tui" | "report" | "export")) {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["sales"])), argv(&["sales", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["sales", "--data", "x.csv"])),
            argv(&["sales", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        for args in [
            &["sales", "report", "--view", "key-insights"][..],
            &["sales", "--help"][..],
            &["sales", "-V"][..],
            &["sales", "--data", "x.csv", "export"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }
}
