//! spillgrid - bind dynamic-array formulas to spreadsheet ranges from the command line

mod config;
mod sample;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::Config;
use spillgrid_core::{CellRef, CellValue, Workbook, Worksheet, apply_spill_formula};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spillgrid",
    version,
    about = "Write dynamic-array (spill) formulas into .xlsx and .grd workbooks."
)]
struct Cli {
    /// Config file to use instead of the per-user config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty workbook with a single sheet.
    New { file: PathBuf },

    /// Write values into a sheet, starting at a cell. Creates the file and sheet when missing.
    Write {
        file: PathBuf,
        sheet: String,
        start: String,
        /// Values: numbers, TRUE/FALSE, or text ("quote" to force text).
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
        /// Wrap values into rows of this many columns.
        #[arg(long, value_name = "N")]
        columns: Option<usize>,
    },

    /// Bind a dynamic-array formula to START:END and save the workbook.
    Spill {
        file: PathBuf,
        sheet: String,
        start: String,
        end: String,
        #[arg(allow_hyphen_values = true)]
        formula: String,
    },

    /// Build the demo workbook with sales data and five spill formulas.
    ///
    /// Sale dates are stored as ISO 8601 text (2024-01-01), not as date serials.
    Sample { file: PathBuf },

    /// Print the stored cells of a sheet.
    Show {
        file: PathBuf,
        #[arg(long)]
        sheet: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (config, warnings) = config::load_config(cli.config.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    tracing::debug!(?config, "configuration loaded");

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::New { file } => {
            let path = output_path(config, &file)?;
            Workbook::new().save(&path)?;
            println!("Workbook created successfully at {}", path.display());
        }
        Command::Write {
            file,
            sheet,
            start,
            values,
            columns,
        } => {
            let path = output_path(config, &file)?;
            let written = write_values(&path, &sheet, &start, &values, columns)?;
            println!("Wrote {} cells to {}!{}", written, sheet, start.to_ascii_uppercase());
        }
        Command::Spill {
            file,
            sheet,
            start,
            end,
            formula,
        } => {
            let path = config.resolve(&file);
            println!("{}", apply_spill_formula(&path, &sheet, &start, &end, &formula)?);
        }
        Command::Sample { file } => {
            let path = output_path(config, &file)?;
            let (mut workbook, messages) = sample::build_sample()?;
            workbook.save(&path)?;
            for message in messages {
                println!("{}", message);
            }
            println!("Sample workbook saved to {}", path.display());
        }
        Command::Show { file, sheet } => {
            let path = config.resolve(&file);
            let workbook = Workbook::load(&path)?;
            let worksheet = match sheet {
                Some(name) => workbook.sheet(&name)?,
                None => match workbook.sheet(&config.default_sheet) {
                    Ok(ws) => ws,
                    Err(_) => workbook
                        .active_sheet()
                        .context("workbook has no sheets")?,
                },
            };
            print!("{}", render_sheet(worksheet));
        }
    }
    Ok(())
}

/// Resolve a file the command will create, making its parent directories.
fn output_path(config: &Config, file: &Path) -> Result<PathBuf> {
    let path = config.resolve(file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(path)
}

/// Load (or start) the workbook at `path`, write `values` from `start` and save it.
fn write_values(
    path: &Path,
    sheet: &str,
    start: &str,
    values: &[String],
    columns: Option<usize>,
) -> Result<usize> {
    let start = CellRef::parse(start)?;
    let width = match columns {
        Some(0) => bail!("--columns must be at least 1"),
        Some(n) => n,
        None => values.len().max(1),
    };
    let rows: Vec<Vec<CellValue>> = values
        .chunks(width)
        .map(|chunk| chunk.iter().map(|v| CellValue::from_input(v)).collect())
        .collect();

    let mut workbook = if path.exists() {
        Workbook::load(path)?
    } else {
        Workbook::new()
    };
    let written = workbook.get_or_create_sheet(sheet)?.write_rows(start, &rows)?;
    workbook
        .save(path)
        .with_context(|| format!("writing {} cells to {}", written, sheet))?;
    Ok(written)
}

fn render_sheet(sheet: &Worksheet) -> String {
    let mut out = format!("[{}]\n", sheet.name());
    for (cell_ref, cell) in sheet.cells_sorted() {
        out.push_str(&format!("{}: {}\n", cell_ref, cell));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn write_values_wraps_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.grd");
        let values: Vec<String> = ["Name", "Score", "Alice", "85", "Bob", "-3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let written = write_values(&path, "Scores", "b2", &values, Some(2)).unwrap();
        assert_eq!(written, 6);

        let workbook = Workbook::load(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Sheet", "Scores"]);
        let rendered = render_sheet(workbook.sheet("Scores").unwrap());
        assert_eq!(
            rendered,
            "[Scores]\nB2: \"Name\"\nC2: \"Score\"\nB3: \"Alice\"\nC3: 85\nB4: \"Bob\"\nC4: -3\n"
        );
    }

    #[test]
    fn output_path_creates_missing_files_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            files_path: Some(dir.path().join("spills").join("2024")),
            ..Config::default()
        };
        let path = output_path(&config, Path::new("book.xlsx")).unwrap();
        assert_eq!(path, dir.path().join("spills/2024/book.xlsx"));
        assert!(dir.path().join("spills/2024").is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn write_values_rejects_zero_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.grd");
        let err = write_values(&path, "Sheet", "A1", &["1".to_string()], Some(0)).unwrap_err();
        assert!(err.to_string().contains("--columns"));
        assert!(!path.exists());
    }
}
