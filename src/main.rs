//! Builds drop chance CSV reports from DropTable and DropPackageTable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dropchance::config::{load_config, DropChanceConfig, CONFIG_FILE_NAME};
use dropchance::logging;
use dropchance::output::write_reports;
use dropchance::report::DropReport;
use dropchance::tables::Tables;

#[derive(Parser)]
#[command(
    name = "dropchance",
    version,
    about = "Generate drop chance CSV reports from drop tables"
)]
struct Cli {
    /// Data root holding the tables (or a `ztable/` directory with them).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file. Defaults to `<root>/dropchance.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write `award_<id>.csv` files and `index.csv` (the default).
    Build {
        /// Output directory, relative paths resolve against the data root.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Decimal places for probability columns.
        #[arg(short, long)]
        precision: Option<usize>,
    },
    /// Print the drop chances of a single award.
    Show {
        award_id: i64,

        #[arg(short, long)]
        precision: Option<usize>,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = resolve_config(&cli)?;

    match cli.command.unwrap_or(Command::Build {
        out: None,
        precision: None,
    }) {
        Command::Build { out, precision } => {
            if let Some(out) = out {
                config.output_dir = out;
            }
            apply_precision(&mut config, precision)?;
            cmd_build(&config)
        }
        Command::Show {
            award_id,
            precision,
        } => {
            apply_precision(&mut config, precision)?;
            cmd_show(&config, award_id)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<DropChanceConfig> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
    let mut config = load_config(&path).with_context(|| format!("load {}", path.display()))?;
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    Ok(config)
}

fn apply_precision(config: &mut DropChanceConfig, precision: Option<usize>) -> Result<()> {
    if let Some(precision) = precision {
        config.precision = precision;
    }
    config.validate().context("validate config")?;
    Ok(())
}

fn load_report(config: &DropChanceConfig) -> Result<DropReport> {
    let tables = Tables::load(config).context("load drop tables")?;
    DropReport::new(tables).context("parse drop tables")
}

fn cmd_build(config: &DropChanceConfig) -> Result<()> {
    let report = load_report(config)?;
    let output_dir = config.output_dir();
    let summary = write_reports(&report, &output_dir, config.precision)
        .with_context(|| format!("write reports to {}", output_dir.display()))?;
    println!(
        "wrote {} award files and {} index rows to {}",
        summary.award_files,
        summary.index_rows,
        summary.output_dir.display()
    );
    Ok(())
}

fn cmd_show(config: &DropChanceConfig, award_id: i64) -> Result<()> {
    let report = load_report(config)?;
    let table = report.award_table(award_id, config.precision)?;
    println!("{table}");
    Ok(())
}
