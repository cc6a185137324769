//! Screener CLI: function catalog, criteria validation and ranking commands.
//!
//! Commands:
//! - `functions` prints every function schema, flat or grouped
//! - `schema <NAME>` prints one function schema
//! - `operators` lists comparison operators
//! - `validate` normalizes a raw criteria file against the catalog
//! - `rank` profiles subjects from a JSON fixture against a criteria file

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{prelude::*, EnvFilter};

use screener_core::criteria::{
    bootstrap, comparison_registry, from_records, function_registry, parse_raw_criteria,
    to_records, Criteria,
};
use screener_core::domain::{Bar, StockSubject};
use screener_runner::{RankingService, ScreenerConfig, StockSet, StockSetCatalog};

#[derive(Parser)]
#[command(name = "screener", about = "Stock screener rule engine")]
struct Cli {
    /// Also append logs to this file (without ANSI colours).
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema of every registered function as JSON.
    Functions {
        /// Group schemas by function group.
        #[arg(long, default_value_t = false)]
        grouped: bool,
    },
    /// Print the schema of one function as JSON.
    Schema {
        /// Registered function name (e.g. RSI).
        name: String,
    },
    /// List the comparison operators.
    Operators,
    /// Validate a raw criteria file and print the normalized records.
    Validate {
        /// JSON file holding one raw criterion or an array of them.
        #[arg(long)]
        criteria: PathBuf,
    },
    /// Rank subjects against criteria and print their profiles as JSON.
    Rank {
        /// JSON file holding one raw criterion or an array of them.
        #[arg(long)]
        criteria: PathBuf,

        /// JSON fixture: [{symbol, bars, index?}].
        #[arg(long)]
        subjects: PathBuf,

        /// Screener TOML config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stock set catalog TOML.
        #[arg(long, requires = "set")]
        stock_sets: Option<PathBuf>,

        /// Stock set to rank: kse100, kse50, kse30, or custom:SYM1,SYM2.
        #[arg(long)]
        set: Option<String>,
    },
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;
    bootstrap();

    match cli.command {
        Commands::Functions { grouped } => {
            print_json(&function_registry().generate_all_schemas(grouped))
        }
        Commands::Schema { name } => run_schema(&name),
        Commands::Operators => {
            for op in comparison_registry().operators() {
                println!("{op}");
            }
            Ok(())
        }
        Commands::Validate { criteria } => run_validate(&criteria),
        Commands::Rank {
            criteria,
            subjects,
            config,
            stock_sets,
            set,
        } => run_rank(
            &criteria,
            &subjects,
            config.as_deref(),
            stock_sets.as_deref(),
            set.as_deref(),
        ),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn run_schema(name: &str) -> Result<()> {
    let schema = function_registry().generate_schema(name)?;
    print_json(&schema)
}

fn load_criteria(path: &Path, ignore_unsupported: bool) -> Result<Criteria> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read criteria file {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse criteria JSON {}", path.display()))?;
    let records = parse_raw_criteria(&raw)
        .with_context(|| format!("malformed criteria in {}", path.display()))?;
    from_records(function_registry(), records, ignore_unsupported)
        .with_context(|| format!("invalid criteria in {}", path.display()))
}

fn run_validate(path: &Path) -> Result<()> {
    let criteria = load_criteria(path, false)?;
    tracing::info!(criteria = criteria.len(), "criteria valid");
    print_json(&to_records(&criteria))
}

// ─── Subjects fixture ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SubjectFixture {
    symbol: String,
    bars: Vec<Bar>,
    #[serde(default)]
    index: Vec<Bar>,
}

impl From<SubjectFixture> for StockSubject {
    fn from(fixture: SubjectFixture) -> Self {
        StockSubject::new(fixture.symbol, fixture.bars).with_index(Arc::new(fixture.index))
    }
}

fn parse_subjects(content: &str) -> Result<Vec<StockSubject>> {
    let fixtures: Vec<SubjectFixture> =
        serde_json::from_str(content).context("failed to parse subjects JSON")?;
    for fixture in &fixtures {
        let insane = fixture.bars.iter().filter(|b| !b.is_sane()).count();
        if insane > 0 {
            tracing::warn!(symbol = %fixture.symbol, bars = insane, "fixture has malformed bars");
        }
    }
    Ok(fixtures.into_iter().map(StockSubject::from).collect())
}

fn load_subjects(path: &Path) -> Result<Vec<StockSubject>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read subjects file {}", path.display()))?;
    parse_subjects(&content).with_context(|| format!("in {}", path.display()))
}

fn run_rank(
    criteria_path: &Path,
    subjects_path: &Path,
    config_path: Option<&Path>,
    stock_sets_path: Option<&Path>,
    set: Option<&str>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ScreenerConfig::from_file(path)?,
        None => ScreenerConfig::default(),
    };
    let criteria = load_criteria(criteria_path, config.ignore_unsupported_functions)?;
    let subjects = load_subjects(subjects_path)?;
    let service = RankingService::from_config(&config)?;

    let profiles = match set {
        Some(name) => {
            let set: StockSet = name.parse()?;
            let catalog = match stock_sets_path {
                Some(path) => StockSetCatalog::from_file(path)?,
                None => StockSetCatalog::default(),
            };
            service.rank_stock_set(&catalog, &set, &subjects, &criteria)?
        }
        None => service.generate_stocks_risk_profile(&subjects, &criteria)?,
    };
    print_json(&profiles)
}
