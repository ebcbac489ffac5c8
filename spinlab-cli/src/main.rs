//! SpinLab CLI: record spins and analyze the history.
//!
//! Commands:
//! - `analyze`: run every analysis stage over a history and print the report
//! - `record`: append spin results to the JSONL history
//! - `history show` / `history clear`: inspect or reset the history
//! - `simulate`: generate a seeded synthetic history (fair or biased wheel)
//! - `windows`: export rolling feature windows as CSV
//! - `backtest`: walk-forward check of past predictions against later spins
//!
//! Logging goes to stderr, filtered by `SPINLAB_LOG` (default `warn`).

mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use spinlab_core::features::{extract_windows, DEFAULT_WINDOW_SIZE, MIN_TRAINING_WINDOWS};
use spinlab_core::synthetic::{biased_spins, uniform_spins};
use spinlab_core::{analyze, AnalysisConfig, Outcome, OutcomeSequence};
use spinlab_runner::{
    export_report_json, export_walk_forward_csv, export_windows_csv, load_file, parse_text,
    run_walk_forward, save_artifacts, SpinHistory, WalkForwardConfig,
};

const DEFAULT_HISTORY: &str = "spins.jsonl";
const LOG_ENV: &str = "SPINLAB_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(
    name = "spinlab",
    version,
    about = "SpinLab CLI: descriptive statistics over roulette spin histories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where spins are read from: an input file, or the recorded history.
#[derive(Args)]
struct Source {
    /// Text or CSV file of spin results. Overrides --history.
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSONL spin history.
    #[arg(long, default_value = DEFAULT_HISTORY)]
    history: PathBuf,
}

impl Source {
    fn load(&self) -> Result<OutcomeSequence> {
        match &self.input {
            Some(path) => load_file(path).with_context(|| format!("loading {}", path.display())),
            None => SpinHistory::new(&self.history)
                .replay()
                .with_context(|| format!("replaying {}", self.history.display())),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a spin history and print the report.
    Analyze {
        #[command(flatten)]
        source: Source,

        /// Path to a TOML analysis config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also save report.json, numbers.csv and windows.csv under this directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Append spin results to the history.
    Record {
        /// Results, e.g. `17 0 32` or `17,0,32`.
        #[arg(required = true)]
        numbers: Vec<String>,

        /// JSONL spin history.
        #[arg(long, default_value = DEFAULT_HISTORY)]
        history: PathBuf,
    },
    /// Inspect or reset the recorded history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Generate a seeded synthetic history.
    Simulate {
        /// Number of spins.
        #[arg(long, default_value_t = 200)]
        count: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pockets the simulated wheel favors.
        #[arg(long, num_args = 1..)]
        favor: Vec<i64>,

        /// Probability that a spin lands on a favored pocket (0-1).
        #[arg(long, default_value_t = 0.0)]
        bias: f64,

        /// Append the spins to this history instead of printing them.
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Export rolling feature windows as CSV.
    Windows {
        #[command(flatten)]
        source: Source,

        /// Spins per window.
        #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
        size: usize,

        /// Write CSV here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Score past predictions against the spin that followed.
    Backtest {
        #[command(flatten)]
        source: Source,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Spins analyzed before the first scored prediction.
        #[arg(long, default_value_t = 20)]
        warmup: usize,

        /// Evaluate on one thread.
        #[arg(long, default_value_t = false)]
        serial: bool,

        /// Print the full result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write per-step CSV here.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print the recorded spins.
    Show {
        /// Only the most recent N spins.
        #[arg(long)]
        last: Option<usize>,

        #[arg(long, default_value = DEFAULT_HISTORY)]
        history: PathBuf,
    },
    /// Delete every recorded spin.
    Clear {
        #[arg(long, default_value = DEFAULT_HISTORY)]
        history: PathBuf,

        /// Actually delete (without this flag, only reports what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

/// Directives from `SPINLAB_LOG`; unset or unparsable falls back to `warn`.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing() {
    let filter = log_filter(std::env::var(LOG_ENV).ok());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            config,
            json,
            output,
        } => run_analyze(&source, config.as_deref(), json, output.as_deref()),
        Commands::Record { numbers, history } => run_record(&numbers, &history),
        Commands::History { action } => match action {
            HistoryAction::Show { last, history } => run_history_show(&history, last),
            HistoryAction::Clear { history, confirm } => run_history_clear(&history, confirm),
        },
        Commands::Simulate {
            count,
            seed,
            favor,
            bias,
            record,
        } => run_simulate(count, seed, &favor, bias, record.as_deref()),
        Commands::Windows {
            source,
            size,
            output,
        } => run_windows(&source, size, output.as_deref()),
        Commands::Backtest {
            source,
            config,
            warmup,
            serial,
            json,
            csv,
        } => run_backtest(
            &source,
            config.as_deref(),
            WalkForwardConfig {
                warmup,
                parallel: !serial,
            },
            json,
            csv.as_deref(),
        ),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => {
            let config = AnalysisConfig::from_file(p)?;
            debug!(path = %p.display(), hash = %config.config_hash(), "loaded config");
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn run_analyze(
    source: &Source,
    config_path: Option<&Path>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let spins = source.load()?;
    let report = analyze(&spins, &config);

    if json {
        println!("{}", export_report_json(&report)?);
    } else {
        print!("{}", render::analysis_report(&report));
    }

    if let Some(dir) = output {
        let windows = extract_windows(&spins, DEFAULT_WINDOW_SIZE);
        let run_dir = save_artifacts(&report, &windows, dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_record(numbers: &[String], history_path: &Path) -> Result<()> {
    let spins = parse_text(&numbers.join(" "))?;
    let history = SpinHistory::new(history_path);
    let appended = history.append_many(spins.as_slice())?;
    let total = history.count()?;
    println!(
        "Recorded {appended} spin(s): {}. History now holds {total}.",
        join_numbers(&spins)
    );
    Ok(())
}

fn run_history_show(history_path: &Path, last: Option<usize>) -> Result<()> {
    let records = SpinHistory::new(history_path).read_all()?;
    if records.is_empty() {
        println!("No spins recorded in {}", history_path.display());
        return Ok(());
    }
    let skip = last.map_or(0, |n| records.len().saturating_sub(n));
    println!("History: {} ({} spins)", history_path.display(), records.len());
    println!("{:>6}  {:>6}  {:<6}  Recorded", "#", "Number", "Color");
    println!("{}", "-".repeat(44));
    for (i, record) in records.iter().enumerate().skip(skip) {
        println!(
            "{:>6}  {:>6}  {:<6}  {}",
            i + 1,
            record.number,
            record.number.color().to_string(),
            record.recorded_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn run_history_clear(history_path: &Path, confirm: bool) -> Result<()> {
    let history = SpinHistory::new(history_path);
    let count = history.count()?;
    if count == 0 {
        println!("History is already empty: {}", history_path.display());
        return Ok(());
    }
    if !confirm {
        println!("{count} spin(s) in {}", history_path.display());
        println!("Dry run: pass --confirm to actually delete.");
        return Ok(());
    }
    history.clear()?;
    println!("Removed {count} spin(s).");
    Ok(())
}

fn run_simulate(
    count: usize,
    seed: u64,
    favor: &[i64],
    bias: f64,
    record: Option<&Path>,
) -> Result<()> {
    if !(0.0..=1.0).contains(&bias) {
        bail!("--bias must be between 0 and 1, got {bias}");
    }
    if bias > 0.0 && favor.is_empty() {
        bail!("--bias needs at least one --favor pocket");
    }
    let favored = favor
        .iter()
        .map(|&n| Outcome::new(n))
        .collect::<Result<Vec<_>, _>>()?;

    let spins = if favored.is_empty() {
        uniform_spins(seed, count)
    } else {
        biased_spins(seed, count, &favored, bias)
    };
    info!(count, seed, bias, "simulated spins");

    match record {
        Some(path) => {
            let appended = SpinHistory::new(path).append_many(spins.as_slice())?;
            println!("Appended {appended} simulated spin(s) to {}", path.display());
        }
        None => println!("{}", join_numbers(&spins)),
    }
    Ok(())
}

fn run_windows(source: &Source, size: usize, output: Option<&Path>) -> Result<()> {
    if size == 0 {
        bail!("--size must be at least 1");
    }
    let spins = source.load()?;
    let windows = extract_windows(&spins, size);
    if windows.len() < MIN_TRAINING_WINDOWS {
        eprintln!(
            "WARNING: only {} window(s); at least {MIN_TRAINING_WINDOWS} are needed to train on",
            windows.len()
        );
    }
    let csv = export_windows_csv(&windows)?;
    match output {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {} window(s) to {}", windows.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn run_backtest(
    source: &Source,
    config_path: Option<&Path>,
    walk_forward: WalkForwardConfig,
    json: bool,
    csv: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let spins = source.load()?;
    let result = run_walk_forward(&spins, &config, &walk_forward)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to serialize walk-forward result")?
        );
    } else {
        print!("{}", render::walk_forward_summary(&result));
        println!();
        println!("Hit rates describe the past only; a fair wheel has no memory.");
    }

    if let Some(path) = csv {
        std::fs::write(path, export_walk_forward_csv(&result)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Per-step results saved to: {}", path.display());
    }
    Ok(())
}

fn join_numbers(spins: &OutcomeSequence) -> String {
    spins
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
