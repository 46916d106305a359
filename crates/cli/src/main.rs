use agg_builder::AggregationBuilder;
use agg_date_range::{parse_timestamp, resolve_at, DateRangeParams, TimeSpan};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use config::{load_options, ConfigFormat};
use serde::Serialize;
use std::path::PathBuf;

mod config;

#[derive(Parser)]
#[command(name = "agg-build")]
#[command(about = "Build threshold-rule aggregation requests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the aggregation section for a set of options
    Build(BuildArgs),

    /// Resolve a time window into absolute date ranges
    Ranges(RangesArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Options file (JSON or TOML); reads JSON from stdin when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Options format (defaults to the file extension)
    #[arg(long, value_enum)]
    format: Option<ConfigFormat>,

    /// Reference time for relative windows (RFC 3339 or epoch millis)
    #[arg(long)]
    now: Option<String>,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Args)]
struct RangesArgs {
    /// Window length, e.g. `5m`
    #[arg(long)]
    window: String,

    /// Sub-interval to split the window into, e.g. `1m`
    #[arg(long)]
    interval: Option<String>,

    /// Absolute window start
    #[arg(long)]
    start: Option<String>,

    /// Absolute window end (defaults to now)
    #[arg(long)]
    end: Option<String>,

    /// Reference time used when `--end` is omitted
    #[arg(long)]
    now: Option<String>,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Ranges(args) => run_ranges(args),
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    let options = load_options(args.config.as_deref(), args.format)?;

    let mut builder = AggregationBuilder::new();
    if let Some(now) = parse_now(args.now.as_deref())? {
        builder = builder.at(now);
    }
    let spec = builder
        .build(&options)
        .context("Failed to build aggregation")?;

    print_json(&spec, args.compact)
}

fn run_ranges(args: RangesArgs) -> Result<()> {
    let window: TimeSpan = args
        .window
        .parse()
        .with_context(|| format!("Invalid --window '{}'", args.window))?;

    let params = DateRangeParams {
        date_start: args.start,
        date_end: args.end,
        window_size: window.size,
        window_unit: window.unit.as_str().to_string(),
        interval: args.interval,
    };
    let now = parse_now(args.now.as_deref())?.unwrap_or_else(Utc::now);
    let info = resolve_at(&params, now).context("Failed to resolve date ranges")?;
    log::info!("Resolved {} range(s)", info.date_ranges.len());

    print_json(&info, args.compact)
}

fn parse_now(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|raw| parse_timestamp(raw).with_context(|| format!("Invalid --now '{raw}'")))
        .transpose()
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}
