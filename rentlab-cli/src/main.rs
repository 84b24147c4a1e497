//! Rentlab CLI: rental-contract summaries, smoothing and decomposition.
//!
//! Commands:
//! - `summary` print the per-store or per-category table with its Total row
//! - `smooth` print raw and calendar-window smoothed daily series
//! - `decompose` print trend, seasonal and residual components
//! - `report` run the whole dashboard pass
//! - `synth` write a deterministic synthetic contracts CSV

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use rentlab_core::analytics::labels::{seasonal_label, window_label};
use rentlab_core::analytics::{smooth, Decomposer, Locale, SummaryTable};
use rentlab_core::data::{
    daily_mean, write_synthetic, DailyMetric, FilterParams, LoadReport, StoreCache, SyntheticSpec,
};
use rentlab_core::domain::{Category, DailyPoint, DecompositionResult, GroupKey};
use rentlab_core::{AnalyticsConfig, AnalyticsError, Dashboard, TotalMeanPolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rentlab", about = "Rentlab CLI: rental contract analytics")]
struct Cli {
    /// Analytics config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Use record-weighted means in the Total row.
    #[arg(long, global = true, default_value_t = false)]
    weighted_total: bool,

    /// Label language.
    #[arg(long, global = true, value_enum)]
    locale: Option<LocaleArg>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grouped summary table with a Total row.
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Grouping dimension.
        #[arg(long, value_enum, default_value_t = By::Store)]
        by: By,
    },
    /// Daily series with rolling calendar means.
    Smooth {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = MetricArg::Contracts)]
        metric: MetricArg,
    },
    /// Multi-seasonal trend decomposition of a daily series.
    Decompose {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = MetricArg::Contracts)]
        metric: MetricArg,
    },
    /// Full dashboard pass.
    Report {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Write a synthetic contracts CSV.
    Synth {
        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,

        /// Number of calendar days to generate.
        #[arg(long, default_value_t = 900)]
        days: u32,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of stores.
        #[arg(long, default_value_t = 5)]
        stores: u32,

        /// First contract date (YYYY-MM-DD). Defaults to 2022-01-01.
        #[arg(long)]
        start: Option<String>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Contracts CSV file.
    #[arg(long)]
    data: PathBuf,

    /// Restrict to these store ids (repeatable).
    #[arg(long = "store")]
    stores: Vec<String>,

    /// Restrict to these vehicle categories (repeatable).
    #[arg(long = "category")]
    categories: Vec<String>,

    /// First start date, inclusive (YYYY-MM-DD). Needs --end.
    #[arg(long)]
    start: Option<String>,

    /// Last start date, inclusive (YYYY-MM-DD). Needs --start.
    #[arg(long)]
    end: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum By {
    Store,
    Category,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Contracts,
    DailyRate,
}

#[derive(Clone, Copy, ValueEnum)]
enum LocaleArg {
    Pt,
    En,
}

impl From<By> for GroupKey {
    fn from(by: By) -> Self {
        match by {
            By::Store => GroupKey::Store,
            By::Category => GroupKey::VehicleCategory,
        }
    }
}

impl From<MetricArg> for DailyMetric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Contracts => DailyMetric::Contracts,
            MetricArg::DailyRate => DailyMetric::DailyRate,
        }
    }
}

impl From<LocaleArg> for Locale {
    fn from(l: LocaleArg) -> Self {
        match l {
            LocaleArg::Pt => Locale::Pt,
            LocaleArg::En => Locale::En,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

impl InputArgs {
    fn filter(&self) -> Result<FilterParams> {
        let start = self.start.as_deref().map(parse_date).transpose()?;
        let end = self.end.as_deref().map(parse_date).transpose()?;
        if start.is_some() != end.is_some() {
            warn!("date range ignored: both --start and --end are required");
        }
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                bail!("--start {s} is after --end {e}");
            }
        }
        Ok(FilterParams {
            stores: self.stores.iter().map(|s| Category::parse(s)).collect(),
            categories: self.categories.iter().cloned().collect(),
            start,
            end,
        })
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => AnalyticsConfig::from_file(path)?,
        None => AnalyticsConfig::default(),
    };
    if cli.weighted_total {
        config.total_mean = TotalMeanPolicy::RecordWeighted;
    }
    if let Some(locale) = cli.locale {
        config.locale = locale.into();
    }

    let cache = StoreCache::new();
    match cli.command {
        Commands::Summary { input, by } => run_summary(&cache, &input, by.into(), &config, cli.format),
        Commands::Smooth { input, metric } => {
            run_smooth(&cache, &input, metric.into(), &config, cli.format)
        }
        Commands::Decompose { input, metric } => {
            run_decompose(&cache, &input, metric.into(), &config, cli.format)
        }
        Commands::Report { input } => run_report(&cache, &input, &config, cli.format),
        Commands::Synth {
            out,
            days,
            seed,
            stores,
            start,
        } => run_synth(out, days, seed, stores, start),
    }
}

fn load(cache: &StoreCache, input: &InputArgs) -> Result<std::sync::Arc<LoadReport>> {
    let report = cache
        .get_or_load(&input.data)
        .with_context(|| format!("loading {}", input.data.display()))?;
    if !report.rejected.is_empty() {
        eprintln!(
            "{} rows rejected (run with --verbose for details)",
            report.rejected.len()
        );
    }
    Ok(report)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_summary(
    cache: &StoreCache,
    input: &InputArgs,
    key: GroupKey,
    config: &AnalyticsConfig,
    format: Format,
) -> Result<()> {
    let loaded = load(cache, input)?;
    let records = input.filter()?.apply(loaded.store.records());
    let table = SummaryTable::build(&records, key, config.total_mean);

    match format {
        Format::Json => print_json(&table),
        Format::Text => {
            if table.is_empty() {
                println!("No data for the selected filters.");
            } else {
                print!("{}", table.to_text(config.locale));
            }
            Ok(())
        }
    }
}

fn run_smooth(
    cache: &StoreCache,
    input: &InputArgs,
    metric: DailyMetric,
    config: &AnalyticsConfig,
    format: Format,
) -> Result<()> {
    let loaded = load(cache, input)?;
    let records = input.filter()?.apply(loaded.store.records());
    let series = smooth(&daily_mean(&records, metric), &config.windows)?;

    if format == Format::Json {
        return print_json(&series);
    }
    let mut header = format!("{:<12} {:>14}", "date", metric.label(config.locale));
    for w in &series.windows {
        header.push_str(&format!(" {:>20}", window_label(*w, config.locale)));
    }
    println!("{header}");
    for p in &series.points {
        let mut line = format!("{:<12} {:>14.2}", p.date.to_string(), p.raw);
        for m in &p.means {
            line.push_str(&format!(" {m:>20.2}"));
        }
        println!("{line}");
    }
    Ok(())
}

fn run_decompose(
    cache: &StoreCache,
    input: &InputArgs,
    metric: DailyMetric,
    config: &AnalyticsConfig,
    format: Format,
) -> Result<()> {
    let loaded = load(cache, input)?;
    let records = input.filter()?.apply(loaded.store.records());
    let decomposer = Decomposer::with_config(&config.periods, &config.decomposition)?;
    let Some(result) = decompose_selection(&decomposer, &daily_mean(&records, metric))? else {
        return match format {
            Format::Json => print_json(&DecompositionResult {
                periods: decomposer.periods(),
                points: Vec::new(),
            }),
            Format::Text => {
                println!("No data for the selected filters.");
                Ok(())
            }
        };
    };
    info!(
        "decomposed {} days ({} imputed)",
        result.len(),
        result.imputed_count()
    );

    if format == Format::Json {
        return print_json(&result);
    }
    let mut header = format!("{:<12} {:>12} {:>12}", "date", "observed", "trend");
    for p in &result.periods {
        header.push_str(&format!(" {:>24}", seasonal_label(*p, config.locale)));
    }
    header.push_str(&format!(" {:>12}", "residual"));
    println!("{header}");
    for p in &result.points {
        let marker = if p.imputed { "*" } else { " " };
        let mut line = format!(
            "{:<12} {:>11.2}{marker} {:>12.2}",
            p.date.to_string(),
            p.observed,
            p.trend
        );
        for s in &p.seasonal {
            line.push_str(&format!(" {s:>24.2}"));
        }
        line.push_str(&format!(" {:>12.2}", p.residual));
        println!("{line}");
    }
    Ok(())
}

/// Decompose, mapping an empty selection to `None` like the summary does.
fn decompose_selection(
    decomposer: &Decomposer,
    points: &[DailyPoint],
) -> Result<Option<DecompositionResult>, AnalyticsError> {
    match decomposer.decompose(points) {
        Ok(result) => Ok(Some(result)),
        Err(e) if e.is_soft() => Ok(None),
        Err(e) => Err(e),
    }
}

fn run_report(
    cache: &StoreCache,
    input: &InputArgs,
    config: &AnalyticsConfig,
    format: Format,
) -> Result<()> {
    let loaded = load(cache, input)?;
    let report = Dashboard::compute(&loaded.store, &input.filter()?, config);
    match format {
        Format::Json => print_json(&report),
        Format::Text => {
            print!("{}", report.to_text());
            Ok(())
        }
    }
}

fn run_synth(out: PathBuf, days: u32, seed: u64, stores: u32, start: Option<String>) -> Result<()> {
    if days == 0 {
        bail!("--days must be at least 1");
    }
    let mut spec = SyntheticSpec {
        days,
        seed,
        stores,
        ..SyntheticSpec::default()
    };
    if let Some(s) = start.as_deref() {
        spec.start = parse_date(s)?;
    }
    let count = write_synthetic(&out, &spec)?;
    println!("Wrote {count} contracts to {}", out.display());
    Ok(())
}
