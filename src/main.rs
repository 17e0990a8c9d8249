use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use pulseparse::config::MetricsConfig;
use pulseparse::engine::{AthleteContext, MetricsEngine};
use pulseparse::export::{export_index_csv, export_report_json};
use pulseparse::import::import_samples;
use pulseparse::logging::{init_logging, LogConfig};
use pulseparse::models::DailySample;
use pulseparse::zones::estimate_max_hr_from_age;

/// pulseparse - Training Readiness Metrics CLI
///
/// Computes readiness scores, acute:chronic load ratios, a training index
/// series, and adaptive target heart rate zones from daily wearable data.
#[derive(Parser)]
#[command(name = "pulseparse")]
#[command(version = "0.1.0")]
#[command(about = "Training readiness metrics from daily wearable data", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full metrics report for a date
    Report {
        /// Daily samples file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Report date (YYYY-MM-DD, default: last sample date)
        #[arg(short, long)]
        as_of: Option<NaiveDate>,

        /// Maximum heart rate in bpm
        #[arg(long)]
        max_hr: Option<u16>,

        /// Age in years, for 220-age max HR estimation when --max-hr is absent
        #[arg(long)]
        age: Option<u8>,

        /// Resting heart rate in bpm (derived from samples if omitted)
        #[arg(long)]
        resting_hr: Option<u16>,

        /// Acute window in days
        #[arg(long)]
        acute: Option<u16>,

        /// Chronic window in days
        #[arg(long)]
        chronic: Option<u16>,

        /// Write the report as JSON to this path instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the adapted five-zone heart rate table for a date
    Zones {
        /// Daily samples file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Zone date (YYYY-MM-DD, default: last sample date)
        #[arg(short, long)]
        as_of: Option<NaiveDate>,

        /// Maximum heart rate in bpm
        #[arg(long)]
        max_hr: Option<u16>,

        /// Age in years, for 220-age max HR estimation when --max-hr is absent
        #[arg(long)]
        age: Option<u8>,

        /// Resting heart rate in bpm (derived from samples if omitted)
        #[arg(long)]
        resting_hr: Option<u16>,
    },

    /// Print or export the training index series
    Index {
        /// Daily samples file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Write the series as CSV to this path instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of most recent days to print
        #[arg(short, long, default_value = "14")]
        limit: usize,
    },
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Target")]
    target: &'static str,
}

#[derive(Tabled)]
struct IndexRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Index")]
    value: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_verbosity(cli.verbose))?;

    let mut config = match &cli.config {
        Some(path) => MetricsConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MetricsConfig::load_or_default()?,
    };

    match cli.command {
        Commands::Report {
            file,
            as_of,
            max_hr,
            age,
            resting_hr,
            acute,
            chronic,
            output,
        } => {
            if let Some(acute) = acute {
                config.load.acute_days = acute;
            }
            if let Some(chronic) = chronic {
                config.load.chronic_days = chronic;
            }
            config.load.validate()?;

            let samples = import_samples(&file)?;
            let as_of = resolve_as_of(&samples, as_of)?;
            let athlete = resolve_athlete(max_hr, age, resting_hr)?;

            let engine = MetricsEngine::with_config(config)?;
            let report = engine.report(&samples, as_of, &athlete)?;

            if let Some(output) = output {
                export_report_json(&report, &output)?;
                println!("{} {}", "Report written to".green(), output.display());
                return Ok(());
            }

            println!("{}", format!("Metrics for {}", report.as_of).bold());
            println!(
                "  Readiness:  {} / 100 ({} confidence)",
                report.readiness.score.to_string().cyan().bold(),
                report.readiness.confidence
            );
            println!(
                "  Load ratio: {}",
                match report.load_ratio.value() {
                    Some(_) => report.load_ratio.to_string().normal(),
                    None => "undefined (not enough load history)".dimmed(),
                }
            );
            if let Some(trend) = &report.trend {
                println!(
                    "  Index trend: {:?} ({} / day)",
                    trend.direction, trend.slope_per_day
                );
            }
            println!(
                "  Target zone: {}",
                report.target_zone.to_string().green().bold()
            );
            if report.rejected_samples > 0 {
                println!(
                    "{}",
                    format!(
                        "  {} invalid sample(s) were excluded",
                        report.rejected_samples
                    )
                    .yellow()
                );
            }
        }

        Commands::Zones {
            file,
            as_of,
            max_hr,
            age,
            resting_hr,
        } => {
            let samples = import_samples(&file)?;
            let as_of = resolve_as_of(&samples, as_of)?;
            let athlete = resolve_athlete(max_hr, age, resting_hr)?;

            let engine = MetricsEngine::with_config(config)?;
            let report = engine.report(&samples, as_of, &athlete)?;

            let rows: Vec<ZoneRow> = report
                .zones
                .iter()
                .enumerate()
                .map(|(i, zone)| ZoneRow {
                    zone: format!("Z{}", i + 1),
                    range: zone.to_string(),
                    target: if *zone == report.target_zone {
                        "◀ today"
                    } else {
                        ""
                    },
                })
                .collect();

            println!("{}", format!("Adaptive zones for {}", as_of).bold());
            println!("{}", Table::new(rows));
        }

        Commands::Index {
            file,
            output,
            limit,
        } => {
            let samples = import_samples(&file)?;
            let engine = MetricsEngine::with_config(config)?;
            let points = engine.training_index(&samples)?;

            if let Some(output) = output {
                export_index_csv(&points, &output)?;
                println!("{} {}", "Series written to".green(), output.display());
                return Ok(());
            }

            let start = points.len().saturating_sub(limit);
            let rows: Vec<IndexRow> = points[start..]
                .iter()
                .map(|p| IndexRow {
                    date: p.date.to_string(),
                    value: p.value.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
    }

    Ok(())
}

fn resolve_as_of(samples: &[DailySample], as_of: Option<NaiveDate>) -> Result<NaiveDate> {
    match as_of {
        Some(date) => Ok(date),
        None => samples
            .last()
            .map(|s| s.date)
            .context("sample file is empty"),
    }
}

fn resolve_athlete(
    max_hr: Option<u16>,
    age: Option<u8>,
    resting_hr: Option<u16>,
) -> Result<AthleteContext> {
    let max_hr = match (max_hr, age) {
        (Some(max_hr), _) => max_hr,
        (None, Some(age)) => estimate_max_hr_from_age(age)?,
        (None, None) => anyhow::bail!("either --max-hr or --age is required"),
    };
    Ok(AthleteContext { max_hr, resting_hr })
}
