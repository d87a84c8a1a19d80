//! zdchf: command-line driver for the ZDC/HF pileup filter.
//!
//! Reads JSON Lines event files, applies the filter and reports how many
//! events pass.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use zdchf_core::{
    hf_sum, EventRecord, EventSource, FilterConfig, FilterStatistics, ZdcHfPileupFilter,
};
use zdchf_io::{EventFileReader, OutputWriter};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    ZdchfIo(#[from] zdchf_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] zdchf_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Number of events decided per parallel batch.
const CHUNK_SIZE: usize = 4096;

/// Pileup rejection for heavy-ion events using ZDC and HF energy sums.
#[derive(Parser)]
#[command(name = "zdchf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the pileup filter to event files
    Filter {
        /// Input event file(s), JSON Lines
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Parameter-set JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the ZDC normalization divisor
        #[arg(long)]
        zdc_divisor: Option<f64>,

        /// Override the HF normalization divisor
        #[arg(long)]
        hihf_divisor: Option<f64>,

        /// Log the metric of every event
        #[arg(short, long)]
        debug: bool,

        /// Write per-event decisions (.csv or .jsonl)
        #[arg(long)]
        decisions: Option<PathBuf>,

        /// Write accepted events (.jsonl)
        #[arg(long)]
        accepted: Option<PathBuf>,
    },

    /// Print the accepted parameters and their defaults
    Describe,

    /// Show summary information about an event file
    Info {
        /// Input event file
        input: PathBuf,

        /// Parameter-set JSON file (selects the input tags)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecisionFormat {
    Csv,
    JsonLines,
}

impl DecisionFormat {
    /// Recognized extensions only; `.json` is not JSON Lines.
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Some(Self::Csv),
            Some("jsonl") => Some(Self::JsonLines),
            _ => None,
        }
    }

    fn from_path(path: &Path) -> Self {
        Self::from_extension(path).unwrap_or_else(|| {
            log::warn!(
                "unknown decision file extension for {} (expected .csv or .jsonl), writing CSV",
                path.display()
            );
            Self::Csv
        })
    }
}

fn load_config(path: Option<&Path>) -> Result<FilterConfig> {
    Ok(match path {
        Some(path) => FilterConfig::from_file(path)?,
        None => FilterConfig::default(),
    })
}

fn init_logging(debug: bool) {
    let default_level = if debug { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Filter {
            input,
            config,
            zdc_divisor,
            hihf_divisor,
            debug,
            decisions,
            accepted,
        } => {
            init_logging(debug);

            let mut config = load_config(config.as_deref())?;
            if let Some(divisor) = zdc_divisor {
                config = config.with_zdc_divisor(divisor);
            }
            if let Some(divisor) = hihf_divisor {
                config = config.with_hihf_divisor(divisor);
            }
            if debug {
                config = config.with_debug(true);
            }
            let filter = ZdcHfPileupFilter::new(config)?;

            log::info!(
                "zdcDivisor={} hihfDivisor={} centralitySrc={} pfSrc={}",
                filter.config().zdc_divisor,
                filter.config().hihf_divisor,
                filter.config().centrality_src,
                filter.config().pf_src
            );

            let mut decision_writer = match &decisions {
                Some(path) => Some((OutputWriter::create(path)?, DecisionFormat::from_path(path))),
                None => None,
            };
            let mut accepted_writer = match &accepted {
                Some(path) => Some(OutputWriter::create(path)?),
                None => None,
            };
            let mut wrote_header = false;

            let start = Instant::now();
            let mut totals = FilterStatistics::default();

            for path in &input {
                log::info!("reading {}", path.display());

                let reader = EventFileReader::open(path)?;
                let mut events = reader.events()?;
                let mut file_stats = FilterStatistics::default();

                loop {
                    let chunk: Vec<EventRecord> = events
                        .by_ref()
                        .take(CHUNK_SIZE)
                        .collect::<zdchf_io::Result<_>>()?;
                    if chunk.is_empty() {
                        break;
                    }

                    let batch = filter.filter_batch(&chunk)?;
                    file_stats.merge(&FilterStatistics::from_decisions(&batch));

                    if let Some((writer, format)) = decision_writer.as_mut() {
                        match format {
                            DecisionFormat::Csv => {
                                writer.write_decisions_csv(&batch, !wrote_header)?;
                                wrote_header = true;
                            }
                            DecisionFormat::JsonLines => writer.write_decisions_jsonl(&batch)?,
                        }
                    }

                    if let Some(writer) = accepted_writer.as_mut() {
                        let kept = chunk
                            .iter()
                            .zip(&batch)
                            .filter(|(_, decision)| decision.accepted)
                            .map(|(event, _)| event);
                        writer.write_events_jsonl(kept)?;
                    }
                }

                log::info!(
                    "{}: {} events, {} accepted, {} rejected",
                    path.display(),
                    file_stats.processed,
                    file_stats.accepted,
                    file_stats.rejected
                );
                totals.merge(&file_stats);
            }

            if let Some((writer, _)) = decision_writer.as_mut() {
                writer.flush()?;
            }
            if let Some(writer) = accepted_writer.as_mut() {
                writer.flush()?;
            }

            let elapsed = start.elapsed();

            println!(
                "Processed {} files in {:.2}s",
                input.len(),
                elapsed.as_secs_f64()
            );
            println!("Events: {}", totals.processed);
            println!("Accepted: {}", totals.accepted);
            println!("Rejected: {}", totals.rejected);
            if let Some(fraction) = totals.acceptance_fraction() {
                println!("Acceptance: {:.2}%", fraction * 100.0);
            }
        }

        Commands::Describe => {
            let description = FilterConfig::describe();
            println!("{}", serde_json::to_string_pretty(&description)?);
        }

        Commands::Info { input, config } => {
            init_logging(false);

            let config = load_config(config.as_deref())?;
            let reader = EventFileReader::open(&input)?;

            let mut count = 0usize;
            let mut candidates = 0usize;
            let mut zdc_range = (f64::INFINITY, f64::NEG_INFINITY);
            let mut hf_range = (f64::INFINITY, f64::NEG_INFINITY);

            for event in reader.events()? {
                let event = event?;
                let zdc = event.centrality(&config.centrality_src)?.zdc_sum;
                let pf = event.candidates(&config.pf_src)?;
                let hf = hf_sum(pf);

                count += 1;
                candidates += pf.len();
                zdc_range = (zdc_range.0.min(zdc), zdc_range.1.max(zdc));
                hf_range = (hf_range.0.min(hf), hf_range.1.max(hf));
            }

            println!("File: {}", input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                reader.file_size(),
                reader.file_size() as f64 / 1_000_000.0
            );
            println!("Events: {}", count);
            println!("Candidates: {}", candidates);

            if count > 0 {
                println!("ZDC sum range: {} - {}", zdc_range.0, zdc_range.1);
                println!("HF sum range: {} - {}", hf_range.0, hf_range.1);
                println!(
                    "Mean candidates per event: {:.1}",
                    candidates as f64 / count as f64
                );
            }
        }
    }

    Ok(())
}
