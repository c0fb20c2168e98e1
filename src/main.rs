//! psgnorm: normalize a folder of polysomnography event logs.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use psgnorm::paths::DEFAULT_OUTPUT_SUFFIX;
use psgnorm::{run_batch, MappingTable, NormalizeConfig, ScoredLinePolicy};

const LOG_ENV: &str = "PSGNORM_LOG";

#[derive(Debug, Parser)]
#[command(name = "psgnorm")]
#[command(about = "Normalize polysomnography event logs into uniform event tables")]
#[command(version)]
struct Command {
    /// Folder holding the recordings (`<id>.edf` plus their event logs)
    folder: PathBuf,

    /// Event name mapping file
    #[arg(short, long, default_value = "./mappings.txt")]
    mapping: PathBuf,

    /// Where to write the unmapped-events report
    #[arg(short, long, default_value = "./WSC_non_mapped_lines.txt")]
    report: PathBuf,

    /// Suffix of the per-recording output table
    #[arg(long, default_value = DEFAULT_OUTPUT_SUFFIX)]
    output_suffix: String,

    /// Skip unparseable scored-event lines instead of failing the recording
    #[arg(long)]
    lenient_scored: bool,

    /// Also write a JSON summary of the run
    #[arg(long)]
    summary: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "psgnorm=debug" } else { "psgnorm=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let opts = Command::parse();
    init_logging(opts.verbose);

    if !opts.folder.is_dir() {
        bail!(
            "Folder '{}' not available or not found",
            opts.folder.display()
        );
    }

    info!("Loading mappings");
    let mapping = MappingTable::load(&opts.mapping)?;

    let config = NormalizeConfig {
        output_suffix: opts.output_suffix,
        scored_line_policy: if opts.lenient_scored {
            ScoredLinePolicy::Lenient
        } else {
            ScoredLinePolicy::Strict
        },
    };

    info!("Identifying recordings");
    let outcome = run_batch(&opts.folder, &mapping, &config)?;
    if let Some(failed) = &outcome.failed {
        let reasons: Vec<String> = failed.errors.iter().map(|e| e.to_string()).collect();
        bail!(
            "Error in parsing recording {}: {}",
            failed.recording,
            reasons.join("; ")
        );
    }

    outcome.unmapped.save(&opts.report)?;
    info!(
        "Wrote {} unmapped entries to {}",
        outcome.unmapped.len(),
        opts.report.display()
    );

    if let Some(path) = &opts.summary {
        outcome.summary.save(path)?;
    }
    Ok(())
}
