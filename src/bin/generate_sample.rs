use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use radio_reduce::data::sample::write_sample_results;

/// Write synthetic point-to-point result files for trying out ptp-results.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory
    #[arg(long, default_value = "ptp_results_sample")]
    out_dir: PathBuf,

    /// Observation fields
    #[arg(long, num_args = 1.., default_values = ["a399", "a401", "bridge"])]
    fields: Vec<String>,

    /// Runs per field and variant
    #[arg(long, default_value_t = 20)]
    runs: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    radio_reduce::init_logging();
    let args = Args::parse();

    let written = write_sample_results(&args.out_dir, &args.fields, args.runs, args.seed)
        .with_context(|| format!("writing result files to {}", args.out_dir.display()))?;

    println!("Wrote {} result files to {}", written.len(), args.out_dir.display());
    Ok(())
}
