use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use radio_reduce::data::filter::fields_without_results;
use radio_reduce::data::loader::load_results;
use radio_reduce::stats::report::Report;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Combine point-to-point Monte-Carlo results per field and variant",
    long_about = None
)]
struct Args {
    /// Cell size of the run; selects ../ptp_results_<cellsize>
    #[arg(long, default_value_t = 27)]
    cellsize: u32,

    /// Directory with the result files (overrides --cellsize)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Observation fields to aggregate
    #[arg(long, num_args = 1.., default_values = ["a399", "a401", "bridge"])]
    fields: Vec<String>,

    /// Print the report as JSON; an undefined standard error (single run) is written as null
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    radio_reduce::init_logging();
    let args = Args::parse();

    let dir = args
        .results_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("../ptp_results_{}", args.cellsize)));
    info!("collecting results from {}", dir.display());

    let set = load_results(&dir, &args.fields)
        .with_context(|| format!("collecting result files from {}", dir.display()))?;
    if set.is_empty() {
        bail!("no result files for {} in {}", args.fields.join(", "), dir.display());
    }
    for field in fields_without_results(&set) {
        warn!("no result files for {field}");
    }
    info!("aggregating {} result files", set.len());

    let report = Report::build(&set);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
