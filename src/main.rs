use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use radio_reduce::dp3::args::SubtractArgs;
use radio_reduce::dp3::h5parm::H5ls;
use radio_reduce::dp3::ms::Taql;
use radio_reduce::dp3::pipeline::{self, Toolbox};
use radio_reduce::dp3::runner::ProcessExecutor;

fn main() -> Result<()> {
    radio_reduce::init_logging();
    let args = SubtractArgs::parse();

    let tools = Toolbox {
        executor: &ProcessExecutor,
        ms: &Taql::default(),
        solutions: &H5ls::default(),
    };

    let written = pipeline::run(&args, &tools)
        .with_context(|| format!("subtracting from {}", args.mslist.join(", ")))?;
    if !args.print_only_commands {
        info!("wrote {} command files to {}", written.len(), args.workdir.display());
    }
    Ok(())
}
