//! Helpers for a LOFAR data-reduction workflow.
//!
//! * [`data`] and [`stats`] collect point-to-point Monte-Carlo result files
//!   and combine them into per-variant and total estimates.
//! * [`dp3`] builds and runs DP3 commands that subtract a sky model and
//!   phase shift, average and calibrate the residual visibilities.

pub mod data;
pub mod dp3;
pub mod stats;

/// Initialise `env_logger`, showing `info` and above unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
