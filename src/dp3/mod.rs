//! DP3 command construction and execution.
//!
//! ```text
//!   SubtractArgs ──► pipeline ──► Dp3Command (predict) ──► Dp3Runner ──► dp3predict_<n>.cmd + DP3
//!                       │
//!                       ├─ polygon_info.csv + MsInspector   (wide-field settings)
//!                       ├─ SolutionInspector                 (fulljones or per-soltab applycal)
//!                       ▼
//!                  Dp3Command (phaseshift/beam/applycal/avg) ──► Dp3Runner ──► dp3phaseshift_<n>.cmd + DP3
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub mod args;
pub mod averaging;
pub mod command;
pub mod h5parm;
pub mod ms;
pub mod phasecenter;
pub mod pipeline;
pub mod polygon;
pub mod runner;

/// Errors raised while building or running DP3 commands.
#[derive(Error, Debug)]
pub enum Dp3Error {
    #[error("using --forwidefield needs a polygon_info.csv file to read polygon information from (searched {searched})")]
    MissingPolygonInfo { searched: String },

    #[error("failed to read polygon table {}: {source}", .path.display())]
    PolygonTable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no row for polygon file '{polygon}' in {}", .table.display())]
    UnknownPolygon { polygon: String, table: PathBuf },

    #[error("no measurement sets given")]
    NoMeasurementSets,

    #[error("--forwidefield needs a region file (give with --region)")]
    MissingRegion,

    #[error("polygon '{0}' has neither poly_center nor dir")]
    MissingPhaseCenter(String),

    #[error("invalid phase centre '{0}' (expected 'ra,dec', e.g. 16h06m07.61855,55d21m35.4166)")]
    InvalidPhaseCenter(String),

    #[error("invalid averaging value '{0}'")]
    InvalidAveraging(String),

    #[error("no divider of {channels} channels at or below {max}")]
    NoDivider { channels: usize, max: usize },

    #[error("a sky model is needed for predict (give with --sourcedb)")]
    MissingSourcedb,

    #[error("need a solution file for applycal (give with --applycal-h5)")]
    MissingApplycalSolutions,

    #[error("solution file {} does not exist", .0.display())]
    SolutionFileNotFound(PathBuf),

    #[error("solution file {} has no solution tables", .0.display())]
    EmptySolutions(PathBuf),

    #[error("could not start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("unexpected {tool} output: {reason}")]
    UnexpectedOutput { tool: String, reason: String },

    #[error("failed to write command file {}: {source}", .path.display())]
    CommandFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
