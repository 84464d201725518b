use std::path::PathBuf;

use clap::Parser;

use super::averaging::Averaging;
use super::phasecenter::PhaseCenter;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Subtract a sky model from measurement sets with DP3, then phase shift, average and calibrate",
    long_about = None,
    after_help = "Examples:\n  subtract-dp3 --mslist obs1.ms obs2.ms --sourcedb model.skymodel --h5parm-predict merged.h5\n  subtract-dp3 --mslist obs.ms --sourcedb model.skymodel --phasecenter 16h06m07.61855,55d21m35.4166 --freqavg 4 --timeavg 8s --applybeam\n  subtract-dp3 --mslist obs.ms --sourcedb model.skymodel --region poly_3.reg --forwidefield --applycal --h5parm-predict merged.h5\n"
)]
pub struct SubtractArgs {
    /// Measurement sets to process
    #[arg(long, required = true, num_args = 1..)]
    pub mslist: Vec<String>,

    /// Region (polygon) file; selects the polygon_info.csv row with --forwidefield
    #[arg(long)]
    pub region: Option<PathBuf>,

    /// Prefix for output measurement sets (default: sub_<ms>, or subtract_concat.ms)
    #[arg(long, visible_alias = "output_name")]
    pub output_name: Option<String>,

    /// Skip predict and only run the processing stage
    #[arg(long, visible_alias = "skip_predict")]
    pub skip_predict: bool,

    /// Sky model of the sources to subtract
    #[arg(long, required_unless_present = "skip_predict")]
    pub sourcedb: Option<String>,

    /// h5 solution file applied to the prediction
    #[arg(long, visible_alias = "h5parm_predict")]
    pub h5parm_predict: Option<PathBuf>,

    /// Phase shift to the given point (example: --phasecenter 16h06m07.61855,55d21m35.4166)
    #[arg(long, allow_hyphen_values = true)]
    pub phasecenter: Option<PhaseCenter>,

    /// Frequency averaging: channel count (4) or resolution (2MHz)
    #[arg(long)]
    pub freqavg: Option<Averaging>,

    /// Time averaging: timeslot count (8) or resolution (16s)
    #[arg(long)]
    pub timeavg: Option<Averaging>,

    /// Concatenate the measurement sets into one output
    #[arg(long)]
    pub concat: bool,

    /// Apply the beam in the phase-shifted centre (or the field centre)
    #[arg(long)]
    pub applybeam: bool,

    /// Apply calibration solutions after subtraction and phase shifting
    #[arg(long)]
    pub applycal: bool,

    /// Solution file for --applycal (default: --h5parm-predict)
    #[arg(long, visible_alias = "applycal_h5")]
    pub applycal_h5: Option<PathBuf>,

    /// Only print the commands, write and run nothing
    #[arg(long, visible_aliases = ["print_only_commands", "dry-run"])]
    pub print_only_commands: bool,

    /// Read phase centre, averaging and naming from polygon_info.csv
    #[arg(long, requires = "region")]
    pub forwidefield: bool,

    /// Explicit polygon_info.csv (default: search . and up to three parents)
    #[arg(long)]
    pub polygon_info: Option<PathBuf>,

    /// DP3 executable
    #[arg(long, env = "DP3_BIN", default_value = "DP3")]
    pub dp3_bin: String,

    /// Directory receiving the dp3*.cmd files
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,
}
