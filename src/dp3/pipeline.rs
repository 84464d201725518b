use std::path::{Path, PathBuf};

use log::info;

use super::args::SubtractArgs;
use super::averaging::Averaging;
use super::command::{ApplyCal, Dp3Command, IoPlan, PredictOptions, ProcessingOptions};
use super::h5parm::SolutionInspector;
use super::ms::{time_preavg_factor, MsInspector};
use super::polygon::{PolygonTable, WideFieldSettings};
use super::runner::{Dp3Runner, Executor, Stage};
use super::Dp3Error;

/// External collaborators of a subtraction run.
pub struct Toolbox<'a> {
    pub executor: &'a dyn Executor,
    pub ms: &'a dyn MsInspector,
    pub solutions: &'a dyn SolutionInspector,
}

/// Predict/subtract, then the optional processing stage, for every MS.
///
/// Returns the command files written (none on a dry run).
pub fn run(args: &SubtractArgs, tools: &Toolbox<'_>) -> Result<Vec<PathBuf>, Dp3Error> {
    let runner = Dp3Runner::new(tools.executor, &args.workdir, args.print_only_commands);
    let mut written = Vec::new();

    // Resolved up front: predict rewrites SUBTRACT_DATA in place.
    let wide_field = if args.forwidefield {
        Some(wide_field_settings(args, tools.ms)?)
    } else {
        None
    };
    let applycal = applycal(args, tools.solutions)?;

    if !args.skip_predict {
        info!("############## PREDICT ##############");
        let sourcedb = args.sourcedb.clone().ok_or(Dp3Error::MissingSourcedb)?;
        let h5parm = match &args.h5parm_predict {
            Some(h5) => Some(existing(h5)?.display().to_string()),
            None => None,
        };
        let cmd = Dp3Command::new(&args.dp3_bin).predict(&PredictOptions {
            sourcedb,
            subtract: true,
            h5parm,
        });
        written.extend(runner.run(&cmd, Stage::Predict, &IoPlan::InPlace, &args.mslist)?);
    }

    let opts = match &wide_field {
        Some(w) => ProcessingOptions {
            phasecenter: Some(w.phasecenter.clone()),
            freqavg: Some(Averaging::Steps(w.freqavg)),
            timeavg: Some(Averaging::Steps(w.timeavg)),
            ..Default::default()
        },
        None => ProcessingOptions {
            phasecenter: args.phasecenter.clone(),
            freqavg: args.freqavg.clone(),
            timeavg: args.timeavg.clone(),
            ..Default::default()
        },
    };
    let opts = ProcessingOptions {
        applybeam: args.applybeam,
        applycal,
        ..opts
    };

    if opts.is_empty() && !args.concat {
        info!("no processing requested after predict");
        return Ok(written);
    }

    info!("############## RUN DP3 ##############");
    let cmd = Dp3Command::new(&args.dp3_bin).more_dp3(&opts);
    let prefix = args
        .output_name
        .clone()
        .or_else(|| wide_field.and_then(|w| w.dir_name));
    let plan = if args.concat {
        IoPlan::Concat {
            prefix: prefix.unwrap_or_else(|| "subtract".to_string()),
        }
    } else {
        IoPlan::PerMs {
            prefix: prefix.unwrap_or_else(|| "sub".to_string()),
        }
    };
    written.extend(runner.run(&cmd, Stage::Phaseshift, &plan, &args.mslist)?);

    Ok(written)
}

/// Facet settings from polygon_info.csv and the first measurement set.
fn wide_field_settings(args: &SubtractArgs, ms: &dyn MsInspector) -> Result<WideFieldSettings, Dp3Error> {
    let table_path = match &args.polygon_info {
        Some(path) => path.clone(),
        None => PolygonTable::locate(Path::new("."))?,
    };
    let table = PolygonTable::load(&table_path)?;
    let region = args.region.as_deref().ok_or(Dp3Error::MissingRegion)?;
    let row = table.row_for_region(region)?;

    let first_ms = args.mslist.first().ok_or(Dp3Error::NoMeasurementSets)?;
    let channels = ms.channel_count(first_ms)?;
    let preavg = time_preavg_factor(ms, first_ms);
    let settings = WideFieldSettings::resolve(row, channels, preavg)?;
    info!(
        "wide-field: {} channels, freqavg {} (requested {}), timeavg {}, phase centre {}",
        channels, settings.freqavg, row.avg, settings.timeavg, settings.phasecenter
    );
    Ok(settings)
}

/// Solutions for the applycal step: `--applycal-h5`, else the predict
/// solutions when `--applycal` is set.
fn applycal(args: &SubtractArgs, solutions: &dyn SolutionInspector) -> Result<Option<ApplyCal>, Dp3Error> {
    let h5 = match (&args.applycal_h5, args.applycal, &args.h5parm_predict) {
        (Some(h5), _, _) => h5,
        (None, true, Some(h5)) => h5,
        (None, true, None) => return Err(Dp3Error::MissingApplycalSolutions),
        (None, false, _) => return Ok(None),
    };
    let h5 = existing(h5)?;
    let layout = solutions.inspect(h5)?;
    info!(
        "applycal with {} ({})",
        h5.display(),
        if layout.is_fulljones() { "fulljones" } else { "per soltab" }
    );
    Ok(Some(ApplyCal {
        parmdb: h5.display().to_string(),
        layout,
    }))
}

fn existing(path: &Path) -> Result<&Path, Dp3Error> {
    if path.exists() {
        Ok(path)
    } else {
        Err(Dp3Error::SolutionFileNotFound(path.to_path_buf()))
    }
}
