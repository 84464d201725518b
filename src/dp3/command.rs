use std::path::Path;

use log::debug;

use super::averaging::Averaging;
use super::h5parm::H5parmLayout;
use super::phasecenter::PhaseCenter;

/// Tokens every DP3 invocation starts from.
pub const BASE_TOKENS: [&str; 3] = [
    "msin.missingdata=True",
    "msin.orderms=False",
    "msout.storagemanager=dysco",
];

/// Column holding the visibilities after subtraction.
pub const SUBTRACT_COLUMN: &str = "SUBTRACT_DATA";

// ---------------------------------------------------------------------------
// Stage options
// ---------------------------------------------------------------------------

/// Settings of the predict/subtract stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictOptions {
    /// Sky model of the sources to predict.
    pub sourcedb: String,
    /// Subtract the prediction into [`SUBTRACT_COLUMN`].
    pub subtract: bool,
    /// Solutions applied to the prediction.
    pub h5parm: Option<String>,
}

/// Calibration applied after subtraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyCal {
    pub parmdb: String,
    pub layout: H5parmLayout,
}

/// Settings of the stage that follows subtraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingOptions {
    pub phasecenter: Option<PhaseCenter>,
    pub applybeam: bool,
    pub applycal: Option<ApplyCal>,
    pub freqavg: Option<Averaging>,
    pub timeavg: Option<Averaging>,
}

impl ProcessingOptions {
    /// Nothing besides copying the subtracted data would happen.
    pub fn is_empty(&self) -> bool {
        self.phasecenter.is_none()
            && !self.applybeam
            && self.applycal.is_none()
            && self.freqavg.is_none()
            && self.timeavg.is_none()
    }
}

// ---------------------------------------------------------------------------
// Dp3Command
// ---------------------------------------------------------------------------

/// An ordered DP3 argument list and the steps it enables.
///
/// Input/output tokens are not part of the command; they are appended per
/// invocation by [`Dp3Command::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dp3Command {
    executable: String,
    tokens: Vec<String>,
    steps: Vec<String>,
}

impl Dp3Command {
    /// Base template for `executable`.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            tokens: BASE_TOKENS.iter().map(|t| t.to_string()).collect(),
            steps: Vec::new(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    fn step(&mut self, name: impl Into<String>) {
        self.steps.push(name.into());
    }

    fn push<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
    }

    /// `steps=[a,b,c]`
    pub fn steps_token(&self) -> String {
        format!("steps=[{}]", self.steps.join(","))
    }

    /// Predict the sky model and optionally subtract it.
    pub fn predict(mut self, opts: &PredictOptions) -> Self {
        self.step("predict");
        self.push([
            "predict.type=predict".to_string(),
            format!("predict.sourcedb={}", opts.sourcedb),
            "predict.usebeammodel=True".to_string(),
            "predict.beammode=array_factor".to_string(),
        ]);
        if let Some(h5) = &opts.h5parm {
            self.push([
                "predict.applycal.steps=[amp,phase]".to_string(),
                "predict.applycal.amp.correction=amplitude000".to_string(),
                "predict.applycal.phase.correction=phase000".to_string(),
                format!("predict.applycal.parmdb={h5}"),
            ]);
        }
        if opts.subtract {
            self.push([
                "predict.operation=subtract".to_string(),
                format!("msout.datacolumn={SUBTRACT_COLUMN}"),
            ]);
        }
        debug!("predict command:\n{}", self.tokens.join("\n"));
        self
    }

    /// Phase shift, beam, applycal and averaging on the subtracted data,
    /// in that order.
    pub fn more_dp3(mut self, opts: &ProcessingOptions) -> Self {
        self.push([format!("msin.datacolumn={SUBTRACT_COLUMN}")]);

        if let Some(center) = &opts.phasecenter {
            self.step("ps");
            self.push(["ps.type=phaseshifter".to_string(), format!("ps.phasecenter={center}")]);
        }

        if opts.applybeam {
            self.step("beam");
            self.push(["beam.type=applybeam", "beam.direction=[]", "beam.updateweights=True"]);
        }

        if let Some(cal) = &opts.applycal {
            self.applycal(cal);
        }

        if opts.freqavg.is_some() || opts.timeavg.is_some() {
            self.step("avg");
            self.push(["avg.type=averager"]);
            if let Some(freq) = &opts.freqavg {
                self.push([freq.freq_token()]);
            }
            if let Some(time) = &opts.timeavg {
                self.push([time.time_token()]);
            }
        }

        debug!("processing command:\n{}", self.tokens.join("\n"));
        self
    }

    fn applycal(&mut self, cal: &ApplyCal) {
        if cal.layout.is_fulljones() {
            self.step("ac");
            self.push([
                "ac.type=applycal".to_string(),
                format!("ac.parmdb={}", cal.parmdb),
                "ac.correction=fulljones".to_string(),
                "ac.soltab=[amplitude000,phase000]".to_string(),
            ]);
            return;
        }
        for (n, soltab) in cal.layout.soltabs.iter().enumerate() {
            let name = format!("ac{n}");
            self.push([
                format!("{name}.type=applycal"),
                format!("{name}.parmdb={}", cal.parmdb),
                format!("{name}.correction={}", soltab.name),
            ]);
            self.step(name);
        }
    }

    /// Full argument vector: executable, configured tokens, the steps token
    /// and the given input/output tokens.
    pub fn render(&self, io: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.tokens.len() + io.len() + 2);
        argv.push(self.executable.clone());
        argv.extend(self.tokens.iter().cloned());
        argv.push(self.steps_token());
        argv.extend(io.iter().cloned());
        argv
    }
}

// ---------------------------------------------------------------------------
// Input / output planning
// ---------------------------------------------------------------------------

/// How measurement sets map onto DP3 invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoPlan {
    /// One run per MS, updating it in place (`msout=.`).
    InPlace,
    /// One run per MS, writing `<prefix>_<ms name>`.
    PerMs { prefix: String },
    /// A single run over all MS, writing `<prefix>_concat.ms`.
    Concat { prefix: String },
}

impl IoPlan {
    /// Input/output tokens of every invocation, in order.
    pub fn invocations(&self, mslist: &[String]) -> Vec<Vec<String>> {
        match self {
            IoPlan::InPlace => mslist
                .iter()
                .map(|ms| vec![format!("msin={ms}"), "msout=.".to_string()])
                .collect(),
            IoPlan::PerMs { prefix } => mslist
                .iter()
                .map(|ms| vec![format!("msin={ms}"), format!("msout={prefix}_{}", ms_name(ms))])
                .collect(),
            IoPlan::Concat { prefix } => vec![vec![
                format!("msin={}", mslist.join(",")),
                format!("msout={prefix}_concat.ms"),
            ]],
        }
    }
}

/// Base name of a measurement set path (`../data/obs.ms/` → `obs.ms`).
fn ms_name(ms: &str) -> String {
    Path::new(ms)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dp3::h5parm::Soltab;

    fn layout(pols: &[(&str, Option<usize>)]) -> H5parmLayout {
        H5parmLayout {
            soltabs: pols
                .iter()
                .map(|(name, pol)| Soltab {
                    name: name.to_string(),
                    pol_entries: *pol,
                })
                .collect(),
        }
    }

    #[test]
    fn predict_adds_subtract_tokens() {
        let cmd = Dp3Command::new("DP3").predict(&PredictOptions {
            sourcedb: "model.skymodel".into(),
            subtract: true,
            h5parm: Some("merged.h5".into()),
        });
        assert_eq!(cmd.steps(), ["predict"]);
        let tokens = cmd.tokens();
        assert_eq!(&tokens[..3], BASE_TOKENS);
        assert!(tokens.contains(&"predict.sourcedb=model.skymodel".to_string()));
        assert!(tokens.contains(&"predict.applycal.parmdb=merged.h5".to_string()));
        assert!(tokens.contains(&"predict.operation=subtract".to_string()));
        assert!(tokens.contains(&"msout.datacolumn=SUBTRACT_DATA".to_string()));
    }

    #[test]
    fn predict_without_solutions_skips_applycal() {
        let cmd = Dp3Command::new("DP3").predict(&PredictOptions {
            sourcedb: "model.skymodel".into(),
            subtract: false,
            h5parm: None,
        });
        assert!(!cmd.tokens().iter().any(|t| t.starts_with("predict.applycal")));
        assert!(!cmd.tokens().iter().any(|t| t.starts_with("predict.operation")));
    }

    #[test]
    fn steps_follow_fixed_order() {
        let opts = ProcessingOptions {
            phasecenter: Some("16h06m07.6,55d21m35.4".parse().unwrap()),
            applybeam: true,
            applycal: Some(ApplyCal {
                parmdb: "cal.h5".into(),
                layout: layout(&[("amplitude000", Some(4)), ("phase000", Some(4))]),
            }),
            freqavg: Some("8".parse().unwrap()),
            timeavg: Some("16s".parse().unwrap()),
        };
        let cmd = Dp3Command::new("DP3").more_dp3(&opts);
        assert_eq!(cmd.steps_token(), "steps=[ps,beam,ac,avg]");
        let tokens = cmd.tokens();
        assert!(tokens.contains(&"ps.phasecenter=[16h06m07.6,55d21m35.4]".to_string()));
        assert!(tokens.contains(&"ac.correction=fulljones".to_string()));
        assert!(tokens.contains(&"avg.freqstep=8".to_string()));
        assert!(tokens.contains(&"avg.timeresolution=16s".to_string()));
    }

    #[test]
    fn scalar_solutions_get_one_step_per_soltab() {
        let opts = ProcessingOptions {
            applycal: Some(ApplyCal {
                parmdb: "cal.h5".into(),
                layout: layout(&[("phase000", None), ("amplitude000", Some(2))]),
            }),
            ..Default::default()
        };
        let cmd = Dp3Command::new("DP3").more_dp3(&opts);
        assert_eq!(cmd.steps(), ["ac0", "ac1"]);
        assert!(cmd.tokens().contains(&"ac0.correction=phase000".to_string()));
        assert!(cmd.tokens().contains(&"ac1.correction=amplitude000".to_string()));
        assert!(!cmd.tokens().iter().any(|t| t.contains("fulljones")));
    }

    #[test]
    fn render_appends_steps_and_io() {
        let cmd = Dp3Command::new("DP3").more_dp3(&ProcessingOptions {
            applybeam: true,
            ..Default::default()
        });
        let argv = cmd.render(&["msin=a.ms".to_string(), "msout=sub_a.ms".to_string()]);
        assert_eq!(argv[0], "DP3");
        let n = argv.len();
        assert_eq!(argv[n - 3], "steps=[beam]");
        assert_eq!(argv[n - 2..], ["msin=a.ms", "msout=sub_a.ms"]);
    }

    #[test]
    fn io_plans() {
        let mslist = vec!["../data/a.ms".to_string(), "b.ms/".to_string()];
        assert_eq!(
            IoPlan::PerMs { prefix: "sub".into() }.invocations(&mslist),
            vec![
                vec!["msin=../data/a.ms".to_string(), "msout=sub_a.ms".to_string()],
                vec!["msin=b.ms/".to_string(), "msout=sub_b.ms".to_string()],
            ]
        );
        assert_eq!(
            IoPlan::Concat { prefix: "subtract".into() }.invocations(&mslist),
            vec![vec![
                "msin=../data/a.ms,b.ms/".to_string(),
                "msout=subtract_concat.ms".to_string()
            ]]
        );
        assert_eq!(IoPlan::InPlace.invocations(&mslist)[1][1], "msout=.");
    }
}
