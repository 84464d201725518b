use std::fs;
use std::path::PathBuf;
use std::process::Command;

use log::{debug, info};

use super::command::{Dp3Command, IoPlan};
use super::Dp3Error;

/// Which part of the subtraction a command belongs to; names the command files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Predict,
    Phaseshift,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Predict => "predict",
            Stage::Phaseshift => "phaseshift",
        }
    }

    /// `dp3<stage>_<n>.cmd`
    pub fn command_file(self, n: usize) -> String {
        format!("dp3{}_{n}.cmd", self.name())
    }
}

// ---------------------------------------------------------------------------
// Executor – the process boundary
// ---------------------------------------------------------------------------

/// Runs an argument vector to completion.
pub trait Executor {
    fn execute(&self, argv: &[String]) -> Result<(), Dp3Error>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, argv: &[String]) -> Result<(), Dp3Error> {
        (**self).execute(argv)
    }
}

/// Spawns the program directly, without a shell, and waits for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&self, argv: &[String]) -> Result<(), Dp3Error> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(());
        };
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| Dp3Error::Spawn {
                tool: program.clone(),
                source,
            })?;
        debug!("{program} stdout:\n{}", String::from_utf8_lossy(&output.stdout));
        if !output.status.success() {
            return Err(Dp3Error::ToolFailed {
                tool: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dp3Runner
// ---------------------------------------------------------------------------

/// Writes command files and runs DP3 once per invocation of an [`IoPlan`].
pub struct Dp3Runner<E> {
    executor: E,
    workdir: PathBuf,
    dry_run: bool,
}

impl<E: Executor> Dp3Runner<E> {
    pub fn new(executor: E, workdir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            executor,
            workdir: workdir.into(),
            dry_run,
        }
    }

    /// Run `cmd` for every invocation of `plan` over `mslist`.
    ///
    /// Each invocation starts from `cmd` itself, so a command file holds the
    /// input/output tokens of exactly one run. Returns the command files
    /// written; a dry run only prints the commands.
    pub fn run(
        &self,
        cmd: &Dp3Command,
        stage: Stage,
        plan: &IoPlan,
        mslist: &[String],
    ) -> Result<Vec<PathBuf>, Dp3Error> {
        let mut written = Vec::new();

        for (n, io) in plan.invocations(mslist).iter().enumerate() {
            let argv = cmd.render(io);
            let text = argv.join("\n");

            if self.dry_run {
                println!("{text}\n");
                continue;
            }

            let path = self.workdir.join(stage.command_file(n));
            fs::write(&path, &text).map_err(|source| Dp3Error::CommandFile {
                path: path.clone(),
                source,
            })?;
            info!("{} {}: running {} ({})", stage.name(), n, cmd.executable(), io.join(" "));
            self.executor.execute(&argv)?;
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Vec<String>>>);

    impl Executor for Recorder {
        fn execute(&self, argv: &[String]) -> Result<(), Dp3Error> {
            self.0.borrow_mut().push(argv.to_vec());
            Ok(())
        }
    }

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn process_exit_status_and_stderr_are_reported() {
        let err = ProcessExecutor
            .execute(&argv(&["sh", "-c", "echo oops >&2; exit 3"]))
            .unwrap_err();
        match err {
            Dp3Error::ToolFailed { tool, status, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ProcessExecutor.execute(&argv(&["sh", "-c", "exit 0"])).is_ok());
    }

    #[test]
    fn missing_program_cannot_be_spawned() {
        let err = ProcessExecutor
            .execute(&argv(&["radio-reduce-no-such-tool", "msin=a.ms"]))
            .unwrap_err();
        assert!(matches!(err, Dp3Error::Spawn { ref tool, .. } if tool == "radio-reduce-no-such-tool"));
    }

    #[test]
    fn writes_one_command_file_per_ms() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let runner = Dp3Runner::new(&recorder, dir.path(), false);
        let mslist = vec!["a.ms".to_string(), "b.ms".to_string()];

        let files = runner
            .run(&Dp3Command::new("DP3"), Stage::Phaseshift, &IoPlan::PerMs { prefix: "sub".into() }, &mslist)
            .unwrap();

        assert_eq!(files, vec![dir.path().join("dp3phaseshift_0.cmd"), dir.path().join("dp3phaseshift_1.cmd")]);
        let second = fs::read_to_string(&files[1]).unwrap();
        assert!(second.ends_with("msin=b.ms\nmsout=sub_b.ms"));
        assert!(!second.contains("a.ms"));
        assert_eq!(recorder.0.borrow().len(), 2);
    }

    #[test]
    fn dry_run_writes_and_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let runner = Dp3Runner::new(&recorder, dir.path(), true);

        let files = runner
            .run(&Dp3Command::new("DP3"), Stage::Predict, &IoPlan::InPlace, &["a.ms".to_string()])
            .unwrap();

        assert!(files.is_empty());
        assert!(recorder.0.borrow().is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failing_tool_aborts_the_run() {
        struct Failing;
        impl Executor for Failing {
            fn execute(&self, argv: &[String]) -> Result<(), Dp3Error> {
                Err(Dp3Error::UnexpectedOutput {
                    tool: argv[0].clone(),
                    reason: "boom".into(),
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let runner = Dp3Runner::new(Failing, dir.path(), false);
        let mslist = vec!["a.ms".to_string(), "b.ms".to_string()];
        let err = runner
            .run(&Dp3Command::new("DP3"), Stage::Predict, &IoPlan::InPlace, &mslist)
            .unwrap_err();

        assert!(matches!(err, Dp3Error::UnexpectedOutput { .. }));
        assert!(dir.path().join("dp3predict_0.cmd").exists());
        assert!(!dir.path().join("dp3predict_1.cmd").exists());
    }
}
