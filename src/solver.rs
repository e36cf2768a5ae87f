use crate::Error;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// An external DIMACS solver, run as a subprocess.
///
/// It's invoked as `program [--seed=<seed>] [extra_args...] <cnf-file>`, and must print
/// solutions in the usual `s`/`v` line format.
#[derive(Debug, Clone)]
pub struct ExternalSolver {
    pub program: PathBuf,
    pub seed: Option<i64>,
    pub extra_args: Vec<OsString>,
}

impl Default for ExternalSolver {
    fn default() -> ExternalSolver {
        ExternalSolver::new("kissat")
    }
}

impl ExternalSolver {
    pub fn new(program: impl Into<PathBuf>) -> ExternalSolver {
        ExternalSolver {
            program: program.into(),
            seed: None,
            extra_args: Vec::new(),
        }
    }

    pub fn seed(mut self, seed: Option<i64>) -> ExternalSolver {
        self.seed = seed;
        self
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> ExternalSolver {
        self.extra_args.push(arg.into());
        self
    }

    fn command(&self, cnf_path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(seed) = self.seed {
            command.arg(format!("--seed={}", seed));
        }
        command.args(&self.extra_args).arg(cnf_path);
        command
    }

    /// Run the solver on `cnf_path` and wait for it to exit, with both its stdout and stderr
    /// written to `output_path`.
    ///
    /// The exit status is returned rather than checked: solvers conventionally exit with 10 for
    /// satisfiable and 20 for unsatisfiable.
    ///
    /// If the solver can't be started, `output_path` is removed again.
    pub fn run(
        &self,
        cnf_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<ExitStatus, Error> {
        let output_path = output_path.as_ref();
        let stdout = File::create(output_path)?;
        let stderr = stdout.try_clone()?;
        self.command(cnf_path.as_ref())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .map_err(|source| {
                let _ = fs::remove_file(output_path);
                Error::SolverLaunch {
                    program: self.program.clone(),
                    source,
                }
            })
    }
}

#[test]
fn test_command_line() {
    let solver = ExternalSolver::new("/opt/kissat").seed(Some(7)).arg("-q");
    let command = solver.command(Path::new("input.cnf"));
    assert_eq!(command.get_program(), "/opt/kissat");
    let args = command.get_args().collect::<Vec<_>>();
    assert_eq!(args, ["--seed=7", "-q", "input.cnf"]);

    let command = ExternalSolver::default().command(Path::new("x.cnf"));
    assert_eq!(command.get_program(), "kissat");
    assert_eq!(command.get_args().collect::<Vec<_>>(), ["x.cnf"]);
}

#[test]
fn test_missing_program() {
    let dir = std::env::temp_dir();
    let solver = ExternalSolver::new("/nonexistent/latinsat-solver");
    let result = solver.run(
        dir.join("latinsat-missing.cnf"),
        dir.join("latinsat-missing.out"),
    );
    assert!(matches!(result, Err(Error::SolverLaunch { .. })));
    assert!(!dir.join("latinsat-missing.out").exists());
}
