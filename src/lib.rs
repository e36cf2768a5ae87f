//! Find Latin squares with a SAT solver.
//!
//! A Latin square of order `n` is an `n x n` grid over the symbols `0..n` in which every symbol
//! occurs exactly once in each row and exactly once in each column. latinsat turns the question
//! "is there one?" into a CNF formula, hands it to an external SAT solver such as kissat, and
//! turns the solver's answer back into a grid, checking it along the way.
//!
//! It can be used as an application (`latinsat <order> [seed]`), or as a library.
//!
//! ## The encoding
//!
//! There is one variable per `(row, col, symbol)` triple, true when that cell holds that symbol.
//! The formula says that each cell has exactly one symbol, each row has each symbol in exactly
//! one column, and each column has each symbol in exactly one row. It also fixes the first row
//! and the first column to `0, 1, ..., n-1`: every Latin square can be permuted into that form,
//! and fixing it makes the solver's job a lot easier.
//!
//! ## Encoding and decoding by hand
//!
//! ```
//! use latinsat::{clauses, decode, dimacs, validate, Order};
//!
//! let order = Order::new(2).unwrap();
//! let cnf = clauses::generate(order);
//! assert_eq!(cnf.var_count, 8);
//! assert_eq!(cnf.clause_count(), 28);
//!
//! let mut text = Vec::new();
//! dimacs::write_cnf(&mut text, &cnf).unwrap();
//! assert!(text.starts_with(b"p cnf 8 28\n"));
//!
//! // Pretend a solver came back with this:
//! let answer = "s SATISFIABLE\nv 1 -2 -3 4 -5 6 7 -8 0\n";
//! let output = decode::decode_str(order, answer).unwrap();
//! assert!(validate::is_valid(&output.grid));
//! println!("{}", output.grid);
//! ```
//!
//! ## Running a solver
//!
//! `Pipeline` does all the steps in order, and times them:
//!
//! ```no_run
//! use latinsat::{ExternalSolver, Outcome, Order, Pipeline};
//!
//! let mut pipeline = Pipeline::new(Order::new(12).unwrap());
//! pipeline.config().log_steps = true;
//!
//! let solver = ExternalSolver::new("kissat").seed(Some(3));
//! let report = pipeline.run(&solver, "input.cnf", "output.txt").unwrap();
//! match report.outcome {
//!     Outcome::Satisfiable(grid) => println!("{}", grid),
//!     Outcome::Unsatisfiable => println!("No Latin square"),
//! }
//! ```

pub mod clauses;
pub mod decode;
pub mod dimacs;
mod index;
mod solver;
pub mod validate;

pub use clauses::{Clause, Cnf, Role};
pub use decode::{Grid, Outcome, SolverOutput, Verdict};
pub use index::{Indexer, Lit, Order, Triple, Var};
pub use solver::ExternalSolver;
pub use validate::Violation;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/************************
 *     Errors           *
 ************************/

#[derive(Debug)]
pub enum Error {
    /// The order isn't a positive integer, or is too large to encode.
    InvalidOrder(String),
    /// The solver said SAT, but its assignment left these cells of `grid` without a symbol.
    DecodeIncomplete {
        unset: Vec<(usize, usize)>,
        grid: Grid,
    },
    /// The solver's assignment decodes to a grid that isn't a Latin square.
    StructurallyInvalid { violation: Violation, grid: Grid },
    /// The solver's output had no `s SATISFIABLE` / `s UNSATISFIABLE` line.
    MissingVerdict,
    /// The solver's status line was something else, like `s UNKNOWN`.
    UnknownVerdict(String),
    /// The solver said SAT but printed no `v` lines.
    MissingAssignment,
    /// The solver's output couldn't be read, at this (1-based) line.
    MalformedOutput { line: usize, message: String },
    SolverLaunch { program: PathBuf, source: io::Error },
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidOrder(message) => write!(f, "Invalid order: {}", message),
            Error::DecodeIncomplete { unset, .. } => write!(
                f,
                "Solver reported SAT but left {} cell(s) unassigned, starting at {:?}",
                unset.len(),
                unset.first().copied().unwrap_or_default()
            ),
            Error::StructurallyInvalid { violation, .. } => {
                write!(f, "Invalid solution produced by solver: {}", violation)
            }
            Error::MissingVerdict => write!(f, "Solver output has no status line"),
            Error::UnknownVerdict(status) => {
                write!(f, "Solver gave no answer (status '{}')", status)
            }
            Error::MissingAssignment => {
                write!(f, "Solver reported SAT but printed no assignment")
            }
            Error::MalformedOutput { line, message } => {
                write!(f, "Bad solver output at line {}: {}", line, message)
            }
            Error::SolverLaunch { program, source } => {
                write!(f, "Failed to run solver '{}': {}", program.display(), source)
            }
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SolverLaunch { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

/************************
 *     Pipeline         *
 ************************/

/// How long each stage took.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timings {
    /// Generating clauses and writing the CNF file.
    pub dimacs: Duration,
    /// Running the solver, start to exit.
    pub solver: Duration,
    /// Reading the solver output, decoding, and validating.
    pub verify: Duration,
    /// CPU time the solver reported for itself, if it did.
    pub solver_process_time: Option<Duration>,
}

impl Timings {
    pub fn total(&self) -> Duration {
        self.dimacs + self.solver + self.verify
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub outcome: Outcome,
    pub timings: Timings,
}

/// Runs each stage in turn: generate the CNF, write it, run a solver on it, then decode and
/// check what comes back.
pub struct Pipeline {
    order: Order,
    config: Config,
    timings: Timings,
}

impl Pipeline {
    pub fn new(order: Order) -> Pipeline {
        Pipeline {
            order,
            config: Config::default(),
            timings: Timings::default(),
        }
    }

    pub fn config(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn encode(&self) -> Cnf {
        clauses::generate(self.order)
    }

    /// Generate the CNF and write it to `path`. Returns the CNF that was written.
    pub fn write_cnf(&mut self, path: impl AsRef<Path>) -> Result<Cnf, Error> {
        let path = path.as_ref();
        let start_time = Instant::now();

        let cnf = self.encode();
        if self.config.log_steps {
            eprintln!(
                "Order {}: {} variables, {} clauses",
                self.order,
                cnf.var_count,
                cnf.clause_count()
            );
        }
        dimacs::write_cnf_file(path, &cnf)?;

        self.timings.dimacs = start_time.elapsed();
        if self.config.log_steps {
            eprintln!("Wrote DIMACS CNF file to: {}", path.display());
        }
        if self.config.log_elapsed {
            eprintln!("  elapsed: {:5?}ms", self.timings.dimacs.as_millis());
        }
        Ok(cnf)
    }

    /// Run `solver` on the CNF file at `cnf_path`, saving its output to `output_path`.
    pub fn solve(
        &mut self,
        solver: &ExternalSolver,
        cnf_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<(), Error> {
        let output_path = output_path.as_ref();
        let start_time = Instant::now();

        if self.config.log_steps {
            eprintln!("Running solver '{}'", solver.program.display());
        }
        let status = solver.run(cnf_path, output_path)?;

        self.timings.solver = start_time.elapsed();
        if self.config.log_steps {
            eprintln!(
                "Wrote solver output to: {} ({})",
                output_path.display(),
                status
            );
        }
        if self.config.log_elapsed {
            eprintln!("  elapsed: {:5?}ms", self.timings.solver.as_millis());
        }
        Ok(())
    }

    /// Read and decode the solver output saved at `path`, without checking it.
    pub fn decode_file(&mut self, path: impl AsRef<Path>) -> Result<SolverOutput, Error> {
        let output = decode::decode_file(self.order, path)?;
        self.timings.solver_process_time = output
            .process_time
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
        if self.config.log_steps {
            match &output.verdict {
                Some(verdict) => eprintln!("Solver verdict: {}", verdict),
                None => eprintln!("Solver gave no verdict"),
            }
        }
        Ok(output)
    }

    /// Decode and check the solver output saved at `path`.
    pub fn verify(&mut self, path: impl AsRef<Path>) -> Result<Outcome, Error> {
        let start_time = Instant::now();
        let outcome = self.decode_file(path)?.resolve();
        self.timings.verify = start_time.elapsed();
        if self.config.log_elapsed {
            eprintln!("  elapsed: {:5?}ms", self.timings.verify.as_millis());
        }
        outcome
    }

    /// Every stage, start to finish.
    pub fn run(
        &mut self,
        solver: &ExternalSolver,
        cnf_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<Report, Error> {
        let start_time = Instant::now();
        let cnf_path = cnf_path.as_ref();
        let output_path = output_path.as_ref();

        self.write_cnf(cnf_path)?;
        self.solve(solver, cnf_path, output_path)?;
        let outcome = self.verify(output_path)?;

        if self.config.log_steps {
            eprintln!("Total time: {}ms", start_time.elapsed().as_millis());
        }
        Ok(Report {
            outcome,
            timings: self.timings,
        })
    }
}

/************************
 *     Config           *
 ************************/

// The binary fills this in from its `-q` and `--log-elapsed` flags.
/// Configuration options. Set these using `Pipeline.config()`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Log each stage as it starts and finishes
    pub log_steps: bool,
    /// Log how long each stage took
    pub log_elapsed: bool,
}
