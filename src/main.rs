//! See the crate docs in lib.rs

use anyhow::Context;
use argh::FromArgs;
use latinsat::{Error, ExternalSolver, Grid, Order, Outcome, Pipeline, Timings};
use std::path::PathBuf;
use std::time::Instant;

/************************
 *     Report           *
 ************************/

fn seconds(duration: std::time::Duration) -> String {
    format!("{:.2}", duration.as_secs_f64())
}

fn print_grid(grid: &Grid) {
    print!("{}", grid);
}

fn print_timings(timings: &Timings, total: std::time::Duration) {
    println!("Total elapsed time: {} seconds", seconds(total));
    println!("     Dimacs elapsed time: {} seconds", seconds(timings.dimacs));
    match timings.solver_process_time {
        Some(process_time) => println!(
            "     Solver elapsed time: {} seconds ({} seconds process time)",
            seconds(timings.solver),
            seconds(process_time)
        ),
        None => println!("     Solver elapsed time: {} seconds", seconds(timings.solver)),
    }
    println!(
        "     Verification elapsed time: {} seconds",
        seconds(timings.verify)
    );
}

/************************
 *     Main             *
 ************************/

/// latinsat: find a Latin square of the given order with an external SAT solver
#[derive(Debug, Clone, FromArgs)]
struct Config {
    /// the order of the Latin square (a positive integer)
    #[argh(positional)]
    order: String,

    /// seed passed to the solver as --seed=<seed>
    #[argh(positional)]
    seed: Option<i64>,

    /// the solver executable to run (default: kissat)
    #[argh(option, default = "PathBuf::from(\"kissat\")")]
    solver: PathBuf,

    /// where to write the DIMACS CNF file (default: input.cnf)
    #[argh(option, default = "PathBuf::from(\"input.cnf\")")]
    cnf: PathBuf,

    /// where to write the solver's output (default: output.txt)
    #[argh(option, default = "PathBuf::from(\"output.txt\")")]
    output: PathBuf,

    /// only write the CNF file; don't run the solver
    #[argh(switch, long = "emit-only")]
    emit_only: bool,

    /// decode an existing solver output file instead of generating and solving
    #[argh(option)]
    decode: Option<PathBuf>,

    /// don't log anything besides the result
    #[argh(switch, short = 'q', long = "quiet")]
    quiet: bool,

    /// log how long each stage took
    #[argh(switch, long = "log-elapsed")]
    log_elapsed: bool,
}

fn main() -> anyhow::Result<()> {
    let config = argh::from_env::<Config>();
    let start_time = Instant::now();

    let order = config
        .order
        .parse::<Order>()
        .context("<order> must be a positive integer")?;

    let mut pipeline = Pipeline::new(order);
    if !config.quiet {
        pipeline.config().log_steps = true;
        pipeline.config().log_elapsed = config.log_elapsed;
    }

    if config.emit_only {
        let cnf = pipeline
            .write_cnf(&config.cnf)
            .with_context(|| format!("failed to write {}", config.cnf.display()))?;
        println!(
            "Wrote {} variables and {} clauses to: {}",
            cnf.var_count,
            cnf.clause_count(),
            config.cnf.display()
        );
        return Ok(());
    }

    let source = match &config.decode {
        Some(path) => path.display().to_string(),
        None => config.solver.display().to_string(),
    };
    let result = match &config.decode {
        Some(path) => pipeline.verify(path),
        None => {
            let solver = ExternalSolver::new(&config.solver).seed(config.seed);
            pipeline
                .run(&solver, &config.cnf, &config.output)
                .map(|report| report.outcome)
        }
    };

    match result {
        Ok(Outcome::Satisfiable(grid)) => {
            println!("Result: SAT");
            print_grid(&grid);
            println!(
                "\nValid solution produced by {} for a latin square of order {}.",
                source,
                order
            );
        }
        Ok(Outcome::Unsatisfiable) => println!("Result: UNSAT"),
        Err(err) => {
            if let Error::DecodeIncomplete { grid, .. } | Error::StructurallyInvalid { grid, .. } =
                &err
            {
                println!("Result: SAT");
                print_grid(grid);
                println!("\nInvalid solution produced by {}", source);
                print_timings(&pipeline.timings(), start_time.elapsed());
            }
            return Err(err).context(format!("order {}", order));
        }
    }

    print_timings(&pipeline.timings(), start_time.elapsed());
    Ok(())
}
