// Runs the whole pipeline against a stand-in solver: a shell script that checks the CNF file
// it's given and prints a canned answer.
#![cfg(unix)]

use latinsat::{Error, ExternalSolver, Grid, Order, Outcome, Pipeline};
use std::fs;
use std::path::PathBuf;

struct Scratch {
    cnf: PathBuf,
    output: PathBuf,
}

impl Scratch {
    fn new(name: &str) -> Scratch {
        let dir = std::env::temp_dir();
        let stem = format!("latinsat-{}-{}", name, std::process::id());
        Scratch {
            cnf: dir.join(format!("{}.cnf", stem)),
            output: dir.join(format!("{}.out", stem)),
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.cnf);
        let _ = fs::remove_file(&self.output);
    }
}

/// `sh -c <script> <cnf-path>`: the script sees the CNF path as `$0`.
fn fake_solver(script: &str) -> ExternalSolver {
    ExternalSolver::new("sh").arg("-c").arg(script)
}

#[test]
fn test_satisfiable() {
    let scratch = Scratch::new("sat");
    let solver = fake_solver(
        "head -n 1 \"$0\" | grep -q '^p cnf 8 28$' || exit 1
         echo 'c fake solver'
         echo 's SATISFIABLE'
         echo 'v 1 -2 -3 4'
         echo 'v -5 6 7 -8 0'
         echo 'c process-time: 0s 0.25 seconds'
         exit 10",
    );

    let mut pipeline = Pipeline::new(Order::new(2).unwrap());
    let report = pipeline.run(&solver, &scratch.cnf, &scratch.output).unwrap();
    assert_eq!(
        report.outcome,
        Outcome::Satisfiable(Grid::from_rows(vec![vec![0, 1], vec![1, 0]]))
    );
    assert_eq!(
        report.timings.solver_process_time,
        Some(std::time::Duration::from_millis(250))
    );

    let cnf = fs::read_to_string(&scratch.cnf).unwrap();
    assert_eq!(cnf.lines().count(), 1 + 28);
    let output = fs::read_to_string(&scratch.output).unwrap();
    assert!(output.starts_with("c fake solver\n"));
}

#[test]
fn test_unsatisfiable() {
    let scratch = Scratch::new("unsat");
    let solver = fake_solver("echo 's UNSATISFIABLE'; exit 20");
    let mut pipeline = Pipeline::new(Order::new(3).unwrap());
    let report = pipeline.run(&solver, &scratch.cnf, &scratch.output).unwrap();
    assert_eq!(report.outcome, Outcome::Unsatisfiable);
}

#[test]
fn test_stderr_is_captured() {
    let scratch = Scratch::new("stderr");
    let solver = fake_solver("echo 's SATISFIABLE' >&2; echo 'v 1 0' >&2");
    let mut pipeline = Pipeline::new(Order::new(1).unwrap());
    let report = pipeline.run(&solver, &scratch.cnf, &scratch.output).unwrap();
    assert_eq!(
        report.outcome,
        Outcome::Satisfiable(Grid::from_rows(vec![vec![0]]))
    );
}

#[test]
fn test_incomplete_assignment() {
    let scratch = Scratch::new("incomplete");
    let solver = fake_solver("echo 's SATISFIABLE'; echo 'v 1 -2 -3 4 0'");
    let mut pipeline = Pipeline::new(Order::new(2).unwrap());
    match pipeline.run(&solver, &scratch.cnf, &scratch.output) {
        Err(Error::DecodeIncomplete { unset, .. }) => assert_eq!(unset.len(), 2),
        other => panic!("expected DecodeIncomplete, got {:?}", other),
    }
}

#[test]
fn test_wrong_witness() {
    let scratch = Scratch::new("wrong");
    // Every cell is symbol 0
    let solver = fake_solver("echo 's SATISFIABLE'; echo 'v 1 3 5 7 0'");
    let mut pipeline = Pipeline::new(Order::new(2).unwrap());
    assert!(matches!(
        pipeline.run(&solver, &scratch.cnf, &scratch.output),
        Err(Error::StructurallyInvalid { .. })
    ));
}

#[test]
fn test_no_verdict() {
    let scratch = Scratch::new("silent");
    let solver = fake_solver("echo 'c crashed'");
    let mut pipeline = Pipeline::new(Order::new(2).unwrap());
    assert!(matches!(
        pipeline.run(&solver, &scratch.cnf, &scratch.output),
        Err(Error::MissingVerdict)
    ));
}

#[test]
fn test_decode_existing_output() {
    let scratch = Scratch::new("existing");
    fs::write(&scratch.output, "s SATISFIABLE\nv 1 0\n").unwrap();
    let mut pipeline = Pipeline::new(Order::new(1).unwrap());
    assert_eq!(
        pipeline.verify(&scratch.output).unwrap(),
        Outcome::Satisfiable(Grid::from_rows(vec![vec![0]]))
    );
}

#[test]
fn test_solver_gave_up() {
    let scratch = Scratch::new("unknown");
    let solver = fake_solver("echo 'c time limit'; echo 's UNKNOWN'; exit 0");
    let mut pipeline = Pipeline::new(Order::new(4).unwrap());
    match pipeline.run(&solver, &scratch.cnf, &scratch.output) {
        Err(Error::UnknownVerdict(status)) => assert_eq!(status, "UNKNOWN"),
        other => panic!("expected UnknownVerdict, got {:?}", other),
    }
}
