use crate::index::{Indexer, Order};
use crate::validate;
use crate::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/************************
 *     Grid             *
 ************************/

/// An `n x n` grid of symbols. A cell is `None` until something assigns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Option<usize>>>,
}

impl Grid {
    /// An `n x n` grid with every cell unset.
    pub fn unset(n: usize) -> Grid {
        Grid {
            rows: vec![vec![None; n]; n],
        }
    }

    /// A grid with every cell set. The rows need not all have the same length.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Grid {
        Grid {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        }
    }

    pub fn from_cells(rows: Vec<Vec<Option<usize>>>) -> Grid {
        Grid { rows }
    }

    /// The number of rows.
    pub fn order(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Option<usize>>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, symbol: usize) {
        self.rows[row][col] = Some(symbol);
    }

    /// Coordinates of the cells that were never assigned, in row-major order.
    pub fn unset_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_none() {
                    cells.push((r, c));
                }
            }
        }
        cells
    }
}

/// One line per row, like `[0, 1, 2]`. Unset cells are shown as `-1`.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.rows {
            write!(f, "[")?;
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                match cell {
                    Some(symbol) => write!(f, "{}", symbol)?,
                    None => write!(f, "-1")?,
                }
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

/************************
 *     Verdict          *
 ************************/

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    Sat,
    Unsat,
    /// Any other status, such as `s UNKNOWN` from a solver that hit a limit. Holds the text
    /// after the `s `.
    Unknown(String),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Verdict::Sat => write!(f, "SAT"),
            Verdict::Unsat => write!(f, "UNSAT"),
            Verdict::Unknown(status) => write!(f, "unknown ({})", status),
        }
    }
}

/// What a solve amounted to, once the solver's output is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The solver found a model, and it decodes to this valid Latin square.
    Satisfiable(Grid),
    /// The solver proved no Latin square of this order has the fixed first row and column.
    Unsatisfiable,
}

/************************
 *     SolverOutput     *
 ************************/

/// Everything read from a solver's output.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    /// `None` if there was no `s` line.
    pub verdict: Option<Verdict>,
    pub grid: Grid,
    /// How many `v` lines there were.
    pub value_lines: usize,
    /// Seconds, from the solver's `c process-time` comment line.
    pub process_time: Option<f64>,
}

impl SolverOutput {
    /// Check the decoded results. A satisfiable verdict must come with a fully assigned grid, and
    /// that grid must be a Latin square.
    pub fn resolve(self) -> Result<Outcome, Error> {
        match self.verdict {
            None => Err(Error::MissingVerdict),
            Some(Verdict::Unknown(status)) => Err(Error::UnknownVerdict(status)),
            Some(Verdict::Unsat) => Ok(Outcome::Unsatisfiable),
            Some(Verdict::Sat) if self.value_lines == 0 => Err(Error::MissingAssignment),
            Some(Verdict::Sat) => {
                let unset = self.grid.unset_cells();
                if !unset.is_empty() {
                    return Err(Error::DecodeIncomplete {
                        unset,
                        grid: self.grid,
                    });
                }
                match validate::check(&self.grid) {
                    Ok(()) => Ok(Outcome::Satisfiable(self.grid)),
                    Err(violation) => Err(Error::StructurallyInvalid {
                        violation,
                        grid: self.grid,
                    }),
                }
            }
        }
    }
}

/************************
 *     Decoder          *
 ************************/

/// Reads solver output one line at a time.
///
/// Status (`s ...`) and value (`v ...`) lines may come in any order. Value lines are all part of
/// one assignment; the positive literals in them set grid cells, and the negative ones and the
/// terminating `0` are skipped.
#[derive(Debug, Clone)]
pub struct Decoder {
    indexer: Indexer,
    line_number: usize,
    output: SolverOutput,
}

impl Decoder {
    pub fn new(order: Order) -> Decoder {
        Decoder {
            indexer: Indexer::new(order),
            line_number: 0,
            output: SolverOutput {
                verdict: None,
                grid: Grid::unset(order.get()),
                value_lines: 0,
                process_time: None,
            },
        }
    }

    pub fn feed_line(&mut self, line: &str) -> Result<(), Error> {
        self.line_number += 1;

        if let Some(status) = line.strip_prefix("s ") {
            let verdict = if status.contains("UNSATISFIABLE") {
                Verdict::Unsat
            } else if status.contains("SATISFIABLE") {
                Verdict::Sat
            } else {
                Verdict::Unknown(status.trim().to_owned())
            };
            self.output.verdict = Some(verdict);
        } else if let Some(values) = line.strip_prefix("v ") {
            self.output.value_lines += 1;
            for token in values.split_whitespace() {
                self.feed_value(token)?;
            }
        } else if line.starts_with("c process-time") {
            // c process-time: <pretty>  <seconds> seconds
            let tokens = line.split_whitespace().collect::<Vec<_>>();
            if tokens.len() >= 2 {
                self.output.process_time = tokens[tokens.len() - 2].parse().ok();
            }
        }
        Ok(())
    }

    fn feed_value(&mut self, token: &str) -> Result<(), Error> {
        let value = token.parse::<i64>().map_err(|_| Error::MalformedOutput {
            line: self.line_number,
            message: format!("bad value '{}'", token),
        })?;
        if value <= 0 {
            return Ok(());
        }
        let (row, col, symbol) =
            self.indexer
                .try_decode(value as u64)
                .ok_or_else(|| Error::MalformedOutput {
                    line: self.line_number,
                    message: format!(
                        "variable {} is out of range 1..={}",
                        value,
                        self.indexer.var_count()
                    ),
                })?;
        self.output.grid.set(row, col, symbol);
        Ok(())
    }

    pub fn finish(self) -> SolverOutput {
        self.output
    }
}

/// Decode a solver's complete output text.
pub fn decode_str(order: Order, text: &str) -> Result<SolverOutput, Error> {
    let mut decoder = Decoder::new(order);
    for line in text.lines() {
        decoder.feed_line(line)?;
    }
    Ok(decoder.finish())
}

pub fn decode_reader<R: BufRead>(order: Order, reader: R) -> Result<SolverOutput, Error> {
    let mut decoder = Decoder::new(order);
    for line in reader.lines() {
        decoder.feed_line(&line?)?;
    }
    Ok(decoder.finish())
}

/// Decode the solver output saved at `path`. The file is closed before this returns.
pub fn decode_file(order: Order, path: impl AsRef<Path>) -> Result<SolverOutput, Error> {
    let file = File::open(path)?;
    decode_reader(order, BufReader::new(file))
}

#[cfg(test)]
fn order(n: usize) -> Order {
    Order::new(n).unwrap()
}

#[test]
fn test_decode_order_one() {
    let output = decode_str(order(1), "s SATISFIABLE\nv 1 0\n").unwrap();
    assert_eq!(output.verdict, Some(Verdict::Sat));
    assert_eq!(output.grid, Grid::from_rows(vec![vec![0]]));
    assert!(validate::is_valid(&output.grid));
    assert_eq!(
        output.resolve().unwrap(),
        Outcome::Satisfiable(Grid::from_rows(vec![vec![0]]))
    );
}

#[test]
fn test_decode_kissat_style() {
    let text = "\
c ---- [ banner ] ----
c
c seed 3
s SATISFIABLE
v 1 -2 -3 4 -5 6
v 7 -8 0
c process-time:                   0.01s               0.00 seconds
";
    let output = decode_str(order(2), text).unwrap();
    assert_eq!(output.verdict, Some(Verdict::Sat));
    assert_eq!(output.process_time, Some(0.0));
    assert_eq!(output.grid, Grid::from_rows(vec![vec![0, 1], vec![1, 0]]));
    assert!(output.resolve().is_ok());
}

#[test]
fn test_values_before_status() {
    let text = "v 1 -2 -3\nv 4 -5 6 7 -8 0\ns SATISFIABLE\n";
    let output = decode_str(order(2), text).unwrap();
    assert_eq!(output.verdict, Some(Verdict::Sat));
    assert_eq!(output.grid, Grid::from_rows(vec![vec![0, 1], vec![1, 0]]));
}

#[test]
fn test_unsat() {
    let output = decode_str(order(3), "c hello\ns UNSATISFIABLE\n").unwrap();
    assert_eq!(output.verdict, Some(Verdict::Unsat));
    assert_eq!(output.grid.unset_cells().len(), 9);
    assert_eq!(output.resolve().unwrap(), Outcome::Unsatisfiable);
}

#[test]
fn test_unknown_verdict() {
    let output = decode_str(order(1), "c limit reached\ns UNKNOWN\n").unwrap();
    assert_eq!(output.verdict, Some(Verdict::Unknown("UNKNOWN".to_owned())));
    match output.resolve() {
        Err(Error::UnknownVerdict(status)) => assert_eq!(status, "UNKNOWN"),
        other => panic!("expected UnknownVerdict, got {:?}", other),
    }
}

#[test]
fn test_sat_without_values() {
    let output = decode_str(order(3), "s SATISFIABLE\n").unwrap();
    assert_eq!(output.value_lines, 0);
    assert!(matches!(output.resolve(), Err(Error::MissingAssignment)));

    // A `v` line with only the terminator still counts as an assignment, just an empty one.
    let output = decode_str(order(1), "s SATISFIABLE\nv 0\n").unwrap();
    assert_eq!(output.value_lines, 1);
    assert!(matches!(output.resolve(), Err(Error::DecodeIncomplete { .. })));
}

#[test]
fn test_missing_verdict() {
    let output = decode_str(order(1), "c nothing here\n").unwrap();
    assert_eq!(output.verdict, None);
    assert!(matches!(output.resolve(), Err(Error::MissingVerdict)));
}

#[test]
fn test_incomplete() {
    let output = decode_str(order(2), "s SATISFIABLE\nv 1 -2 -3 4 0\n").unwrap();
    match output.resolve() {
        Err(Error::DecodeIncomplete { unset, grid }) => {
            assert_eq!(unset, vec![(1, 0), (1, 1)]);
            assert_eq!(grid.get(0, 1), Some(1));
        }
        other => panic!("expected DecodeIncomplete, got {:?}", other),
    }
}

#[test]
fn test_structurally_invalid() {
    // Row 1 is [0, 0]
    let output = decode_str(order(2), "s SATISFIABLE\nv 1 4 5 7 0\n").unwrap();
    assert_eq!(output.grid, Grid::from_rows(vec![vec![0, 1], vec![0, 0]]));
    match output.resolve() {
        Err(Error::StructurallyInvalid { violation, .. }) => assert_eq!(
            violation,
            validate::Violation::RepeatedInRow { row: 1, symbol: 0 }
        ),
        other => panic!("expected StructurallyInvalid, got {:?}", other),
    }
}

#[test]
fn test_malformed() {
    assert!(matches!(
        decode_str(order(2), "s SATISFIABLE\nv 1 x 0\n"),
        Err(Error::MalformedOutput { line: 2, .. })
    ));
    assert!(matches!(
        decode_str(order(2), "s SATISFIABLE\nv 1 9 0\n"),
        Err(Error::MalformedOutput { line: 2, .. })
    ));
    // Negative literals are never decoded, so their range doesn't matter.
    assert!(decode_str(order(2), "v -9 0\n").is_ok());
}

#[test]
fn test_grid_display() {
    let mut grid = Grid::unset(2);
    grid.set(0, 0, 0);
    grid.set(0, 1, 1);
    assert_eq!(grid.to_string(), "[0, 1]\n[-1, -1]\n");
}
