use crate::decode::Grid;
use bitvec::{bitvec, vec::BitVec};
use std::fmt;

/// The first reason a grid fails to be a Latin square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Row `row` has `len` cells instead of `n`.
    Shape { row: usize, len: usize },
    /// Cell `(row, col)` was never assigned a symbol.
    Unset { row: usize, col: usize },
    /// Cell `(row, col)` holds a symbol outside `0..n`.
    OutOfRange { row: usize, col: usize, symbol: usize },
    /// Symbol `symbol` occurs more than once in row `row`.
    RepeatedInRow { row: usize, symbol: usize },
    /// Symbol `symbol` occurs more than once in column `col`.
    RepeatedInColumn { col: usize, symbol: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Violation::*;

        match self {
            Shape { row, len } => write!(f, "row {} has length {}", row, len),
            Unset { row, col } => write!(f, "cell ({}, {}) is unset", row, col),
            OutOfRange { row, col, symbol } => {
                write!(f, "cell ({}, {}) holds out-of-range symbol {}", row, col, symbol)
            }
            RepeatedInRow { row, symbol } => {
                write!(f, "symbol {} repeats in row {}", symbol, row)
            }
            RepeatedInColumn { col, symbol } => {
                write!(f, "symbol {} repeats in column {}", symbol, col)
            }
        }
    }
}

/// Whether `grid` is a Latin square: square, fully assigned, and with every row and every
/// column a permutation of `0..n`.
pub fn is_valid(grid: &Grid) -> bool {
    check(grid).is_ok()
}

/// Like `is_valid`, but says what's wrong. Checks the shape first, then all rows, then all
/// columns, and reports the first violation found.
pub fn check(grid: &Grid) -> Result<(), Violation> {
    let rows = grid.rows();
    let n = rows.len();

    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != n {
            return Err(Violation::Shape {
                row,
                len: cells.len(),
            });
        }
    }

    // Rows. Since a row has n cells, no repeats means it's a permutation.
    let mut seen: BitVec = bitvec![0; n];
    for (row, cells) in rows.iter().enumerate() {
        seen.fill(false);
        for (col, cell) in cells.iter().enumerate() {
            let symbol = match *cell {
                None => return Err(Violation::Unset { row, col }),
                Some(symbol) if symbol >= n => {
                    return Err(Violation::OutOfRange { row, col, symbol })
                }
                Some(symbol) => symbol,
            };
            if seen.replace(symbol, true) {
                return Err(Violation::RepeatedInRow { row, symbol });
            }
        }
    }

    // Columns. Every cell is known to be set and in range by now.
    for col in 0..n {
        seen.fill(false);
        for cells in rows {
            if let Some(symbol) = cells[col] {
                if seen.replace(symbol, true) {
                    return Err(Violation::RepeatedInColumn { col, symbol });
                }
            }
        }
    }

    Ok(())
}

#[test]
fn test_order_two() {
    assert!(is_valid(&Grid::from_rows(vec![vec![0, 1], vec![1, 0]])));
    assert_eq!(
        check(&Grid::from_rows(vec![vec![0, 0], vec![1, 1]])),
        Err(Violation::RepeatedInRow { row: 0, symbol: 0 })
    );
    assert_eq!(
        check(&Grid::from_rows(vec![vec![0, 1], vec![0, 1]])),
        Err(Violation::RepeatedInColumn { col: 0, symbol: 0 })
    );
}

#[test]
fn test_unset() {
    let mut grid = Grid::unset(2);
    assert_eq!(check(&grid), Err(Violation::Unset { row: 0, col: 0 }));
    grid.set(0, 0, 0);
    grid.set(0, 1, 1);
    grid.set(1, 0, 1);
    assert_eq!(check(&grid), Err(Violation::Unset { row: 1, col: 1 }));
    grid.set(1, 1, 0);
    assert!(is_valid(&grid));
}

#[test]
fn test_shape_and_range() {
    let ragged = Grid::from_cells(vec![vec![Some(0), Some(1)], vec![Some(1)]]);
    assert_eq!(check(&ragged), Err(Violation::Shape { row: 1, len: 1 }));

    let wide = Grid::from_rows(vec![vec![0, 1, 2], vec![1, 2, 0]]);
    assert_eq!(check(&wide), Err(Violation::Shape { row: 0, len: 3 }));

    let out_of_range = Grid::from_rows(vec![vec![0, 2], vec![2, 0]]);
    assert_eq!(
        check(&out_of_range),
        Err(Violation::OutOfRange {
            row: 0,
            col: 1,
            symbol: 2
        })
    );
}

#[test]
fn test_trivial() {
    assert!(is_valid(&Grid::from_rows(vec![vec![0]])));
    assert!(!is_valid(&Grid::from_rows(vec![vec![1]])));
    assert!(is_valid(&Grid::from_rows(Vec::new())));
}

#[test]
fn test_cyclic() {
    for n in 1..=12 {
        let rows: Vec<Vec<usize>> = (0..n)
            .map(|r| (0..n).map(|c| (r + c) % n).collect())
            .collect();
        assert!(is_valid(&Grid::from_rows(rows)), "cyclic square of order {}", n);
    }
}
