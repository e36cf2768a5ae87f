//! DIMACS CNF output.

use crate::clauses::Cnf;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write `cnf` in DIMACS format: a `p cnf <vars> <clauses>` header, then one clause per line,
/// each terminated by `0`. Output is streamed through a buffer, one clause at a time.
pub fn write_cnf<W: Write>(writer: W, cnf: &Cnf) -> io::Result<()> {
    let mut out = BufWriter::new(writer);
    writeln!(out, "p cnf {} {}", cnf.var_count, cnf.clause_count())?;
    for clause in &cnf.clauses {
        for lit in clause.lits() {
            write!(out, "{} ", lit.to_dimacs())?;
        }
        writeln!(out, "0")?;
    }
    out.flush()
}

/// Create (or truncate) the file at `path` and write `cnf` to it. The file is closed before this
/// returns, whether or not writing succeeded.
pub fn write_cnf_file(path: impl AsRef<Path>, cnf: &Cnf) -> io::Result<()> {
    let file = File::create(path)?;
    write_cnf(&file, cnf)?;
    file.sync_all()
}

#[cfg(test)]
fn to_dimacs(cnf: &Cnf) -> String {
    let mut buf = Vec::new();
    write_cnf(&mut buf, cnf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_write_hand_built() {
    use crate::clauses::Clause;
    use crate::index::Lit;

    let cnf = Cnf {
        var_count: 3,
        clauses: vec![
            Clause(vec![Lit::pos(1), Lit::neg(3)]),
            Clause(vec![Lit::pos(2)]),
        ],
    };
    assert_eq!(to_dimacs(&cnf), "p cnf 3 2\n1 -3 0\n2 0\n");
}

#[test]
fn test_write_order_one() {
    use crate::clauses::generate;
    use crate::index::Order;

    let cnf = generate(Order::new(1).unwrap());
    assert_eq!(to_dimacs(&cnf), "p cnf 1 5\n1 0\n1 0\n1 0\n1 0\n1 0\n");
}

#[test]
fn test_write_order_two() {
    use crate::clauses::generate;
    use crate::index::Order;

    let cnf = generate(Order::new(2).unwrap());
    let text = to_dimacs(&cnf);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("p cnf 8 28"));

    let body = lines.collect::<Vec<_>>();
    assert_eq!(body.len(), 28);
    assert_eq!(&body[..4], &["1 0", "1 0", "4 0", "6 0"]);
    // Cell (0, 0): symbol 0 or 1, not both
    assert_eq!(&body[4..6], &["1 2 0", "-1 -2 0"]);
    for line in &body {
        assert!(line.ends_with(" 0"), "unterminated clause '{}'", line);
        for token in line.split_whitespace() {
            let lit: i64 = token.parse().unwrap();
            assert!(lit.abs() <= 8);
        }
    }
}
