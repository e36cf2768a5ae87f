use crate::index::{Indexer, Lit, Order, Triple, Var};

/************************
 *     Cnf              *
 ************************/

/// A disjunction of literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause(pub Vec<Lit>);

impl Clause {
    pub fn unit(lit: Lit) -> Clause {
        Clause(vec![lit])
    }

    pub fn lits(&self) -> &[Lit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any literal holds under `assignment`, which says if a variable is true.
    pub fn is_satisfied_by(&self, assignment: impl Fn(Var) -> bool) -> bool {
        self.0
            .iter()
            .any(|lit| assignment(lit.var()) == lit.is_positive())
    }
}

/// A CNF instance: the conjunction of `clauses`, over variables `1..=var_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    pub var_count: Var,
    pub clauses: Vec<Clause>,
}

impl Cnf {
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }
}

/************************
 *     Role             *
 ************************/

/// Which Latin-square axiom an exactly-one constraint expresses. For a fixed pair `(x, y)`, the
/// constraint ranges over `z`, and the role says which of `(row, col, symbol)` each of `x`, `y`
/// and `z` stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Cell `(x, y)` holds exactly one symbol `z`.
    Cell,
    /// Row `x` holds symbol `y` in exactly one column `z`.
    Row,
    /// Column `x` holds symbol `y` in exactly one row `z`.
    Column,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Cell, Role::Row, Role::Column];

    /// The `(row, col, symbol)` triple for `x, y, z` under this role.
    pub fn triple(self, x: usize, y: usize, z: usize) -> Triple {
        match self {
            Role::Cell => (x, y, z),
            Role::Row => (x, z, y),
            Role::Column => (z, x, y),
        }
    }
}

/************************
 *     Generator        *
 ************************/

/// The exact number of clauses `generate` produces: `2n + 3·n²·(1 + n(n-1)/2)`.
pub fn expected_clause_count(order: Order) -> usize {
    let n = order.get();
    2 * n + 3 * n * n * (1 + n * (n - 1) / 2)
}

/// `expected_clause_count`, or `None` if it overflows. `Order::new` rejects those orders.
pub(crate) fn checked_clause_count(n: usize) -> Option<usize> {
    let pairs = n.checked_mul(n.checked_sub(1)?)? / 2;
    let per_cell = pairs.checked_add(1)?;
    let axioms = n.checked_mul(n)?.checked_mul(3)?.checked_mul(per_cell)?;
    axioms.checked_add(n.checked_mul(2)?)
}

/// Builds the CNF instance whose models are the Latin squares of `order` with first row and
/// first column both `0, 1, ..., n-1`.
pub fn generate(order: Order) -> Cnf {
    let mut generator = ClauseGenerator::new(order);
    generator.symmetry_breaking();
    generator.axioms();
    generator.finish()
}

/// Owns the clause buffer while it's being filled.
struct ClauseGenerator {
    indexer: Indexer,
    clauses: Vec<Clause>,
}

impl ClauseGenerator {
    fn new(order: Order) -> ClauseGenerator {
        ClauseGenerator {
            indexer: Indexer::new(order),
            clauses: Vec::with_capacity(expected_clause_count(order)),
        }
    }

    /// Fix cell `(0, i)` and cell `(i, 0)` to symbol `i`.
    fn symmetry_breaking(&mut self) {
        for i in 0..self.indexer.order() {
            let first_row = self.indexer.encode(0, i, i);
            let first_col = self.indexer.encode(i, 0, i);
            self.clauses.push(Clause::unit(Lit::pos(first_row)));
            self.clauses.push(Clause::unit(Lit::pos(first_col)));
        }
    }

    fn axioms(&mut self) {
        let n = self.indexer.order();
        for x in 0..n {
            for y in 0..n {
                for role in Role::ALL {
                    self.exactly_one(role, x, y);
                }
            }
        }
    }

    /// Exactly one of the `n` variables `role.triple(x, y, z)` is true: one wide clause to say
    /// at least one is, then a binary clause forbidding each pair.
    fn exactly_one(&mut self, role: Role, x: usize, y: usize) {
        let vars = (0..self.indexer.order())
            .map(|z| {
                let (r, c, s) = role.triple(x, y, z);
                self.indexer.encode(r, c, s)
            })
            .collect::<Vec<_>>();

        self.clauses
            .push(Clause(vars.iter().copied().map(Lit::pos).collect()));
        for (i, a) in vars.iter().enumerate() {
            for b in &vars[i + 1..] {
                self.clauses.push(Clause(vec![Lit::neg(*a), Lit::neg(*b)]));
            }
        }
    }

    fn finish(self) -> Cnf {
        Cnf {
            var_count: self.indexer.var_count(),
            clauses: self.clauses,
        }
    }
}

#[cfg(test)]
fn order(n: usize) -> Order {
    Order::new(n).unwrap()
}

#[test]
fn test_counts() {
    for n in 1..=8 {
        let cnf = generate(order(n));
        assert_eq!(cnf.var_count, (n * n * n) as Var);
        assert_eq!(cnf.clause_count(), expected_clause_count(order(n)));
        assert_eq!(
            cnf.clause_count(),
            2 * n + 3 * n * n * (1 + n * (n - 1) / 2)
        );
    }
    assert_eq!(expected_clause_count(order(2)), 4 + 12 * 2);
    assert_eq!(expected_clause_count(order(3)), 6 + 27 * 4);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_large_orders() {
    // 3·n²·(1 + n(n-1)/2) passes 2⁶⁴ between these two
    assert!(checked_clause_count(50_000).is_some());
    assert_eq!(checked_clause_count(70_000), None);
    assert!(Order::new(50_000).is_ok());
    assert!(matches!(
        Order::new(70_000),
        Err(crate::Error::InvalidOrder(_))
    ));
    assert_eq!(
        checked_clause_count(50_000),
        Some(expected_clause_count(order(50_000)))
    );
    for n in 1..=20 {
        assert_eq!(checked_clause_count(n), Some(expected_clause_count(order(n))));
    }
}

#[test]
fn test_order_one() {
    let cnf = generate(order(1));
    assert_eq!(cnf.var_count, 1);
    assert_eq!(
        cnf.clauses,
        vec![Clause(vec![Lit::pos(1)]); 5],
        "two symmetry units, then three length-one exactly-ones"
    );
}

#[test]
fn test_clause_shapes() {
    let n = 5;
    let cnf = generate(order(n));
    let units = cnf.clauses.iter().filter(|c| c.len() == 1).count();
    let wide = cnf.clauses.iter().filter(|c| c.len() == n).count();
    let binary = cnf.clauses.iter().filter(|c| c.len() == 2).count();
    assert_eq!(units, 2 * n);
    assert_eq!(wide, 3 * n * n);
    assert_eq!(binary, 3 * n * n * n * (n - 1) / 2);
    assert_eq!(units + wide + binary, cnf.clause_count());

    for clause in &cnf.clauses {
        let all_pos = clause.lits().iter().all(|l| l.is_positive());
        let all_neg = clause.lits().iter().all(|l| !l.is_positive());
        match clause.len() {
            2 => assert!(all_neg),
            _ => assert!(all_pos),
        }
        for lit in clause.lits() {
            assert!((1..=cnf.var_count).contains(&lit.var()));
        }
    }
}

#[test]
fn test_symmetry_breaking() {
    let n = 4;
    let indexer = Indexer::new(order(n));
    let cnf = generate(order(n));
    let mut expected = Vec::new();
    for i in 0..n {
        expected.push(Clause::unit(Lit::pos(indexer.encode(0, i, i))));
        expected.push(Clause::unit(Lit::pos(indexer.encode(i, 0, i))));
    }
    assert_eq!(&cnf.clauses[..2 * n], &expected[..]);
}

#[test]
fn test_roles() {
    assert_eq!(Role::Cell.triple(1, 2, 3), (1, 2, 3));
    assert_eq!(Role::Row.triple(1, 2, 3), (1, 3, 2));
    assert_eq!(Role::Column.triple(1, 2, 3), (3, 1, 2));
}

#[test]
fn test_deterministic() {
    for n in 1..=6 {
        assert_eq!(generate(order(n)), generate(order(n)));
    }
}

#[test]
fn test_cyclic_square_is_a_model() {
    // (r + c) mod n already has first row and column 0..n
    for n in 1..=7 {
        let indexer = Indexer::new(order(n));
        let cnf = generate(order(n));
        let model = |var: Var| {
            let (r, c, s) = indexer.decode(var);
            (r + c) % n == s
        };
        for clause in &cnf.clauses {
            assert!(clause.is_satisfied_by(model), "n = {}: {:?}", n, clause);
        }
    }
}

#[test]
fn test_broken_square_is_not_a_model() {
    // Swapping two symbols in one row breaks the column axiom.
    let n = 3;
    let indexer = Indexer::new(order(n));
    let cnf = generate(order(n));
    let grid = [[0, 1, 2], [1, 2, 0], [2, 1, 0]];
    let model = |var: Var| {
        let (r, c, s) = indexer.decode(var);
        grid[r][c] == s
    };
    assert!(cnf.clauses.iter().any(|clause| !clause.is_satisfied_by(model)));
}
