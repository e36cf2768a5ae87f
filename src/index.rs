use crate::clauses;
use crate::Error;
use std::fmt;
use std::str::FromStr;

/************************
 *     Order            *
 ************************/

/// The order `n` of a Latin square: its side length, and the number of symbols `0..n`.
///
/// An `Order` is always positive, `n³` always fits in a DIMACS literal, and the number of
/// clauses in its encoding always fits in a `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Order(usize);

impl Order {
    pub fn new(n: usize) -> Result<Order, Error> {
        if n == 0 {
            return Err(Error::InvalidOrder(
                "order must be a positive integer".to_owned(),
            ));
        }
        let too_large = || Error::InvalidOrder(format!("order {} is too large to encode", n));
        let cube = n
            .checked_mul(n)
            .and_then(|sq| sq.checked_mul(n))
            .ok_or_else(too_large)?;
        if i64::try_from(cube).is_err() {
            return Err(too_large());
        }
        clauses::checked_clause_count(n).ok_or_else(too_large)?;
        Ok(Order(n))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(word: &str) -> Result<Order, Error> {
        match i64::from_str(word.trim()) {
            Ok(n) if n > 0 => match usize::try_from(n) {
                Ok(n) => Order::new(n),
                Err(_) => Err(Error::InvalidOrder(format!("order {} is too large", n))),
            },
            Ok(n) => Err(Error::InvalidOrder(format!(
                "order must be a positive integer, got {}",
                n
            ))),
            Err(_) => Err(Error::InvalidOrder(format!(
                "order must be a positive integer, got '{}'",
                word
            ))),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/************************
 *     Lit              *
 ************************/

/// A variable identifier, in `1..=n³`.
pub type Var = u64;

/// A signed DIMACS literal: `+var` or `-var`. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(i64);

impl Lit {
    pub fn pos(var: Var) -> Lit {
        Lit(var as i64)
    }

    pub fn neg(var: Var) -> Lit {
        Lit(-(var as i64))
    }

    pub fn var(self) -> Var {
        self.0.unsigned_abs()
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn to_dimacs(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/************************
 *     Indexer          *
 ************************/

/// A `(row, col, symbol)` position, each coordinate in `0..n`.
pub type Triple = (usize, usize, usize);

/// Maps `(row, col, symbol)` triples to variables and back.
///
/// Variables are `r·n² + c·n + s + 1`: the triple read as a base-`n` number with the row as the
/// most significant digit, shifted up by one because DIMACS variables start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indexer {
    n: usize,
}

impl Indexer {
    pub fn new(order: Order) -> Indexer {
        Indexer { n: order.get() }
    }

    pub fn order(&self) -> usize {
        self.n
    }

    /// The number of variables, `n³`. This is also the largest variable.
    pub fn var_count(&self) -> Var {
        (self.n * self.n * self.n) as Var
    }

    pub fn encode(&self, row: usize, col: usize, symbol: usize) -> Var {
        debug_assert!(row < self.n && col < self.n && symbol < self.n);
        let n = self.n;
        (row * n * n + col * n + symbol + 1) as Var
    }

    /// Inverse of `encode`. Only meaningful for `var` in `1..=n³`; see `try_decode`.
    pub fn decode(&self, var: Var) -> Triple {
        let n = self.n;
        let v = (var - 1) as usize;
        (v / (n * n), (v % (n * n)) / n, v % n)
    }

    /// Like `decode`, but returns `None` for variables outside `1..=n³`.
    pub fn try_decode(&self, var: Var) -> Option<Triple> {
        if var == 0 || var > self.var_count() {
            None
        } else {
            Some(self.decode(var))
        }
    }
}

#[test]
fn test_order() {
    assert_eq!(Order::new(3).unwrap().get(), 3);
    assert!(matches!(Order::new(0), Err(Error::InvalidOrder(_))));
    assert!(matches!(Order::new(usize::MAX), Err(Error::InvalidOrder(_))));

    assert_eq!("7".parse::<Order>().unwrap().get(), 7);
    assert_eq!(" 7\n".parse::<Order>().unwrap().get(), 7);
    for bad in ["0", "-3", "2.5", "three", ""] {
        assert!(
            matches!(bad.parse::<Order>(), Err(Error::InvalidOrder(_))),
            "'{}' should be rejected",
            bad
        );
    }
}

#[test]
fn test_lit() {
    let a = Lit::pos(5);
    let b = Lit::neg(5);
    assert!(a.is_positive());
    assert!(!b.is_positive());
    assert_eq!(a.var(), 5);
    assert_eq!(b.var(), 5);
    assert_eq!(a.to_dimacs(), 5);
    assert_eq!(b.to_dimacs(), -5);
    assert_eq!(b.to_string(), "-5");
}

#[test]
fn test_indexer() {
    let indexer = Indexer::new(Order::new(3).unwrap());
    assert_eq!(indexer.var_count(), 27);
    assert_eq!(indexer.encode(0, 0, 0), 1);
    assert_eq!(indexer.encode(0, 0, 2), 3);
    assert_eq!(indexer.encode(0, 1, 0), 4);
    assert_eq!(indexer.encode(1, 0, 0), 10);
    assert_eq!(indexer.encode(2, 2, 2), 27);
    assert_eq!(indexer.decode(14), (1, 1, 1));
    assert_eq!(indexer.try_decode(0), None);
    assert_eq!(indexer.try_decode(28), None);
    assert_eq!(indexer.try_decode(27), Some((2, 2, 2)));
}

#[test]
fn test_indexer_bijection() {
    for n in 1..=6 {
        let indexer = Indexer::new(Order::new(n).unwrap());
        let mut seen = vec![false; indexer.var_count() as usize];
        for r in 0..n {
            for c in 0..n {
                for s in 0..n {
                    let var = indexer.encode(r, c, s);
                    assert!((1..=indexer.var_count()).contains(&var));
                    assert!(!seen[var as usize - 1], "collision at {:?}", (r, c, s));
                    seen[var as usize - 1] = true;
                    assert_eq!(indexer.decode(var), (r, c, s));
                }
            }
        }
        assert!(seen.iter().all(|b| *b));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// `decode` undoes `encode`
        #[test]
        fn prop_decode_encode(n in 1usize..200, seed in any::<(usize, usize, usize)>()) {
            let indexer = Indexer::new(Order::new(n).unwrap());
            let (r, c, s) = (seed.0 % n, seed.1 % n, seed.2 % n);
            prop_assert_eq!(indexer.decode(indexer.encode(r, c, s)), (r, c, s));
        }

        /// `encode` undoes `decode` on every variable in range
        #[test]
        fn prop_encode_decode(n in 1usize..200, seed in any::<u64>()) {
            let indexer = Indexer::new(Order::new(n).unwrap());
            let var = seed % indexer.var_count() + 1;
            let (r, c, s) = indexer.decode(var);
            prop_assert!(r < n && c < n && s < n);
            prop_assert_eq!(indexer.encode(r, c, s), var);
        }
    }
}
