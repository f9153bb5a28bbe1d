use std::cmp;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::error::EvalError;
use crate::interpreter::Bindings;
use crate::numeric;
use crate::syntaxtree::{Junction, LogicLiteral, LogicNode};


/// Unsure literals past this ordinal would need more than 2^24 table entries.
pub const MAX_UNSURE_ORDINAL: usize = 24;


#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Truth {
    False = 0,
    Open = 1,
    True = 2,
}

impl Truth {
    fn flip(self) -> Truth {
        match self {
            Truth::False => Truth::True,
            Truth::Open => Truth::Open,
            Truth::True => Truth::False,
        }
    }

    fn letter(self) -> char {
        match self {
            Truth::False => 'F',
            Truth::Open => 'U',
            Truth::True => 'T',
        }
    }
}


/// A value of the intuitionistic logic.
///
/// `Open` holds the truth table over the unsure atoms seen so far. The table
/// length is a power of two, and after `&` or `|` it is the shortest period
/// of the table. A table that is just `[False]` is never produced by `&` or
/// `|`; it collapses to `False`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Brouwerian {
    False,
    True,
    Open(Vec<Truth>),
}

impl Brouwerian {

    /// The unsure atom numbered `ordinal`: `2^ordinal` entries, the first
    /// half true and the second half false.
    pub fn unsure(ordinal: usize) -> Result<Brouwerian, EvalError> {
        if ordinal == 0 {
            return Err(EvalError::InvalidLiteral("U#0".to_string()));
        }
        if ordinal > MAX_UNSURE_ORDINAL {
            return Err(EvalError::TruthTableTooLarge{ordinal});
        }
        let half = 1usize << (ordinal - 1);
        let mut tail = vec![Truth::True; half];
        tail.extend(std::iter::repeat(Truth::False).take(half));
        Ok(Brouwerian::Open(tail))
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, Brouwerian::Open(_))
    }

    /// The truth table after the leading tag; empty for decided values.
    pub fn tail(&self) -> &[Truth] {
        match self {
            Brouwerian::Open(tail) => tail,
            _ => &[]
        }
    }

    /// The full symbol sequence, leading tag included.
    pub fn symbols(&self) -> Vec<Truth> {
        match self {
            Brouwerian::False => vec![Truth::False],
            Brouwerian::True => vec![Truth::True],
            Brouwerian::Open(tail) => {
                let mut ret = vec![Truth::Open];
                ret.extend_from_slice(tail);
                ret
            }
        }
    }

    /// Halves the table while both halves agree, then applies Gilvenko's
    /// collapse of a lone false entry.
    fn canonical(mut tail: Vec<Truth>) -> Brouwerian {
        while tail.len() > 1 && tail.len() % 2 == 0 {
            let half = tail.len() / 2;
            if tail[..half] != tail[half..] {
                break;
            }
            tail.truncate(half);
        }
        if tail == [Truth::False] {
            return Brouwerian::False;
        }
        Brouwerian::Open(tail)
    }

    fn pointwise(mut lhs: Vec<Truth>, mut rhs: Vec<Truth>, combine: fn(Truth, Truth) -> Truth) -> Brouwerian {
        widen(&mut lhs, rhs.len());
        widen(&mut rhs, lhs.len());
        let tail = lhs.into_iter().zip(rhs).map(|(l, r)| combine(l, r)).collect();
        Brouwerian::canonical(tail)
    }
}

/// Repeats `tail` onto itself until it is at least `len` entries long.
fn widen(tail: &mut Vec<Truth>, len: usize) {
    while !tail.is_empty() && tail.len() < len {
        tail.extend_from_within(..);
    }
}


impl From<bool> for Brouwerian {
    fn from(value: bool) -> Brouwerian {
        if value { Brouwerian::True } else { Brouwerian::False }
    }
}

impl BitAnd for Brouwerian {
    type Output = Brouwerian;

    fn bitand(self, rhs: Brouwerian) -> Brouwerian {
        match (self, rhs) {
            (Brouwerian::False, _) | (_, Brouwerian::False) => Brouwerian::False,
            (Brouwerian::True, other) | (other, Brouwerian::True) => other,
            (Brouwerian::Open(l), Brouwerian::Open(r)) => Brouwerian::pointwise(l, r, cmp::min),
        }
    }
}

impl BitOr for Brouwerian {
    type Output = Brouwerian;

    fn bitor(self, rhs: Brouwerian) -> Brouwerian {
        match (self, rhs) {
            (Brouwerian::True, _) | (_, Brouwerian::True) => Brouwerian::True,
            (Brouwerian::False, other) | (other, Brouwerian::False) => other,
            (Brouwerian::Open(l), Brouwerian::Open(r)) => Brouwerian::pointwise(l, r, cmp::max),
        }
    }
}

impl Not for Brouwerian {
    type Output = Brouwerian;

    // Entrywise only. The result is not re-canonicalized.
    fn not(self) -> Brouwerian {
        match self {
            Brouwerian::False => Brouwerian::True,
            Brouwerian::True => Brouwerian::False,
            Brouwerian::Open(tail) => Brouwerian::Open(tail.into_iter().map(Truth::flip).collect()),
        }
    }
}

impl fmt::Display for Brouwerian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brouwerian::False => write!(f, "F"),
            Brouwerian::True => write!(f, "T"),
            Brouwerian::Open(tail) => {
                let table: String = tail.iter().map(|t| t.letter()).collect();
                write!(f, "U({})", table)
            }
        }
    }
}


pub fn evaluate(node: &LogicNode, bindings: &Bindings) -> Result<Brouwerian, EvalError> {
    Ok(match node {
        LogicNode::Literal(LogicLiteral::True) => Brouwerian::True,
        LogicNode::Literal(LogicLiteral::False) => Brouwerian::False,
        LogicNode::Literal(LogicLiteral::Unsure{ordinal}) => Brouwerian::unsure(*ordinal)?,
        LogicNode::Lookup(key) => bindings.read_brou(key)?.clone(),
        LogicNode::Not(operand) => !evaluate(operand, bindings)?,
        LogicNode::Junction(junction) => {
            let lhs = evaluate(&junction.lhs, bindings)?;
            let rhs = evaluate(&junction.rhs, bindings)?;
            match junction.op {
                Junction::And => lhs & rhs,
                Junction::Or => lhs | rhs,
            }
        }
        LogicNode::Compare(compare) => {
            let lhs = numeric::evaluate(&compare.lhs, bindings)?;
            let rhs = numeric::evaluate(&compare.rhs, bindings)?;
            numeric::compare(compare.op, &lhs, &rhs)
        }
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use Truth::{False as F, True as T};

    fn u(ordinal: usize) -> Brouwerian {
        Brouwerian::unsure(ordinal).unwrap()
    }

    #[test]
    fn unsure_atoms_split_their_table() {
        assert_eq!(u(1), Brouwerian::Open(vec![T, F]));
        assert_eq!(u(2), Brouwerian::Open(vec![T, T, F, F]));
        assert_eq!(u(3).tail().len(), 8);
        assert_eq!(u(1).symbols(), vec![Truth::Open, T, F]);
        assert!(!u(1).is_decided());
    }

    #[test]
    fn oversized_tables_are_refused() {
        assert!(Brouwerian::unsure(MAX_UNSURE_ORDINAL).is_ok());
        assert_eq!(
            Brouwerian::unsure(MAX_UNSURE_ORDINAL + 1),
            Err(EvalError::TruthTableTooLarge{ordinal: MAX_UNSURE_ORDINAL + 1})
        );
    }

    #[test]
    fn decided_operands_short_circuit() {
        assert_eq!(Brouwerian::True & u(2), u(2));
        assert_eq!(u(2) & Brouwerian::True, u(2));
        assert_eq!(u(2) & Brouwerian::False, Brouwerian::False);
        assert_eq!(Brouwerian::False | u(3), u(3));
        assert_eq!(u(3) | Brouwerian::True, Brouwerian::True);
    }

    #[test]
    fn shorter_tables_are_widened() {
        assert_eq!(u(1) & u(2), Brouwerian::Open(vec![T, F, F, F]));
        assert_eq!(u(1) | u(2), Brouwerian::Open(vec![T, T, T, F]));
    }

    #[test]
    fn results_are_canonicalized() {
        assert_eq!(u(1) & u(1), u(1));
        assert_eq!(u(2) | u(2), u(2));
        assert_eq!(u(1) | !u(1), Brouwerian::Open(vec![T]));
    }

    #[test]
    fn gilvenko_collapse() {
        assert_eq!(!u(1) & !!u(1), Brouwerian::False);
        assert_eq!(u(2) & !u(2), Brouwerian::False);
    }

    #[test]
    fn negation_is_not_canonicalized() {
        // `u or not u` canonicalizes to a single true entry; negating that
        // leaves a lone false entry in place instead of collapsing to F.
        let excluded_middle = u(1) | !u(1);
        let negated = !excluded_middle;
        assert_eq!(negated, Brouwerian::Open(vec![F]));
        assert_ne!(negated, Brouwerian::False);
        assert_eq!(negated.to_string(), "U(F)");
    }

    #[test]
    fn decided_negation_swaps() {
        assert_eq!(!Brouwerian::True, Brouwerian::False);
        assert_eq!(!Brouwerian::False, Brouwerian::True);
        assert_eq!(!u(2), Brouwerian::Open(vec![F, F, T, T]));
    }

    #[test]
    fn display() {
        assert_eq!(Brouwerian::True.to_string(), "T");
        assert_eq!(Brouwerian::False.to_string(), "F");
        assert_eq!(u(2).to_string(), "U(TTFF)");
    }
}
