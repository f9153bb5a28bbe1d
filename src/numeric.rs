use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::brouwerian::Brouwerian;
use crate::error::EvalError;
use crate::interpreter::Bindings;
use crate::syntaxtree::{Arith, Comparison, NumericNode};


pub type Fraction = num_rational::BigRational;


/// The result of any arithmetic. Integers stay integers under `+ - * %`;
/// division always yields a rational.
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Int(BigInt),
    Rat(Fraction),
}


// Sums and differences: exact for two integers, cross-multiplied otherwise.
macro_rules! additive_method {
    ($name:ident, $op:tt) => {
        pub fn $name(&self, other: &Number) -> Number {
            match (self, other) {
                (Number::Int(a), Number::Int(b)) => Number::Int(a $op b),
                _ => {
                    let (a, b) = (self.to_fraction(), other.to_fraction());
                    Number::Rat(Fraction::new(
                        a.numer() * b.denom() $op b.numer() * a.denom(),
                        a.denom() * b.denom()
                    ))
                }
            }
        }
    };
}


impl Number {

    additive_method!(plus, +);
    additive_method!(minus, -);

    pub fn times(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Number::Int(a * b),
            _ => {
                let (a, b) = (self.to_fraction(), other.to_fraction());
                Number::Rat(Fraction::new(a.numer() * b.numer(), a.denom() * b.denom()))
            }
        }
    }

    pub fn divide(&self, other: &Number) -> Result<Number, EvalError> {
        if other.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        let (a, b) = (self.to_fraction(), other.to_fraction());
        // Fraction::new moves the sign to the numerator and reduces.
        Ok(Number::Rat(Fraction::new(a.numer() * b.denom(), b.numer() * a.denom())))
    }

    /// `a - floor(a / b) * b`, so the remainder takes the sign of `b`.
    pub fn modulo(&self, other: &Number) -> Result<Number, EvalError> {
        let quotient = self.divide(other)?.to_fraction().floor().to_integer();
        Ok(self.minus(&Number::Int(quotient).times(other)))
    }

    pub fn negate(&self) -> Number {
        match self {
            Number::Int(a) => Number::Int(-a),
            Number::Rat(a) => Number::Rat(-a),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(a) => a.is_zero(),
            Number::Rat(a) => a.is_zero(),
        }
    }

    pub fn sign(&self) -> Ordering {
        match self {
            Number::Int(a) => a.cmp(&BigInt::zero()),
            Number::Rat(a) => a.numer().cmp(&BigInt::zero()),
        }
    }

    pub fn to_fraction(&self) -> Fraction {
        match self {
            Number::Int(a) => Fraction::from_integer(a.clone()),
            Number::Rat(a) => a.clone(),
        }
    }

    pub fn into_fraction(self) -> Fraction {
        match self {
            Number::Int(a) => Fraction::from_integer(a),
            Number::Rat(a) => a,
        }
    }

    /// Fails unless the value is whole.
    pub fn into_integer(self) -> Result<BigInt, EvalError> {
        match self {
            Number::Int(a) => Ok(a),
            Number::Rat(a) if a.is_integer() => Ok(a.to_integer()),
            Number::Rat(a) => Err(EvalError::TypeConversion{value: format_fraction(&a)}),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(a) => write!(f, "{}", a),
            Number::Rat(a) => write!(f, "{}", format_fraction(a)),
        }
    }
}

/// Rationals always print with their denominator, `4/1` included.
pub fn format_fraction(a: &Fraction) -> String {
    format!("{}/{}", a.numer(), a.denom())
}


pub fn parse_integer(digits: &str) -> Result<BigInt, EvalError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EvalError::InvalidLiteral(digits.to_string()));
    }
    BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| EvalError::InvalidLiteral(digits.to_string()))
}

/// The literal `whole.fraction`. The denominator is the smallest power of ten
/// strictly greater than the value of `fraction`, so `1.05` is `3/2`.
pub fn decimal(whole: &str, fraction: &str) -> Result<Number, EvalError> {
    let whole = parse_integer(whole)?;
    let fraction = parse_integer(fraction)?;
    let ten = BigInt::from(10);

    let mut denominator = BigInt::one();
    while denominator <= fraction {
        denominator *= &ten;
    }
    let numerator = whole * &denominator + fraction;
    Ok(Number::Rat(Fraction::new(numerator, denominator)))
}

pub fn compare(op: Comparison, lhs: &Number, rhs: &Number) -> Brouwerian {
    let sign = lhs.minus(rhs).sign();
    let holds = match op {
        Comparison::Equal => sign == Ordering::Equal,
        Comparison::Greater => sign == Ordering::Greater,
        Comparison::Less => sign == Ordering::Less,
    };
    Brouwerian::from(holds)
}


pub fn evaluate(node: &NumericNode, bindings: &Bindings) -> Result<Number, EvalError> {
    Ok(match node {
        NumericNode::Integer(digits) => Number::Int(parse_integer(digits)?),
        NumericNode::Decimal{whole, fraction} => decimal(whole, fraction)?,
        NumericNode::IntLookup(key) => Number::Int(bindings.read_int(key)?.clone()),
        NumericNode::RatLookup(key) => Number::Rat(bindings.read_rat(key)?.clone()),
        NumericNode::Neg(operand) => evaluate(operand, bindings)?.negate(),
        NumericNode::Binop(binop) => {
            let lhs = evaluate(&binop.lhs, bindings)?;
            let rhs = evaluate(&binop.rhs, bindings)?;
            match binop.op {
                Arith::Add => lhs.plus(&rhs),
                Arith::Sub => lhs.minus(&rhs),
                Arith::Mul => lhs.times(&rhs),
                Arith::Div => lhs.divide(&rhs)?,
                Arith::Mod => lhs.modulo(&rhs)?,
                Arith::Pow => return Err(EvalError::UnsupportedNode("<POW-EXPR>".to_string())),
            }
        }
    })
}
