use thiserror::Error;

use crate::parsetree::Symbol;


#[derive(Debug, Error)]
pub enum LexError {
    #[error("illegal character {ch:?} at line {line}, column {col}")]
    IllegalCharacter { ch: char, pos: usize, line: usize, col: usize },

    /// A word that is neither a primitive, a keyword nor a legal identifier.
    /// Identifiers start with a lowercase letter.
    #[error("the word {word:?} at line {line}, column {col} is not legal Lej")]
    IllegalWord { word: String, pos: usize, line: usize, col: usize },

    #[error("comment opened at line {line}, column {col} is missing its closing '`'")]
    UnterminatedComment { pos: usize, line: usize, col: usize },

    #[error("bad token pattern: {0}")]
    Pattern(#[from] regex::Error),
}


/// Defects in the rule table itself, found once when it is built.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("nonterminals used but never produced: {0:?}")]
    Dangling(Vec<Symbol>),

    #[error("rule for {parent} has {children} bracketed symbols, expected 1 or 2")]
    Arity { parent: Symbol, children: usize },

    #[error("pattern `{pattern}` reduces to both {existing} and {parent}")]
    Conflict { pattern: String, existing: Symbol, parent: Symbol },

    #[error("{0} cannot head a rule")]
    Untiered(Symbol),
}


#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("this Lej program could not be parsed past line {line}: `{remaining}`")]
    Unreduced { remaining: String, line: usize },

    #[error("there is nothing to parse")]
    Empty,

    #[error("{symbol} cannot be built from {children} bracketed symbols")]
    Malformed { symbol: Symbol, children: usize },

    #[error("{found} at line {line} cannot stand as {expected}")]
    Misplaced { found: Symbol, expected: &'static str, line: usize },
}


#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("{name} is already assigned")]
    AlreadyAssigned { name: String },

    #[error("{name} has not been assigned")]
    NotAssigned { name: String },

    #[error("the rational number {value} cannot be converted to an integer")]
    TypeConversion { value: String },

    #[error("{0} has no evaluation procedure")]
    UnsupportedNode(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0:?} is not a valid integer literal")]
    InvalidLiteral(String),

    /// An unsure literal numbered beyond what a truth table can hold.
    #[error("unsure literal #{ordinal} would need a truth table of 2^{ordinal} entries")]
    TruthTableTooLarge { ordinal: usize },
}


#[derive(Debug, Error)]
pub enum LejError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("statement at line {line}, column {col}: {source}")]
    Runtime { line: usize, col: usize, source: EvalError },
}

impl LejError {
    /// The evaluation failure behind a runtime error, if that is what this is.
    pub fn eval_error(&self) -> Option<&EvalError> {
        match self {
            LejError::Runtime{source, ..} => Some(source),
            _ => None
        }
    }
}
