use std::collections::HashMap;
use std::fmt;

use log::{debug, info};
use num_bigint::BigInt;

use crate::brouwerian::{self, Brouwerian};
use crate::error::{EvalError, LejError};
use crate::grammar::Grammar;
use crate::numeric::{self, format_fraction, Fraction};
use crate::parser::Parser;
use crate::parsetree::{Node, GLOBAL_SCOPE};
use crate::syntaxchecker::check_syntax;
use crate::syntaxtree::{AssignNode, ExpressionNode, Module, ScopeKey, ValueType};
use crate::tokeniser::tokenise;


/// The three typed symbol tables of one session. A key lives in at most one
/// of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    pub brouwerians: HashMap<ScopeKey, Brouwerian>,
    pub integers: HashMap<ScopeKey, BigInt>,
    pub rationals: HashMap<ScopeKey, Fraction>,
}

impl Bindings {

    pub fn contains(&self, key: &ScopeKey) -> bool {
        self.brouwerians.contains_key(key)
            || self.integers.contains_key(key)
            || self.rationals.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.brouwerians.len() + self.integers.len() + self.rationals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn brou(&self, name: &str) -> Option<&Brouwerian> {
        self.brouwerians.get(&ScopeKey::new(GLOBAL_SCOPE, name))
    }

    pub fn int(&self, name: &str) -> Option<&BigInt> {
        self.integers.get(&ScopeKey::new(GLOBAL_SCOPE, name))
    }

    pub fn rat(&self, name: &str) -> Option<&Fraction> {
        self.rationals.get(&ScopeKey::new(GLOBAL_SCOPE, name))
    }

    pub(crate) fn read_brou(&self, key: &ScopeKey) -> Result<&Brouwerian, EvalError> {
        self.brouwerians.get(key).ok_or_else(|| not_assigned(key))
    }

    pub(crate) fn read_int(&self, key: &ScopeKey) -> Result<&BigInt, EvalError> {
        self.integers.get(key).ok_or_else(|| not_assigned(key))
    }

    pub(crate) fn read_rat(&self, key: &ScopeKey) -> Result<&Fraction, EvalError> {
        self.rationals.get(key).ok_or_else(|| not_assigned(key))
    }

    /// Every binding as `(key, type, rendered value)`, sorted by key.
    pub fn entries(&self) -> Vec<(&ScopeKey, ValueType, String)> {
        let mut ret: Vec<_> = self.brouwerians.iter().map(|(k, v)| (k, ValueType::Brou, v.to_string()))
            .chain(self.integers.iter().map(|(k, v)| (k, ValueType::Int, v.to_string())))
            .chain(self.rationals.iter().map(|(k, v)| (k, ValueType::Rat, format_fraction(v))))
            .collect();
        ret.sort_by(|a, b| a.0.cmp(b.0));
        ret
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, ty, value) in self.entries() {
            writeln!(f, "{} ({}) = {}", key, ty, value)?;
        }
        Ok(())
    }
}

fn not_assigned(key: &ScopeKey) -> EvalError {
    EvalError::NotAssigned{name: key.to_string()}
}


/// One interpreter session. Bindings persist across `run` calls, so a failed
/// run leaves whatever was assigned before the failing statement.
///
/// Each `U` literal gets a truth table of `2^ordinal` entries, so a single
/// program may hold at most 24 of them (`MAX_UNSURE_ORDINAL`); evaluating the
/// 25th fails with `EvalError::TruthTableTooLarge`.
pub struct Interpreter {
    grammar: Grammar,
    bindings: Bindings,
}

impl Interpreter {

    pub fn new() -> Result<Interpreter, LejError> {
        Ok(Interpreter{grammar: Grammar::new()?, bindings: Bindings::default()})
    }

    /// Tokenises and parses `source`. A source with no tokens has no tree.
    pub fn parse(&self, source: &str) -> Result<Option<Node>, LejError> {
        self.parse_tokens(tokenise(source)?)
    }

    pub fn parse_tokens(&self, tokens: Vec<Node>) -> Result<Option<Node>, LejError> {
        if tokens.is_empty() {
            return Ok(None);
        }
        let root = Parser::new(&self.grammar).parse(tokens)?;
        debug!("parsed {} nodes", root.count());
        Ok(Some(root))
    }

    pub fn run(&mut self, source: &str) -> Result<(), LejError> {
        match self.parse(source)? {
            Some(root) => self.run_tree(root),
            None => Ok(())
        }
    }

    /// Lowers an already parsed program and walks it.
    pub fn run_tree(&mut self, root: Node) -> Result<(), LejError> {
        let module = check_syntax(root)?;
        self.execute(&module)
    }

    /// Walks the statements in order, stopping at the first failure.
    pub fn execute(&mut self, module: &Module) -> Result<(), LejError> {
        for stmt in &module.stmts {
            self.assign(stmt).map_err(|source| LejError::Runtime{
                line: stmt.line,
                col: stmt.col,
                source
            })?;
        }
        Ok(())
    }

    fn assign(&mut self, stmt: &AssignNode) -> Result<(), EvalError> {
        let key = &stmt.target.key;
        let ty = if stmt.is_change {
            match stmt.target.ty {
                Some(ty) if self.holds(key, ty) => ty,
                _ => return Err(not_assigned(key))
            }
        } else {
            match stmt.target.ty {
                Some(_) if self.bindings.contains(key) => {
                    return Err(EvalError::AlreadyAssigned{name: key.to_string()});
                }
                Some(ty) => ty,
                None => return Err(not_assigned(key))
            }
        };

        let rendered = match (ty, &stmt.rhs) {
            (ValueType::Brou, ExpressionNode::Logic(expr)) => {
                let value = brouwerian::evaluate(expr, &self.bindings)?;
                let rendered = value.to_string();
                self.bindings.brouwerians.insert(key.clone(), value);
                rendered
            }
            (ValueType::Int, ExpressionNode::Numeric(expr)) => {
                let value = numeric::evaluate(expr, &self.bindings)?.into_integer()?;
                let rendered = value.to_string();
                self.bindings.integers.insert(key.clone(), value);
                rendered
            }
            (ValueType::Rat, ExpressionNode::Numeric(expr)) => {
                let value = numeric::evaluate(expr, &self.bindings)?.into_fraction();
                let rendered = format_fraction(&value);
                self.bindings.rationals.insert(key.clone(), value);
                rendered
            }
            (ty, _) => return Err(EvalError::UnsupportedNode(format!("{} assignment of this expression", ty)))
        };
        info!("ASSIGNED {} to {}", rendered, key);
        Ok(())
    }

    fn holds(&self, key: &ScopeKey, ty: ValueType) -> bool {
        match ty {
            ValueType::Brou => self.bindings.brouwerians.contains_key(key),
            ValueType::Int => self.bindings.integers.contains_key(key),
            ValueType::Rat => self.bindings.rationals.contains_key(key),
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }
}


/// Runs a whole program in a fresh session. The limit on unsure literals
/// described on `Interpreter` applies.
pub fn interpret(source: &str) -> Result<Bindings, LejError> {
    let mut interpreter = Interpreter::new()?;
    interpreter.run(source)?;
    Ok(interpreter.into_bindings())
}
