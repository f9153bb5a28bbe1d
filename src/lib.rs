pub mod brouwerian;
pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod numeric;
pub mod parser;
pub mod parsetree;
pub mod syntaxchecker;
pub mod syntaxtree;
pub mod tokeniser;

pub use brouwerian::{Brouwerian, Truth};
pub use error::{EvalError, LejError};
pub use interpreter::{interpret, Bindings, Interpreter};
pub use numeric::{Fraction, Number};
pub use syntaxtree::{ScopeKey, ValueType};
