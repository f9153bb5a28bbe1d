use std::fmt;


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Brou,
    Int,
    Rat,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Brou => write!(f, "Brouwerian"),
            ValueType::Int => write!(f, "Integer"),
            ValueType::Rat => write!(f, "Rational"),
        }
    }
}


/// Address of a binding: the lexical scope plus the identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    pub scope: String,
    pub name: String,
}

impl ScopeKey {
    pub fn new(scope: &str, name: &str) -> ScopeKey {
        ScopeKey{scope: scope.to_string(), name: name.to_string()}
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.name)
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Junction {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Greater,
    Less,
}


#[derive(Clone, Debug, PartialEq)]
pub enum NumericNode {
    Integer(String),
    Decimal { whole: String, fraction: String },
    IntLookup(ScopeKey),
    RatLookup(ScopeKey),
    Neg(Box<NumericNode>),
    Binop(Box<BinopNode>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinopNode {
    pub lhs: NumericNode,
    pub rhs: NumericNode,
    pub op: Arith,
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicLiteral {
    True,
    False,
    Unsure { ordinal: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogicNode {
    Literal(LogicLiteral),
    Lookup(ScopeKey),
    Not(Box<LogicNode>),
    Junction(Box<JunctionNode>),
    Compare(Box<CompareNode>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct JunctionNode {
    pub lhs: LogicNode,
    pub rhs: LogicNode,
    pub op: Junction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompareNode {
    pub lhs: NumericNode,
    pub rhs: NumericNode,
    pub op: Comparison,
}


#[derive(Clone, Debug, PartialEq)]
pub enum ExpressionNode {
    Logic(LogicNode),
    Numeric(NumericNode),
}


/// The binding a statement writes. `ty` is `None` when the identifier was
/// never declared before the statement.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetNode {
    pub key: ScopeKey,
    pub ty: Option<ValueType>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignNode {
    pub is_change: bool,
    pub target: TargetNode,
    pub rhs: ExpressionNode,
    pub line: usize,
    pub col: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    pub stmts: Vec<AssignNode>,
}
