use std::fmt;

use crate::error::SyntaxError;


pub const GLOBAL_SCOPE: &str = "global";


/// Every grammar category a token or tree node can carry.
///
/// Raw keyword and punctuation terminals name themselves (`def`, `;`).
/// Bracketed categories (`<INT-ID>`, `<ADD-EXPR>`) are the ones the grammar
/// keeps as children when a window of tokens is reduced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    // Keywords
    Def, As, Change, To,
    Brou, Int, Rat,
    And, Or, Not,

    // Single character symbols
    Plus, Minus, Star, Slash, Percent, Caret, Dot,
    Equals, Greater, Less,
    LBracket, RBracket, LParen, RParen, Comma, Semicolon, Colon,

    // Bracketed terminals
    Ident,
    BrouLit,
    IntLit,

    // Typed identifiers
    BrouId, IntId, RatId,

    // Logic
    NotSubexpr,
    OrExpr, OrSubexpr,
    AndExpr, AndSubexpr,
    EqExpr, EqSubexpr,
    GtExpr, GtSubexpr,
    LtExpr, LtSubexpr,

    // Arithmetic
    AddExpr, AddSubexpr,
    SubExpr, SubSubexpr,
    NegSubexpr,
    MulExpr, MulSubexpr,
    DivExpr, DivSubexpr,
    ModExpr, ModSubexpr,
    PowExpr, PowSubexpr,
    DecSubexpr,

    // Statements
    AsgnStmt, ReasgnStmt,
    LrNode,
}


/// The five rule priorities, in the order the parser applies them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Identifier,
    Subexpression,
    Expression,
    Statement,
    Sequence,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Identifier,
        Tier::Subexpression,
        Tier::Expression,
        Tier::Statement,
        Tier::Sequence,
    ];
}


impl Symbol {

    pub fn name(self) -> &'static str {
        use Symbol::*;
        match self {
            Def => "def", As => "as", Change => "change", To => "to",
            Brou => "brou", Int => "int", Rat => "rat",
            And => "and", Or => "or", Not => "not",
            Plus => "+", Minus => "-", Star => "*", Slash => "/",
            Percent => "%", Caret => "^", Dot => ".",
            Equals => "=", Greater => ">", Less => "<",
            LBracket => "[", RBracket => "]", LParen => "(", RParen => ")",
            Comma => ",", Semicolon => ";", Colon => ":",
            Ident => "<ID>",
            BrouLit => "<BROU-SUBEXPR>",
            IntLit => "<INT-SUBEXPR>",
            BrouId => "<BROU-ID>", IntId => "<INT-ID>", RatId => "<RAT-ID>",
            NotSubexpr => "<NOT-SUBEXPR>",
            OrExpr => "<OR-EXPR>", OrSubexpr => "<OR-SUBEXPR>",
            AndExpr => "<AND-EXPR>", AndSubexpr => "<AND-SUBEXPR>",
            EqExpr => "<EQ-EXPR>", EqSubexpr => "<EQ-SUBEXPR>",
            GtExpr => "<GT-EXPR>", GtSubexpr => "<GT-SUBEXPR>",
            LtExpr => "<LT-EXPR>", LtSubexpr => "<LT-SUBEXPR>",
            AddExpr => "<ADD-EXPR>", AddSubexpr => "<ADD-SUBEXPR>",
            SubExpr => "<SUB-EXPR>", SubSubexpr => "<SUB-SUBEXPR>",
            NegSubexpr => "<NEG-SUBEXPR>",
            MulExpr => "<MUL-EXPR>", MulSubexpr => "<MUL-SUBEXPR>",
            DivExpr => "<DIV-EXPR>", DivSubexpr => "<DIV-SUBEXPR>",
            ModExpr => "<MOD-EXPR>", ModSubexpr => "<MOD-SUBEXPR>",
            PowExpr => "<POW-EXPR>", PowSubexpr => "<POW-SUBEXPR>",
            DecSubexpr => "<DEC-SUBEXPR>",
            AsgnStmt => "<ASGN-STMT>", ReasgnStmt => "<REASGN-STMT>",
            LrNode => "<LR-NODE>",
        }
    }

    pub fn keyword(word: &str) -> Option<Symbol> {
        use Symbol::*;
        Some(match word {
            "def" => Def, "as" => As, "change" => Change, "to" => To,
            "brou" => Brou, "int" => Int, "rat" => Rat,
            "and" => And, "or" => Or, "not" => Not,
            _ => return None
        })
    }

    pub fn punctuation(c: char) -> Option<Symbol> {
        use Symbol::*;
        Some(match c {
            '+' => Plus, '-' => Minus, '*' => Star, '/' => Slash,
            '%' => Percent, '^' => Caret, '.' => Dot,
            '=' => Equals, '>' => Greater, '<' => Less,
            '[' => LBracket, ']' => RBracket, '(' => LParen, ')' => RParen,
            ',' => Comma, ';' => Semicolon, ':' => Colon,
            _ => return None
        })
    }

    pub fn is_grammatical(self) -> bool {
        self >= Symbol::Ident
    }

    pub fn is_terminal(self) -> bool {
        self <= Symbol::IntLit
    }

    // Decided by the suffix of the name.
    pub fn tier(self) -> Option<Tier> {
        if self.is_terminal() {
            return None;
        }
        let name = self.name().trim_start_matches('<').trim_end_matches('>');
        match name.rsplit('-').next() {
            Some("ID") => Some(Tier::Identifier),
            Some("SUBEXPR") => Some(Tier::Subexpression),
            Some("EXPR") => Some(Tier::Expression),
            Some("STMT") => Some(Tier::Statement),
            Some("NODE") => Some(Tier::Sequence),
            _ => None
        }
    }

    pub fn is_logic(self) -> bool {
        use Symbol::*;
        matches!(self,
            BrouLit | BrouId | NotSubexpr
            | OrExpr | OrSubexpr | AndExpr | AndSubexpr
            | EqExpr | EqSubexpr | GtExpr | GtSubexpr | LtExpr | LtSubexpr)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}


#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// `ordinal` is only set on `U` literals, counting from 1 in source order.
    Terminal { literal: String, ordinal: Option<usize> },
    Unary(Box<Node>),
    Binary(Box<Node>, Box<Node>),
}


#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub symbol: Symbol,
    pub span: Span,
    pub scope: String,
    pub body: Body,
}


impl Node {

    pub fn terminal(symbol: Symbol, literal: &str, span: Span, scope: &str) -> Node {
        Node {
            symbol,
            span,
            scope: scope.to_string(),
            body: Body::Terminal{literal: literal.to_string(), ordinal: None}
        }
    }

    /// Wraps a node in a one-child parent covering the same source range.
    pub fn wrap(symbol: Symbol, child: Node) -> Node {
        Node {
            symbol,
            span: child.span,
            scope: child.scope.clone(),
            body: Body::Unary(Box::new(child))
        }
    }

    /// Builds the parent of a matched window. Keyword and punctuation tokens
    /// are consumed; only bracketed symbols survive as children.
    pub fn reduce(symbol: Symbol, window: Vec<Node>) -> Result<Node, SyntaxError> {
        let (first, last) = match (window.first(), window.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SyntaxError::Malformed{symbol, children: 0})
        };
        let span = Span {
            start: first.span.start,
            end: last.span.end,
            line: first.span.line,
            col: first.span.col
        };
        let scope = first.scope.clone();

        let count = window.iter().filter(|n| n.symbol.is_grammatical()).count();
        let mut children = window.into_iter().filter(|n| n.symbol.is_grammatical());
        let body = match (children.next(), children.next(), count) {
            (Some(left), None, 1) => Body::Unary(Box::new(left)),
            (Some(left), Some(right), 2) => Body::Binary(Box::new(left), Box::new(right)),
            _ => return Err(SyntaxError::Malformed{symbol, children: count})
        };
        Ok(Node{symbol, span, scope, body})
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.body, Body::Terminal{..})
    }

    pub fn literal(&self) -> Option<&str> {
        match &self.body {
            Body::Terminal{literal, ..} => Some(literal),
            _ => None
        }
    }

    pub fn ordinal(&self) -> Option<usize> {
        match &self.body {
            Body::Terminal{ordinal, ..} => *ordinal,
            _ => None
        }
    }

    pub fn left(&self) -> Option<&Node> {
        match &self.body {
            Body::Terminal{..} => None,
            Body::Unary(left) | Body::Binary(left, _) => Some(left)
        }
    }

    pub fn right(&self) -> Option<&Node> {
        match &self.body {
            Body::Binary(_, right) => Some(right),
            _ => None
        }
    }

    /// Number of nodes in this tree, the node itself included.
    pub fn count(&self) -> usize {
        1 + self.left().map_or(0, Node::count) + self.right().map_or(0, Node::count)
    }

    /// An indented, one node per line rendering of the tree.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.symbol.name());
        if let Some(literal) = self.literal() {
            out.push_str(&format!(" {:?}", literal));
        }
        if let Some(ordinal) = self.ordinal() {
            out.push_str(&format!(" #{}", ordinal));
        }
        out.push_str(&format!(" @{}:{}\n", self.span.line, self.span.col));
        if let Some(left) = self.left() { left.write_tree(out, depth + 1) }
        if let Some(right) = self.right() { right.write_tree(out, depth + 1) }
    }
}


/// Renders a token sequence by symbol name, e.g. `def <INT-ID> as <INT-SUBEXPR> ;`.
pub fn render(nodes: &[Node]) -> String {
    nodes.iter()
         .map(|n| n.symbol.name())
         .collect::<Vec<_>>()
         .join(" ")
}
