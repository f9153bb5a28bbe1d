use crate::error::SyntaxError;
use crate::parsetree::{self as PT, Body, Symbol};
use crate::syntaxtree as ST;


fn malformed(node: &PT::Node) -> SyntaxError {
    let children = match node.body {
        Body::Terminal{..} => 0,
        Body::Unary(_) => 1,
        Body::Binary(..) => 2,
    };
    SyntaxError::Malformed{symbol: node.symbol, children}
}

fn misplaced(node: &PT::Node, expected: &'static str) -> SyntaxError {
    SyntaxError::Misplaced{found: node.symbol, expected, line: node.span.line}
}

fn unary(node: PT::Node) -> Result<PT::Node, SyntaxError> {
    match node.body {
        Body::Unary(child) => Ok(*child),
        _ => Err(malformed(&node))
    }
}

fn binary(node: PT::Node) -> Result<(PT::Node, PT::Node), SyntaxError> {
    match node.body {
        Body::Binary(left, right) => Ok((*left, *right)),
        _ => Err(malformed(&node))
    }
}

fn literal(node: PT::Node) -> Result<String, SyntaxError> {
    match node.body {
        Body::Terminal{literal, ..} => Ok(literal),
        _ => Err(malformed(&node))
    }
}

/// Follows typed identifier wrappers down to the identifier itself.
fn scope_key(node: PT::Node) -> Result<ST::ScopeKey, SyntaxError> {
    let mut node = node;
    loop {
        match node.body {
            Body::Terminal{literal, ..} => return Ok(ST::ScopeKey{scope: node.scope, name: literal}),
            Body::Unary(child) => node = *child,
            Body::Binary(..) => return Err(malformed(&node))
        }
    }
}


impl ST::NumericNode {
    fn from(node: PT::Node) -> Result<ST::NumericNode, SyntaxError> {
        let op = match node.symbol {
            Symbol::IntLit => return Ok(ST::NumericNode::Integer(literal(node)?)),
            Symbol::IntId => return Ok(ST::NumericNode::IntLookup(scope_key(node)?)),
            Symbol::RatId => return Ok(ST::NumericNode::RatLookup(scope_key(node)?)),
            Symbol::NegSubexpr => {
                let operand = ST::NumericNode::from(unary(node)?)?;
                return Ok(ST::NumericNode::Neg(Box::new(operand)));
            }
            Symbol::DecSubexpr => {
                let (whole, fraction) = binary(node)?;
                return Ok(ST::NumericNode::Decimal{
                    whole: literal(whole)?,
                    fraction: literal(fraction)?
                });
            }
            Symbol::AddExpr | Symbol::AddSubexpr => ST::Arith::Add,
            Symbol::SubExpr | Symbol::SubSubexpr => ST::Arith::Sub,
            Symbol::MulExpr | Symbol::MulSubexpr => ST::Arith::Mul,
            Symbol::DivExpr | Symbol::DivSubexpr => ST::Arith::Div,
            Symbol::ModExpr | Symbol::ModSubexpr => ST::Arith::Mod,
            Symbol::PowExpr | Symbol::PowSubexpr => ST::Arith::Pow,
            _ => return Err(misplaced(&node, "a numeric expression"))
        };
        let (lhs, rhs) = binary(node)?;
        Ok(ST::NumericNode::Binop(Box::new(ST::BinopNode{
            lhs: ST::NumericNode::from(lhs)?,
            rhs: ST::NumericNode::from(rhs)?,
            op
        })))
    }
}


impl ST::LogicNode {
    fn from(node: PT::Node) -> Result<ST::LogicNode, SyntaxError> {
        match node.symbol {
            Symbol::BrouLit => {
                let ordinal = node.ordinal();
                let value = match (literal(node)?.as_str(), ordinal) {
                    ("T", _) => ST::LogicLiteral::True,
                    ("F", _) => ST::LogicLiteral::False,
                    ("U", Some(ordinal)) => ST::LogicLiteral::Unsure{ordinal},
                    _ => return Err(SyntaxError::Malformed{symbol: Symbol::BrouLit, children: 0})
                };
                Ok(ST::LogicNode::Literal(value))
            }
            Symbol::BrouId => Ok(ST::LogicNode::Lookup(scope_key(node)?)),
            Symbol::NotSubexpr => {
                let operand = ST::LogicNode::from(unary(node)?)?;
                Ok(ST::LogicNode::Not(Box::new(operand)))
            }
            Symbol::AndExpr | Symbol::AndSubexpr => ST::JunctionNode::from(node, ST::Junction::And),
            Symbol::OrExpr | Symbol::OrSubexpr => ST::JunctionNode::from(node, ST::Junction::Or),
            Symbol::EqExpr | Symbol::EqSubexpr => ST::CompareNode::from(node, ST::Comparison::Equal),
            Symbol::GtExpr | Symbol::GtSubexpr => ST::CompareNode::from(node, ST::Comparison::Greater),
            Symbol::LtExpr | Symbol::LtSubexpr => ST::CompareNode::from(node, ST::Comparison::Less),
            _ => Err(misplaced(&node, "a logic expression"))
        }
    }
}

impl ST::JunctionNode {
    fn from(node: PT::Node, op: ST::Junction) -> Result<ST::LogicNode, SyntaxError> {
        let (lhs, rhs) = binary(node)?;
        Ok(ST::LogicNode::Junction(Box::new(ST::JunctionNode{
            lhs: ST::LogicNode::from(lhs)?,
            rhs: ST::LogicNode::from(rhs)?,
            op
        })))
    }
}

impl ST::CompareNode {
    fn from(node: PT::Node, op: ST::Comparison) -> Result<ST::LogicNode, SyntaxError> {
        let (lhs, rhs) = binary(node)?;
        Ok(ST::LogicNode::Compare(Box::new(ST::CompareNode{
            lhs: ST::NumericNode::from(lhs)?,
            rhs: ST::NumericNode::from(rhs)?,
            op
        })))
    }
}


impl ST::TargetNode {
    fn from(node: PT::Node) -> Result<ST::TargetNode, SyntaxError> {
        let ty = match node.symbol {
            Symbol::BrouId => Some(ST::ValueType::Brou),
            Symbol::IntId => Some(ST::ValueType::Int),
            Symbol::RatId => Some(ST::ValueType::Rat),
            Symbol::Ident => None,
            _ => return Err(misplaced(&node, "an assignment target"))
        };
        Ok(ST::TargetNode{key: scope_key(node)?, ty})
    }
}


impl ST::AssignNode {
    fn from(node: PT::Node) -> Result<ST::AssignNode, SyntaxError> {
        let is_change = node.symbol == Symbol::ReasgnStmt;
        let (line, col) = (node.span.line, node.span.col);
        let (target, rhs) = binary(node)?;
        let target = ST::TargetNode::from(target)?;

        let wants_logic = match target.ty {
            Some(ty) => ty == ST::ValueType::Brou,
            None => rhs.symbol.is_logic()
        };
        let rhs = if wants_logic {
            ST::ExpressionNode::Logic(ST::LogicNode::from(rhs)?)
        } else {
            ST::ExpressionNode::Numeric(ST::NumericNode::from(rhs)?)
        };
        Ok(ST::AssignNode{is_change, target, rhs, line, col})
    }
}


/// Flattens the sequencing nodes into statements, left before right.
fn collect_statements(node: PT::Node, stmts: &mut Vec<ST::AssignNode>) -> Result<(), SyntaxError> {
    match node.symbol {
        Symbol::LrNode => {
            let (left, right) = binary(node)?;
            collect_statements(left, stmts)?;
            collect_statements(right, stmts)
        }
        Symbol::AsgnStmt | Symbol::ReasgnStmt => {
            stmts.push(ST::AssignNode::from(node)?);
            Ok(())
        }
        _ => Err(misplaced(&node, "a statement"))
    }
}

pub fn check_syntax(root: PT::Node) -> Result<ST::Module, SyntaxError> {
    let mut stmts = Vec::new();
    collect_statements(root, &mut stmts)?;
    Ok(ST::Module{stmts})
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::parser::Parser;
    use crate::tokeniser::tokenise;

    fn check(src: &str) -> Result<ST::Module, SyntaxError> {
        let grammar = Grammar::new().unwrap();
        let root = Parser::new(&grammar).parse(tokenise(src).unwrap())?;
        check_syntax(root)
    }

    #[test]
    fn declarations_and_changes() {
        let module = check("def int total as 3; change total to total + 1;").unwrap();
        assert_eq!(module.stmts.len(), 2);

        let first = &module.stmts[0];
        assert!(!first.is_change);
        assert_eq!(first.target.key, ST::ScopeKey::new("global", "total"));
        assert_eq!(first.target.ty, Some(ST::ValueType::Int));
        assert_eq!(first.rhs, ST::ExpressionNode::Numeric(ST::NumericNode::Integer("3".to_string())));

        let second = &module.stmts[1];
        assert!(second.is_change);
        assert_eq!(second.line, 1);
        assert_eq!(second.col, 21);
        match &second.rhs {
            ST::ExpressionNode::Numeric(ST::NumericNode::Binop(binop)) => {
                assert_eq!(binop.op, ST::Arith::Add);
                assert_eq!(binop.lhs, ST::NumericNode::IntLookup(ST::ScopeKey::new("global", "total")));
            }
            other => panic!("unexpected rhs {:?}", other),
        }
    }

    #[test]
    fn unsure_literals_keep_their_ordinals() {
        let module = check("def brou a as U; def brou b as U and T;").unwrap();
        assert_eq!(
            module.stmts[0].rhs,
            ST::ExpressionNode::Logic(ST::LogicNode::Literal(ST::LogicLiteral::Unsure{ordinal: 1}))
        );
        match &module.stmts[1].rhs {
            ST::ExpressionNode::Logic(ST::LogicNode::Junction(junction)) => {
                assert_eq!(junction.op, ST::Junction::And);
                assert_eq!(junction.lhs, ST::LogicNode::Literal(ST::LogicLiteral::Unsure{ordinal: 2}));
            }
            other => panic!("unexpected rhs {:?}", other),
        }
    }

    #[test]
    fn comparisons_hold_numeric_operands() {
        let module = check("def rat r as 1.5; def brou b as r < 2;").unwrap();
        match &module.stmts[1].rhs {
            ST::ExpressionNode::Logic(ST::LogicNode::Compare(compare)) => {
                assert_eq!(compare.op, ST::Comparison::Less);
                assert_eq!(compare.lhs, ST::NumericNode::RatLookup(ST::ScopeKey::new("global", "r")));
            }
            other => panic!("unexpected rhs {:?}", other),
        }
    }

    #[test]
    fn undeclared_change_target_is_untyped() {
        let module = check("change y to 1;").unwrap();
        assert_eq!(module.stmts[0].target.ty, None);
        assert!(matches!(module.stmts[0].rhs, ST::ExpressionNode::Numeric(_)));

        let module = check("change y to not T;").unwrap();
        assert!(matches!(module.stmts[0].rhs, ST::ExpressionNode::Logic(_)));
    }

    #[test]
    fn decimal_keeps_both_digit_runs() {
        let module = check("def rat r as 3.05;").unwrap();
        assert_eq!(
            module.stmts[0].rhs,
            ST::ExpressionNode::Numeric(ST::NumericNode::Decimal{
                whole: "3".to_string(),
                fraction: "05".to_string()
            })
        );
    }

    #[test]
    fn bare_expression_is_not_a_program() {
        assert!(matches!(
            check("1 + 2"),
            Err(SyntaxError::Misplaced{found: Symbol::AddExpr, ..})
        ));
    }
}
