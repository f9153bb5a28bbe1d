use std::collections::HashMap;

use log::{debug, trace};

use crate::error::SyntaxError;
use crate::grammar::{Grammar, RuleTier, SymbolSet};
use crate::parsetree::{render, Node, Symbol};


pub struct Parser<'a> {
    grammar: &'a Grammar,
}

// Pending pieces of one tier pass, popped in source order.
enum Work {
    Segment(usize, usize),
    Reduced(Node, Option<(String, Symbol)>),
}

impl<'a> Parser<'a> {

    pub fn new(grammar: &'a Grammar) -> Parser<'a> {
        Parser{grammar}
    }

    /// Rewrites the token sequence tier by tier until a single root remains.
    pub fn parse(&self, tokens: Vec<Node>) -> Result<Node, SyntaxError> {
        let mut tokens = tokens;
        for tier in self.grammar.tiers() {
            loop {
                let len_before = tokens.len();
                tokens = self.reduce(tokens, tier)?;
                if tokens.len() >= len_before {
                    break;
                }
            }
            debug!("{:?} -> {}", tier.tier, render(&tokens));
        }

        if tokens.len() > 1 {
            let line = tokens.iter()
                             .find(|t| !matches!(t.symbol, Symbol::AsgnStmt | Symbol::ReasgnStmt | Symbol::LrNode))
                             .or(tokens.first())
                             .map_or(0, |t| t.span.line);
            return Err(SyntaxError::Unreduced{remaining: render(&tokens), line});
        }
        tokens.pop().ok_or(SyntaxError::Empty)
    }

    /// One pass of a tier. The longest, then leftmost, matching window of a
    /// segment is replaced and the slices on either side become segments of
    /// their own, so the result reads `before + [node] + after`.
    fn reduce(&self, tokens: Vec<Node>, tier: &RuleTier) -> Result<Vec<Node>, SyntaxError> {
        let present: SymbolSet = tokens.iter().map(|t| t.symbol).collect();
        let lengths = tier.reachable_lengths(present);

        let end = tokens.len();
        let mut slots: Vec<Option<Node>> = tokens.into_iter().map(Some).collect();
        let mut declared: HashMap<String, Symbol> = HashMap::new();
        let mut ret = Vec::with_capacity(end);
        let mut work = vec![Work::Segment(0, end)];

        while let Some(item) = work.pop() {
            let (lo, hi) = match item {
                Work::Segment(lo, hi) => (lo, hi),
                Work::Reduced(node, declaration) => {
                    if let Some((name, typed)) = declaration {
                        debug!("typed {} as {}", name, typed);
                        declared.entry(name).or_insert(typed);
                    }
                    ret.push(node);
                    continue;
                }
            };

            let (start, len, parent) = match find_window(&mut slots[lo..hi], tier, &lengths, &declared) {
                Some(found) => found,
                None => {
                    ret.extend(slots[lo..hi].iter_mut().filter_map(Option::take));
                    continue;
                }
            };
            let (start, stop) = (lo + start, lo + start + len);
            let window: Vec<Node> = slots[start..stop].iter_mut().filter_map(Option::take).collect();
            trace!("{} <- {}", parent, render(&window));

            let declaration = match &window[..] {
                [_, id] if id.symbol == Symbol::Ident => id.literal().map(|name| (name.to_string(), parent)),
                _ => None
            };
            let node = Node::reduce(parent, window)?;

            work.push(Work::Segment(stop, hi));
            work.push(Work::Reduced(node, declaration));
            work.push(Work::Segment(lo, start));
        }
        Ok(ret)
    }
}


/// Finds the longest, then leftmost, window of `slots` that `tier` reduces.
/// Identifiers declared earlier in the pass are retyped as the search reaches
/// them; everything is retyped when nothing matches.
fn find_window(
    slots: &mut [Option<Node>],
    tier: &RuleTier,
    lengths: &[usize],
    declared: &HashMap<String, Symbol>,
) -> Option<(usize, usize, Symbol)> {
    let mut typed = 0;
    for &len in lengths {
        if len > slots.len() {
            continue;
        }
        for start in 0..=(slots.len() - len) {
            while typed < start + len {
                if let Some(token) = &mut slots[typed] {
                    retype_identifier(token, declared);
                }
                typed += 1;
            }
            let key: Vec<Symbol> = slots[start..start + len].iter().flatten().map(|t| t.symbol).collect();
            if let Some(parent) = tier.get(&key) {
                return Some((start, len, parent));
            }
        }
    }
    for token in slots[typed..].iter_mut().flatten() {
        retype_identifier(token, declared);
    }
    None
}

/// Wraps a bare identifier that an earlier declaration typed.
fn retype_identifier(token: &mut Node, declared: &HashMap<String, Symbol>) {
    if declared.is_empty() || token.symbol != Symbol::Ident {
        return;
    }
    if let Some(typed) = token.literal().and_then(|name| declared.get(name)).copied() {
        let bare = token.clone();
        *token = Node::wrap(typed, bare);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsetree::Body;
    use crate::tokeniser::tokenise;

    fn parse(src: &str) -> Result<Node, SyntaxError> {
        let grammar = Grammar::new().unwrap();
        Parser::new(&grammar).parse(tokenise(src).unwrap())
    }

    #[test]
    fn single_declaration() {
        let root = parse("def int a as 3;").unwrap();
        assert_eq!(root.symbol, Symbol::AsgnStmt);
        let target = root.left().unwrap();
        assert_eq!(target.symbol, Symbol::IntId);
        assert_eq!(target.left().and_then(Node::literal), Some("a"));
        assert_eq!(root.right().map(|n| n.symbol), Some(Symbol::IntLit));
        assert_eq!(root.span.start, 0);
        assert_eq!(root.span.end, 15);
    }

    #[test]
    fn later_identifiers_are_retyped() {
        let root = parse("def int total as 3; change total to total + 1;").unwrap();
        assert_eq!(root.symbol, Symbol::LrNode);

        let change = root.right().unwrap();
        assert_eq!(change.symbol, Symbol::ReasgnStmt);
        assert_eq!(change.left().map(|n| n.symbol), Some(Symbol::IntId));

        let sum = change.right().unwrap();
        assert_eq!(sum.symbol, Symbol::AddExpr);
        let operand = sum.left().unwrap();
        assert_eq!(operand.symbol, Symbol::IntId);
        assert!(matches!(&operand.body, Body::Unary(id) if id.literal() == Some("total")));
    }

    #[test]
    fn subtraction_is_addition_of_a_negation() {
        let root = parse("def int d as 5 - 3;").unwrap();
        let rhs = root.right().unwrap();
        assert_eq!(rhs.symbol, Symbol::AddExpr);
        assert_eq!(rhs.right().map(|n| n.symbol), Some(Symbol::NegSubexpr));
    }

    #[test]
    fn parenthesized_subtraction_stays_subtraction() {
        let root = parse("def int d as (5 - 3);").unwrap();
        assert_eq!(root.right().map(|n| n.symbol), Some(Symbol::SubSubexpr));
    }

    #[test]
    fn statements_keep_source_order() {
        let root = parse("def brou p as T; def brou q as F; def brou r as U;").unwrap();
        let mut order = Vec::new();
        collect_targets(&root, &mut order);
        assert_eq!(order, vec!["p", "q", "r"]);
    }

    fn collect_targets(node: &Node, out: &mut Vec<String>) {
        match node.symbol {
            Symbol::LrNode => {
                collect_targets(node.left().unwrap(), out);
                collect_targets(node.right().unwrap(), out);
            }
            _ => {
                let id = node.left().and_then(Node::left).and_then(Node::literal).unwrap();
                out.push(id.to_string());
            }
        }
    }

    #[test]
    fn nested_logic() {
        let root = parse("def brou p as not (T and not F) or U;").unwrap();
        let rhs = root.right().unwrap();
        assert_eq!(rhs.symbol, Symbol::OrExpr);
        let lhs = rhs.left().unwrap();
        assert_eq!(lhs.symbol, Symbol::NotSubexpr);
        assert_eq!(lhs.left().map(|n| n.symbol), Some(Symbol::AndSubexpr));
    }

    #[test]
    fn decimals_and_comparisons() {
        let root = parse("def rat r as 2.5; def brou b as (r > 1.25) and (r = 2.5);").unwrap();
        let second = root.right().unwrap();
        assert_eq!(second.right().map(|n| n.symbol), Some(Symbol::AndExpr));
        let gt = second.right().and_then(Node::left).unwrap();
        assert_eq!(gt.symbol, Symbol::GtSubexpr);
        assert_eq!(gt.right().map(|n| n.symbol), Some(Symbol::DecSubexpr));
    }

    #[test]
    fn unparenthesized_chains_do_not_parse() {
        let err = parse("def brou p as T or F and T;").unwrap_err();
        match err {
            SyntaxError::Unreduced{remaining, line} => {
                assert_eq!(remaining, "def <BROU-ID> as <OR-EXPR> and <BROU-SUBEXPR> ;");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn undeclared_operands_do_not_parse() {
        assert!(matches!(
            parse("def int a as b + 1;"),
            Err(SyntaxError::Unreduced{..})
        ));
    }

    #[test]
    fn empty_sequence_has_no_root() {
        assert!(matches!(parse("` nothing here `"), Err(SyntaxError::Empty)));
    }

    #[test]
    fn redeclaration_still_reduces() {
        let root = parse("def int x as 3; def rat x as 4;").unwrap();
        let second = root.right().unwrap();
        assert_eq!(second.symbol, Symbol::AsgnStmt);
        let target = second.left().unwrap();
        assert_eq!(target.symbol, Symbol::RatId);
        assert_eq!(target.left().map(|n| n.symbol), Some(Symbol::IntId));
    }

    #[test]
    fn retyping_only_reaches_later_identifiers() {
        let root = parse("change y to 1; def int y as 2; change y to y + 1;").unwrap();
        let mut stmts = Vec::new();
        collect_statements(&root, &mut stmts);
        assert_eq!(stmts.len(), 3);

        let early = stmts[0].left().unwrap();
        assert_eq!(early.symbol, Symbol::Ident);
        assert_eq!(early.literal(), Some("y"));

        assert_eq!(stmts[1].left().map(|n| n.symbol), Some(Symbol::IntId));
        assert_eq!(stmts[2].left().map(|n| n.symbol), Some(Symbol::IntId));
        assert_eq!(stmts[2].right().and_then(Node::left).map(|n| n.symbol), Some(Symbol::IntId));
    }

    fn collect_statements<'n>(node: &'n Node, out: &mut Vec<&'n Node>) {
        match node.symbol {
            Symbol::LrNode => {
                collect_statements(node.left().unwrap(), out);
                collect_statements(node.right().unwrap(), out);
            }
            _ => out.push(node),
        }
    }

    #[test]
    fn long_programs_parse_without_deep_recursion() {
        let src: String = (0..5000).map(|i| format!("def int v{} as {}; change v{} to v{} + 1;\n", i, i, i, i))
                                   .collect();
        let root = parse(&src).unwrap();
        let mut stmts = Vec::new();
        collect_statements(&root, &mut stmts);
        assert_eq!(stmts.len(), 10000);
        assert_eq!(stmts[9999].symbol, Symbol::ReasgnStmt);
        assert_eq!(stmts[9999].left().map(|n| n.symbol), Some(Symbol::IntId));
        assert_eq!(stmts[9999].span.line, 5000);
    }
}
