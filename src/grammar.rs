use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::error::GrammarError;
use crate::parsetree::{Symbol, Tier};
use Symbol::*;


const SEQUENCEABLE: &[Symbol] = &[AsgnStmt, ReasgnStmt, LrNode];

const TYPED_IDS: &[Symbol] = &[BrouId, IntId, RatId];

const BROU_EVALUABLE: &[Symbol] = &[
    BrouLit, BrouId, NotSubexpr, OrSubexpr, AndSubexpr, EqSubexpr, GtSubexpr, LtSubexpr
];
const BROU_EXPRESSIONS: &[Symbol] = &[OrExpr, AndExpr, EqExpr, GtExpr, LtExpr];

const NUM_EVALUABLE: &[Symbol] = &[
    IntLit, IntId, RatId, AddSubexpr, SubSubexpr, NegSubexpr,
    MulSubexpr, DivSubexpr, ModSubexpr, PowSubexpr, DecSubexpr
];
const NUM_EXPRESSIONS: &[Symbol] = &[AddExpr, SubExpr, MulExpr, DivExpr, ModExpr, PowExpr];

// (keyword, typed identifier)
const TYPES: [(Symbol, Symbol); 3] = [(Brou, BrouId), (Int, IntId), (Rat, RatId)];

// (operator, parenthesized form, bare form)
const LOGIC_BINOPS: [(Symbol, Symbol, Symbol); 2] = [
    (Or, OrSubexpr, OrExpr),
    (And, AndSubexpr, AndExpr),
];
const NUMERIC_BINOPS: [(Symbol, Symbol, Symbol); 9] = [
    (Equals, EqSubexpr, EqExpr),
    (Greater, GtSubexpr, GtExpr),
    (Less, LtSubexpr, LtExpr),
    (Plus, AddSubexpr, AddExpr),
    (Minus, SubSubexpr, SubExpr),
    (Star, MulSubexpr, MulExpr),
    (Slash, DivSubexpr, DivExpr),
    (Percent, ModSubexpr, ModExpr),
    (Caret, PowSubexpr, PowExpr),
];


/// A set of symbols packed into one word, one bit per `Symbol` variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SymbolSet(u64);

impl SymbolSet {
    pub fn insert(&mut self, symbol: Symbol) {
        self.0 |= 1 << (symbol as u64);
    }

    pub fn contains_all(&self, other: SymbolSet) -> bool {
        other.0 & !self.0 == 0
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut set = SymbolSet::default();
        for symbol in iter {
            set.insert(symbol);
        }
        set
    }
}


#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Vec<Symbol>,
    pub parent: Symbol,
}


/// The rules of one priority tier, indexed by their exact symbol sequence.
#[derive(Debug)]
pub struct RuleTier {
    pub tier: Tier,
    rules: HashMap<Vec<Symbol>, Symbol>,
    requirements: Vec<(usize, SymbolSet)>,
}

impl RuleTier {
    fn new(tier: Tier) -> RuleTier {
        RuleTier{tier, rules: HashMap::new(), requirements: Vec::new()}
    }

    fn insert(&mut self, rule: Rule) {
        let needs = rule.pattern.iter().copied().collect();
        self.requirements.push((rule.pattern.len(), needs));
        self.rules.insert(rule.pattern, rule.parent);
    }

    pub fn get(&self, pattern: &[Symbol]) -> Option<Symbol> {
        self.rules.get(pattern).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // Longest first.
    pub fn reachable_lengths(&self, present: SymbolSet) -> Vec<usize> {
        let lengths: BTreeSet<usize> = self.requirements.iter()
            .filter(|(_, needs)| present.contains_all(*needs))
            .map(|(len, _)| *len)
            .collect();
        lengths.into_iter().rev().collect()
    }
}


#[derive(Default)]
struct Builder {
    rules: Vec<Rule>,
}

impl Builder {
    /// Adds one rule per element of the Cartesian product of `pools`.
    fn produce(&mut self, parent: Symbol, pools: &[&[Symbol]]) {
        let patterns = pools.iter().fold(vec![Vec::new()], |acc, pool| {
            acc.iter()
               .flat_map(|prefix| pool.iter().map(move |s| {
                   let mut pattern: Vec<Symbol> = prefix.clone();
                   pattern.push(*s);
                   pattern
               }))
               .collect::<Vec<_>>()
        });
        for pattern in patterns {
            self.rules.push(Rule{pattern, parent});
        }
    }
}


fn lej_rules() -> Vec<Rule> {
    let mut b = Builder::default();

    // Identifier typing, plus redeclaration of an identifier typed earlier.
    for (keyword, typed) in TYPES {
        b.produce(typed, &[&[keyword], &[Ident]]);
        b.produce(typed, &[&[keyword], TYPED_IDS]);
    }

    // Parenthesized and atomic subexpressions.
    b.produce(NotSubexpr, &[&[Not], BROU_EVALUABLE]);
    b.produce(NegSubexpr, &[&[Minus], NUM_EVALUABLE]);
    b.produce(DecSubexpr, &[&[IntLit], &[Dot], &[IntLit]]);
    for (op, subexpr, _) in LOGIC_BINOPS {
        b.produce(subexpr, &[&[LParen], BROU_EVALUABLE, &[op], BROU_EVALUABLE, &[RParen]]);
    }
    for (op, subexpr, _) in NUMERIC_BINOPS {
        b.produce(subexpr, &[&[LParen], NUM_EVALUABLE, &[op], NUM_EVALUABLE, &[RParen]]);
    }

    // Top level expressions.
    for (op, _, expr) in LOGIC_BINOPS {
        b.produce(expr, &[BROU_EVALUABLE, &[op], BROU_EVALUABLE]);
    }
    for (op, _, expr) in NUMERIC_BINOPS {
        b.produce(expr, &[NUM_EVALUABLE, &[op], NUM_EVALUABLE]);
    }
    // `a - b` arrives here as `a` followed by a negation.
    b.produce(AddExpr, &[NUM_EVALUABLE, &[NegSubexpr]]);

    // Statements.
    let brou_assignable = [BROU_EVALUABLE, BROU_EXPRESSIONS].concat();
    let num_assignable = [NUM_EVALUABLE, NUM_EXPRESSIONS].concat();
    let any_assignable = [&brou_assignable[..], &num_assignable[..]].concat();
    for (_, typed) in TYPES {
        let assignable: &[Symbol] = if typed == BrouId { &brou_assignable } else { &num_assignable };
        b.produce(AsgnStmt, &[&[Def], &[typed], &[As], assignable, &[Semicolon]]);
        b.produce(ReasgnStmt, &[&[Change], &[typed], &[To], assignable, &[Semicolon]]);
    }
    // Reassigning a name that was never declared; rejected when walked.
    b.produce(ReasgnStmt, &[&[Change], &[Ident], &[To], &any_assignable, &[Semicolon]]);

    // Sequencing.
    b.produce(LrNode, &[SEQUENCEABLE, SEQUENCEABLE]);

    b.rules
}


/// The Lej rule table, grouped into priority tiers in application order.
#[derive(Debug)]
pub struct Grammar {
    tiers: Vec<RuleTier>,
}

impl Grammar {

    pub fn new() -> Result<Grammar, GrammarError> {
        Grammar::from_rules(lej_rules())
    }

    /// Validates `rules` and sorts them into tiers by the suffix of their
    /// parent symbol.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Grammar, GrammarError> {
        let mut tiers: Vec<RuleTier> = Tier::ALL.iter().map(|t| RuleTier::new(*t)).collect();
        let mut seen: HashMap<Vec<Symbol>, Symbol> = HashMap::new();
        let mut produced = BTreeSet::new();
        let mut used = BTreeSet::new();

        for rule in rules {
            let children = rule.pattern.iter().filter(|s| s.is_grammatical()).count();
            if !(1..=2).contains(&children) {
                return Err(GrammarError::Arity{parent: rule.parent, children});
            }
            let tier = rule.parent.tier().ok_or(GrammarError::Untiered(rule.parent))?;

            match seen.get(&rule.pattern).copied() {
                Some(existing) if existing == rule.parent => continue,
                Some(existing) => return Err(GrammarError::Conflict{
                    pattern: rule.pattern.iter().map(|s| s.name()).collect::<Vec<_>>().join(" "),
                    existing,
                    parent: rule.parent
                }),
                None => { seen.insert(rule.pattern.clone(), rule.parent); }
            }

            produced.insert(rule.parent);
            used.extend(rule.pattern.iter().copied().filter(|s| s.is_grammatical() && !s.is_terminal()));

            tiers[tier as usize].insert(rule);
        }

        let dangling: Vec<Symbol> = used.difference(&produced).copied().collect();
        if !dangling.is_empty() {
            return Err(GrammarError::Dangling(dangling));
        }

        let grammar = Grammar{tiers};
        for tier in grammar.tiers() {
            debug!("{:?} tier holds {} rules", tier.tier, tier.len());
        }
        Ok(grammar)
    }

    pub fn tiers(&self) -> &[RuleTier] {
        &self.tiers
    }

    pub fn tier(&self, tier: Tier) -> Option<&RuleTier> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(RuleTier::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_fit_in_a_set() {
        assert!((LrNode as u64) < 64);
    }

    #[test]
    fn lej_grammar_is_well_formed() {
        let grammar = Grammar::new().unwrap();
        assert_eq!(grammar.tiers().len(), 5);
        assert!(grammar.tiers().iter().all(|t| !t.is_empty()));
        assert_eq!(grammar.tier(Tier::Identifier).unwrap().len(), 12);
    }

    #[test]
    fn rules_land_in_their_tiers() {
        let grammar = Grammar::new().unwrap();
        let ids = grammar.tier(Tier::Identifier).unwrap();
        assert_eq!(ids.get(&[Int, Ident]), Some(IntId));
        assert_eq!(ids.get(&[Rat, IntId]), Some(RatId));

        let subexprs = grammar.tier(Tier::Subexpression).unwrap();
        assert_eq!(subexprs.get(&[IntLit, Dot, IntLit]), Some(DecSubexpr));
        assert_eq!(subexprs.get(&[LParen, BrouId, And, BrouLit, RParen]), Some(AndSubexpr));
        assert_eq!(subexprs.get(&[BrouId, And, BrouLit]), None);

        let exprs = grammar.tier(Tier::Expression).unwrap();
        assert_eq!(exprs.get(&[IntId, NegSubexpr]), Some(AddExpr));
        assert_eq!(exprs.get(&[RatId, Greater, DecSubexpr]), Some(GtExpr));

        let stmts = grammar.tier(Tier::Statement).unwrap();
        assert_eq!(stmts.get(&[Def, RatId, As, IntLit, Semicolon]), Some(AsgnStmt));
        assert_eq!(stmts.get(&[Change, Ident, To, BrouLit, Semicolon]), Some(ReasgnStmt));
        assert_eq!(stmts.get(&[Def, BrouId, As, IntLit, Semicolon]), None);

        let seq = grammar.tier(Tier::Sequence).unwrap();
        assert_eq!(seq.get(&[LrNode, AsgnStmt]), Some(LrNode));
    }

    #[test]
    fn dangling_nonterminals_are_rejected() {
        let rules = vec![Rule{pattern: vec![Not, OrExpr], parent: NotSubexpr}];
        match Grammar::from_rules(rules) {
            Err(GrammarError::Dangling(symbols)) => assert_eq!(symbols, vec![OrExpr]),
            other => panic!("expected dangling symbols, got {:?}", other),
        }
    }

    #[test]
    fn conflicting_rules_are_rejected() {
        let rules = vec![
            Rule{pattern: vec![Minus, IntLit], parent: NegSubexpr},
            Rule{pattern: vec![Minus, IntLit], parent: NotSubexpr},
        ];
        assert!(matches!(Grammar::from_rules(rules), Err(GrammarError::Conflict{..})));
    }

    #[test]
    fn rules_need_one_or_two_children() {
        let rules = vec![Rule{pattern: vec![LParen, RParen], parent: AddSubexpr}];
        assert!(matches!(
            Grammar::from_rules(rules),
            Err(GrammarError::Arity{children: 0, ..})
        ));
    }

    #[test]
    fn reachable_lengths_prune_absent_symbols() {
        let grammar = Grammar::new().unwrap();
        let subexprs = grammar.tier(Tier::Subexpression).unwrap();

        let present: SymbolSet = [IntLit, Dot].into_iter().collect();
        assert_eq!(subexprs.reachable_lengths(present), vec![3]);

        let present: SymbolSet = [LParen, RParen, IntLit, Plus, Minus].into_iter().collect();
        assert_eq!(subexprs.reachable_lengths(present), vec![5, 2]);

        let present: SymbolSet = [Def, Semicolon].into_iter().collect();
        assert!(subexprs.reachable_lengths(present).is_empty());
    }
}
