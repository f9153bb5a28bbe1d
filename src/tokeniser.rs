use log::debug;
use regex::Regex;

use crate::error::LexError;
use crate::parsetree::{Body, Node, Span, Symbol, GLOBAL_SCOPE};


/// Position of the tokeniser in the source, lines and columns counted from 1.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    pos: usize,
    line: usize,
    col: usize,
}

impl Cursor {
    fn advance(&mut self, text: &str) {
        self.pos += text.len();
        match text.rfind('\n') {
            Some(last) => {
                self.line += text.matches('\n').count();
                self.col = text[last + 1..].chars().count() + 1;
            }
            None => self.col += text.chars().count()
        }
    }

    fn span(&self, len: usize) -> Span {
        Span{start: self.pos, end: self.pos + len, line: self.line, col: self.col}
    }
}


fn classify_word(word: &str, at: &Cursor) -> Result<Symbol, LexError> {
    if matches!(word, "T" | "U" | "F") {
        return Ok(Symbol::BrouLit);
    }
    if let Some(keyword) = Symbol::keyword(word) {
        return Ok(keyword);
    }
    if word.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Ok(Symbol::Ident);
    }
    Err(LexError::IllegalWord{
        word: word.to_string(), pos: at.pos, line: at.line, col: at.col
    })
}


/// Numbers every `U` literal in order of appearance, starting at 1.
fn number_unsure_literals(tokens: &mut [Node]) {
    let mut next = 1;
    for token in tokens.iter_mut().filter(|t| t.symbol == Symbol::BrouLit) {
        if let Body::Terminal{literal, ordinal} = &mut token.body {
            if literal == "U" {
                *ordinal = Some(next);
                next += 1;
            }
        }
    }
}


pub fn tokenise(data: &str) -> Result<Vec<Node>, LexError> {

    let name_regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*")?;
    let number_regex = Regex::new(r"^[0-9]+")?;
    let ignore_regex = Regex::new(r"^[ \t\r\n]+")?;
    let comment_regex = Regex::new(r"^`[^`]*`")?;

    let mut ret = Vec::new();
    let mut cursor = Cursor{pos: 0, line: 1, col: 1};
    while cursor.pos < data.len() {
        let rest = &data[cursor.pos..];

        if let Some(m) = ignore_regex.find(rest) {
            cursor.advance(m.as_str());
            continue;
        }

        if rest.starts_with('`') {
            match comment_regex.find(rest) {
                Some(m) => {
                    cursor.advance(m.as_str());
                    continue;
                }
                None => return Err(LexError::UnterminatedComment{
                    pos: cursor.pos, line: cursor.line, col: cursor.col
                })
            }
        }

        if let Some(m) = number_regex.find(rest) {
            let literal = m.as_str();
            ret.push(Node::terminal(Symbol::IntLit, literal, cursor.span(literal.len()), GLOBAL_SCOPE));
            cursor.advance(literal);
            continue;
        }

        if let Some(m) = name_regex.find(rest) {
            let literal = m.as_str();
            let symbol = classify_word(literal, &cursor)?;
            ret.push(Node::terminal(symbol, literal, cursor.span(literal.len()), GLOBAL_SCOPE));
            cursor.advance(literal);
            continue;
        }

        let ch = match rest.chars().next() {
            Some(ch) => ch,
            None => break
        };
        match Symbol::punctuation(ch) {
            Some(symbol) => {
                let literal = &rest[..ch.len_utf8()];
                ret.push(Node::terminal(symbol, literal, cursor.span(literal.len()), GLOBAL_SCOPE));
                cursor.advance(literal);
            }
            None => return Err(LexError::IllegalCharacter{
                ch, pos: cursor.pos, line: cursor.line, col: cursor.col
            })
        }
    }

    number_unsure_literals(&mut ret);
    debug!("tokenised {} terminals over {} lines", ret.len(), cursor.line);
    Ok(ret)
}
