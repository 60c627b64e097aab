//! The structured-query parser.
//!
//! An explicit stack of in-progress operator frames replaces shared mutable
//! parse state: each token either pushes a frame, feeds the top frame, or
//! pops a completed subtree into its parent. The raw query is first wrapped
//! in the retrieval model's default operator, so a well-formed query always
//! finishes exactly when the wrapper's closing parenthesis pops the last
//! frame.
//!
//! Query terms go through the tokenizer collaborator: a term that
//! normalizes to nothing (a stop word) is dropped without error — along
//! with its pending weight inside `#WAND`/`#WSUM` — while a term that
//! normalizes to more than one stem makes the query malformed.

use super::Op;
use crate::error::{Error, Result};
use crate::index::QueryTokenizer;
use crate::model::RetrievalModel;
use crate::types::Field;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug)]
enum Token {
    Open,
    Close,
    Word(String),
}

/// Split a query into words and standalone parentheses. Whitespace and
/// commas separate; everything else accumulates into words.
fn lex(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in query.chars() {
        match c {
            '(' | ')' => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
                tokens.push(if c == '(' { Token::Open } else { Token::Close });
            }
            c if c.is_whitespace() || c == ',' => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
            }
            c => word.push(c),
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

/// The operator variants the parser can open.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    And,
    Or,
    Syn,
    Sum,
    Wand,
    Wsum,
    Near(usize),
    Window(usize),
}

impl Kind {
    fn weighted(self) -> bool {
        matches!(self, Kind::Wand | Kind::Wsum)
    }
}

/// An operator whose closing parenthesis has not been seen yet.
#[derive(Debug)]
struct Frame {
    kind: Kind,
    weights: Vec<f64>,
    children: Vec<Op>,
}

impl Frame {
    fn new(kind: Kind) -> Self {
        Frame {
            kind,
            weights: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A weighted operator consumes `(weight, operand)` pairs; it wants a
    /// weight exactly when it has as many weights as operands.
    fn needs_weight(&self) -> bool {
        self.kind.weighted() && self.weights.len() == self.children.len()
    }

    fn finish(self) -> Result<Op> {
        if self.kind.weighted() && self.weights.len() != self.children.len() {
            return Err(Error::Syntax(format!(
                "weighted operator has {} weights for {} operands",
                self.weights.len(),
                self.children.len()
            )));
        }
        Ok(match self.kind {
            Kind::And => Op::And(self.children),
            Kind::Or => Op::Or(self.children),
            Kind::Syn => Op::Syn(self.children),
            Kind::Sum => Op::Sum(self.children),
            Kind::Wand => Op::Wand {
                weights: self.weights,
                children: self.children,
            },
            Kind::Wsum => Op::Wsum {
                weights: self.weights,
                children: self.children,
            },
            Kind::Near(distance) => Op::Near {
                distance,
                children: self.children,
            },
            Kind::Window(distance) => Op::Window {
                distance,
                children: self.children,
            },
        })
    }
}

fn operator_kind(word: &str) -> Result<Kind> {
    let lower = word.to_ascii_lowercase();
    match lower.as_str() {
        "#and" => return Ok(Kind::And),
        "#or" => return Ok(Kind::Or),
        "#syn" => return Ok(Kind::Syn),
        "#sum" => return Ok(Kind::Sum),
        "#wand" => return Ok(Kind::Wand),
        "#wsum" => return Ok(Kind::Wsum),
        _ => {}
    }
    for (prefix, make) in [
        ("#near/", Kind::Near as fn(usize) -> Kind),
        ("#window/", Kind::Window as fn(usize) -> Kind),
    ] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            let distance: usize = rest
                .parse()
                .map_err(|_| Error::Syntax(format!("bad operator distance: {word}")))?;
            return Ok(make(distance));
        }
    }
    Err(Error::Syntax(format!("unknown operator: {word}")))
}

/// Split `term.field`; an unrecognized suffix means the whole token is the
/// term and the field defaults to body. More than one dot is malformed.
fn term_and_field(token: &str) -> Result<(String, Field)> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.len() {
        1 => Ok((token.to_string(), Field::default())),
        2 => match Field::from_str(parts[1]) {
            Ok(field) => Ok((parts[0].to_string(), field)),
            Err(()) => Ok((token.to_string(), Field::default())),
        },
        _ => Err(Error::Syntax(format!("invalid query term: {token}"))),
    }
}

/// Parse a raw query string into an operator tree.
///
/// The query is wrapped in the model's default operator first, so plain
/// bags of words parse as `#OR(...)`, `#AND(...)`, or `#SUM(...)` depending
/// on the model. Fails with [`Error::Syntax`] on any malformation; no
/// partial tree is ever returned.
pub fn parse(
    query: &str,
    model: &RetrievalModel,
    tokenizer: &dyn QueryTokenizer,
) -> Result<Op> {
    let wrapped = format!("{}({})", model.default_operator(), query.trim());
    let tokens = lex(&wrapped);

    let mut stack: Vec<Frame> = Vec::new();
    let mut finished: Option<Op> = None;

    for token in tokens {
        if finished.is_some() {
            // The top-level operator already closed; anything further means
            // unbalanced parentheses.
            return Err(Error::Syntax(format!("trailing tokens in query: {query}")));
        }
        match token {
            Token::Open => {}
            Token::Close => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| Error::Syntax(format!("unbalanced parentheses: {query}")))?;
                if !stack.is_empty() && frame.children.is_empty() {
                    return Err(Error::Syntax("operator with no arguments".to_string()));
                }
                let op = frame.finish()?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(op),
                    None => finished = Some(op),
                }
            }
            Token::Word(word) if word.starts_with('#') => {
                stack.push(Frame::new(operator_kind(&word)?));
            }
            Token::Word(word) => {
                let Some(frame) = stack.last_mut() else {
                    return Err(Error::Syntax(format!("term outside any operator: {word}")));
                };
                if frame.needs_weight() {
                    if let Ok(weight) = word.parse::<f64>() {
                        frame.weights.push(weight);
                        continue;
                    }
                }
                let (term, field) = term_and_field(&word)?;
                let stems = tokenizer.normalize(&term);
                match stems.len() {
                    0 => {
                        // Stop word: drop it, and drop the weight that was
                        // waiting for it.
                        if frame.kind.weighted() && frame.weights.len() > frame.children.len() {
                            frame.weights.pop();
                        }
                    }
                    1 => frame.children.push(Op::Term {
                        stem: stems.into_iter().next().unwrap_or_default(),
                        field,
                    }),
                    _ => {
                        return Err(Error::Syntax(format!(
                            "term normalizes to multiple stems: {term}"
                        )))
                    }
                }
            }
        }
    }

    match finished {
        Some(op) => {
            debug!(tree = %op, "parsed query");
            Ok(op)
        }
        None => Err(Error::Syntax(format!("unbalanced parentheses: {query}"))),
    }
}
