//! The query operator tree.
//!
//! A query is a tree of tagged variants, each owning its children (a tree,
//! never a graph). Leaves are stemmed terms bound to a field; inner nodes
//! are the structured-query operators. The tree is built once per query
//! string, evaluated once (twice when relevance feedback re-evaluates an
//! expanded query), then discarded.
//!
//! `Display` emits the same `#OP( ... )` syntax the parser consumes, so a
//! printed tree re-parses to an equivalent one.

pub mod parser;

pub use parser::parse;

use crate::types::Field;
use std::fmt;

/// One node of the operator tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// A stemmed term restricted to one field.
    Term { stem: String, field: Field },
    /// Position-list union: children act as one virtual term.
    Syn(Vec<Op>),
    /// Intersection (Boolean) or uniform geometric mean (language model).
    And(Vec<Op>),
    /// Union; ranked models keep the maximum contributing score.
    Or(Vec<Op>),
    /// Per-document sum over the union of children.
    Sum(Vec<Op>),
    /// Weighted geometric mean. `weights.len() == children.len()` holds for
    /// every parsed tree.
    Wand { weights: Vec<f64>, children: Vec<Op> },
    /// Weighted arithmetic mean, same weight invariant as `Wand`.
    Wsum { weights: Vec<f64>, children: Vec<Op> },
    /// Ordered proximity: adjacent gaps in `[1, distance]`.
    Near { distance: usize, children: Vec<Op> },
    /// Unordered proximity: all positions within a window of `distance`.
    Window { distance: usize, children: Vec<Op> },
    /// Explicit postings→scores conversion. The parser never produces this
    /// node; score-combination operators apply it implicitly to any child
    /// that still yields postings.
    Score(Box<Op>),
}

impl Op {
    /// Does this node yield postings (an inverted list) rather than scores?
    ///
    /// Positional operators and terms act as virtual terms: their output
    /// keeps positions and can nest under `#SYN`, `#NEAR/n`, `#WINDOW/n`.
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            Op::Term { .. } | Op::Syn(_) | Op::Near { .. } | Op::Window { .. }
        )
    }

    /// Child nodes, in argument order.
    pub fn children(&self) -> &[Op] {
        match self {
            Op::Term { .. } => &[],
            Op::Syn(c) | Op::And(c) | Op::Or(c) | Op::Sum(c) => c,
            Op::Wand { children, .. }
            | Op::Wsum { children, .. }
            | Op::Near { children, .. }
            | Op::Window { children, .. } => children,
            Op::Score(c) => std::slice::from_ref(c),
        }
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, children: &[Op]) -> fmt::Result {
    for child in children {
        write!(f, "{child} ")?;
    }
    Ok(())
}

fn write_weighted(f: &mut fmt::Formatter<'_>, weights: &[f64], children: &[Op]) -> fmt::Result {
    for (w, child) in weights.iter().zip(children) {
        write!(f, "{w} {child} ")?;
    }
    Ok(())
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Term { stem, field } => write!(f, "{stem}.{field}"),
            Op::Syn(c) => {
                f.write_str("#SYN( ")?;
                write_children(f, c)?;
                f.write_str(")")
            }
            Op::And(c) => {
                f.write_str("#AND( ")?;
                write_children(f, c)?;
                f.write_str(")")
            }
            Op::Or(c) => {
                f.write_str("#OR( ")?;
                write_children(f, c)?;
                f.write_str(")")
            }
            Op::Sum(c) => {
                f.write_str("#SUM( ")?;
                write_children(f, c)?;
                f.write_str(")")
            }
            Op::Wand { weights, children } => {
                f.write_str("#WAND( ")?;
                write_weighted(f, weights, children)?;
                f.write_str(")")
            }
            Op::Wsum { weights, children } => {
                f.write_str("#WSUM( ")?;
                write_weighted(f, weights, children)?;
                f.write_str(")")
            }
            Op::Near { distance, children } => {
                write!(f, "#NEAR/{distance}( ")?;
                write_children(f, children)?;
                f.write_str(")")
            }
            Op::Window { distance, children } => {
                write!(f, "#WINDOW/{distance}( ")?;
                write_children(f, children)?;
                f.write_str(")")
            }
            Op::Score(c) => write!(f, "#SCORE( {c} )"),
        }
    }
}
