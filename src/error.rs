//! Crate error type.
//!
//! Parsing aborts on the first syntax problem and returns no partial tree.
//! A term that is simply absent from the index is *not* an error anywhere in
//! the crate — it flows through as an empty inverted list.

use std::fmt;

/// Everything that can go wrong while parsing, evaluating, or expanding a
/// query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed structured query: unbalanced parentheses, a term that
    /// normalizes to more than one stem, a malformed field suffix, an
    /// unknown operator keyword, or a weighted operator with mismatched
    /// weights.
    Syntax(String),
    /// An external document id from an initial-ranking file was never seen
    /// by the index. Fatal for that query.
    ExternalIdNotFound(String),
    /// A component was constructed in a configuration it cannot run in
    /// (e.g. relevance feedback with a non-language-model retrieval model).
    /// Checked before any query processing begins.
    IllegalState(&'static str),
    /// An operator received arguments of the wrong shape at evaluation time
    /// (e.g. `#SYN` over a score-producing child).
    Eval(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(msg) => write!(f, "query syntax error: {msg}"),
            Error::ExternalIdNotFound(id) => {
                write!(f, "external document id not found: {id}")
            }
            Error::IllegalState(msg) => write!(f, "illegal state: {msg}"),
            Error::Eval(msg) => write!(f, "evaluation error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
