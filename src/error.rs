use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Kind of stored item an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A fact in the database
    Fact,
    /// A rule in the database
    Rule,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fact => f.write_str("fact"),
            Self::Rule => f.write_str("rule"),
        }
    }
}

/// Errors produced by the database, the loader and the writer.
///
/// Reasoning itself never fails: every search branch ends in a derivation,
/// a rejected candidate or an exhausted search space.
#[derive(Debug, Error)]
pub enum Error {
    /// A program line violates the grammar
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number, 0 when the input did not come from a file
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A fact containing variables was offered to the database
    #[error("fact `{fact}` is not ground")]
    NonGroundFact {
        /// Rendered atom
        fact: String,
    },

    /// A rule without body atoms was offered to the database
    #[error("rule with head `{head}` has an empty body")]
    EmptyRuleBody {
        /// Rendered head atom
        head: String,
    },

    /// An index does not reference an existing fact or rule
    #[error("{kind} #{index} not found")]
    NotFound {
        /// Which sequence was addressed
        kind: ItemKind,
        /// The offending index
        index: usize,
    },

    /// Reading or writing a program file failed
    #[error("operation on `{}` failed: {source}", .path.display())]
    OpFailed {
        /// File being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
