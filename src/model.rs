use std::fmt;

use smallvec::SmallVec;

/// Characters allowed in predicate names and term tokens
#[must_use]
pub fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_token(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_token_char)
}

/// Inline storage for the terms of an atom; most predicates have a small arity.
pub type Terms = SmallVec<[Term; 4]>;

/// A predicate argument
///
/// Tokens of exactly one character are variables (`X`, `y`); any longer token
/// is a constant (`tom`, `42`). Single-character constants cannot be
/// expressed.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    /// A concrete individual (e.g., `"alice"`)
    Constant(String),
    /// A binding placeholder (e.g., `"X"`)
    Variable(String),
}

impl Term {
    /// Classifies a token by its length in characters.
    #[must_use]
    pub fn classify(token: &str) -> Self {
        if token.chars().count() == 1 {
            Self::Variable(token.to_string())
        } else {
            Self::Constant(token.to_string())
        }
    }

    /// The token text, regardless of kind
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Constant(token) | Self::Variable(token) => token,
        }
    }

    /// Returns true for constants
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// True when the token can be written and read back as the same term:
    /// a non-empty run of token characters whose length agrees with its kind
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        is_token(self.token()) && Self::classify(self.token()) == *self
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A predicate applied to terms (e.g., `parent(tom,X)`)
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atom {
    /// The name of the predicate (e.g., `"parent"`)
    pub predicate: String,
    /// The arguments, in order
    pub terms: Terms,
}

impl Atom {
    /// Create an atom from already classified terms
    pub fn new(predicate: impl Into<String>, terms: impl IntoIterator<Item = Term>) -> Self {
        Self {
            predicate: predicate.into(),
            terms: terms.into_iter().collect(),
        }
    }

    /// Create an atom classifying each token with [`Term::classify`]
    pub fn from_tokens<I, S>(predicate: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            predicate,
            tokens.into_iter().map(|token| Term::classify(token.as_ref())),
        )
    }

    /// Number of terms
    #[must_use]
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// True when every term is a constant
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_constant)
    }

    /// True when the predicate name and every term survive a write and reload
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        is_token(&self.predicate) && self.terms.iter().all(Term::is_well_formed)
    }

    /// Variable tokens in order of occurrence, repeats included
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().filter_map(|term| match term {
            Term::Variable(var) => Some(var.as_str()),
            Term::Constant(_) => None,
        })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (pos, term) in self.terms.iter().enumerate() {
            if pos > 0 {
                f.write_str(",")?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}
