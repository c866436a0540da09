use indexmap::IndexMap;

use crate::database::Database;
use crate::model::{Atom, Term};

/// Variable to constant bindings built during one rule-satisfaction branch
///
/// Substitutions are values: extending one returns a new substitution and
/// leaves the original untouched, so sibling branches of the search never
/// observe each other's bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Substitution {
    bindings: IndexMap<String, String>,
}

impl Substitution {
    /// Create an empty substitution
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant bound to `var`, if any
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&str> {
        self.bindings.get(var).map(String::as_str)
    }

    /// Number of bound variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Replace every bound variable of `atom` by its constant
    ///
    /// Unbound variables are kept as they are, so the result may still be
    /// non-ground.
    #[must_use]
    pub fn apply(&self, atom: &Atom) -> Atom {
        Atom {
            predicate: atom.predicate.clone(),
            terms: atom
                .terms
                .iter()
                .map(|term| match term {
                    Term::Variable(var) => self
                        .bindings
                        .get(var)
                        .map_or_else(|| term.clone(), |value| Term::Constant(value.clone())),
                    Term::Constant(_) => term.clone(),
                })
                .collect(),
        }
    }

    /// Extend the bindings so that `pattern` maps onto the ground `fact`
    ///
    /// Constants in `pattern` and variables that are already bound must agree
    /// with the fact's term at the same position; new variables are bound to
    /// it. Returns `None` when the fact is inconsistent with the pattern.
    #[must_use]
    pub fn extend(&self, pattern: &Atom, fact: &Atom) -> Option<Self> {
        if pattern.predicate != fact.predicate || pattern.arity() != fact.arity() {
            return None;
        }

        let mut extended = self.clone();

        pattern
            .terms
            .iter()
            .zip(&fact.terms)
            .try_for_each(|(term, value)| {
                let value = match value {
                    Term::Constant(value) => value,
                    Term::Variable(_) => return Err(()),
                };
                match term {
                    Term::Constant(sym) => (sym == value).then_some(()).ok_or(()),
                    Term::Variable(var) => {
                        if let Some(bound) = extended.bindings.get(var) {
                            (bound == value).then_some(()).ok_or(())
                        } else {
                            extended.bindings.insert(var.clone(), value.clone());
                            Ok(())
                        }
                    }
                }
            })
            .ok()?;

        Some(extended)
    }
}

/// True iff `atom` is ground and equals some active fact of `db`
#[must_use]
pub fn is_fact(db: &Database, atom: &Atom) -> bool {
    atom.is_ground() && db.contains_active_fact(atom)
}

/// Admission filter for candidate facts
///
/// Predicate name and arity must agree, and every position of `candidate`
/// holding a constant must equal the fact's term there. Variable positions
/// are ignored; consistency of repeated variables is left to
/// [`Substitution::extend`].
#[must_use]
pub fn partial_match(candidate: &Atom, fact: &Atom) -> bool {
    candidate.predicate == fact.predicate
        && candidate.arity() == fact.arity()
        && candidate
            .terms
            .iter()
            .zip(&fact.terms)
            .all(|(term, value)| match term {
                Term::Constant(_) => term == value,
                Term::Variable(_) => true,
            })
}
