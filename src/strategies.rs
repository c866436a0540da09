//! Proptest strategies shared by the unit tests

use proptest::prelude::*;

use crate::database::{Database, Record};
use crate::model::Atom;

fn arb_atom(tokens: &'static [&'static str]) -> impl Strategy<Value = Atom> {
    (
        prop::sample::select(vec!["pp", "qq", "rr"]),
        prop::collection::vec(prop::sample::select(tokens), 2),
    )
        .prop_map(|(name, terms)| Atom::from_tokens(name, terms))
}

/// Small given programs over binary predicates `pp`, `qq` and `rr`
pub(crate) fn arb_database() -> impl Strategy<Value = Database> {
    const CONSTANTS: &[&str] = &["aa", "bb", "cc"];
    const TERMS: &[&str] = &["X", "Y", "Z", "aa", "bb"];

    let facts = prop::collection::vec(arb_atom(CONSTANTS).prop_map(Record::Fact), 0..6);
    let rules = prop::collection::vec(
        (prop::collection::vec(arb_atom(TERMS), 1..3), arb_atom(TERMS))
            .prop_map(|(body, head)| Record::Rule { head, body }),
        0..4,
    );
    (facts, rules).prop_map(|(facts, rules)| {
        Database::from_records(facts.into_iter().chain(rules)).unwrap()
    })
}
