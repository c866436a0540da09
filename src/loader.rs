//! Program file grammar
//!
//! One statement per line:
//!
//! ```text
//! parent(tom,bob)
//! parent(X,Y)^parent(Y,Z)->grandparent(X,Z)
//! ```
//!
//! A line holding a single atom is a fact; atoms joined by `^` followed by
//! `->` and a head atom form a rule. Blank lines are skipped. Tokens of one
//! character are variables and longer tokens are constants, so facts may not
//! contain single-character tokens. There are no comments and no escapes.

use std::path::Path;

use bstr::ByteSlice;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, space0};
use nom::combinator::{all_consuming, map};
use nom::multi::{separated_list0, separated_list1};
use nom::sequence::{delimited, preceded, separated_pair, tuple};
use nom::IResult;

use crate::database::{Database, Record};
use crate::error::{Error, Result};
use crate::model::{is_token_char, Atom, Term};

fn token(input: &str) -> IResult<&str, &str> {
    delimited(space0, take_while1(is_token_char), space0)(input)
}

fn atom(input: &str) -> IResult<&str, Atom> {
    map(
        tuple((
            token,
            delimited(char('('), separated_list0(char(','), token), char(')')),
        )),
        |(predicate, tokens)| Atom::from_tokens(predicate, tokens),
    )(input)
}

fn statement(input: &str) -> IResult<&str, Record> {
    alt((
        map(
            separated_pair(
                separated_list1(preceded(space0, char('^')), atom),
                preceded(space0, tag("->")),
                atom,
            ),
            |(body, head)| Record::Rule { head, body },
        ),
        map(atom, Record::Fact),
    ))(input)
}

/// Explain why `line` does not parse, for error messages
fn diagnose(line: &str) -> &'static str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('(') || trimmed.contains("^(") || trimmed.contains(">(") {
        "empty predicate name"
    } else if !line.contains('(') {
        "expected `name(terms)`"
    } else if line.matches('(').count() != line.matches(')').count() {
        "unbalanced parentheses"
    } else if line.contains("->") {
        "malformed rule, expected `body^body->head`"
    } else {
        "malformed atom"
    }
}

/// Parse one non-blank line
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] tagged with `line_no` when the line
/// does not follow the grammar or a fact holds a single-character token.
pub fn parse_line(line: &str, line_no: usize) -> Result<Record> {
    let line = line.trim();
    let (_, record) =
        all_consuming(statement)(line).map_err(|_| Error::malformed(line_no, diagnose(line)))?;

    if let Record::Fact(fact) = &record {
        if let Some(term) = fact.terms.iter().find(|term| !term.is_constant()) {
            return Err(Error::malformed(
                line_no,
                format!("single-character constant `{term}` in fact {fact}"),
            ));
        }
    }
    Ok(record)
}

/// Parse a whole program, skipping blank lines
///
/// # Errors
///
/// Returns the first [`Error::MalformedInput`] encountered.
pub fn parse_program(text: &str) -> Result<Vec<Record>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

/// Parse a program and build a database of given facts and rules
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] for grammar violations.
pub fn load_str(text: &str) -> Result<Database> {
    Database::from_records(parse_program(text)?)
}

/// Read a program file and build a database of given facts and rules
///
/// Lines may end in `\n` or `\r\n`.
///
/// # Errors
///
/// Returns [`Error::OpFailed`] when the file cannot be read and
/// [`Error::MalformedInput`] for grammar violations or invalid UTF-8.
pub fn load_file(path: impl AsRef<Path>) -> Result<Database> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::OpFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (idx, line) in bytes.lines().enumerate() {
        let line = line
            .to_str()
            .map_err(|_| Error::malformed(idx + 1, "invalid UTF-8"))?;
        if !line.trim().is_empty() {
            records.push(parse_line(line, idx + 1)?);
        }
    }

    log::info!("loaded {} statements from {}", records.len(), path.display());
    Database::from_records(records)
}

/// Parse the arity typed at a prompt
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] (line 0) unless `arity` is a
/// non-negative integer that fits in `usize`.
pub fn parse_arity(arity: &str) -> Result<usize> {
    let arity = arity.trim();
    arity
        .parse()
        .map_err(|_| Error::malformed(0, format!("invalid arity `{arity}`")))
}

/// Build an atom from interactive prompts: a name, an arity and the terms
///
/// With `require_ground` every token must be a constant, i.e. longer than one
/// character.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] (line 0) for an empty name, a
/// invalid arity, a term count that differs from the arity, an empty or
/// non-token term, or a single-character token when `require_ground` is set.
pub fn build_atom<S: AsRef<str>>(
    name: &str,
    arity: &str,
    tokens: &[S],
    require_ground: bool,
) -> Result<Atom> {
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_token_char) {
        return Err(Error::malformed(0, "empty predicate name"));
    }
    let arity = parse_arity(arity)?;
    if arity != tokens.len() {
        return Err(Error::malformed(
            0,
            format!("arity {arity} but {} terms given", tokens.len()),
        ));
    }

    let mut terms = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.as_ref().trim();
        if token.is_empty() || !token.chars().all(is_token_char) {
            return Err(Error::malformed(0, format!("invalid term `{token}`")));
        }
        let term = Term::classify(token);
        if require_ground && !term.is_constant() {
            return Err(Error::malformed(
                0,
                format!("single-character constant `{token}`"),
            ));
        }
        terms.push(term);
    }
    Ok(Atom::new(name, terms))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::database::Provenance;

    fn atom(name: &str, tokens: &[&str]) -> Atom {
        Atom::from_tokens(name, tokens)
    }

    #[test]
    fn test_parse_fact() {
        assert_eq!(
            parse_line("parent(tom,bob)", 1).unwrap(),
            Record::Fact(atom("parent", &["tom", "bob"]))
        );
        assert_eq!(parse_line("rain()", 1).unwrap(), Record::Fact(atom("rain", &[])));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!(
            parse_line("parent(X,Y)^parent(Y,Z)->grandparent(X,Z)", 1).unwrap(),
            Record::Rule {
                head: atom("grandparent", &["X", "Z"]),
                body: vec![atom("parent", &["X", "Y"]), atom("parent", &["Y", "Z"])],
            }
        );
        assert_eq!(
            parse_line("flies(X)->bird(X)", 1).unwrap(),
            Record::Rule {
                head: atom("bird", &["X"]),
                body: vec![atom("flies", &["X"])],
            }
        );
    }

    #[test]
    fn test_rule_body_may_mix_constants_and_variables() {
        let record = parse_line("likes(X,pizza)^person(X)->pizzafan(X)", 1).unwrap();
        let Record::Rule { body, .. } = record else {
            panic!("expected a rule");
        };
        assert_eq!(body[0].terms[1], Term::Constant("pizza".to_string()));
    }

    #[test]
    fn test_parse_program_skips_blank_lines() {
        let records = parse_program("parent(tom,bob)\n\n   \nflies(X)->bird(X)\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_single_character_constant_in_fact() {
        let err = parse_program("parent(tom,bob)\nparent(a,bob)").unwrap_err();
        assert!(matches!(err, Error::MalformedInput { line: 2, .. }));
    }

    #[test]
    fn test_malformed_lines() {
        for (line, expected) in [
            ("(tom,bob)", "empty predicate name"),
            ("parent", "expected `name(terms)`"),
            ("parent(tom,bob", "unbalanced parentheses"),
            ("parent(X)->", "malformed rule, expected `body^body->head`"),
            ("parent(tom,,bob)", "malformed atom"),
        ] {
            match parse_line(line, 4) {
                Err(Error::MalformedInput { line: 4, reason }) => assert_eq!(reason, expected),
                other => panic!("unexpected result for {line}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_load_str_marks_given() {
        let db = load_str("flies(tweety)\nflies(X)->bird(X)\n").unwrap();
        assert_eq!(db.facts_given(), 1);
        assert_eq!(db.rules_given(), 1);
        assert_eq!(db.facts()[0].provenance, Provenance::Given);
    }

    #[test]
    fn test_load_file_accepts_crlf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"parent(tom,bob)\r\n\r\nparent(X,Y)->ancestor(X,Y)\r\n")
            .unwrap();

        let db = load_file(file.path()).unwrap();
        assert_eq!(db.facts()[0].atom, atom("parent", &["tom", "bob"]));
        assert_eq!(db.rules().len(), 1);
    }

    #[test]
    fn test_load_file_missing_is_op_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path().join("missing.dl")).unwrap_err();
        assert!(matches!(err, Error::OpFailed { .. }));
    }

    #[test]
    fn test_demo_program_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/family.dl");
        let db = load_file(path).unwrap();
        assert_eq!(db.facts_given(), 6);
        assert_eq!(db.rules_given(), 5);
    }

    #[test]
    fn test_build_atom() {
        assert_eq!(
            build_atom("parent", "2", &["tom", "bob"], true).unwrap(),
            atom("parent", &["tom", "bob"])
        );
        assert_eq!(
            build_atom("parent", " 2 ", &["X", "bob"], false).unwrap(),
            atom("parent", &["X", "bob"])
        );
    }

    #[test]
    fn test_build_atom_rejects_bad_prompts() {
        let cases: [(&str, &str, &[&str], bool); 5] = [
            ("", "1", &["tom"], true),
            ("parent", "two", &["tom", "bob"], true),
            ("parent", "3", &["tom", "bob"], true),
            ("parent", "2", &["tom", "b"], true),
            ("parent", "1", &[""], false),
        ];
        for (name, arity, tokens, ground) in cases {
            assert!(
                matches!(
                    build_atom(name, arity, tokens, ground),
                    Err(Error::MalformedInput { line: 0, .. })
                ),
                "{name}/{arity} {tokens:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_arity() {
        assert_eq!(parse_arity(" 3 ").unwrap(), 3);
        assert_eq!(parse_arity("0").unwrap(), 0);
        for bad in ["", "two", "-1", "99999999999999999999999"] {
            assert!(matches!(
                parse_arity(bad),
                Err(Error::MalformedInput { line: 0, .. })
            ));
        }
    }
}
