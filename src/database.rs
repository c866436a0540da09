use std::fmt;

use crate::error::{Error, ItemKind, Result};
use crate::model::Atom;

/// Where a stored fact or rule came from
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Provenance {
    /// Part of the loaded program
    Given,
    /// Created during the session, by hand or by the reasoner
    Added,
}

/// A ground atom held in the database
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fact {
    /// The ground atom
    pub atom: Atom,
    /// Given or added
    pub provenance: Provenance,
    /// Inactive facts are kept but never matched
    pub active: bool,
}

/// An implication `body_1 ^ ... ^ body_n -> head`
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rule {
    /// The conclusion
    pub head: Atom,
    /// The conditions, never empty
    pub body: Vec<Atom>,
    /// Given or added
    pub provenance: Provenance,
    /// Inactive rules are never attempted
    pub active: bool,
}

impl Rule {
    /// True when every head variable also occurs in the body.
    ///
    /// Rules failing this check are accepted, but their head can never become
    /// ground so they never derive anything.
    #[must_use]
    pub fn is_range_restricted(&self) -> bool {
        self.head
            .variables()
            .all(|var| self.body.iter().any(|atom| atom.variables().any(|v| v == var)))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, atom) in self.body.iter().enumerate() {
            if pos > 0 {
                f.write_str("^")?;
            }
            write!(f, "{atom}")?;
        }
        write!(f, "->{}", self.head)
    }
}

/// Facts and rules with their given/added boundaries
///
/// Storage only grows during a session: deleting a fact or rule flips its
/// `active` flag. The only shrinking operation is [`Database::reset`], which
/// drops everything past the given boundary.
#[derive(Debug, Clone, Default)]
pub struct Database {
    facts: Vec<Fact>,
    rules: Vec<Rule>,
    facts_given: usize,
    rules_given: usize,
}

impl Database {
    /// Create an empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a database whose content is entirely given
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonGroundFact`] or [`Error::EmptyRuleBody`] for an
    /// invalid record, and [`Error::MalformedInput`] (line 0) for an atom that
    /// is not [well formed](Atom::is_well_formed); no database is produced
    /// in that case.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut db = Self::new();
        for record in records {
            match record {
                Record::Fact(atom) => {
                    ensure_ground(&atom)?;
                    db.facts.push(Fact {
                        atom,
                        provenance: Provenance::Given,
                        active: true,
                    });
                }
                Record::Rule { head, body } => {
                    ensure_body(&head, &body)?;
                    db.rules.push(Rule {
                        head,
                        body,
                        provenance: Provenance::Given,
                        active: true,
                    });
                }
            }
        }
        db.facts_given = db.facts.len();
        db.rules_given = db.rules.len();
        log::debug!(
            "database built with {} given facts and {} given rules",
            db.facts_given,
            db.rules_given
        );
        Ok(db)
    }

    /// Add a fact created during the session
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonGroundFact`] if the atom contains variables and
    /// [`Error::MalformedInput`] (line 0) if it is not
    /// [well formed](Atom::is_well_formed).
    pub fn add_fact(&mut self, atom: Atom) -> Result<usize> {
        ensure_ground(&atom)?;
        Ok(self.push_fact(atom))
    }

    /// Add a rule created during the session
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRuleBody`] if `body` is empty and
    /// [`Error::MalformedInput`] (line 0) if an atom is not
    /// [well formed](Atom::is_well_formed).
    pub fn add_rule(&mut self, head: Atom, body: Vec<Atom>) -> Result<usize> {
        ensure_body(&head, &body)?;
        let rule = Rule {
            head,
            body,
            provenance: Provenance::Added,
            active: true,
        };
        if !rule.is_range_restricted() {
            log::warn!("rule `{rule}` has head variables missing from its body");
        }
        self.rules.push(rule);
        Ok(self.rules.len() - 1)
    }

    /// Append a fact as added and active, returning its index
    pub(crate) fn push_fact(&mut self, atom: Atom) -> usize {
        self.facts.push(Fact {
            atom,
            provenance: Provenance::Added,
            active: true,
        });
        self.facts.len() - 1
    }

    /// Set the `active` flag of the fact at `index`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no fact is stored at `index`.
    pub fn toggle_fact_active(&mut self, index: usize, value: bool) -> Result<()> {
        let fact = self.facts.get_mut(index).ok_or(Error::NotFound {
            kind: ItemKind::Fact,
            index,
        })?;
        fact.active = value;
        Ok(())
    }

    /// Set the `active` flag of the rule at `index`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no rule is stored at `index`.
    pub fn toggle_rule_active(&mut self, index: usize, value: bool) -> Result<()> {
        let rule = self.rules.get_mut(index).ok_or(Error::NotFound {
            kind: ItemKind::Rule,
            index,
        })?;
        rule.active = value;
        Ok(())
    }

    /// Restore the given baseline: discard added items, reactivate given ones
    pub fn reset(&mut self) {
        let dropped = (self.facts.len() - self.facts_given, self.rules.len() - self.rules_given);
        self.facts.truncate(self.facts_given);
        self.rules.truncate(self.rules_given);
        self.facts.iter_mut().for_each(|fact| fact.active = true);
        self.rules.iter_mut().for_each(|rule| rule.active = true);
        log::debug!(
            "database reset, dropped {} added facts and {} added rules",
            dropped.0,
            dropped.1
        );
    }

    /// All stored facts, active or not
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// All stored rules, active or not
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of facts that belong to the loaded program
    #[must_use]
    pub fn facts_given(&self) -> usize {
        self.facts_given
    }

    /// Number of rules that belong to the loaded program
    #[must_use]
    pub fn rules_given(&self) -> usize {
        self.rules_given
    }

    /// Facts eligible for matching
    pub fn active_facts(&self) -> impl Iterator<Item = &Fact> + '_ {
        self.facts.iter().filter(|fact| fact.active)
    }

    /// Rules eligible for reasoning
    pub fn active_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter().filter(|rule| rule.active)
    }

    /// Returns true if `atom` equals some active fact
    #[must_use]
    pub fn contains_active_fact(&self, atom: &Atom) -> bool {
        self.active_facts().any(|fact| &fact.atom == atom)
    }

    /// Partition facts and rules for display. Pure query.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            facts: Partition::split(&self.facts, self.facts_given, |fact| fact.active),
            rules: Partition::split(&self.rules, self.rules_given, |rule| rule.active),
        }
    }
}

/// A pre-parsed program line handed to [`Database::from_records`]
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Record {
    /// A ground atom
    Fact(Atom),
    /// A rule with its head and body
    Rule {
        /// The conclusion
        head: Atom,
        /// The conditions
        body: Vec<Atom>,
    },
}

fn ensure_well_formed(atom: &Atom) -> Result<()> {
    if atom.is_well_formed() {
        Ok(())
    } else {
        Err(Error::malformed(
            0,
            format!("`{atom}` has a name or term that cannot be written back"),
        ))
    }
}

fn ensure_ground(atom: &Atom) -> Result<()> {
    ensure_well_formed(atom)?;
    if atom.is_ground() {
        Ok(())
    } else {
        Err(Error::NonGroundFact {
            fact: atom.to_string(),
        })
    }
}

fn ensure_body(head: &Atom, body: &[Atom]) -> Result<()> {
    ensure_well_formed(head)?;
    body.iter().try_for_each(ensure_well_formed)?;
    if body.is_empty() {
        Err(Error::EmptyRuleBody {
            head: head.to_string(),
        })
    } else {
        Ok(())
    }
}

/// A stored item together with its storage index
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Entry<'a, T> {
    /// Index accepted by the toggle operations
    pub index: usize,
    /// The stored item
    pub item: &'a T,
}

/// Items split by provenance and status
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Partition<'a, T> {
    /// Given and active
    pub given_active: Vec<Entry<'a, T>>,
    /// Given and deleted
    pub given_inactive: Vec<Entry<'a, T>>,
    /// Added and active
    pub added_active: Vec<Entry<'a, T>>,
    /// Added and deleted
    pub added_inactive: Vec<Entry<'a, T>>,
}

impl<'a, T> Partition<'a, T> {
    fn split(items: &'a [T], given: usize, is_active: impl Fn(&T) -> bool) -> Self {
        let mut partition = Self {
            given_active: Vec::new(),
            given_inactive: Vec::new(),
            added_active: Vec::new(),
            added_inactive: Vec::new(),
        };
        for (index, item) in items.iter().enumerate() {
            let entry = Entry { index, item };
            match (index < given, is_active(item)) {
                (true, true) => partition.given_active.push(entry),
                (true, false) => partition.given_inactive.push(entry),
                (false, true) => partition.added_active.push(entry),
                (false, false) => partition.added_inactive.push(entry),
            }
        }
        partition
    }
}

/// Read-only view of a database for display
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot<'a> {
    /// Fact partitions
    pub facts: Partition<'a, Fact>,
    /// Rule partitions
    pub rules: Partition<'a, Rule>,
}

fn write_section<T>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    entries: &[Entry<'_, T>],
    empty: Option<&str>,
    render: impl Fn(&T) -> String,
) -> fmt::Result {
    if entries.is_empty() {
        return match empty {
            Some(note) => writeln!(f, "\n{title}:\n{note}"),
            None => Ok(()),
        };
    }
    writeln!(f, "\n{title}:")?;
    for entry in entries {
        writeln!(f, "{}", render(entry.item))?;
    }
    Ok(())
}

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fact = |fact: &Fact| fact.atom.to_string();
        let rule = |rule: &Rule| rule.to_string();

        write_section(f, "Database Facts", &self.facts.given_active, Some("None"), fact)?;
        write_section(f, "Deleted Facts", &self.facts.given_inactive, None, fact)?;
        write_section(f, "Database Rules", &self.rules.given_active, Some("None"), rule)?;
        write_section(f, "Deleted Rules", &self.rules.given_inactive, None, rule)?;
        write_section(f, "New Facts", &self.facts.added_active, Some("No new facts"), fact)?;
        write_section(f, "Deleted New Facts", &self.facts.added_inactive, None, fact)?;
        write_section(f, "New Rules", &self.rules.added_active, Some("No new rules"), rule)?;
        write_section(f, "Deleted New Rules", &self.rules.added_inactive, None, rule)
    }
}
