//! Interactive-layer semantics
//!
//! A [`Session`] owns one database and one reasoner and implements what the
//! menu of the `dedlog` binary offers, without touching a terminal. Items are
//! addressed the way the menu lists them: the n-th active fact when deleting,
//! the n-th deleted fact when restoring.

use std::path::{Path, PathBuf};

use crate::config::ReasonerConfig;
use crate::database::{Database, Fact, Rule, Snapshot};
use crate::error::{Error, ItemKind, Result};
use crate::model::Atom;
use crate::reasoner::{LogSink, NoTrace, ReasonReport, Reasoner};

/// Result of asking the session to reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonOutcome {
    /// The reasoner ran to a fixpoint
    Completed(ReasonReport),
    /// Nothing changed since the last run
    AlreadyAnalyzed,
}

/// One editing session over a program
#[derive(Debug)]
pub struct Session {
    db: Database,
    reasoner: Reasoner,
    source: Option<PathBuf>,
    analyzed: bool,
}

impl Session {
    /// Start a session over an in-memory database
    #[must_use]
    pub fn new(db: Database, config: ReasonerConfig) -> Self {
        Self {
            db,
            reasoner: Reasoner::new(config),
            source: None,
            analyzed: false,
        }
    }

    /// Start a session over a program file
    ///
    /// # Errors
    ///
    /// Returns the loader's error if the file cannot be read or parsed.
    #[cfg(feature = "parsing")]
    pub fn open(path: impl AsRef<Path>, config: ReasonerConfig) -> Result<Self> {
        let path = path.as_ref();
        let mut session = Self::new(crate::loader::load_file(path)?, config);
        session.source = Some(path.to_path_buf());
        Ok(session)
    }

    /// The database being edited
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// File the program was loaded from or last saved to
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// True if the database has not changed since the last reasoning run
    #[must_use]
    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    /// Current content, partitioned for display
    #[must_use]
    pub fn display(&self) -> Snapshot<'_> {
        self.db.snapshot()
    }

    /// Run the reasoner unless the database is already closed
    ///
    /// With `verbose`, every attempted rule and derived fact is logged.
    pub fn reason(&mut self, verbose: bool) -> ReasonOutcome {
        if self.analyzed {
            return ReasonOutcome::AlreadyAnalyzed;
        }
        let report = if verbose || self.reasoner.config().verbose {
            self.reasoner.reason_with(&mut self.db, &mut LogSink)
        } else {
            self.reasoner.reason_with(&mut self.db, &mut NoTrace)
        };
        self.analyzed = true;
        ReasonOutcome::Completed(report)
    }

    /// Add a new fact
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonGroundFact`] for atoms with variables.
    pub fn add_fact(&mut self, atom: Atom) -> Result<()> {
        self.db.add_fact(atom)?;
        self.analyzed = false;
        Ok(())
    }

    /// Add a new rule
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRuleBody`] when `body` is empty.
    pub fn add_rule(&mut self, head: Atom, body: Vec<Atom>) -> Result<()> {
        self.db.add_rule(head, body)?;
        self.analyzed = false;
        Ok(())
    }

    /// Facts listed by the delete menu, in storage order
    pub fn active_facts(&self) -> impl Iterator<Item = &Fact> + '_ {
        self.db.active_facts()
    }

    /// Facts listed by the re-add menu, in storage order
    pub fn deleted_facts(&self) -> impl Iterator<Item = &Fact> + '_ {
        self.db.facts().iter().filter(|fact| !fact.active)
    }

    /// Rules listed by the delete menu, in storage order
    pub fn active_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.db.active_rules()
    }

    /// Rules listed by the re-add menu, in storage order
    pub fn deleted_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.db.rules().iter().filter(|rule| !rule.active)
    }

    /// Deactivate the `n`-th active fact (0-based)
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there are not that many active facts.
    pub fn delete_fact(&mut self, n: usize) -> Result<()> {
        let index = nth_index(self.db.facts(), n, |fact| fact.active, ItemKind::Fact)?;
        self.db.toggle_fact_active(index, false)?;
        self.analyzed = false;
        Ok(())
    }

    /// Reactivate the `n`-th deleted fact (0-based)
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there are not that many deleted facts.
    pub fn restore_fact(&mut self, n: usize) -> Result<()> {
        let index = nth_index(self.db.facts(), n, |fact| !fact.active, ItemKind::Fact)?;
        self.db.toggle_fact_active(index, true)?;
        self.analyzed = false;
        Ok(())
    }

    /// Deactivate the `n`-th active rule (0-based)
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there are not that many active rules.
    pub fn delete_rule(&mut self, n: usize) -> Result<()> {
        let index = nth_index(self.db.rules(), n, |rule| rule.active, ItemKind::Rule)?;
        self.db.toggle_rule_active(index, false)?;
        self.analyzed = false;
        Ok(())
    }

    /// Reactivate the `n`-th deleted rule (0-based)
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there are not that many deleted rules.
    pub fn restore_rule(&mut self, n: usize) -> Result<()> {
        let index = nth_index(self.db.rules(), n, |rule| !rule.active, ItemKind::Rule)?;
        self.db.toggle_rule_active(index, true)?;
        self.analyzed = false;
        Ok(())
    }

    /// Return to the loaded program
    pub fn reset(&mut self) {
        self.db.reset();
        self.analyzed = false;
    }

    /// Replace the database with the program at `path`
    ///
    /// On failure the current database is kept.
    ///
    /// # Errors
    ///
    /// Returns the loader's error.
    #[cfg(feature = "parsing")]
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.db = crate::loader::load_file(path)?;
        self.source = Some(path.to_path_buf());
        self.analyzed = false;
        Ok(())
    }

    /// Write the active program to `path` and remember it as the source
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpFailed`] on I/O failure.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        crate::writer::save_file(&self.db, path)?;
        self.source = Some(path.to_path_buf());
        Ok(())
    }
}

/// Storage index of the `n`-th item selected by `keep`
fn nth_index<T>(items: &[T], n: usize, keep: impl Fn(&T) -> bool, kind: ItemKind) -> Result<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| keep(item))
        .nth(n)
        .map(|(index, _)| index)
        .ok_or(Error::NotFound { kind, index: n })
}

#[cfg(all(test, feature = "parsing"))]
mod tests {
    use super::*;
    use crate::loader::load_str;

    const BIRDS: &str = "flies(tweety)\nflies(polly)\nflies(X)->bird(X)\n";

    fn session() -> Session {
        Session::new(load_str(BIRDS).unwrap(), ReasonerConfig::default())
    }

    fn bird(name: &str) -> Atom {
        Atom::from_tokens("bird", [name])
    }

    #[test]
    fn test_reason_once_until_changed() {
        let mut session = session();
        assert!(!session.is_analyzed());

        assert_eq!(
            session.reason(false),
            ReasonOutcome::Completed(ReasonReport { passes: 2, derived: 2 })
        );
        assert!(session.is_analyzed());
        assert_eq!(session.reason(false), ReasonOutcome::AlreadyAnalyzed);

        session
            .add_fact(Atom::from_tokens("flies", ["woody"]))
            .unwrap();
        assert!(!session.is_analyzed());
        assert_eq!(
            session.reason(true),
            ReasonOutcome::Completed(ReasonReport { passes: 2, derived: 1 })
        );
    }

    #[test]
    fn test_delete_addresses_active_items() {
        let mut session = session();
        session.delete_fact(0).unwrap();
        // flies(polly) is now the only active fact
        session.delete_fact(0).unwrap();
        assert_eq!(session.active_facts().count(), 0);
        assert_eq!(session.deleted_facts().count(), 2);

        assert!(matches!(
            session.delete_fact(0),
            Err(Error::NotFound {
                kind: ItemKind::Fact,
                index: 0
            })
        ));
    }

    #[test]
    fn test_restore_addresses_deleted_items() {
        let mut session = session();
        session.delete_fact(0).unwrap();
        session.delete_fact(0).unwrap();

        session.restore_fact(1).unwrap();
        let active: Vec<String> = session.active_facts().map(|f| f.atom.to_string()).collect();
        assert_eq!(active, vec!["flies(polly)"]);

        assert!(session.restore_fact(1).is_err());
    }

    #[test]
    fn test_delete_and_restore_rule() {
        let mut session = session();
        session.delete_rule(0).unwrap();
        session.reason(false);
        assert!(!session.database().contains_active_fact(&bird("tweety")));

        session.restore_rule(0).unwrap();
        assert!(!session.is_analyzed());
        session.reason(false);
        assert!(session.database().contains_active_fact(&bird("tweety")));
        assert!(session.delete_rule(1).is_err());
    }

    #[test]
    fn test_reset_discards_session_changes() {
        let mut session = session();
        session.reason(false);
        session.delete_fact(0).unwrap();
        session
            .add_rule(bird("X"), vec![Atom::from_tokens("sings", ["X"])])
            .unwrap();

        session.reset();

        assert!(!session.is_analyzed());
        assert_eq!(session.database().facts().len(), 2);
        assert_eq!(session.database().rules().len(), 1);
        assert_eq!(session.active_facts().count(), 2);
        let snapshot = session.display();
        assert!(snapshot.facts.added_active.is_empty());
        assert!(snapshot.rules.added_active.is_empty());
    }

    #[test]
    fn test_invalid_additions_leave_session_untouched() {
        let mut session = session();
        session.reason(false);
        assert!(session.add_fact(bird("X")).is_err());
        assert!(session.add_rule(bird("X"), vec![]).is_err());
        assert!(session.is_analyzed());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("birds.dl");

        let mut session = session();
        session.reason(false);
        session.save(&path).unwrap();
        assert_eq!(session.source(), Some(path.as_path()));

        let mut other = Session::open(&path, ReasonerConfig::default()).unwrap();
        assert_eq!(other.database().facts_given(), 4);
        assert!(other.database().contains_active_fact(&bird("polly")));

        let missing = dir.path().join("missing.dl");
        assert!(other.load(&missing).is_err());
        assert_eq!(other.database().facts_given(), 4);
        assert_eq!(other.source(), Some(path.as_path()));
    }
}
