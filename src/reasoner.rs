use crate::config::ReasonerConfig;
use crate::database::{Database, Rule};
use crate::model::Atom;
use crate::substitution::{is_fact, partial_match, Substitution};

/// Lifecycle of a reasoner across `reason` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonerState {
    /// Never run
    Idle,
    /// Passes are being executed
    Running,
    /// The last call reached a fixpoint
    Stable,
}

/// Outcome of one `reason` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReasonReport {
    /// Passes executed, including the final pass that derived nothing
    pub passes: usize,
    /// Facts appended to the database
    pub derived: usize,
}

/// Observation emitted while reasoning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A pass over all active rules begins (1-based)
    PassStarted {
        /// Pass number
        pass: usize,
    },
    /// An active rule is about to be attempted
    RuleAttempted {
        /// Storage index of the rule
        index: usize,
        /// The rule itself
        rule: Rule,
    },
    /// A new fact was appended
    FactDerived {
        /// Storage index of the rule that produced it
        rule_index: usize,
        /// The derived ground atom
        fact: Atom,
    },
    /// A pass derived nothing
    Stable {
        /// Totals for the call
        report: ReasonReport,
    },
}

/// Receiver of [`TraceEvent`]s. Purely observational.
pub trait TraceSink {
    /// Called once per event, in order
    fn observe(&mut self, event: &TraceEvent);
}

impl<F> TraceSink for F
where
    F: FnMut(&TraceEvent),
{
    fn observe(&mut self, event: &TraceEvent) {
        self(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn observe(&mut self, _event: &TraceEvent) {}
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn observe(&mut self, event: &TraceEvent) {
        match event {
            TraceEvent::PassStarted { pass } => log::debug!("starting pass {pass}"),
            TraceEvent::RuleAttempted { rule, .. } => log::info!("testing rule: {rule}"),
            TraceEvent::FactDerived { fact, .. } => log::info!("added: {fact}"),
            TraceEvent::Stable { report } => log::info!(
                "checked all rules, nothing new to add ({} passes, {} new facts)",
                report.passes,
                report.derived
            ),
        }
    }
}

/// Where the search goes next for a partial substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The body atom at this index still has unbound variables
    Continue(usize),
    /// A body atom is ground but not an active fact
    DeadEnd,
    /// Every body atom is ground and an active fact
    Satisfied,
}

/// Classify `subst` against `body`, scanning left to right.
///
/// The first body atom that is either non-ground or a ground non-fact
/// decides the step.
#[must_use]
pub fn next_step(db: &Database, body: &[Atom], subst: &Substitution) -> Step {
    for (index, atom) in body.iter().enumerate() {
        let atom = subst.apply(atom);
        if !atom.is_ground() {
            return Step::Continue(index);
        }
        if !is_fact(db, &atom) {
            return Step::DeadEnd;
        }
    }
    Step::Satisfied
}

/// Naive forward-chaining evaluator
///
/// Each pass attempts every active rule with a backtracking search over the
/// active facts; passes repeat until one derives nothing. Derived facts are
/// visible immediately, including to the rest of the pass that produced them.
#[derive(Debug, Clone)]
pub struct Reasoner {
    config: ReasonerConfig,
    state: ReasonerState,
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new(ReasonerConfig::default())
    }
}

impl Reasoner {
    /// Create an idle reasoner
    #[must_use]
    pub fn new(config: ReasonerConfig) -> Self {
        Self {
            config,
            state: ReasonerState::Idle,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ReasonerState {
        self.state
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Compute the closure of `db`, tracing to the log when configured verbose
    pub fn reason(&mut self, db: &mut Database) -> ReasonReport {
        if self.config.verbose {
            self.reason_with(db, &mut LogSink)
        } else {
            self.reason_with(db, &mut NoTrace)
        }
    }

    /// Compute the closure of `db`, delivering trace events to `sink`
    pub fn reason_with(&mut self, db: &mut Database, sink: &mut dyn TraceSink) -> ReasonReport {
        self.state = ReasonerState::Running;
        log::debug!(
            "reasoning over {} facts and {} rules",
            db.facts().len(),
            db.rules().len()
        );
        if self.config.warn_unrestricted {
            for rule in db.active_rules().filter(|rule| !rule.is_range_restricted()) {
                log::warn!("rule `{rule}` can never derive: head variables are unbound by its body");
            }
        }

        let mut report = ReasonReport::default();
        loop {
            report.passes += 1;
            sink.observe(&TraceEvent::PassStarted {
                pass: report.passes,
            });

            let before = db.facts().len();
            Self::pass(db, sink);
            let added = db.facts().len() - before;

            report.derived += added;
            if added == 0 {
                break;
            }
        }

        self.state = ReasonerState::Stable;
        sink.observe(&TraceEvent::Stable { report });
        log::debug!(
            "fixpoint reached after {} passes, {} new facts",
            report.passes,
            report.derived
        );
        report
    }

    /// Attempt every active rule once
    fn pass(db: &mut Database, sink: &mut dyn TraceSink) {
        // The rule set is fixed while reasoning; only facts grow.
        for rule_index in 0..db.rules().len() {
            let rule = db.rules()[rule_index].clone();
            if !rule.active {
                continue;
            }
            sink.observe(&TraceEvent::RuleAttempted {
                index: rule_index,
                rule: rule.clone(),
            });

            let mut search = Search {
                db: &mut *db,
                rule: &rule,
                rule_index,
                sink: &mut *sink,
            };
            search.branch(0, &Substitution::new());
        }
    }
}

/// Backtracking search for one rule attempt
struct Search<'a> {
    db: &'a mut Database,
    rule: &'a Rule,
    rule_index: usize,
    sink: &'a mut dyn TraceSink,
}

impl Search<'_> {
    /// Try every active fact admitted for body atom `atom_index` under `subst`
    fn branch(&mut self, atom_index: usize, subst: &Substitution) {
        let rule = self.rule;
        let pattern = &rule.body[atom_index];
        let trial = subst.apply(pattern);

        // Facts appended by deeper branches are candidates as well.
        let mut fact_index = 0;
        while fact_index < self.db.facts().len() {
            let fact = &self.db.facts()[fact_index];
            let extended = if fact.active && partial_match(&trial, &fact.atom) {
                subst.extend(pattern, &fact.atom)
            } else {
                None
            };
            fact_index += 1;

            if let Some(extended) = extended {
                self.solve(extended);
            }
        }
    }

    fn solve(&mut self, subst: Substitution) {
        match next_step(self.db, &self.rule.body, &subst) {
            Step::Satisfied => self.derive(&subst),
            Step::DeadEnd => log::trace!("dead end for rule #{} with {subst:?}", self.rule_index),
            Step::Continue(atom_index) => self.branch(atom_index, &subst),
        }
    }

    fn derive(&mut self, subst: &Substitution) {
        let head = subst.apply(&self.rule.head);
        if !head.is_ground() {
            log::debug!("skipping non-ground head {head} of rule #{}", self.rule_index);
            return;
        }
        if self.db.contains_active_fact(&head) {
            return;
        }

        self.sink.observe(&TraceEvent::FactDerived {
            rule_index: self.rule_index,
            fact: head.clone(),
        });
        self.db.push_fact(head);
    }
}
