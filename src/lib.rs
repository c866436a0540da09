//! # Dedlog
//!
//! A minimal deductive database: ground facts, implication rules and a naive
//! forward-chaining reasoner that computes their closure.
//!
//! ## Features
//!
//! - Backtracking rule matching over single-character variables
//! - Soft deletion and reset to the loaded program
//! - Line-oriented program files (`parsing` feature)
//!
//! ## Example
//!
//! ```rust
//! use dedlog::{Atom, Database, Reasoner, Record};
//!
//! let mut db = Database::from_records([
//!     Record::Fact(Atom::from_tokens("parent", ["tom", "bob"])),
//!     Record::Fact(Atom::from_tokens("parent", ["bob", "ann"])),
//!     Record::Rule {
//!         head: Atom::from_tokens("grandparent", ["X", "Z"]),
//!         body: vec![
//!             Atom::from_tokens("parent", ["X", "Y"]),
//!             Atom::from_tokens("parent", ["Y", "Z"]),
//!         ],
//!     },
//! ])?;
//!
//! Reasoner::default().reason(&mut db);
//! assert!(db.contains_active_fact(&Atom::from_tokens("grandparent", ["tom", "ann"])));
//! # Ok::<(), dedlog::Error>(())
//! ```

/// Reasoner settings.
pub mod config;
/// Facts, rules and their storage.
pub mod database;
/// Error types.
pub mod error;
#[cfg(feature = "parsing")]
pub mod loader;
/// Terms and atoms.
pub mod model;
/// Forward-chaining evaluation.
pub mod reasoner;
pub mod session;
#[cfg(test)]
mod strategies;
/// Variable bindings and fact matching.
pub mod substitution;
/// Program serialization.
pub mod writer;

pub use config::ReasonerConfig;
pub use database::{Database, Fact, Provenance, Record, Rule, Snapshot};
pub use error::{Error, ItemKind, Result};
pub use model::{Atom, Term};
pub use reasoner::{ReasonReport, Reasoner, ReasonerState, TraceEvent, TraceSink};
pub use session::{ReasonOutcome, Session};
pub use substitution::Substitution;
