use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::database::Database;
use crate::error::{Error, Result};

/// Program text of the active facts and rules
struct ProgramText<'a>(&'a Database);

impl fmt::Display for ProgramText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fact in self.0.active_facts() {
            writeln!(f, "{}", fact.atom)?;
        }
        writeln!(f)?;
        for rule in self.0.active_rules() {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

/// Write the active facts, a blank line, then the active rules
///
/// The output follows the loader's grammar, so reloading it yields the same
/// active facts and rules. Provenance is not preserved: everything becomes
/// given on reload.
///
/// # Errors
///
/// Propagates errors from `out`.
pub fn write_program<W: Write>(db: &Database, out: &mut W) -> io::Result<()> {
    write!(out, "{}", ProgramText(db))
}

/// Render the program text in memory
#[must_use]
pub fn program_to_string(db: &Database) -> String {
    ProgramText(db).to_string()
}

/// Save the program to `path`, replacing any existing file
///
/// # Errors
///
/// Returns [`Error::OpFailed`] if the file cannot be created or written.
pub fn save_file(db: &Database, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let op_failed = |source| Error::OpFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(op_failed)?;
    let mut out = BufWriter::new(file);
    write_program(db, &mut out).map_err(op_failed)?;
    out.flush().map_err(op_failed)?;

    log::info!("saved program to {}", path.display());
    Ok(())
}
