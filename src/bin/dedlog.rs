//! dedlog: load a program, reason over it, edit it interactively

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dedlog::database::Snapshot;
use dedlog::loader::{build_atom, parse_arity};
use dedlog::{Atom, Database, ReasonOutcome, ReasonReport, ReasonerConfig, Session};

#[derive(Parser, Debug)]
#[command(name = "dedlog", about = "Minimal deductive database", version)]
struct Cli {
    /// Program file to load; starts with an empty database when omitted
    program: Option<PathBuf>,
    /// Enable verbose logging (debug level) and trace every rule attempt
    #[arg(short, long)]
    verbose: bool,
    /// Reasoner configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Reason once, print the database and exit
    #[arg(long)]
    reason: bool,
    /// With --reason, print JSON instead of text
    #[arg(long, requires = "reason")]
    json: bool,
}

const MENU: &str = "\nChoose one:\n\n\
                    1\tDisplay Current Database\n\
                    2\tRun Reasoner on Database\n\
                    3\tAdd Fact To Database\n\
                    4\tAdd Rule To Database\n\
                    5\tDelete Fact From Database\n\
                    6\tDelete Rule From Database\n\
                    7\tReset Database\n\
                    8\tLoad New File\n\
                    9\tSave Program to File\n\
                    10\tExit Program\n:";

#[derive(serde::Serialize)]
struct ReasonOutput<'a> {
    report: ReasonReport,
    database: Snapshot<'a>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    let mut session = match &cli.program {
        Some(path) => Session::open(path, config)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Session::new(Database::new(), config),
    };

    if cli.reason {
        let stdout = io::stdout();
        return reason_once(&mut session, cli.json, &mut stdout.lock());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu {
        session,
        input: stdin.lock(),
        output: stdout.lock(),
    }
    .run()
}

/// Read the configuration file if one is given; `-v` can only switch tracing on
fn load_config(path: Option<&Path>, verbose: bool) -> Result<ReasonerConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ReasonerConfig::from_json(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ReasonerConfig::default(),
    };
    Ok(config.with_verbose(verbose || config.verbose))
}

fn reason_once(session: &mut Session, json: bool, out: &mut impl Write) -> Result<()> {
    let report = match session.reason(false) {
        ReasonOutcome::Completed(report) => report,
        ReasonOutcome::AlreadyAnalyzed => ReasonReport::default(),
    };
    if json {
        let output = ReasonOutput {
            report,
            database: session.display(),
        };
        serde_json::to_writer_pretty(&mut *out, &output)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", session.display())?;
        writeln!(
            out,
            "\n{} new facts in {} passes",
            report.derived, report.passes
        )?;
    }
    Ok(())
}

/// Interactive loop over a line-based input
struct Menu<R, W> {
    session: Session,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    fn run(&mut self) -> Result<()> {
        while let Some(choice) = self.prompt(MENU)? {
            let keep_going = match choice.parse::<u32>() {
                Ok(1) => self.display(),
                Ok(2) => self.analyze(),
                Ok(3) => self.add_fact(),
                Ok(4) => self.add_rule(),
                Ok(5) => self.delete_fact(),
                Ok(6) => self.delete_rule(),
                Ok(7) => self.reset(),
                Ok(8) => self.load(),
                Ok(9) => self.save(),
                Ok(10) => return Ok(()),
                _ => self.say("\nInvalid Input\nTry Again\n"),
            }?;
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Print `text` and read one trimmed line; `None` at end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask a yes/no question, `1` meaning yes
    fn confirm(&mut self, text: &str) -> Result<Option<bool>> {
        Ok(self.prompt(text)?.map(|answer| answer == "1"))
    }

    fn say(&mut self, text: &str) -> Result<bool> {
        writeln!(self.output, "{text}")?;
        Ok(true)
    }

    fn report(&mut self, outcome: dedlog::Result<()>, success: &str) -> Result<bool> {
        match outcome {
            Ok(()) => self.say(success),
            Err(err) => {
                log::debug!("menu operation failed: {err:?}");
                self.say(&format!("\nError: {err}\n"))
            }
        }
    }

    fn display(&mut self) -> Result<bool> {
        let text = self.session.display().to_string();
        self.say(&text)
    }

    fn analyze(&mut self) -> Result<bool> {
        if self.session.is_analyzed() {
            return self.say("\nCurrent database has already been analyzed.\n");
        }
        let Some(steps) = self.confirm("\nShow Steps?\n1\tyes\nother\tno\n:")? else {
            return Ok(false);
        };
        self.say("\nStarting Reasoner\n")?;
        match self.session.reason(steps) {
            ReasonOutcome::Completed(report) => self.say(&format!(
                "Reasoner Done: {} new facts in {} passes\n",
                report.derived, report.passes
            )),
            ReasonOutcome::AlreadyAnalyzed => {
                self.say("\nCurrent database has already been analyzed.\n")
            }
        }
    }

    /// Read predicate name, arity and terms; `None` at end of input
    fn read_atom(&mut self, ground: bool) -> Result<Option<dedlog::Result<Atom>>> {
        let Some(name) = self.prompt("\nPredicate Name:\t")? else {
            return Ok(None);
        };
        let Some(arity) = self.prompt("Predicate Arity:\t")? else {
            return Ok(None);
        };
        let count = match parse_arity(&arity) {
            Ok(count) => count,
            Err(err) => return Ok(Some(Err(err))),
        };
        let mut tokens = Vec::new();
        for pos in 1..=count {
            let Some(token) = self.prompt(&format!("Term {pos}:\t"))? else {
                return Ok(None);
            };
            tokens.push(token);
        }
        Ok(Some(build_atom(&name, &arity, &tokens, ground)))
    }

    fn add_fact(&mut self) -> Result<bool> {
        let Some(new) = self.confirm("\nAdd new fact or re-add deleted fact?\n1\tnew\nother\told\n:")?
        else {
            return Ok(false);
        };
        if !new {
            let listed: Vec<String> = self
                .session
                .deleted_facts()
                .map(|fact| fact.atom.to_string())
                .collect();
            let Some(choice) = self.choose("Add Which Fact?", &listed)? else {
                return Ok(true);
            };
            let outcome = self.session.restore_fact(choice);
            return self.report(outcome, "\nFact restored\n");
        }

        let outcome = match self.read_atom(true)? {
            Some(atom) => atom.and_then(|atom| self.session.add_fact(atom)),
            None => return Ok(false),
        };
        self.report(outcome, "\nFact added\n")
    }

    fn add_rule(&mut self) -> Result<bool> {
        let Some(new) = self.confirm("\nAdd new rule or re-add deleted rule?\n1\tnew\nother\told\n:")?
        else {
            return Ok(false);
        };
        if !new {
            let listed: Vec<String> = self.session.deleted_rules().map(ToString::to_string).collect();
            let Some(choice) = self.choose("Add Which Rule?", &listed)? else {
                return Ok(true);
            };
            let outcome = self.session.restore_rule(choice);
            return self.report(outcome, "\nRule restored\n");
        }

        self.say("\nFirst add predicates in body")?;
        let mut body = Vec::new();
        loop {
            match self.read_atom(false)? {
                Some(Ok(atom)) => body.push(atom),
                Some(Err(err)) => return self.report(Err(err), ""),
                None => return Ok(false),
            }
            match self.confirm("\nAdd another predicate to body?\n1\tyes\nother\tno\n:")? {
                Some(true) => {}
                Some(false) => break,
                None => return Ok(false),
            }
        }

        self.say("\nNow input predicate for head.")?;
        let outcome = match self.read_atom(false)? {
            Some(head) => head.and_then(|head| self.session.add_rule(head, body)),
            None => return Ok(false),
        };
        self.report(outcome, "\nRule added\n")
    }

    fn delete_fact(&mut self) -> Result<bool> {
        let listed: Vec<String> = self
            .session
            .active_facts()
            .map(|fact| fact.atom.to_string())
            .collect();
        let Some(choice) = self.choose("Delete Which Fact?", &listed)? else {
            return Ok(true);
        };
        let outcome = self.session.delete_fact(choice);
        self.report(outcome, "\nFact deleted\n")
    }

    fn delete_rule(&mut self) -> Result<bool> {
        let listed: Vec<String> = self.session.active_rules().map(ToString::to_string).collect();
        let Some(choice) = self.choose("Delete Which Rule?", &listed)? else {
            return Ok(true);
        };
        let outcome = self.session.delete_rule(choice);
        self.report(outcome, "\nRule deleted\n")
    }

    /// List `items` 1-based and return the 0-based choice, `None` to go back
    fn choose(&mut self, title: &str, items: &[String]) -> Result<Option<usize>> {
        let mut menu = format!("\n{title}\n");
        for (pos, item) in items.iter().enumerate() {
            menu.push_str(&format!("{}\t{item}\n", pos + 1));
        }
        menu.push_str("other\tGo Back\nChoice\n:");

        let choice = self.prompt(&menu)?;
        Ok(choice
            .and_then(|choice| choice.parse::<usize>().ok())
            .filter(|choice| (1..=items.len()).contains(choice))
            .map(|choice| choice - 1))
    }

    fn reset(&mut self) -> Result<bool> {
        self.session.reset();
        self.say("\nDatabase Reset To Initial State\n")
    }

    fn load(&mut self) -> Result<bool> {
        let Some(name) = self.prompt("\nEnter Filename\n:")? else {
            return Ok(false);
        };
        let outcome = self.session.load(&name);
        self.report(outcome, "\nSuccess!\n")
    }

    fn save(&mut self) -> Result<bool> {
        let current = self.session.source().map(|path| path.display().to_string());
        let text = match &current {
            Some(path) => format!("\nInput file name (empty to overwrite {path})\n:"),
            None => "\nInput new file name\n:".to_string(),
        };
        let Some(name) = self.prompt(&text)? else {
            return Ok(false);
        };

        let path = match (name.is_empty(), current) {
            (true, Some(current)) => PathBuf::from(current),
            (true, None) => return self.say("\nNo file name given\n"),
            (false, _) => PathBuf::from(name),
        };
        if path.exists() && Some(path.as_path()) != self.session.source() {
            let question = "\nThat file already exists.\nSure you want to overwrite?\n1\tyes\nother\tno\n:";
            match self.confirm(question)? {
                Some(true) => {}
                Some(false) => return Ok(true),
                None => return Ok(false),
            }
        }

        let outcome = self.session.save(&path);
        self.report(outcome, "\nSuccess!\n")
    }
}
