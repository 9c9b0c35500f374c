//! Built-in operations and the classifier that routes stages to them.
//!
//! Built-ins are parsed with the [`argh`] crate (`FromArgs`) and run directly
//! on the orchestrator's thread against a resolved output writer. They never
//! read piped input; only their arguments and the session state matter.

use crate::state::ShellState;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Conventional process exit code: 0 for success, non-zero for failure.
pub type ExitCode = i32;

/// Whether a command word names a built-in operation.
///
/// A word starting with `!` classifies as built-in defensively: the expander
/// resolves history references before stages are built, so one reaching
/// execution is a leftover that must not be spawned as a program.
pub fn is_builtin(word: &str) -> bool {
    matches!(word, "cd" | "pwd" | "history" | "export") || word.starts_with('!')
}

/// A built-in command known to the interpreter at compile time.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name, e.g. "cd" or "export".
    fn name() -> &'static str;

    /// Execute against the resolved output writer and the session state.
    ///
    /// User-level failures (bad argument, bad path) report themselves and
    /// return a non-zero code; `Err` is reserved for I/O on `out`.
    fn execute(self, out: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode>;
}

fn dispatch<T: BuiltinCommand>(args: &[&str], out: &mut dyn Write, state: &mut ShellState) -> ExitCode {
    match T::from_args(&[T::name()], args) {
        Ok(cmd) => match cmd.execute(out, state) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("{}: {err:#}", T::name());
                1
            }
        },
        // argh routes both --help output and usage errors through EarlyExit.
        Err(EarlyExit { output, status }) => {
            if status.is_err() {
                eprintln!("{output}");
                1
            } else {
                let _ = writeln!(out, "{output}");
                0
            }
        }
    }
}

/// Run the named built-in. The caller has already classified `name` with
/// [`is_builtin`].
pub fn run(name: &str, args: &[&str], out: &mut dyn Write, state: &mut ShellState) -> ExitCode {
    match name {
        "cd" => dispatch::<Cd>(args, out, state),
        "pwd" => dispatch::<Pwd>(args, out, state),
        "history" => dispatch::<History>(args, out, state),
        "export" => dispatch::<Export>(args, out, state),
        _ => {
            eprintln!("minish: unresolved history reference: {name}");
            1
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to, absolute or relative to the current directory
    pub path: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _out: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        let Some(path) = self.path.filter(|p| !p.is_empty()) else {
            eprintln!("cd: missing path operand");
            return Ok(1);
        };
        let target = PathBuf::from(&path);
        let target = if target.is_absolute() {
            target
        } else {
            state.current_dir.join(target)
        };
        let canonical = match fs::canonicalize(&target) {
            Ok(dir) => dir,
            Err(err) => {
                eprintln!("cd: {path}: {err}");
                return Ok(1);
            }
        };
        std::env::set_current_dir(&canonical)
            .with_context(|| format!("cannot enter {}", canonical.display()))?;
        state.set_current_dir(canonical);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the current working directory.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, out: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        writeln!(out, "{}", state.current_dir.display())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List recorded commands, oldest first, with 1-based indices.
pub struct History {}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, out: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        for (i, cmd) in state.history.iter().enumerate() {
            writeln!(out, "{} {}", i + 1, cmd)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Set or list shell variables. `export NAME=VALUE` appends `:VALUE` when
/// NAME is already set and non-empty.
pub struct Export {
    #[argh(positional)]
    /// assignment of the form NAME=VALUE; lists every variable when omitted
    pub assignment: Option<String>,
}

impl BuiltinCommand for Export {
    fn name() -> &'static str {
        "export"
    }

    fn execute(self, out: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        let Some(raw) = self.assignment else {
            for (name, value) in &state.vars {
                writeln!(out, "{name}={value}")?;
            }
            return Ok(0);
        };
        match parse_assignment(raw.trim()) {
            Ok((name, value)) => {
                state.export_var(name, value);
                Ok(0)
            }
            Err(_) => {
                eprintln!("export: expected NAME=VALUE, got '{raw}'");
                Ok(1)
            }
        }
    }
}

/// Why an `export` argument failed to parse as an assignment.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AssignmentError {
    MissingSeparator,
    EmptyName,
    EmptyValue,
}

/// Split `NAME=VALUE`. Name and value must both be non-empty.
fn parse_assignment(raw: &str) -> std::result::Result<(String, String), AssignmentError> {
    let (name, value) = raw.split_once('=').ok_or(AssignmentError::MissingSeparator)?;
    if name.is_empty() {
        return Err(AssignmentError::EmptyName);
    }
    if value.is_empty() {
        return Err(AssignmentError::EmptyValue);
    }
    Ok((name.to_string(), value.to_string()))
}
