//! Rewrites a raw input line before it is split into a pipeline: history
//! references (`!<n>`) and variable references (`$NAME`) become literal text.
//!
//! Both rewrites are a single left-to-right pass and never mutate the
//! session state. A reference runs from its sigil to the next whitespace
//! character or end of line, and only counts as a reference when the sigil
//! is immediately followed by an alphanumeric character; a trailing or lone
//! `!`/`$` is left untouched.

use crate::state::ShellState;
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn history_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!([[:alnum:]]\S*)").unwrap())
}

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([[:alnum:]]\S*)").unwrap())
}

/// Replace every `!<token>` with the history entry it names.
///
/// A token that is not all digits, or a 1-based index with no entry, expands
/// to empty text; the returned warnings describe each such token so the
/// caller can surface them without aborting the line.
pub fn expand_history(line: &str, state: &ShellState) -> (String, Vec<String>) {
    let mut warnings = Vec::new();
    let expanded = history_re().replace_all(line, |caps: &Captures| {
        let token = &caps[1];
        match token.parse::<usize>() {
            Ok(index) => match state.history_at(index) {
                Some(cmd) => cmd.to_string(),
                None => {
                    warnings.push(format!("history: command {token} not found"));
                    String::new()
                }
            },
            Err(_) => {
                warnings.push(format!("history: '{token}' is not a valid reference"));
                String::new()
            }
        }
    });
    (expanded.into_owned(), warnings)
}

/// Replace every `$<token>` with the variable's value.
///
/// An undefined variable expands to empty text; this is never an error.
pub fn expand_variables(line: &str, state: &ShellState) -> String {
    variable_re()
        .replace_all(line, |caps: &Captures| {
            state.get_var(&caps[1]).unwrap_or("").to_string()
        })
        .into_owned()
}
