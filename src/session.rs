//! One interactive session: expansion, pipeline execution, history
//! recording and persistence, driven one line at a time by the input loop.

use crate::executor::{self, PipelineOut};
use crate::parser;
use crate::state::ShellState;
use crate::store::StateStore;
use crate::{builtin::ExitCode, expand};
use anyhow::Result;

/// What the input loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Continue,
    Exit,
}

/// A running interpreter session.
///
/// Owns the [`ShellState`] and the storage collaborator; the state is
/// mutated only by built-in operations and the recorder, and persisted
/// after every recorded command.
pub struct Session {
    state: ShellState,
    store: Box<dyn StateStore>,
}

impl Session {
    /// Start a session from whatever the store has persisted.
    pub fn new(store: Box<dyn StateStore>) -> Result<Self> {
        let (history, vars) = store.load()?;
        Ok(Self {
            state: ShellState::with_data(history, vars),
            store,
        })
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Handle one input line end to end, with output on the session console.
    pub fn run_line(&mut self, line: &str) -> Result<CycleOutcome> {
        self.run_line_inner(line, PipelineOut::Inherit)
    }

    /// Handle one input line with the terminal stage's output collected into
    /// `out` instead of the console.
    pub fn run_line_captured(&mut self, line: &str, out: &mut Vec<u8>) -> Result<CycleOutcome> {
        self.run_line_inner(line, PipelineOut::Capture(out))
    }

    fn run_line_inner(&mut self, line: &str, out: PipelineOut) -> Result<CycleOutcome> {
        let line = line.trim();
        if line == "exit" {
            self.state.record(line);
            self.state.should_exit = true;
            self.persist();
            return Ok(CycleOutcome::Exit);
        }

        let (line, warnings) = expand::expand_history(line, &self.state);
        for warning in &warnings {
            eprintln!("minish: {warning}");
        }
        // History keeps the recalled text, but not variable values.
        let recorded = line.trim().to_string();

        let line = expand::expand_variables(&line, &self.state);
        let stages = parser::parse_pipeline(&line);
        let code: ExitCode = executor::run_pipeline(&stages, &mut self.state, out)?;
        tracing::debug!(stages = stages.len(), code, "cycle finished");

        if !recorded.is_empty() {
            self.state.record(recorded);
            self.persist();
        }
        Ok(CycleOutcome::Continue)
    }

    /// End the session the way `exit` does, without recording a line; used
    /// when the input stream ends.
    pub fn finish(&mut self) {
        self.state.should_exit = true;
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.state.history, &self.state.vars) {
            tracing::warn!(error = %err, "could not persist session state");
            eprintln!("minish: cannot write data files: {err:#}");
        }
    }
}
