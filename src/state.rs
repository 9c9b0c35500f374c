use std::collections::HashMap;
use std::path::PathBuf;

/// Mutable state of one interpreter session.
///
/// The state contains:
/// - `vars`: the shell variable mapping, visible to executed commands.
/// - `current_dir`: the working directory for command execution.
/// - `history`: every recorded command line, in order, append-only.
/// - `should_exit`: a flag the input loop checks to know when to terminate.
///
/// Two entries of `vars` are maintained as invariants: `PATH` always exists
/// (possibly empty), and `PWD` mirrors `current_dir` after construction and
/// after every successful directory change.
#[derive(Debug, Clone)]
pub struct ShellState {
    /// Shell variables (e.g. PATH, PWD), exported to child processes.
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Recorded command lines, oldest first.
    pub history: Vec<String>,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl ShellState {
    /// An empty session state: no history, no variables beyond the invariants.
    pub fn new() -> Self {
        Self::with_data(Vec::new(), HashMap::new())
    }

    /// Build a state from persisted history and variables.
    ///
    /// `current_dir` is taken from the running process, and a stale persisted
    /// `PWD` is overwritten with it. A missing `PATH` entry is created empty;
    /// external commands stay unreachable until one is exported.
    pub fn with_data(history: Vec<String>, vars: HashMap<String, String>) -> Self {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut state = Self {
            vars,
            current_dir,
            history,
            should_exit: false,
        };
        state.vars.entry("PATH".to_string()).or_default();
        state
            .vars
            .insert("PWD".to_string(), state.current_dir.to_string_lossy().into_owned());
        state
    }

    /// Look up a shell variable.
    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Set or overwrite a shell variable.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Export a variable with the path-list convention: an unset name is set,
    /// a set-and-non-empty name gets `:value` appended, a set-but-empty name
    /// is replaced.
    pub fn export_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.vars.get_mut(&name) {
            Some(existing) if !existing.is_empty() => {
                existing.push(':');
                existing.push_str(&value);
            }
            Some(existing) => *existing = value,
            None => {
                self.vars.insert(name, value);
            }
        }
    }

    /// Append a command line to the session history.
    pub fn record(&mut self, line: impl Into<String>) {
        self.history.push(line.into());
    }

    /// The history entry at a 1-based position, if any.
    pub fn history_at(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.history.get(i))
            .map(String::as_str)
    }

    /// Record a successful directory change, keeping `PWD` in step.
    pub fn set_current_dir(&mut self, dir: PathBuf) {
        self.vars
            .insert("PWD".to_string(), dir.to_string_lossy().into_owned());
        self.current_dir = dir;
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_entries_exist() {
        let state = ShellState::new();
        assert_eq!(state.get_var("PATH"), Some(""));
        assert_eq!(
            state.get_var("PWD"),
            Some(state.current_dir.to_string_lossy().as_ref())
        );
    }

    #[test]
    fn persisted_pwd_is_overwritten() {
        let mut vars = HashMap::new();
        vars.insert("PWD".to_string(), "/stale/path".to_string());
        let state = ShellState::with_data(Vec::new(), vars);
        assert_eq!(
            state.get_var("PWD"),
            Some(state.current_dir.to_string_lossy().as_ref())
        );
    }

    #[test]
    fn export_sets_then_appends() {
        let mut state = ShellState::new();
        state.export_var("MANPATH", "/bin");
        assert_eq!(state.get_var("MANPATH"), Some("/bin"));
        state.export_var("MANPATH", "/usr/bin");
        assert_eq!(state.get_var("MANPATH"), Some("/bin:/usr/bin"));
    }

    #[test]
    fn export_replaces_empty_value() {
        let mut state = ShellState::new();
        state.set_var("EMPTY", "");
        state.export_var("EMPTY", "/opt");
        assert_eq!(state.get_var("EMPTY"), Some("/opt"));
    }

    #[test]
    fn history_at_is_one_based() {
        let mut state = ShellState::new();
        state.record("ls -l");
        state.record("pwd");
        assert_eq!(state.history_at(1), Some("ls -l"));
        assert_eq!(state.history_at(2), Some("pwd"));
        assert_eq!(state.history_at(0), None);
        assert_eq!(state.history_at(3), None);
    }

    #[test]
    fn set_current_dir_updates_pwd() {
        let mut state = ShellState::new();
        state.set_current_dir(PathBuf::from("/somewhere"));
        assert_eq!(state.get_var("PWD"), Some("/somewhere"));
        assert_eq!(state.current_dir, PathBuf::from("/somewhere"));
    }
}
