//! Resolution of command words to executable paths.
//!
//! The search behaves the way a typical shell's lookup does, except that the
//! search path comes from the session's own `PATH` variable rather than the
//! process environment:
//! - an absolute path resolves to itself if it exists;
//! - a word containing a separator resolves relative to the session's
//!   working directory;
//! - a bare word is searched for in each `PATH` directory in order.

use crate::state::ShellState;
use std::path::{Path, PathBuf};

/// Resolve `name` to the executable the orchestrator should spawn.
///
/// Returns `None` when nothing matches; the caller reports the stage as
/// "command not found" and skips it.
pub fn find_program(name: &str, state: &ShellState) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let path = Path::new(name);
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    if name.contains('/') {
        let candidate = state.current_dir.join(path);
        return candidate.exists().then_some(candidate);
    }

    let search = state.get_var("PATH").unwrap_or("");
    for dir in std::env::split_paths(search) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_path(search: &str) -> ShellState {
        let mut state = ShellState::new();
        state.set_var("PATH", search);
        state
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_path_resolves_to_itself() {
        let state = state_with_path("/bin");
        let found = find_program("/bin/sh", &state).expect("/bin/sh should exist");
        assert_eq!(found, PathBuf::from("/bin/sh"));
    }

    #[test]
    #[cfg(unix)]
    fn absolute_missing_path_is_none() {
        let state = state_with_path("/bin");
        assert!(find_program("/bin/no-such-program", &state).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn bare_word_is_searched_in_path_order() {
        let state = state_with_path("/nonexistent-dir:/bin");
        let found = find_program("sh", &state).expect("sh should be found via PATH");
        assert!(found.starts_with("/bin"));
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn bare_word_missing_from_path_is_none() {
        let state = state_with_path("/bin");
        assert!(find_program("definitely-not-a-command", &state).is_none());
    }

    #[test]
    fn empty_path_variable_finds_nothing() {
        let state = state_with_path("");
        assert!(find_program("sh", &state).is_none());
    }

    #[test]
    fn empty_name_is_none() {
        let state = state_with_path("/bin");
        assert!(find_program("", &state).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn word_with_separator_resolves_against_working_directory() {
        let mut state = state_with_path("/does/not/matter");
        state.current_dir = PathBuf::from("/");
        let found = find_program("bin/sh", &state).expect("bin/sh relative to /");
        assert_eq!(found, PathBuf::from("/bin/sh"));
    }
}
