//! Persistence of session state between runs.
//!
//! The interpreter core only needs two operations: hand me the ordered
//! history and the variable mapping at startup, and accept the current pair
//! to persist after each recorded command and at shutdown. The on-disk
//! format belongs entirely to this module.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

/// Storage collaborator for a session's history and variables.
pub trait StateStore {
    /// The persisted history (recorded order) and variable mapping.
    /// A first run with nothing persisted yields empty collections.
    fn load(&self) -> Result<(Vec<String>, HashMap<String, String>)>;

    /// Persist the current history and variables, replacing what was there.
    fn save(&self, history: &[String], vars: &HashMap<String, String>) -> Result<()>;
}

/// File-backed store: a `hist` file with one command per line, and a `shvar`
/// file with one `name value` pair per line, the value running to the end of
/// the line (it may contain spaces).
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join("hist")
    }

    fn vars_path(&self) -> PathBuf {
        self.dir.join("shvar")
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<(Vec<String>, HashMap<String, String>)> {
        let mut history = Vec::new();
        match fs::read_to_string(self.history_path()) {
            Ok(text) => history.extend(text.lines().map(str::to_string)),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading {}", self.history_path().display()));
            }
        }

        let mut vars = HashMap::new();
        match fs::read_to_string(self.vars_path()) {
            Ok(text) => {
                for line in text.lines() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match line.split_once(' ') {
                        Some((name, value)) => {
                            vars.insert(name.to_string(), value.trim().to_string())
                        }
                        None => vars.insert(line.to_string(), String::new()),
                    };
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.vars_path().display()));
            }
        }

        tracing::debug!(
            commands = history.len(),
            vars = vars.len(),
            "loaded persisted state"
        );
        Ok((history, vars))
    }

    fn save(&self, history: &[String], vars: &HashMap<String, String>) -> Result<()> {
        let mut hist_text = String::new();
        for cmd in history {
            let _ = writeln!(hist_text, "{cmd}");
        }
        fs::write(self.history_path(), hist_text)
            .with_context(|| format!("writing {}", self.history_path().display()))?;

        let mut vars_text = String::new();
        for (name, value) in vars {
            let _ = writeln!(vars_text, "{name} {value}");
        }
        fs::write(self.vars_path(), vars_text)
            .with_context(|| format!("writing {}", self.vars_path().display()))?;
        Ok(())
    }
}

/// In-memory store for tests and embedding; `Clone` hands out a shared view
/// of the same underlying data, so a test can keep a handle while the
/// session owns the store.
#[derive(Default, Clone)]
pub struct MemoryStore {
    data: Rc<RefCell<(Vec<String>, HashMap<String, String>)>>,
}

impl MemoryStore {
    pub fn new(history: Vec<String>, vars: HashMap<String, String>) -> Self {
        Self {
            data: Rc::new(RefCell::new((history, vars))),
        }
    }

    /// A copy of the currently persisted data.
    pub fn snapshot(&self) -> (Vec<String>, HashMap<String, String>) {
        self.data.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<(Vec<String>, HashMap<String, String>)> {
        Ok(self.data.borrow().clone())
    }

    fn save(&self, history: &[String], vars: &HashMap<String, String>) -> Result<()> {
        *self.data.borrow_mut() = (history.to_vec(), vars.clone());
        Ok(())
    }
}
