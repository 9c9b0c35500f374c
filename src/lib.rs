//! A small interactive command interpreter.
//!
//! One input line at a time, `minish` expands history (`!<n>`) and variable
//! (`$NAME`) references, splits the line into a `|`-separated pipeline,
//! resolves `<` / `>` / `2>` redirections per stage, and runs each stage as
//! either a built-in operation (`cd`, `pwd`, `history`, `export`) or a
//! spawned external process, chaining standard streams across the pipeline.
//! History and variables persist between sessions through a pluggable store.
//!
//! The main entry point is [`Session`], which owns the shell state and the
//! store and handles one line per call:
//!
//! ```
//! use minish::store::MemoryStore;
//! use minish::Session;
//!
//! let mut session = Session::new(Box::new(MemoryStore::default())).unwrap();
//! let mut out = Vec::new();
//! session.run_line_captured("export GREETING=hello", &mut out).unwrap();
//! session.run_line_captured("export", &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("GREETING=hello"));
//! ```

pub mod builtin;
pub mod executor;
pub mod expand;
pub mod external;
pub mod parser;
pub mod session;
pub mod state;
pub mod store;

pub use session::{CycleOutcome, Session};

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that change the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        match MUTEX.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
