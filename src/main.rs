use anyhow::Result;
use argh::FromArgs;
use minish::store::FileStore;
use minish::{CycleOutcome, Session};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// An interactive command interpreter with pipelines, redirection, and
/// persistent history and variables.
struct Args {
    #[argh(option)]
    /// directory for the hist and shvar data files (default: the starting directory)
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let mut session = Session::new(Box::new(FileStore::new(data_dir)))?;
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                match session.run_line(&line) {
                    Ok(CycleOutcome::Exit) => break,
                    Ok(CycleOutcome::Continue) => {}
                    Err(err) => eprintln!("minish: {err:#}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                session.finish();
                break;
            }
            Err(err) => {
                eprintln!("minish: {err}");
                session.finish();
                break;
            }
        }
    }
    Ok(())
}
