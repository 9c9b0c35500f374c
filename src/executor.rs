//! The process orchestrator: turns a parsed pipeline into a connected chain
//! of running stages and collects their results in order.
//!
//! Each stage goes through the same sequence: open its redirection targets,
//! resolve its three effective streams (input from the previous stage's pipe
//! unless redirected, output to the next stage's pipe unless redirected or
//! last, error to its own target or the session's), then either run a
//! built-in synchronously or spawn an external process. Spawned children are
//! waited on in stage order only after the whole chain is connected, so
//! neighbouring externals overlap through live pipes.
//!
//! Descriptors are scoped handles (`File`, `ChildStdout`, child pipes) whose
//! drop closes them, which is what keeps the close-exactly-once rule intact
//! on every path out of a stage, including skips and spawn failures.

use crate::builtin::{self, ExitCode};
use crate::external;
use crate::parser::Stage;
use crate::state::ShellState;
use anyhow::Result;
use std::fs::File;
use std::io::{Read, Write};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

/// Where a stage reads from.
///
/// `Bytes` carries in-process data (a mid-pipeline built-in's output, or the
/// deliberately empty input after a skipped or redirected-away stage) into
/// the next child's stdin.
enum StageInput {
    Inherit,
    File(File),
    Pipe(ChildStdout),
    Bytes(Vec<u8>),
}

/// Where the pipeline's terminal output goes: the session's stdout, or a
/// buffer standing in for it. The buffer is the substitution seam tests use
/// in place of a live console.
pub enum PipelineOut<'a> {
    Inherit,
    Capture(&'a mut Vec<u8>),
}

/// Execute a whole pipeline and return the last stage's exit code.
///
/// Per-stage failures (unknown command, unopenable redirection target, spawn
/// failure) are reported and skip that stage only; the cycle always runs to
/// completion of every remaining stage.
pub fn run_pipeline(
    stages: &[Stage],
    state: &mut ShellState,
    mut out: PipelineOut,
) -> Result<ExitCode> {
    if stages.is_empty() {
        return Ok(0);
    }

    let capturing = matches!(out, PipelineOut::Capture(_));
    let last = stages.len() - 1;
    let mut input = StageInput::Inherit;
    // (reached the end of the pipeline, child) in stage order.
    let mut children: Vec<(bool, Child)> = Vec::new();
    let mut tail: Option<ChildStdout> = None;
    let mut last_code: ExitCode = 0;

    for (i, stage) in stages.iter().enumerate() {
        let is_last = i == last;
        let carried = std::mem::replace(&mut input, StageInput::Inherit);

        // Connect: a stage's own redirection overrides the carried pipe end,
        // which drops (closes) here in that case.
        let mut eff_input = carried;
        if let Some(path) = &stage.input {
            match File::open(path) {
                Ok(f) => eff_input = StageInput::File(f),
                Err(err) => eprintln!("minish: cannot open {path}: {err}"),
            }
        }
        let mut out_file: Option<File> = None;
        let mut err_file: Option<File> = None;
        if let Some(target) = &stage.output {
            match File::create(&target.path) {
                Ok(f) => {
                    if target.stderr {
                        err_file = Some(f);
                    } else {
                        out_file = Some(f);
                    }
                }
                Err(err) => eprintln!("minish: cannot write {}: {err}", target.path),
            }
        }

        if stage.command.is_empty() {
            eprintln!("minish: empty command in pipeline");
            if !is_last {
                input = StageInput::Bytes(Vec::new());
            }
            continue;
        }

        if builtin::is_builtin(&stage.command) {
            // Built-ins never read piped input; close the carried end now so
            // an upstream writer sees EOF instead of a stalled reader.
            drop(eff_input);
            let args: Vec<&str> = stage.args.iter().map(String::as_str).collect();
            let code = if let Some(mut f) = out_file {
                builtin::run(&stage.command, &args, &mut f, state)
            } else if !is_last {
                let mut buf = Vec::new();
                let code = builtin::run(&stage.command, &args, &mut buf, state);
                input = StageInput::Bytes(buf);
                code
            } else {
                match &mut out {
                    PipelineOut::Capture(buf) => builtin::run(&stage.command, &args, &mut **buf, state),
                    PipelineOut::Inherit => {
                        let stdout = std::io::stdout();
                        let mut lock = stdout.lock();
                        let code = builtin::run(&stage.command, &args, &mut lock, state);
                        let _ = lock.flush();
                        code
                    }
                }
            };
            if is_last {
                last_code = code;
            } else if matches!(input, StageInput::Inherit) {
                // Output went to a file; the next stage reads EOF.
                input = StageInput::Bytes(Vec::new());
            }
            continue;
        }

        let Some(program) = external::find_program(&stage.command, state) else {
            eprintln!("minish: command not found: {}", stage.command);
            if !is_last {
                input = StageInput::Bytes(Vec::new());
            }
            continue;
        };
        tracing::debug!(command = %stage.command, program = %program.display(), "spawning stage");

        let mut cmd = Command::new(&program);
        cmd.args(&stage.args)
            .env_clear()
            .envs(state.vars.iter())
            .current_dir(&state.current_dir);

        let mut feed: Option<Vec<u8>> = None;
        match eff_input {
            StageInput::Inherit => {
                cmd.stdin(Stdio::inherit());
            }
            StageInput::File(f) => {
                cmd.stdin(Stdio::from(f));
            }
            StageInput::Pipe(p) => {
                cmd.stdin(Stdio::from(p));
            }
            StageInput::Bytes(bytes) => {
                cmd.stdin(Stdio::piped());
                feed = Some(bytes);
            }
        }

        let piped_out = out_file.is_none() && (!is_last || capturing);
        if let Some(f) = out_file {
            cmd.stdout(Stdio::from(f));
        } else if piped_out {
            cmd.stdout(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
        }
        match err_file {
            Some(f) => cmd.stderr(Stdio::from(f)),
            None => cmd.stderr(Stdio::inherit()),
        };

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                eprintln!("minish: could not execute {}: {err}", stage.command);
                if !is_last {
                    input = StageInput::Bytes(Vec::new());
                }
                continue;
            }
        };

        if let Some(bytes) = feed {
            if let Some(mut child_stdin) = child.stdin.take() {
                // A child that exits early closes its end; a broken pipe here
                // is that child's business, not ours.
                let _ = child_stdin.write_all(&bytes);
            }
        }

        if piped_out {
            let read_end = child.stdout.take();
            if is_last {
                tail = read_end;
            } else {
                input = match read_end {
                    Some(p) => StageInput::Pipe(p),
                    None => StageInput::Bytes(Vec::new()),
                };
            }
        } else if !is_last {
            // Output redirected away from the pipeline: the next stage must
            // not receive this stage's data.
            input = StageInput::Bytes(Vec::new());
        }
        children.push((is_last, child));
    }

    // Collect: drain the terminal pipe before waiting so a long chain cannot
    // block on a full buffer, then wait for every child in stage order.
    if let PipelineOut::Capture(buf) = out {
        if let Some(mut read_end) = tail {
            read_end.read_to_end(buf)?;
        }
    }
    for (ends_pipeline, mut child) in children {
        match child.wait() {
            Ok(status) => {
                let code = status.code().unwrap_or_else(|| abnormal_exit_code(&status));
                if ends_pipeline {
                    last_code = code;
                }
            }
            Err(err) => {
                eprintln!("minish: wait failed: {err}");
                if ends_pipeline {
                    last_code = -1;
                }
            }
        }
    }
    Ok(last_code)
}

#[cfg(unix)]
fn abnormal_exit_code(status: &ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn abnormal_exit_code(_status: &ExitStatus) -> ExitCode {
    -1
}
