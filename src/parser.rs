//! Splits an expanded input line into pipeline stages and strips redirection
//! tokens out of each stage's argument text.
//!
//! The grammar is deliberately small: stages are separated by `|`, words by
//! whitespace, and a stage may carry one input target (`< file`) and one
//! output target (`> file`, or `2> file` for the error stream). When a stage
//! repeats an operator, the last occurrence wins and earlier ones are left
//! in the argument text.

/// The file a stage's output (or error) stream is redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: String,
    /// True when the target was written `2>`: redirect the error stream
    /// instead of standard output.
    pub stderr: bool,
}

/// One command of a pipeline, bounded by `|` separators.
///
/// Built fresh from one input line and discarded once the stage has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub command: String,
    pub args: Vec<String>,
    /// Input redirection path, if the stage had a `< file`.
    pub input: Option<String>,
    /// Output or error redirection, if the stage had a `> file` / `2> file`.
    pub output: Option<OutputTarget>,
}

/// Split an expanded line on `|` into parsed stages.
///
/// An empty or all-whitespace line yields an empty pipeline (a no-op cycle).
/// An empty stage between two pipes is kept, with an empty command word, so
/// the executor can report it in position.
pub fn parse_pipeline(line: &str) -> Vec<Stage> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split('|').map(parse_stage).collect()
}

/// Parse one stage: first whitespace-delimited token is the command word,
/// the rest is argument text that the redirection scan consumes from.
fn parse_stage(text: &str) -> Stage {
    let text = text.trim();
    let (command, rest) = match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head.to_string(), tail.to_string()),
        None => (text.to_string(), String::new()),
    };

    let mut rest = rest;
    let input = take_redirect(&mut rest, b'<').map(|(path, _)| path);
    let output = take_redirect(&mut rest, b'>').map(|(path, stderr)| OutputTarget { path, stderr });

    Stage {
        command,
        args: rest.split_whitespace().map(str::to_string).collect(),
        input,
        output,
    }
}

/// Find the last occurrence of `op` in `text`, take the whitespace-delimited
/// token after it as the target filename, and remove both from `text`.
///
/// For `>` preceded directly by `2`, the `2` belongs to the operator and is
/// removed with it; the returned flag marks the error stream. An operator
/// with no token after it is stripped without producing a target.
fn take_redirect(text: &mut String, op: u8) -> Option<(String, bool)> {
    let pos = text.rfind(op as char)?;
    let stderr = op == b'>' && pos > 0 && text.as_bytes()[pos - 1] == b'2';
    let start = if stderr { pos - 1 } else { pos };

    let after = &text[pos + 1..];
    let Some(name_off) = after.find(|c: char| !c.is_whitespace()) else {
        text.replace_range(start.., "");
        return None;
    };
    let name_start = pos + 1 + name_off;
    let name_end = text[name_start..]
        .find(char::is_whitespace)
        .map(|off| name_start + off)
        .unwrap_or(text.len());

    let path = text[name_start..name_end].to_string();
    text.replace_range(start..name_end, "");
    Some((path, stderr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(text: &str) -> Stage {
        parse_stage(text)
    }

    #[test]
    fn empty_line_yields_empty_pipeline() {
        assert!(parse_pipeline("").is_empty());
        assert!(parse_pipeline("   \t ").is_empty());
    }

    #[test]
    fn splits_on_pipes_and_trims() {
        let stages = parse_pipeline("cat notes.txt | grep main |  wc -l ");
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].command, "cat");
        assert_eq!(stages[0].args, vec!["notes.txt"]);
        assert_eq!(stages[1].command, "grep");
        assert_eq!(stages[1].args, vec!["main"]);
        assert_eq!(stages[2].command, "wc");
        assert_eq!(stages[2].args, vec!["-l"]);
    }

    #[test]
    fn empty_stage_between_pipes_is_kept() {
        let stages = parse_pipeline("ls || wc");
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[1].command, "");
    }

    #[test]
    fn command_without_args() {
        let s = stage("pwd");
        assert_eq!(s.command, "pwd");
        assert!(s.args.is_empty());
        assert!(s.input.is_none());
        assert!(s.output.is_none());
    }

    #[test]
    fn input_redirection_is_stripped() {
        let s = stage("sort < data.txt -r");
        assert_eq!(s.command, "sort");
        assert_eq!(s.input.as_deref(), Some("data.txt"));
        assert_eq!(s.args, vec!["-r"]);
    }

    #[test]
    fn output_redirection_is_stripped() {
        let s = stage("ls -l > out.txt");
        assert_eq!(s.command, "ls");
        assert_eq!(s.args, vec!["-l"]);
        assert_eq!(
            s.output,
            Some(OutputTarget {
                path: "out.txt".to_string(),
                stderr: false
            })
        );
    }

    #[test]
    fn error_redirection_consumes_the_two() {
        let s = stage("cc main.c 2> errors.log");
        assert_eq!(s.command, "cc");
        assert_eq!(s.args, vec!["main.c"]);
        assert_eq!(
            s.output,
            Some(OutputTarget {
                path: "errors.log".to_string(),
                stderr: true
            })
        );
    }

    #[test]
    fn redirection_without_spaces() {
        let s = stage("ls -a>listing");
        assert_eq!(s.args, vec!["-a"]);
        assert_eq!(s.output.unwrap().path, "listing");
    }

    #[test]
    fn both_directions_in_one_stage() {
        let s = stage("tr a-z A-Z < in.txt > out.txt");
        assert_eq!(s.command, "tr");
        assert_eq!(s.args, vec!["a-z", "A-Z"]);
        assert_eq!(s.input.as_deref(), Some("in.txt"));
        assert_eq!(s.output.unwrap().path, "out.txt");
    }

    #[test]
    fn last_redirection_of_a_kind_wins() {
        let s = stage("ls > first > second");
        assert_eq!(s.output.unwrap().path, "second");
        // The earlier operator stays behind as ordinary argument text.
        assert_eq!(s.args, vec![">", "first"]);
    }

    #[test]
    fn operator_with_no_filename_is_dropped() {
        let s = stage("ls -l >");
        assert_eq!(s.args, vec!["-l"]);
        assert!(s.output.is_none());
    }

    #[test]
    fn digit_before_operator_inside_word_marks_stderr() {
        // `12>` ends in the two-character operator; the `1` stays an argument.
        let s = stage("cmd 12> log");
        assert_eq!(s.args, vec!["1"]);
        let target = s.output.unwrap();
        assert!(target.stderr);
        assert_eq!(target.path, "log");
    }
}
