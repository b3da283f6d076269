use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::models::SelectedFile;
use crate::report;
use crate::session::{AnalysisSession, SubmitOutcome};
use crate::state::AnalysisRequestState;
use crate::transport::AnalysisTransport;

const HELP: &str = "\
commands:
  select <path>   choose the file to analyze
  clear           drop the current selection
  submit          send the selected file for analysis
  status          show the selection and request state
  show            render the last result
  copy            copy the last result to the clipboard as JSON
  help            show this list
  quit            leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Select(PathBuf),
    Clear,
    Submit,
    Status,
    Show,
    Copy,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "select" if rest.is_empty() => return Err("usage: select <path>".to_string()),
        "select" => ShellCommand::Select(PathBuf::from(rest)),
        "clear" => ShellCommand::Clear,
        "submit" => ShellCommand::Submit,
        "status" => ShellCommand::Status,
        "show" => ShellCommand::Show,
        "copy" => ShellCommand::Copy,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(Some(command))
}

pub fn describe_state(state: &AnalysisRequestState) -> String {
    match state {
        AnalysisRequestState::Idle => "idle".to_string(),
        AnalysisRequestState::Pending => "analyzing...".to_string(),
        AnalysisRequestState::Succeeded(result) => format!(
            "done: {} users, {} eligible",
            result.summary.total_users, result.summary.eligible_users
        ),
        AnalysisRequestState::Failed(message) => format!("failed: {message}"),
    }
}

type InFlight<'a> = Pin<Box<dyn Future<Output = SubmitOutcome> + 'a>>;

pub async fn run<T: AnalysisTransport>(
    session: &AnalysisSession<T>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    run_with(session, stdin, &mut std::io::stdout(), limit).await
}

/// Reads commands while a submission is in flight, so the selection can
/// change under a pending request.
pub async fn run_with<T, R, W>(
    session: &AnalysisSession<T>,
    input: R,
    out: &mut W,
    limit: Option<usize>,
) -> anyhow::Result<()>
where
    T: AnalysisTransport,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{HELP}")?;
    let mut lines = input.lines();
    let mut in_flight: Option<InFlight<'_>> = None;

    loop {
        tokio::select! {
            outcome = next_outcome(&mut in_flight) => {
                in_flight = None;
                write_outcome(out, outcome, limit)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Input closed: let the pending request finish before leaving.
                    if let Some(submission) = in_flight.take() {
                        write_outcome(out, submission.await, limit)?;
                    }
                    break;
                };
                if !execute_line(session, &line, &mut in_flight, out, limit).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn next_outcome(in_flight: &mut Option<InFlight<'_>>) -> SubmitOutcome {
    match in_flight {
        Some(submission) => submission.await,
        None => std::future::pending().await,
    }
}

fn write_outcome<W: Write>(
    out: &mut W,
    outcome: SubmitOutcome,
    limit: Option<usize>,
) -> std::io::Result<()> {
    match outcome {
        SubmitOutcome::Resolved(AnalysisRequestState::Succeeded(result)) => {
            write!(out, "{}", report::render_terminal(&result, limit))
        }
        SubmitOutcome::Resolved(state) => writeln!(out, "{}", describe_state(&state)),
        SubmitOutcome::Ignored => writeln!(out, "A request is already in flight."),
        SubmitOutcome::Superseded => {
            writeln!(out, "Discarded a result for a selection that has since changed.")
        }
        SubmitOutcome::NoSelection => Ok(()),
    }
}

/// Returns false when the shell should stop.
async fn execute_line<'a, T, W>(
    session: &'a AnalysisSession<T>,
    line: &str,
    in_flight: &mut Option<InFlight<'a>>,
    out: &mut W,
    limit: Option<usize>,
) -> anyhow::Result<bool>
where
    T: AnalysisTransport,
    W: Write,
{
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(true),
        Err(message) => {
            eprintln!("{message}");
            return Ok(true);
        }
    };

    match command {
        ShellCommand::Select(path) => match SelectedFile::from_path(&path) {
            Ok(file) => {
                writeln!(out, "Selected: {}", file.name)?;
                session.select_file(Some(file));
            }
            Err(err) => eprintln!("{err:#}"),
        },
        ShellCommand::Clear => {
            session.select_file(None);
            writeln!(out, "Selection cleared.")?;
        }
        ShellCommand::Submit => {
            if session.current_state().is_pending() {
                write_outcome(out, session.submit().await, limit)?;
            } else {
                // Anything still in flight here was superseded by a selection change.
                *in_flight = Some(Box::pin(session.submit()));
                if session.current_selection().is_some() {
                    writeln!(out, "Analyzing...")?;
                }
            }
        }
        ShellCommand::Status => {
            let selection = session
                .current_selection()
                .map(|file| file.name)
                .unwrap_or_else(|| "<none>".to_string());
            writeln!(out, "file: {selection}")?;
            writeln!(out, "state: {}", describe_state(&session.current_state()))?;
        }
        ShellCommand::Show => match session.current_state() {
            AnalysisRequestState::Succeeded(result) => {
                write!(out, "{}", report::render_terminal(&result, limit))?;
            }
            other => writeln!(out, "{}", describe_state(&other))?,
        },
        ShellCommand::Copy => {
            session.copy_result_to_clipboard();
        }
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(false),
    }

    Ok(true)
}
