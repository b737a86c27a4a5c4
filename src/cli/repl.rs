use crate::cli::theme;
use crate::console::{ConsoleError, ConsoleIo, ConsoleSession, ExecOutcome, StdinInterrupt};
use crate::trace::SessionTrace;
use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const PRIMARY_PROMPT: &str = ">>> ";
const CONTINUATION_PROMPT: &str = "... ";

pub struct AppState {
    pub session: ConsoleSession,
    pub trace: SessionTrace,
    pub show_banner: bool,
    pub startup_message: Option<String>,
}

enum Submission {
    /// The buffered source is still an open construct; keep appending lines.
    NeedMore,
    Done,
}

pub async fn run_repl(state: &mut AppState) -> Result<()> {
    if let Some(message) = &state.startup_message {
        println!("{message}");
    }
    if state.show_banner {
        println!("{}", state.session.banner());
    }

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() {
            PRIMARY_PROMPT
        } else {
            CONTINUATION_PROMPT
        };
        print!("{}", theme::prompt(prompt));
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);

        if buffer.is_empty() {
            if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
        } else {
            buffer.push('\n');
        }
        buffer.push_str(line);

        state.trace.log_input(line);
        match submit(state, &buffer).await? {
            Submission::NeedMore => {}
            Submission::Done => buffer.clear(),
        }
    }

    Ok(())
}

async fn submit(state: &AppState, source: &str) -> Result<Submission> {
    let io = console_io(&state.trace);
    let accepted = {
        let trace = state.trace.clone();
        move || trace.log_system("chunk accepted")
    };

    match state.session.check_and_execute(source, io, accepted).await {
        Ok(ExecOutcome::Incomplete) => Ok(Submission::NeedMore),
        Ok(ExecOutcome::Value(None)) => Ok(Submission::Done),
        Ok(ExecOutcome::Value(Some(rendered))) => {
            state.trace.log_value(&rendered);
            println!("{rendered}");
            Ok(Submission::Done)
        }
        Err(ConsoleError::Syntax(diagnostic)) => {
            state.trace.log_stderr(&diagnostic);
            eprint!("{}", theme::error(&diagnostic));
            Ok(Submission::Done)
        }
        Err(ConsoleError::Exception(exc)) | Err(ConsoleError::Interrupted(exc)) => {
            state.trace.log_stderr(&exc.traceback);
            eprint!("{}", theme::error(&exc.traceback));
            Ok(Submission::Done)
        }
        Err(err @ ConsoleError::Internal(_)) => Err(err.into()),
    }
}

fn console_io(trace: &SessionTrace) -> ConsoleIo {
    let stdout_trace = trace.clone();
    let stderr_trace = trace.clone();
    ConsoleIo {
        stdin: Arc::new(|_max| {
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                // End of input reads as an empty string, like a closed pipe.
                Ok(0) => Ok(String::new()),
                Ok(_) => Ok(line),
                Err(_) => Err(StdinInterrupt),
            }
        }),
        stdout: Arc::new(move |text| {
            stdout_trace.log_stdout(text);
            print!("{text}");
            let _ = io::stdout().flush();
        }),
        stderr: Arc::new(move |text| {
            stderr_trace.log_stderr(text);
            eprint!("{text}");
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{CONTINUATION_PROMPT, PRIMARY_PROMPT};

    #[test]
    fn prompts_match_the_interactive_interpreter() {
        assert_eq!(PRIMARY_PROMPT, ">>> ");
        assert_eq!(CONTINUATION_PROMPT, "... ");
    }
}
