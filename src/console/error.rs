use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound on the rendered form of a result value, in characters.
/// Longer reprs are elided in the middle with `...`.
pub const REPR_MAX_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub exc_type: String,
    pub message: String,
    pub traceback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// The chunk can never become valid source; carries the formatted
    /// diagnostic. User code was not executed.
    Syntax(String),
    /// A fault raised while executing body or tail, after stream restoration.
    Exception(ExceptionInfo),
    /// An uncaught KeyboardInterrupt from a cancelled stdin read.
    Interrupted(ExceptionInfo),
    /// Host-side plumbing failure, not a user-code fault.
    Internal(String),
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(diagnostic) => write!(f, "{}", diagnostic.trim_end()),
            Self::Exception(exc) => write!(f, "{}: {}", exc.exc_type, exc.message),
            Self::Interrupted(_) => write!(f, "execution interrupted"),
            Self::Internal(msg) => write!(f, "internal console error: {msg}"),
        }
    }
}

impl Error for ConsoleError {}

pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

pub(crate) fn internal(err: impl Display) -> ConsoleError {
    ConsoleError::Internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ConsoleError, ExceptionInfo};

    fn sample_exception() -> ExceptionInfo {
        ExceptionInfo {
            exc_type: "ValueError".to_string(),
            message: "boom".to_string(),
            traceback: "Traceback (most recent call last):\n...\nValueError: boom\n".to_string(),
        }
    }

    #[test]
    fn syntax_display_trims_trailing_newline() {
        let err = ConsoleError::Syntax("SyntaxError: invalid syntax\n".to_string());
        assert_eq!(err.to_string(), "SyntaxError: invalid syntax");
    }

    #[test]
    fn exception_display_uses_type_and_message() {
        let err = ConsoleError::Exception(sample_exception());
        assert_eq!(err.to_string(), "ValueError: boom");
    }

    #[test]
    fn interrupted_display_is_stable() {
        let err = ConsoleError::Interrupted(sample_exception());
        assert_eq!(err.to_string(), "execution interrupted");
    }
}
