//! Terminal styling for the line console. Colors are applied only when the
//! corresponding stream is a tty, so piped output stays plain.

use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use std::io;

pub(crate) fn prompt(text: &str) -> String {
    if io::stdout().is_tty() {
        format!("{}", text.green())
    } else {
        text.to_string()
    }
}

pub(crate) fn error(text: &str) -> String {
    if io::stderr().is_tty() {
        format!("{}", text.dark_red())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{error, prompt};

    // Under the test harness neither stream is a tty, so both helpers must
    // pass text through unchanged.
    #[test]
    fn styling_is_disabled_without_a_tty() {
        assert_eq!(prompt(">>> "), ">>> ");
        assert_eq!(error("Traceback"), "Traceback");
    }
}
