mod args;
mod repl;
pub(crate) mod theme;

pub use args::CliArgs;
pub use repl::{AppState, run_repl};
