mod compile;
mod complete;
mod error;
mod execute;
mod session;

pub use compile::{CompiledChunk, SyntaxOutcome};
pub use error::{ConsoleError, ConsoleResult, ExceptionInfo, REPR_MAX_LEN};
pub use execute::{ConsoleIo, OutputCallback, StdinCallback, StdinInterrupt};
pub use session::{ConsoleSession, ExecOutcome};
