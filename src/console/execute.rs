use pyo3::exceptions::PyKeyboardInterrupt;
use pyo3::prelude::*;
use pyo3::types::PyAnyMethods;
use std::sync::Arc;
use tokio::task;

use super::compile::CompiledChunk;
use super::error::{ConsoleError, ConsoleResult, internal};
use super::session::SessionInner;

/// Signalled by a stdin callback when the pending read was cancelled by the
/// host. Raised into user code as a catchable `KeyboardInterrupt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdinInterrupt;

pub type OutputCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Delivers the next line of input, up to the requested size. Returning an
/// empty string signals end of input; `Err(StdinInterrupt)` cancels the read.
pub type StdinCallback = Arc<dyn Fn(usize) -> Result<String, StdinInterrupt> + Send + Sync>;

/// The three caller-supplied channels one execution streams through.
#[derive(Clone)]
pub struct ConsoleIo {
    pub stdin: StdinCallback,
    pub stdout: OutputCallback,
    pub stderr: OutputCallback,
}

/// Runs a compiled chunk against the session namespace under scoped stdio
/// redirection and returns the rendered tail value, if any.
///
/// Yields to the host scheduler once before touching the interpreter so the
/// accepted-syntax notification is observable before the first output
/// callback. The interpreter work itself runs on the blocking pool: a stdin
/// read may block that thread for as long as it likes without stalling the
/// host runtime.
pub(crate) async fn run_chunk(
    session: Arc<SessionInner>,
    chunk: CompiledChunk,
    io: ConsoleIo,
) -> ConsoleResult<Option<String>> {
    task::yield_now().await;

    if chunk.is_empty() {
        return Ok(None);
    }

    task::spawn_blocking(move || run_blocking(&session, &chunk, &io))
        .await
        .map_err(|err| ConsoleError::Internal(format!("execution task failed: {err}")))?
}

fn run_blocking(
    session: &SessionInner,
    chunk: &CompiledChunk,
    io: &ConsoleIo,
) -> ConsoleResult<Option<String>> {
    Python::attach(|py| {
        let _redirect = RedirectGuard::install(py, io)?;

        if let Some(body) = &chunk.body {
            session
                .run_unit(py, body.bind(py))
                .map_err(|err| session.classify(py, &err))?;
        }

        let Some(tail) = &chunk.tail else {
            return Ok(None);
        };
        let value = session
            .run_unit(py, tail.bind(py))
            .map_err(|err| session.classify(py, &err))?;
        if value.is_none() {
            return Ok(None);
        }
        session.render_value(py, &value).map(Some)
    })
}

#[pyclass]
struct CallbackWriter {
    forward: OutputCallback,
}

#[pymethods]
impl CallbackWriter {
    fn write(&self, data: &str) -> usize {
        (self.forward)(data);
        data.chars().count()
    }

    fn flush(&self) {}

    fn writable(&self) -> bool {
        true
    }

    fn isatty(&self) -> bool {
        false
    }
}

#[pyclass]
struct CallbackReader {
    request: StdinCallback,
}

#[pymethods]
impl CallbackReader {
    #[pyo3(signature = (size = -1))]
    fn readline(&self, py: Python<'_>, size: isize) -> PyResult<String> {
        let max = if size < 0 { usize::MAX } else { size as usize };
        // The callback may block until the host delivers a line; release the
        // interpreter lock so other attached threads keep running.
        match py.detach(|| (self.request)(max)) {
            Ok(line) => Ok(line),
            Err(StdinInterrupt) => Err(PyKeyboardInterrupt::new_err("stdin read cancelled")),
        }
    }

    #[pyo3(signature = (size = -1))]
    fn read(&self, py: Python<'_>, size: isize) -> PyResult<String> {
        let mut data = String::new();
        loop {
            let remaining = if size < 0 {
                -1
            } else {
                let left = size - data.len() as isize;
                if left <= 0 {
                    break;
                }
                left
            };
            let chunk = self.readline(py, remaining)?;
            if chunk.is_empty() {
                break;
            }
            data.push_str(&chunk);
        }
        Ok(data)
    }

    fn readable(&self) -> bool {
        true
    }

    fn isatty(&self) -> bool {
        false
    }
}

/// Scoped rebinding of `sys.stdout`/`sys.stderr`/`sys.stdin` to the callback
/// forwarders. The previous stream objects are restored in `Drop`, which
/// covers every exit path out of an execution, faults included.
struct RedirectGuard {
    saved: Option<(Py<PyAny>, Py<PyAny>, Py<PyAny>)>,
}

impl RedirectGuard {
    fn install(py: Python<'_>, io: &ConsoleIo) -> ConsoleResult<Self> {
        let sys = py.import("sys").map_err(internal)?;
        let saved = (
            sys.getattr("stdout").map_err(internal)?.unbind(),
            sys.getattr("stderr").map_err(internal)?.unbind(),
            sys.getattr("stdin").map_err(internal)?.unbind(),
        );
        let guard = Self { saved: Some(saved) };

        let stdout = Py::new(
            py,
            CallbackWriter {
                forward: Arc::clone(&io.stdout),
            },
        )
        .map_err(internal)?;
        let stderr = Py::new(
            py,
            CallbackWriter {
                forward: Arc::clone(&io.stderr),
            },
        )
        .map_err(internal)?;
        let stdin = Py::new(
            py,
            CallbackReader {
                request: Arc::clone(&io.stdin),
            },
        )
        .map_err(internal)?;

        sys.setattr("stdout", stdout).map_err(internal)?;
        sys.setattr("stderr", stderr).map_err(internal)?;
        sys.setattr("stdin", stdin).map_err(internal)?;
        Ok(guard)
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        let Some((stdout, stderr, stdin)) = self.saved.take() else {
            return;
        };
        Python::attach(|py| {
            if let Ok(sys) = py.import("sys") {
                let _ = sys.setattr("stdout", stdout);
                let _ = sys.setattr("stderr", stderr);
                let _ = sys.setattr("stdin", stdin);
            }
        });
    }
}
