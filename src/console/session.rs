use anyhow::Result;
use pyo3::exceptions::{PyKeyboardInterrupt, PyRuntimeError};
use pyo3::prelude::*;
use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods};
use std::ffi::CString;
use std::sync::Arc;

use super::compile::{self, CompiledChunk, SyntaxOutcome};
use super::complete;
use super::error::{ConsoleError, ConsoleResult, ExceptionInfo, internal};
use super::execute::{self, ConsoleIo};

const CONSOLE_FILENAME: &str = "<console>";

/// Result of `check_and_execute` when no fault occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The chunk is a valid prefix of a larger construct; buffer more text
    /// and re-submit. Nothing was executed.
    Incomplete,
    /// The chunk ran; carries the rendered tail value, or `None` when the
    /// chunk had no trailing expression (or it evaluated to Python `None`).
    Value(Option<String>),
}

/// One interactive console session: a persistent namespace plus the private
/// helper environment that compiles, runs, and renders chunks against it.
///
/// The handle is cheap to clone; clones share the same namespace. Distinct
/// sessions are fully isolated from each other.
#[derive(Clone)]
pub struct ConsoleSession {
    inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    globals: Py<PyDict>,
    helpers: Py<PyDict>,
}

impl ConsoleSession {
    pub fn initialize() -> Result<Self> {
        Python::attach(|py| -> Result<Self> {
            let helpers = PyDict::new(py);
            let helper_code = CString::new(include_str!("runtime_helpers.py"))?;
            py.run(helper_code.as_c_str(), Some(&helpers), Some(&helpers))?;

            let globals = PyDict::new(py);
            let session = Self {
                inner: Arc::new(SessionInner {
                    globals: globals.unbind(),
                    helpers: helpers.unbind(),
                }),
            };

            if !session.is_healthy() {
                anyhow::bail!("console session failed health check");
            }

            Ok(session)
        })
    }

    pub fn is_healthy(&self) -> bool {
        Python::attach(|py| {
            let globals = self.inner.globals.bind(py);
            py.eval(c"1 + 1", Some(globals), Some(globals)).is_ok()
        })
    }

    /// Startup banner for the host to display once per session start.
    pub fn banner(&self) -> String {
        Python::attach(|py| {
            self.inner
                .helpers
                .bind(py)
                .get_item("_BANNER")
                .ok()
                .flatten()
                .and_then(|banner| banner.extract().ok())
                .unwrap_or_else(|| format!("Python {}", py.version()))
        })
    }

    /// Classifies a chunk as incomplete, a syntax fault, or complete; a
    /// complete chunk is compiled into its body and tail units. No user code
    /// runs here.
    pub fn check_and_split(&self, source: &str) -> ConsoleResult<SyntaxOutcome> {
        Python::attach(|py| {
            let result =
                self.inner
                    .call_helper(py, "_console_check_and_split", (source, CONSOLE_FILENAME))?;
            compile::outcome_from_helper(&result)
        })
    }

    /// The full boundary operation: syntax check, accepted-syntax
    /// notification, then execution with the supplied I/O channels.
    ///
    /// On a syntax fault the diagnostic is returned as
    /// `ConsoleError::Syntax` and `syntax_accepted` is never invoked.
    pub async fn check_and_execute(
        &self,
        source: &str,
        io: ConsoleIo,
        syntax_accepted: impl FnOnce(),
    ) -> ConsoleResult<ExecOutcome> {
        let chunk = match self.check_and_split(source)? {
            SyntaxOutcome::Incomplete => return Ok(ExecOutcome::Incomplete),
            SyntaxOutcome::SyntaxError(diagnostic) => {
                return Err(ConsoleError::Syntax(diagnostic));
            }
            SyntaxOutcome::Complete(chunk) => chunk,
        };
        syntax_accepted();
        let rendered = self.execute(chunk, io).await?;
        Ok(ExecOutcome::Value(rendered))
    }

    /// Executes an already-compiled chunk. See `execute::run_chunk` for the
    /// scheduling and redirection contract.
    pub async fn execute(
        &self,
        chunk: CompiledChunk,
        io: ConsoleIo,
    ) -> ConsoleResult<Option<String>> {
        execute::run_chunk(Arc::clone(&self.inner), chunk, io).await
    }

    /// Runs a whole script (a startup file) against the session namespace
    /// with the process's own stdio, no tail capture.
    pub fn run_script(&self, source: &str) -> ConsoleResult<()> {
        let chunk = match self.check_and_split(source)? {
            SyntaxOutcome::Incomplete => {
                return Err(ConsoleError::Syntax(
                    "SyntaxError: unexpected end of input in script".to_string(),
                ));
            }
            SyntaxOutcome::SyntaxError(diagnostic) => {
                return Err(ConsoleError::Syntax(diagnostic));
            }
            SyntaxOutcome::Complete(chunk) => chunk,
        };
        Python::attach(|py| {
            for code in [&chunk.body, &chunk.tail].into_iter().flatten() {
                self.inner
                    .run_unit(py, code.bind(py))
                    .map_err(|err| self.inner.classify(py, &err))?;
            }
            Ok(())
        })
    }

    /// Prefix completion over the session namespace for the trailing token
    /// of `source`. Candidates are deduplicated and sorted alphabetically.
    pub fn complete(&self, source: &str) -> ConsoleResult<Vec<String>> {
        let token = complete::partial_token(source);
        if token.is_empty() {
            return Ok(Vec::new());
        }
        Python::attach(|py| {
            self.inner
                .call_helper(
                    py,
                    "_console_complete",
                    (token, self.inner.globals.bind(py)),
                )?
                .extract()
                .map_err(internal)
        })
    }
}

impl SessionInner {
    fn helper<'py>(&self, py: Python<'py>, name: &str) -> ConsoleResult<Bound<'py, PyAny>> {
        self.helpers
            .bind(py)
            .get_item(name)
            .map_err(internal)?
            .ok_or_else(|| ConsoleError::Internal(format!("missing console helper {name}")))
    }

    pub(crate) fn call_helper<'py, A>(
        &self,
        py: Python<'py>,
        name: &str,
        args: A,
    ) -> ConsoleResult<Bound<'py, PyAny>>
    where
        A: pyo3::call::PyCallArgs<'py>,
    {
        self.helper(py, name)?.call1(args).map_err(internal)
    }

    /// Evaluates one compiled unit against the session namespace, driving a
    /// top-level-await coroutine to completion on the session loop. The
    /// returned error is the raw interpreter fault; classify it before it
    /// crosses the console seam.
    pub(crate) fn run_unit<'py>(
        &self,
        py: Python<'py>,
        code: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyAny>> {
        let runner = self
            .helpers
            .bind(py)
            .get_item("_console_run")?
            .ok_or_else(|| PyRuntimeError::new_err("missing console helper _console_run"))?;
        runner.call1((code, self.globals.bind(py)))
    }

    pub(crate) fn classify(&self, py: Python<'_>, err: &PyErr) -> ConsoleError {
        let info = self.exception_info(py, err);
        if err.is_instance_of::<PyKeyboardInterrupt>(py) {
            ConsoleError::Interrupted(info)
        } else {
            ConsoleError::Exception(info)
        }
    }

    pub(crate) fn render_value(
        &self,
        py: Python<'_>,
        value: &Bound<'_, PyAny>,
    ) -> ConsoleResult<String> {
        self.call_helper(py, "_console_repr_shorten", (value,))?
            .extract()
            .map_err(internal)
    }

    fn exception_info(&self, py: Python<'_>, err: &PyErr) -> ExceptionInfo {
        // The traceback lives on the PyErr, not on the exception value; hand
        // it over explicitly or the formatter sees a bare exception.
        let formatted = self
            .call_helper(
                py,
                "_console_format_exception",
                (err.value(py), err.traceback(py), CONSOLE_FILENAME),
            )
            .and_then(|result| {
                result
                    .extract::<(String, String, String)>()
                    .map_err(internal)
            });

        match formatted {
            Ok((exc_type, message, traceback)) => ExceptionInfo {
                exc_type,
                message,
                traceback,
            },
            Err(_) => ExceptionInfo {
                exc_type: err
                    .get_type(py)
                    .name()
                    .map(|name| name.to_string())
                    .unwrap_or_else(|_| "Exception".to_string()),
                message: err.value(py).to_string(),
                traceback: err.to_string(),
            },
        }
    }
}
