use pyo3::prelude::*;
use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods};

use super::error::{ConsoleError, ConsoleResult, internal};

/// Outcome of checking one submitted chunk, computed before any execution
/// side effects occur.
#[derive(Debug)]
pub enum SyntaxOutcome {
    /// The chunk is a valid prefix of a larger construct; the caller should
    /// buffer and re-submit with more text appended.
    Incomplete,
    /// The chunk can never be completed into valid source.
    SyntaxError(String),
    Complete(CompiledChunk),
}

/// The two independently executable units of a complete chunk: the statement
/// body and, when the chunk ends in a bare expression, the detached tail
/// whose value is captured and rendered.
#[derive(Debug)]
pub struct CompiledChunk {
    pub(crate) body: Option<Py<PyAny>>,
    pub(crate) tail: Option<Py<PyAny>>,
}

impl CompiledChunk {
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.tail.is_none()
    }

    pub fn has_tail(&self) -> bool {
        self.tail.is_some()
    }
}

pub(crate) fn outcome_from_helper(result: &Bound<'_, PyAny>) -> ConsoleResult<SyntaxOutcome> {
    match dict_string(result, "status")?.as_str() {
        "incomplete" => Ok(SyntaxOutcome::Incomplete),
        "syntax-error" => Ok(SyntaxOutcome::SyntaxError(dict_string(result, "message")?)),
        "complete" => Ok(SyntaxOutcome::Complete(CompiledChunk {
            body: dict_code(result, "body")?,
            tail: dict_code(result, "tail")?,
        })),
        status => Err(ConsoleError::Internal(format!(
            "unknown syntax check status: {status}"
        ))),
    }
}

fn dict_string(result: &Bound<'_, PyAny>, key: &str) -> ConsoleResult<String> {
    let dict = cast_dict(result)?;
    dict.get_item(key)
        .map_err(internal)?
        .ok_or_else(|| ConsoleError::Internal(format!("missing {key} in helper result")))?
        .extract()
        .map_err(internal)
}

fn dict_code(result: &Bound<'_, PyAny>, key: &str) -> ConsoleResult<Option<Py<PyAny>>> {
    let dict = cast_dict(result)?;
    let value = dict
        .get_item(key)
        .map_err(internal)?
        .ok_or_else(|| ConsoleError::Internal(format!("missing {key} in helper result")))?;
    if value.is_none() {
        Ok(None)
    } else {
        Ok(Some(value.unbind()))
    }
}

fn cast_dict<'a>(value: &'a Bound<'a, PyAny>) -> ConsoleResult<&'a Bound<'a, PyDict>> {
    value.cast::<PyDict>().map_err(internal)
}
