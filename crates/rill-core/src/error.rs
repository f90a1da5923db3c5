use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::CallSite;

/// Severity of an aborting condition. Recoverable conditions (notices,
/// warnings) are not errors; they are recorded on the diagnostic sink and
/// execution continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Aborts the current call attempt (e.g. an argument failed its declared
    /// type constraint during binding).
    CompileError,
    /// Aborts the execution; propagates until caught outside the engine.
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CompileError => write!(f, "Compile error"),
            ErrorKind::Fatal => write!(f, "Fatal error"),
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: ErrorKind,
    pub message: String,
    pub site: Option<CallSite>,
}

impl EngineError {
    pub fn compile(message: impl Into<String>, site: Option<CallSite>) -> Self {
        Self {
            kind: ErrorKind::CompileError,
            message: message.into(),
            site,
        }
    }

    pub fn fatal(message: impl Into<String>, site: Option<CallSite>) -> Self {
        Self {
            kind: ErrorKind::Fatal,
            message: message.into(),
            site,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }
}
