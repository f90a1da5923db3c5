use std::fmt;

use serde::{Deserialize, Serialize};

use rill_core::{CallSite, ErrorKind};

/// Severity of a recorded condition.
///
/// `Notice` and `Warning` are recoverable: they are recorded and execution
/// continues. `CompileError` and `Fatal` abort the call chain and are also
/// surfaced as `EngineError` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Notice,
    Warning,
    CompileError,
    Fatal,
}

impl DiagnosticKind {
    pub fn is_recoverable(self) -> bool {
        matches!(self, DiagnosticKind::Notice | DiagnosticKind::Warning)
    }
}

impl From<ErrorKind> for DiagnosticKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::CompileError => DiagnosticKind::CompileError,
            ErrorKind::Fatal => DiagnosticKind::Fatal,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Notice => write!(f, "Notice"),
            DiagnosticKind::Warning => write!(f, "Warning"),
            DiagnosticKind::CompileError => write!(f, "Compile error"),
            DiagnosticKind::Fatal => write!(f, "Fatal error"),
        }
    }
}

/// One recorded condition, with the call site it relates to when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub site: Option<CallSite>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, site: Option<CallSite>) -> Self {
        Self {
            kind,
            message: message.into(),
            site,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.site {
            Some(site) => write!(f, "{}: {} in {}", self.kind, self.message, site),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(DiagnosticKind::Notice.is_recoverable());
        assert!(DiagnosticKind::Warning.is_recoverable());
        assert!(!DiagnosticKind::CompileError.is_recoverable());
        assert!(!DiagnosticKind::Fatal.is_recoverable());
    }

    #[test]
    fn rendering_includes_site_when_present() {
        let bare = Diagnostic::new(DiagnosticKind::Warning, "Missing argument 1 ($x) for f()", None);
        assert_eq!(
            bare.to_string(),
            "Warning: Missing argument 1 ($x) for f()"
        );

        let sited = Diagnostic::new(
            DiagnosticKind::Fatal,
            "Call to undefined function g()",
            Some(CallSite::new("main.rill", 12)),
        );
        assert_eq!(
            sited.to_string(),
            "Fatal error: Call to undefined function g() in main.rill:12"
        );
    }

    #[test]
    fn diagnostics_serialize_for_host_reporting() {
        let diagnostic = Diagnostic::new(DiagnosticKind::Notice, "Function did not return a reference", None);
        let json = serde_json::to_string(&diagnostic).expect("serialize");
        assert!(json.contains("\"notice\""));
        let back: Diagnostic = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(diagnostic, back);
    }
}
