use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Source-location token attached to a call. Opaque to the engine: it is
/// carried into call frames and diagnostics, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub file: Rc<str>,
    pub line: u32,
}

impl CallSite {
    pub fn new(file: impl AsRef<str>, line: u32) -> Self {
        Self {
            file: Rc::from(file.as_ref()),
            line,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Loose type constraint a parameter declares. `Any` accepts everything;
/// the rest are checked with the value-kind predicates during binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Any,
    Array,
    Numeric,
    String,
}

/// One declared parameter of a function or method signature. Immutable once
/// the owning signature is constructed.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    pub default_value: Option<Value>,
    pub by_reference: bool,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Any,
            default_value: None,
            by_reference: false,
        }
    }

    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }
}
