use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use rill_core::{CallSite, EngineError, ParameterSpec, Value};

use super::diagnostics::{Diagnostic, DiagnosticKind};

/// Body of a free function: takes the execution context and the bound
/// argument vector.
pub type FunctionHandler =
    Rc<dyn Fn(&mut ExecutionContext, &[Value]) -> Result<Value, EngineError>>;

/// Body of a method, invoked statically: the first argument is the target
/// class-or-instance value the call was resolved against.
pub type MethodHandler =
    Rc<dyn Fn(&Value, &mut ExecutionContext, &[Value]) -> Result<Value, EngineError>>;

/// Immutable descriptor of a free function: name, ordered parameters, and
/// the invoke capability. Constructed once at load time, looked up by
/// lowercased name thereafter.
#[derive(Clone)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<ParameterSpec>,
    handler: FunctionHandler,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        params: Vec<ParameterSpec>,
        handler: FunctionHandler,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            handler,
        }
    }

    pub fn invoke(
        &self,
        ctx: &mut ExecutionContext,
        args: &[Value],
    ) -> Result<Value, EngineError> {
        (self.handler)(ctx, args)
    }
}

impl fmt::Debug for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSignature")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Immutable descriptor of a method, additionally carrying its owning class
/// name. Registered under the composite key `class#method` (lowercased).
#[derive(Clone)]
pub struct MethodSignature {
    pub class_name: String,
    pub name: String,
    pub params: Vec<ParameterSpec>,
    handler: MethodHandler,
}

impl MethodSignature {
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        params: Vec<ParameterSpec>,
        handler: MethodHandler,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            params,
            handler,
        }
    }

    pub fn invoke_static(
        &self,
        target: &Value,
        ctx: &mut ExecutionContext,
        args: &[Value],
    ) -> Result<Value, EngineError> {
        (self.handler)(target, ctx, args)
    }
}

impl fmt::Debug for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSignature")
            .field("class_name", &self.class_name)
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Canonical registry key for a method. Lookup keys are lowercased;
/// original-case names are kept on the signature for diagnostics.
pub fn method_key(class_name: &str, method_name: &str) -> String {
    format!(
        "{}#{}",
        class_name.to_lowercase(),
        method_name.to_lowercase()
    )
}

/// One entry of the diagnostics call stack. Records the caller's original
/// argument list, not the bound vector.
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub site: CallSite,
    pub args: Vec<Value>,
    pub callee: String,
    pub class: Option<String>,
}

/// Per-execution state: signature registries, the diagnostics call stack,
/// and the diagnostic sink.
///
/// One context is used by exactly one logical execution at a time; it is
/// mutated only by frame push/pop and diagnostic emission. Concurrent
/// executions must each own their own context.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    functions: HashMap<String, Rc<FunctionSignature>>,
    methods: HashMap<String, Rc<MethodSignature>>,
    call_stack: Vec<CallFrame>,
    diagnostics: Vec<Diagnostic>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_function(&mut self, signature: FunctionSignature) {
        self.functions
            .insert(signature.name.to_lowercase(), Rc::new(signature));
    }

    pub fn register_method(&mut self, signature: MethodSignature) {
        let key = method_key(&signature.class_name, &signature.name);
        self.methods.insert(key, Rc::new(signature));
    }

    /// Case-insensitive function lookup. `None` means undefined; the caller
    /// decides whether that is fatal.
    pub fn lookup_function(&self, name: &str) -> Option<Rc<FunctionSignature>> {
        self.functions.get(&name.to_lowercase()).cloned()
    }

    /// Case-insensitive lookup by composite `class#method` key.
    pub fn lookup_method(&self, key: &str) -> Option<Rc<MethodSignature>> {
        self.methods.get(&key.to_lowercase()).cloned()
    }

    pub(crate) fn push_call(&mut self, frame: CallFrame) {
        trace!(callee = %frame.callee, depth = self.call_stack.len(), "push call frame");
        self.call_stack.push(frame);
    }

    pub(crate) fn pop_call(&mut self) {
        let frame = self.call_stack.pop();
        trace!(
            callee = frame.as_ref().map(|f| f.callee.as_str()).unwrap_or("<empty>"),
            depth = self.call_stack.len(),
            "pop call frame"
        );
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn current_call(&self) -> Option<&CallFrame> {
        self.call_stack.last()
    }

    /// Innermost-first rendering of the call stack for error backtraces.
    pub fn stack_trace(&self) -> String {
        let mut lines = Vec::with_capacity(self.call_stack.len());
        for (index, frame) in self.call_stack.iter().rev().enumerate() {
            let callee = match &frame.class {
                Some(class) => format!("{}::{}", class, frame.callee),
                None => frame.callee.clone(),
            };
            lines.push(format!("#{} {}() called at {}", index, callee, frame.site));
        }
        lines.join("\n")
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Records a warning; execution continues.
    pub fn warning(&mut self, message: impl Into<String>, site: Option<&CallSite>) {
        self.record(DiagnosticKind::Warning, message.into(), site.cloned());
    }

    /// Records a notice; execution continues.
    pub fn notice(&mut self, message: impl Into<String>, site: Option<&CallSite>) {
        self.record(DiagnosticKind::Notice, message.into(), site.cloned());
    }

    /// Records a call-aborting condition and builds the error the operation
    /// must return.
    pub fn compile_error(
        &mut self,
        message: impl Into<String>,
        site: Option<&CallSite>,
    ) -> EngineError {
        let message = message.into();
        self.record(DiagnosticKind::CompileError, message.clone(), site.cloned());
        EngineError::compile(message, site.cloned())
    }

    /// Records an execution-aborting condition and builds the error the
    /// operation must return.
    pub fn fatal(&mut self, message: impl Into<String>, site: Option<&CallSite>) -> EngineError {
        let message = message.into();
        self.record(DiagnosticKind::Fatal, message.clone(), site.cloned());
        EngineError::fatal(message, site.cloned())
    }

    fn record(&mut self, kind: DiagnosticKind, message: String, site: Option<CallSite>) {
        debug!(%kind, %message, "diagnostic");
        self.diagnostics.push(Diagnostic::new(kind, message, site));
    }
}
