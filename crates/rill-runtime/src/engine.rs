mod binder;
mod context;
mod diagnostics;
mod dispatcher;
mod resolver;

pub use binder::bind_arguments;
pub use context::{
    method_key, CallFrame, ExecutionContext, FunctionHandler, FunctionSignature, MethodHandler,
    MethodSignature,
};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use dispatcher::{
    call_function, call_function_signature, call_static_by_entity, call_static_by_signature,
    call_static_dynamic, check_return_by_reference,
};
pub use resolver::{call_dynamic, call_method};


#[cfg(test)]
mod tests;
