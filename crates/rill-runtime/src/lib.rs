pub mod engine;

pub use engine::{
    bind_arguments, call_dynamic, call_function, call_function_signature, call_method,
    call_static_by_entity, call_static_by_signature, call_static_dynamic,
    check_return_by_reference, method_key, CallFrame, Diagnostic, DiagnosticKind,
    ExecutionContext, FunctionHandler, FunctionSignature, MethodHandler, MethodSignature,
};
