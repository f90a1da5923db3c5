use std::rc::Rc;

use tracing::trace;

use rill_core::{CallSite, EngineError, Value};

use super::binder::bind_arguments;
use super::context::{method_key, CallFrame, ExecutionContext, FunctionSignature, MethodSignature};

/// Scoped call-stack frame. The pop runs in `Drop`, so the stack stays
/// balanced on the error path exactly as on normal return.
struct FrameGuard<'a> {
    ctx: &'a mut ExecutionContext,
    framed: bool,
}

impl<'a> FrameGuard<'a> {
    fn enter(ctx: &'a mut ExecutionContext, frame: Option<CallFrame>) -> Self {
        let framed = frame.is_some();
        if let Some(frame) = frame {
            ctx.push_call(frame);
        }
        Self { ctx, framed }
    }

    fn ctx(&mut self) -> &mut ExecutionContext {
        self.ctx
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if self.framed {
            self.ctx.pop_call();
        }
    }
}

/// Calls a free function by name. A registry miss is fatal.
pub fn call_function(
    ctx: &mut ExecutionContext,
    site: Option<&CallSite>,
    name: &str,
    args: &[Value],
) -> Result<Value, EngineError> {
    let Some(signature) = ctx.lookup_function(name) else {
        return Err(ctx.fatal(format!("Call to undefined function {name}()"), site));
    };
    call_function_signature(ctx, site, &signature, args)
}

/// Calls an already-resolved function descriptor.
///
/// Binding is skipped when the signature declares no parameters (the raw
/// arguments pass through unchanged). A frame is pushed only when a call
/// site is present, and only after binding succeeded; it records the
/// caller's original arguments.
pub fn call_function_signature(
    ctx: &mut ExecutionContext,
    site: Option<&CallSite>,
    signature: &Rc<FunctionSignature>,
    args: &[Value],
) -> Result<Value, EngineError> {
    trace!(function = %signature.name, argc = args.len(), "dispatch function");
    let passed = if signature.params.is_empty() {
        args.to_vec()
    } else {
        bind_arguments(
            ctx,
            Some(args),
            &signature.params,
            Some(&signature.name),
            None,
            site,
        )?
    };

    let frame = site.map(|site| CallFrame {
        site: site.clone(),
        args: args.to_vec(),
        callee: signature.name.clone(),
        class: None,
    });
    let mut guard = FrameGuard::enter(ctx, frame);
    signature.invoke(guard.ctx(), &passed)
}

/// Calls a method through the registry by its composite `class#method` key.
///
/// A miss is immediately fatal; class autoloading is an external
/// collaborator and would hook in before this lookup.
pub fn call_static_by_signature(
    ctx: &mut ExecutionContext,
    target: &Value,
    site: Option<&CallSite>,
    key: &str,
    origin_class: &str,
    origin_method: &str,
    args: &[Value],
) -> Result<Value, EngineError> {
    let Some(signature) = ctx.lookup_method(key) else {
        return Err(ctx.fatal(
            format!("Call to undefined method {origin_class}::{origin_method}()"),
            site,
        ));
    };
    invoke_method(ctx, target, site, &signature, origin_class, origin_method, args)
}

/// Calls an already-resolved method descriptor; origin names come from the
/// descriptor itself.
pub fn call_static_by_entity(
    ctx: &mut ExecutionContext,
    target: &Value,
    site: Option<&CallSite>,
    signature: &Rc<MethodSignature>,
    args: &[Value],
) -> Result<Value, EngineError> {
    let origin_class = signature.class_name.clone();
    let origin_method = signature.name.clone();
    invoke_method(ctx, target, site, signature, &origin_class, &origin_method, args)
}

/// Builds the lowercase composite key from original-case names and
/// dispatches; the original case is kept for diagnostics.
pub fn call_static_dynamic(
    ctx: &mut ExecutionContext,
    target: &Value,
    site: Option<&CallSite>,
    class_name: &str,
    method_name: &str,
    args: &[Value],
) -> Result<Value, EngineError> {
    let key = method_key(class_name, method_name);
    call_static_by_signature(ctx, target, site, &key, class_name, method_name, args)
}

fn invoke_method(
    ctx: &mut ExecutionContext,
    target: &Value,
    site: Option<&CallSite>,
    signature: &Rc<MethodSignature>,
    origin_class: &str,
    origin_method: &str,
    args: &[Value],
) -> Result<Value, EngineError> {
    trace!(class = origin_class, method = origin_method, argc = args.len(), "dispatch method");
    let passed = bind_arguments(
        ctx,
        Some(args),
        &signature.params,
        Some(origin_class),
        Some(origin_method),
        site,
    )?;

    let frame = site.map(|site| CallFrame {
        site: site.clone(),
        args: args.to_vec(),
        callee: origin_method.to_string(),
        class: Some(origin_class.to_string()),
    });
    let mut guard = FrameGuard::enter(ctx, frame);
    signature.invoke_static(target, guard.ctx(), &passed)
}

/// Post-call check for call sites that expect a reference return: an
/// immutable result records a notice and is passed through unchanged.
pub fn check_return_by_reference(result: &Value, ctx: &mut ExecutionContext, site: Option<&CallSite>) {
    if result.is_immutable() {
        ctx.notice("Function did not return a reference", site);
    }
}
