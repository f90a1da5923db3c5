use tracing::trace;

use rill_core::{CallSite, EngineError, Value};

use super::context::{method_key, ExecutionContext};
use super::dispatcher::{call_function, call_static_by_entity, call_static_dynamic};

/// Default invocation method looked up when an object value is called.
const INVOKE_METHOD: &str = "__invoke";

/// Resolves and executes a dynamic callable.
///
/// Accepted shapes, in resolution order:
/// - an object value: its `__invoke` method is called;
/// - an array whose first two elements (insertion order) are
///   `(target, method name)`, where the target is an object or a class name;
/// - a string containing `::`, split into class and method;
/// - any other string, treated as a free function name.
///
/// `caller_class` is the class context of the call site; it becomes the
/// static target when a class-name string is resolved and none is given by
/// the callable itself.
pub fn call_dynamic(
    ctx: &mut ExecutionContext,
    caller_class: Option<&str>,
    site: Option<&CallSite>,
    callable: &Value,
    args: &[Value],
) -> Result<Value, EngineError> {
    // Snapshot first: a reference callable must not change shape mid-resolve.
    let callable = callable.to_immutable();

    match &callable {
        Value::Object(_) => call_method(ctx, &callable, None, site, args),
        Value::Array(array) => {
            let mut elements = array.values();
            let (Some(target), Some(method)) = (elements.next(), elements.next()) else {
                return Err(ctx.fatal(
                    format!(
                        "Call to undefined function {}()",
                        callable.to_string_value()
                    ),
                    site,
                ));
            };

            if target.is_object() {
                let method_name = method.to_string_value();
                call_method(ctx, target, Some(&method_name), site, args)
            } else {
                let class_name = target.to_string_value();
                let method_name = method.to_string_value();
                let static_target = static_target(caller_class, &class_name);
                call_static_dynamic(ctx, &static_target, site, &class_name, &method_name, args)
            }
        }
        other => {
            let text = other.to_string_value();
            if let Some((class_name, method_name)) = text.split_once("::") {
                let static_target = static_target(caller_class, class_name);
                call_static_dynamic(ctx, &static_target, site, class_name, method_name, args)
            } else {
                call_function(ctx, site, &text, args)
            }
        }
    }
}

/// Invokes a method on an object instance; `None` selects the default
/// invocation method. The class is derived from the object handle.
pub fn call_method(
    ctx: &mut ExecutionContext,
    instance: &Value,
    method: Option<&str>,
    site: Option<&CallSite>,
    args: &[Value],
) -> Result<Value, EngineError> {
    let method_name = method.unwrap_or(INVOKE_METHOD);
    let snapshot = instance.to_immutable();
    let Value::Object(object) = &snapshot else {
        return Err(ctx.fatal(
            format!(
                "Call to undefined method {}::{}()",
                snapshot.type_name(),
                method_name
            ),
            site,
        ));
    };

    trace!(class = %object.class_name, method = method_name, "resolve instance call");
    let key = method_key(&object.class_name, method_name);
    let Some(signature) = ctx.lookup_method(&key) else {
        return Err(ctx.fatal(
            format!(
                "Call to undefined method {}::{}()",
                object.class_name, method_name
            ),
            site,
        ));
    };
    call_static_by_entity(ctx, &snapshot, site, &signature, args)
}

/// A class-name string resolves against the caller's class context when one
/// exists (late static binding); otherwise against the named class itself.
fn static_target(caller_class: Option<&str>, class_name: &str) -> Value {
    Value::string(caller_class.unwrap_or(class_name))
}
