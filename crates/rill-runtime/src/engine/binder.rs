use tracing::trace;

use rill_core::{CallSite, EngineError, ParamKind, ParameterSpec, Value};

use super::context::ExecutionContext;

/// Binds raw call arguments to a parameter list.
///
/// The result has `max(params.len(), args.len())` entries: missing trailing
/// arguments are filled from defaults (or `Null` plus a warning), extra
/// trailing arguments are preserved untouched for variadic callees. Values
/// bound to non-reference parameters are defensively snapshotted so the
/// callee cannot mutate the caller's binding; by-reference parameters alias
/// the caller's slot.
///
/// A declared-kind violation aborts the bind with a compile error tagged
/// with `site`.
pub fn bind_arguments(
    ctx: &mut ExecutionContext,
    args: Option<&[Value]>,
    params: &[ParameterSpec],
    owner_class: Option<&str>,
    owner_method: Option<&str>,
    site: Option<&CallSite>,
) -> Result<Vec<Value>, EngineError> {
    let given = args.unwrap_or(&[]);
    if params.is_empty() && given.is_empty() {
        return Ok(Vec::new());
    }

    let mut passed = Vec::with_capacity(params.len().max(given.len()));

    for (index, param) in params.iter().enumerate() {
        let value = match given.get(index) {
            Some(value) if param.by_reference => value.clone(),
            Some(value) => value.to_immutable(),
            None => match &param.default_value {
                Some(default) => default.to_immutable(),
                None => {
                    ctx.warning(
                        format!(
                            "Missing argument {} (${}) for {}()",
                            index + 1,
                            param.name,
                            owner_name(owner_class, owner_method)
                        ),
                        site,
                    );
                    Value::Null
                }
            },
        };

        let satisfied = match param.kind {
            ParamKind::Any => true,
            ParamKind::Array => value.is_array(),
            ParamKind::Numeric => value.is_number(),
            ParamKind::String => value.is_string(),
        };
        if !satisfied {
            return Err(ctx.compile_error(
                format!("Argument {} must be {}", index + 1, kind_label(param.kind)),
                site,
            ));
        }

        passed.push(value);
    }

    for extra in given.iter().skip(params.len()) {
        passed.push(extra.clone());
    }

    trace!(bound = passed.len(), declared = params.len(), "arguments bound");
    Ok(passed)
}

fn owner_name(owner_class: Option<&str>, owner_method: Option<&str>) -> String {
    match (owner_class, owner_method) {
        (Some(class), Some(method)) => format!("{class}::{method}"),
        (Some(class), None) => class.to_string(),
        (None, Some(method)) => method.to_string(),
        (None, None) => "<unknown>".to_string(),
    }
}

fn kind_label(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Any => "any",
        ParamKind::Array => "array",
        ParamKind::Numeric => "int or double",
        ParamKind::String => "string",
    }
}
