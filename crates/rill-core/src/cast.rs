use crate::value::{ArrayValue, ObjectValue, Value, ValueKind};

/// Closed family of cast operations exposed to the engine.
///
/// Each variant carries a target kind, a total and pure `apply`, and a stable
/// textual tag used for tracing. The family is enumerable by design: new cast
/// forms are added here, not through an open hierarchy, so every dispatch
/// site is exhaustiveness-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Double,
    Int,
    Bool,
    String,
    Array,
    Object,
    Unset,
    Binary,
}

impl CastKind {
    /// The value kind `apply` produces.
    pub fn result_kind(self) -> ValueKind {
        match self {
            CastKind::Double => ValueKind::Float,
            CastKind::Int => ValueKind::Int,
            CastKind::Bool => ValueKind::Bool,
            CastKind::String | CastKind::Binary => ValueKind::String,
            CastKind::Array => ValueKind::Array,
            CastKind::Object => ValueKind::Object,
            CastKind::Unset => ValueKind::Null,
        }
    }

    /// Stable tag used for tracing and diagnostics.
    pub fn tag(self) -> &'static str {
        match self {
            CastKind::Double => "toDouble",
            CastKind::Int => "toInteger",
            CastKind::Bool => "toBoolean",
            CastKind::String => "toString",
            CastKind::Array => "toArray",
            CastKind::Object => "toObject",
            CastKind::Unset => "toUnset",
            CastKind::Binary => "toBinary",
        }
    }

    /// Total, pure coercion. Never fails and never mutates the input.
    pub fn apply(self, value: &Value) -> Value {
        match self {
            CastKind::Double => Value::Float(value.to_double()),
            CastKind::Int => Value::Int(value.to_int()),
            CastKind::Bool => Value::Bool(value.to_bool()),
            CastKind::String | CastKind::Binary => Value::string(value.to_string_value()),
            CastKind::Array => Value::array(value.to_array()),
            CastKind::Object => match value.to_immutable() {
                object @ Value::Object(_) => object,
                other => {
                    let object = ObjectValue::new("stdClass");
                    match other {
                        Value::Null => {}
                        Value::Array(array) => {
                            *object.properties.borrow_mut() = (*array).clone();
                        }
                        scalar => object
                            .properties
                            .borrow_mut()
                            .push(scalar),
                    }
                    Value::object(object)
                }
            },
            CastKind::Unset => Value::Null,
        }
    }
}

/// Coerces a value to the requested kind through the matching cast variant.
pub fn coerce(value: &Value, kind: CastKind) -> Value {
    kind.apply(value)
}
