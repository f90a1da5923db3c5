use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Discriminant of a runtime [`Value`], used by cast variants and
/// type-constraint diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
    Reference,
}

/// Insertion-ordered array key. Integer and string keys are distinct,
/// matching the script language's array semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

/// Insertion-ordered map backing `Value::Array`.
///
/// `push` appends at the next free integer index; `insert` replaces an
/// existing key in place so iteration order never changes for updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayValue {
    entries: Vec<(ArrayKey, Value)>,
    next_index: i64,
}

impl ArrayValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut array = Self::new();
        for value in values {
            array.push(value);
        }
        array
    }

    pub fn push(&mut self, value: Value) {
        let key = ArrayKey::Int(self.next_index);
        self.next_index += 1;
        self.entries.push((key, value));
    }

    pub fn insert(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Int(index) = key {
            if index >= self.next_index {
                self.next_index = index + 1;
            }
        }
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }
}

/// Heap object handle. Identity (not structure) defines equality.
#[derive(Debug)]
pub struct ObjectValue {
    pub class_name: String,
    pub properties: RefCell<ArrayValue>,
}

impl ObjectValue {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: RefCell::new(ArrayValue::new()),
        }
    }
}

/// Tagged runtime value.
///
/// Every variant except `Reference` is an immutable snapshot that is safe to
/// alias (cloning shares the `Rc`-boxed payload). `Reference` is the one
/// mutable form: a shared slot whose contents a callee may rewrite, used for
/// by-reference parameters.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Rc<str>),
    Array(Rc<ArrayValue>),
    Object(Rc<ObjectValue>),
    Reference(Rc<RefCell<Value>>),
}

impl Value {
    pub fn string(text: impl AsRef<str>) -> Self {
        Value::String(Rc::from(text.as_ref()))
    }

    pub fn array(array: ArrayValue) -> Self {
        Value::Array(Rc::new(array))
    }

    pub fn object(object: ObjectValue) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Wraps a value in a fresh mutable slot.
    pub fn reference(value: Value) -> Self {
        Value::Reference(Rc::new(RefCell::new(value)))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Reference(_) => ValueKind::Reference,
        }
    }

    /// Runtime type label used in diagnostics. Labels are user-visible and
    /// expected to remain stable.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Reference(slot) => slot.borrow().type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Reference(slot) => slot.borrow().is_null(),
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        match self {
            Value::Int(_) | Value::Float(_) => true,
            Value::Reference(slot) => slot.borrow().is_number(),
            _ => false,
        }
    }

    pub fn is_string(&self) -> bool {
        match self {
            Value::String(_) => true,
            Value::Reference(slot) => slot.borrow().is_string(),
            _ => false,
        }
    }

    pub fn is_array(&self) -> bool {
        match self {
            Value::Array(_) => true,
            Value::Reference(slot) => slot.borrow().is_array(),
            _ => false,
        }
    }

    pub fn is_object(&self) -> bool {
        match self {
            Value::Object(_) => true,
            Value::Reference(slot) => slot.borrow().is_object(),
            _ => false,
        }
    }

    /// Whether the value is safe to alias as-is. Only `Reference` slots are
    /// mutable; everything else is already a snapshot.
    pub fn is_immutable(&self) -> bool {
        !matches!(self, Value::Reference(_))
    }

    /// Aliasable snapshot of this value. A no-op (cheap clone) for immutable
    /// variants; for a `Reference` it copies the referenced value out of the
    /// slot, collapsing nested references.
    pub fn to_immutable(&self) -> Value {
        match self {
            Value::Reference(slot) => slot.borrow().to_immutable(),
            other => other.clone(),
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::String(text) => !text.is_empty() && &**text != "0",
            Value::Array(array) => !array.is_empty(),
            Value::Object(_) => true,
            Value::Reference(slot) => slot.borrow().to_bool(),
        }
    }

    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(value) => i64::from(*value),
            Value::Int(value) => *value,
            Value::Float(value) => *value as i64,
            Value::String(text) => numeric_prefix(text) as i64,
            Value::Array(array) => i64::from(!array.is_empty()),
            Value::Object(_) => 1,
            Value::Reference(slot) => slot.borrow().to_int(),
        }
    }

    pub fn to_double(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(value) => f64::from(u8::from(*value)),
            Value::Int(value) => *value as f64,
            Value::Float(value) => *value,
            Value::String(text) => numeric_prefix(text),
            Value::Array(array) => f64::from(u8::from(!array.is_empty())),
            Value::Object(_) => 1.0,
            Value::Reference(slot) => slot.borrow().to_double(),
        }
    }

    /// String form used by diagnostics and string casts. Arrays and objects
    /// render as their opaque labels, matching the script language.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(value) => {
                if *value {
                    "1".to_string()
                } else {
                    String::new()
                }
            }
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format_double(*value),
            Value::String(text) => text.to_string(),
            Value::Array(_) => "Array".to_string(),
            Value::Object(object) => format!("Object({})", object.class_name),
            Value::Reference(slot) => slot.borrow().to_string_value(),
        }
    }

    pub fn to_array(&self) -> ArrayValue {
        match self {
            Value::Null => ArrayValue::new(),
            Value::Array(array) => (**array).clone(),
            Value::Object(object) => object.properties.borrow().clone(),
            Value::Reference(slot) => slot.borrow().to_array(),
            scalar => ArrayValue::from_values([scalar.to_immutable()]),
        }
    }
}

/// Structural equality, except objects which compare by identity. A reference
/// compares as the value currently in its slot, so a caller's slot and its
/// bound alias stay equal.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Reference(slot), other) => *slot.borrow() == *other,
            (this, Value::Reference(slot)) => *this == *slot.borrow(),
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

static NUMERIC_PREFIX: OnceLock<Regex> = OnceLock::new();

/// Leading-numeric-prefix parse used by loose string coercion: `"12abc"`
/// reads as `12.0`, a string with no numeric prefix reads as `0.0`.
fn numeric_prefix(text: &str) -> f64 {
    let pattern = NUMERIC_PREFIX.get_or_init(|| {
        Regex::new(r"^[ \t\n\r]*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?")
            .expect("numeric prefix pattern is valid")
    });
    pattern
        .find(text)
        .and_then(|m| m.as_str().trim_start().parse::<f64>().ok())
        .unwrap_or(0.0)
}
