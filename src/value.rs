//! The abstract JSON value the interpreter navigates and produces.
//!
//! `Value` is intentionally decoupled from any host JSON library's type:
//! the engine's projections, filters and comparators only need to know
//! about these six shapes. Conversions to and from `serde_json::Value` are
//! provided so a host that already parsed a document with `serde_json` can
//! bridge into the engine without the engine itself taking on document
//! parsing as a responsibility (see the non-goals in SPEC_FULL.md).

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde_json::Number;

use crate::ast::Ast;

/// An ordered, insertion-preserving `String -> Value` mapping.
///
/// JMESPath objects are rarely large enough that the engine benefits from a
/// hash-indexed map, and insertion order must be preserved for projection
/// output determinism (`*` over an object, `keys`/`values`), so this is a
/// flat `Vec` of pairs rather than a `HashMap` or an external `indexmap`
/// dependency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object(Vec<(String, Value)>);

impl Object {
    pub fn new() -> Self {
        Object(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut obj = Object::new();
        for (k, v) in iter {
            obj.insert(k, v);
        }
        obj
    }
}

/// An expression passed unevaluated to a higher-order function (`&expr`),
/// along with the source text it was parsed from (used for error reporting
/// if evaluating it fails).
#[derive(Debug, Clone)]
pub struct ExpressionRef {
    pub ast: Arc<Ast>,
    pub source: Arc<str>,
}

impl PartialEq for ExpressionRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ast, &other.ast)
    }
}

/// The abstract JSON value the interpreter reads and produces.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<Object>),
    ExpressionRef(ExpressionRef),
}

/// Numbers compare by numeric value rather than by `serde_json::Number`'s
/// own variant-strict equality (which treats `2` and `2.0` as unequal
/// because one is stored as an integer variant and the other as a float).
/// JMESPath's `==`/`!=` and the function library (`sum`, `avg`, `ceil`,
/// `floor`, `to_number`) all produce and compare numbers without regard to
/// that storage distinction.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::ExpressionRef(a), Value::ExpressionRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    pub fn object(obj: Object) -> Self {
        Value::Object(Arc::new(obj))
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Value::Number(n.into())
    }

    /// JMESPath truthiness: `false`, `null`, `""`, `[]` and `{}` are falsy;
    /// everything else (including `0` and `0.0`) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::ExpressionRef(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The JMESPath type name used by `type(@)` and in type-error messages:
    /// one of `"null"`, `"boolean"`, `"number"`, `"string"`, `"array"`,
    /// `"object"`, `"expression"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::ExpressionRef(_) => "expression",
        }
    }

    /// JMESPath ordering for `sort`/`sort_by`/`min`/`max`/`min_by`/`max_by`
    /// key values: only defined between two numbers or two strings.
    pub fn partial_cmp_comparable(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::Value::try_from(self.clone()) {
            Ok(v) => write!(f, "{v}"),
            Err(_) => write!(f, "<expression>"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s.into()),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let obj = map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect();
                Value::object(obj)
            }
        }
    }
}

/// Bridges an evaluation result back out to `serde_json`. Fails only for
/// `ExpressionRef`, which has no JSON representation.
impl TryFrom<Value> for serde_json::Value {
    type Error = &'static str;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        Ok(match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    out.push(serde_json::Value::try_from(item.clone())?);
                }
                serde_json::Value::Array(out)
            }
            Value::Object(obj) => {
                let mut map = serde_json::Map::new();
                for (k, v) in obj.iter() {
                    map.insert(k.to_string(), serde_json::Value::try_from(v.clone())?);
                }
                serde_json::Value::Object(map)
            }
            Value::ExpressionRef(_) => return Err("expression references have no JSON form"),
        })
    }
}
