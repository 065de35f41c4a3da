//! The built-in function library: a name -> [`BuiltinFunction`] registry
//! plus the `Signature`/`ArgumentType` machinery used to check arity and
//! argument types before a function's evaluator ever runs.
//!
//! Mirrors the shape of the upstream `jmespath` crate's function-extension
//! API that this family of crates builds against: a `Signature` describes
//! what a function accepts, a small unit struct implements the evaluation,
//! and a registry maps names to boxed trait objects. Adding a function
//! never touches the interpreter's dispatch code.

mod datetime;
mod standard;

use std::collections::HashMap;

use crate::error::RuntimeError;
use crate::interpreter::FunctionContext;
use crate::value::Value;

/// One accepted shape for a function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    Any,
    Number,
    String,
    Boolean,
    Null,
    Array,
    ArrayOfNumber,
    ArrayOfString,
    Object,
    Expression,
    /// `array | string` — accepted by `contains`, `reverse`.
    ArrayOrString,
    /// `array | string | object` — accepted by `length`, the one standard
    /// function whose "size" notion spans all three container-ish shapes.
    Sized,
}

impl ArgumentType {
    fn describe(self) -> &'static str {
        match self {
            ArgumentType::Any => "any",
            ArgumentType::Number => "number",
            ArgumentType::String => "string",
            ArgumentType::Boolean => "boolean",
            ArgumentType::Null => "null",
            ArgumentType::Array => "array",
            ArgumentType::ArrayOfNumber => "array of number",
            ArgumentType::ArrayOfString => "array of string",
            ArgumentType::Object => "object",
            ArgumentType::Expression => "expression",
            ArgumentType::ArrayOrString => "array or string",
            ArgumentType::Sized => "array, string or object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ArgumentType::Any => true,
            ArgumentType::Number => matches!(value, Value::Number(_)),
            ArgumentType::String => matches!(value, Value::String(_)),
            ArgumentType::Boolean => matches!(value, Value::Bool(_)),
            ArgumentType::Null => matches!(value, Value::Null),
            ArgumentType::Array => matches!(value, Value::Array(_)),
            ArgumentType::ArrayOfNumber => matches!(value, Value::Array(items) if items.iter().all(|v| matches!(v, Value::Number(_)))),
            ArgumentType::ArrayOfString => matches!(value, Value::Array(items) if items.iter().all(|v| matches!(v, Value::String(_)))),
            ArgumentType::Object => matches!(value, Value::Object(_)),
            ArgumentType::Expression => matches!(value, Value::ExpressionRef(_)),
            ArgumentType::ArrayOrString => matches!(value, Value::Array(_) | Value::String(_)),
            ArgumentType::Sized => matches!(value, Value::Array(_) | Value::String(_) | Value::Object(_)),
        }
    }
}

/// Describes how many arguments a function accepts, and the per-position
/// type constraint for each. The last entry's type applies to every
/// argument past the declared count when `variadic` is set.
pub struct Signature {
    pub arg_types: Vec<ArgumentType>,
    pub variadic: bool,
}

impl Signature {
    pub fn new(arg_types: Vec<ArgumentType>, variadic: bool) -> Self {
        Signature { arg_types, variadic }
    }

    fn expected_description(&self) -> String {
        if self.variadic {
            format!("at least {}", self.arg_types.len())
        } else {
            self.arg_types.len().to_string()
        }
    }

    fn check_arity(&self, function: &str, actual: usize) -> Result<(), RuntimeError> {
        let ok = if self.variadic {
            actual >= self.arg_types.len()
        } else {
            actual == self.arg_types.len()
        };
        if ok {
            Ok(())
        } else {
            Err(RuntimeError::InvalidArity {
                function: function.to_string(),
                expected: self.expected_description(),
                actual,
            })
        }
    }

    fn check_types(&self, function: &str, args: &[Value]) -> Result<(), RuntimeError> {
        for (i, arg) in args.iter().enumerate() {
            let spec = self
                .arg_types
                .get(i)
                .or_else(|| if self.variadic { self.arg_types.last() } else { None });
            if let Some(spec) = spec {
                if !spec.matches(arg) {
                    return Err(RuntimeError::InvalidType {
                        function: function.to_string(),
                        position: i,
                        expected: spec.describe().to_string(),
                        actual: arg.type_name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Implemented by every built-in function. `evaluate` receives already
/// arity- and type-checked arguments.
pub trait BuiltinFunction: Send + Sync {
    fn signature(&self) -> &Signature;
    fn evaluate(
        &self,
        args: &[Value],
        ctx: &FunctionContext,
    ) -> Result<Value, crate::error::JmespathError>;
}

/// Internal wrapper so the interpreter can check arity/types once, outside
/// of each function's `evaluate`, and always in the same order.
pub(crate) struct Entry {
    inner: Box<dyn BuiltinFunction>,
}

impl Entry {
    pub fn check_arity(&self, function: &str, actual: usize) -> Result<(), RuntimeError> {
        self.inner.signature().check_arity(function, actual)
    }

    pub fn check_types(&self, function: &str, args: &[Value]) -> Result<(), RuntimeError> {
        self.inner.signature().check_types(function, args)
    }

    pub fn evaluate(
        &self,
        args: &[Value],
        ctx: &FunctionContext,
    ) -> Result<Value, crate::error::JmespathError> {
        self.inner.evaluate(args, ctx)
    }
}

/// The name -> function table consulted for every `Ast::Function` node.
pub struct FunctionRegistry {
    functions: HashMap<String, Entry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = FunctionRegistry {
            functions: HashMap::new(),
        };
        standard::register(&mut registry);
        datetime::register(&mut registry);
        registry
    }

    pub fn register(&mut self, name: &str, f: Box<dyn BuiltinFunction>) {
        self.functions.insert(name.to_string(), Entry { inner: f });
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Entry> {
        self.functions.get(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
