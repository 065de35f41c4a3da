//! The 26 standard JMESPath functions.

use std::cmp::Ordering;

use crate::error::{JmespathError, RuntimeError};
use crate::interpreter::FunctionContext;
use crate::value::{Object, Value};

use super::{ArgumentType as A, BuiltinFunction, FunctionRegistry, Signature};

/// Defines a zero-field unit struct wired up to a fixed `Signature`, the
/// same shape the pack's other function-extension crates use so a new
/// built-in is always "write the struct, implement `evaluate`, register
/// it" with no other code to touch.
macro_rules! define_function {
    ($name:ident, $args:expr, $variadic:expr) => {
        struct $name {
            signature: Signature,
        }

        impl $name {
            fn new() -> Self {
                $name {
                    signature: Signature::new($args, $variadic),
                }
            }
        }
    };
}

define_function!(AbsFn, vec![A::Number], false);
impl BuiltinFunction for AbsFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let n = args[0].as_f64().unwrap();
        Ok(Value::number(serde_json::Number::from_f64(n.abs()).unwrap_or_else(|| 0.into())))
    }
}

define_function!(AvgFn, vec![A::ArrayOfNumber], false);
impl BuiltinFunction for AvgFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let items = args[0].as_array().unwrap();
        if items.is_empty() {
            return Ok(Value::Null);
        }
        let sum: f64 = items.iter().map(|v| v.as_f64().unwrap()).sum();
        Ok(number_value(sum / items.len() as f64))
    }
}

define_function!(CeilFn, vec![A::Number], false);
impl BuiltinFunction for CeilFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(number_value(args[0].as_f64().unwrap().ceil()))
    }
}

define_function!(FloorFn, vec![A::Number], false);
impl BuiltinFunction for FloorFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(number_value(args[0].as_f64().unwrap().floor()))
    }
}

define_function!(ContainsFn, vec![A::ArrayOrString, A::Any], false);
impl BuiltinFunction for ContainsFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let found = match &args[0] {
            Value::Array(items) => items.iter().any(|v| v == &args[1]),
            Value::String(s) => match &args[1] {
                Value::String(needle) => s.contains(needle.as_ref()),
                _ => false,
            },
            _ => unreachable!(),
        };
        Ok(Value::Bool(found))
    }
}

define_function!(EndsWithFn, vec![A::String, A::String], false);
impl BuiltinFunction for EndsWithFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(Value::Bool(
            args[0].as_str().unwrap().ends_with(args[1].as_str().unwrap()),
        ))
    }
}

define_function!(StartsWithFn, vec![A::String, A::String], false);
impl BuiltinFunction for StartsWithFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(Value::Bool(
            args[0].as_str().unwrap().starts_with(args[1].as_str().unwrap()),
        ))
    }
}

define_function!(JoinFn, vec![A::String, A::ArrayOfString], false);
impl BuiltinFunction for JoinFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let glue = args[0].as_str().unwrap();
        let items = args[1].as_array().unwrap();
        let joined = items
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect::<Vec<_>>()
            .join(glue);
        Ok(Value::string(joined))
    }
}

define_function!(KeysFn, vec![A::Object], false);
impl BuiltinFunction for KeysFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let obj = args[0].as_object().unwrap();
        Ok(Value::array(obj.keys().map(Value::string).collect()))
    }
}

define_function!(ValuesFn, vec![A::Object], false);
impl BuiltinFunction for ValuesFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let obj = args[0].as_object().unwrap();
        Ok(Value::array(obj.values().cloned().collect()))
    }
}

define_function!(LengthFn, vec![A::Sized], false);
impl BuiltinFunction for LengthFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let n = match &args[0] {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(obj) => obj.len(),
            _ => unreachable!(),
        };
        Ok(Value::number(n as i64))
    }
}

define_function!(MapFn, vec![A::Expression, A::Array], false);
impl BuiltinFunction for MapFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let expr_ref = match &args[0] {
            Value::ExpressionRef(e) => e,
            _ => unreachable!(),
        };
        let items = args[1].as_array().unwrap();
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(ctx.eval_expr_ref(expr_ref, item)?);
        }
        Ok(Value::array(out))
    }
}

define_function!(MaxFn, vec![A::Array], false);
impl BuiltinFunction for MaxFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, JmespathError> {
        extreme(args[0].as_array().unwrap(), ctx, "max", Ordering::Greater)
    }
}

define_function!(MinFn, vec![A::Array], false);
impl BuiltinFunction for MinFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, JmespathError> {
        extreme(args[0].as_array().unwrap(), ctx, "min", Ordering::Less)
    }
}

define_function!(MaxByFn, vec![A::Array, A::Expression], false);
impl BuiltinFunction for MaxByFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, JmespathError> {
        extreme_by(args, ctx, "max_by", Ordering::Greater)
    }
}

define_function!(MinByFn, vec![A::Array, A::Expression], false);
impl BuiltinFunction for MinByFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, JmespathError> {
        extreme_by(args, ctx, "min_by", Ordering::Less)
    }
}

define_function!(MergeFn, vec![A::Object], true);
impl BuiltinFunction for MergeFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let mut merged = Object::new();
        for arg in args {
            let obj = arg.as_object().unwrap();
            for (k, v) in obj.iter() {
                merged.insert(k, v.clone());
            }
        }
        Ok(Value::object(merged))
    }
}

define_function!(NotNullFn, vec![A::Any], true);
impl BuiltinFunction for NotNullFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or(Value::Null))
    }
}

define_function!(ReverseFn, vec![A::ArrayOrString], false);
impl BuiltinFunction for ReverseFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(match &args[0] {
            Value::Array(items) => {
                let mut reversed = items.as_ref().clone();
                reversed.reverse();
                Value::array(reversed)
            }
            Value::String(s) => Value::string(s.chars().rev().collect::<String>()),
            _ => unreachable!(),
        })
    }
}

define_function!(SortFn, vec![A::Array], false);
impl BuiltinFunction for SortFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let items = args[0].as_array().unwrap();
        let mut sorted = items.to_vec();
        sort_comparable(&mut sorted, ctx, "sort")?;
        Ok(Value::array(sorted))
    }
}

define_function!(SortByFn, vec![A::Array, A::Expression], false);
impl BuiltinFunction for SortByFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let items = args[0].as_array().unwrap();
        let expr_ref = match &args[1] {
            Value::ExpressionRef(e) => e,
            _ => unreachable!(),
        };
        let mut keyed = Vec::with_capacity(items.len());
        for item in items.iter() {
            keyed.push((ctx.eval_expr_ref(expr_ref, item)?, item.clone()));
        }
        let mut keys: Vec<Value> = keyed.iter().map(|(k, _)| k.clone()).collect();
        sort_comparable(&mut keys, ctx, "sort_by")?;
        // sort_comparable validated every key is mutually comparable; repeat
        // the comparator here against the paired (key, item) rows.
        keyed.sort_by(|(a, _), (b, _)| {
            a.partial_cmp_comparable(b).unwrap_or(Ordering::Equal)
        });
        Ok(Value::array(keyed.into_iter().map(|(_, v)| v).collect()))
    }
}

define_function!(SumFn, vec![A::ArrayOfNumber], false);
impl BuiltinFunction for SumFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let items = args[0].as_array().unwrap();
        let sum: f64 = items.iter().map(|v| v.as_f64().unwrap()).sum();
        Ok(number_value(sum))
    }
}

define_function!(ToArrayFn, vec![A::Any], false);
impl BuiltinFunction for ToArrayFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(match &args[0] {
            Value::Array(_) => args[0].clone(),
            other => Value::array(vec![other.clone()]),
        })
    }
}

define_function!(ToStringFn, vec![A::Any], false);
impl BuiltinFunction for ToStringFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(match &args[0] {
            Value::String(_) => args[0].clone(),
            other => Value::string(other.to_string()),
        })
    }
}

define_function!(ToNumberFn, vec![A::Any], false);
impl BuiltinFunction for ToNumberFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(match &args[0] {
            Value::Number(_) => args[0].clone(),
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .map(number_value)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        })
    }
}

define_function!(TypeFn, vec![A::Any], false);
impl BuiltinFunction for TypeFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(Value::string(args[0].type_name()))
    }
}

fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn extreme(
    items: &[Value],
    ctx: &FunctionContext,
    function: &str,
    want: Ordering,
) -> Result<Value, JmespathError> {
    if items.is_empty() {
        return Ok(Value::Null);
    }
    check_mutually_comparable(items, ctx, function)?;
    let mut best = items[0].clone();
    for item in &items[1..] {
        if item.partial_cmp_comparable(&best) == Some(want) {
            best = item.clone();
        }
    }
    Ok(best)
}

fn extreme_by(
    args: &[Value],
    ctx: &FunctionContext,
    function: &str,
    want: Ordering,
) -> Result<Value, JmespathError> {
    let items = args[0].as_array().unwrap();
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let expr_ref = match &args[1] {
        Value::ExpressionRef(e) => e,
        _ => unreachable!(),
    };
    let mut best_item = items[0].clone();
    let mut best_key = ctx.eval_expr_ref(expr_ref, &best_item)?;
    for item in &items[1..] {
        let key = ctx.eval_expr_ref(expr_ref, item)?;
        match key.partial_cmp_comparable(&best_key) {
            Some(ord) if ord == want => {
                best_key = key;
                best_item = item.clone();
            }
            Some(_) => {}
            None => return Err(mixed_kind_error(ctx, function, &key)),
        }
    }
    Ok(best_item)
}

/// Validates every element is pairwise-comparable with the first (same
/// comparable kind: all numbers, or all strings) before any comparison is
/// used to pick a winner, matching the standard's reject-on-mixed-kind rule.
fn check_mutually_comparable(
    items: &[Value],
    ctx: &FunctionContext,
    function: &str,
) -> Result<(), JmespathError> {
    for item in items {
        if item.partial_cmp_comparable(&items[0]).is_none() {
            return Err(mixed_kind_error(ctx, function, item));
        }
    }
    Ok(())
}

fn mixed_kind_error(ctx: &FunctionContext, function: &str, offending: &Value) -> JmespathError {
    ctx.error(RuntimeError::InvalidType {
        function: function.to_string(),
        position: 0,
        expected: "array of number or array of string (uniform)".to_string(),
        actual: offending.type_name().to_string(),
    })
}

fn sort_comparable(
    items: &mut [Value],
    ctx: &FunctionContext,
    function: &str,
) -> Result<(), JmespathError> {
    check_mutually_comparable(items, ctx, function)?;
    items.sort_by(|a, b| a.partial_cmp_comparable(b).unwrap_or(Ordering::Equal));
    Ok(())
}

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register("abs", Box::new(AbsFn::new()));
    registry.register("avg", Box::new(AvgFn::new()));
    registry.register("ceil", Box::new(CeilFn::new()));
    registry.register("floor", Box::new(FloorFn::new()));
    registry.register("contains", Box::new(ContainsFn::new()));
    registry.register("ends_with", Box::new(EndsWithFn::new()));
    registry.register("starts_with", Box::new(StartsWithFn::new()));
    registry.register("join", Box::new(JoinFn::new()));
    registry.register("keys", Box::new(KeysFn::new()));
    registry.register("values", Box::new(ValuesFn::new()));
    registry.register("length", Box::new(LengthFn::new()));
    registry.register("map", Box::new(MapFn::new()));
    registry.register("max", Box::new(MaxFn::new()));
    registry.register("min", Box::new(MinFn::new()));
    registry.register("max_by", Box::new(MaxByFn::new()));
    registry.register("min_by", Box::new(MinByFn::new()));
    registry.register("merge", Box::new(MergeFn::new()));
    registry.register("not_null", Box::new(NotNullFn::new()));
    registry.register("reverse", Box::new(ReverseFn::new()));
    registry.register("sort", Box::new(SortFn::new()));
    registry.register("sort_by", Box::new(SortByFn::new()));
    registry.register("sum", Box::new(SumFn::new()));
    registry.register("to_array", Box::new(ToArrayFn::new()));
    registry.register("to_string", Box::new(ToStringFn::new()));
    registry.register("to_number", Box::new(ToNumberFn::new()));
    registry.register("type", Box::new(TypeFn::new()));
}
