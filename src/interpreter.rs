//! Tree-walking evaluator. Walks an [`Ast`] against a *current* value,
//! tracking the *root* value separately for `$`, and dispatches function
//! calls through a [`FunctionRegistry`].

use std::sync::Arc;

use crate::ast::{Ast, Comparator, SlicePart};
use crate::error::{ErrorReason, JmespathError, RuntimeError};
use crate::functions::FunctionRegistry;
use crate::value::{ExpressionRef, Object, Value};

/// Per-search evaluation state threaded through every node visit.
pub struct Interpreter<'a> {
    pub registry: &'a FunctionRegistry,
    pub expression: Arc<str>,
    pub root: Value,
}

impl<'a> Interpreter<'a> {
    pub fn new(registry: &'a FunctionRegistry, expression: Arc<str>, root: Value) -> Self {
        Interpreter {
            registry,
            expression,
            root,
        }
    }

    fn runtime_err(&self, reason: RuntimeError) -> JmespathError {
        JmespathError::new(self.expression.clone(), 0, ErrorReason::Runtime(reason))
    }

    pub fn eval(&self, ast: &Ast, current: &Value) -> Result<Value, JmespathError> {
        match ast {
            Ast::Identity => Ok(current.clone()),
            Ast::Root => Ok(self.root.clone()),
            Ast::Field(name) => Ok(match current {
                Value::Object(obj) => obj.get(name).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Ast::Index(idx) => Ok(match current {
                Value::Array(items) => index_array(items, *idx).unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Ast::Literal(v) => Ok(v.clone()),
            Ast::Subexpression(left, right) => {
                let l = self.eval(left, current)?;
                if l.is_null() {
                    Ok(Value::Null)
                } else {
                    self.eval(right, &l)
                }
            }
            Ast::Pipe(left, right) => {
                let l = self.eval(left, current)?;
                self.eval(right, &l)
            }
            Ast::Comparison(cmp, left, right) => {
                let l = self.eval(left, current)?;
                let r = self.eval(right, current)?;
                Ok(self.compare(*cmp, &l, &r))
            }
            Ast::And(left, right) => {
                let l = self.eval(left, current)?;
                if l.is_truthy() {
                    self.eval(right, current)
                } else {
                    Ok(l)
                }
            }
            Ast::Or(left, right) => {
                let l = self.eval(left, current)?;
                if l.is_truthy() {
                    Ok(l)
                } else {
                    self.eval(right, current)
                }
            }
            Ast::Not(operand) => {
                let v = self.eval(operand, current)?;
                Ok(Value::Bool(!v.is_truthy()))
            }
            Ast::Flatten(inner) => {
                let v = self.eval(inner, current)?;
                Ok(match v {
                    Value::Array(items) => {
                        let mut out = Vec::new();
                        for item in items.iter() {
                            match item {
                                Value::Array(nested) => out.extend(nested.iter().cloned()),
                                other => out.push(other.clone()),
                            }
                        }
                        Value::array(out)
                    }
                    _ => Value::Null,
                })
            }
            Ast::MultiSelectList(items) => {
                if current.is_null() {
                    return Ok(Value::Null);
                }
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval(item, current)?);
                }
                Ok(Value::array(out))
            }
            Ast::MultiSelectHash(pairs) => {
                if current.is_null() {
                    return Ok(Value::Null);
                }
                let mut obj = Object::new();
                for pair in pairs {
                    let v = self.eval(&pair.value, current)?;
                    obj.insert(pair.key.clone(), v);
                }
                Ok(Value::object(obj))
            }
            Ast::ObjectProjection(left, right) => {
                let l = self.eval(left, current)?;
                match l {
                    Value::Object(obj) => {
                        let mut out = Vec::new();
                        for v in obj.values() {
                            let r = self.eval(right, v)?;
                            if !r.is_null() {
                                out.push(r);
                            }
                        }
                        Ok(Value::array(out))
                    }
                    _ => Ok(Value::Null),
                }
            }
            Ast::ArrayProjection(left, right) => {
                let l = self.eval(left, current)?;
                match l {
                    Value::Array(items) => {
                        let mut out = Vec::new();
                        for item in items.iter() {
                            let r = self.eval(right, item)?;
                            if !r.is_null() {
                                out.push(r);
                            }
                        }
                        Ok(Value::array(out))
                    }
                    _ => Ok(Value::Null),
                }
            }
            Ast::SliceProjection(left, start, stop, step, right) => {
                let l = self.eval(left, current)?;
                match l {
                    Value::Array(items) => {
                        let sliced = self.slice(&items, *start, *stop, *step)?;
                        let mut out = Vec::new();
                        for item in &sliced {
                            let r = self.eval(right, item)?;
                            if !r.is_null() {
                                out.push(r);
                            }
                        }
                        Ok(Value::array(out))
                    }
                    _ => Ok(Value::Null),
                }
            }
            Ast::FilterProjection(left, predicate, right) => {
                let l = self.eval(left, current)?;
                match l {
                    Value::Array(items) => {
                        let mut out = Vec::new();
                        for item in items.iter() {
                            let keep = self.eval(predicate, item)?;
                            if keep.is_truthy() {
                                let r = self.eval(right, item)?;
                                if !r.is_null() {
                                    out.push(r);
                                }
                            }
                        }
                        Ok(Value::array(out))
                    }
                    _ => Ok(Value::Null),
                }
            }
            Ast::Function(name, arg_exprs) => self.eval_function(name, arg_exprs, current),
            Ast::ExpressionRefNode(ast, source) => Ok(Value::ExpressionRef(ExpressionRef {
                ast: ast.clone(),
                source: source.clone(),
            })),
        }
    }

    fn compare(&self, cmp: Comparator, left: &Value, right: &Value) -> Value {
        match cmp {
            Comparator::Eq => Value::Bool(left == right),
            Comparator::Ne => Value::Bool(left != right),
            Comparator::Lt | Comparator::Le | Comparator::Gt | Comparator::Ge => {
                match left.partial_cmp_comparable(right) {
                    Some(ordering) => Value::Bool(match cmp {
                        Comparator::Lt => ordering.is_lt(),
                        Comparator::Le => ordering.is_le(),
                        Comparator::Gt => ordering.is_gt(),
                        Comparator::Ge => ordering.is_ge(),
                        _ => unreachable!(),
                    }),
                    None => Value::Null,
                }
            }
        }
    }

    /// Evaluates a JMESPath slice `[start:stop:step]` against `items`.
    fn slice(
        &self,
        items: &[Value],
        start: SlicePart,
        stop: SlicePart,
        step: SlicePart,
    ) -> Result<Vec<Value>, JmespathError> {
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(self.runtime_err(RuntimeError::InvalidValue(
                "slice step cannot be 0".to_string(),
            )));
        }
        let len = items.len() as i64;

        // Canonical capSlice: a negative index that's still negative after
        // adding `len` floors to -1 when the step runs backward (so the
        // slice can still reach index 0) and to 0 when it runs forward.
        let floor = if step < 0 { -1 } else { 0 };
        let adjust = |value: i64| -> i64 {
            if value < 0 {
                (value + len).max(floor)
            } else {
                value.min(len)
            }
        };

        let (mut cur, stop_at) = if step > 0 {
            let start = start.map(adjust).unwrap_or(0);
            let stop = stop.map(adjust).unwrap_or(len);
            (start, stop)
        } else {
            let start = start
                .map(adjust)
                .map(|v| v.min(len - 1))
                .unwrap_or(len - 1);
            let stop = match stop {
                Some(s) => adjust(s),
                None => -1,
            };
            (start, stop)
        };

        let mut out = Vec::new();
        if step > 0 {
            while cur < stop_at {
                if let Some(v) = items.get(cur as usize) {
                    out.push(v.clone());
                }
                cur += step;
            }
        } else {
            while cur > stop_at {
                if cur >= 0 {
                    if let Some(v) = items.get(cur as usize) {
                        out.push(v.clone());
                    }
                }
                cur += step;
            }
        }
        Ok(out)
    }

    fn eval_function(
        &self,
        name: &str,
        arg_exprs: &[Ast],
        current: &Value,
    ) -> Result<Value, JmespathError> {
        let spec = self
            .registry
            .get(name)
            .ok_or_else(|| self.runtime_err(RuntimeError::UnknownFunction(name.to_string())))?;

        let mut args = Vec::with_capacity(arg_exprs.len());
        for arg_ast in arg_exprs {
            // An argument written as `&expr` is never evaluated here; it is
            // captured as an ExpressionRef and left for the function to
            // evaluate (or not) against elements of its choosing.
            if let Ast::ExpressionRefNode(inner, source) = arg_ast {
                args.push(Value::ExpressionRef(ExpressionRef {
                    ast: inner.clone(),
                    source: source.clone(),
                }));
            } else {
                args.push(self.eval(arg_ast, current)?);
            }
        }

        spec.check_arity(name, args.len())
            .map_err(|e| self.runtime_err(e))?;
        spec.check_types(name, &args).map_err(|e| self.runtime_err(e))?;

        let ctx = FunctionContext {
            interpreter: self,
            expression: self.expression.clone(),
        };
        spec.evaluate(&args, &ctx)
    }
}

/// Context handed to a function's evaluator: gives it a way to recurse
/// into the interpreter (to evaluate an `ExpressionRef` against an
/// element) and to build errors tied to the calling expression.
pub struct FunctionContext<'a, 'b> {
    pub interpreter: &'a Interpreter<'b>,
    pub expression: Arc<str>,
}

impl<'a, 'b> FunctionContext<'a, 'b> {
    pub fn error(&self, reason: RuntimeError) -> JmespathError {
        JmespathError::new(self.expression.clone(), 0, ErrorReason::Runtime(reason))
    }

    /// Evaluates an `ExpressionRef` (e.g. the `&timestamp` in
    /// `sort_by(@, &timestamp)`) against a given element.
    pub fn eval_expr_ref(
        &self,
        expr_ref: &ExpressionRef,
        element: &Value,
    ) -> Result<Value, JmespathError> {
        self.interpreter.eval(&expr_ref.ast, element)
    }
}

fn index_array(items: &[Value], idx: i64) -> Option<Value> {
    let len = items.len() as i64;
    let real = if idx < 0 { idx + len } else { idx };
    if real < 0 || real >= len {
        None
    } else {
        items.get(real as usize).cloned()
    }
}

