//! The `Runtime` façade: parsing with a bounded LRU cache, the function
//! registry, and the `disable_visit_errors` suppression policy described in
//! SPEC_FULL.md's error handling design.

use std::sync::Arc;
use std::sync::Mutex;

use lru::LruCache;
use once_cell::sync::Lazy;

use crate::ast::Ast;
use crate::error::{ErrorReason, JmespathError};
use crate::functions::FunctionRegistry;
use crate::interpreter::Interpreter;
use crate::parser;
use crate::value::Value;

/// Configuration recognized by [`Runtime::new`].
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// When `true`, runtime (evaluation-time) errors are swallowed and the
    /// search returns `Value::Null` instead of propagating. Syntax errors
    /// are never suppressed by this flag.
    pub disable_visit_errors: bool,
    /// Bound on the number of parsed expressions kept in the LRU cache.
    pub parse_cache_size: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            disable_visit_errors: false,
            parse_cache_size: 128,
        }
    }
}

/// Parses and evaluates JMESPath expressions against [`Value`] documents.
///
/// Holds a bounded cache of parsed expressions (keyed by source text) and
/// the function registry consulted by every `Function` AST node. A single
/// `Runtime` can be shared across threads: the cache is guarded by a
/// `Mutex`, the same straightforward synchronization the rest of this
/// crate favors over a lock-free structure.
pub struct Runtime {
    options: RuntimeOptions,
    cache: Mutex<LruCache<Arc<str>, Arc<Ast>>>,
    registry: FunctionRegistry,
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> Self {
        let capacity = std::num::NonZeroUsize::new(options.parse_cache_size.max(1)).unwrap();
        Runtime {
            options,
            cache: Mutex::new(LruCache::new(capacity)),
            registry: FunctionRegistry::new(),
        }
    }

    /// Parses `expression`, consulting and populating the LRU cache.
    fn compile(&self, expression: &str) -> Result<Arc<Ast>, JmespathError> {
        let key: Arc<str> = Arc::from(expression);
        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return Ok(cached.clone());
        }
        let ast = Arc::new(parser::parse(expression)?);
        self.cache.lock().unwrap().put(key, ast.clone());
        Ok(ast)
    }

    /// Parses and evaluates `expression` against `data`.
    pub fn search(&self, expression: &str, data: &Value) -> Result<Value, JmespathError> {
        let ast = self.compile(expression)?;
        let interpreter = Interpreter::new(&self.registry, Arc::from(expression), data.clone());
        match interpreter.eval(&ast, data) {
            Ok(v) => Ok(v),
            Err(e) => {
                if self.options.disable_visit_errors && is_suppressible(&e.reason) {
                    Ok(Value::Null)
                } else {
                    Err(e)
                }
            }
        }
    }
}

fn is_suppressible(reason: &ErrorReason) -> bool {
    match reason {
        ErrorReason::Syntax(_) => false,
        ErrorReason::Runtime(e) => e.is_suppressible(),
    }
}

static DEFAULT_RUNTIME: Lazy<Runtime> = Lazy::new(|| Runtime::new(RuntimeOptions::default()));

/// Parses and evaluates `expression` against `data` using a process-wide
/// default `Runtime`. Prefer constructing your own `Runtime` if you need a
/// non-default parse cache size or error-suppression policy.
pub fn search(expression: &str, data: &Value) -> Result<Value, JmespathError> {
    DEFAULT_RUNTIME.search(expression, data)
}
