//! The abstract syntax tree produced by the parser and walked by the
//! interpreter. Nodes are immutable once built and are cheap to share via
//! `Arc` (the parse cache and `ExpressionRef` values both hold `Arc<Ast>`).

use std::sync::Arc;

use crate::value::Value;

/// A comparison operator node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// One component of a `[start:stop:step]` slice expression. `None` means
/// the component was omitted and takes its sign-dependent default.
pub type SlicePart = Option<i64>;

/// A key/expression pair inside a `{key: expr, ...}` multi-select-hash.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: String,
    pub value: Ast,
}

/// AST node kinds, matching SPEC_FULL.md section 3.2 one-for-one.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// `@` — the current value.
    Identity,
    /// `$` — the root value the search started from.
    Root,
    /// A bare or quoted identifier: `foo`, `"foo bar"`.
    Field(String),
    /// `[N]` — integer index, possibly negative.
    Index(i64),
    /// `` `literal` `` — an embedded JSON literal.
    Literal(Value),
    /// `a.b` — evaluate the right side against the left side's result.
    Subexpression(Box<Ast>, Box<Ast>),
    /// `a | b` — like Subexpression, but terminates projection absorption:
    /// the right side is never lifted element-wise even if the left side
    /// produced a projection.
    Pipe(Box<Ast>, Box<Ast>),
    /// `a == b`, `a < b`, etc.
    Comparison(Comparator, Box<Ast>, Box<Ast>),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Not(Box<Ast>),
    /// `a[]` — flattens one level of array nesting.
    Flatten(Box<Ast>),
    /// `[a, b, c]` — multi-select list.
    MultiSelectList(Vec<Ast>),
    /// `{a: expr, b: expr}` — multi-select hash, key order preserved.
    MultiSelectHash(Vec<HashPair>),
    /// `left[*]right` / `left.*right` over object values.
    ObjectProjection(Box<Ast>, Box<Ast>),
    /// `left[*]right` over array elements.
    ArrayProjection(Box<Ast>, Box<Ast>),
    /// `left[start:stop:step]right`.
    SliceProjection(Box<Ast>, SlicePart, SlicePart, SlicePart, Box<Ast>),
    /// `left[?predicate]right`.
    FilterProjection(Box<Ast>, Box<Ast>, Box<Ast>),
    /// `name(args...)`.
    Function(String, Vec<Ast>),
    /// `&expr` — an expression reference, legal only as a function argument.
    ExpressionRefNode(Arc<Ast>, Arc<str>),
}
