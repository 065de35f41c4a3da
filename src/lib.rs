//! A JMESPath expression engine: lexer, Pratt parser, tree-walking
//! interpreter, and the built-in function library (the JMESPath standard
//! functions plus a `current_datetime`-and-friends extension family).
//!
//! ```
//! use jmespath_core::Value;
//!
//! let data: Value = serde_json::json!({"people": [{"name": "a", "age": 30}]}).into();
//! let result = jmespath_core::search("people[0].name", &data).unwrap();
//! assert_eq!(result, Value::string("a"));
//! ```

mod ast;
mod error;
mod functions;
mod interpreter;
mod lexer;
mod parser;
mod runtime;
mod value;

pub use error::{ErrorReason, JmespathError, JmespathResult, RuntimeError};
pub use runtime::{search, Runtime, RuntimeOptions};
pub use value::{ExpressionRef, Object, Value};

/// Parses `expression` without evaluating it, surfacing only syntax errors.
/// Useful for validating user-supplied expressions ahead of time.
pub fn compile(expression: &str) -> Result<(), JmespathError> {
    parser::parse(expression).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Value {
        Value::from(json!({
            "people": [
                {"name": "alice", "age": 30, "tags": ["a", "b"]},
                {"name": "bob", "age": 25, "tags": ["c"]}
            ],
            "nested": {"a": {"b": {"c": 42}}},
            "mixed": [1, [2, 3], [4, [5, 6]]]
        }))
    }

    #[test]
    fn field_and_index() {
        let result = search("people[0].name", &data()).unwrap();
        assert_eq!(result, Value::string("alice"));
    }

    #[test]
    fn negative_index() {
        let result = search("people[-1].name", &data()).unwrap();
        assert_eq!(result, Value::string("bob"));
    }

    #[test]
    fn missing_field_is_null_not_error() {
        let result = search("people[0].nonexistent.deeper", &data()).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn projection_over_array() {
        let result = search("people[*].name", &data()).unwrap();
        assert_eq!(
            result,
            Value::array(vec![Value::string("alice"), Value::string("bob")])
        );
    }

    #[test]
    fn flatten_one_level() {
        let result = search("mixed[]", &data()).unwrap();
        assert_eq!(
            result,
            Value::array(vec![
                Value::number(1),
                Value::number(2),
                Value::number(3),
                Value::number(4),
                Value::array(vec![Value::number(5), Value::number(6)]),
            ])
        );
    }

    #[test]
    fn filter_projection() {
        let result = search("people[?age > `26`].name", &data()).unwrap();
        assert_eq!(result, Value::array(vec![Value::string("alice")]));
    }

    #[test]
    fn pipe_terminates_projection() {
        let result = search("people[*].name | [0]", &data()).unwrap();
        assert_eq!(result, Value::string("alice"));
    }

    #[test]
    fn slice_defaults() {
        let data = Value::from(json!([0, 1, 2, 3, 4]));
        assert_eq!(search("[::]", &data).unwrap(), data);
        assert_eq!(
            search("[::-1]", &data).unwrap(),
            Value::from(json!([4, 3, 2, 1, 0]))
        );
        assert_eq!(search("[1:3]", &data).unwrap(), Value::from(json!([1, 2])));
    }

    #[test]
    fn multi_select_list_and_hash() {
        let result = search("people[0].[name, age]", &data()).unwrap();
        assert_eq!(
            result,
            Value::array(vec![Value::string("alice"), Value::number(30)])
        );

        let result = search("people[0].{n: name, a: age}", &data()).unwrap();
        let obj = result.as_object().unwrap();
        assert_eq!(obj.get("n"), Some(&Value::string("alice")));
        assert_eq!(obj.get("a"), Some(&Value::number(30)));
    }

    #[test]
    fn and_or_not() {
        let d = data();
        assert_eq!(search("people[0].age && people[1].age", &d).unwrap(), Value::number(25));
        assert_eq!(search("`null` || people[0].age", &d).unwrap(), Value::number(30));
        assert_eq!(search("!people[0].age", &d).unwrap(), Value::Bool(false));
    }

    #[test]
    fn comparators() {
        let d = data();
        assert_eq!(search("people[0].age == `30`", &d).unwrap(), Value::Bool(true));
        assert_eq!(search("people[0].age < people[1].age", &d).unwrap(), Value::Bool(false));
    }

    #[test]
    fn functions_length_keys_values() {
        let d = data();
        assert_eq!(search("length(people)", &d).unwrap(), Value::number(2));
        assert_eq!(search("length(people[0].name)", &d).unwrap(), Value::number(5));
        let keys = search("keys(nested.a.b)", &d).unwrap();
        assert_eq!(keys, Value::array(vec![Value::string("c")]));
    }

    #[test]
    fn sort_by_and_max_by() {
        let d = data();
        let oldest = search("max_by(people, &age).name", &d).unwrap();
        assert_eq!(oldest, Value::string("alice"));
        let sorted = search("sort_by(people, &age)[0].name", &d).unwrap();
        assert_eq!(sorted, Value::string("bob"));
    }

    #[test]
    fn sort_by_mixed_kinds_is_invalid_type() {
        let d = Value::from(json!({"items": [{"k": 1}, {"k": "x"}]}));
        let err = search("sort_by(items, &k)", &d).unwrap_err();
        assert!(matches!(
            err.reason,
            ErrorReason::Runtime(RuntimeError::InvalidType { .. })
        ));
    }

    #[test]
    fn map_applies_expression_ref() {
        let d = data();
        let result = search("map(&age, people)", &d).unwrap();
        assert_eq!(result, Value::array(vec![Value::number(30), Value::number(25)]));
    }

    #[test]
    fn merge_is_right_biased() {
        let d = Value::from(json!({"a": {"x": 1, "y": 1}, "b": {"y": 2, "z": 3}}));
        let result = search("merge(a, b)", &d).unwrap();
        let obj = result.as_object().unwrap();
        assert_eq!(obj.get("x"), Some(&Value::number(1)));
        assert_eq!(obj.get("y"), Some(&Value::number(2)));
        assert_eq!(obj.get("z"), Some(&Value::number(3)));
    }

    #[test]
    fn avg_sum_abs() {
        let d = Value::from(json!({"nums": [1, -2, 3]}));
        assert_eq!(search("sum(nums)", &d).unwrap(), Value::number(2));
        assert_eq!(
            search("avg(nums)", &d).unwrap(),
            Value::Number(serde_json::Number::from_f64(2.0 / 3.0).unwrap())
        );
        assert_eq!(search("abs(`-5`)", &d).unwrap(), Value::number(5));
    }

    #[test]
    fn contains_starts_ends_with() {
        let d = Value::from(json!({"s": "hello world", "items": [1, 2, 3]}));
        assert_eq!(search("contains(s, 'world')", &d).unwrap(), Value::Bool(true));
        assert_eq!(search("starts_with(s, 'hello')", &d).unwrap(), Value::Bool(true));
        assert_eq!(search("ends_with(s, 'bye')", &d).unwrap(), Value::Bool(false));
        assert_eq!(search("contains(items, `2`)", &d).unwrap(), Value::Bool(true));
    }

    #[test]
    fn type_and_to_conversions() {
        let d = Value::from(json!({"n": "42", "x": null}));
        assert_eq!(search("type(n)", &d).unwrap(), Value::string("string"));
        assert_eq!(search("to_number(n)", &d).unwrap(), Value::number(42));
        assert_eq!(search("to_number('nope')", &d).unwrap(), Value::Null);
        assert_eq!(
            search("to_array(x)", &d).unwrap(),
            Value::array(vec![Value::Null])
        );
    }

    #[test]
    fn unknown_function_is_an_error() {
        let err = search("no_such_fn(@)", &data()).unwrap_err();
        assert!(matches!(
            err.reason,
            ErrorReason::Runtime(RuntimeError::UnknownFunction(_))
        ));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let err = search("abs(`1`, `2`)", &data()).unwrap_err();
        assert!(matches!(
            err.reason,
            ErrorReason::Runtime(RuntimeError::InvalidArity { .. })
        ));
    }

    #[test]
    fn disable_visit_errors_suppresses_runtime_errors() {
        let runtime = Runtime::new(RuntimeOptions {
            disable_visit_errors: true,
            ..RuntimeOptions::default()
        });
        let result = runtime.search("no_such_fn(@)", &data()).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn syntax_errors_are_never_suppressed() {
        let runtime = Runtime::new(RuntimeOptions {
            disable_visit_errors: true,
            ..RuntimeOptions::default()
        });
        let err = runtime.search("people[", &data()).unwrap_err();
        assert!(matches!(err.reason, ErrorReason::Syntax(_)));
    }

    #[test]
    fn parse_cache_returns_same_result_as_uncached() {
        let runtime = Runtime::new(RuntimeOptions::default());
        let first = runtime.search("people[*].name", &data()).unwrap();
        let second = runtime.search("people[*].name", &data()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn current_datetime_matches_iso8601_with_offset() {
        let result = search("current_datetime()", &data()).unwrap();
        let s = result.as_str().unwrap();
        let re = regex_like_check(s);
        assert!(re, "expected ISO-8601 with offset, got {s}");
    }

    #[test]
    fn seconds_ago_is_close_to_now_minus_delta() {
        let before = chrono::Local::now();
        let result = search("seconds_ago(`10`)", &data()).unwrap();
        let s = result.as_str().unwrap();
        let parsed = chrono::DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%:z").unwrap();
        let expected = before - chrono::Duration::seconds(10);
        let diff = (parsed.timestamp() - expected.timestamp()).abs();
        assert!(diff <= 2, "expected within 2s tolerance, diff was {diff}");
    }

    #[test]
    fn months_ago_clamps_day_of_month() {
        // Not tied to "now" directly since the function always shifts from
        // the current instant, so just assert the result parses as a valid
        // ISO-8601 timestamp with an offset.
        let result = search("months_ago(`1`)", &data()).unwrap();
        assert!(chrono::DateTime::parse_from_str(result.as_str().unwrap(), "%Y-%m-%dT%H:%M:%S%:z").is_ok());
    }

    fn regex_like_check(s: &str) -> bool {
        chrono::DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%:z").is_ok()
    }
}
