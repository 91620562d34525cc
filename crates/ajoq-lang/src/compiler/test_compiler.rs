//! Tests for filter compilation: rendered sources, scope reuse and the
//! behaviour of the compiled closures.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use crate::compiler::{Filter, Options};
    use crate::error::compile::CompileError;
    use crate::error::eval::EvalError;
    use crate::{Pattern, Value, from_json};

    fn filter(json: serde_json::Value) -> Filter {
        Filter::new(&from_json(json).unwrap(), &Options::default()).unwrap()
    }

    fn record(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[rstest]
    #[case::empty(json!({}), "return true;")]
    #[case::shorthand(json!({"n": 42}), r#"return (data?.["n"] === 42);"#)]
    #[case::nested(json!({"a": {"b": "x"}}), r#"return (data?.["a"]?.["b"] === "x");"#)]
    #[case::level_joined(
        json!({"n": {"$gt": 1, "$lt": 9}}),
        r#"return (data?.["n"] > 1) && (data?.["n"] < 9);"#
    )]
    #[case::or(
        json!({"$or": [{"n": 1}, {"n": 2}]}),
        r#"return ((data?.["n"] === 1) || (data?.["n"] === 2));"#
    )]
    #[case::nor(json!({"$nor": {"n": 1}}), r#"return !((data?.["n"] === 1));"#)]
    #[case::not(json!({"$not": [{"n": 1}, {"m": 2}]}), r#"return !((data?.["n"] === 1) && (data?.["m"] === 2));"#)]
    #[case::quoted_key(json!({"a\"b": 1}), r#"return (data?.["a\"b"] === 1);"#)]
    #[case::index(json!([1]), r#"return (data?.["0"] === 1);"#)]
    #[case::primitive(json!("x"), r#"return (data === "x");"#)]
    #[case::null(json!(null), "return (data === null);")]
    fn test_source(#[case] spec: serde_json::Value, #[case] expected: &str) {
        assert_eq!(filter(spec).source(), expected);
    }

    #[test]
    fn test_undefined_root_matches_nothing() {
        let filter = Filter::new(&Value::Undefined, &Options::default()).unwrap();

        assert_eq!(filter.source(), "return false;");
        assert_eq!(filter.matches(&Value::new_object()), Ok(false));
        assert_eq!(filter.matches(&Value::Undefined), Ok(false));
    }

    #[test]
    fn test_regex_root() {
        let filter = Filter::new(
            &Value::Regex(Pattern::with_flags("^hello", "i").unwrap()),
            &Options::default(),
        )
        .unwrap();

        assert_eq!(filter.matches(&Value::from("Hello World!")), Ok(true));
        assert_eq!(filter.matches(&Value::from("Goodbye World!")), Ok(false));
        assert_eq!(filter.slots(), 1);
    }

    #[test]
    fn test_bigint_root_uses_strict_equality() {
        let filter = Filter::new(&Value::BigInt(10), &Options::default()).unwrap();

        assert_eq!(filter.source(), "return (data === scope[0]);");
        assert_eq!(filter.matches(&Value::BigInt(10)), Ok(true));
        assert_eq!(filter.matches(&Value::from(10)), Ok(false));
    }

    #[test]
    fn test_identical_sets_share_one_binding() {
        let filter = filter(json!({
            "a": {"$in": [1, 2, 3]},
            "b": {"$nin": [1, 2, 3]},
            "c": {"$sub": [1, 2, 3]},
            "d": {"$in": [3, 2, 1]},
        }));

        assert_eq!(filter.declarations(), 2);
        assert_eq!(
            filter.source(),
            concat!(
                "const v$0 = new Set([1,2,3]);\n",
                "const v$1 = new Set([3,2,1]);\n",
                r#"return v$0.has(data?.["a"]) && !v$0.has(data?.["b"]) && "#,
                r#"data?.["c"].every((value) => v$0.has(value)) && v$1.has(data?.["d"]);"#,
            )
        );
    }

    #[test]
    fn test_equal_composite_elements_share_one_binding() {
        let filter = filter(json!({
            "a": {"$in": [[1, 2]]},
            "b": {"$in": [[1, 2]]},
            "c": {"$in": [{"k": 1}]},
            "d": {"$nin": [{"k": 1}]},
        }));

        assert_eq!(filter.declarations(), 2);
        assert_eq!(filter.slots(), 2);
        assert_eq!(
            filter.source(),
            concat!(
                "const v$0 = new Set([scope[0]]);\n",
                "const v$1 = new Set([scope[1]]);\n",
                r#"return v$0.has(data?.["a"]) && v$0.has(data?.["b"]) && "#,
                r#"v$1.has(data?.["c"]) && !v$1.has(data?.["d"]);"#,
            )
        );
    }

    #[test]
    fn test_distinct_composite_elements_keep_separate_bindings() {
        let filter = filter(json!({"a": {"$in": [[1]]}, "b": {"$in": [[2]]}}));

        assert_eq!(filter.declarations(), 2);
        assert_eq!(filter.slots(), 2);
    }

    #[test]
    fn test_equal_bigint_elements_share_one_binding() {
        let set = || Value::from(vec![Value::BigInt(5), Value::BigInt(9)]);
        let spec: Value = [
            ("a", [("$in", set())].into_iter().collect::<Value>()),
            ("b", [("$nin", set())].into_iter().collect::<Value>()),
        ]
        .into_iter()
        .collect();
        let filter = Filter::new(&spec, &Options::default()).unwrap();

        assert_eq!(filter.declarations(), 1);
        assert_eq!(filter.slots(), 2);

        let matching: Value = [("a", Value::BigInt(9)), ("b", Value::BigInt(6))].into_iter().collect();
        let excluded: Value = [("a", Value::BigInt(9)), ("b", Value::BigInt(5))].into_iter().collect();
        assert_eq!(filter.matches(&matching), Ok(true));
        assert_eq!(filter.matches(&excluded), Ok(false));
    }

    #[test]
    fn test_logic_bare_operands_are_equality() {
        let filter = filter(json!({"n": {"$or": [42, 24]}}));

        assert_eq!(
            filter.source(),
            r#"return ((data?.["n"] === 42) || (data?.["n"] === 24));"#
        );
        assert_eq!(filter.matches(&record(json!({"n": 42}))), Ok(true));
        assert_eq!(filter.matches(&record(json!({"n": 24}))), Ok(true));
        assert_eq!(filter.matches(&record(json!({"n": 1}))), Ok(false));
    }

    #[test]
    fn test_logic_regex_operand_is_match() {
        let filter = filter(json!({"s": {"$nor": [{"$regex": "^a"}, "zed"]}}));

        assert_eq!(filter.matches(&record(json!({"s": "apple"}))), Ok(false));
        assert_eq!(filter.matches(&record(json!({"s": "zed"}))), Ok(false));
        assert_eq!(filter.matches(&record(json!({"s": "banana"}))), Ok(true));
    }

    #[test]
    fn test_superset_declares_per_record_set() {
        let filter = filter(json!({"tags": {"$sup": ["a"]}}));

        assert_eq!(
            filter.source(),
            "const v$0 = new Set(data?.[\"tags\"]);\nreturn [\"a\"].every((value) => v$0.has(value));"
        );
        assert_eq!(filter.matches(&record(json!({"tags": ["a", "b"]}))), Ok(true));
        assert_eq!(filter.matches(&record(json!({"tags": ["b"]}))), Ok(false));
    }

    #[test]
    fn test_missing_intermediate_field_is_undefined() {
        let filter = filter(json!({"a": {"b": {"c": {"$exists": false}}}}));

        assert_eq!(filter.matches(&record(json!({}))), Ok(true));
        assert_eq!(filter.matches(&record(json!({"a": null}))), Ok(true));
        assert_eq!(filter.matches(&record(json!({"a": {"b": {"c": 0}}}))), Ok(false));
    }

    #[test]
    fn test_logic_on_nested_path() {
        let filter = filter(json!({"n": {"$or": [{"$lt": 10}, {"$gt": 40}]}}));

        assert_eq!(filter.matches(&record(json!({"n": 42}))), Ok(true));
        assert_eq!(filter.matches(&record(json!({"n": 24}))), Ok(false));
        assert_eq!(filter.matches(&record(json!({"n": 1}))), Ok(true));
    }

    #[test]
    fn test_eval_error_is_scoped_to_the_record() {
        let filter = filter(json!({"tags": {"$sub": [1, 2]}}));
        let records = vec![record(json!({"tags": [1]})), record(json!({"tags": 1}))];

        assert_eq!(filter.matches(&records[0]), Ok(true));
        assert_eq!(
            filter.matches(&records[1]),
            Err(EvalError::NotAnArray {
                operator: "$sub",
                found: "number"
            })
        );
        assert!(filter.filter(&records).is_err());
    }

    #[test]
    fn test_short_circuit_skips_failing_operand() {
        let filter = filter(json!({"$or": [{"n": 1}, {"n": {"$sub": [1]}}]}));

        assert_eq!(filter.matches(&record(json!({"n": 1}))), Ok(true));
        assert!(filter.matches(&record(json!({"n": 2}))).is_err());
    }

    #[rstest]
    #[case::empty_and(json!({"$and": []}))]
    #[case::in_scalar(json!({"n": {"$in": 1}}))]
    fn test_rejected_at_construction(#[case] spec: serde_json::Value) {
        let result = Filter::new(&from_json(spec).unwrap(), &Options::default());

        assert!(result.is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = (0..8).fold(json!(1), |acc, _| json!({"a": acc}));
        let result = Filter::new(&from_json(deep).unwrap(), &Options { max_depth: 3 });

        assert_eq!(result.unwrap_err(), CompileError::DepthLimitExceeded(3));
    }
}
