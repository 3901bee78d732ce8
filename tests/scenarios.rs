//! End-to-end scenarios exercising the public facade: compile/eval against
//! real environments, covering the cross-module behavior unit tests inside
//! each module can't see on their own.

use celite::{compile, eval, value_from_json, CelError, EvalError, Environment, Value};

#[test]
fn boolean_predicate_over_request_shaped_environment() {
    let env = Environment::new()
        .set("request", {
            let json = serde_json::json!({"path": "/admin", "method": "GET"});
            value_from_json(&json)
        })
        .set("user", {
            let json = serde_json::json!({"role": "admin", "active": true});
            value_from_json(&json)
        });

    let result = eval(
        r#"request.method == "GET" && user.role == "admin" && user.active"#,
        &env,
    )
    .unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn projection_over_a_list_of_records() {
    let records = value_from_json(&serde_json::json!([
        {"name": "alice", "age": 30},
        {"name": "bob", "age": 17},
        {"name": "carol", "age": 25},
    ]));
    let env = Environment::new().set("records", records);

    let adult_names = eval(
        "records.filter(r, r.age >= 18).map(r, r.name)",
        &env,
    )
    .unwrap();
    assert_eq!(
        adult_names,
        Value::List(vec![Value::String("alice".into()), Value::String("carol".into())])
    );
}

#[test]
fn has_distinguishes_absent_from_false() {
    let env = Environment::new().set(
        "config",
        value_from_json(&serde_json::json!({"enabled": false})),
    );
    assert_eq!(eval("has(config.enabled)", &env).unwrap(), Value::Bool(true));
    assert_eq!(eval("has(config.missing)", &env).unwrap(), Value::Bool(false));
    assert_eq!(eval("config.enabled", &env).unwrap(), Value::Bool(false));
}

#[test]
fn compile_once_reused_across_many_environments() {
    let program = compile("quantity * unit_price >= threshold").unwrap();
    let cases = [(3, 10.0, 25.0, true), (1, 5.0, 25.0, false)];
    for (quantity, unit_price, threshold, expected) in cases {
        let env = Environment::new()
            .set("quantity", Value::Int(quantity))
            .set("unit_price", Value::Double(unit_price))
            .set("threshold", Value::Double(threshold));
        assert_eq!(program.evaluate(&env).unwrap(), Value::Bool(expected));
    }
}

#[test]
fn syntax_errors_are_reported_before_any_evaluation_happens() {
    let err = compile("a && && b").unwrap_err();
    assert!(err.position.line >= 1);
}

#[test]
fn runtime_errors_surface_through_the_one_shot_facade() {
    let env = Environment::new().set("items", Value::List(vec![Value::Int(1)]));
    let err = eval("items[5]", &env).unwrap_err();
    match err {
        CelError::Eval(EvalError::IndexOutOfBounds { index, len }) => {
            assert_eq!(index, 5);
            assert_eq!(len, 1);
        }
        other => panic!("expected an index-out-of-bounds error, got {other:?}"),
    }
}

#[test]
fn short_circuit_prevents_the_guarded_side_from_ever_running() {
    // `1 / 0` would raise DivisionByZero if evaluated; short-circuiting
    // `&&`/`||` must never reach it here.
    let env = Environment::new();
    assert_eq!(eval("false && (1 / 0 == 1)", &env).unwrap(), Value::Bool(false));
    assert_eq!(eval("true || (1 / 0 == 1)", &env).unwrap(), Value::Bool(true));
}

#[test]
fn exists_one_counts_exactly_one_match() {
    let env = Environment::new();
    assert_eq!(eval("[1, 2, 3].existsOne(x, x == 2)", &env).unwrap(), Value::Bool(true));
    assert_eq!(eval("[1, 2, 2].existsOne(x, x == 2)", &env).unwrap(), Value::Bool(false));
}

#[test]
fn nested_comprehensions_do_not_shadow_each_others_accumulator() {
    let env = Environment::new();
    let result = eval("[1, 2].map(x, [10, 20].map(y, x + y))", &env).unwrap();
    assert_eq!(
        result,
        Value::List(vec![
            Value::List(vec![Value::Int(11), Value::Int(21)]),
            Value::List(vec![Value::Int(12), Value::Int(22)]),
        ])
    );
}

#[test]
fn struct_literal_fields_are_addressable_like_a_map() {
    let env = Environment::new();
    let result = eval("Point{x: 1, y: 2}.x + Point{x: 1, y: 2}.y", &env).unwrap();
    assert_eq!(result, Value::Int(3));
}

#[test]
fn mixed_numeric_equality_crosses_int_uint_and_double() {
    let env = Environment::new();
    assert_eq!(eval("1 == 1u", &env).unwrap(), Value::Bool(true));
    assert_eq!(eval("1 == 1.0", &env).unwrap(), Value::Bool(true));
    assert_eq!(eval("1u == 1.0", &env).unwrap(), Value::Bool(true));
}
