use matrun::errors::BindError;
use matrun::project::{CompiledFunction, FunctionInfo};
use matrun::value::Value;

fn function(inputs: &[&str]) -> CompiledFunction {
    CompiledFunction::from_info(
        "f",
        &FunctionInfo {
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: vec!["y".to_string()],
        },
    )
}

#[test]
fn binding_style_does_not_change_the_result() {
    let f = function(&["a", "b", "c"]);
    let expected = vec![Value::Int(1), Value::Int(2), Value::Int(3)];

    let all_positional = f
        .bind(vec![Value::Int(1), Value::Int(2), Value::Int(3)], vec![])
        .unwrap();
    let all_named = f
        .bind(
            vec![],
            vec![
                ("c".into(), Value::Int(3)),
                ("a".into(), Value::Int(1)),
                ("b".into(), Value::Int(2)),
            ],
        )
        .unwrap();
    let mixed = f
        .bind(
            vec![Value::Int(1), Value::Int(3)],
            vec![("b".into(), Value::Int(2))],
        )
        .unwrap();

    assert_eq!(all_positional, expected);
    assert_eq!(all_named, expected);
    assert_eq!(mixed, expected);
}

#[test]
fn named_only_later_parameter_reports_the_gap() {
    let f = function(&["a", "b"]);
    match f.bind(vec![], vec![("b".into(), Value::Int(2))]) {
        Err(BindError::MissingInputInChain { missing, .. }) => {
            assert_eq!(missing, vec!["a".to_string()]);
        }
        other => panic!("expected MissingInputInChain, got {:?}", other),
    }
}

#[test]
fn gap_in_the_middle_names_only_unset_parameters_before_the_last_set_one() {
    let f = function(&["a", "b", "c", "d"]);
    match f.bind(
        vec![],
        vec![("a".into(), Value::Int(1)), ("c".into(), Value::Int(3))],
    ) {
        Err(BindError::MissingInputInChain { missing, .. }) => {
            // d is legally omitted; only the actual gap member is reported.
            assert_eq!(missing, vec!["b".to_string()]);
        }
        other => panic!("expected MissingInputInChain, got {:?}", other),
    }
}

#[test]
fn unknown_named_argument_is_rejected() {
    let f = function(&["a", "b"]);
    match f.bind(vec![], vec![("nope".into(), Value::Int(1))]) {
        Err(BindError::UnknownParameter { name, expected, .. }) => {
            assert_eq!(name, "nope");
            assert_eq!(expected, "a,b");
        }
        other => panic!("expected UnknownParameter, got {:?}", other),
    }
}

#[test]
fn positional_overflow_is_rejected() {
    let f = function(&["a"]);
    match f.bind(vec![Value::Int(1), Value::Int(2)], vec![]) {
        Err(BindError::TooManyArguments { given, declared, .. }) => {
            assert_eq!(given, 2);
            assert_eq!(declared, 1);
        }
        other => panic!("expected TooManyArguments, got {:?}", other),
    }
}

#[test]
fn positional_fills_around_named_slots() {
    let f = function(&["a", "b", "c"]);
    // b is taken by name, so positionals land on a then c.
    let bound = f
        .bind(
            vec![Value::from("first"), Value::from("third")],
            vec![("b".into(), Value::from("second"))],
        )
        .unwrap();
    assert_eq!(
        bound,
        vec![
            Value::from("first"),
            Value::from("second"),
            Value::from("third")
        ]
    );
}

#[test]
fn shortened_calls_bind_a_prefix() {
    let f = function(&["a", "b", "c"]);
    let bound = f.bind(vec![Value::Int(1), Value::Int(2)], vec![]).unwrap();
    assert_eq!(bound.len(), 2);
}
