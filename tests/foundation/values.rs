//! Value semantics exercised through the public API.

use drover_foundation::{Type, Value};

#[test]
fn conversions_round_trip() {
    assert_eq!(Value::from(42i64).as_int(), Some(42));
    assert_eq!(Value::from(2.5f64).as_float(), Some(2.5));
    assert_eq!(Value::from("hi").as_str(), Some("hi"));
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert_eq!(Value::from(String::from("owned")).as_str(), Some("owned"));
}

#[test]
fn value_types_match_declared_types() {
    assert_eq!(Value::Int(1).value_type(), Type::Int);
    assert_eq!(Value::Float(1.0).value_type(), Type::Float);
    assert_eq!(Value::from("s").value_type(), Type::String);
    assert_eq!(Value::Bool(false).value_type(), Type::Bool);
}

#[test]
fn int_and_float_are_distinct_but_comparable() {
    // Distinct for equality (and therefore hashing)
    assert_ne!(Value::Int(1), Value::Float(1.0));
    // Comparable for ordering
    assert!(Value::Int(1) < Value::Float(1.5));
    assert!(Value::Float(0.5) < Value::Int(1));
}

#[test]
fn string_ordering_is_lexicographic() {
    assert!(Value::from("alpha") < Value::from("beta"));
    assert!(Value::from("a") < Value::from("ab"));
}

#[test]
fn ordered_types_align_with_value_comparability() {
    // Every ordered type compares within itself
    assert!(Type::Int.is_ordered());
    assert!(Value::Int(1).partial_cmp(&Value::Int(2)).is_some());

    // Bool is unordered and bool values refuse cross-type comparison
    assert!(!Type::Bool.is_ordered());
    assert!(Value::Bool(true).partial_cmp(&Value::Int(1)).is_none());
}
