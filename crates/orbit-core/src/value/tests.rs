// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;
use proptest::prelude::*;

#[test]
fn null_handle_collapses_to_null() {
    let v = Value::object_handle(0);
    assert!(matches!(v, Value::Null));
}

#[test]
fn null_compares_equal_only_to_null_and_null_handles() {
    assert_eq!(Value::Null, Value::Null);
    assert_eq!(Value::Null, Value::object_handle(0));
    assert_ne!(Value::Null, Value::Number(0.0));
    assert_ne!(Value::Null, Value::Bool(false));
}

#[test]
fn bool_coercions() {
    assert!(!Value::Null.to_bool());
    assert!(Value::Number(1.0).to_bool());
    assert!(!Value::Number(0.0).to_bool());
    assert!(!Value::Number(f64::NAN).to_bool());
    assert!(Value::String("x".into()).to_bool());
    assert!(!Value::String(String::new().into()).to_bool());
    assert!(Value::ObjectHandle(7).to_bool());
}

#[test]
fn number_coercions() {
    assert_eq!(Value::Null.to_number(), 0.0);
    assert_eq!(Value::Bool(true).to_number(), 1.0);
    assert_eq!(Value::Bool(false).to_number(), 0.0);
    assert_eq!(Value::String("42".into()).to_number(), 42.0);
    assert!(Value::String("not a number".into()).to_number().is_nan());
    assert!(Value::ObjectHandle(1).to_number().is_nan());
}

#[test]
fn string_coercion_is_canonical() {
    assert_eq!(Value::Number(3.0).to_text(), "3");
    assert_eq!(Value::Number(3.5).to_text(), "3.5");
    assert_eq!(Value::Bool(true).to_text(), "true");
    assert_eq!(Value::Null.to_text(), "null");
    assert_eq!(Value::ObjectHandle(1).to_text(), "[object]");
}

#[test]
fn cross_type_comparison_precedence() {
    // null ordered by truthiness against everything else
    assert_eq!(Value::Null.compare(&Value::Number(0.0)), 0);
    assert_eq!(Value::Null.compare(&Value::Number(1.0)), -1);

    // string wins: other side is stringified
    assert_eq!(Value::String("3".into()).compare(&Value::Number(3.0)), 0);
    assert_eq!(Value::String("10".into()).compare(&Value::Number(9.0)), -1); // "10" < "9" lexicographically

    // number wins when no string is involved
    assert_eq!(Value::Bool(true).compare(&Value::Number(2.0)), -1);

    // NaN is unordered
    assert_eq!(Value::Number(f64::NAN).compare(&Value::Number(1.0)), 0);
}

#[test]
fn handle_comparison_is_numeric() {
    assert_eq!(Value::ObjectHandle(3).compare(&Value::ObjectHandle(5)), -1);
    assert_eq!(Value::ObjectHandle(5).compare(&Value::ObjectHandle(5)), 0);
}

proptest! {
    #[test]
    fn integral_number_round_trips_through_text(n in -1_000_000_i64..1_000_000_i64) {
        let v = Value::Number(n as f64);
        let text = v.to_text();
        let parsed: f64 = text.parse().unwrap();
        prop_assert_eq!(parsed, n as f64);
    }

    #[test]
    fn bool_round_trips_through_string(b in any::<bool>()) {
        let text = Value::Bool(b).to_text();
        let back = Value::String(text.as_str().into()).to_bool();
        prop_assert_eq!(back, b);
    }
}
