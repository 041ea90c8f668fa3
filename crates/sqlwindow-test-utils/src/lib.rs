#![allow(dead_code)]

use std::str::FromStr;

pub use sqlwindow_common::result::{QueryResult, Row};
pub use sqlwindow_common::types::{DataType, Field, Schema, Value};
use sqlwindow_common::error::Result;

pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::int64(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::int64(self as i64)
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        Value::int64(self as i64)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::float64(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::bool_val(self)
    }
}

pub fn null() -> Value {
    Value::null()
}

pub fn numeric(val: &str) -> Value {
    Value::numeric(rust_decimal::Decimal::from_str(val).unwrap())
}

pub fn n(val: &str) -> Value {
    numeric(val)
}

pub fn date(year: i32, month: u32, day: u32) -> Value {
    Value::date(chrono::NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

pub fn d(year: i32, month: u32, day: u32) -> Value {
    date(year, month, day)
}

/// Float comparison with an absolute-or-relative tolerance; INT64 and
/// FLOAT64 compare by numeric value.
pub fn values_equal(actual: &Value, expected: &Value, epsilon: f64) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Float64(a), Value::Float64(e)) => {
            let (a, e) = (a.0, e.0);
            if a.is_nan() && e.is_nan() {
                return true;
            }
            if a.is_infinite() && e.is_infinite() && a.signum() == e.signum() {
                return true;
            }
            (a - e).abs() < epsilon || (a - e).abs() / e.abs().max(1.0) < epsilon
        }
        (Value::Int64(a), Value::Float64(e)) | (Value::Float64(e), Value::Int64(a)) => {
            (*a as f64 - e.0).abs() < epsilon
        }
        (Value::Null, _) | (_, Value::Null) => false,
        _ => actual == expected,
    }
}

pub fn result_values(result: &QueryResult) -> Vec<Vec<Value>> {
    result.rows.iter().map(|r| r.values().to_vec()).collect()
}

pub fn rows(values: Vec<Vec<Value>>) -> Vec<Row> {
    values.into_iter().map(Row::new).collect()
}

pub fn assert_float_eq(actual: f64, expected: f64, epsilon: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff < epsilon,
        "Float values not equal within epsilon: actual={}, expected={}, diff={}, epsilon={}",
        actual,
        expected,
        diff,
        epsilon
    );
}

pub fn assert_error_contains<T>(result: Result<T>, keywords: &[&str]) {
    match result {
        Ok(_) => panic!("Expected error but got Ok result"),
        Err(e) => {
            let error_msg = e.to_string().to_lowercase();
            let found = keywords
                .iter()
                .any(|keyword| error_msg.contains(&keyword.to_lowercase()));
            assert!(
                found,
                "Error message '{}' does not contain any of the expected keywords: {:?}",
                e, keywords
            );
        }
    }
}

pub fn assert_column_eq(result: &QueryResult, column: &str, expected: Vec<Value>) {
    let actual = result
        .column(column)
        .unwrap_or_else(|| panic!("Column {} not found in {:?}", column, result.column_names()));
    assert_eq!(
        actual.len(),
        expected.len(),
        "Row count mismatch in column {}",
        column
    );
    for (row_idx, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            values_equal(a, e, 1e-9),
            "Value mismatch in column {} row {}: expected {:?}, got {:?}",
            column,
            row_idx,
            e,
            a
        );
    }
}

#[macro_export]
macro_rules! val {
    (null) => { $crate::null() };
    (true) => { $crate::IntoValue::into_value(true) };
    (false) => { $crate::IntoValue::into_value(false) };
    ($($e:tt)+) => { $crate::IntoValue::into_value($($e)+) };
}

#[macro_export]
macro_rules! vals {
    () => { vec![] };
    ($e:tt $(,)?) => { vec![$crate::val!($e)] };
    ($id:ident $args:tt $(, $($rest:tt)*)?) => {
        {
            let mut v = vec![$crate::val!($id $args)];
            v.extend($crate::vals![$($($rest)*)?]);
            v
        }
    };
    (- $e:tt $(, $($rest:tt)*)?) => {
        {
            let mut v = vec![$crate::val!(- $e)];
            v.extend($crate::vals![$($($rest)*)?]);
            v
        }
    };
    ($e:tt $(, $($rest:tt)*)?) => {
        {
            let mut v = vec![$crate::val!($e)];
            v.extend($crate::vals![$($($rest)*)?]);
            v
        }
    };
}

#[macro_export]
macro_rules! table {
    [$([$($val:tt)*]),* $(,)?] => {
        $crate::rows(vec![$($crate::vals![$($val)*]),*])
    };
}

#[macro_export]
macro_rules! assert_table_eq {
    ($actual:expr, []) => {{
        let result: &$crate::QueryResult = &$actual;
        assert_eq!(
            result.row_count(),
            0,
            "Expected empty table but got {} rows",
            result.row_count()
        );
    }};
    ($actual:expr, [$([$($val:tt)*]),* $(,)?]) => {{
        let result: &$crate::QueryResult = &$actual;
        let expected_rows: Vec<Vec<$crate::Value>> = vec![$($crate::vals![$($val)*]),*];
        let actual_rows = $crate::result_values(result);

        assert_eq!(
            actual_rows.len(),
            expected_rows.len(),
            "Row count mismatch: expected {}, got {}",
            expected_rows.len(),
            actual_rows.len()
        );

        for (row_idx, (actual_row, expected_row)) in actual_rows.iter().zip(expected_rows.iter()).enumerate() {
            assert_eq!(
                actual_row.len(),
                expected_row.len(),
                "Column count mismatch at row {}: expected {}, got {}",
                row_idx,
                expected_row.len(),
                actual_row.len()
            );

            for (col_idx, (actual_val, expected_val)) in actual_row.iter().zip(expected_row.iter()).enumerate() {
                assert!(
                    $crate::values_equal(actual_val, expected_val, 1e-9),
                    "Value mismatch at row {} col {}: expected {:?}, got {:?}",
                    row_idx,
                    col_idx,
                    expected_val,
                    actual_val
                );
            }
        }
    }};
}

/// `(dept, name, amount)` sales rows used across the integration suites.
pub fn sales_schema() -> Schema {
    Schema::from_fields(vec![
        Field::nullable("dept", DataType::String),
        Field::nullable("name", DataType::String),
        Field::nullable("amount", DataType::Int64),
    ])
}

pub fn sales_rows() -> Vec<Row> {
    rows(vec![
        vals!["eng", "ann", 300],
        vals!["ops", "bob", 200],
        vals!["eng", "cat", 100],
        vals!["eng", "dan", 300],
        vals!["ops", "eve", 500],
        vals!["eng", "fay", 200],
        vals!["hr", "gus", null],
    ])
}
