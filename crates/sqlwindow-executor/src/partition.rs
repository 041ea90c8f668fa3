use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlwindow_common::result::Row;
use sqlwindow_common::types::Value;
use unicode_normalization::UnicodeNormalization;

use crate::plan::BoundExpr;

/// Decides when two partition-key values belong together.
///
/// Implementations map each value to a canonical representative; two values
/// are equal iff their canonical forms are equal `Value`s. NULL must stay
/// NULL so that all NULL keys share one partition.
pub trait KeyEquality: Send + Sync {
    fn canonicalize(&self, value: &Value) -> Value;
}

impl<F> KeyEquality for F
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn canonicalize(&self, value: &Value) -> Value {
        self(value)
    }
}

/// Structural equality: `1` and `1.0` are different keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictEquality;

impl KeyEquality for StrictEquality {
    fn canonicalize(&self, value: &Value) -> Value {
        value.clone()
    }
}

/// INT64, FLOAT64 and NUMERIC keys with the same numeric value are equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericEquality;

impl KeyEquality for NumericEquality {
    fn canonicalize(&self, value: &Value) -> Value {
        match value {
            Value::Int64(_) => value.clone(),
            Value::Float64(_) | Value::Numeric(_) => match value.as_numeric() {
                Some(d) => canonical_decimal(d),
                None => value.clone(),
            },
            _ => value.clone(),
        }
    }
}

fn canonical_decimal(d: Decimal) -> Value {
    let d = d.normalize();
    if d.scale() == 0 {
        if let Some(i) = d.to_i64() {
            return Value::Int64(i);
        }
    }
    Value::Numeric(d)
}

/// Strings compare after NFC normalization and case folding.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollationEquality;

impl KeyEquality for CollationEquality {
    fn canonicalize(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(s.nfc().collect::<String>().to_lowercase()),
            _ => value.clone(),
        }
    }
}

/// Rows sharing one partition key, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Key values of the first row that landed in this partition.
    pub key: Vec<Value>,
    pub rows: Vec<usize>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Groups row positions by partition key. Partitions come back in order of
/// first appearance; with no key expressions every row lands in a single
/// partition, even when there are no rows at all.
pub fn partition_rows(
    rows: &[Row],
    keys: &[BoundExpr],
    equality: &dyn KeyEquality,
) -> Vec<Partition> {
    if keys.is_empty() {
        return vec![Partition {
            key: Vec::new(),
            rows: (0..rows.len()).collect(),
        }];
    }

    let mut partitions: IndexMap<Vec<Value>, Partition> = IndexMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let canonical: Vec<Value> = keys
            .iter()
            .map(|k| equality.canonicalize(k.eval(row)))
            .collect();
        partitions
            .entry(canonical)
            .or_insert_with(|| Partition {
                key: keys.iter().map(|k| k.eval(row).clone()).collect(),
                rows: Vec::new(),
            })
            .rows
            .push(idx);
    }
    partitions.into_values().collect()
}
