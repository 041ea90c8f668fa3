use std::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sqlwindow_common::error::{Error, Result};
use sqlwindow_common::types::Value;
use sqlwindow_ir::AggregateFunction;

const NUMERIC_INPUT: &str = "INT64, FLOAT64 or NUMERIC";

/// Running state of one aggregate over a growing set of rows.
#[derive(Debug, Clone)]
pub(crate) enum Accumulator {
    Sum(SumState),
    Count(i64),
    CountStar(i64),
    Avg(AvgState),
    Min(Option<Value>),
    Max(Option<Value>),
}

impl Accumulator {
    /// `has_arg == false` is only meaningful for COUNT, where it means `COUNT(*)`.
    pub(crate) fn new(function: AggregateFunction, has_arg: bool) -> Self {
        match function {
            AggregateFunction::Sum => Accumulator::Sum(SumState::Empty),
            AggregateFunction::Count if has_arg => Accumulator::Count(0),
            AggregateFunction::Count => Accumulator::CountStar(0),
            AggregateFunction::Avg => Accumulator::Avg(AvgState::default()),
            AggregateFunction::Min => Accumulator::Min(None),
            AggregateFunction::Max => Accumulator::Max(None),
        }
    }

    /// Adds one row. `value` is `None` for `COUNT(*)`, which has no argument.
    pub(crate) fn accumulate(&mut self, value: Option<&Value>) -> Result<()> {
        if let Accumulator::CountStar(n) = self {
            *n += 1;
            return Ok(());
        }
        let value = match value {
            Some(v) if !v.is_null() => v,
            _ => return Ok(()),
        };
        match self {
            Accumulator::Sum(state) => state.add(value)?,
            Accumulator::Count(n) => *n += 1,
            Accumulator::CountStar(_) => {}
            Accumulator::Avg(state) => state.add(value)?,
            Accumulator::Min(current) => keep_if(current, value, Ordering::Less),
            Accumulator::Max(current) => keep_if(current, value, Ordering::Greater),
        }
        Ok(())
    }

    pub(crate) fn finalize(&self) -> Result<Value> {
        match self {
            Accumulator::Sum(state) => Ok(state.value()),
            Accumulator::Count(n) | Accumulator::CountStar(n) => Ok(Value::int64(*n)),
            Accumulator::Avg(state) => state.value(),
            Accumulator::Min(v) | Accumulator::Max(v) => Ok(v.clone().unwrap_or(Value::Null)),
        }
    }
}

fn keep_if(current: &mut Option<Value>, candidate: &Value, wanted: Ordering) {
    let replace = match current {
        None => true,
        Some(existing) => candidate.cmp(existing) == wanted,
    };
    if replace {
        *current = Some(candidate.clone());
    }
}

/// SUM keeps the narrowest exact type it can: INT64 until a FLOAT64 or
/// NUMERIC arrives, NUMERIC until a FLOAT64 arrives.
#[derive(Debug, Clone, Default)]
pub(crate) enum SumState {
    #[default]
    Empty,
    Int64(i64),
    Float64(f64),
    Numeric(Decimal),
}

impl SumState {
    fn add(&mut self, value: &Value) -> Result<()> {
        let next = match (&*self, value) {
            (SumState::Empty, Value::Int64(v)) => SumState::Int64(*v),
            (SumState::Empty, Value::Float64(v)) => SumState::Float64(v.0),
            (SumState::Empty, Value::Numeric(v)) => SumState::Numeric(*v),

            (SumState::Int64(a), Value::Int64(b)) => {
                SumState::Int64(a.checked_add(*b).ok_or_else(Error::overflow)?)
            }
            (SumState::Int64(a), Value::Float64(b)) => SumState::Float64(*a as f64 + b.0),
            (SumState::Int64(a), Value::Numeric(b)) => {
                SumState::Numeric(Decimal::from(*a).checked_add(*b).ok_or_else(Error::overflow)?)
            }

            (SumState::Float64(a), Value::Int64(b)) => SumState::Float64(a + *b as f64),
            (SumState::Float64(a), Value::Float64(b)) => SumState::Float64(a + b.0),
            (SumState::Float64(a), Value::Numeric(b)) => {
                SumState::Float64(a + b.to_f64().unwrap_or(f64::NAN))
            }

            (SumState::Numeric(a), Value::Int64(b)) => {
                SumState::Numeric(a.checked_add(Decimal::from(*b)).ok_or_else(Error::overflow)?)
            }
            (SumState::Numeric(a), Value::Float64(b)) => {
                SumState::Float64(a.to_f64().unwrap_or(f64::NAN) + b.0)
            }
            (SumState::Numeric(a), Value::Numeric(b)) => {
                SumState::Numeric(a.checked_add(*b).ok_or_else(Error::overflow)?)
            }

            (_, other) => {
                return Err(Error::type_mismatch(
                    NUMERIC_INPUT,
                    other.data_type().to_string(),
                ));
            }
        };
        *self = next;
        Ok(())
    }

    fn value(&self) -> Value {
        match self {
            SumState::Empty => Value::Null,
            SumState::Int64(v) => Value::int64(*v),
            SumState::Float64(v) => Value::float64(*v),
            SumState::Numeric(v) => Value::numeric(*v),
        }
    }
}

/// AVG is NUMERIC while every input is NUMERIC, FLOAT64 otherwise.
#[derive(Debug, Clone)]
pub(crate) struct AvgState {
    count: i64,
    float_sum: f64,
    numeric_sum: Decimal,
    numeric_only: bool,
}

impl Default for AvgState {
    fn default() -> Self {
        Self {
            count: 0,
            float_sum: 0.0,
            numeric_sum: Decimal::ZERO,
            numeric_only: true,
        }
    }
}

impl AvgState {
    fn add(&mut self, value: &Value) -> Result<()> {
        let f = match value {
            Value::Int64(_) | Value::Float64(_) => {
                self.numeric_only = false;
                value.as_f64()
            }
            Value::Numeric(d) => {
                if self.numeric_only {
                    self.numeric_sum = self.numeric_sum.checked_add(*d).ok_or_else(Error::overflow)?;
                }
                d.to_f64()
            }
            other => {
                return Err(Error::type_mismatch(
                    NUMERIC_INPUT,
                    other.data_type().to_string(),
                ));
            }
        };
        self.float_sum += f.unwrap_or(f64::NAN);
        self.count += 1;
        Ok(())
    }

    fn value(&self) -> Result<Value> {
        if self.count == 0 {
            return Ok(Value::Null);
        }
        if self.numeric_only {
            let count = Decimal::from_i64(self.count).ok_or_else(Error::overflow)?;
            let avg = self.numeric_sum.checked_div(count).ok_or_else(Error::overflow)?;
            return Ok(Value::numeric(avg));
        }
        Ok(Value::float64(self.float_sum / self.count as f64))
    }
}
