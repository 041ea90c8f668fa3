use sqlwindow_common::error::{Error, Result};
use sqlwindow_common::types::{DataType, Value};
use sqlwindow_ir::{
    AggregateFunction, FunctionKind, WindowFrame, WindowFrameBound, WindowFrameUnit,
    WindowFunction,
};

use super::{BoundExpr, BoundSort};

/// Checks a frame clause against the window's ordering.
pub(crate) fn validate_frame(
    frame: &WindowFrame,
    order_by: &[BoundSort],
    order_types: &[DataType],
    label: &str,
) -> Result<()> {
    let end = frame.end_bound();
    let invalid = |msg: String| Err(Error::specification(label, msg));

    if frame.start == WindowFrameBound::Following(None) {
        return invalid("frame start cannot be UNBOUNDED FOLLOWING".to_string());
    }
    if end == WindowFrameBound::Preceding(None) {
        return invalid("frame end cannot be UNBOUNDED PRECEDING".to_string());
    }
    match (frame.start, end) {
        (WindowFrameBound::Following(_), WindowFrameBound::Preceding(_))
        | (WindowFrameBound::Following(_), WindowFrameBound::CurrentRow)
        | (WindowFrameBound::CurrentRow, WindowFrameBound::Preceding(_)) => {
            return invalid(format!(
                "frame starting at {} cannot end at {}",
                frame.start, end
            ));
        }
        _ => {}
    }

    match frame.unit {
        WindowFrameUnit::Rows => Ok(()),
        WindowFrameUnit::Groups => {
            if order_by.is_empty() {
                invalid("GROUPS frame requires ORDER BY".to_string())
            } else {
                Ok(())
            }
        }
        WindowFrameUnit::Range => {
            if !frame.has_offset() {
                return Ok(());
            }
            if order_by.len() != 1 {
                return invalid(format!(
                    "RANGE frame with an offset requires exactly one ORDER BY key, got {}",
                    order_by.len()
                ));
            }
            match order_types.first() {
                Some(dt) if !dt.is_numeric() && *dt != DataType::Unknown => invalid(format!(
                    "RANGE frame with an offset requires a numeric ORDER BY key, got {}",
                    dt
                )),
                _ => Ok(()),
            }
        }
    }
}

/// Checks one call against its resolved window and returns the output type.
///
/// Specification problems come back without the call attached; the planner
/// adds it. Domain problems are already complete.
pub(crate) fn validate_call(
    function: FunctionKind,
    args: &[BoundExpr],
    arg_types: &[DataType],
    has_order_by: bool,
    call: &str,
    label: &str,
) -> Result<DataType> {
    let (min, max) = function.arity();
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(Error::specification(
            label,
            format!(
                "{} takes {} argument(s), got {}",
                function,
                expected,
                args.len()
            ),
        ));
    }

    if function.requires_order_by() && !has_order_by {
        return Err(Error::specification(
            label,
            format!("{} requires ORDER BY in its window", function),
        ));
    }

    let arg_type = arg_types.first().cloned().unwrap_or(DataType::Unknown);
    match function {
        FunctionKind::Window(f) => {
            match f {
                WindowFunction::Ntile => {
                    positive_literal(&args[0], "NTILE bucket count", label)?;
                }
                WindowFunction::NthValue => {
                    positive_literal(&args[1], "NTH_VALUE position", label)?;
                }
                WindowFunction::Lag | WindowFunction::Lead => {
                    if let Some(offset) = args.get(1) {
                        non_negative_literal(offset, &format!("{} offset", f.name()), label)?;
                    }
                }
                WindowFunction::RowNumber
                | WindowFunction::Rank
                | WindowFunction::DenseRank
                | WindowFunction::PercentRank
                | WindowFunction::CumeDist
                | WindowFunction::FirstValue
                | WindowFunction::LastValue => {}
            }
            Ok(window_output_type(f, arg_type))
        }
        FunctionKind::Aggregate(f) => {
            check_aggregate_input(f, &arg_type, call, label)?;
            Ok(aggregate_output_type(f, &arg_type))
        }
    }
}

pub(crate) fn check_aggregate_input(
    function: AggregateFunction,
    arg_type: &DataType,
    call: &str,
    label: &str,
) -> Result<()> {
    if function.requires_numeric_input() && !arg_type.is_numeric() && *arg_type != DataType::Unknown {
        return Err(Error::domain(
            call,
            label,
            format!("{} requires a numeric argument, got {}", function.name(), arg_type),
        ));
    }
    Ok(())
}

fn window_output_type(function: WindowFunction, arg_type: DataType) -> DataType {
    match function {
        WindowFunction::RowNumber
        | WindowFunction::Rank
        | WindowFunction::DenseRank
        | WindowFunction::Ntile => DataType::Int64,
        WindowFunction::PercentRank | WindowFunction::CumeDist => DataType::Float64,
        WindowFunction::Lead
        | WindowFunction::Lag
        | WindowFunction::FirstValue
        | WindowFunction::LastValue
        | WindowFunction::NthValue => arg_type,
    }
}

pub(crate) fn aggregate_output_type(function: AggregateFunction, arg_type: &DataType) -> DataType {
    match function {
        AggregateFunction::Count => DataType::Int64,
        AggregateFunction::Sum => match arg_type {
            DataType::Int64 | DataType::Float64 | DataType::Numeric => arg_type.clone(),
            _ => DataType::Unknown,
        },
        AggregateFunction::Avg => match arg_type {
            DataType::Numeric => DataType::Numeric,
            _ => DataType::Float64,
        },
        AggregateFunction::Min | AggregateFunction::Max => arg_type.clone(),
    }
}

fn positive_literal(expr: &BoundExpr, what: &str, label: &str) -> Result<i64> {
    match expr {
        BoundExpr::Literal(Value::Int64(n)) if *n > 0 => Ok(*n),
        _ => Err(Error::specification(
            label,
            format!("{} must be a positive integer constant", what),
        )),
    }
}

fn non_negative_literal(expr: &BoundExpr, what: &str, label: &str) -> Result<i64> {
    match expr {
        BoundExpr::Literal(Value::Int64(n)) if *n >= 0 => Ok(*n),
        _ => Err(Error::specification(
            label,
            format!("{} must be a non-negative integer constant", what),
        )),
    }
}
