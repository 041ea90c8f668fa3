use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::window::WindowRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFunction {
    RowNumber,
    Rank,
    DenseRank,
    PercentRank,
    CumeDist,
    Ntile,
    Lead,
    Lag,
    FirstValue,
    LastValue,
    NthValue,
}

/// Aggregates usable both as GROUP BY aggregates and as window aggregates.
/// `Count` with no argument is `COUNT(*)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Window(WindowFunction),
    Aggregate(AggregateFunction),
}

pub fn try_window_function(name: &str) -> Option<FunctionKind> {
    match name.to_ascii_uppercase().as_str() {
        "ROW_NUMBER" => Some(FunctionKind::Window(WindowFunction::RowNumber)),
        "RANK" => Some(FunctionKind::Window(WindowFunction::Rank)),
        "DENSE_RANK" => Some(FunctionKind::Window(WindowFunction::DenseRank)),
        "PERCENT_RANK" => Some(FunctionKind::Window(WindowFunction::PercentRank)),
        "CUME_DIST" => Some(FunctionKind::Window(WindowFunction::CumeDist)),
        "NTILE" => Some(FunctionKind::Window(WindowFunction::Ntile)),
        "LEAD" => Some(FunctionKind::Window(WindowFunction::Lead)),
        "LAG" => Some(FunctionKind::Window(WindowFunction::Lag)),
        "FIRST_VALUE" => Some(FunctionKind::Window(WindowFunction::FirstValue)),
        "LAST_VALUE" => Some(FunctionKind::Window(WindowFunction::LastValue)),
        "NTH_VALUE" => Some(FunctionKind::Window(WindowFunction::NthValue)),
        "SUM" => Some(FunctionKind::Aggregate(AggregateFunction::Sum)),
        "COUNT" => Some(FunctionKind::Aggregate(AggregateFunction::Count)),
        "AVG" => Some(FunctionKind::Aggregate(AggregateFunction::Avg)),
        "MIN" => Some(FunctionKind::Aggregate(AggregateFunction::Min)),
        "MAX" => Some(FunctionKind::Aggregate(AggregateFunction::Max)),
        _ => None,
    }
}

impl WindowFunction {
    pub fn name(&self) -> &'static str {
        match self {
            WindowFunction::RowNumber => "ROW_NUMBER",
            WindowFunction::Rank => "RANK",
            WindowFunction::DenseRank => "DENSE_RANK",
            WindowFunction::PercentRank => "PERCENT_RANK",
            WindowFunction::CumeDist => "CUME_DIST",
            WindowFunction::Ntile => "NTILE",
            WindowFunction::Lead => "LEAD",
            WindowFunction::Lag => "LAG",
            WindowFunction::FirstValue => "FIRST_VALUE",
            WindowFunction::LastValue => "LAST_VALUE",
            WindowFunction::NthValue => "NTH_VALUE",
        }
    }

    pub fn requires_order_by(&self) -> bool {
        match self {
            WindowFunction::Rank
            | WindowFunction::DenseRank
            | WindowFunction::PercentRank
            | WindowFunction::CumeDist
            | WindowFunction::Ntile
            | WindowFunction::Lead
            | WindowFunction::Lag => true,
            WindowFunction::RowNumber
            | WindowFunction::FirstValue
            | WindowFunction::LastValue
            | WindowFunction::NthValue => false,
        }
    }

    /// Inclusive range of accepted argument counts.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            WindowFunction::RowNumber
            | WindowFunction::Rank
            | WindowFunction::DenseRank
            | WindowFunction::PercentRank
            | WindowFunction::CumeDist => (0, 0),
            WindowFunction::Ntile => (1, 1),
            WindowFunction::Lead | WindowFunction::Lag => (1, 3),
            WindowFunction::FirstValue | WindowFunction::LastValue => (1, 1),
            WindowFunction::NthValue => (2, 2),
        }
    }
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }

    pub fn arity(&self) -> (usize, usize) {
        match self {
            AggregateFunction::Count => (0, 1),
            AggregateFunction::Sum
            | AggregateFunction::Avg
            | AggregateFunction::Min
            | AggregateFunction::Max => (1, 1),
        }
    }

    pub fn requires_numeric_input(&self) -> bool {
        matches!(self, AggregateFunction::Sum | AggregateFunction::Avg)
    }
}

impl FunctionKind {
    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Window(f) => f.name(),
            FunctionKind::Aggregate(f) => f.name(),
        }
    }

    pub fn requires_order_by(&self) -> bool {
        match self {
            FunctionKind::Window(f) => f.requires_order_by(),
            FunctionKind::Aggregate(_) => false,
        }
    }

    pub fn arity(&self) -> (usize, usize) {
        match self {
            FunctionKind::Window(f) => f.arity(),
            FunctionKind::Aggregate(f) => f.arity(),
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<WindowFunction> for FunctionKind {
    fn from(f: WindowFunction) -> Self {
        FunctionKind::Window(f)
    }
}

impl From<AggregateFunction> for FunctionKind {
    fn from(f: AggregateFunction) -> Self {
        FunctionKind::Aggregate(f)
    }
}

/// `function(args) OVER window AS output_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFunctionCall {
    pub output_name: String,
    pub function: FunctionKind,
    pub args: Vec<Expr>,
    pub window: WindowRef,
}

impl WindowFunctionCall {
    pub fn new(
        output_name: impl Into<String>,
        function: impl Into<FunctionKind>,
        args: Vec<Expr>,
        window: impl Into<WindowRef>,
    ) -> Self {
        Self {
            output_name: output_name.into(),
            function: function.into(),
            args,
            window: window.into(),
        }
    }
}

/// `function(arg) AS output_name` evaluated once per group of a GROUP BY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCall {
    pub output_name: String,
    pub function: AggregateFunction,
    pub arg: Option<Expr>,
}

impl AggregateCall {
    pub fn new(output_name: impl Into<String>, function: AggregateFunction, arg: Expr) -> Self {
        Self {
            output_name: output_name.into(),
            function,
            arg: Some(arg),
        }
    }

    pub fn count_star(output_name: impl Into<String>) -> Self {
        Self {
            output_name: output_name.into(),
            function: AggregateFunction::Count,
            arg: None,
        }
    }
}
