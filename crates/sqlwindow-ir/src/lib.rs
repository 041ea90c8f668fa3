//! Declarations consumed by the sqlwindow evaluation engine.
//!
//! Everything here arrives already resolved by a host query engine: column
//! names instead of SQL text, frames as enums, WINDOW-clause entries as
//! [`NamedWindowDefinition`]s.

mod expr;
mod function;
mod window;

use serde::{Deserialize, Serialize};

pub use expr::{Expr, LiteralValue, SortExpr, col, lit};
pub use function::{
    AggregateCall, AggregateFunction, FunctionKind, WindowFunction, WindowFunctionCall,
    try_window_function,
};
pub use window::{
    NamedWindowDefinition, WindowFrame, WindowFrameBound, WindowFrameUnit, WindowRef, WindowSpec,
};

/// Row order of the final result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputOrder {
    /// Rows come back in the order they were supplied.
    #[default]
    Input,
    /// Sort by input or output columns; ties keep input order.
    By(Vec<SortExpr>),
}
