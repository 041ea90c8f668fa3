use std::fmt;

use serde::{Deserialize, Serialize};
use sqlwindow_common::types::Value;

/// A resolved scalar expression. Only column references and literals reach
/// the window engine; anything richer is evaluated by the host beforehand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Column(String),
    Literal(Value),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn literal(value: Value) -> Self {
        Expr::Literal(value)
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(v) => Some(v),
            Expr::Column(_) => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(value) => write!(f, "{:?}", value),
        }
    }
}

pub fn col(name: impl Into<String>) -> Expr {
    Expr::column(name)
}

pub fn lit(value: impl Into<LiteralValue>) -> Expr {
    Expr::Literal(value.into().0)
}

/// Conversion helper so `lit(3)` and `lit("x")` read naturally.
pub struct LiteralValue(pub Value);

impl From<Value> for LiteralValue {
    fn from(v: Value) -> Self {
        LiteralValue(v)
    }
}

impl From<i64> for LiteralValue {
    fn from(v: i64) -> Self {
        LiteralValue(Value::int64(v))
    }
}

impl From<i32> for LiteralValue {
    fn from(v: i32) -> Self {
        LiteralValue(Value::int64(v as i64))
    }
}

impl From<f64> for LiteralValue {
    fn from(v: f64) -> Self {
        LiteralValue(Value::float64(v))
    }
}

impl From<&str> for LiteralValue {
    fn from(v: &str) -> Self {
        LiteralValue(Value::string(v))
    }
}

impl From<bool> for LiteralValue {
    fn from(v: bool) -> Self {
        LiteralValue(Value::bool_val(v))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortExpr {
    pub expr: Expr,
    pub asc: bool,
    /// `None` defers to the engine's configured NULL placement.
    pub nulls_first: Option<bool>,
}

impl SortExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            asc: true,
            nulls_first: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            asc: false,
            nulls_first: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls_first = Some(true);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls_first = Some(false);
        self
    }
}

impl fmt::Display for SortExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.expr, if self.asc { "ASC" } else { "DESC" })?;
        match self.nulls_first {
            Some(true) => write!(f, " NULLS FIRST"),
            Some(false) => write!(f, " NULLS LAST"),
            None => Ok(()),
        }
    }
}
