use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::expr::{Expr, SortExpr};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowFrame {
    pub unit: WindowFrameUnit,
    pub start: WindowFrameBound,
    /// `None` means `CURRENT ROW`.
    pub end: Option<WindowFrameBound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFrameUnit {
    Rows,
    Range,
    Groups,
}

/// `Preceding(None)` / `Following(None)` are the UNBOUNDED forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFrameBound {
    CurrentRow,
    Preceding(Option<u64>),
    Following(Option<u64>),
}

impl Default for WindowFrame {
    fn default() -> Self {
        Self {
            unit: WindowFrameUnit::Range,
            start: WindowFrameBound::Preceding(None),
            end: Some(WindowFrameBound::CurrentRow),
        }
    }
}

impl WindowFrame {
    pub fn new(unit: WindowFrameUnit, start: WindowFrameBound, end: WindowFrameBound) -> Self {
        Self {
            unit,
            start,
            end: Some(end),
        }
    }

    pub fn rows(start: WindowFrameBound, end: WindowFrameBound) -> Self {
        Self::new(WindowFrameUnit::Rows, start, end)
    }

    pub fn range(start: WindowFrameBound, end: WindowFrameBound) -> Self {
        Self::new(WindowFrameUnit::Range, start, end)
    }

    pub fn groups(start: WindowFrameBound, end: WindowFrameBound) -> Self {
        Self::new(WindowFrameUnit::Groups, start, end)
    }

    pub fn end_bound(&self) -> WindowFrameBound {
        self.end.unwrap_or(WindowFrameBound::CurrentRow)
    }

    pub fn has_offset(&self) -> bool {
        self.start.offset().is_some() || self.end_bound().offset().is_some()
    }
}

impl WindowFrameBound {
    pub fn unbounded_preceding() -> Self {
        WindowFrameBound::Preceding(None)
    }

    pub fn unbounded_following() -> Self {
        WindowFrameBound::Following(None)
    }

    pub fn preceding(n: u64) -> Self {
        WindowFrameBound::Preceding(Some(n))
    }

    pub fn following(n: u64) -> Self {
        WindowFrameBound::Following(Some(n))
    }

    pub fn offset(&self) -> Option<u64> {
        match self {
            WindowFrameBound::Preceding(n) | WindowFrameBound::Following(n) => *n,
            WindowFrameBound::CurrentRow => None,
        }
    }
}

impl fmt::Display for WindowFrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowFrameBound::CurrentRow => write!(f, "CURRENT ROW"),
            WindowFrameBound::Preceding(None) => write!(f, "UNBOUNDED PRECEDING"),
            WindowFrameBound::Preceding(Some(n)) => write!(f, "{} PRECEDING", n),
            WindowFrameBound::Following(None) => write!(f, "UNBOUNDED FOLLOWING"),
            WindowFrameBound::Following(Some(n)) => write!(f, "{} FOLLOWING", n),
        }
    }
}

impl fmt::Display for WindowFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            WindowFrameUnit::Rows => "ROWS",
            WindowFrameUnit::Range => "RANGE",
            WindowFrameUnit::Groups => "GROUPS",
        };
        write!(f, "{} BETWEEN {} AND {}", unit, self.start, self.end_bound())
    }
}

/// A window as declared by the caller, before name resolution.
///
/// `base` names a window from the WINDOW clause whose partitioning and
/// ordering this spec extends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSpec {
    pub base: Option<String>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<SortExpr>,
    pub frame: Option<WindowFrame>,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn based_on(name: impl Into<String>) -> Self {
        Self {
            base: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn partition_by(mut self, expr: Expr) -> Self {
        self.partition_by.push(expr);
        self
    }

    pub fn order_by(mut self, sort: SortExpr) -> Self {
        self.order_by.push(sort);
        self
    }

    pub fn frame(mut self, frame: WindowFrame) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// One entry of a WINDOW clause: `name AS (spec)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedWindowDefinition {
    pub name: String,
    pub spec: WindowSpec,
}

impl NamedWindowDefinition {
    pub fn new(name: impl Into<String>, spec: WindowSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// How a call points at its window. Calls holding clones of the same
/// `Arc`, or naming the same window, share one resolved window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowRef {
    Named(String),
    Inline(Arc<WindowSpec>),
}

impl WindowRef {
    pub fn named(name: impl Into<String>) -> Self {
        WindowRef::Named(name.into())
    }

    pub fn inline(spec: WindowSpec) -> Self {
        WindowRef::Inline(Arc::new(spec))
    }
}

impl From<&str> for WindowRef {
    fn from(name: &str) -> Self {
        WindowRef::named(name)
    }
}

impl From<String> for WindowRef {
    fn from(name: String) -> Self {
        WindowRef::Named(name)
    }
}

impl From<WindowSpec> for WindowRef {
    fn from(spec: WindowSpec) -> Self {
        WindowRef::inline(spec)
    }
}

impl From<Arc<WindowSpec>> for WindowRef {
    fn from(spec: Arc<WindowSpec>) -> Self {
        WindowRef::Inline(spec)
    }
}
