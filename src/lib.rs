//! sqlwindow - window-function evaluation over materialized rows.
//!
//! sqlwindow takes rows that a host query engine has already produced,
//! together with resolved window declarations, and appends one computed
//! column per declaration: ranking functions, LAG/LEAD, frame-aware value
//! functions and the SUM/COUNT/AVG/MIN/MAX aggregates in windowed or
//! grouped form.
//!
//! # Architecture
//!
//! ```text
//! WindowQuery → plan (bind + validate) → Partitioner → Frame Orderer → Evaluator → Result Merger
//! ```
//!
//! Every specification and domain error that can be detected from the schema
//! is reported by the planning step, before any row is read.
//!
//! # Example
//!
//! ```rust
//! use sqlwindow::{
//!     DataType, Field, Row, Schema, SortExpr, Value, WindowEngine, WindowFunction,
//!     WindowFunctionCall, WindowQuery, WindowSpec, col,
//! };
//!
//! let schema = Schema::from_fields(vec![
//!     Field::nullable("dept", DataType::String),
//!     Field::nullable("amount", DataType::Int64),
//! ]);
//! let rows = vec![
//!     Row::new(vec![Value::string("eng"), Value::int64(300)]),
//!     Row::new(vec![Value::string("eng"), Value::int64(100)]),
//! ];
//!
//! let query = WindowQuery::new(schema, rows)
//!     .window(
//!         "w",
//!         WindowSpec::new()
//!             .partition_by(col("dept"))
//!             .order_by(SortExpr::asc(col("amount"))),
//!     )
//!     .call(WindowFunctionCall::new("rn", WindowFunction::RowNumber, vec![], "w"));
//!
//! let result = WindowEngine::new().execute(&query).unwrap();
//! assert_eq!(
//!     result.column("rn").unwrap(),
//!     vec![Value::int64(2), Value::int64(1)]
//! );
//! ```

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

use std::path::Path;
use std::sync::Arc;

pub use sqlwindow_common::error::{Error, Result};
pub use sqlwindow_common::result::{ColumnInfo, QueryResult, Row};
pub use sqlwindow_common::types::{DataType, Field, FieldMode, Schema, Value};
use sqlwindow_executor::WindowExecutor;
pub use sqlwindow_executor::{
    CollationEquality, EngineConfig, GroupedPlan, KeyEquality, NullOrder, NumericEquality,
    PartitionEquality, StrictEquality, WindowPlan, plan_grouped, plan_windows,
};
pub use sqlwindow_ir::{
    AggregateCall, AggregateFunction, Expr, FunctionKind, NamedWindowDefinition, OutputOrder,
    SortExpr, WindowFrame, WindowFrameBound, WindowFrameUnit, WindowFunction, WindowFunctionCall,
    WindowRef, WindowSpec, col, lit, try_window_function,
};
use tracing::{debug, instrument};

/// Rows plus the window declarations to evaluate over them.
///
/// Built with chained calls; nothing is checked until the query reaches
/// [`WindowEngine::validate`] or [`WindowEngine::execute`].
#[derive(Debug, Clone)]
pub struct WindowQuery {
    schema: Schema,
    rows: Vec<Row>,
    windows: Vec<NamedWindowDefinition>,
    calls: Vec<WindowFunctionCall>,
    output_order: OutputOrder,
}

impl WindowQuery {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            windows: Vec::new(),
            calls: Vec::new(),
            output_order: OutputOrder::Input,
        }
    }

    /// Adds a `WINDOW name AS (spec)` entry.
    pub fn window(mut self, name: impl Into<String>, spec: WindowSpec) -> Self {
        self.windows.push(NamedWindowDefinition::new(name, spec));
        self
    }

    pub fn call(mut self, call: WindowFunctionCall) -> Self {
        self.calls.push(call);
        self
    }

    /// Appends a sort key for the final result. Keys may name input columns
    /// or call outputs; rows with equal keys keep input order.
    pub fn order_output_by(mut self, sort: SortExpr) -> Self {
        match &mut self.output_order {
            OutputOrder::By(sorts) => sorts.push(sort),
            OutputOrder::Input => self.output_order = OutputOrder::By(vec![sort]),
        }
        self
    }

    pub fn output_order(mut self, order: OutputOrder) -> Self {
        self.output_order = order;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn windows(&self) -> &[NamedWindowDefinition] {
        &self.windows
    }

    pub fn calls(&self) -> &[WindowFunctionCall] {
        &self.calls
    }
}

/// A GROUP BY over materialized rows: one output row per distinct key, in
/// order of first appearance, followed by one column per aggregate.
#[derive(Debug, Clone)]
pub struct GroupedQuery {
    schema: Schema,
    rows: Vec<Row>,
    group_by: Vec<Expr>,
    aggregates: Vec<AggregateCall>,
}

impl GroupedQuery {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            group_by: Vec::new(),
            aggregates: Vec::new(),
        }
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn aggregate(mut self, call: AggregateCall) -> Self {
        self.aggregates.push(call);
        self
    }
}

/// Entry point for planning and evaluating window queries.
///
/// An engine holds only configuration, so it can be shared across threads
/// and reused for any number of queries.
///
/// # Example
///
/// ```rust
/// use sqlwindow::{Value, WindowEngine};
///
/// let mut engine = WindowEngine::new();
/// engine
///     .set_variable("PARALLEL_EXECUTION", Value::bool_val(false))
///     .unwrap();
/// assert!(!engine.config().parallel);
/// ```
#[derive(Clone, Default)]
pub struct WindowEngine {
    config: EngineConfig,
    equality: Option<Arc<dyn KeyEquality>>,
}

impl WindowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            equality: None,
        }
    }

    /// Loads an [`EngineConfig`] from a TOML file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_config(EngineConfig::from_toml_file(path)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Session-style override of one configuration entry, e.g.
    /// `PARALLEL_EXECUTION` or `DEFAULT_NULL_ORDER`.
    pub fn set_variable(&mut self, name: &str, value: Value) -> Result<()> {
        self.config.set_variable(name, &value)?;
        debug!(name, %value, "engine variable set");
        Ok(())
    }

    /// Replaces the configured partition-key equality with a caller-supplied
    /// one.
    pub fn with_key_equality(mut self, equality: Arc<dyn KeyEquality>) -> Self {
        self.equality = Some(equality);
        self
    }

    /// Binds and checks every declaration of `query` without reading its
    /// rows, returning the plan `execute` would run.
    #[instrument(skip_all, fields(calls = query.calls.len()))]
    pub fn plan(&self, query: &WindowQuery) -> Result<WindowPlan> {
        plan_windows(
            &query.schema,
            &query.windows,
            &query.calls,
            &query.output_order,
            &self.config,
        )
    }

    /// Reports the first specification or domain error in `query`, if any.
    pub fn validate(&self, query: &WindowQuery) -> Result<()> {
        self.plan(query).map(|_| ())
    }

    #[instrument(skip_all, fields(rows = query.rows.len(), calls = query.calls.len()))]
    pub fn execute(&self, query: &WindowQuery) -> Result<QueryResult> {
        let plan = self.plan(query)?;
        self.executor().execute(&plan, &query.rows)
    }

    #[instrument(skip_all, fields(rows = query.rows.len(), aggregates = query.aggregates.len()))]
    pub fn aggregate(&self, query: &GroupedQuery) -> Result<QueryResult> {
        let plan = plan_grouped(&query.schema, &query.group_by, &query.aggregates)?;
        self.executor()
            .execute_grouped(&plan, query.schema.num_fields(), &query.rows)
    }

    fn executor(&self) -> WindowExecutor<'_> {
        let executor = WindowExecutor::new(&self.config);
        match &self.equality {
            Some(equality) => executor.with_key_equality(Arc::clone(equality)),
            None => executor,
        }
    }
}
