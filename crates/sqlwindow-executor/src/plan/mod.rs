//! Binding of declarations to an input schema.
//!
//! Planning resolves column names to positions, flattens named windows,
//! validates every call and fixes the output schema. Nothing here touches
//! row data, so a plan can be built (and rejected) before any row exists.

mod registry;
mod validate;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use sqlwindow_common::error::{Error, Result};
use sqlwindow_common::result::{ColumnInfo, Row};
use sqlwindow_common::types::{DataType, Field, Schema, Value};
use sqlwindow_ir::{
    AggregateCall, AggregateFunction, Expr, FunctionKind, NamedWindowDefinition, OutputOrder,
    SortExpr, WindowFrame, WindowFunctionCall, WindowRef, WindowSpec,
};
use tracing::{debug, instrument};

pub use registry::WindowRegistry;
pub(crate) use validate::check_aggregate_input;

use crate::config::EngineConfig;

pub const INLINE_WINDOW: &str = "<inline>";
pub const GROUPED_WINDOW: &str = "<group by>";

static NULL: Value = Value::Null;

/// A column reference resolved to its position, or a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpr {
    Column(usize),
    Literal(Value),
}

impl BoundExpr {
    pub fn bind(expr: &Expr, schema: &Schema) -> Result<Self> {
        match expr {
            Expr::Column(name) => schema
                .index_of(name)
                .map(BoundExpr::Column)
                .ok_or_else(|| Error::column_not_found(name)),
            Expr::Literal(v) => Ok(BoundExpr::Literal(v.clone())),
        }
    }

    pub fn eval<'a>(&'a self, row: &'a Row) -> &'a Value {
        match self {
            BoundExpr::Column(idx) => row.get(*idx).unwrap_or(&NULL),
            BoundExpr::Literal(v) => v,
        }
    }

    pub fn data_type(&self, schema: &Schema) -> DataType {
        match self {
            BoundExpr::Column(idx) => schema
                .field(*idx)
                .map(|f| f.data_type.clone())
                .unwrap_or(DataType::Unknown),
            BoundExpr::Literal(Value::Null) => DataType::Unknown,
            BoundExpr::Literal(v) => v.data_type(),
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            BoundExpr::Literal(v) => Some(v),
            BoundExpr::Column(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundSort {
    pub expr: BoundExpr,
    pub asc: bool,
    pub nulls_first: bool,
}

impl BoundSort {
    fn bind(sort: &SortExpr, schema: &Schema, config: &EngineConfig) -> Result<Self> {
        Ok(BoundSort {
            expr: BoundExpr::bind(&sort.expr, schema)?,
            asc: sort.asc,
            nulls_first: sort
                .nulls_first
                .unwrap_or_else(|| config.default_null_order.nulls_first()),
        })
    }
}

/// A fully resolved window: no base reference, columns bound.
#[derive(Debug)]
pub struct BoundWindow {
    /// Name from the WINDOW clause, or `<inline>`.
    pub label: String,
    pub spec: Arc<WindowSpec>,
    pub partition_by: Vec<BoundExpr>,
    pub order_by: Vec<BoundSort>,
    pub frame: Option<WindowFrame>,
}

impl BoundWindow {
    fn bind(
        label: &str,
        spec: Arc<WindowSpec>,
        schema: &Schema,
        config: &EngineConfig,
    ) -> Result<Self> {
        let partition_by = spec
            .partition_by
            .iter()
            .map(|e| BoundExpr::bind(e, schema))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.in_window(label))?;
        let order_by = spec
            .order_by
            .iter()
            .map(|s| BoundSort::bind(s, schema, config))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.in_window(label))?;

        if let Some(frame) = &spec.frame {
            let order_types: Vec<DataType> =
                order_by.iter().map(|s| s.expr.data_type(schema)).collect();
            validate::validate_frame(frame, &order_by, &order_types, label)?;
        }

        Ok(BoundWindow {
            label: label.to_string(),
            frame: spec.frame.clone(),
            spec,
            partition_by,
            order_by,
        })
    }

    pub fn has_order_by(&self) -> bool {
        !self.order_by.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BoundCall {
    pub output_name: String,
    pub function: FunctionKind,
    pub args: Vec<BoundExpr>,
    /// Position of this call's window in [`WindowPlan::windows`].
    pub window_index: usize,
    pub window: Arc<BoundWindow>,
    pub output_type: DataType,
}

/// Everything needed to evaluate a set of window calls over one input.
#[derive(Debug)]
pub struct WindowPlan {
    pub input_schema: Schema,
    /// Distinct windows in order of first use; each is partitioned and
    /// sorted once no matter how many calls share it.
    pub windows: Vec<Arc<BoundWindow>>,
    pub calls: Vec<BoundCall>,
    pub output_schema: Vec<ColumnInfo>,
    /// Sort keys over the output schema; empty keeps input order.
    pub output_order: Vec<BoundSort>,
}

impl WindowPlan {
    pub fn calls_for_window(
        &self,
        window_index: usize,
    ) -> impl Iterator<Item = (usize, &BoundCall)> {
        self.calls
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.window_index == window_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WindowKey {
    Named(String),
    Inline(usize),
}

#[instrument(skip_all, fields(calls = calls.len(), windows = definitions.len()))]
pub fn plan_windows(
    schema: &Schema,
    definitions: &[NamedWindowDefinition],
    calls: &[WindowFunctionCall],
    output_order: &OutputOrder,
    config: &EngineConfig,
) -> Result<WindowPlan> {
    let registry = WindowRegistry::new(definitions)?;

    let mut named: FxHashMap<String, Arc<BoundWindow>> = FxHashMap::default();
    for name in registry.names() {
        let spec = registry.lookup(name, name)?;
        let window = BoundWindow::bind(name, spec, schema, config)?;
        named.insert(name.to_lowercase(), Arc::new(window));
    }

    let mut output_schema: Vec<ColumnInfo> = schema
        .fields()
        .iter()
        .map(|f| ColumnInfo::new(f.name.clone(), f.data_type.clone()))
        .collect();

    let mut windows: Vec<Arc<BoundWindow>> = Vec::new();
    let mut window_index: FxHashMap<WindowKey, usize> = FxHashMap::default();
    let mut bound_calls = Vec::with_capacity(calls.len());

    for call in calls {
        let (key, window) = match &call.window {
            WindowRef::Named(name) => {
                let window = named.get(&name.to_lowercase()).cloned().ok_or_else(|| {
                    Error::specification(name, format!("window {} is not defined", name))
                        .in_call(&call.output_name)
                })?;
                (WindowKey::Named(name.to_lowercase()), window)
            }
            WindowRef::Inline(spec) => {
                let key = WindowKey::Inline(Arc::as_ptr(spec) as usize);
                let window = match window_index.get(&key) {
                    Some(&idx) => Arc::clone(&windows[idx]),
                    None => {
                        let resolved = registry
                            .resolve_inline(spec, INLINE_WINDOW)
                            .map_err(|e| e.in_call(&call.output_name))?;
                        let bound = BoundWindow::bind(INLINE_WINDOW, resolved, schema, config)
                            .map_err(|e| e.in_call(&call.output_name))?;
                        Arc::new(bound)
                    }
                };
                (key, window)
            }
        };

        let idx = *window_index.entry(key).or_insert_with(|| {
            windows.push(Arc::clone(&window));
            windows.len() - 1
        });

        let args = call
            .args
            .iter()
            .map(|a| BoundExpr::bind(a, schema))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.in_call(&call.output_name).in_window(&window.label))?;
        let arg_types: Vec<DataType> = args.iter().map(|a| a.data_type(schema)).collect();
        let output_type = validate::validate_call(
            call.function,
            &args,
            &arg_types,
            window.has_order_by(),
            &call.output_name,
            &window.label,
        )
        .map_err(|e| e.in_call(&call.output_name))?;

        if output_schema
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&call.output_name))
        {
            return Err(Error::invalid_query(format!(
                "duplicate output column: {}",
                call.output_name
            )));
        }
        output_schema.push(ColumnInfo::new(call.output_name.clone(), output_type.clone()));

        bound_calls.push(BoundCall {
            output_name: call.output_name.clone(),
            function: call.function,
            args,
            window_index: idx,
            window,
            output_type,
        });
    }

    let output_order = bind_output_order(output_order, &output_schema, config)?;

    debug!(
        windows = windows.len(),
        calls = bound_calls.len(),
        "window plan built"
    );

    Ok(WindowPlan {
        input_schema: schema.clone(),
        windows,
        calls: bound_calls,
        output_schema,
        output_order,
    })
}

fn bind_output_order(
    order: &OutputOrder,
    output_schema: &[ColumnInfo],
    config: &EngineConfig,
) -> Result<Vec<BoundSort>> {
    let sorts = match order {
        OutputOrder::Input => return Ok(Vec::new()),
        OutputOrder::By(sorts) => sorts,
    };
    let schema = Schema::from_fields(
        output_schema
            .iter()
            .map(|c| Field::nullable(c.name.clone(), c.data_type.clone()))
            .collect(),
    );
    sorts
        .iter()
        .map(|s| BoundSort::bind(s, &schema, config))
        .collect()
}

#[derive(Debug, Clone)]
pub struct BoundAggregate {
    pub output_name: String,
    pub function: AggregateFunction,
    /// `None` is `COUNT(*)`.
    pub arg: Option<BoundExpr>,
    pub output_type: DataType,
}

/// A GROUP BY over the input: one output row per distinct group key.
#[derive(Debug)]
pub struct GroupedPlan {
    pub group_by: Vec<BoundExpr>,
    pub aggregates: Vec<BoundAggregate>,
    pub output_schema: Vec<ColumnInfo>,
}

#[instrument(skip_all, fields(keys = group_by.len(), aggregates = aggregates.len()))]
pub fn plan_grouped(
    schema: &Schema,
    group_by: &[Expr],
    aggregates: &[AggregateCall],
) -> Result<GroupedPlan> {
    let mut output_schema = Vec::with_capacity(group_by.len() + aggregates.len());
    let mut keys = Vec::with_capacity(group_by.len());
    for (i, expr) in group_by.iter().enumerate() {
        let bound = BoundExpr::bind(expr, schema).map_err(|e| e.in_window(GROUPED_WINDOW))?;
        let name = match &bound {
            BoundExpr::Column(idx) => schema
                .field(*idx)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| format!("group_{}", i)),
            BoundExpr::Literal(_) => format!("group_{}", i),
        };
        output_schema.push(ColumnInfo::new(name, bound.data_type(schema)));
        keys.push(bound);
    }

    let mut bound_aggregates = Vec::with_capacity(aggregates.len());
    for agg in aggregates {
        let (min, _) = agg.function.arity();
        if agg.arg.is_none() && min > 0 {
            return Err(Error::specification(
                GROUPED_WINDOW,
                format!("{} requires an argument", agg.function.name()),
            )
            .in_call(&agg.output_name));
        }
        let arg = agg
            .arg
            .as_ref()
            .map(|a| BoundExpr::bind(a, schema))
            .transpose()
            .map_err(|e| e.in_call(&agg.output_name).in_window(GROUPED_WINDOW))?;
        let arg_type = arg
            .as_ref()
            .map(|a| a.data_type(schema))
            .unwrap_or(DataType::Unknown);
        check_aggregate_input(agg.function, &arg_type, &agg.output_name, GROUPED_WINDOW)?;
        let output_type = validate::aggregate_output_type(agg.function, &arg_type);

        if output_schema
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&agg.output_name))
        {
            return Err(Error::invalid_query(format!(
                "duplicate output column: {}",
                agg.output_name
            )));
        }
        output_schema.push(ColumnInfo::new(agg.output_name.clone(), output_type.clone()));
        bound_aggregates.push(BoundAggregate {
            output_name: agg.output_name.clone(),
            function: agg.function,
            arg,
            output_type,
        });
    }

    Ok(GroupedPlan {
        group_by: keys,
        aggregates: bound_aggregates,
        output_schema,
    })
}
