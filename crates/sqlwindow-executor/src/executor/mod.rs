mod aggregate;
mod frame;
mod merge;
mod offset;
mod ranking;
mod sort;

use std::sync::Arc;

pub use aggregate::AggregateMode;
use aggregate::{AggregateTarget, aggregate_partition};
use frame::FrameBounds;
use offset::{Direction, FramePick};
use rayon::prelude::*;
pub use sort::{OrderedPartition, order_partition};
use sqlwindow_common::error::{Error, Result};
use sqlwindow_common::result::{QueryResult, Row};
use sqlwindow_common::types::Value;
use sqlwindow_ir::{FunctionKind, WindowFunction};
use tracing::{debug, instrument, trace};

use crate::config::EngineConfig;
use crate::partition::{KeyEquality, Partition, partition_rows};
use crate::plan::{BoundCall, BoundExpr, BoundWindow, GROUPED_WINDOW, GroupedPlan, WindowPlan};

/// Evaluates bound plans against row data.
pub struct WindowExecutor<'a> {
    config: &'a EngineConfig,
    equality: Arc<dyn KeyEquality>,
}

/// Sorted row positions of one partition and, per call, the values for
/// those positions.
type PartitionOutput = (Vec<usize>, Vec<Vec<Value>>);

impl<'a> WindowExecutor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            equality: config.partition_equality.key_equality(),
        }
    }

    pub fn with_key_equality(mut self, equality: Arc<dyn KeyEquality>) -> Self {
        self.equality = equality;
        self
    }

    #[instrument(skip_all, fields(rows = rows.len(), calls = plan.calls.len()))]
    pub fn execute(&self, plan: &WindowPlan, rows: &[Row]) -> Result<QueryResult> {
        check_row_widths(plan.input_schema.num_fields(), rows)?;

        let parallel = self.config.is_parallel_for(rows.len());
        debug!(
            parallel,
            windows = plan.windows.len(),
            "evaluating window functions"
        );

        let mut columns: Vec<Vec<Value>> = vec![vec![Value::Null; rows.len()]; plan.calls.len()];
        for (w, window) in plan.windows.iter().enumerate() {
            let calls: Vec<(usize, &BoundCall)> = plan.calls_for_window(w).collect();
            let outputs = self.evaluate_window(window, &calls, rows, parallel)?;
            for (positions, values) in outputs {
                for ((slot, _), column) in calls.iter().zip(values) {
                    for (&row_idx, value) in positions.iter().zip(column) {
                        columns[*slot][row_idx] = value;
                    }
                }
            }
        }

        Ok(merge::merge_results(
            plan.output_schema.clone(),
            rows,
            columns,
            &plan.output_order,
        ))
    }

    #[instrument(skip_all, fields(window = %window.label, calls = calls.len()))]
    fn evaluate_window(
        &self,
        window: &BoundWindow,
        calls: &[(usize, &BoundCall)],
        rows: &[Row],
        parallel: bool,
    ) -> Result<Vec<PartitionOutput>> {
        let partitions = partition_rows(rows, &window.partition_by, self.equality.as_ref());
        debug!(partitions = partitions.len(), "partitioned input");

        let evaluate = |partition: &Partition| -> Result<PartitionOutput> {
            trace!(rows = partition.len(), "evaluating partition");
            let ordered = order_partition(rows, &partition.rows, &window.order_by);
            let values = calls
                .iter()
                .map(|(_, call)| evaluate_call(rows, &ordered, window, call))
                .collect::<Result<Vec<_>>>()?;
            Ok((ordered.rows, values))
        };

        if parallel && partitions.len() > 1 {
            partitions.par_iter().map(&evaluate).collect()
        } else {
            partitions.iter().map(&evaluate).collect()
        }
    }

    /// GROUP BY evaluation: one output row per distinct group key, groups in
    /// order of first appearance.
    #[instrument(skip_all, fields(rows = rows.len(), aggregates = plan.aggregates.len()))]
    pub fn execute_grouped(
        &self,
        plan: &GroupedPlan,
        input_width: usize,
        rows: &[Row],
    ) -> Result<QueryResult> {
        check_row_widths(input_width, rows)?;

        let groups = partition_rows(rows, &plan.group_by, self.equality.as_ref());
        let parallel = self.config.is_parallel_for(rows.len());
        debug!(groups = groups.len(), parallel, "grouped input");

        let collapse = |group: &Partition| -> Result<Row> {
            let mut values = group.key.clone();
            for agg in &plan.aggregates {
                let target = AggregateTarget {
                    function: agg.function,
                    arg: agg.arg.as_ref(),
                    call: &agg.output_name,
                    window: GROUPED_WINDOW,
                };
                let collapsed =
                    aggregate_partition(rows, &group.rows, None, &target, AggregateMode::Grouped)?;
                values.extend(collapsed);
            }
            Ok(Row::new(values))
        };

        let out: Vec<Row> = if parallel && groups.len() > 1 {
            groups.par_iter().map(&collapse).collect::<Result<_>>()?
        } else {
            groups.iter().map(&collapse).collect::<Result<_>>()?
        };
        Ok(QueryResult::new(plan.output_schema.clone(), out))
    }
}

fn check_row_widths(width: usize, rows: &[Row]) -> Result<()> {
    match rows.iter().position(|r| r.len() != width) {
        Some(idx) => Err(Error::invalid_query(format!(
            "row {} has {} values but the schema has {} columns",
            idx,
            rows[idx].len(),
            width
        ))),
        None => Ok(()),
    }
}

fn evaluate_call(
    rows: &[Row],
    ordered: &OrderedPartition,
    window: &BoundWindow,
    call: &BoundCall,
) -> Result<Vec<Value>> {
    match call.function {
        FunctionKind::Window(function) => match function {
            WindowFunction::RowNumber => Ok(ranking::row_number(ordered)),
            WindowFunction::Rank => Ok(ranking::rank(ordered)),
            WindowFunction::DenseRank => Ok(ranking::dense_rank(ordered)),
            WindowFunction::PercentRank => Ok(ranking::percent_rank(ordered)),
            WindowFunction::CumeDist => Ok(ranking::cume_dist(ordered)),
            WindowFunction::Ntile => {
                let buckets = literal_count(call, 0)?;
                Ok(ranking::ntile(ordered.len(), buckets))
            }
            WindowFunction::Lag => Ok(offset::shifted(rows, ordered, &call.args, Direction::Lag)),
            WindowFunction::Lead => {
                Ok(offset::shifted(rows, ordered, &call.args, Direction::Lead))
            }
            WindowFunction::FirstValue | WindowFunction::LastValue | WindowFunction::NthValue => {
                let pick = match function {
                    WindowFunction::FirstValue => FramePick::First,
                    WindowFunction::LastValue => FramePick::Last,
                    _ => FramePick::Nth(literal_count(call, 1)?),
                };
                let frames = FrameBounds::new(rows, ordered, window, &call.output_name)?;
                Ok(offset::pick_from_frame(
                    rows,
                    ordered,
                    &frames,
                    &call.args[0],
                    pick,
                ))
            }
        },
        FunctionKind::Aggregate(function) => {
            let frames = FrameBounds::new(rows, ordered, window, &call.output_name)?;
            let target = AggregateTarget {
                function,
                arg: call.args.first(),
                call: &call.output_name,
                window: &window.label,
            };
            aggregate_partition(
                rows,
                &ordered.rows,
                Some(&frames),
                &target,
                AggregateMode::Windowed,
            )
        }
    }
}

/// Positive integer constant argument, already checked by the planner.
fn literal_count(call: &BoundCall, index: usize) -> Result<usize> {
    call.args
        .get(index)
        .and_then(BoundExpr::as_literal)
        .and_then(Value::as_i64)
        .filter(|n| *n > 0)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .ok_or_else(|| {
            Error::internal(format!(
                "{} argument {} is not a positive constant",
                call.function, index
            ))
        })
}
