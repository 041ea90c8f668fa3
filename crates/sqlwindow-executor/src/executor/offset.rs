use sqlwindow_common::result::Row;
use sqlwindow_common::types::Value;

use super::frame::FrameBounds;
use super::sort::OrderedPartition;
use crate::plan::BoundExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Lag,
    Lead,
}

/// LAG/LEAD over the ordered partition. `args` is `(value [, offset [, default]])`;
/// the offset defaults to 1 and out-of-range targets yield the default, or NULL.
pub(crate) fn shifted(
    rows: &[Row],
    ordered: &OrderedPartition,
    args: &[BoundExpr],
    direction: Direction,
) -> Vec<Value> {
    let n = ordered.len();
    let offset = args
        .get(1)
        .and_then(BoundExpr::as_literal)
        .and_then(Value::as_i64)
        .map(|o| usize::try_from(o).unwrap_or(usize::MAX))
        .unwrap_or(1);
    let default = args.get(2);

    (0..n)
        .map(|pos| {
            let target = match direction {
                Direction::Lag => pos.checked_sub(offset),
                Direction::Lead => pos.checked_add(offset).filter(|t| *t < n),
            };
            match target {
                Some(t) => args[0].eval(&rows[ordered.rows[t]]).clone(),
                None => default
                    .map(|d| d.eval(&rows[ordered.rows[pos]]).clone())
                    .unwrap_or(Value::Null),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FramePick {
    First,
    Last,
    /// 1-based position inside the frame.
    Nth(usize),
}

/// FIRST_VALUE / LAST_VALUE / NTH_VALUE: one value picked from each row's frame.
pub(crate) fn pick_from_frame(
    rows: &[Row],
    ordered: &OrderedPartition,
    bounds: &FrameBounds<'_>,
    arg: &BoundExpr,
    pick: FramePick,
) -> Vec<Value> {
    (0..ordered.len())
        .map(|pos| {
            let frame = bounds.range_at(pos);
            let chosen = match pick {
                FramePick::First => (!frame.is_empty()).then_some(frame.start),
                FramePick::Last => (!frame.is_empty()).then(|| frame.end - 1),
                FramePick::Nth(k) => k
                    .checked_sub(1)
                    .map(|k| frame.start.saturating_add(k))
                    .filter(|p| *p < frame.end),
            };
            chosen
                .map(|p| arg.eval(&rows[ordered.rows[p]]).clone())
                .unwrap_or(Value::Null)
        })
        .collect()
}
