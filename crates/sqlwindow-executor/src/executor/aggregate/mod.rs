mod accumulator;

use sqlwindow_common::error::{Error, Result};
use sqlwindow_common::result::Row;
use sqlwindow_common::types::Value;
use sqlwindow_ir::AggregateFunction;
use tracing::warn;

pub(crate) use accumulator::Accumulator;

use super::frame::FrameBounds;
use crate::plan::BoundExpr;

/// How an aggregate's rows collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    /// One value for the whole group, as in GROUP BY.
    Grouped,
    /// One value per row, computed over that row's frame.
    Windowed,
}

/// One aggregate call with the names used in its error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AggregateTarget<'a> {
    pub function: AggregateFunction,
    pub arg: Option<&'a BoundExpr>,
    pub call: &'a str,
    pub window: &'a str,
}

impl AggregateTarget<'_> {
    fn accumulator(&self) -> Accumulator {
        Accumulator::new(self.function, self.arg.is_some())
    }

    fn add(&self, acc: &mut Accumulator, row: &Row) -> Result<()> {
        acc.accumulate(self.arg.map(|a| a.eval(row)))
            .map_err(|e| self.describe(e))
    }

    fn finalize(&self, acc: &Accumulator) -> Result<Value> {
        acc.finalize().map_err(|e| self.describe(e))
    }

    fn describe(&self, error: Error) -> Error {
        match error {
            Error::TypeMismatch { actual, .. } => Error::domain(
                self.call,
                self.window,
                format!(
                    "{} requires a numeric argument, got {}",
                    self.function.name(),
                    actual
                ),
            ),
            overflow @ Error::Overflow { .. } => {
                warn!(call = self.call, window = self.window, "aggregate overflow");
                overflow.in_call(self.call).in_window(self.window)
            }
            other => other,
        }
    }
}

/// Evaluates one aggregate over the rows at `positions`.
///
/// `Grouped` returns a single value for all positions. `Windowed` returns one
/// value per position, each over the frame that `frames` assigns to it; when
/// every frame starts at the partition start the rows are folded in once.
pub(crate) fn aggregate_partition(
    rows: &[Row],
    positions: &[usize],
    frames: Option<&FrameBounds<'_>>,
    target: &AggregateTarget<'_>,
    mode: AggregateMode,
) -> Result<Vec<Value>> {
    match (mode, frames) {
        (AggregateMode::Grouped, _) | (AggregateMode::Windowed, None) => {
            let mut acc = target.accumulator();
            for &idx in positions {
                target.add(&mut acc, &rows[idx])?;
            }
            let value = target.finalize(&acc)?;
            let copies = if mode == AggregateMode::Grouped {
                1
            } else {
                positions.len()
            };
            Ok(vec![value; copies])
        }
        (AggregateMode::Windowed, Some(frames)) if frames.starts_at_partition_start() => {
            running(rows, positions, frames, target)
        }
        (AggregateMode::Windowed, Some(frames)) => sliding(rows, positions, frames, target),
    }
}

fn running(
    rows: &[Row],
    positions: &[usize],
    frames: &FrameBounds<'_>,
    target: &AggregateTarget<'_>,
) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(positions.len());
    let mut acc = target.accumulator();
    let mut cursor = 0;
    let mut cached: Option<(usize, Value)> = None;

    for pos in 0..positions.len() {
        let frame = frames.range_at(pos);
        if frame.end < cursor {
            acc = target.accumulator();
            cursor = 0;
            cached = None;
        }
        while cursor < frame.end {
            target.add(&mut acc, &rows[positions[cursor]])?;
            cursor += 1;
        }
        let value = match &cached {
            Some((end, value)) if *end == frame.end => value.clone(),
            _ => {
                let value = target.finalize(&acc)?;
                cached = Some((frame.end, value.clone()));
                value
            }
        };
        out.push(value);
    }
    Ok(out)
}

fn sliding(
    rows: &[Row],
    positions: &[usize],
    frames: &FrameBounds<'_>,
    target: &AggregateTarget<'_>,
) -> Result<Vec<Value>> {
    (0..positions.len())
        .map(|pos| {
            let mut acc = target.accumulator();
            for &idx in &positions[frames.range_at(pos)] {
                target.add(&mut acc, &rows[idx])?;
            }
            target.finalize(&acc)
        })
        .collect()
}
