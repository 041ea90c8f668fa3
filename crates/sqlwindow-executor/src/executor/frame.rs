use std::ops::Range;

use rust_decimal::Decimal;
use sqlwindow_common::error::{Error, Result};
use sqlwindow_common::result::Row;
use sqlwindow_common::types::Value;
use sqlwindow_ir::{WindowFrame, WindowFrameBound, WindowFrameUnit};

use super::sort::OrderedPartition;
use crate::plan::BoundWindow;

/// Resolves the frame of every row of one ordered partition to a range of
/// positions in that partition.
///
/// With no frame clause the frame is the whole partition when the window is
/// unordered, otherwise partition start through the current row's last peer.
pub(crate) struct FrameBounds<'a> {
    ordered: &'a OrderedPartition,
    frame: Option<&'a WindowFrame>,
    has_order: bool,
    /// Present only for RANGE frames with an offset.
    range_keys: Option<RangeKeys>,
}

/// Non-NULL order keys of a RANGE frame, flipped to ascend and held in the
/// narrowest exact type the partition allows so offsets never merge
/// distinct keys.
struct RangeKeys {
    /// Positions holding a non-NULL key; NULLs sort to one end so this is
    /// contiguous.
    non_null: Range<usize>,
    values: RangeKeyValues,
}

enum RangeKeyValues {
    Int64(Vec<i128>),
    Numeric(Vec<Decimal>),
    Float64(Vec<f64>),
}

impl<'a> FrameBounds<'a> {
    pub(crate) fn new(
        rows: &[Row],
        ordered: &'a OrderedPartition,
        window: &'a BoundWindow,
        call: &str,
    ) -> Result<Self> {
        let frame = window.frame.as_ref();
        let range_keys = match frame {
            Some(f) if f.unit == WindowFrameUnit::Range && f.has_offset() => {
                Some(RangeKeys::build(rows, ordered, window, call)?)
            }
            _ => None,
        };
        Ok(Self {
            ordered,
            frame,
            has_order: window.has_order_by(),
            range_keys,
        })
    }

    /// True when every frame begins at the first row of the partition, which
    /// lets aggregates accumulate incrementally.
    pub(crate) fn starts_at_partition_start(&self) -> bool {
        match self.frame {
            None => true,
            Some(f) => f.start == WindowFrameBound::Preceding(None),
        }
    }

    pub(crate) fn range_at(&self, pos: usize) -> Range<usize> {
        let n = self.ordered.len();
        let frame = match self.frame {
            Some(frame) => frame,
            None if self.has_order => return 0..self.ordered.peer_group(pos).end,
            None => return 0..n,
        };

        let end_bound = frame.end_bound();
        let (start, end) = match frame.unit {
            WindowFrameUnit::Rows => (
                rows_start(frame.start, pos, n),
                rows_end(end_bound, pos, n),
            ),
            WindowFrameUnit::Groups => (
                self.groups_start(frame.start, pos, n),
                self.groups_end(end_bound, pos, n),
            ),
            WindowFrameUnit::Range => (
                self.range_start(frame.start, pos, n),
                self.range_end(end_bound, pos, n),
            ),
        };
        let end = end.min(n);
        let start = start.min(end);
        start..end
    }

    fn groups_start(&self, bound: WindowFrameBound, pos: usize, n: usize) -> usize {
        let groups = &self.ordered.peer_groups;
        let g = self.ordered.group_of[pos];
        match bound {
            WindowFrameBound::Preceding(None) => 0,
            WindowFrameBound::Preceding(Some(k)) => groups[g.saturating_sub(offset(k))].start,
            WindowFrameBound::CurrentRow => groups[g].start,
            WindowFrameBound::Following(Some(k)) => groups
                .get(g.saturating_add(offset(k)))
                .map(|r| r.start)
                .unwrap_or(n),
            WindowFrameBound::Following(None) => n,
        }
    }

    fn groups_end(&self, bound: WindowFrameBound, pos: usize, n: usize) -> usize {
        let groups = &self.ordered.peer_groups;
        let g = self.ordered.group_of[pos];
        match bound {
            WindowFrameBound::Preceding(None) => 0,
            WindowFrameBound::Preceding(Some(k)) => g
                .checked_sub(offset(k))
                .map(|target| groups[target].end)
                .unwrap_or(0),
            WindowFrameBound::CurrentRow => groups[g].end,
            WindowFrameBound::Following(Some(k)) => {
                let target = g.saturating_add(offset(k)).min(groups.len() - 1);
                groups[target].end
            }
            WindowFrameBound::Following(None) => n,
        }
    }

    fn range_start(&self, bound: WindowFrameBound, pos: usize, n: usize) -> usize {
        match bound {
            WindowFrameBound::Preceding(None) => 0,
            WindowFrameBound::Following(None) => n,
            _ => self
                .range_keys
                .as_ref()
                .and_then(|keys| keys.seek(pos, bound, false))
                .unwrap_or_else(|| self.ordered.peer_group(pos).start),
        }
    }

    fn range_end(&self, bound: WindowFrameBound, pos: usize, n: usize) -> usize {
        match bound {
            WindowFrameBound::Preceding(None) => 0,
            WindowFrameBound::Following(None) => n,
            _ => self
                .range_keys
                .as_ref()
                .and_then(|keys| keys.seek(pos, bound, true))
                .unwrap_or_else(|| self.ordered.peer_group(pos).end),
        }
    }
}

impl RangeKeys {
    fn build(
        rows: &[Row],
        ordered: &OrderedPartition,
        window: &BoundWindow,
        call: &str,
    ) -> Result<Self> {
        let sort = window.order_by.first().ok_or_else(|| {
            Error::specification(&window.label, "RANGE frame with an offset requires ORDER BY")
        })?;

        let keys: Vec<&Value> = ordered
            .rows
            .iter()
            .map(|&idx| sort.expr.eval(&rows[idx]))
            .collect();
        let start = keys.iter().position(|v| !v.is_null()).unwrap_or(keys.len());
        let end = keys
            .iter()
            .rposition(|v| !v.is_null())
            .map(|p| p + 1)
            .unwrap_or(start);
        let present = &keys[start..end];

        if let Some(bad) = present.iter().find(|v| !v.data_type().is_numeric()) {
            return Err(Error::domain(
                call,
                &window.label,
                format!(
                    "RANGE frame with an offset requires a numeric ORDER BY key, got {}",
                    bad.data_type()
                ),
            ));
        }

        let values = if present.iter().all(|v| matches!(v, Value::Int64(_))) {
            RangeKeyValues::Int64(
                present
                    .iter()
                    .filter_map(|v| v.as_i64())
                    .map(|k| if sort.asc { i128::from(k) } else { -i128::from(k) })
                    .collect(),
            )
        } else if present.iter().all(|v| !matches!(v, Value::Float64(_))) {
            RangeKeyValues::Numeric(
                present
                    .iter()
                    .filter_map(|v| v.as_numeric())
                    .map(|k| if sort.asc { k } else { -k })
                    .collect(),
            )
        } else {
            RangeKeyValues::Float64(
                present
                    .iter()
                    .filter_map(|v| v.as_f64())
                    .map(|k| if sort.asc { k } else { -k })
                    .collect(),
            )
        };

        Ok(Self {
            non_null: start..end,
            values,
        })
    }

    /// Partition position where an offset bound lands for the row at `pos`:
    /// the first key at least `current ± k`, or with `past` the first key
    /// above it. `None` for NULL current keys and non-offset bounds.
    fn seek(&self, pos: usize, bound: WindowFrameBound, past: bool) -> Option<usize> {
        if !self.non_null.contains(&pos) {
            return None;
        }
        let (k, ahead) = match bound {
            WindowFrameBound::Preceding(Some(k)) => (k, false),
            WindowFrameBound::Following(Some(k)) => (k, true),
            _ => return None,
        };
        let i = pos - self.non_null.start;

        let found = match &self.values {
            RangeKeyValues::Int64(keys) => {
                let k = i128::from(k);
                let target = if ahead { keys[i] + k } else { keys[i] - k };
                seek_sorted(keys, &target, past)
            }
            RangeKeyValues::Numeric(keys) => {
                let k = Decimal::from(k);
                let target = if ahead {
                    keys[i].checked_add(k)
                } else {
                    keys[i].checked_sub(k)
                };
                match target {
                    Some(target) => seek_sorted(keys, &target, past),
                    None if ahead => keys.len(),
                    None => 0,
                }
            }
            RangeKeyValues::Float64(keys) => {
                let k = k as f64;
                let target = if ahead { keys[i] + k } else { keys[i] - k };
                seek_sorted(keys, &target, past)
            }
        };
        Some(self.non_null.start + found)
    }
}

fn seek_sorted<T: PartialOrd>(keys: &[T], target: &T, past: bool) -> usize {
    if past {
        keys.partition_point(|k| k <= target)
    } else {
        keys.partition_point(|k| k < target)
    }
}

fn offset(k: u64) -> usize {
    usize::try_from(k).unwrap_or(usize::MAX)
}

fn rows_start(bound: WindowFrameBound, pos: usize, n: usize) -> usize {
    match bound {
        WindowFrameBound::Preceding(None) => 0,
        WindowFrameBound::Preceding(Some(k)) => pos.saturating_sub(offset(k)),
        WindowFrameBound::CurrentRow => pos,
        WindowFrameBound::Following(Some(k)) => pos.saturating_add(offset(k)),
        WindowFrameBound::Following(None) => n,
    }
}

fn rows_end(bound: WindowFrameBound, pos: usize, n: usize) -> usize {
    match bound {
        WindowFrameBound::Preceding(None) => 0,
        WindowFrameBound::Preceding(Some(k)) => (pos + 1).saturating_sub(offset(k)),
        WindowFrameBound::CurrentRow => pos + 1,
        WindowFrameBound::Following(Some(k)) => (pos + 1).saturating_add(offset(k)),
        WindowFrameBound::Following(None) => n,
    }
}
