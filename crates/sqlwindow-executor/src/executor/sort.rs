use std::cmp::Ordering;
use std::ops::Range;

use itertools::Itertools;
use sqlwindow_common::result::Row;

use crate::plan::BoundSort;

/// A partition after sorting: row positions in window order, split into
/// peer groups of rows with equal order keys.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedPartition {
    pub rows: Vec<usize>,
    pub peer_groups: Vec<Range<usize>>,
    /// Peer group of each position in `rows`.
    pub group_of: Vec<usize>,
}

impl OrderedPartition {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn peer_group(&self, pos: usize) -> Range<usize> {
        self.peer_groups[self.group_of[pos]].clone()
    }
}

/// Sorts one partition by the window's order keys. Equal keys keep input
/// order, so the result never depends on the sort algorithm.
pub fn order_partition(
    rows: &[Row],
    partition: &[usize],
    order_by: &[BoundSort],
) -> OrderedPartition {
    let mut sorted = partition.to_vec();
    if !order_by.is_empty() {
        sorted.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], order_by).then(a.cmp(&b)));
    }

    let n = sorted.len();
    let mut peer_groups = Vec::new();
    if n > 0 {
        let mut start = 0;
        if !order_by.is_empty() {
            for (i, (a, b)) in sorted.iter().tuple_windows().enumerate() {
                if compare_rows(&rows[*a], &rows[*b], order_by) != Ordering::Equal {
                    peer_groups.push(start..i + 1);
                    start = i + 1;
                }
            }
        }
        peer_groups.push(start..n);
    }

    let mut group_of = vec![0; n];
    for (g, range) in peer_groups.iter().enumerate() {
        for slot in &mut group_of[range.clone()] {
            *slot = g;
        }
    }

    OrderedPartition {
        rows: sorted,
        peer_groups,
        group_of,
    }
}

pub(crate) fn compare_rows(a: &Row, b: &Row, order_by: &[BoundSort]) -> Ordering {
    for sort in order_by {
        let a_val = sort.expr.eval(a);
        let b_val = sort.expr.eval(b);

        match (a_val.is_null(), b_val.is_null()) {
            (true, true) => continue,
            (true, false) => {
                return if sort.nulls_first {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }
            (false, true) => {
                return if sort.nulls_first {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
            (false, false) => {}
        }

        let ord = a_val.cmp(b_val);
        let ord = if sort.asc { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
