use sqlwindow_common::types::Value;

use super::sort::OrderedPartition;

pub(crate) fn row_number(ordered: &OrderedPartition) -> Vec<Value> {
    (1..=ordered.len() as i64).map(Value::int64).collect()
}

/// 1 + number of rows strictly before the current peer group.
pub(crate) fn rank(ordered: &OrderedPartition) -> Vec<Value> {
    (0..ordered.len())
        .map(|pos| Value::int64(ordered.peer_group(pos).start as i64 + 1))
        .collect()
}

pub(crate) fn dense_rank(ordered: &OrderedPartition) -> Vec<Value> {
    ordered
        .group_of
        .iter()
        .map(|g| Value::int64(*g as i64 + 1))
        .collect()
}

pub(crate) fn percent_rank(ordered: &OrderedPartition) -> Vec<Value> {
    let n = ordered.len();
    (0..n)
        .map(|pos| {
            if n <= 1 {
                Value::float64(0.0)
            } else {
                let preceding = ordered.peer_group(pos).start;
                Value::float64(preceding as f64 / (n - 1) as f64)
            }
        })
        .collect()
}

pub(crate) fn cume_dist(ordered: &OrderedPartition) -> Vec<Value> {
    let n = ordered.len() as f64;
    (0..ordered.len())
        .map(|pos| Value::float64(ordered.peer_group(pos).end as f64 / n))
        .collect()
}

/// Splits `row_count` rows into at most `buckets` groups numbered from 1.
/// The first `row_count % buckets` groups take one extra row; with fewer
/// rows than buckets every row gets its own bucket.
pub(crate) fn ntile(row_count: usize, buckets: usize) -> Vec<Value> {
    if row_count == 0 || buckets == 0 {
        return Vec::new();
    }
    let buckets = buckets.min(row_count);
    let base = row_count / buckets;
    let extra = row_count % buckets;

    let mut out = Vec::with_capacity(row_count);
    for bucket in 0..buckets {
        let size = if bucket < extra { base + 1 } else { base };
        out.extend(std::iter::repeat_n(Value::int64(bucket as i64 + 1), size));
    }
    out
}
