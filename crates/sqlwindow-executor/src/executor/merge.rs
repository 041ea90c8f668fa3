use sqlwindow_common::result::{ColumnInfo, QueryResult, Row};
use sqlwindow_common::types::Value;

use super::sort::compare_rows;
use crate::plan::BoundSort;

/// Appends the computed columns to each input row and applies the requested
/// output order. `columns[c][i]` is call `c`'s value for input row `i`.
pub(crate) fn merge_results(
    schema: Vec<ColumnInfo>,
    rows: &[Row],
    columns: Vec<Vec<Value>>,
    output_order: &[BoundSort],
) -> QueryResult {
    let mut computed: Vec<std::vec::IntoIter<Value>> =
        columns.into_iter().map(Vec::into_iter).collect();

    let mut merged: Vec<Row> = rows
        .iter()
        .map(|row| {
            let mut values = Vec::with_capacity(row.len() + computed.len());
            values.extend(row.iter().cloned());
            for column in &mut computed {
                values.push(column.next().unwrap_or(Value::Null));
            }
            Row::new(values)
        })
        .collect();

    if !output_order.is_empty() {
        // Stable, so rows with equal keys keep input order.
        merged.sort_by(|a, b| compare_rows(a, b, output_order));
    }

    QueryResult::new(schema, merged)
}
