use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use sqlwindow::{
    AggregateFunction, DataType, Field, QueryResult, Row, Schema, SortExpr, Value, WindowFrame,
    WindowFrameBound, WindowFunction, WindowFunctionCall, WindowQuery, WindowSpec, col, lit,
};

use crate::common::{create_engine, sequential_engine};

const G: usize = 0;
const V: usize = 1;
const RN: usize = 2;
const RK: usize = 3;
const DRK: usize = 4;
const NT: usize = 5;
const LAG: usize = 6;
const LEAD: usize = 7;
const RUNNING: usize = 8;

fn rows_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..4, -10i64..10), 0..60)
}

fn ranked_query(pairs: &[(i64, i64)], buckets: i64) -> WindowQuery {
    let schema = Schema::from_fields(vec![
        Field::nullable("g", DataType::Int64),
        Field::nullable("v", DataType::Int64),
    ]);
    let rows = pairs
        .iter()
        .map(|(g, v)| Row::new(vec![Value::int64(*g), Value::int64(*v)]))
        .collect();
    let running = WindowSpec::based_on("w").frame(WindowFrame::rows(
        WindowFrameBound::unbounded_preceding(),
        WindowFrameBound::CurrentRow,
    ));

    WindowQuery::new(schema, rows)
        .window(
            "w",
            WindowSpec::new()
                .partition_by(col("g"))
                .order_by(SortExpr::asc(col("v"))),
        )
        .call(WindowFunctionCall::new("rn", WindowFunction::RowNumber, vec![], "w"))
        .call(WindowFunctionCall::new("rk", WindowFunction::Rank, vec![], "w"))
        .call(WindowFunctionCall::new("drk", WindowFunction::DenseRank, vec![], "w"))
        .call(WindowFunctionCall::new(
            "nt",
            WindowFunction::Ntile,
            vec![lit(buckets)],
            "w",
        ))
        .call(WindowFunctionCall::new("lag", WindowFunction::Lag, vec![col("v")], "w"))
        .call(WindowFunctionCall::new("lead", WindowFunction::Lead, vec![col("v")], "w"))
        .call(WindowFunctionCall::new(
            "running",
            AggregateFunction::Sum,
            vec![col("v")],
            running,
        ))
}

fn int(row: &Row, column: usize) -> i64 {
    row.values()[column].as_i64().unwrap()
}

/// Result rows per partition key, in window order.
fn by_partition(result: &QueryResult) -> BTreeMap<i64, Vec<&Row>> {
    let mut partitions: BTreeMap<i64, Vec<&Row>> = BTreeMap::new();
    for row in &result.rows {
        partitions.entry(int(row, G)).or_default().push(row);
    }
    for rows in partitions.values_mut() {
        rows.sort_by_key(|r| int(r, RN));
    }
    partitions
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_rows_preserved(pairs in rows_strategy()) {
        let result = create_engine().execute(&ranked_query(&pairs, 3)).unwrap();

        prop_assert_eq!(result.row_count(), pairs.len());
        for (row, (g, v)) in result.rows.iter().zip(&pairs) {
            prop_assert_eq!(&row.values()[..2], &[Value::int64(*g), Value::int64(*v)][..]);
        }
    }

    #[test]
    fn prop_row_numbers_are_dense(pairs in rows_strategy()) {
        let result = create_engine().execute(&ranked_query(&pairs, 3)).unwrap();

        for rows in by_partition(&result).values() {
            let numbers: Vec<i64> = rows.iter().map(|r| int(r, RN)).collect();
            prop_assert_eq!(numbers, (1..=rows.len() as i64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn prop_rank_counts_smaller_keys(pairs in rows_strategy()) {
        let result = create_engine().execute(&ranked_query(&pairs, 3)).unwrap();

        for rows in by_partition(&result).values() {
            for row in rows {
                let v = int(row, V);
                let below = rows.iter().filter(|r| int(r, V) < v).count() as i64;
                let distinct_below = rows
                    .iter()
                    .map(|r| int(r, V))
                    .filter(|x| *x < v)
                    .collect::<BTreeSet<_>>()
                    .len() as i64;
                prop_assert_eq!(int(row, RK), below + 1);
                prop_assert_eq!(int(row, DRK), distinct_below + 1);
            }
        }
    }

    #[test]
    fn prop_ntile_buckets_balanced(pairs in rows_strategy(), buckets in 1i64..8) {
        let result = create_engine().execute(&ranked_query(&pairs, buckets)).unwrap();

        for rows in by_partition(&result).values() {
            let p = rows.len();
            let k = (buckets as usize).min(p);
            let mut sizes = vec![0usize; k];
            let mut previous = 1;
            for row in rows {
                let bucket = int(row, NT);
                prop_assert!(bucket >= previous);
                prop_assert!(bucket >= 1 && bucket as usize <= k);
                sizes[bucket as usize - 1] += 1;
                previous = bucket;
            }
            for (i, size) in sizes.iter().enumerate() {
                prop_assert_eq!(*size, p / k + usize::from(i < p % k));
            }
        }
    }

    #[test]
    fn prop_lag_lead_neighbours(pairs in rows_strategy()) {
        let result = create_engine().execute(&ranked_query(&pairs, 3)).unwrap();

        for rows in by_partition(&result).values() {
            for (i, row) in rows.iter().enumerate() {
                let lag = &row.values()[LAG];
                let lead = &row.values()[LEAD];
                if i == 0 {
                    prop_assert!(lag.is_null());
                } else {
                    prop_assert_eq!(lag, &rows[i - 1].values()[V]);
                }
                if i + 1 == rows.len() {
                    prop_assert!(lead.is_null());
                } else {
                    prop_assert_eq!(lead, &rows[i + 1].values()[V]);
                }
            }
        }
    }

    #[test]
    fn prop_running_sum_is_prefix_sum(pairs in rows_strategy()) {
        let result = create_engine().execute(&ranked_query(&pairs, 3)).unwrap();

        for rows in by_partition(&result).values() {
            let mut total = 0;
            for row in rows {
                total += int(row, V);
                prop_assert_eq!(int(row, RUNNING), total);
            }
        }
    }

    #[test]
    fn prop_parallel_matches_sequential(pairs in rows_strategy(), buckets in 1i64..8) {
        let query = ranked_query(&pairs, buckets);

        let parallel = create_engine().execute(&query).unwrap();
        let sequential = sequential_engine().execute(&query).unwrap();

        prop_assert_eq!(parallel, sequential);
    }
}
