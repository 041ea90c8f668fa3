use sqlwindow::{SortExpr, WindowFunction, WindowFunctionCall, WindowSpec, col, lit};
use sqlwindow_test_utils::{assert_column_eq, assert_table_eq, vals};

use crate::common::{create_engine, sales_query, values_query};

fn by_dept_amount_desc() -> WindowSpec {
    WindowSpec::new()
        .partition_by(col("dept"))
        .order_by(SortExpr::desc(col("amount")))
}

#[test]
fn test_row_number_with_partition() {
    let query = sales_query().call(WindowFunctionCall::new(
        "rn",
        WindowFunction::RowNumber,
        vec![],
        WindowSpec::new()
            .partition_by(col("dept"))
            .order_by(SortExpr::asc(col("amount"))),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(
        result,
        [
            ["eng", "ann", 300, 3],
            ["ops", "bob", 200, 1],
            ["eng", "cat", 100, 1],
            ["eng", "dan", 300, 4],
            ["ops", "eve", 500, 2],
            ["eng", "fay", 200, 2],
            ["hr", "gus", null, 1],
        ]
    );
}

#[test]
fn test_row_number_without_order_follows_input() {
    let query = sales_query().call(WindowFunctionCall::new(
        "rn",
        WindowFunction::RowNumber,
        vec![],
        WindowSpec::new().partition_by(col("dept")),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "rn", vals![1, 1, 2, 3, 2, 4, 1]);
}

#[test]
fn test_rank_and_dense_rank_with_ties() {
    let query = sales_query()
        .call(WindowFunctionCall::new(
            "rk",
            WindowFunction::Rank,
            vec![],
            by_dept_amount_desc(),
        ))
        .call(WindowFunctionCall::new(
            "drk",
            WindowFunction::DenseRank,
            vec![],
            by_dept_amount_desc(),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "rk", vals![1, 2, 4, 1, 1, 3, 1]);
    assert_column_eq(&result, "drk", vals![1, 2, 3, 1, 1, 2, 1]);
}

#[test]
fn test_rank_over_duplicate_keys() {
    let query = values_query(&[5, 5, 7])
        .call(WindowFunctionCall::new(
            "rk",
            WindowFunction::Rank,
            vec![],
            WindowSpec::new().order_by(SortExpr::asc(col("v"))),
        ))
        .call(WindowFunctionCall::new(
            "drk",
            WindowFunction::DenseRank,
            vec![],
            WindowSpec::new().order_by(SortExpr::asc(col("v"))),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(result, [[5, 1, 1], [5, 1, 1], [7, 3, 2]]);
}

#[test]
fn test_percent_rank_and_cume_dist() {
    let query = sales_query()
        .call(WindowFunctionCall::new(
            "pr",
            WindowFunction::PercentRank,
            vec![],
            by_dept_amount_desc(),
        ))
        .call(WindowFunctionCall::new(
            "cd",
            WindowFunction::CumeDist,
            vec![],
            by_dept_amount_desc(),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "pr",
        vals![0.0, 1.0, 1.0, 0.0, 0.0, 0.6666666666666666, 0.0],
    );
    assert_column_eq(&result, "cd", vals![0.5, 1.0, 1.0, 0.5, 0.5, 0.75, 1.0]);
}

#[test]
fn test_ntile_uneven_buckets() {
    let query = values_query(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).call(WindowFunctionCall::new(
        "bucket",
        WindowFunction::Ntile,
        vec![lit(4)],
        WindowSpec::new().order_by(SortExpr::asc(col("v"))),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "bucket", vals![1, 1, 1, 2, 2, 2, 3, 3, 4, 4]);
}

#[test]
fn test_ntile_more_buckets_than_rows() {
    let query = values_query(&[30, 10, 20]).call(WindowFunctionCall::new(
        "bucket",
        WindowFunction::Ntile,
        vec![lit(5)],
        WindowSpec::new().order_by(SortExpr::asc(col("v"))),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "bucket", vals![3, 1, 2]);
}

#[test]
fn test_ntile_per_partition() {
    let query = sales_query().call(WindowFunctionCall::new(
        "half",
        WindowFunction::Ntile,
        vec![lit(2)],
        WindowSpec::new()
            .partition_by(col("dept"))
            .order_by(SortExpr::asc(col("amount"))),
    ));

    let result = create_engine().execute(&query).unwrap();

    // eng: cat, fay | ann, dan
    assert_column_eq(&result, "half", vals![2, 1, 1, 2, 2, 1, 1]);
}

#[test]
fn test_empty_input() {
    let query = values_query(&[]).call(WindowFunctionCall::new(
        "rn",
        WindowFunction::RowNumber,
        vec![],
        WindowSpec::new().order_by(SortExpr::asc(col("v"))),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(result, []);
    assert_eq!(result.column_names(), vec!["v", "rn"]);
}
