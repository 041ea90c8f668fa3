use sqlwindow::{
    Error, OutputOrder, SortExpr, WindowFunction, WindowFunctionCall, WindowSpec, col,
};
use sqlwindow_test_utils::assert_table_eq;

use crate::common::{create_engine, sales_query};

fn rank_by_dept() -> WindowFunctionCall {
    WindowFunctionCall::new(
        "rk",
        WindowFunction::Rank,
        vec![],
        WindowSpec::new()
            .partition_by(col("dept"))
            .order_by(SortExpr::desc(col("amount"))),
    )
}

#[test]
fn test_input_order_by_default() {
    let query = sales_query().call(rank_by_dept());

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(
        result,
        [
            ["eng", "ann", 300, 1],
            ["ops", "bob", 200, 2],
            ["eng", "cat", 100, 4],
            ["eng", "dan", 300, 1],
            ["ops", "eve", 500, 1],
            ["eng", "fay", 200, 3],
            ["hr", "gus", null, 1],
        ]
    );
}

#[test]
fn test_order_by_output_column_keeps_input_order_on_ties() {
    let query = sales_query()
        .call(rank_by_dept())
        .order_output_by(SortExpr::asc(col("rk")));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(
        result,
        [
            ["eng", "ann", 300, 1],
            ["eng", "dan", 300, 1],
            ["ops", "eve", 500, 1],
            ["hr", "gus", null, 1],
            ["ops", "bob", 200, 2],
            ["eng", "fay", 200, 3],
            ["eng", "cat", 100, 4],
        ]
    );
}

#[test]
fn test_order_by_input_and_output_columns() {
    let query = sales_query()
        .call(rank_by_dept())
        .order_output_by(SortExpr::asc(col("dept")))
        .order_output_by(SortExpr::desc(col("rk")));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(
        result,
        [
            ["eng", "cat", 100, 4],
            ["eng", "fay", 200, 3],
            ["eng", "ann", 300, 1],
            ["eng", "dan", 300, 1],
            ["hr", "gus", null, 1],
            ["ops", "bob", 200, 2],
            ["ops", "eve", 500, 1],
        ]
    );
}

#[test]
fn test_output_nulls_placement() {
    let query = sales_query().output_order(OutputOrder::By(vec![
        SortExpr::asc(col("amount")).nulls_first(),
    ]));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(
        result,
        [
            ["hr", "gus", null],
            ["eng", "cat", 100],
            ["ops", "bob", 200],
            ["eng", "fay", 200],
            ["eng", "ann", 300],
            ["eng", "dan", 300],
            ["ops", "eve", 500],
        ]
    );
}

#[test]
fn test_output_order_unknown_column() {
    let query = sales_query()
        .call(rank_by_dept())
        .order_output_by(SortExpr::asc(col("score")));

    let err = create_engine().validate(&query).unwrap_err();

    assert!(matches!(err, Error::ColumnNotFound { .. }));
}
