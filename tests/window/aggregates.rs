use sqlwindow::{
    AggregateFunction, DataType, Error, Field, OutputOrder, Row, Schema, SortExpr, Value,
    WindowFrame, WindowFrameBound, WindowFunction, WindowFunctionCall, WindowQuery, WindowSpec,
    col,
};
use sqlwindow_test_utils::{assert_column_eq, assert_table_eq, n, vals};

use crate::common::{create_engine, sales_query, values_query};

fn by_dept() -> WindowSpec {
    WindowSpec::new().partition_by(col("dept"))
}

fn by_dept_amount() -> WindowSpec {
    by_dept().order_by(SortExpr::asc(col("amount")))
}

#[test]
fn test_partition_totals() {
    let query = sales_query()
        .call(WindowFunctionCall::new(
            "total",
            AggregateFunction::Sum,
            vec![col("amount")],
            by_dept(),
        ))
        .call(WindowFunctionCall::new(
            "cnt",
            AggregateFunction::Count,
            vec![col("amount")],
            by_dept(),
        ))
        .call(WindowFunctionCall::new(
            "cnt_star",
            AggregateFunction::Count,
            vec![],
            by_dept(),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "total", vals![900, 700, 900, 900, 700, 900, null]);
    assert_column_eq(&result, "cnt", vals![4, 2, 4, 4, 2, 4, 0]);
    assert_column_eq(&result, "cnt_star", vals![4, 2, 4, 4, 2, 4, 1]);
}

#[test]
fn test_avg_min_max() {
    let query = sales_query()
        .call(WindowFunctionCall::new(
            "avg",
            AggregateFunction::Avg,
            vec![col("amount")],
            by_dept(),
        ))
        .call(WindowFunctionCall::new(
            "lo",
            AggregateFunction::Min,
            vec![col("amount")],
            by_dept(),
        ))
        .call(WindowFunctionCall::new(
            "hi",
            AggregateFunction::Max,
            vec![col("amount")],
            by_dept(),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "avg",
        vals![225.0, 350.0, 225.0, 225.0, 350.0, 225.0, null],
    );
    assert_column_eq(&result, "lo", vals![100, 200, 100, 100, 200, 100, null]);
    assert_column_eq(&result, "hi", vals![300, 500, 300, 300, 500, 300, null]);
}

#[test]
fn test_min_max_over_strings() {
    let query = sales_query().call(WindowFunctionCall::new(
        "first_name",
        AggregateFunction::Min,
        vec![col("name")],
        by_dept(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "first_name",
        vals!["ann", "bob", "ann", "ann", "bob", "ann", "gus"],
    );
}

#[test]
fn test_running_sum_includes_peers() {
    let query = sales_query().call(WindowFunctionCall::new(
        "running",
        AggregateFunction::Sum,
        vec![col("amount")],
        by_dept_amount(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "running", vals![900, 200, 100, 900, 700, 300, null]);
}

#[test]
fn test_running_sum_by_rows() {
    let query = sales_query().call(WindowFunctionCall::new(
        "running",
        AggregateFunction::Sum,
        vec![col("amount")],
        by_dept_amount().frame(WindowFrame::rows(
            WindowFrameBound::unbounded_preceding(),
            WindowFrameBound::CurrentRow,
        )),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "running", vals![600, 200, 100, 900, 700, 300, null]);
}

#[test]
fn test_running_sum_ordered_output() {
    let query = values_query(&[3, 1, 2])
        .call(WindowFunctionCall::new(
            "total",
            AggregateFunction::Sum,
            vec![col("v")],
            WindowSpec::new().order_by(SortExpr::asc(col("v"))),
        ))
        .output_order(OutputOrder::By(vec![SortExpr::asc(col("v"))]));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(result, [[1, 1], [2, 3], [3, 6]]);
}

#[test]
fn test_sum_promotes_to_float() {
    let schema = Schema::from_fields(vec![Field::nullable("x", DataType::Unknown)]);
    let rows = vec![
        Row::new(vec![Value::int64(1)]),
        Row::new(vec![Value::float64(0.5)]),
    ];
    let query = WindowQuery::new(schema, rows).call(WindowFunctionCall::new(
        "total",
        AggregateFunction::Sum,
        vec![col("x")],
        WindowSpec::new(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "total", vals![1.5, 1.5]);
}

#[test]
fn test_numeric_avg_stays_numeric() {
    let schema = Schema::from_fields(vec![Field::nullable("price", DataType::Numeric)]);
    let rows = vec![
        Row::new(vec![n("1.10")]),
        Row::new(vec![n("2.20")]),
        Row::new(vec![n("3.30")]),
    ];
    let query = WindowQuery::new(schema, rows).call(WindowFunctionCall::new(
        "avg",
        AggregateFunction::Avg,
        vec![col("price")],
        WindowSpec::new(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_eq!(result.schema[1].data_type, DataType::Numeric);
    assert_column_eq(&result, "avg", vec![n("2.2"), n("2.2"), n("2.2")]);
}

#[test]
fn test_sum_overflow_is_an_error() {
    let query = values_query(&[i64::MAX, 1]).call(WindowFunctionCall::new(
        "total",
        AggregateFunction::Sum,
        vec![col("v")],
        WindowSpec::new(),
    ));

    let err = create_engine().execute(&query).unwrap_err();

    assert!(matches!(err, Error::Overflow { .. }));
    assert_eq!(
        err.to_string(),
        "Numeric overflow [call: total, window: <inline>]"
    );
}

/// Untyped column holding NUMERIC 1.5, FLOAT64 9.0 and INT64 2.
fn mixed_numeric_query() -> WindowQuery {
    let schema = Schema::from_fields(vec![Field::nullable("v", DataType::Unknown)]);
    let rows = vec![
        Row::new(vec![n("1.5")]),
        Row::new(vec![Value::float64(9.0)]),
        Row::new(vec![Value::int64(2)]),
    ];
    WindowQuery::new(schema, rows)
}

#[test]
fn test_min_max_over_mixed_numeric_column() {
    let query = mixed_numeric_query()
        .call(WindowFunctionCall::new(
            "hi",
            AggregateFunction::Max,
            vec![col("v")],
            WindowSpec::new(),
        ))
        .call(WindowFunctionCall::new(
            "lo",
            AggregateFunction::Min,
            vec![col("v")],
            WindowSpec::new(),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "hi", vals![9.0, 9.0, 9.0]);
    assert_column_eq(&result, "lo", vec![n("1.5"), n("1.5"), n("1.5")]);
}

#[test]
fn test_rank_and_order_over_mixed_numeric_column() {
    let query = mixed_numeric_query()
        .call(WindowFunctionCall::new(
            "rk",
            WindowFunction::Rank,
            vec![],
            WindowSpec::new().order_by(SortExpr::asc(col("v"))),
        ))
        .order_output_by(SortExpr::desc(col("v")));

    let result = create_engine().execute(&query).unwrap();

    assert_table_eq!(result, [[9.0, 3], [2, 2], [n("1.5"), 1]]);
}
