use sqlwindow::{
    SortExpr, WindowFrame, WindowFrameBound, WindowFunction, WindowFunctionCall, WindowSpec, col,
    lit,
};
use sqlwindow_test_utils::{assert_column_eq, vals};

use crate::common::{create_engine, sales_query};

fn by_dept_amount() -> WindowSpec {
    WindowSpec::new()
        .partition_by(col("dept"))
        .order_by(SortExpr::asc(col("amount")))
}

fn whole_partition() -> WindowFrame {
    WindowFrame::rows(
        WindowFrameBound::unbounded_preceding(),
        WindowFrameBound::unbounded_following(),
    )
}

#[test]
fn test_lag_and_lead_default_offset() {
    let query = sales_query()
        .call(WindowFunctionCall::new(
            "prev",
            WindowFunction::Lag,
            vec![col("amount")],
            by_dept_amount(),
        ))
        .call(WindowFunctionCall::new(
            "next",
            WindowFunction::Lead,
            vec![col("amount")],
            by_dept_amount(),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "prev", vals![200, null, null, 300, 200, 100, null]);
    assert_column_eq(&result, "next", vals![300, 500, 200, null, null, 300, null]);
}

#[test]
fn test_lag_with_offset_and_default() {
    let query = sales_query().call(WindowFunctionCall::new(
        "prev2",
        WindowFunction::Lag,
        vec![col("amount"), lit(2), lit(0)],
        by_dept_amount(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "prev2", vals![100, 0, 0, 200, 0, 0, 0]);
}

#[test]
fn test_default_reads_current_row() {
    let query = sales_query().call(WindowFunctionCall::new(
        "prev_name",
        WindowFunction::Lag,
        vec![col("name"), lit(1), col("name")],
        by_dept_amount(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "prev_name",
        vals!["fay", "bob", "cat", "ann", "bob", "cat", "gus"],
    );
}

#[test]
fn test_zero_offset_is_current_row() {
    let query = sales_query().call(WindowFunctionCall::new(
        "same",
        WindowFunction::Lead,
        vec![col("amount"), lit(0)],
        by_dept_amount(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "same", vals![300, 200, 100, 300, 500, 200, null]);
}

#[test]
fn test_offset_past_partition_end() {
    let query = sales_query().call(WindowFunctionCall::new(
        "far",
        WindowFunction::Lead,
        vec![col("amount"), lit(10), lit(-1)],
        by_dept_amount(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(&result, "far", vals![-1, -1, -1, -1, -1, -1, -1]);
}

#[test]
fn test_first_and_last_value_default_frame() {
    let query = sales_query()
        .call(WindowFunctionCall::new(
            "first",
            WindowFunction::FirstValue,
            vec![col("name")],
            by_dept_amount(),
        ))
        .call(WindowFunctionCall::new(
            "last",
            WindowFunction::LastValue,
            vec![col("name")],
            by_dept_amount(),
        ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "first",
        vals!["cat", "bob", "cat", "cat", "bob", "cat", "gus"],
    );
    // Default frame ends at the last peer, so ann sees dan.
    assert_column_eq(
        &result,
        "last",
        vals!["dan", "bob", "cat", "dan", "eve", "fay", "gus"],
    );
}

#[test]
fn test_last_value_over_whole_partition() {
    let query = sales_query().call(WindowFunctionCall::new(
        "last",
        WindowFunction::LastValue,
        vec![col("name")],
        by_dept_amount().frame(whole_partition()),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "last",
        vals!["dan", "eve", "dan", "dan", "eve", "dan", "gus"],
    );
}

#[test]
fn test_nth_value() {
    let query = sales_query().call(WindowFunctionCall::new(
        "second",
        WindowFunction::NthValue,
        vec![col("name"), lit(2)],
        by_dept_amount().frame(whole_partition()),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "second",
        vals!["fay", "eve", "fay", "fay", "eve", "fay", null],
    );
}

#[test]
fn test_nth_value_beyond_running_frame() {
    let query = sales_query().call(WindowFunctionCall::new(
        "second",
        WindowFunction::NthValue,
        vec![col("name"), lit(2)],
        by_dept_amount(),
    ));

    let result = create_engine().execute(&query).unwrap();

    assert_column_eq(
        &result,
        "second",
        vals!["fay", null, null, "fay", "eve", "fay", null],
    );
}
