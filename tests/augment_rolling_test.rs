use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rollfeat::augment::{WindowArg, WindowOutput};
use rollfeat::{
    augment_rolling, AugmentRollingExt, DataFrame, Error, GroupByExt, RollingSpec, Series, Value,
    WindowClosed, WindowFunc,
};

// Helper function for building daily dates
fn day(d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
}

fn floats(values: &[f64]) -> Vec<Value> {
    values.iter().map(|&v| Value::Float(v)).collect()
}

fn column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.get_column_as_f64(name).unwrap()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("expected a value, found missing");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// One series of 6 daily observations
fn single_series() -> DataFrame {
    DataFrame::from_columns(vec![
        ("date", (1..=6).map(day).collect::<Vec<_>>()),
        ("value", floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
    ])
    .unwrap()
}

/// Two groups whose rows interleave and arrive out of time order
fn panel() -> DataFrame {
    DataFrame::from_columns(vec![
        (
            "id",
            vec!["a", "b", "a", "b", "a", "b", "a", "b"]
                .into_iter()
                .map(Value::from)
                .collect::<Vec<_>>(),
        ),
        (
            "date",
            vec![day(2), day(1), day(1), day(3), day(4), day(2), day(3), day(4)],
        ),
        (
            "value",
            floats(&[2.0, 10.0, 1.0, 30.0, 4.0, 20.0, 3.0, 40.0]),
        ),
    ])
    .unwrap()
}

#[test]
fn test_row_count_and_index_preserved() {
    let df = panel();
    let grouped = df.group_by(&["id"]).unwrap();
    let spec = RollingSpec::new("date", "value")
        .window((1, 3))
        .window_func(vec!["mean", "sum"]);
    let out = augment_rolling(&grouped, &spec).unwrap();

    assert_eq!(out.row_count(), df.row_count());
    assert_eq!(out.index(), df.index());

    // Input columns untouched, derived columns appended in plan order
    assert_eq!(
        out.column_names(),
        vec![
            "id",
            "date",
            "value",
            "value_rolling_mean_win_1",
            "value_rolling_sum_win_1",
            "value_rolling_mean_win_2",
            "value_rolling_sum_win_2",
            "value_rolling_mean_win_3",
            "value_rolling_sum_win_3",
        ]
    );
    for name in ["id", "date", "value"] {
        assert_eq!(
            out.get_column(name).unwrap().values(),
            df.get_column(name).unwrap().values()
        );
    }
}

#[test]
fn test_leading_rows_missing_then_full_window() {
    let df = single_series();
    for w in 1..=4usize {
        let spec = RollingSpec::new("date", "value")
            .window(w)
            .window_func("sum");
        let out = augment_rolling(&df, &spec).unwrap();
        let result = column(&out, &format!("value_rolling_sum_win_{}", w));

        for row in result.iter().take(w - 1) {
            assert!(row.is_none());
        }
        let expected: f64 = (1..=w).map(|v| v as f64).sum();
        assert_close(result[w - 1], expected);
    }
}

#[test]
fn test_mean_of_constant_window() {
    let df = DataFrame::from_columns(vec![
        ("date", (1..=5).map(day).collect::<Vec<_>>()),
        ("value", floats(&[7.5; 5])),
    ])
    .unwrap();
    let out = augment_rolling(&df, &RollingSpec::new("date", "value").window(3)).unwrap();
    let result = column(&out, "value_rolling_mean_win_3");
    assert_eq!(result, vec![None, None, Some(7.5), Some(7.5), Some(7.5)]);
}

#[test]
fn test_custom_callable_sees_full_windows() {
    let df = single_series();
    let spec = RollingSpec::new("date", "value")
        .window(4)
        .window_func(WindowFunc::custom("len", |v| v.len() as f64));
    let out = augment_rolling(&df, &spec).unwrap();
    assert_eq!(
        column(&out, "value_rolling_len_win_4"),
        vec![None, None, None, Some(4.0), Some(4.0), Some(4.0)]
    );
}

#[test]
fn test_builtin_and_custom_share_min_periods() {
    let df = single_series();
    let spec = RollingSpec::new("date", "value")
        .window(3)
        .window_func(vec![
            WindowFunc::builtin("count"),
            WindowFunc::custom("len", |v| v.len() as f64),
        ]);

    let full = augment_rolling(&df, &spec).unwrap();
    assert_eq!(
        column(&full, "value_rolling_count_win_3"),
        column(&full, "value_rolling_len_win_3")
    );

    let partial = augment_rolling(&df, &spec.clone().min_periods(1)).unwrap();
    let expected = vec![Some(1.0), Some(2.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0)];
    assert_eq!(column(&partial, "value_rolling_count_win_3"), expected);
    assert_eq!(column(&partial, "value_rolling_len_win_3"), expected);
}

#[test]
fn test_centered_window() {
    let df = single_series();
    let spec = RollingSpec::new("date", "value")
        .window(3)
        .window_func("sum")
        .center(true);
    let out = augment_rolling(&df, &spec).unwrap();
    let result = column(&out, "value_rolling_sum_win_3");

    assert!(result[0].is_none());
    for i in 1..5 {
        // rows i-1, i, i+1 hold the values i, i+1, i+2
        assert_close(result[i], (3 * i + 3) as f64);
    }
    assert!(result[5].is_none());
}

#[test]
fn test_closed_left_uses_previous_rows() {
    let df = single_series();
    let spec = RollingSpec::new("date", "value")
        .window(2)
        .window_func("sum")
        .closed(WindowClosed::Left);
    let out = augment_rolling(&df, &spec).unwrap();
    assert_eq!(
        column(&out, "value_rolling_sum_win_2"),
        vec![None, None, Some(3.0), Some(5.0), Some(7.0), Some(9.0)]
    );
}

#[test]
fn test_groups_are_independent_and_order_restored() {
    let df = panel();
    let grouped = df.group_by(&["id"]).unwrap();
    let spec = RollingSpec::new("date", "value")
        .window(2)
        .window_func("sum");
    let out = grouped.augment_rolling(&spec).unwrap();

    // a: days 1..4 -> 1, 2, 3, 4; b: days 1..4 -> 10, 20, 30, 40
    // rows: a@2, b@1, a@1, b@3, a@4, b@2, a@3, b@4
    assert_eq!(
        column(&out, "value_rolling_sum_win_2"),
        vec![
            Some(3.0),
            None,
            None,
            Some(50.0),
            Some(7.0),
            Some(30.0),
            Some(5.0),
            Some(70.0),
        ]
    );
}

#[test]
fn test_ungrouped_sorts_by_time() {
    let df = DataFrame::from_columns(vec![
        ("date", vec![day(3), day(1), day(2)]),
        ("value", floats(&[3.0, 1.0, 2.0])),
    ])
    .unwrap();
    let out = augment_rolling(&df, &RollingSpec::new("date", "value").window_func("first")).unwrap();
    assert_eq!(
        column(&out, "value_rolling_first_win_2"),
        vec![Some(2.0), None, Some(1.0)]
    );
}

#[test]
fn test_short_group_is_all_missing() {
    let df = DataFrame::from_columns(vec![
        ("id", vec![Value::Int(1), Value::Int(1), Value::Int(1), Value::Int(2)]),
        ("date", vec![day(1), day(2), day(3), day(1)]),
        ("value", floats(&[1.0, 2.0, 3.0, 9.0])),
    ])
    .unwrap();
    let out = augment_rolling(
        &df.group_by(&["id"]).unwrap(),
        &RollingSpec::new("date", "value").window(3).window_func("max"),
    )
    .unwrap();
    assert_eq!(
        column(&out, "value_rolling_max_win_3"),
        vec![None, None, Some(3.0), None]
    );
}

#[test]
fn test_missing_values_keep_window_missing() {
    let df = DataFrame::from_columns(vec![
        ("date", (1..=4).map(day).collect::<Vec<_>>()),
        (
            "value",
            vec![Value::Float(1.0), Value::Null, Value::Float(3.0), Value::Float(4.0)],
        ),
    ])
    .unwrap();
    let out = augment_rolling(&df, &RollingSpec::new("date", "value").window_func("sum")).unwrap();
    assert_eq!(
        column(&out, "value_rolling_sum_win_2"),
        vec![None, None, None, Some(7.0)]
    );
}

#[test]
fn test_custom_callable_receives_present_values_only() {
    let df = DataFrame::from_columns(vec![
        ("date", (1..=5).map(day).collect::<Vec<_>>()),
        (
            "value",
            vec![
                Value::Float(1.0),
                Value::Float(2.0),
                Value::Null,
                Value::Float(4.0),
                Value::Float(5.0),
            ],
        ),
    ])
    .unwrap();
    let spec = RollingSpec::new("date", "value")
        .window(3)
        .min_periods(2)
        .window_func(WindowFunc::custom("len", |v| v.len() as f64));
    let out = augment_rolling(&df, &spec).unwrap();

    // windows holding the null hand over two values, not three
    assert_eq!(
        column(&out, "value_rolling_len_win_3"),
        vec![None, Some(2.0), Some(2.0), Some(2.0), Some(2.0)]
    );
}

#[test]
fn test_repeated_function_names_collapse() {
    let df = single_series();
    let range = WindowFunc::custom("range", |v| v[v.len() - 1] - v[0]);
    let spec = RollingSpec::new("date", "value")
        .window(2)
        .window_func(vec![
            WindowFunc::builtin("mean"),
            range.clone(),
            WindowFunc::builtin("mean"),
            range,
        ]);
    let out = augment_rolling(&df, &spec).unwrap();
    assert_eq!(
        out.column_names()[2..],
        ["value_rolling_mean_win_2", "value_rolling_range_win_2"]
    );

    let clash = RollingSpec::new("date", "value").window_func(vec![
        WindowFunc::custom("f", |v| v[0]),
        WindowFunc::custom("f", |v| v[v.len() - 1]),
    ]);
    assert!(matches!(
        augment_rolling(&df, &clash),
        Err(Error::InvalidFunctionSpec(_))
    ));
}

#[test]
fn test_multiple_value_columns() {
    let df = DataFrame::from_columns(vec![
        ("date", (1..=3).map(day).collect::<Vec<_>>()),
        ("a", floats(&[1.0, 2.0, 3.0])),
        ("b", vec![Value::Int(10), Value::Int(20), Value::Int(30)]),
    ])
    .unwrap();
    let spec = RollingSpec::new("date", vec!["a", "b"]).window_func("max");
    let out = augment_rolling(&df, &spec).unwrap();
    assert_eq!(column(&out, "a_rolling_max_win_2"), vec![None, Some(2.0), Some(3.0)]);
    assert_eq!(column(&out, "b_rolling_max_win_2"), vec![None, Some(20.0), Some(30.0)]);
}

#[test]
fn test_repeated_window_lengths_collapse() {
    let df = single_series();
    let spec = RollingSpec::new("date", "value").window(vec![3, 2, 3]);
    let out = augment_rolling(&df, &spec).unwrap();
    assert_eq!(
        out.column_names()[2..],
        ["value_rolling_mean_win_3", "value_rolling_mean_win_2"]
    );
}

/// Least-squares fit of `value` on the auxiliary column named `x`
fn ols(window: &DataFrame, value: &str, aux: &[String]) -> Result<WindowOutput, rollfeat::BoxError> {
    let x_name = aux
        .iter()
        .find(|name| name.as_str() == "x")
        .ok_or("no x column")?;
    let y: Vec<f64> = window.get_column_as_f64(value)?.into_iter().flatten().collect();
    let x: Vec<f64> = window.get_column_as_f64(x_name)?.into_iter().flatten().collect();

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let cov: f64 = x.iter().zip(&y).map(|(a, b)| (a - mean_x) * (b - mean_y)).sum();
    let var: f64 = x.iter().map(|a| (a - mean_x).powi(2)).sum();
    let slope = cov / var;

    Ok(WindowOutput::Named(vec![
        ("intercept".to_string(), mean_y - slope * mean_x),
        ("slope".to_string(), slope),
    ]))
}

fn regression_panel() -> DataFrame {
    // value = 2 + 3x for group 1 and 1 - x for group 2
    let x = [1.0, 4.0, 2.0, 3.0, 5.0, 0.0, 1.0, 2.0, 7.0];
    let id = [1, 1, 1, 1, 1, 2, 2, 2, 2];
    let value: Vec<f64> = x
        .iter()
        .zip(id.iter())
        .map(|(&x, &g)| if g == 1 { 2.0 + 3.0 * x } else { 1.0 - x })
        .collect();
    DataFrame::from_columns(vec![
        ("id", id.iter().map(|&g| Value::Int(g)).collect::<Vec<_>>()),
        (
            "date",
            vec![day(1), day(2), day(3), day(4), day(5), day(4), day(3), day(2), day(1)],
        ),
        ("x", floats(&x)),
        ("z", floats(&[9.0; 9])),
        ("value", floats(&value)),
    ])
    .unwrap()
}

#[test]
fn test_multivariate_named_outputs() {
    let df = regression_panel();
    let grouped = df.group_by(&["id"]).unwrap();

    for aux in [vec!["x", "z"], vec!["z", "x"]] {
        let spec = RollingSpec::new("date", "value")
            .independent_columns(aux)
            .window(3)
            .window_func(WindowFunc::frame("ols", ols));
        let out = augment_rolling(&grouped, &spec).unwrap();

        let names = out.column_names();
        assert_eq!(
            names[5..],
            [
                "value_rolling_ols_win_3_intercept",
                "value_rolling_ols_win_3_slope"
            ]
        );

        let intercept = column(&out, "value_rolling_ols_win_3_intercept");
        let slope = column(&out, "value_rolling_ols_win_3_slope");

        // group 1 in time order: rows 0..=4, first full window ends at row 2
        for row in [0, 1] {
            assert!(intercept[row].is_none() && slope[row].is_none());
        }
        for row in [2, 3, 4] {
            assert_close(intercept[row], 2.0);
            assert_close(slope[row], 3.0);
        }

        // group 2 in time order: rows 8, 7, 6, 5
        for row in [8, 7] {
            assert!(intercept[row].is_none() && slope[row].is_none());
        }
        for row in [6, 5] {
            assert_close(intercept[row], 1.0);
            assert_close(slope[row], -1.0);
        }
    }
}

#[test]
fn test_multivariate_scalar_output_and_short_partition() {
    let df = DataFrame::from_columns(vec![
        ("id", vec![Value::Int(1), Value::Int(1), Value::Int(1), Value::Int(2)]),
        ("date", vec![day(1), day(2), day(3), day(1)]),
        ("value", floats(&[1.0, 2.0, 3.0, 4.0])),
    ])
    .unwrap();
    let spec = RollingSpec::new("date", "value")
        .window(2)
        .window_func(WindowFunc::frame("rows", |window, _, _| {
            Ok(WindowOutput::Scalar(window.row_count() as f64))
        }));
    let out = augment_rolling(&df.group_by(&["id"]).unwrap(), &spec).unwrap();
    assert_eq!(
        column(&out, "value_rolling_rows_win_2"),
        vec![None, Some(2.0), Some(2.0), None]
    );
}

#[test]
fn test_multivariate_shape_change_is_failure() {
    let df = single_series();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let spec = RollingSpec::new("date", "value")
        .window(2)
        .window_func(WindowFunc::frame("flaky", move |_, _, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(WindowOutput::Scalar(1.0))
            } else {
                Ok(WindowOutput::Named(vec![("a".to_string(), 1.0)]))
            }
        }));
    assert!(matches!(
        augment_rolling(&df, &spec),
        Err(Error::AggregationFailure { window: 2, .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_multivariate_repeated_output_name_is_failure() {
    let spec = RollingSpec::new("date", "value")
        .window(2)
        .window_func(WindowFunc::frame("pair", |_, _, _| {
            Ok(WindowOutput::Named(vec![
                ("a".to_string(), 1.0),
                ("a".to_string(), 2.0),
            ]))
        }));
    match augment_rolling(&single_series(), &spec) {
        Err(Error::AggregationFailure {
            column,
            window,
            group,
            source,
        }) => {
            assert_eq!(column, "value");
            assert_eq!(window, 2);
            assert_eq!(group, "<all>");
            assert!(source.to_string().contains("'a'"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_multivariate_callable_failure_carries_context() {
    let df = regression_panel();
    let spec = RollingSpec::new("date", "value")
        .independent_columns("x")
        .window(3)
        .window_func(WindowFunc::frame("fit", |window, value, _| {
            let y: Vec<f64> = window.get_column_as_f64(value)?.into_iter().flatten().collect();
            if y.iter().any(|&v| v < 0.0) {
                return Err("negative target".into());
            }
            Ok(WindowOutput::Scalar(y.iter().sum()))
        }));

    let err = augment_rolling(&df.group_by(&["id"]).unwrap(), &spec).unwrap_err();
    match &err {
        Error::AggregationFailure {
            column,
            window,
            group,
            source,
        } => {
            assert_eq!(column, "value");
            assert_eq!(*window, 3);
            assert_eq!(group, "(2)");
            assert_eq!(source.to_string(), "negative target");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unknown_aggregation() {
    let spec = RollingSpec::new("date", "value").window_func(vec!["mean", "average"]);
    assert!(matches!(
        augment_rolling(&single_series(), &spec),
        Err(Error::UnknownAggregation(name)) if name == "average"
    ));
}

#[test]
fn test_callable_failure_carries_context() {
    let df = panel();
    let spec = RollingSpec::new("date", "value")
        .window(2)
        .window_func(WindowFunc::try_custom("guarded", |v| {
            if v.iter().any(|&x| x > 25.0) {
                Err("value out of range".into())
            } else {
                Ok(v[0])
            }
        }));

    let err = augment_rolling(&df.group_by(&["id"]).unwrap(), &spec).unwrap_err();
    match &err {
        Error::AggregationFailure {
            column,
            window,
            group,
            source,
        } => {
            assert_eq!(column, "value");
            assert_eq!(*window, 2);
            assert_eq!(group, "(b)");
            assert_eq!(source.to_string(), "value out of range");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("group (b)"));
}

#[test]
fn test_invalid_specs() {
    let df = single_series();

    let bad_window = RollingSpec::new("date", "value").window(WindowArg::Range { from: 4, to: 2 });
    assert!(matches!(
        augment_rolling(&df, &bad_window),
        Err(Error::InvalidWindowSpec(_))
    ));

    let bad_func = RollingSpec::new("date", "value").window_func(Vec::<WindowFunc>::new());
    assert!(matches!(
        augment_rolling(&df, &bad_func),
        Err(Error::InvalidFunctionSpec(_))
    ));

    let no_date = RollingSpec::new("ts", "value");
    assert!(matches!(
        augment_rolling(&df, &no_date),
        Err(Error::MissingColumn(name)) if name == "ts"
    ));

    let no_value = RollingSpec::new("date", "price");
    assert!(matches!(
        augment_rolling(&df, &no_value),
        Err(Error::MissingColumn(name)) if name == "price"
    ));

    let no_aux = RollingSpec::new("date", "value").independent_columns("x");
    assert!(matches!(
        augment_rolling(&df, &no_aux),
        Err(Error::MissingColumn(name)) if name == "x"
    ));
}

#[test]
fn test_non_numeric_value_column() {
    let mut df = single_series();
    df.add_column(
        "label".to_string(),
        Series::new((0..6).map(|i| Value::from(format!("l{}", i))).collect(), None).unwrap(),
    )
    .unwrap();
    assert!(matches!(
        augment_rolling(&df, &RollingSpec::new("date", "label")),
        Err(Error::Type(_))
    ));
}

#[test]
fn test_null_group_key_forms_own_group() {
    let df = DataFrame::from_columns(vec![
        ("id", vec![Value::Null, Value::Int(1), Value::Null, Value::Int(1)]),
        ("date", vec![day(1), day(1), day(2), day(2)]),
        ("value", floats(&[1.0, 10.0, 2.0, 20.0])),
    ])
    .unwrap();
    let out = augment_rolling(
        &df.group_by(&["id"]).unwrap(),
        &RollingSpec::new("date", "value").window_func("sum"),
    )
    .unwrap();
    assert_eq!(
        column(&out, "value_rolling_sum_win_2"),
        vec![None, None, Some(3.0), Some(30.0)]
    );
}
