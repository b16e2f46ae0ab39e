// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample() -> TableFrame {
    TableFrame::new(
        vec!["product".to_string(), "state".to_string()],
        vec![
            vec!["raw_events".to_string(), "fresh".to_string()],
            vec!["jobs".to_string(), "stale".to_string()],
        ],
    )
}

#[test]
fn parse_falls_back_to_psql_for_unknown_names() {
    assert_eq!(TableFormat::parse("nonsense"), TableFormat::Psql);
    assert_eq!(TableFormat::parse("vertical"), TableFormat::Vertical);
    assert_eq!(TableFormat::parse("column-names"), TableFormat::ColumnNames);
    assert_eq!(TableFormat::parse("json"), TableFormat::Json);
    assert_eq!(TableFormat::parse("csv"), TableFormat::Csv);
}

#[test]
fn psql_render_contains_all_cell_values() {
    let rendered = sample().render(TableFormat::Psql);
    assert!(rendered.contains("raw_events"));
    assert!(rendered.contains("stale"));
}

#[test]
fn vertical_render_pairs_column_with_value() {
    let rendered = sample().render(TableFormat::Vertical);
    assert!(rendered.contains("product: raw_events"));
    assert!(rendered.contains("state: stale"));
}

#[test]
fn column_names_render_lists_only_headers() {
    let rendered = sample().render(TableFormat::ColumnNames);
    assert_eq!(rendered, "product\nstate");
}

#[test]
fn json_render_is_valid_array_of_objects() {
    let rendered = sample().render(TableFormat::Json);
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array[0]["product"], "raw_events");
}

#[test]
fn csv_render_has_header_and_one_line_per_row() {
    let rendered = sample().render(TableFormat::Csv);
    let mut lines = rendered.lines();
    assert_eq!(lines.next(), Some("product,state"));
    assert_eq!(lines.next(), Some("raw_events,fresh"));
    assert_eq!(lines.next(), Some("jobs,stale"));
}
