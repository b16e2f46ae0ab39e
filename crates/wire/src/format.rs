// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tabular output formats shared by the RPCs that render tables
//! (`print_product`, `print_products`, `queue_status`, `query_tool`).

use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

/// How a table-shaped RPC result should be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableFormat {
    /// psql-style box-drawing table (the default).
    #[default]
    Psql,
    /// One column of `field: value` per row, blank line between rows.
    Vertical,
    /// Just the column names, one per line.
    ColumnNames,
    /// A JSON array of row objects.
    Json,
    /// RFC 4180 CSV.
    Csv,
}

impl TableFormat {
    /// Parse a format name as accepted by the `format?` RPC arguments.
    /// Unrecognized names fall back to [`TableFormat::Psql`].
    pub fn parse(name: &str) -> Self {
        match name {
            "vertical" => Self::Vertical,
            "column-names" | "column_names" => Self::ColumnNames,
            "json" => Self::Json,
            "csv" => Self::Csv,
            _ => Self::Psql,
        }
    }
}

/// A rectangular table of string cells with named columns, rendered in
/// whichever [`TableFormat`] the caller requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Render this frame in the given format.
    pub fn render(&self, format: TableFormat) -> String {
        match format {
            TableFormat::Psql => self.render_psql(),
            TableFormat::Vertical => self.render_vertical(),
            TableFormat::ColumnNames => self.columns.join("\n"),
            TableFormat::Json => self.render_json(),
            TableFormat::Csv => self.render_csv(),
        }
    }

    fn render_psql(&self) -> String {
        let mut table = Table::new();
        table.set_titles(Row::new(self.columns.iter().map(|c| Cell::new(c)).collect()));
        for row in &self.rows {
            table.add_row(Row::new(row.iter().map(|v| Cell::new(v)).collect()));
        }
        table.to_string()
    }

    fn render_vertical(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("-[ row {} ]-\n", i + 1));
            for (col, value) in self.columns.iter().zip(row.iter()) {
                out.push_str(&format!("{col}: {value}\n"));
            }
        }
        out
    }

    fn render_json(&self) -> String {
        let objects: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let map: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| serde_json::Value::String(v.clone())))
                    .collect();
                serde_json::Value::Object(map)
            })
            .collect();
        serde_json::to_string_pretty(&objects).unwrap_or_else(|_| "[]".to_string())
    }

    fn render_csv(&self) -> String {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.columns).ok();
        for row in &self.rows {
            writer.write_record(row).ok();
        }
        let bytes = writer.into_inner().unwrap_or_default();
        String::from_utf8(bytes).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
