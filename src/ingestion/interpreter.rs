//! Fault-tolerant row interpretation shared by flat and grouped extraction.
//!
//! Each data row becomes a [`ParsedRow`]: its timestamp plus the cells that parsed. Bad rows and
//! bad cells are skipped and reported as [`Diagnostic`]s; they never fail the batch.

use tracing::warn;

use crate::types::{Diagnostic, DiagnosticKind, Extraction};

use super::reader::Table;
use super::time::TimeParser;

/// How a header column is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Time,
    Value,
    Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Tags(Vec<String>),
}

/// A successfully parsed cell. `column` is the header index.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCell {
    pub column: usize,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// 1-based line number in the payload.
    pub row: usize,
    /// Unix seconds.
    pub time: i64,
    pub cells: Vec<ParsedCell>,
}

/// Interpret every data row of `table`.
///
/// `roles` is aligned with `table.headers`; column 0 is always treated as the timestamp.
pub fn interpret_rows(
    table: &Table,
    roles: &[ColumnRole],
    time_parser: &TimeParser,
) -> Extraction<Vec<ParsedRow>> {
    let mut rows = Vec::with_capacity(table.rows.len());
    let mut diagnostics = Vec::new();

    for (row_idx0, record) in table.rows.iter().enumerate() {
        // +1 for 1-based numbering, +1 again because the header is line 1.
        let row = row_idx0 + 2;

        let raw_time = record.first().map(String::as_str).unwrap_or("");
        let time = match time_parser.parse(raw_time) {
            Ok(time) => time,
            Err(e) => {
                warn!(row, record = ?record, error = %e, "ignoring invalid line");
                diagnostics.push(Diagnostic {
                    row,
                    kind: DiagnosticKind::InvalidTime {
                        raw_record: record.clone(),
                        message: e.to_string(),
                    },
                });
                continue;
            }
        };

        let mut cells = Vec::with_capacity(record.len().saturating_sub(1));
        for (col, raw) in record.iter().enumerate().skip(1) {
            if raw.is_empty() {
                continue;
            }

            match roles.get(col).copied().unwrap_or(ColumnRole::Value) {
                ColumnRole::Time => continue,
                ColumnRole::Tags => cells.push(ParsedCell {
                    column: col,
                    value: CellValue::Tags(raw.split_whitespace().map(str::to_owned).collect()),
                }),
                ColumnRole::Value => match raw.parse::<f64>() {
                    Ok(v) => cells.push(ParsedCell {
                        column: col,
                        value: CellValue::Number(v),
                    }),
                    Err(e) => {
                        let column = table.headers.get(col).cloned().unwrap_or_default();
                        warn!(
                            row,
                            column = %column,
                            raw = %raw,
                            error = %e,
                            "ignoring invalid field"
                        );
                        diagnostics.push(Diagnostic {
                            row,
                            kind: DiagnosticKind::InvalidField {
                                column,
                                raw: raw.clone(),
                                message: e.to_string(),
                            },
                        });
                    }
                },
            }
        }

        rows.push(ParsedRow { row, time, cells });
    }

    Extraction::new(rows, diagnostics)
}
