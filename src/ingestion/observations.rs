//! Flat observation extraction.

use std::collections::BTreeMap;

use crate::types::Observation;

use super::interpreter::{CellValue, ColumnRole, ParsedRow};
use super::TAGS_COLUMN;

/// Column roles for flat extraction: a header equal to the tag marker holds tags, every other
/// column is numeric. Headers are used as-is; no path splitting happens here.
pub fn flat_roles(headers: &[String]) -> Vec<ColumnRole> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, h)| match idx {
            0 => ColumnRole::Time,
            _ if h == TAGS_COLUMN => ColumnRole::Tags,
            _ => ColumnRole::Value,
        })
        .collect()
}

/// One observation per parsed row, in row order, keyed by the raw header names.
pub fn assemble_observations(headers: &[String], rows: Vec<ParsedRow>) -> Vec<Observation> {
    rows.into_iter()
        .map(|row| {
            let mut data = BTreeMap::new();
            let mut tags = Vec::new();

            for cell in row.cells {
                match cell.value {
                    CellValue::Tags(t) => tags = t,
                    CellValue::Number(v) => {
                        if let Some(name) = headers.get(cell.column) {
                            data.insert(name.clone(), v);
                        }
                    }
                }
            }

            Observation::new(row.time, data, tags)
        })
        .collect()
}
