//! Grouped extraction: partitioning rows into per-path [`State`]s.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::error::{ProcessorError, ProcessorResult};
use crate::types::{Observation, State};

use super::header::ColumnMapping;
use super::interpreter::{CellValue, ColumnRole, ParsedRow};

/// Fail with [`ProcessorError::UnknownField`] on the first data header missing from `valid_fields`.
pub fn check_allowed_fields(headers: &[String], valid_fields: &[&str]) -> ProcessorResult<()> {
    match headers
        .iter()
        .skip(1)
        .find(|h| !valid_fields.contains(&h.as_str()))
    {
        Some(field) => Err(ProcessorError::UnknownField {
            field: field.clone(),
        }),
        None => Ok(()),
    }
}

/// Column roles for grouped extraction: the tag marker is matched against the field-name part.
pub fn state_roles(mapping: &ColumnMapping) -> Vec<ColumnRole> {
    std::iter::once(ColumnRole::Time)
        .chain(mapping.columns().iter().map(|c| {
            if c.is_tags() {
                ColumnRole::Tags
            } else {
                ColumnRole::Value
            }
        }))
        .collect()
}

struct PathAccumulator {
    path: String,
    field_names: Vec<String>,
    tags: BTreeSet<String>,
    observations: Vec<Observation>,
}

/// Group parsed rows by entity path.
///
/// Every path named by a header gets a [`State`], even if no row contributed to it. A row adds an
/// observation to a path only when it parsed at least one numeric value for that path; tags are
/// folded into the path's vocabulary regardless. States are returned in first-seen column order.
pub fn partition_states(mapping: &ColumnMapping, rows: Vec<ParsedRow>) -> Vec<State> {
    let mut accumulators: Vec<PathAccumulator> = Vec::new();
    let mut slot_by_path: HashMap<&str, usize> = HashMap::new();
    let mut column_slots = Vec::with_capacity(mapping.columns().len());

    for column in mapping.columns() {
        let slot = *slot_by_path.entry(column.path.as_str()).or_insert_with(|| {
            accumulators.push(PathAccumulator {
                path: column.path.clone(),
                field_names: Vec::new(),
                tags: BTreeSet::new(),
                observations: Vec::new(),
            });
            accumulators.len() - 1
        });
        column_slots.push(slot);

        let fields = &mut accumulators[slot].field_names;
        if !column.is_tags() && !fields.contains(&column.field) {
            fields.push(column.field.clone());
        }
    }

    debug!(paths = accumulators.len(), columns = column_slots.len(), "partitioning rows by path");

    for row in rows {
        let mut row_data: Vec<Option<BTreeMap<String, f64>>> = vec![None; accumulators.len()];
        let mut row_tags: Vec<Option<Vec<String>>> = vec![None; accumulators.len()];

        for cell in row.cells {
            let Some(column) = mapping.column(cell.column) else {
                continue;
            };
            let slot = column_slots[cell.column - 1];

            match cell.value {
                CellValue::Tags(tags) => {
                    accumulators[slot].tags.extend(tags.iter().cloned());
                    row_tags[slot] = Some(tags);
                }
                CellValue::Number(v) => {
                    row_data[slot]
                        .get_or_insert_with(BTreeMap::new)
                        .insert(column.field.clone(), v);
                }
            }
        }

        for (slot, data) in row_data.into_iter().enumerate() {
            let tags = row_tags[slot].take();
            match data {
                Some(data) => accumulators[slot].observations.push(Observation::new(
                    row.time,
                    data,
                    tags.unwrap_or_default(),
                )),
                None if tags.is_some() => {
                    debug!(row = row.row, path = %accumulators[slot].path, "tags without values");
                }
                None => {}
            }
        }
    }

    accumulators
        .into_iter()
        .map(|acc| {
            State::new(
                acc.path,
                acc.field_names,
                acc.tags.into_iter().collect(),
                acc.observations,
            )
        })
        .collect()
}
