//! Resolution of fully-qualified headers into (path, field) pairs.

use crate::error::{ProcessorError, ProcessorResult};

use super::{PATH_SEPARATOR, TAGS_COLUMN};

/// One data column split on its last path separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedColumn {
    pub path: String,
    pub field: String,
}

impl QualifiedColumn {
    /// True if this column carries tags rather than a numeric value.
    pub fn is_tags(&self) -> bool {
        self.field == TAGS_COLUMN
    }
}

/// Mapping from data column to (path, field), aligned with header columns `1..N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<QualifiedColumn>,
}

impl ColumnMapping {
    /// Column for header index `header_idx` (`>= 1`).
    pub fn column(&self, header_idx: usize) -> Option<&QualifiedColumn> {
        header_idx.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Data columns in header order.
    pub fn columns(&self) -> &[QualifiedColumn] {
        &self.columns
    }

    /// Path of every data column, in header order.
    pub fn paths(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.path.as_str()).collect()
    }

    /// Field name of every data column, in header order.
    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }
}

/// Resolve every header after the timestamp column.
///
/// `local.portfolio.usd_balance` resolves to path `local.portfolio` and field `usd_balance`.
/// A header without a separator fails the whole resolution.
pub fn resolve_columns(headers: &[String]) -> ProcessorResult<ColumnMapping> {
    let columns = headers
        .iter()
        .skip(1)
        .map(|header| match header.rsplit_once(PATH_SEPARATOR) {
            Some((path, field)) => Ok(QualifiedColumn {
                path: path.to_owned(),
                field: field.to_owned(),
            }),
            None => Err(ProcessorError::UnqualifiedHeader {
                header: header.clone(),
            }),
        })
        .collect::<ProcessorResult<Vec<_>>>()?;

    Ok(ColumnMapping { columns })
}
