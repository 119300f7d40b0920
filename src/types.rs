//! Core data model types produced by extraction.
//!
//! Flat extraction yields a chronological list of [`Observation`]s. Grouped extraction yields one
//! [`State`] per entity path, each carrying its field-name schema, tag vocabulary and observations.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single point-in-time observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Unix seconds.
    pub time: i64,
    /// Numeric values keyed by field name. Fields missing from the source row are absent.
    pub data: BTreeMap<String, f64>,
    /// Free-text tags attached to the row, in source order.
    pub tags: Vec<String>,
}

impl Observation {
    /// Create a new observation.
    pub fn new(time: i64, data: BTreeMap<String, f64>, tags: Vec<String>) -> Self {
        Self { time, data, tags }
    }
}

/// Per-entity time-series produced by grouped extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    path: String,
    field_names: Vec<String>,
    tags: Vec<String>,
    observations: Vec<Observation>,
}

impl State {
    /// Create a new state.
    ///
    /// `tags` is stored as given; grouped extraction passes a sorted, deduplicated list.
    pub fn new(
        path: impl Into<String>,
        field_names: Vec<String>,
        tags: Vec<String>,
        observations: Vec<Observation>,
    ) -> Self {
        Self {
            path: path.into(),
            field_names,
            tags,
            observations,
        }
    }

    /// Entity path (e.g. `coinbase.btcusd`).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Field-name schema, in first-seen column order. Never contains the tag marker.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Union of all tags seen for this path, sorted and deduplicated.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Observations in source row order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Consume the state, returning its observations.
    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }
}

/// A recovered row-level fault.
///
/// `row` is the 1-based line number within the payload; the header is line 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub row: usize,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// The timestamp column could not be parsed; the whole row was skipped.
    InvalidTime {
        raw_record: Vec<String>,
        message: String,
    },
    /// A numeric cell could not be parsed; only that cell was skipped.
    InvalidField {
        column: String,
        raw: String,
        message: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::InvalidTime {
                raw_record,
                message,
            } => write!(
                f,
                "ignoring invalid line {} - {:?}: {}",
                self.row, raw_record, message
            ),
            DiagnosticKind::InvalidField {
                column,
                raw,
                message,
            } => write!(
                f,
                "ignoring invalid field at line {} column '{}' (raw='{}'): {}",
                self.row, column, raw, message
            ),
        }
    }
}

/// Output of an extraction call together with the row faults that were recovered from.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub output: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Extraction<T> {
    /// Create an extraction result.
    pub fn new(output: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            output,
            diagnostics,
        }
    }

    /// Discard diagnostics and return the output.
    pub fn into_output(self) -> T {
        self.output
    }

    /// True if no row faults were recorded.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
