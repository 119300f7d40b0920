//! Stateless extraction entrypoints and processor configuration.
//!
//! [`extract_observations`] and [`extract_state`] take a payload and return shaped output; they
//! retain nothing between calls. [`super::processor::CsvProcessor`] wraps them with change
//! detection and single-shot consumption.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ProcessorResult;
use crate::types::{Extraction, Observation, State};

use super::header::resolve_columns;
use super::interpreter::interpret_rows;
use super::observability::{ProcessorObserver, Severity};
use super::observations::{assemble_observations, flat_roles};
use super::reader::read_table;
use super::state::{check_allowed_fields, partition_states, state_roles};
use super::time::{validate_format, TimeParser};
use super::TIME_FORMAT_PARAM;

/// Options controlling extraction behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ProcessorOptions {
    /// Custom strftime-style format for the `time` column. `None` uses the default parsers.
    pub time_format: Option<String>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ProcessorObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for ProcessorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorOptions")
            .field("time_format", &self.time_format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            time_format: None,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl ProcessorOptions {
    /// Build options from a string parameter map.
    ///
    /// Only `time_format` is recognized; other keys are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> ProcessorResult<Self> {
        let mut opts = Self::default();
        opts.apply_params(params)?;
        Ok(opts)
    }

    /// Apply a string parameter map on top of the current options.
    pub fn apply_params(&mut self, params: &HashMap<String, String>) -> ProcessorResult<()> {
        if let Some(format) = params.get(TIME_FORMAT_PARAM) {
            validate_format(format)?;
            self.time_format = Some(format.clone());
        }
        Ok(())
    }

    pub(crate) fn time_parser(&self) -> TimeParser {
        TimeParser::new(self.time_format.clone())
    }
}

/// Convert a payload into a flat, chronological list of observations.
///
/// Headers are used as field names verbatim; a column named `_tags` holds space-separated tags.
/// Rows with an unparsable timestamp and cells with an unparsable number are skipped and
/// reported in [`Extraction::diagnostics`].
///
/// # Example
///
/// ```rust
/// use csv_timeseries::ingestion::{extract_observations, ProcessorOptions};
///
/// # fn main() -> Result<(), csv_timeseries::ProcessorError> {
/// let csv = b"time,open,close\n2020-11-14T00:00:00Z,16339.56,16254.51\n";
/// let out = extract_observations(csv, &ProcessorOptions::default())?;
///
/// assert_eq!(out.output[0].time, 1605312000);
/// assert_eq!(out.output[0].data["close"], 16254.51);
/// # Ok(())
/// # }
/// ```
pub fn extract_observations(
    payload: &[u8],
    options: &ProcessorOptions,
) -> ProcessorResult<Extraction<Vec<Observation>>> {
    let table = read_table(payload)?;
    debug!(headers = ?table.headers, rows = table.rows.len(), "read csv headers");

    let parsed = interpret_rows(&table, &flat_roles(&table.headers), &options.time_parser());
    let observations = assemble_observations(&table.headers, parsed.output);

    Ok(Extraction::new(observations, parsed.diagnostics))
}

/// Convert a payload with fully-qualified headers into one [`State`] per entity path.
///
/// Each header after `time` is split on its last `.` into (path, field). If `valid_fields` is
/// given, every header must appear in it or the call fails before any row is parsed.
///
/// # Example
///
/// ```rust
/// use csv_timeseries::ingestion::{extract_state, ProcessorOptions};
///
/// # fn main() -> Result<(), csv_timeseries::ProcessorError> {
/// let csv = b"time,coinbase.btcusd.price,coinbase.btcusd._tags\n1626697480,31232.7,spike\n";
/// let out = extract_state(csv, None, &ProcessorOptions::default())?;
///
/// let state = &out.output[0];
/// assert_eq!(state.path(), "coinbase.btcusd");
/// assert_eq!(state.field_names(), ["price"]);
/// assert_eq!(state.tags(), ["spike"]);
/// # Ok(())
/// # }
/// ```
pub fn extract_state(
    payload: &[u8],
    valid_fields: Option<&[&str]>,
    options: &ProcessorOptions,
) -> ProcessorResult<Extraction<Vec<State>>> {
    let table = read_table(payload)?;

    if let Some(valid_fields) = valid_fields {
        check_allowed_fields(&table.headers, valid_fields)?;
    }

    let mapping = resolve_columns(&table.headers)?;
    debug!(headers = ?table.headers, rows = table.rows.len(), "read csv headers");

    let parsed = interpret_rows(&table, &state_roles(&mapping), &options.time_parser());
    let states = partition_states(&mapping, parsed.output);

    Ok(Extraction::new(states, parsed.diagnostics))
}
