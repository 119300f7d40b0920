//! Timestamp parsing for the leading `time` column.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::error::{ProcessorError, ProcessorResult};

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unable to parse time '{raw}': {message}")]
pub struct TimeParseError {
    pub raw: String,
    pub message: String,
}

/// Converts timestamp strings into Unix seconds.
///
/// Without a custom format, accepts (in order): integer Unix seconds, fractional Unix seconds
/// (truncated), RFC 3339, then naive `YYYY-MM-DD[T ]HH:MM:SS` and `YYYY-MM-DD` read as UTC.
///
/// A custom format uses strftime syntax (e.g. `%Y-%m-%d %H:%M:%S%:z`). Values without an offset
/// are read as UTC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeParser {
    format: Option<String>,
}

impl TimeParser {
    pub fn new(format: Option<String>) -> Self {
        Self { format }
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn parse(&self, raw: &str) -> Result<i64, TimeParseError> {
        let trimmed = raw.trim();
        let parsed = match self.format.as_deref() {
            Some(format) => parse_with_format(trimmed, format),
            None => parse_default(trimmed),
        };

        parsed.ok_or_else(|| TimeParseError {
            raw: raw.to_owned(),
            message: match self.format.as_deref() {
                Some(format) => format!("does not match format '{format}'"),
                None => "expected unix seconds, RFC 3339 or YYYY-MM-DD[ HH:MM:SS]".to_string(),
            },
        })
    }
}

/// Reject format strings chrono cannot interpret.
pub fn validate_format(format: &str) -> ProcessorResult<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ProcessorError::InvalidTimeFormat {
            format: format.to_owned(),
            message: "unrecognized format specifier".to_string(),
        });
    }
    Ok(())
}

fn parse_with_format(s: &str, format: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_str(s, format) {
        return Some(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
        return Some(Utc.from_utc_datetime(&naive).timestamp());
    }
    NaiveDate::parse_from_str(s, format)
        .ok()
        .and_then(midnight_utc)
}

fn parse_default(s: &str) -> Option<i64> {
    if let Ok(secs) = s.parse::<i64>() {
        return Some(secs);
    }
    if let Ok(secs) = s.parse::<f64>() {
        if secs.is_finite() {
            return Some(secs.trunc() as i64);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive).timestamp());
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp())
}
