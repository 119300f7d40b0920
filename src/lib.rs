//! `csv-timeseries` converts delimited timeseries payloads into the two shapes a monitoring host
//! consumes:
//!
//! - a flat, chronological list of [`types::Observation`]s, and
//! - one [`types::State`] per entity path, built from fully-qualified `path.field` headers, each
//!   carrying its field-name schema, a sorted tag vocabulary and its observations.
//!
//! ## Input format
//!
//! - UTF-8, comma-delimited, first line is the header.
//! - Column 0 must be named `time`. Values are Unix seconds, RFC 3339, or a custom format set via
//!   the `time_format` option.
//! - A column whose field name is `_tags` holds space-separated tags instead of a number.
//! - For grouped extraction every other header must be `<path>.<field>`, split on the last `.`.
//!
//! ## Fault tolerance
//!
//! Structural problems (unreadable CSV, no data, missing `time` column, unqualified headers,
//! allow-list mismatches) fail the call with a [`ProcessorError`]. Row-level problems do not: a
//! row with a bad timestamp is dropped, a cell with a bad number is dropped, and each is reported
//! as a [`types::Diagnostic`] in the returned [`types::Extraction`] (and logged via `tracing`).
//!
//! ## Quick example: stateful processor
//!
//! ```rust
//! use csv_timeseries::ingestion::CsvProcessor;
//!
//! # fn main() -> Result<(), csv_timeseries::ProcessorError> {
//! let processor = CsvProcessor::default();
//! processor.on_data(
//!     b"time,local.portfolio.usd_balance,coinbase.btcusd.price\n\
//!       1626697480,,31232.7\n\
//!       1626697540,100,31240.1\n",
//! )?;
//!
//! let mut states = processor.get_state(None)?.expect("pending payload").output;
//! states.sort_by(|a, b| a.path().cmp(b.path()));
//!
//! assert_eq!(states[0].path(), "coinbase.btcusd");
//! assert_eq!(states[0].observations().len(), 2);
//! assert_eq!(states[1].path(), "local.portfolio");
//! assert_eq!(states[1].observations().len(), 1);
//!
//! // Single-shot: the payload has been consumed.
//! assert!(processor.get_state(None)?.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: processor, stateless entrypoints and the parsing pipeline
//! - [`types`]: observation/state output types and diagnostics
//! - [`error`]: error types

pub mod error;
pub mod ingestion;
pub mod types;

pub use error::{ErrorKind, ProcessorError, ProcessorResult};
