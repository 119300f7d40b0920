//! CSV ingestion and extraction.
//!
//! Most callers either hold a [`CsvProcessor`] (change detection + single-shot consumption) or
//! call the stateless [`extract_observations`] / [`extract_state`] directly.
//!
//! The building blocks are also public:
//! - [`fingerprint`]: payload change detection
//! - [`reader`]: CSV → header row + data rows
//! - [`header`]: fully-qualified header → (path, field)
//! - [`interpreter`]: fault-tolerant row parsing
//! - [`observations`] / [`state`]: the two output shapes
//! - [`batch`]: parallel extraction over independent payloads

pub mod batch;
pub mod fingerprint;
pub mod header;
pub mod interpreter;
pub mod observability;
pub mod observations;
pub mod processor;
pub mod reader;
pub mod state;
pub mod time;
pub mod unified;

/// Name of the mandatory first column.
pub const TIME_COLUMN: &str = "time";
/// Field name marking a column of space-separated tags.
pub const TAGS_COLUMN: &str = "_tags";
/// Separator between entity path and field name in a fully-qualified header.
pub const PATH_SEPARATOR: char = '.';
/// Parameter key overriding the timestamp format.
pub const TIME_FORMAT_PARAM: &str = "time_format";

pub use batch::{extract_observations_batch, extract_state_batch};
pub use fingerprint::Fingerprint;
pub use observability::{
    CompositeObserver, ExtractionStats, Operation, ProcessorContext, ProcessorObserver, Severity,
    TracingObserver,
};
pub use processor::CsvProcessor;
pub use unified::{extract_observations, extract_state, ProcessorOptions};
