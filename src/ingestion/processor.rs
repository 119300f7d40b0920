//! Stateful, thread-safe CSV processor.
//!
//! [`CsvProcessor`] holds at most one pending payload. [`CsvProcessor::on_data`] replaces it only
//! when the new bytes differ from the last accepted ones; each extraction call consumes it.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ProcessorError, ProcessorResult};
use crate::types::{Extraction, Observation, State};

use super::fingerprint::{detect, Fingerprint};
use super::observability::{severity_for_error, ExtractionStats, Operation, ProcessorContext};
use super::unified::{extract_observations, extract_state, ProcessorOptions};

#[derive(Debug, Default)]
struct Buffer {
    payload: Option<Vec<u8>>,
    fingerprint: Option<Fingerprint>,
}

/// Converts CSV payloads into observations or per-path state, once per distinct payload.
///
/// All access goes through one lock. Extraction holds it exclusively for its whole duration
/// because it clears the pending payload on success; an update delivered mid-extraction becomes
/// visible to the next call.
///
/// ```rust
/// use csv_timeseries::ingestion::CsvProcessor;
///
/// # fn main() -> Result<(), csv_timeseries::ProcessorError> {
/// let processor = CsvProcessor::default();
/// let csv = b"time,price\n1626697480,31232.7\n";
///
/// assert!(processor.on_data(csv)?);
/// assert_eq!(processor.get_observations()?.unwrap().output.len(), 1);
///
/// // Consumed, and identical bytes are not accepted again.
/// assert!(processor.get_observations()?.is_none());
/// assert!(!processor.on_data(csv)?);
/// assert!(processor.get_observations()?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CsvProcessor {
    options: ProcessorOptions,
    buffer: RwLock<Buffer>,
}

impl CsvProcessor {
    pub fn new(options: ProcessorOptions) -> Self {
        Self {
            options,
            buffer: RwLock::new(Buffer::default()),
        }
    }

    /// Apply string parameters (only `time_format` is recognized).
    pub fn init(&mut self, params: &HashMap<String, String>) -> ProcessorResult<()> {
        self.options.apply_params(params)
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Offer a new raw payload.
    ///
    /// Returns `true` if it was accepted as new data. Identical bytes are ignored and never
    /// evict a pending, unconsumed payload.
    pub fn on_data(&self, data: &[u8]) -> ProcessorResult<bool> {
        let mut buffer = self.buffer.write();

        let detected = detect(
            buffer.payload.as_deref(),
            buffer.fingerprint.as_ref(),
            data,
        );
        let fingerprint = match detected {
            Ok(fp) => fp,
            Err(e) => {
                self.report_failure(Operation::Ingest, buffer.fingerprint, &e);
                return Err(e);
            }
        };

        match fingerprint {
            Some(fingerprint) => {
                debug!(%fingerprint, bytes = data.len(), "accepted new payload");
                buffer.payload = Some(data.to_vec());
                buffer.fingerprint = Some(fingerprint);
                Ok(true)
            }
            None => {
                debug!(bytes = data.len(), "ignoring unchanged payload");
                Ok(false)
            }
        }
    }

    /// True if a payload is waiting to be extracted.
    pub fn has_pending(&self) -> bool {
        self.buffer.read().payload.is_some()
    }

    /// Fingerprint of the last accepted payload.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.buffer.read().fingerprint
    }

    /// Consume the pending payload as a flat observation list.
    ///
    /// Returns `Ok(None)` if nothing is pending. On error the payload is kept.
    pub fn get_observations(&self) -> ProcessorResult<Option<Extraction<Vec<Observation>>>> {
        self.consume(Operation::Observations, |payload| {
            let out = extract_observations(payload, &self.options)?;
            let stats = ExtractionStats {
                observations: out.output.len(),
                states: 0,
                diagnostics: out.diagnostics.len(),
            };
            Ok((out, stats))
        })
    }

    /// Consume the pending payload as per-path state.
    ///
    /// Returns `Ok(None)` if nothing is pending. On error the payload is kept.
    pub fn get_state(
        &self,
        valid_fields: Option<&[&str]>,
    ) -> ProcessorResult<Option<Extraction<Vec<State>>>> {
        self.consume(Operation::State, |payload| {
            let out = extract_state(payload, valid_fields, &self.options)?;
            let observations = out.output.iter().map(|s| s.observations().len()).sum();
            let stats = ExtractionStats {
                observations,
                states: out.output.len(),
                diagnostics: out.diagnostics.len(),
            };
            Ok((out, stats))
        })
    }

    fn consume<T, F>(
        &self,
        operation: Operation,
        extract: F,
    ) -> ProcessorResult<Option<Extraction<T>>>
    where
        F: FnOnce(&[u8]) -> ProcessorResult<(Extraction<T>, ExtractionStats)>,
    {
        let mut buffer = self.buffer.write();
        let Some(payload) = buffer.payload.as_deref() else {
            return Ok(None);
        };

        let ctx = ProcessorContext {
            operation,
            fingerprint: buffer.fingerprint,
        };

        match extract(payload) {
            Ok((out, stats)) => {
                buffer.payload = None;
                if let Some(obs) = self.options.observer.as_ref() {
                    for diagnostic in &out.diagnostics {
                        obs.on_diagnostic(&ctx, diagnostic);
                    }
                    obs.on_success(&ctx, stats);
                }
                Ok(Some(out))
            }
            Err(e) => {
                self.report_failure(operation, buffer.fingerprint, &e);
                Err(e)
            }
        }
    }

    fn report_failure(
        &self,
        operation: Operation,
        fingerprint: Option<Fingerprint>,
        e: &ProcessorError,
    ) {
        if let Some(obs) = self.options.observer.as_ref() {
            let ctx = ProcessorContext {
                operation,
                fingerprint,
            };
            let sev = severity_for_error(e);
            obs.on_failure(&ctx, sev, e);
            if sev >= self.options.alert_at_or_above {
                obs.on_alert(&ctx, sev, e);
            }
        }
    }
}
