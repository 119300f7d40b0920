use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::ProcessorError;
use crate::types::Diagnostic;

use super::fingerprint::Fingerprint;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (a recovered row fault).
    Warning,
    /// Error-level event (extraction failed).
    Error,
    /// Critical error (fingerprinting failures).
    Critical,
}

/// Which processor call produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Payload ingestion (change detection).
    Ingest,
    /// Flat observation stream.
    Observations,
    /// Path-partitioned state.
    State,
}

/// Context about a processor call.
#[derive(Debug, Clone)]
pub struct ProcessorContext {
    pub operation: Operation,
    /// Fingerprint of the payload being consumed, if known.
    pub fingerprint: Option<Fingerprint>,
}

/// Counters reported on successful extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractionStats {
    pub observations: usize,
    /// Zero for flat extraction.
    pub states: usize,
    pub diagnostics: usize,
}

/// Observer interface for extraction outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ProcessorObserver: Send + Sync {
    /// Called when extraction succeeds.
    fn on_success(&self, _ctx: &ProcessorContext, _stats: ExtractionStats) {}

    /// Called when ingestion or extraction fails.
    fn on_failure(&self, _ctx: &ProcessorContext, _severity: Severity, _error: &ProcessorError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ProcessorContext, severity: Severity, error: &ProcessorError) {
        self.on_failure(ctx, severity, error)
    }

    /// Called once per recovered row fault.
    fn on_diagnostic(&self, _ctx: &ProcessorContext, _diagnostic: &Diagnostic) {}
}

/// Severity of a failed call.
pub fn severity_for_error(e: &ProcessorError) -> Severity {
    match e {
        ProcessorError::Hashing(_) => Severity::Critical,
        _ => Severity::Error,
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ProcessorObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ProcessorObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ProcessorObserver for CompositeObserver {
    fn on_success(&self, ctx: &ProcessorContext, stats: ExtractionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ProcessorContext, severity: Severity, error: &ProcessorError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ProcessorContext, severity: Severity, error: &ProcessorError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_diagnostic(&self, ctx: &ProcessorContext, diagnostic: &Diagnostic) {
        for o in &self.observers {
            o.on_diagnostic(ctx, diagnostic);
        }
    }
}

/// Forwards extraction events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ProcessorObserver for TracingObserver {
    fn on_success(&self, ctx: &ProcessorContext, stats: ExtractionStats) {
        info!(
            operation = ?ctx.operation,
            fingerprint = ?ctx.fingerprint,
            observations = stats.observations,
            states = stats.states,
            diagnostics = stats.diagnostics,
            "extraction succeeded"
        );
    }

    fn on_failure(&self, ctx: &ProcessorContext, severity: Severity, error: &ProcessorError) {
        error!(operation = ?ctx.operation, ?severity, %error, "processor call failed");
    }

    fn on_alert(&self, ctx: &ProcessorContext, severity: Severity, error: &ProcessorError) {
        error!(
            operation = ?ctx.operation,
            ?severity,
            %error,
            alert = true,
            "processor call failed"
        );
    }

    fn on_diagnostic(&self, ctx: &ProcessorContext, diagnostic: &Diagnostic) {
        warn!(operation = ?ctx.operation, row = diagnostic.row, "{diagnostic}");
    }
}
