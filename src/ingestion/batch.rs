//! Parallel extraction over many independent payloads.
//!
//! Each payload is converted on its own; results come back in input order, one per payload, so
//! a structural error in one payload does not affect the others.

use rayon::prelude::*;

use crate::error::ProcessorResult;
use crate::types::{Extraction, Observation, State};

use super::unified::{extract_observations, extract_state, ProcessorOptions};

/// [`extract_observations`] for every payload, in parallel.
pub fn extract_observations_batch<P>(
    payloads: &[P],
    options: &ProcessorOptions,
) -> Vec<ProcessorResult<Extraction<Vec<Observation>>>>
where
    P: AsRef<[u8]> + Sync,
{
    payloads
        .par_iter()
        .map(|p| extract_observations(p.as_ref(), options))
        .collect()
}

/// [`extract_state`] for every payload, in parallel.
pub fn extract_state_batch<P>(
    payloads: &[P],
    valid_fields: Option<&[&str]>,
    options: &ProcessorOptions,
) -> Vec<ProcessorResult<Extraction<Vec<State>>>>
where
    P: AsRef<[u8]> + Sync,
{
    payloads
        .par_iter()
        .map(|p| extract_state(p.as_ref(), valid_fields, options))
        .collect()
}
