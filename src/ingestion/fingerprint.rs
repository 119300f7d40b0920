//! Payload change detection.

use std::fmt;
use std::io;

use sha2::{Digest, Sha256};

use crate::error::{ProcessorError, ProcessorResult};

/// SHA-256 content hash of a raw payload, used only for equality between successive updates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash `payload`.
    pub fn compute(payload: &[u8]) -> ProcessorResult<Self> {
        let mut hasher = Sha256::new();
        let mut input = payload;
        io::copy(&mut input, &mut hasher).map_err(ProcessorError::Hashing)?;

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Decide whether `new_payload` carries new data.
///
/// Returns `Some(fingerprint)` for the caller to store alongside `new_payload`, or `None` if
/// it is identical to the data that produced `previous_fingerprint`. `previous_payload` is only
/// a shortcut: when it is still held and byte-identical, no hashing is needed.
pub fn detect(
    previous_payload: Option<&[u8]>,
    previous_fingerprint: Option<&Fingerprint>,
    new_payload: &[u8],
) -> ProcessorResult<Option<Fingerprint>> {
    let Some(previous_fingerprint) = previous_fingerprint else {
        return Fingerprint::compute(new_payload).map(Some);
    };

    if previous_payload == Some(new_payload) {
        return Ok(None);
    }

    let fingerprint = Fingerprint::compute(new_payload)?;
    if &fingerprint == previous_fingerprint {
        Ok(None)
    } else {
        Ok(Some(fingerprint))
    }
}
