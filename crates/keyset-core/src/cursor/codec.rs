//! Opaque cursor tokens.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use super::CursorValues;
use crate::TRACING_TARGET_CURSOR;
use crate::error::{Error, Result};
use crate::ordering::KeysetOrdering;
use crate::types::Record;

/// Wire payload of a cursor token.
#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    /// Fingerprint of the ordering the cursor was issued under.
    #[serde(rename = "o")]
    ordering: String,
    /// Sort-key values of the record.
    #[serde(rename = "k")]
    keys: CursorValues,
}

/// Converts records into opaque cursor tokens and back, for one ordering.
///
/// Tokens are JSON payloads encoded as URL-safe base64 without padding.
/// Each token carries a fingerprint of the ordering it was issued under, so a
/// token replayed against a differently ordered connection is rejected
/// instead of silently producing a nonsensical window.
#[derive(Debug, Clone)]
pub struct CursorCodec {
    ordering: KeysetOrdering,
    fingerprint: String,
    verify_fingerprint: bool,
}

impl CursorCodec {
    /// Creates a codec for the given ordering.
    pub fn new(ordering: KeysetOrdering) -> Self {
        let fingerprint = ordering.fingerprint();
        Self {
            ordering,
            fingerprint,
            verify_fingerprint: true,
        }
    }

    /// Enables or disables rejecting tokens issued under another ordering.
    ///
    /// When disabled, only the attribute list is checked.
    pub fn with_fingerprint_check(mut self, verify: bool) -> Self {
        self.verify_fingerprint = verify;
        self
    }

    /// Returns the ordering this codec encodes for.
    #[inline]
    pub fn ordering(&self) -> &KeysetOrdering {
        &self.ordering
    }

    /// Captures a record's sort-key values, transforms applied.
    pub fn values_of<R: Record + ?Sized>(&self, record: &R) -> Result<CursorValues> {
        self.ordering
            .iter()
            .map(|descriptor| {
                descriptor
                    .evaluate(record)
                    .map(|value| (descriptor.attribute_name(), value))
                    .ok_or_else(|| Error::MissingAttribute(descriptor.attribute_name().to_owned()))
            })
            .collect()
    }

    /// Encodes a record's position as a cursor token.
    pub fn encode<R: Record + ?Sized>(&self, record: &R) -> Result<String> {
        let keys = self.values_of(record)?;
        self.encode_values(keys)
    }

    /// Encodes already captured values as a cursor token.
    pub fn encode_values(&self, keys: CursorValues) -> Result<String> {
        let payload = CursorPayload {
            ordering: self.fingerprint.clone(),
            keys,
        };
        let json = serde_json::to_vec(&payload)?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes a cursor token into its sort-key values.
    ///
    /// Fails with [`Error::InvalidCursor`] when the token is malformed or does
    /// not belong to this ordering. Never returns an empty map for a bad
    /// token.
    pub fn decode(&self, token: &str) -> Result<CursorValues> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| reject("cursor is not valid base64"))?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|_| reject("cursor payload is malformed"))?;

        if self.verify_fingerprint && payload.ordering != self.fingerprint {
            return Err(reject("cursor was issued for a different ordering"));
        }

        let expected = self.ordering.iter().map(|descriptor| descriptor.attribute_name());
        if !payload.keys.attributes().eq(expected) {
            return Err(reject("cursor attributes do not match the ordering"));
        }

        Ok(payload.keys)
    }
}

fn reject(reason: &'static str) -> Error {
    tracing::warn!(target: TRACING_TARGET_CURSOR, reason, "Rejected cursor");
    Error::invalid_cursor(reason)
}
