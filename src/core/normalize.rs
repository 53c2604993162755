//! Transfer normalization.
//!
//! Total pure conversion from the provider's wire shape to the canonical
//! [`Transfer`]. Malformed fields degrade to sentinel values (`None` amount,
//! timestamp 0) instead of propagating an error: a partially-useful record
//! beats a dropped one.

use chrono::DateTime;

use crate::models::types::{normalize_address, Transfer};
use crate::providers::transfers::RawTransfer;

pub fn normalize(raw: &RawTransfer) -> Transfer {
    Transfer {
        hash: raw.hash.clone(),
        from: normalize_address(&raw.from),
        // A missing recipient (contract creation) becomes the empty string,
        // which matches no address in any membership test.
        to: raw
            .to
            .as_deref()
            .map(normalize_address)
            .unwrap_or_default(),
        value_native: raw.value.filter(|v| v.is_finite()),
        timestamp_ms: raw
            .metadata
            .as_ref()
            .and_then(|m| m.block_timestamp.as_deref())
            .map(parse_timestamp_ms)
            .unwrap_or(0),
    }
}

/// ISO-8601 → epoch milliseconds, 0 on anything unparseable.
fn parse_timestamp_ms(raw: &str) -> i64 {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
