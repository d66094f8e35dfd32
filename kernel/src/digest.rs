//! Domain-separated SHA-256 digests of plan reports.
//!
//! Two runs (in one process or across processes) agree on a plan exactly
//! when their digests print the same `"sha256:<hex>"` string.

use std::fmt;

use sha2::{Digest, Sha256};

/// Domain prefix for plan report digests.
pub const DOMAIN_PLAN_REPORT: &[u8] = b"QUARRY::PLAN_REPORT::V1\0";

/// Domain prefix for plan action-sequence digests.
pub const DOMAIN_PLAN_ACTIONS: &[u8] = b"QUARRY::PLAN_ACTIONS::V1\0";

/// A `"sha256:<hex>"` digest string. Only [`canonical_hash`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 of `domain` followed by `data`.
#[must_use]
pub fn canonical_hash(domain: &[u8], data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    ContentHash(format!("sha256:{}", hex::encode(hasher.finalize())))
}
