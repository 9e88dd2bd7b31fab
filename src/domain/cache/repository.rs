use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use super::Fingerprint;
use crate::domain::error::CacheError;
use crate::domain::outcome::RawOutcome;

/// Storage contract for previously computed evaluation outcomes.
///
/// Expiry is evaluated lazily on read: `get` of an expired entry reports
/// absent and the caller overwrites it after recomputation. Reads and writes
/// of a single fingerprint are atomic per entry; concurrent writers to the
/// same fingerprint may overwrite each other (last write wins).
#[async_trait]
pub trait ResultCache: Send + Sync + Debug {
    /// Returns the stored outcome, or `None` if absent or expired
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<RawOutcome>, CacheError>;

    /// Stores an outcome as one atomic unit, overwriting any existing entry
    async fn put(
        &self,
        fingerprint: &Fingerprint,
        outcome: &RawOutcome,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}
