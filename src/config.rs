use core::ops::RangeInclusive;

use crate::cache::Cache;
use crate::hasher::DefaultKeyHasher;
use crate::hasher::KeyHasher;
use crate::prime::MINPRIME;
use crate::probe::ProbePolicy;

/// Smallest identifier accepted by default.
pub const MINID: u32 = 1000;

/// Largest identifier accepted by default.
pub const MAXID: u32 = 9999;

/// A builder for a [`Cache`].
///
/// # Examples
///
/// ```rust
/// # use prime_cache::{Cache, ProbePolicy, Record};
/// # use prime_cache::hasher::Times33;
/// let mut cache = Cache::builder()
///     .capacity(500)
///     .probe_policy(ProbePolicy::Linear)
///     .id_range(1..=100)
///     .hasher(Times33)
///     .build();
///
/// assert_eq!(cache.capacity(), 503);
/// assert!(cache.insert(Record::new("python", 7)).is_ok());
/// assert!(cache.insert(Record::new("python", 700)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CacheBuilder<H = DefaultKeyHasher> {
    capacity: usize,
    policy: ProbePolicy,
    min_id: u32,
    max_id: u32,
    hasher: H,
}

impl CacheBuilder<DefaultKeyHasher> {
    /// Creates a builder with the default settings: [`MINPRIME`] slots,
    /// quadratic probing and identifiers in `[MINID, MAXID]`.
    pub fn new() -> Self {
        Self {
            capacity: MINPRIME,
            policy: ProbePolicy::default(),
            min_id: MINID,
            max_id: MAXID,
            hasher: DefaultKeyHasher::default(),
        }
    }
}

impl Default for CacheBuilder<DefaultKeyHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> CacheBuilder<H> {
    /// Sets the requested capacity. It is rounded up to a prime and clamped
    /// into `[MINPRIME, MAXPRIME]` when the cache is built.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the probing policy of the initial table.
    pub fn probe_policy(mut self, policy: ProbePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the inclusive range of accepted identifiers.
    ///
    /// An empty range (`start > end`) rejects every identifier.
    pub fn id_range(mut self, ids: RangeInclusive<u32>) -> Self {
        self.min_id = *ids.start();
        self.max_id = *ids.end();
        self
    }

    /// Replaces the hash function.
    pub fn hasher<K: KeyHasher>(self, hasher: K) -> CacheBuilder<K> {
        CacheBuilder {
            capacity: self.capacity,
            policy: self.policy,
            min_id: self.min_id,
            max_id: self.max_id,
            hasher,
        }
    }
}

impl<H: KeyHasher> CacheBuilder<H> {
    /// Builds the cache.
    pub fn build(self) -> Cache<H> {
        Cache::from_parts(
            self.capacity,
            self.hasher,
            self.policy,
            self.min_id..=self.max_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Times33;
    use crate::record::Record;

    #[test]
    fn defaults() {
        let cache = CacheBuilder::new().build();
        assert_eq!(cache.capacity(), MINPRIME);
        assert_eq!(cache.probe_policy(), ProbePolicy::Quadratic);
        assert_eq!(cache.id_range(), MINID..=MAXID);
    }

    #[test]
    fn custom_id_range() {
        let mut cache = CacheBuilder::new()
            .hasher(Times33)
            .id_range(5..=10)
            .build();
        assert!(cache.insert(Record::new("a", 5)).is_ok());
        assert!(cache.insert(Record::new("a", 10)).is_ok());
        assert!(cache.insert(Record::new("a", 4)).is_err());
        assert!(cache.insert(Record::new("a", 11)).is_err());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn empty_id_range_rejects_everything() {
        #[allow(clippy::reversed_empty_ranges)]
        let mut cache = CacheBuilder::new().id_range(10..=5).build();
        for id in [0, 5, 7, 10, u32::MAX] {
            assert!(cache.insert(Record::new("a", id)).is_err());
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_is_rounded_to_prime() {
        let cache = CacheBuilder::new().capacity(1000).build();
        assert_eq!(cache.capacity(), 1009);
        let cache = CacheBuilder::new().capacity(1).build();
        assert_eq!(cache.capacity(), MINPRIME);
    }
}
