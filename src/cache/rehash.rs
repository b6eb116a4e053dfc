//! Incremental migration from the retiring table into the active one.

use super::Cache;
use crate::hasher::KeyHasher;
use crate::prime;
use crate::table::Table;

/// An insert that pushes the active table's load factor above this value
/// starts a resize.
pub const LOAD_FACTOR_LIMIT: f32 = 0.5;

/// A removal that pushes the active table's tombstone ratio above this value
/// starts a resize.
pub const TOMBSTONE_RATIO_LIMIT: f32 = 0.8;

/// Number of mutating calls a resize is spread over. The last one migrates
/// whatever the earlier, evenly sized chunks left behind.
const TRANSFER_ROUNDS: usize = 4;

/// Growth factor applied to the surviving record count.
const GROWTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Trigger {
    LoadFactor,
    Tombstones,
}

impl<H: KeyHasher> Cache<H> {
    /// Demotes the active table and allocates its replacement.
    ///
    /// Must not be called while a resize is already in flight.
    pub(super) fn begin_resize(&mut self, trigger: Trigger) {
        debug_assert!(self.retiring.is_none(), "nested resize");

        let survivors = self
            .active
            .occupied()
            .saturating_sub(self.active.tombstones());
        let capacity = prime::capacity_for(survivors.saturating_mul(GROWTH));
        let fresh = Table::with_capacity(capacity, self.pending_policy);
        let retiring = core::mem::replace(&mut self.active, fresh);

        tracing::debug!(
            ?trigger,
            old_capacity = retiring.capacity(),
            new_capacity = capacity,
            survivors,
            policy = ?self.pending_policy,
            "resize started"
        );

        self.retiring = Some(retiring);
        self.cursor = 0;
    }

    /// Migrates the next chunk of the retiring table, if there is one.
    ///
    /// Chunks are a quarter of the retiring capacity; the fourth call takes
    /// everything that is left and ends the resize.
    pub(super) fn advance_resize(&mut self) {
        let Some(retiring) = self.retiring.as_mut() else {
            return;
        };

        let capacity = retiring.capacity();
        let chunk = (capacity / TRANSFER_ROUNDS).max(1);
        let start = self.cursor;
        let end = if start / chunk >= TRANSFER_ROUNDS - 1 {
            capacity
        } else {
            (start + chunk).min(capacity)
        };

        let mut migrated = 0usize;
        for idx in start..end {
            let Some(record) = retiring.evict(idx) else {
                continue;
            };
            let hash = self.hasher.hash_key(record.key());
            match self.active.place(hash, record) {
                Ok(_) => migrated += 1,
                Err(record) => {
                    // The replacement is sized to at least four times the
                    // survivors, so this needs a pathological hash function.
                    self.len -= 1;
                    tracing::warn!(
                        key = record.key(),
                        id = record.id(),
                        capacity = self.active.capacity(),
                        "dropping record that found no slot during migration"
                    );
                }
            }
        }
        self.cursor = end;

        tracing::trace!(start, end, migrated, "migrated chunk");

        if self.cursor >= capacity {
            self.retiring = None;
            self.cursor = 0;
            tracing::debug!(
                capacity = self.active.capacity(),
                occupied = self.active.occupied(),
                "resize finished"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::ToString;

    use super::*;
    use crate::config::MINID;
    use crate::prime::MINPRIME;
    use crate::probe::ProbePolicy;
    use crate::record::Record;

    fn filled(count: u32, policy: ProbePolicy) -> Cache<crate::hasher::Times33> {
        let mut cache = Cache::new(MINPRIME, crate::hasher::Times33, policy);
        for i in 0..count {
            let key = format!("record-{i}");
            cache.insert(Record::new(key, MINID + i)).unwrap();
        }
        cache
    }

    #[test]
    fn begin_resize_sizes_by_survivors() {
        let mut cache = filled(30, ProbePolicy::Linear);
        cache.set_probe_policy(ProbePolicy::DoubleHash);
        cache.begin_resize(Trigger::LoadFactor);

        // 4 * 30 = 120 rounds up to 127.
        assert_eq!(cache.capacity(), 127);
        assert_eq!(cache.probe_policy(), ProbePolicy::DoubleHash);
        assert_eq!(cache.active.occupied(), 0);
        assert_eq!(cache.cursor, 0);

        let retiring = cache.retiring.as_ref().unwrap();
        assert_eq!(retiring.capacity(), MINPRIME);
        assert_eq!(retiring.occupied(), 30);
        assert_eq!(retiring.policy(), ProbePolicy::Linear);
    }

    #[test]
    fn transfer_moves_quarter_chunks_then_the_rest() {
        let mut cache = filled(30, ProbePolicy::Quadratic);
        cache.begin_resize(Trigger::LoadFactor);

        // 101 / 4 = 25
        for expected in [25, 50, 75] {
            cache.advance_resize();
            assert_eq!(cache.cursor, expected);
            assert!(cache.is_resizing());
        }
        cache.advance_resize();
        assert!(!cache.is_resizing());
        assert_eq!(cache.cursor, 0);
        assert_eq!(cache.active.occupied(), 30);
        assert_eq!(cache.len(), 30);

        for i in 0..30u32 {
            assert!(cache.contains(&format!("record-{i}"), MINID + i));
        }
    }

    #[test]
    fn transfer_without_resize_is_a_no_op() {
        let mut cache = filled(5, ProbePolicy::Linear);
        let before = cache.dump().to_string();
        cache.advance_resize();
        assert_eq!(cache.dump().to_string(), before);
        assert!(!cache.is_resizing());
    }

    #[test]
    fn tombstones_are_not_migrated() {
        let mut cache = filled(10, ProbePolicy::DoubleHash);
        for i in 0..3u32 {
            cache.remove(&format!("record-{i}"), MINID + i).unwrap();
        }
        cache.begin_resize(Trigger::Tombstones);
        assert_eq!(cache.capacity(), MINPRIME);
        while cache.is_resizing() {
            cache.advance_resize();
        }
        assert_eq!(cache.active.occupied(), 7);
        assert_eq!(cache.active.tombstones(), 0);
        assert_eq!(cache.len(), 7);
    }

    #[test]
    fn growth_is_clamped_to_max_prime() {
        let mut cache = filled(0, ProbePolicy::Linear);
        cache.begin_resize(Trigger::LoadFactor);
        assert_eq!(cache.capacity(), MINPRIME);

        let capacity = prime::capacity_for(usize::MAX.saturating_mul(GROWTH));
        assert_eq!(capacity, prime::MAXPRIME);
    }
}
