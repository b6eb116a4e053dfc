use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::probe::Probe;
use crate::probe::ProbePolicy;
use crate::record::Record;
use crate::record::Slot;

/// A single fixed-capacity slot array with its own probing policy.
///
/// Counters follow lazy deletion: `occupied` grows with every write into a
/// slot and is left alone by removal; `tombstones` grows with every removal
/// and is left alone when an insert reuses a tombstone. Both are only reset
/// by replacing the table.
#[derive(Debug, Clone)]
pub(crate) struct Table {
    slots: Box<[Slot]>,
    occupied: usize,
    tombstones: usize,
    policy: ProbePolicy,
}

impl Table {
    pub(crate) fn with_capacity(capacity: usize, policy: ProbePolicy) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::default);
        Self {
            slots: slots.into_boxed_slice(),
            occupied: 0,
            tombstones: 0,
            policy,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn occupied(&self) -> usize {
        self.occupied
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    pub(crate) fn policy(&self) -> ProbePolicy {
        self.policy
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[inline]
    pub(crate) fn probe(&self, hash: u64) -> Probe {
        Probe::start(hash, self.capacity(), self.policy)
    }

    /// Index of the live slot holding `(key, id)`.
    ///
    /// Walks the probe chain, skipping tombstones and mismatches, and stops
    /// at the first empty slot.
    pub(crate) fn find_index(&self, hash: u64, key: &str, id: u32) -> Option<usize> {
        for idx in self.probe(hash) {
            let slot = &self.slots[idx];
            if slot.is_empty() {
                return None;
            }
            if slot.live().is_some_and(|record| record.matches(key, id)) {
                return Some(idx);
            }
        }
        None
    }

    #[inline]
    pub(crate) fn get(&self, hash: u64, key: &str, id: u32) -> Option<&Record> {
        self.find_index(hash, key, id)
            .and_then(|idx| self.slots[idx].live())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, hash: u64, key: &str, id: u32) -> Option<&mut Record> {
        let idx = self.find_index(hash, key, id)?;
        self.slots[idx].live_mut()
    }

    /// Writes `record` into the first empty or tombstone slot of its chain.
    ///
    /// Hands the record back if every probe landed on a live slot.
    pub(crate) fn place(&mut self, hash: u64, record: Record) -> Result<usize, Record> {
        let Some(idx) = self.probe(hash).find(|&idx| self.slots[idx].is_open()) else {
            return Err(record);
        };
        self.slots[idx] = Slot::Live(record);
        self.occupied += 1;
        Ok(idx)
    }

    /// Lazily deletes the live `(key, id)` record.
    pub(crate) fn bury(&mut self, hash: u64, key: &str, id: u32) -> bool {
        let Some(idx) = self.find_index(hash, key, id) else {
            return false;
        };
        let buried = self.slots[idx].bury();
        debug_assert!(buried);
        self.tombstones += 1;
        true
    }

    /// Takes the live record out of slot `idx`, leaving a [`Slot::Moved`]
    /// marker behind so chains through `idx` keep going.
    pub(crate) fn evict(&mut self, idx: usize) -> Option<Record> {
        match core::mem::take(&mut self.slots[idx]) {
            Slot::Live(record) => {
                self.slots[idx] = Slot::Moved;
                Some(record)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    #[inline]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Record> {
        self.slots.iter().filter_map(Slot::live)
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn live_len(&self) -> usize {
        self.iter().count()
    }

    pub(crate) fn load_factor(&self) -> f32 {
        if self.capacity() == 0 {
            return 0.0;
        }
        self.occupied as f32 / self.capacity() as f32
    }

    pub(crate) fn tombstone_ratio(&self) -> f32 {
        if self.occupied == 0 {
            return 0.0;
        }
        self.tombstones as f32 / self.occupied as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, id: u32) -> Record {
        Record::new(key, id)
    }

    #[test]
    fn place_and_get() {
        let mut table = Table::with_capacity(11, ProbePolicy::Linear);
        assert_eq!(table.place(3, record("a", 1000)), Ok(3));
        assert_eq!(table.get(3, "a", 1000), Some(&record("a", 1000)));
        assert_eq!(table.get(3, "a", 1001), None);
        assert_eq!(table.occupied(), 1);
    }

    #[test]
    fn collisions_follow_the_chain() {
        let mut table = Table::with_capacity(11, ProbePolicy::Linear);
        for id in 1000..1004 {
            table.place(5, record("same", id)).unwrap();
        }
        assert_eq!(table.find_index(5, "same", 1000), Some(5));
        assert_eq!(table.find_index(5, "same", 1003), Some(8));
    }

    #[test]
    fn tombstones_keep_chains_intact() {
        let mut table = Table::with_capacity(11, ProbePolicy::Linear);
        for id in 1000..1003 {
            table.place(2, record("k", id)).unwrap();
        }
        assert!(table.bury(2, "k", 1001));
        assert!(!table.bury(2, "k", 1001));
        assert_eq!(table.get(2, "k", 1001), None);
        assert_eq!(table.get(2, "k", 1002), Some(&record("k", 1002)));
        assert_eq!(table.occupied(), 3);
        assert_eq!(table.tombstones(), 1);

        // Reuse the tombstone without touching the tombstone count.
        assert_eq!(table.place(2, record("k", 1005)), Ok(3));
        assert_eq!(table.occupied(), 4);
        assert_eq!(table.tombstones(), 1);
        assert_eq!(table.live_len(), 3);
    }

    #[test]
    fn empty_slot_ends_search() {
        let mut table = Table::with_capacity(11, ProbePolicy::Linear);
        table.place(0, record("x", 1000)).unwrap();
        // Same record, but searched from a different home slot.
        assert_eq!(table.find_index(1, "x", 1000), None);
    }

    #[test]
    fn full_table_rejects_without_panicking() {
        let mut table = Table::with_capacity(5, ProbePolicy::Linear);
        for id in 0..5 {
            table.place(0, record("x", id)).unwrap();
        }
        let rejected = table.place(0, record("x", 99)).unwrap_err();
        assert_eq!(rejected.id(), 99);
        assert_eq!(table.occupied(), 5);
        assert_eq!(table.find_index(0, "missing", 0), None);
    }

    #[test]
    fn evict_takes_only_live_slots() {
        let mut table = Table::with_capacity(7, ProbePolicy::Quadratic);
        table.place(1, record("a", 1)).unwrap();
        table.place(2, record("b", 2)).unwrap();
        table.bury(2, "b", 2);

        assert_eq!(table.evict(1), Some(record("a", 1)));
        assert_eq!(table.slots()[1], Slot::Moved);
        assert_eq!(table.evict(1), None);
        assert_eq!(table.evict(2), None);
        assert_eq!(table.slots()[2], Slot::Tombstone(record("b", 2)));
        assert_eq!(table.evict(0), None);
        assert!(table.slots()[0].is_empty());
    }

    #[test]
    fn moved_slots_do_not_end_chains() {
        let mut table = Table::with_capacity(11, ProbePolicy::Linear);
        table.place(4, record("m", 1)).unwrap();
        table.place(4, record("m", 2)).unwrap();
        assert_eq!(table.evict(4), Some(record("m", 1)));
        assert_eq!(table.find_index(4, "m", 2), Some(5));
        assert_eq!(table.find_index(4, "m", 1), None);
    }

    #[test]
    fn ratios() {
        let mut table = Table::with_capacity(10, ProbePolicy::Linear);
        assert_eq!(table.load_factor(), 0.0);
        assert_eq!(table.tombstone_ratio(), 0.0);
        for id in 0..4 {
            table.place(id as u64, record("r", id)).unwrap();
        }
        table.bury(0, "r", 0);
        assert_eq!(table.load_factor(), 0.4);
        assert_eq!(table.tombstone_ratio(), 0.25);
    }
}
