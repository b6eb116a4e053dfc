//! Low-level statistics for tuning and debugging.
//!
//! Compiled with the `stats` feature (and always under `cfg(test)`).

use alloc::vec;
use alloc::vec::Vec;

use crate::cache::Cache;
use crate::hasher::KeyHasher;
use crate::record::Record;
use crate::record::Slot;

/// Snapshot of a cache's counters and slot usage.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Live records across both tables
    pub len: usize,
    /// Capacity of the active table
    pub capacity: usize,
    /// Slot writes counted against the active table
    pub occupied: usize,
    /// Lazily deleted slots in the active table
    pub tombstones: usize,
    /// Slots of the active table currently holding a live record
    pub live_slots: usize,
    /// Load factor of the active table (occupied / capacity)
    pub load_factor: f64,
    /// Tombstone ratio of the active table (tombstones / occupied)
    pub tombstone_ratio: f64,
    /// Capacity of the retiring table, 0 when no resize is in flight
    pub retiring_capacity: usize,
    /// Records still waiting in the retiring table
    pub retiring_live: usize,
    /// Next retiring slot to migrate
    pub transfer_cursor: usize,
    /// Bytes held by the slot arrays of both tables
    pub total_bytes: usize,
}

impl DebugStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Cache Debug Statistics ===");
        println!("Records: {}", self.len);
        println!(
            "Active: {}/{} occupied ({:.2}% load factor), {} live",
            self.occupied,
            self.capacity,
            self.load_factor * 100.0,
            self.live_slots
        );
        println!(
            "Tombstones: {} ({:.2}% of occupied)",
            self.tombstones,
            self.tombstone_ratio * 100.0
        );
        if self.retiring_capacity == 0 {
            println!("Retiring: none");
        } else {
            println!(
                "Retiring: {} live of {} slots, cursor at {}",
                self.retiring_live, self.retiring_capacity, self.transfer_cursor
            );
        }
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Distribution of probe lengths over the live records of the active table.
///
/// Bin `n` counts the records found after `n` collisions, i.e. at step `n`
/// of their probe sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

impl ProbeHistogram {
    /// The histogram bins, indexed by probe length.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Number of records counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Longest probe length observed.
    pub fn max_probe_len(&self) -> Option<usize> {
        self.bins.iter().rposition(|&count| count != 0)
    }

    /// Average probe length, `0.0` for an empty table.
    pub fn mean(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted: usize = self
            .bins
            .iter()
            .enumerate()
            .map(|(len, count)| len * count)
            .sum();
        weighted as f64 / total as f64
    }

    /// Pretty-prints the histogram as a horizontal bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(partial);
            bar
        };

        for (len, &count) in self.bins.iter().enumerate() {
            println!("{:>3} | {} ({})", len, make_bar(count), count);
        }
    }
}

impl<H: KeyHasher> Cache<H> {
    /// Returns a snapshot of the cache's counters.
    pub fn debug_stats(&self) -> DebugStats {
        let (active, retiring) = self.tables();
        let slot_bytes = core::mem::size_of::<Slot>();

        DebugStats {
            len: self.len(),
            capacity: active.capacity(),
            occupied: active.occupied(),
            tombstones: active.tombstones(),
            live_slots: active.live_len(),
            load_factor: self.load_factor() as f64,
            tombstone_ratio: self.tombstone_ratio() as f64,
            retiring_capacity: retiring.map_or(0, |table| table.capacity()),
            retiring_live: retiring.map_or(0, |table| table.live_len()),
            transfer_cursor: self.transfer_cursor(),
            total_bytes: (active.capacity() + retiring.map_or(0, |table| table.capacity()))
                * slot_bytes,
        }
    }

    /// Computes the probe-length histogram of the active table.
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let (active, _) = self.tables();
        let mut bins = vec![0usize; 1];

        for (idx, record) in active
            .slots()
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.live().map(|record| (idx, record)))
        {
            let len = self.probe_len(active, idx, record);
            if len >= bins.len() {
                bins.resize(len + 1, 0);
            }
            bins[len] += 1;
        }

        ProbeHistogram { bins }
    }

    fn probe_len(&self, table: &crate::table::Table, idx: usize, record: &Record) -> usize {
        let hash = self.hash_of(record.key());
        table
            .probe(hash)
            .position(|candidate| candidate == idx)
            .unwrap_or(table.capacity())
    }
}
