/// Modulus used to derive the double-hashing stride.
///
/// The stride is `11 - (hash % 11)`, so it lies in `1..=11` regardless of the
/// table capacity. Against a prime capacity above 11 this still visits every
/// slot, but nothing enforces that for arbitrary capacities; probe loops are
/// always capped at `capacity` attempts.
pub const DOUBLE_HASH_MODULUS: u64 = 11;

/// Collision-resolution policy of a single table.
///
/// Each table keeps the policy it was created with. Changing the policy on a
/// [`Cache`](crate::Cache) only affects the table allocated by the next
/// resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProbePolicy {
    /// `base + step`
    Linear,
    /// `base + step²`
    #[default]
    Quadratic,
    /// `base + step × (11 - hash % 11)`
    DoubleHash,
}

impl ProbePolicy {
    /// Returns the slot examined at `step` of the probe sequence starting at
    /// `base`.
    ///
    /// Pure and deterministic: the same inputs always give the same index.
    /// `capacity` must be non-zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_cache::ProbePolicy;
    /// assert_eq!(ProbePolicy::Linear.index(100, 3, 101, 0), 2);
    /// assert_eq!(ProbePolicy::Quadratic.index(100, 3, 101, 0), 8);
    /// // hash % 11 == 1, so the stride is 10
    /// assert_eq!(ProbePolicy::DoubleHash.index(5, 2, 101, 12), 25);
    /// ```
    #[inline]
    pub fn index(self, base: usize, step: usize, capacity: usize, hash: u64) -> usize {
        let offset = self.offset(step as u64, stride(hash));
        ((base as u64 + offset % capacity as u64) % capacity as u64) as usize
    }

    #[inline(always)]
    fn offset(self, step: u64, stride: u64) -> u64 {
        match self {
            ProbePolicy::Linear => step,
            ProbePolicy::Quadratic => step.wrapping_mul(step),
            ProbePolicy::DoubleHash => step.wrapping_mul(stride),
        }
    }
}

#[inline(always)]
fn stride(hash: u64) -> u64 {
    DOUBLE_HASH_MODULUS - (hash % DOUBLE_HASH_MODULUS)
}

/// Home slot of `hash` in a table of `capacity` slots.
#[inline(always)]
pub(crate) fn home_slot(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

// A bounded probe sequence.
//
// Yields at most `capacity` indices, starting at the home slot. That cap is
// the only thing keeping a search on a full or badly clustered table finite.
#[derive(Debug, Clone)]
pub(crate) struct Probe {
    base: usize,
    step: usize,
    capacity: usize,
    stride: u64,
    policy: ProbePolicy,
}

impl Probe {
    #[inline]
    pub(crate) fn start(hash: u64, capacity: usize, policy: ProbePolicy) -> Probe {
        Probe {
            base: if capacity == 0 {
                0
            } else {
                home_slot(hash, capacity)
            },
            step: 0,
            capacity,
            stride: stride(hash),
            policy,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.step >= self.capacity {
            return None;
        }

        let capacity = self.capacity as u64;
        let offset = self.policy.offset(self.step as u64, self.stride) % capacity;
        self.step += 1;

        Some(((self.base as u64 + offset) % capacity) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.capacity - self.step;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Probe {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn linear_wraps_around() {
        let seq: Vec<usize> = Probe::start(9, 11, ProbePolicy::Linear).take(4).collect();
        assert_eq!(seq, [9, 10, 0, 1]);
    }

    #[test]
    fn quadratic_offsets_are_squares() {
        let seq: Vec<usize> = Probe::start(0, 101, ProbePolicy::Quadratic)
            .take(5)
            .collect();
        assert_eq!(seq, [0, 1, 4, 9, 16]);
    }

    #[test]
    fn double_hash_stride_depends_on_hash_mod_eleven() {
        // 13 % 11 == 2 -> stride 9
        let seq: Vec<usize> = Probe::start(13, 101, ProbePolicy::DoubleHash)
            .take(4)
            .collect();
        assert_eq!(seq, [13, 22, 31, 40]);

        // 22 % 11 == 0 -> stride 11
        let seq: Vec<usize> = Probe::start(22, 101, ProbePolicy::DoubleHash)
            .take(3)
            .collect();
        assert_eq!(seq, [22, 33, 44]);
    }

    #[test]
    fn probe_matches_policy_index() {
        for policy in [
            ProbePolicy::Linear,
            ProbePolicy::Quadratic,
            ProbePolicy::DoubleHash,
        ] {
            let hash = 0xDEAD_BEEF_u64;
            let capacity = 211;
            let base = home_slot(hash, capacity);
            for (step, idx) in Probe::start(hash, capacity, policy).enumerate() {
                assert_eq!(idx, policy.index(base, step, capacity, hash));
            }
        }
    }

    #[test]
    fn probe_is_bounded_by_capacity() {
        assert_eq!(Probe::start(7, 101, ProbePolicy::Quadratic).count(), 101);
        assert_eq!(Probe::start(7, 0, ProbePolicy::Linear).count(), 0);
    }

    #[test]
    fn linear_and_double_hash_cover_prime_tables() {
        for policy in [ProbePolicy::Linear, ProbePolicy::DoubleHash] {
            for hash in [0u64, 5, 42, 1_000_003] {
                let mut seen: Vec<usize> = Probe::start(hash, 101, policy).collect();
                seen.sort_unstable();
                seen.dedup();
                assert_eq!(seen.len(), 101, "{policy:?} hash {hash}");
            }
        }
    }

    #[test]
    fn quadratic_covers_at_least_half_of_a_prime_table() {
        let mut seen: Vec<usize> = Probe::start(3, 101, ProbePolicy::Quadratic).collect();
        seen.sort_unstable();
        seen.dedup();
        assert!(seen.len() >= 51, "only {} distinct slots", seen.len());
    }
}
