//! The dual-table record cache.
//!
//! A [`Cache`] owns an *active* table that takes every new write and, while a
//! resize is in flight, a *retiring* table that is drained into the active one
//! a slice at a time. Each successful insert or remove advances the drain, so
//! the cost of a resize is spread over at most four mutating calls instead of
//! being paid all at once.

use core::fmt;
use core::fmt::Debug;
use core::ops::RangeInclusive;

use crate::config::CacheBuilder;
use crate::error::CacheError;
use crate::hasher::DefaultKeyHasher;
use crate::hasher::KeyHasher;
use crate::prime;
use crate::probe::ProbePolicy;
use crate::record::Record;
use crate::table::Table;

mod rehash;

pub use rehash::LOAD_FACTOR_LIMIT;
pub use rehash::TOMBSTONE_RATIO_LIMIT;

/// An open-addressed cache of [`Record`]s with incremental resizing.
///
/// Records are identified by their `(key, id)` pair and only the key is
/// hashed. Removal is lazy: the slot becomes a tombstone that lookups skip
/// and inserts may reuse, and tombstones are only reclaimed by a resize.
///
/// A resize starts when the active table's load factor exceeds
/// [`LOAD_FACTOR_LIMIT`] after an insert, or its tombstone ratio exceeds
/// [`TOMBSTONE_RATIO_LIMIT`] after a remove. The new table is sized to the
/// smallest prime at least four times the number of surviving records.
///
/// The cache is single-threaded; wrap it in a lock to share it.
///
/// # Examples
///
/// ```rust
/// # use prime_cache::{Cache, CacheError, ProbePolicy, Record};
/// # use prime_cache::hasher::Times33;
/// let mut cache = Cache::new(101, Times33, ProbePolicy::DoubleHash);
///
/// cache.insert(Record::new("rust", 1234))?;
/// assert_eq!(cache.find("rust", 1234), Some(Record::new("rust", 1234)));
///
/// cache.update_id("rust", 1234, 4321)?;
/// assert_eq!(cache.find("rust", 1234), None);
///
/// cache.remove("rust", 4321)?;
/// assert_eq!(cache.remove("rust", 4321), Err(CacheError::NotFound));
/// # Ok::<(), CacheError>(())
/// ```
#[derive(Clone)]
pub struct Cache<H = DefaultKeyHasher> {
    hasher: H,
    active: Table,
    retiring: Option<Table>,
    // Next retiring slot to migrate.
    cursor: usize,
    // Policy for the table allocated by the next resize.
    pending_policy: ProbePolicy,
    len: usize,
    min_id: u32,
    max_id: u32,
}

impl<H> Debug for Cache<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.len)
            .field("capacity", &self.active.capacity())
            .field("occupied", &self.active.occupied())
            .field("tombstones", &self.active.tombstones())
            .field("policy", &self.active.policy())
            .field("pending_policy", &self.pending_policy)
            .field(
                "retiring_capacity",
                &self.retiring.as_ref().map(Table::capacity),
            )
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl Cache<DefaultKeyHasher> {
    /// Starts building a cache with the default hasher.
    pub fn builder() -> CacheBuilder<DefaultKeyHasher> {
        CacheBuilder::new()
    }
}

impl<H: KeyHasher + Default> Default for Cache<H> {
    fn default() -> Self {
        Self::new(prime::MINPRIME, H::default(), ProbePolicy::default())
    }
}

impl<H: KeyHasher> Cache<H> {
    /// Creates a cache accepting identifiers in `[MINID, MAXID]`.
    ///
    /// `capacity` is clamped into `[MINPRIME, MAXPRIME]` and rounded up to a
    /// prime.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_cache::{Cache, ProbePolicy};
    /// let cache = Cache::new(150, |key: &str| key.len() as u64, ProbePolicy::Linear);
    /// assert_eq!(cache.capacity(), 151);
    /// assert!(cache.is_empty());
    /// ```
    ///
    /// [`MINID`]: crate::config::MINID
    /// [`MAXID`]: crate::config::MAXID
    pub fn new(capacity: usize, hasher: H, policy: ProbePolicy) -> Self {
        Self::from_parts(
            capacity,
            hasher,
            policy,
            crate::config::MINID..=crate::config::MAXID,
        )
    }

    pub(crate) fn from_parts(
        capacity: usize,
        hasher: H,
        policy: ProbePolicy,
        ids: RangeInclusive<u32>,
    ) -> Self {
        Self {
            hasher,
            active: Table::with_capacity(prime::capacity_for(capacity), policy),
            retiring: None,
            cursor: 0,
            pending_policy: policy,
            len: 0,
            min_id: *ids.start(),
            max_id: *ids.end(),
        }
    }

    /// Inserts a record.
    ///
    /// # Errors
    ///
    /// - [`CacheError::IdOutOfRange`] if the identifier is outside the
    ///   configured range.
    /// - [`CacheError::Duplicate`] if the same `(key, id)` is already live in
    ///   either table.
    /// - [`CacheError::Exhausted`] if no open slot was found within
    ///   `capacity` probes of the active table.
    ///
    /// Nothing is modified when an error is returned.
    pub fn insert(&mut self, record: Record) -> Result<(), CacheError> {
        self.check_id(record.id())?;

        let hash = self.hasher.hash_key(record.key());
        if self.lookup(hash, record.key(), record.id()).is_some() {
            return Err(CacheError::Duplicate);
        }

        if let Err(record) = self.active.place(hash, record) {
            let capacity = self.active.capacity();
            tracing::warn!(
                key = record.key(),
                id = record.id(),
                capacity,
                "no open slot in active table"
            );
            return Err(CacheError::Exhausted { capacity });
        }
        self.len += 1;

        if self.retiring.is_none() && self.active.load_factor() > LOAD_FACTOR_LIMIT {
            self.begin_resize(rehash::Trigger::LoadFactor);
        }
        self.advance_resize();

        Ok(())
    }

    /// Removes the live record `(key, id)`.
    ///
    /// The slot is turned into a tombstone. Removing from the active table
    /// may start a resize; removing a not-yet-migrated record from the
    /// retiring table never does.
    ///
    /// # Errors
    ///
    /// [`CacheError::IdOutOfRange`] for an out-of-range identifier and
    /// [`CacheError::NotFound`] if no such record is live.
    pub fn remove(&mut self, key: &str, id: u32) -> Result<(), CacheError> {
        self.check_id(id)?;

        let hash = self.hasher.hash_key(key);
        if self.active.bury(hash, key, id) {
            self.len -= 1;
            if self.retiring.is_none() && self.active.tombstone_ratio() > TOMBSTONE_RATIO_LIMIT
            {
                self.begin_resize(rehash::Trigger::Tombstones);
            }
            self.advance_resize();
            return Ok(());
        }

        if let Some(retiring) = self.retiring.as_mut()
            && retiring.bury(hash, key, id)
        {
            self.len -= 1;
            self.advance_resize();
            return Ok(());
        }

        Err(CacheError::NotFound)
    }

    /// Returns a copy of the live record `(key, id)`, or `None` if it is
    /// absent or its identifier is out of range.
    pub fn find(&self, key: &str, id: u32) -> Option<Record> {
        self.get(key, id).cloned()
    }

    /// Returns a reference to the live record `(key, id)`.
    pub fn get(&self, key: &str, id: u32) -> Option<&Record> {
        if self.check_id(id).is_err() {
            return None;
        }
        self.lookup(self.hasher.hash_key(key), key, id)
    }

    /// Returns `true` if the record `(key, id)` is live.
    pub fn contains(&self, key: &str, id: u32) -> bool {
        self.get(key, id).is_some()
    }

    /// Rewrites the identifier of the live record `(key, id)` in place.
    ///
    /// The record keeps its slot since only the key is hashed. Updating to
    /// the current identifier succeeds without changes.
    ///
    /// # Errors
    ///
    /// - [`CacheError::IdOutOfRange`] if `new_id` is outside the configured
    ///   range.
    /// - [`CacheError::NotFound`] if `(key, id)` is not live.
    /// - [`CacheError::Duplicate`] if `(key, new_id)` is already live.
    pub fn update_id(&mut self, key: &str, id: u32, new_id: u32) -> Result<(), CacheError> {
        self.check_id(new_id)?;

        let hash = self.hasher.hash_key(key);
        if self.lookup(hash, key, id).is_none() {
            return Err(CacheError::NotFound);
        }
        if new_id == id {
            return Ok(());
        }
        if self.lookup(hash, key, new_id).is_some() {
            return Err(CacheError::Duplicate);
        }

        let record = match self.active.get_mut(hash, key, id) {
            Some(record) => record,
            None => self
                .retiring
                .as_mut()
                .and_then(|table| table.get_mut(hash, key, id))
                .ok_or(CacheError::NotFound)?,
        };
        record.set_id(new_id);

        Ok(())
    }

    /// Sets the probing policy for the table allocated by the next resize.
    ///
    /// Tables that already exist keep probing the way they were created.
    pub fn set_probe_policy(&mut self, policy: ProbePolicy) {
        self.pending_policy = policy;
    }

    /// Probing policy of the active table.
    pub fn probe_policy(&self) -> ProbePolicy {
        self.active.policy()
    }

    /// Policy the next resize will allocate its table with.
    pub fn pending_probe_policy(&self) -> ProbePolicy {
        self.pending_policy
    }

    /// Occupied slots of the active table divided by its capacity.
    ///
    /// Removal does not lower this; only a resize does.
    pub fn load_factor(&self) -> f32 {
        self.active.load_factor()
    }

    /// Tombstones of the active table divided by its occupied slots, or `0.0`
    /// for a table that was never written to.
    pub fn tombstone_ratio(&self) -> f32 {
        self.active.tombstone_ratio()
    }

    /// Number of live records across both tables.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no record is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity of the active table. Always prime.
    pub fn capacity(&self) -> usize {
        self.active.capacity()
    }

    /// Returns `true` while a retiring table is being drained.
    pub fn is_resizing(&self) -> bool {
        self.retiring.is_some()
    }

    /// The inclusive range of accepted identifiers.
    pub fn id_range(&self) -> RangeInclusive<u32> {
        self.min_id..=self.max_id
    }

    /// Iterates over every live record, those still awaiting migration first.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.retiring
            .iter()
            .flat_map(|table| table.iter())
            .chain(self.active.iter())
    }

    /// Slot-by-slot listing of both tables, for debugging.
    ///
    /// The format is not stable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_cache::{Cache, ProbePolicy, Record};
    /// # use prime_cache::hasher::Times33;
    /// let mut cache = Cache::new(101, Times33, ProbePolicy::Linear);
    /// cache.insert(Record::new("c", 1000)).unwrap();
    /// let dump = cache.dump().to_string();
    /// assert!(dump.contains("[99] : live c#1000"));
    /// ```
    pub fn dump(&self) -> Dump<'_> {
        Dump {
            active: &self.active,
            retiring: self.retiring.as_ref(),
        }
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn tables(&self) -> (&Table, Option<&Table>) {
        (&self.active, self.retiring.as_ref())
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn transfer_cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn hash_of(&self, key: &str) -> u64 {
        self.hasher.hash_key(key)
    }

    fn check_id(&self, id: u32) -> Result<(), CacheError> {
        if id < self.min_id || id > self.max_id {
            return Err(CacheError::IdOutOfRange {
                id,
                min: self.min_id,
                max: self.max_id,
            });
        }
        Ok(())
    }

    fn lookup(&self, hash: u64, key: &str, id: u32) -> Option<&Record> {
        self.active.get(hash, key, id).or_else(|| {
            self.retiring
                .as_ref()
                .and_then(|table| table.get(hash, key, id))
        })
    }
}

/// Display adapter returned by [`Cache::dump`].
pub struct Dump<'a> {
    active: &'a Table,
    retiring: Option<&'a Table>,
}

impl Dump<'_> {
    fn write_table(f: &mut fmt::Formatter<'_>, name: &str, table: &Table) -> fmt::Result {
        writeln!(
            f,
            "{name} table (capacity {}, {:?}, occupied {}, tombstones {}):",
            table.capacity(),
            table.policy(),
            table.occupied(),
            table.tombstones()
        )?;
        for (idx, slot) in table.slots().iter().enumerate() {
            writeln!(f, "[{idx}] : {slot}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_table(f, "active", self.active)?;
        match self.retiring {
            Some(table) => Self::write_table(f, "retiring", table),
            None => writeln!(f, "retiring table: none"),
        }
    }
}
