use alloc::string::String;
use core::fmt;

/// A cached record: a string key paired with an integer identifier.
///
/// Lookups and removals match on the full `(key, id)` pair, so the same key
/// may be stored several times under different identifiers. Only the key is
/// hashed; the identifier can therefore be rewritten in place without moving
/// the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    key: String,
    id: u32,
}

impl Record {
    /// Creates a new record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_cache::Record;
    /// let record = Record::new("python", 1234);
    /// assert_eq!(record.key(), "python");
    /// assert_eq!(record.id(), 1234);
    /// ```
    pub fn new(key: impl Into<String>, id: u32) -> Self {
        Self {
            key: key.into(),
            id,
        }
    }

    /// Returns the record's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the record's identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub(crate) fn matches(&self, key: &str, id: u32) -> bool {
        self.id == id && self.key == key
    }

    #[inline]
    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.key, self.id)
    }
}

/// One position in a table's slot array.
///
/// `Empty` terminates a probe chain. `Tombstone` keeps the removed record so
/// the chain that runs through it stays intact; it is skipped by lookups and
/// reused by inserts. `Moved` marks a retiring-table slot whose record has
/// already been migrated; like a tombstone it never ends a chain, so records
/// further down the same chain stay reachable until they are migrated too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum Slot {
    #[default]
    Empty,
    Moved,
    Tombstone(Record),
    Live(Record),
}

impl Slot {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// True for slots an insert may claim.
    #[inline]
    pub(crate) fn is_open(&self) -> bool {
        !matches!(self, Slot::Live(_))
    }

    #[inline]
    pub(crate) fn live(&self) -> Option<&Record> {
        match self {
            Slot::Live(record) => Some(record),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn live_mut(&mut self) -> Option<&mut Record> {
        match self {
            Slot::Live(record) => Some(record),
            _ => None,
        }
    }

    /// Flips a live slot to a tombstone. Returns `false` if the slot was not
    /// live.
    pub(crate) fn bury(&mut self) -> bool {
        match core::mem::take(self) {
            Slot::Live(record) => {
                *self = Slot::Tombstone(record);
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => f.write_str("empty"),
            Slot::Moved => f.write_str("moved"),
            Slot::Tombstone(record) => write!(f, "tomb {record}"),
            Slot::Live(record) => write!(f, "live {record}"),
        }
    }
}
