/// Reasons a [`Cache`](crate::Cache) operation can be rejected.
///
/// Every failure is local: the cache is left exactly as it was before the
/// call and can keep serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The identifier lies outside the cache's configured range.
    #[error("identifier {id} outside of [{min}, {max}]")]
    IdOutOfRange {
        /// The rejected identifier.
        id: u32,
        /// Lower bound, inclusive.
        min: u32,
        /// Upper bound, inclusive.
        max: u32,
    },
    /// An identical `(key, id)` record is already live.
    #[error("record is already present")]
    Duplicate,
    /// No live record matches the given `(key, id)`.
    #[error("record not found")]
    NotFound,
    /// A full probe sweep of the active table found no open slot.
    #[error("no open slot within {capacity} probes")]
    Exhausted {
        /// Capacity of the table that was swept.
        capacity: usize,
    },
}
