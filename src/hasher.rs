use core::hash::BuildHasher;

/// Hash capability injected into a [`Cache`](crate::Cache).
///
/// Implementations must be pure: the same key has to produce the same code
/// for the lifetime of the cache, otherwise records become unreachable. Any
/// `Fn(&str) -> u64` qualifies.
pub trait KeyHasher {
    /// Hashes `key`.
    fn hash_key(&self, key: &str) -> u64;
}

impl<F> KeyHasher for F
where
    F: Fn(&str) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        self(key)
    }
}

/// Adapts any [`BuildHasher`] into a [`KeyHasher`].
///
/// # Examples
///
/// ```rust
/// # use core::hash::BuildHasherDefault;
/// # use prime_cache::hasher::{BuildKeyHasher, KeyHasher};
/// # use siphasher::sip::SipHasher;
/// let hasher = BuildKeyHasher::new(BuildHasherDefault::<SipHasher>::default());
/// assert_eq!(hasher.hash_key("rust"), hasher.hash_key("rust"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildKeyHasher<S> {
    build: S,
}

impl<S> BuildKeyHasher<S> {
    /// Wraps `build`.
    pub fn new(build: S) -> Self {
        Self { build }
    }
}

impl<S: BuildHasher> KeyHasher for BuildKeyHasher<S> {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        self.build.hash_one(key)
    }
}

/// The classic multiply-by-33 string hash.
///
/// Weak and trivially collidable, but fully deterministic across runs and
/// platforms, which makes probe sequences reproducible in tests and dumps.
///
/// # Examples
///
/// ```rust
/// # use prime_cache::hasher::{KeyHasher, Times33};
/// assert_eq!(Times33.hash_key(""), 0);
/// assert_eq!(Times33.hash_key("ab"), 97 * 33 + 98);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Times33;

impl KeyHasher for Times33 {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        key.bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(33).wrapping_add(b as u32)) as u64
    }
}

/// Fixed-seed foldhash, the default hasher when the `foldhash` feature is
/// enabled.
#[cfg(feature = "foldhash")]
#[derive(Debug, Clone, Default)]
pub struct FoldKeyHasher {
    state: foldhash::fast::FixedState,
}

#[cfg(feature = "foldhash")]
impl FoldKeyHasher {
    /// Creates a hasher with an explicit seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: foldhash::fast::FixedState::with_seed(seed),
        }
    }
}

#[cfg(feature = "foldhash")]
impl KeyHasher for FoldKeyHasher {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        self.state.hash_one(key)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher used when none is supplied.
        pub type DefaultKeyHasher = FoldKeyHasher;
    } else if #[cfg(feature = "std")] {
        /// Hasher used when none is supplied.
        pub type DefaultKeyHasher = BuildKeyHasher<std::hash::RandomState>;
    } else {
        /// Hasher used when none is supplied.
        pub type DefaultKeyHasher = Times33;
    }
}
