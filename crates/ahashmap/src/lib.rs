//! `HashMap` / `HashSet` aliases that hash with `ahash` instead of SipHash.

#[cfg(feature = "ahash")]
pub type RandomState = ahash::RandomState;
#[cfg(not(feature = "ahash"))]
pub type RandomState = std::collections::hash_map::RandomState;

pub type AHashMap<K, V> = std::collections::HashMap<K, V, RandomState>;
pub type AHashSet<K> = std::collections::HashSet<K, RandomState>;
