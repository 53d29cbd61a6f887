/// Fast hash map type for handle-keyed tables.
pub type FastHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

pub use rustc_hash::FxHasher;
