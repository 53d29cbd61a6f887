//! Persistent storage for driver pipeline cache blobs.
//!
//! Blobs are stored in a small SQLite database under the platform cache
//! directory, indexed by a type string and a hash of the keys that identify
//! the blob. Compilation results stored here survive across process lifetimes,
//! so that a driver pipeline cache can be seeded with the data from a previous run.
pub mod cache;
pub mod error;

mod cacheable;
mod key;

pub use cacheable::Cacheable;
pub use key::CacheKey;
