#![forbid(missing_docs)]
//! Memoizing caches for Vulkan compute pipeline objects.
//!
//! vkpipe sits in front of the driver entry points that create pipeline layouts
//! and compute pipelines. Creating these objects involves driver-side compilation,
//! but the resulting handles can be reused by every dispatch with identical creation
//! parameters, so each distinct key is only ever created once.
//!
//! ## Usage
//! Construct a [`PipelineLayoutCache`](crate::runtime::vk::PipelineLayoutCache) and a
//! [`ComputePipelineCache`](crate::runtime::vk::ComputePipelineCache) once per device,
//! then call `retrieve` with a descriptor whenever a handle is needed. Both caches are
//! `Sync` and may be shared between threads.
//!
//! Handles returned by `retrieve` are owned by the cache. They stay valid until
//! `purge` is called or the cache is dropped, and must never be destroyed by the caller.
//!
//! | **Crate feature** | **Provides**                                   |
//! |-------------------|------------------------------------------------|
//! | `vk`              | The Vulkan caches, built on `ash`              |
//! | `cache`           | Persistent storage for driver pipeline caches  |
//! | `testing`         | A recording mock device                        |

/// Types shared by every runtime.
pub mod common {
    pub use vkpipe_common::map::FastHashMap;
    pub use vkpipe_common::WorkGroupSize;
}

#[cfg(feature = "cache")]
/// Persistent storage for serialized driver pipeline caches.
///
/// Blobs are kept in a SQLite database in the platform cache directory.
pub mod cache {
    pub use vkpipe_cache::cache::*;
    pub use vkpipe_cache::error::CacheError;
    pub use vkpipe_cache::{CacheKey, Cacheable};
}

/// Pipeline cache runtimes.
#[cfg(feature = "runtime")]
pub mod runtime {
    #[cfg(feature = "vk")]
    /// Pipeline layout and compute pipeline caches for Vulkan.
    pub mod vk {
        pub use vkpipe_runtime_vk::*;
    }
}

#[cfg(feature = "vk")]
pub use ash;
