//! Thread-safe caches for Vulkan pipeline layouts and compute pipelines.
//!
//! Creating pipeline objects is expensive, but the objects can be shared by every
//! dispatch that uses the same creation parameters. [`PipelineLayoutCache`] and
//! [`ComputePipelineCache`] create each object once per distinct key and own it
//! until they are purged or dropped.
//!
//! The caches work with any [`ComputeDevice`], which is implemented for [`ash::Device`].
mod device;
mod error;
mod layout_cache;
mod options;
mod pipeline_cache;
mod vulkan_primitives;
mod vulkan_state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use device::ComputeDevice;
pub use error::{Result, VulkanCacheError};
pub use layout_cache::PipelineLayoutCache;
pub use options::PipelineCacheOptions;
pub use pipeline_cache::ComputePipelineCache;
pub use vulkan_primitives::{DriverPipelineCache, VulkanPipelineLayout};
pub use vulkan_state::{PipelineDescriptor, VulkanComputePipeline};
pub use vkpipe_common::WorkGroupSize;
