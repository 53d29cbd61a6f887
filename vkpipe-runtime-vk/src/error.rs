//! Vulkan cache errors.
use ash::vk;
use thiserror::Error;

/// Cumulative error type for the Vulkan caches.
#[derive(Error, Debug)]
pub enum VulkanCacheError {
    #[error("vulkan object creation failed: {0}")]
    CreationFailed(#[from] vk::Result),
    #[error("could not read pipeline cache data: {0}")]
    CacheDataUnavailable(vk::Result),
    #[error("persistent cache error")]
    PersistentCacheError(#[from] vkpipe_cache::error::CacheError),
}

/// Result type for the Vulkan caches.
pub type Result<T> = std::result::Result<T, VulkanCacheError>;
