use crate::device::ComputeDevice;
use crate::error;
use crate::vulkan_primitives::VulkanPipelineLayout;
use ash::vk;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use tracing::{debug, trace};
use vkpipe_common::map::FastHashMap;

/// A thread-safe cache of pipeline layouts, keyed by descriptor set layout.
///
/// Layouts are created on the first request for a key and live until the
/// cache is purged or dropped. Handles returned by [`retrieve`](Self::retrieve)
/// are only valid until then.
pub struct PipelineLayoutCache<D: ComputeDevice> {
    device: D,
    cache: Mutex<FastHashMap<vk::DescriptorSetLayout, VulkanPipelineLayout<D>>>,
}

impl<D: ComputeDevice> PipelineLayoutCache<D> {
    pub fn new(device: &D) -> Self {
        PipelineLayoutCache {
            device: device.clone(),
            cache: Mutex::new(FastHashMap::default()),
        }
    }

    /// Get the pipeline layout for `key`, creating it if it is not cached.
    ///
    /// The lock is held across creation, so concurrent requests for the same
    /// key create the layout at most once.
    pub fn retrieve(&self, key: vk::DescriptorSetLayout) -> error::Result<vk::PipelineLayout> {
        let mut cache = self.cache.lock();

        match cache.entry(key) {
            Entry::Occupied(entry) => {
                trace!(?key, "pipeline layout cache hit");
                Ok(entry.get().handle())
            }
            Entry::Vacant(entry) => {
                let layout = VulkanPipelineLayout::new(&self.device, key)?;
                let handle = layout.handle();
                entry.insert(layout);
                debug!(?key, ?handle, "created pipeline layout");
                Ok(handle)
            }
        }
    }

    /// Destroy every cached layout.
    ///
    /// Any handle previously returned by [`retrieve`](Self::retrieve) is invalid afterwards.
    pub fn purge(&self) {
        let mut cache = self.cache.lock();
        let count = cache.len();
        cache.clear();
        debug!(count, "purged pipeline layout cache");
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn contains(&self, key: vk::DescriptorSetLayout) -> bool {
        self.cache.lock().contains_key(&key)
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}
