//! The driver entry points the caches create and release objects through.
use ash::prelude::VkResult;
use ash::vk;

/// A device that can create and destroy the objects managed by the caches.
///
/// The device is owned outside of the caches and must outlive every cache and
/// wrapper holding a clone of it. Clones must refer to the same device.
///
/// This is implemented for [`ash::Device`].
pub trait ComputeDevice: Clone {
    /// Create a pipeline layout.
    ///
    /// # Safety
    /// `info` and everything it points to must be valid for the duration of the call.
    unsafe fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout>;

    /// Destroy a pipeline layout.
    ///
    /// # Safety
    /// `layout` must have been created by this device and must not be in use.
    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);

    /// Create a driver pipeline cache.
    ///
    /// # Safety
    /// `info` and everything it points to must be valid for the duration of the call.
    unsafe fn create_pipeline_cache(
        &self,
        info: &vk::PipelineCacheCreateInfo<'_>,
    ) -> VkResult<vk::PipelineCache>;

    /// Read back the serialized contents of a driver pipeline cache.
    ///
    /// # Safety
    /// `cache` must have been created by this device.
    unsafe fn get_pipeline_cache_data(&self, cache: vk::PipelineCache) -> VkResult<Vec<u8>>;

    /// Destroy a driver pipeline cache.
    ///
    /// # Safety
    /// `cache` must have been created by this device.
    unsafe fn destroy_pipeline_cache(&self, cache: vk::PipelineCache);

    /// Create a single compute pipeline.
    ///
    /// # Safety
    /// `info` and everything it points to must be valid for the duration of the call.
    unsafe fn create_compute_pipeline(
        &self,
        cache: vk::PipelineCache,
        info: &vk::ComputePipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline>;

    /// Destroy a pipeline.
    ///
    /// # Safety
    /// `pipeline` must have been created by this device and must not be in use.
    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline);
}

impl ComputeDevice for ash::Device {
    unsafe fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout> {
        ash::Device::create_pipeline_layout(self, info, None)
    }

    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        ash::Device::destroy_pipeline_layout(self, layout, None)
    }

    unsafe fn create_pipeline_cache(
        &self,
        info: &vk::PipelineCacheCreateInfo<'_>,
    ) -> VkResult<vk::PipelineCache> {
        ash::Device::create_pipeline_cache(self, info, None)
    }

    unsafe fn get_pipeline_cache_data(&self, cache: vk::PipelineCache) -> VkResult<Vec<u8>> {
        ash::Device::get_pipeline_cache_data(self, cache)
    }

    unsafe fn destroy_pipeline_cache(&self, cache: vk::PipelineCache) {
        ash::Device::destroy_pipeline_cache(self, cache, None)
    }

    unsafe fn create_compute_pipeline(
        &self,
        cache: vk::PipelineCache,
        info: &vk::ComputePipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        // On failure the driver sets every output handle to null, so nothing leaks.
        let pipelines = ash::Device::create_compute_pipelines(
            self,
            cache,
            std::slice::from_ref(info),
            None,
        )
        .map_err(|(_, e)| e)?;

        pipelines
            .into_iter()
            .next()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        ash::Device::destroy_pipeline(self, pipeline, None)
    }
}
