use crate::device::ComputeDevice;
use crate::error;
use ash::vk;

/// An owned pipeline layout built from a single descriptor set layout.
///
/// The layout is released exactly once, either by [`destroy`](Self::destroy)
/// or when the wrapper is dropped.
pub struct VulkanPipelineLayout<D: ComputeDevice> {
    handle: vk::PipelineLayout,
    device: D,
}

impl<D: ComputeDevice> VulkanPipelineLayout<D> {
    pub fn new(
        device: &D,
        descriptor_set_layout: vk::DescriptorSetLayout,
    ) -> error::Result<VulkanPipelineLayout<D>> {
        // TODO: push constant ranges once a caller needs them.
        let set_layouts = [descriptor_set_layout];
        let create_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);

        let handle = unsafe { device.create_pipeline_layout(&create_info)? };

        Ok(VulkanPipelineLayout {
            handle,
            device: device.clone(),
        })
    }

    pub fn handle(&self) -> vk::PipelineLayout {
        self.handle
    }

    /// Release the layout. Does nothing if it was already released.
    pub fn destroy(&mut self) {
        if self.handle == vk::PipelineLayout::null() {
            return;
        }

        unsafe { self.device.destroy_pipeline_layout(self.handle) }
        self.handle = vk::PipelineLayout::null();
    }
}

impl<D: ComputeDevice> Drop for VulkanPipelineLayout<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// An owned driver-side pipeline cache.
pub struct DriverPipelineCache<D: ComputeDevice> {
    handle: vk::PipelineCache,
    device: D,
}

impl<D: ComputeDevice> DriverPipelineCache<D> {
    /// Create a driver pipeline cache, seeded with `initial_data` if it is not empty.
    pub fn new(device: &D, initial_data: &[u8]) -> error::Result<DriverPipelineCache<D>> {
        let create_info = vk::PipelineCacheCreateInfo::default().initial_data(initial_data);
        let handle = unsafe { device.create_pipeline_cache(&create_info)? };

        Ok(DriverPipelineCache {
            handle,
            device: device.clone(),
        })
    }

    pub fn handle(&self) -> vk::PipelineCache {
        self.handle
    }

    /// Serialize the current contents of the driver cache.
    pub fn data(&self) -> error::Result<Vec<u8>> {
        unsafe {
            self.device
                .get_pipeline_cache_data(self.handle)
                .map_err(error::VulkanCacheError::CacheDataUnavailable)
        }
    }

    pub fn destroy(&mut self) {
        if self.handle == vk::PipelineCache::null() {
            return;
        }

        unsafe { self.device.destroy_pipeline_cache(self.handle) }
        self.handle = vk::PipelineCache::null();
    }
}

impl<D: ComputeDevice> Drop for DriverPipelineCache<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDevice;
    use ash::vk::Handle;

    #[test]
    fn layout_is_released_once() {
        let device = RecordingDevice::new();
        let set_layout = vk::DescriptorSetLayout::from_raw(0x10);

        let mut layout = VulkanPipelineLayout::new(&device, set_layout).unwrap();
        assert_ne!(layout.handle(), vk::PipelineLayout::null());

        layout.destroy();
        assert_eq!(layout.handle(), vk::PipelineLayout::null());
        layout.destroy();
        drop(layout);

        assert_eq!(device.layouts_created(), 1);
        assert_eq!(device.layouts_destroyed(), 1);
        assert_eq!(device.invalid_releases(), 0);
    }

    #[test]
    fn layout_uses_one_set_and_no_push_constants() {
        let device = RecordingDevice::new();
        let set_layout = vk::DescriptorSetLayout::from_raw(0x20);
        let _layout = VulkanPipelineLayout::new(&device, set_layout).unwrap();

        let requests = device.layout_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].set_layouts, vec![set_layout]);
        assert_eq!(requests[0].push_constant_range_count, 0);
    }

    #[test]
    fn failed_layout_creation_releases_nothing() {
        let device = RecordingDevice::new();
        device.fail_next_layout(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        let result = VulkanPipelineLayout::new(&device, vk::DescriptorSetLayout::from_raw(0x30));
        assert!(matches!(
            result,
            Err(error::VulkanCacheError::CreationFailed(
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY
            ))
        ));
        assert_eq!(device.layouts_destroyed(), 0);
    }

    #[test]
    fn moved_layout_is_released_once() {
        let device = RecordingDevice::new();
        let layout =
            VulkanPipelineLayout::new(&device, vk::DescriptorSetLayout::from_raw(0x40)).unwrap();
        let handle = layout.handle();

        let moved = layout;
        assert_eq!(moved.handle(), handle);
        drop(moved);

        assert_eq!(device.layouts_destroyed(), 1);
        assert_eq!(device.invalid_releases(), 0);
    }

    #[test]
    fn swap_exchanges_ownership() {
        let device = RecordingDevice::new();
        let mut a =
            VulkanPipelineLayout::new(&device, vk::DescriptorSetLayout::from_raw(0x50)).unwrap();
        let mut b =
            VulkanPipelineLayout::new(&device, vk::DescriptorSetLayout::from_raw(0x51)).unwrap();
        let (ha, hb) = (a.handle(), b.handle());

        std::mem::swap(&mut a, &mut b);
        assert_eq!(a.handle(), hb);
        assert_eq!(b.handle(), ha);

        a.destroy();
        assert!(!device.is_live(hb.as_raw()));
        assert!(device.is_live(ha.as_raw()));
        drop(b);
        assert_eq!(device.invalid_releases(), 0);
    }

    #[test]
    fn driver_cache_is_seeded() {
        let device = RecordingDevice::new();
        let cache = DriverPipelineCache::new(&device, &[1, 2, 3]).unwrap();
        assert_eq!(device.pipeline_cache_seeds(), vec![vec![1, 2, 3]]);
        assert_eq!(cache.data().unwrap(), vec![1, 2, 3]);
        drop(cache);
        assert_eq!(device.pipeline_caches_destroyed(), 1);
    }
}
