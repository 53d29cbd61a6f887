//! Vulkan conversions for common types.
use crate::WorkGroupSize;
use ash::vk;

impl From<vk::Extent3D> for WorkGroupSize {
    fn from(value: vk::Extent3D) -> Self {
        WorkGroupSize::new(value.width, value.height, value.depth)
    }
}

impl From<WorkGroupSize> for vk::Extent3D {
    fn from(value: WorkGroupSize) -> Self {
        vk::Extent3D {
            width: value.x,
            height: value.y,
            depth: value.z,
        }
    }
}
