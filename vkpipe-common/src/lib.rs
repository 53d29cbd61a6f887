//! Common types shared by the vkpipe crates.
#[cfg(feature = "vulkan")]
pub mod vk;

pub mod map;

use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

/// The local work group size of a compute dispatch.
///
/// The layout is fixed so that the struct can be handed to the driver
/// directly as specialization data. Each component is addressed by its
/// byte offset within the struct.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct WorkGroupSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorkGroupSize {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        WorkGroupSize { x, y, z }
    }

    /// The total number of invocations in one work group.
    pub fn invocations(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    /// The `(offset, size)` of each component, in `x, y, z` order.
    pub const fn component_layout() -> [(u32, usize); 3] {
        [
            (offset_of!(WorkGroupSize, x) as u32, size_of::<u32>()),
            (offset_of!(WorkGroupSize, y) as u32, size_of::<u32>()),
            (offset_of!(WorkGroupSize, z) as u32, size_of::<u32>()),
        ]
    }

    /// The raw bytes of this work group size, suitable for specialization data.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl From<[u32; 3]> for WorkGroupSize {
    fn from([x, y, z]: [u32; 3]) -> Self {
        WorkGroupSize { x, y, z }
    }
}

impl From<(u32, u32, u32)> for WorkGroupSize {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        WorkGroupSize { x, y, z }
    }
}

impl From<WorkGroupSize> for [u32; 3] {
    fn from(value: WorkGroupSize) -> Self {
        [value.x, value.y, value.z]
    }
}
