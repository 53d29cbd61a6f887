use crate::device::ComputeDevice;
use crate::error;
use ash::vk;
use std::ffi::CStr;
use vkpipe_common::WorkGroupSize;

pub(crate) const ENTRY_POINT: &CStr = c"main";

/// Everything that identifies a compute pipeline.
///
/// Two descriptors are the same pipeline if and only if all three fields are equal.
/// Handle values are compared by value, so a descriptor is only meaningful for
/// the lifetime of the handles it refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PipelineDescriptor {
    pub pipeline_layout: vk::PipelineLayout,
    pub shader_module: vk::ShaderModule,
    /// Specialized into constant IDs 0, 1 and 2.
    pub local_work_group: WorkGroupSize,
}

impl PipelineDescriptor {
    pub fn new(
        pipeline_layout: vk::PipelineLayout,
        shader_module: vk::ShaderModule,
        local_work_group: impl Into<WorkGroupSize>,
    ) -> Self {
        PipelineDescriptor {
            pipeline_layout,
            shader_module,
            local_work_group: local_work_group.into(),
        }
    }
}

fn work_group_specialization_entries() -> [vk::SpecializationMapEntry; 3] {
    let [x, y, z] = WorkGroupSize::component_layout();
    [
        vk::SpecializationMapEntry::default()
            .constant_id(0)
            .offset(x.0)
            .size(x.1),
        vk::SpecializationMapEntry::default()
            .constant_id(1)
            .offset(y.0)
            .size(y.1),
        vk::SpecializationMapEntry::default()
            .constant_id(2)
            .offset(z.0)
            .size(z.1),
    ]
}

/// An owned compute pipeline.
pub struct VulkanComputePipeline<D: ComputeDevice> {
    handle: vk::Pipeline,
    device: D,
}

impl<D: ComputeDevice> VulkanComputePipeline<D> {
    pub fn new(
        device: &D,
        descriptor: &PipelineDescriptor,
        cache: vk::PipelineCache,
    ) -> error::Result<VulkanComputePipeline<D>> {
        let map_entries = work_group_specialization_entries();
        let specialization_info = vk::SpecializationInfo::default()
            .map_entries(&map_entries)
            .data(descriptor.local_work_group.as_bytes());

        let stage = vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::COMPUTE)
            .module(descriptor.shader_module)
            .name(ENTRY_POINT)
            .specialization_info(&specialization_info);

        let pipeline_info = vk::ComputePipelineCreateInfo::default()
            .stage(stage)
            .layout(descriptor.pipeline_layout);

        let handle = unsafe { device.create_compute_pipeline(cache, &pipeline_info)? };

        Ok(VulkanComputePipeline {
            handle,
            device: device.clone(),
        })
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.handle
    }

    /// Release the pipeline. Does nothing if it was already released.
    pub fn destroy(&mut self) {
        if self.handle == vk::Pipeline::null() {
            return;
        }

        unsafe { self.device.destroy_pipeline(self.handle) }
        self.handle = vk::Pipeline::null();
    }
}

impl<D: ComputeDevice> Drop for VulkanComputePipeline<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
