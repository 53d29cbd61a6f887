//! A recording [`ComputeDevice`] for tests that run without a GPU.
//!
//! Every object it creates gets a fresh non-null raw handle. The device keeps
//! track of which handles are live, so releasing a handle twice (or releasing a
//! handle it never handed out) is counted instead of silently passing.
use crate::device::ComputeDevice;
use ash::prelude::VkResult;
use ash::vk;
use ash::vk::Handle;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ffi::CStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A recorded `vkCreatePipelineLayout` call.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub set_layouts: Vec<vk::DescriptorSetLayout>,
    pub push_constant_range_count: u32,
    pub handle: vk::PipelineLayout,
}

/// A recorded `vkCreateComputePipelines` call.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub pipeline_cache: vk::PipelineCache,
    pub layout: vk::PipelineLayout,
    pub module: vk::ShaderModule,
    pub stage: vk::ShaderStageFlags,
    pub entry_point: String,
    /// `(constant_id, offset, size)` for each map entry.
    pub specialization_entries: Vec<(u32, u32, usize)>,
    pub specialization_data: Vec<u8>,
    pub handle: vk::Pipeline,
}

#[derive(Default)]
struct Recorder {
    live: FxHashSet<u64>,
    layout_requests: Vec<LayoutRequest>,
    pipeline_requests: Vec<PipelineRequest>,
    cache_seeds: Vec<Vec<u8>>,
    cache_contents: FxHashMap<u64, Vec<u8>>,
    layouts_destroyed: usize,
    pipelines_destroyed: usize,
    caches_destroyed: usize,
    invalid_releases: usize,
    fail_layout: Option<vk::Result>,
    fail_pipeline: Option<vk::Result>,
    fail_cache: Vec<vk::Result>,
    creation_delay: Option<Duration>,
}

struct Shared {
    next_handle: AtomicU64,
    recorder: Mutex<Recorder>,
}

/// A mock device that records every call made through [`ComputeDevice`].
///
/// Clones share the same recording.
#[derive(Clone)]
pub struct RecordingDevice {
    shared: Arc<Shared>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    pub fn new() -> Self {
        RecordingDevice {
            shared: Arc::new(Shared {
                next_handle: AtomicU64::new(0x1000),
                recorder: Mutex::new(Recorder::default()),
            }),
        }
    }

    /// Fail the next pipeline layout creation with `result`.
    pub fn fail_next_layout(&self, result: vk::Result) {
        self.shared.recorder.lock().fail_layout = Some(result);
    }

    /// Fail the next compute pipeline creation with `result`.
    pub fn fail_next_pipeline(&self, result: vk::Result) {
        self.shared.recorder.lock().fail_pipeline = Some(result);
    }

    /// Fail the next driver pipeline cache creations, in order.
    pub fn fail_next_pipeline_caches(&self, results: &[vk::Result]) {
        self.shared.recorder.lock().fail_cache = results.to_vec();
    }

    /// Sleep for `delay` inside every layout and pipeline creation.
    pub fn set_creation_delay(&self, delay: Duration) {
        self.shared.recorder.lock().creation_delay = Some(delay);
    }

    pub fn layout_requests(&self) -> Vec<LayoutRequest> {
        self.shared.recorder.lock().layout_requests.clone()
    }

    pub fn pipeline_requests(&self) -> Vec<PipelineRequest> {
        self.shared.recorder.lock().pipeline_requests.clone()
    }

    /// The initial data passed to every driver pipeline cache creation.
    pub fn pipeline_cache_seeds(&self) -> Vec<Vec<u8>> {
        self.shared.recorder.lock().cache_seeds.clone()
    }

    pub fn layouts_created(&self) -> usize {
        self.shared.recorder.lock().layout_requests.len()
    }

    pub fn layouts_destroyed(&self) -> usize {
        self.shared.recorder.lock().layouts_destroyed
    }

    pub fn pipelines_created(&self) -> usize {
        self.shared.recorder.lock().pipeline_requests.len()
    }

    pub fn pipelines_destroyed(&self) -> usize {
        self.shared.recorder.lock().pipelines_destroyed
    }

    pub fn pipeline_caches_created(&self) -> usize {
        self.shared.recorder.lock().cache_seeds.len()
    }

    pub fn pipeline_caches_destroyed(&self) -> usize {
        self.shared.recorder.lock().caches_destroyed
    }

    /// Releases of null, unknown or already released handles.
    pub fn invalid_releases(&self) -> usize {
        self.shared.recorder.lock().invalid_releases
    }

    /// The number of objects created and not yet released.
    pub fn live_objects(&self) -> usize {
        self.shared.recorder.lock().live.len()
    }

    pub fn is_live(&self, raw: u64) -> bool {
        self.shared.recorder.lock().live.contains(&raw)
    }

    fn next_handle(&self) -> u64 {
        self.shared.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    fn release(&self, raw: u64) -> bool {
        let mut recorder = self.shared.recorder.lock();
        if recorder.live.remove(&raw) {
            true
        } else {
            recorder.invalid_releases += 1;
            false
        }
    }

    fn creation_delay(&self) -> Option<Duration> {
        self.shared.recorder.lock().creation_delay
    }
}

impl ComputeDevice for RecordingDevice {
    unsafe fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout> {
        if let Some(delay) = self.creation_delay() {
            std::thread::sleep(delay);
        }

        let mut recorder = self.shared.recorder.lock();
        if let Some(result) = recorder.fail_layout.take() {
            return Err(result);
        }

        let set_layouts = if info.set_layout_count == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(info.p_set_layouts, info.set_layout_count as usize).to_vec()
        };

        let handle = vk::PipelineLayout::from_raw(self.next_handle());
        recorder.live.insert(handle.as_raw());
        recorder.layout_requests.push(LayoutRequest {
            set_layouts,
            push_constant_range_count: info.push_constant_range_count,
            handle,
        });
        Ok(handle)
    }

    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        if self.release(layout.as_raw()) {
            self.shared.recorder.lock().layouts_destroyed += 1;
        }
    }

    unsafe fn create_pipeline_cache(
        &self,
        info: &vk::PipelineCacheCreateInfo<'_>,
    ) -> VkResult<vk::PipelineCache> {
        let mut recorder = self.shared.recorder.lock();
        if !recorder.fail_cache.is_empty() {
            return Err(recorder.fail_cache.remove(0));
        }

        let seed = if info.initial_data_size == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(info.p_initial_data.cast::<u8>(), info.initial_data_size)
                .to_vec()
        };

        let handle = vk::PipelineCache::from_raw(self.next_handle());
        recorder.live.insert(handle.as_raw());
        recorder.cache_contents.insert(handle.as_raw(), seed.clone());
        recorder.cache_seeds.push(seed);
        Ok(handle)
    }

    unsafe fn get_pipeline_cache_data(&self, cache: vk::PipelineCache) -> VkResult<Vec<u8>> {
        let recorder = self.shared.recorder.lock();
        recorder
            .cache_contents
            .get(&cache.as_raw())
            .cloned()
            .ok_or(vk::Result::ERROR_UNKNOWN)
    }

    unsafe fn destroy_pipeline_cache(&self, cache: vk::PipelineCache) {
        if self.release(cache.as_raw()) {
            let mut recorder = self.shared.recorder.lock();
            recorder.cache_contents.remove(&cache.as_raw());
            recorder.caches_destroyed += 1;
        }
    }

    unsafe fn create_compute_pipeline(
        &self,
        cache: vk::PipelineCache,
        info: &vk::ComputePipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        if let Some(delay) = self.creation_delay() {
            std::thread::sleep(delay);
        }

        let mut recorder = self.shared.recorder.lock();
        if let Some(result) = recorder.fail_pipeline.take() {
            return Err(result);
        }

        let (specialization_entries, specialization_data) =
            match info.stage.p_specialization_info.as_ref() {
                Some(spec) => {
                    let entries = if spec.map_entry_count == 0 {
                        Vec::new()
                    } else {
                        std::slice::from_raw_parts(spec.p_map_entries, spec.map_entry_count as usize)
                            .iter()
                            .map(|e| (e.constant_id, e.offset, e.size))
                            .collect()
                    };
                    let data = if spec.data_size == 0 {
                        Vec::new()
                    } else {
                        std::slice::from_raw_parts(spec.p_data.cast::<u8>(), spec.data_size).to_vec()
                    };
                    (entries, data)
                }
                None => (Vec::new(), Vec::new()),
            };

        let entry_point = CStr::from_ptr(info.stage.p_name)
            .to_string_lossy()
            .into_owned();

        let handle = vk::Pipeline::from_raw(self.next_handle());
        recorder.live.insert(handle.as_raw());

        // Pipelines built through a driver cache leave a trace in its contents.
        if let Some(contents) = recorder.cache_contents.get_mut(&cache.as_raw()) {
            contents.extend_from_slice(&handle.as_raw().to_le_bytes());
        }

        recorder.pipeline_requests.push(PipelineRequest {
            pipeline_cache: cache,
            layout: info.layout,
            module: info.stage.module,
            stage: info.stage.stage,
            entry_point,
            specialization_entries,
            specialization_data,
            handle,
        });
        Ok(handle)
    }

    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        if self.release(pipeline.as_raw()) {
            self.shared.recorder.lock().pipelines_destroyed += 1;
        }
    }
}
