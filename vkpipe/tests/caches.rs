use ash::vk;
use ash::vk::Handle;
use std::sync::{Arc, Barrier};
use std::time::Duration;
use vkpipe::common::WorkGroupSize;
use vkpipe::runtime::vk::{
    ComputePipelineCache, PipelineCacheOptions, PipelineDescriptor, PipelineLayoutCache,
    VulkanCacheError,
};
use vkpipe_runtime_vk::testing::RecordingDevice;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
pub fn layout_scenario() {
    init_logging();
    let device = RecordingDevice::new();
    let cache = PipelineLayoutCache::new(&device);
    let l1 = vk::DescriptorSetLayout::from_raw(0x1);

    let h1 = cache.retrieve(l1).unwrap();
    assert_eq!(cache.retrieve(l1).unwrap(), h1);
    assert_eq!(device.layouts_created(), 1);

    cache.purge();
    let h2 = cache.retrieve(l1).unwrap();
    assert_ne!(h1, h2);
    assert_eq!(device.layouts_created(), 2);
    assert_eq!(device.layouts_destroyed(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
pub fn pipeline_scenario() {
    init_logging();
    let device = RecordingDevice::new();
    let layouts = PipelineLayoutCache::new(&device);
    let pipelines = ComputePipelineCache::new(&device).unwrap();

    let layout = layouts
        .retrieve(vk::DescriptorSetLayout::from_raw(0x1))
        .unwrap();
    let module = vk::ShaderModule::from_raw(0x2);

    let wide = pipelines
        .retrieve(PipelineDescriptor::new(layout, module, [8, 8, 1]))
        .unwrap();
    let tall = pipelines
        .retrieve(PipelineDescriptor::new(layout, module, WorkGroupSize::new(16, 4, 1)))
        .unwrap();

    assert_ne!(wide, tall);
    assert_eq!(pipelines.len(), 2);

    let requests = device.pipeline_requests();
    assert!(requests.iter().all(|r| r.layout == layout));
    assert!(requests.iter().all(|r| r.entry_point == "main"));
    assert_eq!(
        requests[1].specialization_data,
        WorkGroupSize::new(16, 4, 1).as_bytes().to_vec()
    );
}

#[test]
pub fn distinct_keys_never_share_handles() {
    let device = RecordingDevice::new();
    let pipelines = ComputePipelineCache::new(&device).unwrap();
    let layout_a = vk::PipelineLayout::from_raw(0xA);
    let layout_b = vk::PipelineLayout::from_raw(0xB);
    let module_a = vk::ShaderModule::from_raw(0xC);
    let module_b = vk::ShaderModule::from_raw(0xD);

    let mut handles = Vec::new();
    for layout in [layout_a, layout_b] {
        for module in [module_a, module_b] {
            for wg in [[1, 1, 1], [64, 1, 1]] {
                handles.push(
                    pipelines
                        .retrieve(PipelineDescriptor::new(layout, module, wg))
                        .unwrap(),
                );
            }
        }
    }

    let mut unique = handles.clone();
    unique.sort_by_key(|h| h.as_raw());
    unique.dedup();
    assert_eq!(unique.len(), handles.len());
    assert_eq!(device.pipelines_created(), 8);
}

#[test]
pub fn concurrent_retrieve_and_purge() {
    init_logging();
    const THREADS: usize = 6;
    const ROUNDS: u32 = 25;

    let device = RecordingDevice::new();
    device.set_creation_delay(Duration::from_micros(200));
    let pipelines = Arc::new(ComputePipelineCache::new(&device).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS + 1));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let pipelines = Arc::clone(&pipelines);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let key = PipelineDescriptor::new(
                        vk::PipelineLayout::from_raw(1),
                        vk::ShaderModule::from_raw(2),
                        [t as u32 % 2 + 1, round % 3 + 1, 1],
                    );
                    let handle = pipelines.retrieve(key).unwrap();
                    assert_ne!(handle, vk::Pipeline::null());
                }
            })
        })
        .collect();

    barrier.wait();
    for _ in 0..5 {
        pipelines.purge();
        std::thread::sleep(Duration::from_millis(1));
    }

    for worker in workers {
        worker.join().unwrap();
    }

    drop(pipelines);
    assert_eq!(device.live_objects(), 0);
    assert_eq!(device.invalid_releases(), 0);
    assert_eq!(device.pipelines_created(), device.pipelines_destroyed());
}

#[test]
pub fn creation_failure_is_not_cached() {
    let device = RecordingDevice::new();
    let layouts = PipelineLayoutCache::new(&device);
    let key = vk::DescriptorSetLayout::from_raw(0x5);

    device.fail_next_layout(vk::Result::ERROR_DEVICE_LOST);
    match layouts.retrieve(key) {
        Err(VulkanCacheError::CreationFailed(result)) => {
            assert_eq!(result, vk::Result::ERROR_DEVICE_LOST)
        }
        other => panic!("expected a creation failure, got {other:?}"),
    }
    assert!(!layouts.contains(key));
    assert!(layouts.retrieve(key).is_ok());
}

#[test]
pub fn options_for_device_use_the_cache_uuid() {
    let properties = vk::PhysicalDeviceProperties {
        pipeline_cache_uuid: [9u8; vk::UUID_SIZE],
        ..Default::default()
    };
    let options = PipelineCacheOptions::for_device(&properties);
    assert_eq!(options.persistent_key, Some([9u8; vk::UUID_SIZE]));
    assert!(!options.disable_cache);
}
