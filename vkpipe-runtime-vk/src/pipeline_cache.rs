use crate::device::ComputeDevice;
use crate::error;
use crate::options::PipelineCacheOptions;
use crate::vulkan_primitives::DriverPipelineCache;
use crate::vulkan_state::{PipelineDescriptor, VulkanComputePipeline};
use ash::vk;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use tracing::{debug, trace, warn};
use vkpipe_cache::cache::Connection;
use vkpipe_common::map::FastHashMap;

const PERSISTENT_INDEX: &str = "vk_pipeline_cache";

/// A thread-safe cache of compute pipelines, keyed by [`PipelineDescriptor`].
///
/// Every pipeline is built through a single driver pipeline cache owned by this
/// cache, which outlives [`purge`](Self::purge) and is destroyed when the cache is dropped.
pub struct ComputePipelineCache<D: ComputeDevice> {
    device: D,
    // Declared before the driver cache so pipelines are released first.
    cache: Mutex<FastHashMap<PipelineDescriptor, VulkanComputePipeline<D>>>,
    pipeline_cache: DriverPipelineCache<D>,
    persistent_key: Option<[u8; vk::UUID_SIZE]>,
    cache_dir: Option<PathBuf>,
}

impl<D: ComputeDevice> ComputePipelineCache<D> {
    /// Create a pipeline cache with an empty driver cache.
    pub fn new(device: &D) -> error::Result<Self> {
        Self::new_with_options(device, &PipelineCacheOptions::default())
    }

    /// Create a pipeline cache, seeding the driver cache from the options or
    /// from the persistent cache.
    pub fn new_with_options(device: &D, options: &PipelineCacheOptions) -> error::Result<Self> {
        let initial_data = load_initial_data(options);

        let pipeline_cache = match initial_data {
            Some(data) if !data.is_empty() => {
                match DriverPipelineCache::new(device, &data) {
                    Ok(cache) => {
                        debug!(bytes = data.len(), "seeded driver pipeline cache");
                        cache
                    }
                    Err(e) => {
                        warn!("driver rejected pipeline cache data, starting empty: {e}");
                        DriverPipelineCache::new(device, &[])?
                    }
                }
            }
            _ => DriverPipelineCache::new(device, &[])?,
        };

        Ok(ComputePipelineCache {
            device: device.clone(),
            cache: Mutex::new(FastHashMap::default()),
            pipeline_cache,
            persistent_key: options.persistence().copied(),
            cache_dir: options.cache_dir.clone(),
        })
    }

    /// Get the compute pipeline for `key`, creating it if it is not cached.
    ///
    /// The lock is held across creation, so concurrent requests for the same
    /// key create the pipeline at most once.
    pub fn retrieve(&self, key: PipelineDescriptor) -> error::Result<vk::Pipeline> {
        let mut cache = self.cache.lock();

        match cache.entry(key) {
            Entry::Occupied(entry) => {
                trace!(?key, "compute pipeline cache hit");
                Ok(entry.get().handle())
            }
            Entry::Vacant(entry) => {
                let pipeline =
                    VulkanComputePipeline::new(&self.device, &key, self.pipeline_cache.handle())?;
                let handle = pipeline.handle();
                entry.insert(pipeline);
                debug!(?key, ?handle, "created compute pipeline");
                Ok(handle)
            }
        }
    }

    /// Destroy every cached pipeline.
    ///
    /// The driver pipeline cache is kept. Any handle previously returned by
    /// [`retrieve`](Self::retrieve) is invalid afterwards.
    pub fn purge(&self) {
        let mut cache = self.cache.lock();
        let count = cache.len();
        cache.clear();
        debug!(count, "purged compute pipeline cache");
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn contains(&self, key: &PipelineDescriptor) -> bool {
        self.cache.lock().contains_key(key)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// The driver pipeline cache every pipeline is created through.
    pub fn pipeline_cache(&self) -> vk::PipelineCache {
        self.pipeline_cache.handle()
    }

    /// Serialize the contents of the driver pipeline cache.
    pub fn pipeline_cache_data(&self) -> error::Result<Vec<u8>> {
        // Creation happens under the table lock, so take it here too.
        let _cache = self.cache.lock();
        self.pipeline_cache.data()
    }

    /// Write the driver pipeline cache data to the persistent cache.
    ///
    /// Returns `false` without doing anything if persistence is not configured.
    pub fn persist(&self) -> error::Result<bool> {
        let Some(key) = &self.persistent_key else {
            return Ok(false);
        };

        let data = self.pipeline_cache_data()?;
        let conn = open_persistent_cache(self.cache_dir.as_deref())?;
        vkpipe_cache::cache::cache_blob(&conn, PERSISTENT_INDEX, &[key], &data)?;
        debug!(bytes = data.len(), "persisted driver pipeline cache");
        Ok(true)
    }
}

impl<D: ComputeDevice> Drop for ComputePipelineCache<D> {
    fn drop(&mut self) {
        self.cache.get_mut().clear();
        self.pipeline_cache.destroy();
    }
}

fn open_persistent_cache(
    cache_dir: Option<&std::path::Path>,
) -> Result<Connection, vkpipe_cache::error::CacheError> {
    match cache_dir {
        Some(dir) => vkpipe_cache::cache::open_cache(dir),
        None => vkpipe_cache::cache::get_cache(),
    }
}

fn load_initial_data(options: &PipelineCacheOptions) -> Option<Vec<u8>> {
    if let Some(data) = &options.initial_data {
        return Some(data.clone());
    }

    let key = options.persistence()?;
    let conn = match open_persistent_cache(options.cache_dir.as_deref()) {
        Ok(conn) => conn,
        Err(e) => {
            warn!("could not open the persistent pipeline cache: {e}");
            return None;
        }
    };

    vkpipe_cache::cache::get_cached_blob(&conn, PERSISTENT_INDEX, &[key])
}
