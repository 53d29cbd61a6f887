use ash::vk;
use std::path::PathBuf;

/// Options for compute pipeline cache creation.
#[derive(Debug, Clone, Default)]
pub struct PipelineCacheOptions {
    /// Serialized driver pipeline cache data to seed the driver cache with.
    ///
    /// Takes precedence over the persistent cache.
    pub initial_data: Option<Vec<u8>>,
    /// The key the driver cache data is persisted under, usually the
    /// `pipelineCacheUUID` of the physical device.
    ///
    /// Without a key, nothing is loaded from or written to the persistent cache.
    pub persistent_key: Option<[u8; vk::UUID_SIZE]>,
    /// Whether or not to bypass the persistent cache entirely.
    pub disable_cache: bool,
    /// Directory to keep the persistent cache in, instead of the platform cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl PipelineCacheOptions {
    /// Options that persist driver cache data for the given physical device.
    pub fn for_device(properties: &vk::PhysicalDeviceProperties) -> Self {
        PipelineCacheOptions {
            persistent_key: Some(properties.pipeline_cache_uuid),
            ..Default::default()
        }
    }

    pub(crate) fn persistence(&self) -> Option<&[u8; vk::UUID_SIZE]> {
        if self.disable_cache {
            return None;
        }
        self.persistent_key.as_ref()
    }
}
