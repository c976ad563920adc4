//! Vulkan availability check.
//!
//! Independent of the EGL context: the Vulkan loader is opened directly and,
//! when it exports `vkEnumerateInstanceVersion`, asked for its instance
//! version. A loader that opens but cannot report a version still counts as
//! supported, since being able to load it is itself the signal.

use ash::vk;
use libloading::Library;
use serde::Serialize;
use tracing::{debug, info};

use crate::egl_driver::load_fn_opt;

const ENUMERATE_INSTANCE_VERSION: &str = "vkEnumerateInstanceVersion";

/// Lowest instance version accepted as working Vulkan.
pub const MIN_INSTANCE_VERSION: u32 = vk::API_VERSION_1_0;

/// An opened Vulkan loader. Dropping it releases the library handle.
pub trait VulkanLibrary {
    fn enumerate_instance_version_fn(&self) -> Option<vk::PFN_vkEnumerateInstanceVersion>;
}

/// Opens Vulkan loader libraries by name.
pub trait VulkanLoader: Send + Sync {
    fn open(&self, name: &str) -> Option<Box<dyn VulkanLibrary>>;
}

/// [`VulkanLoader`] that opens real shared libraries.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibloadingVulkanLoader;

struct LoadedVulkan {
    lib: Library,
}

impl VulkanLibrary for LoadedVulkan {
    fn enumerate_instance_version_fn(&self) -> Option<vk::PFN_vkEnumerateInstanceVersion> {
        unsafe { load_fn_opt(&self.lib, ENUMERATE_INSTANCE_VERSION) }
    }
}

impl VulkanLoader for LibloadingVulkanLoader {
    fn open(&self, name: &str) -> Option<Box<dyn VulkanLibrary>> {
        match unsafe { Library::new(name) } {
            Ok(lib) => Some(Box::new(LoadedVulkan { lib })),
            Err(e) => {
                debug!("failed to load {}: {}", name, e);
                None
            }
        }
    }
}

/// Outcome of a Vulkan check, with the details behind the verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VulkanSupport {
    pub supported: bool,
    /// Library name that loaded
    pub library: Option<String>,
    /// Instance version reported by the loader, when it could be queried
    pub api_version: Option<u32>,
}

impl VulkanSupport {
    /// Instance version as (major, minor, patch).
    pub fn version_triple(&self) -> Option<(u32, u32, u32)> {
        self.api_version.map(|v| {
            (
                vk::api_version_major(v),
                vk::api_version_minor(v),
                vk::api_version_patch(v),
            )
        })
    }
}

/// Try each candidate library in order and report whether Vulkan is usable.
pub fn check_vulkan_support(loader: &dyn VulkanLoader, candidates: &[String]) -> VulkanSupport {
    let Some((name, library)) = candidates
        .iter()
        .find_map(|name| loader.open(name).map(|lib| (name.clone(), lib)))
    else {
        debug!("no Vulkan loader could be opened");
        return VulkanSupport::default();
    };

    let support = match library.enumerate_instance_version_fn() {
        None => {
            debug!("{} lacks {}, assuming Vulkan 1.0", name, ENUMERATE_INSTANCE_VERSION);
            VulkanSupport {
                supported: true,
                library: Some(name),
                api_version: None,
            }
        }
        Some(enumerate) => {
            let mut version = 0u32;
            let result = unsafe { enumerate(&mut version) };
            let supported = result == vk::Result::SUCCESS && version >= MIN_INSTANCE_VERSION;
            if result != vk::Result::SUCCESS {
                debug!("{} returned {:?}", ENUMERATE_INSTANCE_VERSION, result);
            }
            VulkanSupport {
                supported,
                library: Some(name),
                api_version: (result == vk::Result::SUCCESS).then_some(version),
            }
        }
    };

    drop(library);

    info!(
        "Vulkan supported: {} (library: {:?}, version: {:?})",
        support.supported,
        support.library,
        support.version_triple()
    );
    support
}
