//! Public capability probes.
//!
//! Every query first acquires the shared context and falls back to its
//! sentinel (empty string, empty list, zero) when that fails. Nothing here
//! returns an error to the caller.

use std::sync::Arc;

use gfxprobe_core::config::ProbeConfig;
use gfxprobe_core::{
    BenchmarkResult, ConfigurationDescriptor, GlesVersion, MemoryReport, ProbeError,
};
use tracing::{debug, warn};

use crate::backend::{ConfigAttribute, DisplayString, GraphicsBackend};
use crate::benchmark::run_clear_finish_loop;
use crate::context::ContextManager;
use crate::extensions::{join_extensions, query_extensions};
use crate::gles_driver::*;
use crate::native::NativeBackend;
use crate::vulkan_check::{
    check_vulkan_support, LibloadingVulkanLoader, VulkanLoader, VulkanSupport,
};

/// Marker of the NVIDIA memory-info extension.
pub const NVX_MEMORY_MARKER: &str = "GL_NVX_gpu_memory_info";
/// Marker of the AMD/ATI memory-info extension.
pub const ATI_MEMORY_MARKER: &str = "GL_ATI_meminfo";

pub struct GpuProbe<B: GraphicsBackend> {
    context: ContextManager<B>,
    vulkan_loader: Box<dyn VulkanLoader>,
    vulkan_libraries: Vec<String>,
}

impl GpuProbe<NativeBackend> {
    /// Probe backed by the system drivers named in `config`.
    pub fn from_config(config: &ProbeConfig) -> Self {
        let backend = NativeBackend::load(&config.libraries);
        Self::new(backend).with_vulkan_loader(
            LibloadingVulkanLoader,
            config.libraries.vulkan.clone(),
        )
    }
}

impl<B: GraphicsBackend> GpuProbe<B> {
    pub fn new(backend: B) -> Self {
        Self {
            context: ContextManager::new(Arc::new(backend)),
            vulkan_loader: Box::new(LibloadingVulkanLoader),
            vulkan_libraries: gfxprobe_common::platform::default_vulkan_libraries(),
        }
    }

    pub fn with_vulkan_loader(
        mut self,
        loader: impl VulkanLoader + 'static,
        libraries: Vec<String>,
    ) -> Self {
        self.vulkan_loader = Box::new(loader);
        self.vulkan_libraries = libraries;
        self
    }

    pub fn context(&self) -> &ContextManager<B> {
        &self.context
    }

    fn backend(&self) -> &B {
        self.context.backend()
    }

    pub fn ensure_context(&self) -> bool {
        self.context.ensure_context()
    }

    /// Negotiated context version, creating the context if needed.
    pub fn context_version(&self) -> Option<GlesVersion> {
        self.context.acquire().map(|active| active.version)
    }

    // ── Identity ──────────────────────────────────────────────────

    pub fn renderer(&self) -> String {
        self.gl_string(GL_RENDERER)
    }

    pub fn vendor(&self) -> String {
        self.gl_string(GL_VENDOR)
    }

    pub fn version(&self) -> String {
        self.gl_string(GL_VERSION)
    }

    /// Vendor of the EGL implementation behind the display.
    pub fn display_vendor(&self) -> String {
        let Some(active) = self.context.acquire() else {
            return String::new();
        };
        self.backend()
            .query_display_string(active.display, DisplayString::Vendor)
            .unwrap_or_default()
    }

    /// EGL version string of the display, e.g. "1.5 Mesa".
    pub fn display_version(&self) -> String {
        let Some(active) = self.context.acquire() else {
            return String::new();
        };
        self.backend()
            .query_display_string(active.display, DisplayString::Version)
            .unwrap_or_default()
    }

    fn gl_string(&self, name: u32) -> String {
        if !self.context.ensure_context() {
            return String::new();
        }
        self.backend().get_string(name).unwrap_or_default()
    }

    // ── Extensions ────────────────────────────────────────────────

    pub fn extensions(&self) -> Vec<String> {
        if !self.context.ensure_context() {
            return Vec::new();
        }
        query_extensions(self.backend())
    }

    // ── Configuration and limits ──────────────────────────────────

    pub fn configuration(&self) -> ConfigurationDescriptor {
        let Some(active) = self.context.acquire() else {
            return ConfigurationDescriptor::default();
        };
        let backend = self.backend();
        let [red, green, blue, alpha, depth, stencil] = ConfigAttribute::ALL.map(|attribute| {
            backend
                .config_attrib(active.display, active.config, attribute)
                .map_or(0, clamp_non_negative)
        });
        ConfigurationDescriptor {
            red,
            green,
            blue,
            alpha,
            depth,
            stencil,
        }
    }

    pub fn max_texture_size(&self) -> u32 {
        if !self.context.ensure_context() {
            return 0;
        }
        clamp_non_negative(self.backend().get_integer(GL_MAX_TEXTURE_SIZE))
    }

    /// Compute work-group invocation limit; zero when the driver flags an
    /// error on the query, which some drivers do instead of rejecting it.
    pub fn max_compute_invocations(&self) -> u32 {
        if !self.context.ensure_context() {
            return 0;
        }
        match read_checked(self.backend(), GL_MAX_COMPUTE_WORK_GROUP_INVOCATIONS) {
            Ok(value) => clamp_non_negative(value),
            Err(e) => {
                debug!("compute limit unavailable: {}", e);
                0
            }
        }
    }

    // ── Memory ────────────────────────────────────────────────────

    pub fn memory_report(&self) -> MemoryReport {
        if !self.context.ensure_context() {
            return MemoryReport::default();
        }
        let joined = join_extensions(&query_extensions(self.backend()));
        match read_vendor_memory(self.backend(), &joined) {
            Ok(report) => report,
            Err(e) => {
                debug!("memory report unavailable: {}", e);
                MemoryReport::default()
            }
        }
    }

    // ── Benchmark ─────────────────────────────────────────────────

    pub fn run_micro_benchmark(&self) -> BenchmarkResult {
        if !self.context.ensure_context() {
            return BenchmarkResult::NOT_RUN;
        }
        run_clear_finish_loop(self.backend())
    }

    // ── Vulkan ────────────────────────────────────────────────────

    /// Whether a usable Vulkan loader is present. Does not touch the EGL context.
    pub fn check_secondary_api(&self) -> bool {
        self.vulkan_support().supported
    }

    pub fn vulkan_support(&self) -> VulkanSupport {
        check_vulkan_support(self.vulkan_loader.as_ref(), &self.vulkan_libraries)
    }
}

fn clamp_non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Upper bound on flags drained before a checked read. GL keeps at most one
/// flag per error kind, so a driver still reporting after this is broken.
const MAX_STALE_ERRORS: usize = 8;

/// Clear error flags left behind by earlier calls.
fn drain_errors<B: GraphicsBackend + ?Sized>(backend: &B) {
    for _ in 0..MAX_STALE_ERRORS {
        match backend.get_error() {
            GL_NO_ERROR => return,
            code => debug!("discarding stale GL error 0x{:04x}", code),
        }
    }
    warn!("GL error flag did not clear after {} reads", MAX_STALE_ERRORS);
}

/// Read one integer and fail if the driver raised its error flag doing so.
fn read_checked<B: GraphicsBackend + ?Sized>(backend: &B, pname: u32) -> Result<i32, ProbeError> {
    drain_errors(backend);
    let value = backend.get_integer(pname);
    match backend.get_error() {
        GL_NO_ERROR => Ok(value),
        code => Err(ProbeError::DriverErrorFlag {
            operation: "glGetIntegerv",
            code,
        }),
    }
}

/// Read GPU memory counters through whichever vendor extension `joined`
/// advertises. NVX reports total and current availability; ATI only
/// reports free memory, which fills both the total and free slots.
fn read_vendor_memory<B: GraphicsBackend + ?Sized>(
    backend: &B,
    joined: &str,
) -> Result<MemoryReport, ProbeError> {
    if joined.contains(NVX_MEMORY_MARKER) {
        let total = backend.get_integer(GL_GPU_MEMORY_INFO_TOTAL_AVAILABLE_MEMORY_NVX);
        let current = backend.get_integer(GL_GPU_MEMORY_INFO_CURRENT_AVAILABLE_VIDMEM_NVX);
        if total > 0 {
            let total = total as u32;
            let free = clamp_non_negative(current);
            return Ok(MemoryReport::new(total, total.saturating_sub(free), free));
        }
        warn!("{} advertised but reported total {}", NVX_MEMORY_MARKER, total);
    }

    if joined.contains(ATI_MEMORY_MARKER) {
        // [free, largest free block, aux free, largest aux block]
        let mut free = [0i32; 4];
        backend.get_integer_v(GL_TEXTURE_FREE_MEMORY_ATI, &mut free);
        if free[0] > 0 {
            let free = free[0] as u32;
            return Ok(MemoryReport::new(free, 0, free));
        }
    }

    Err(ProbeError::CapabilityAbsent(
        "no vendor memory extension".to_string(),
    ))
}
