//! GPU capability probing through an offscreen OpenGL ES context.
//!
//! A single EGL display/surface/context set is created on first use and
//! shared for the life of the process. Probes read driver identity strings,
//! extension lists, configuration depths, limits and vendor memory counters
//! from it, and a short clear/finish loop provides a timing signal. The
//! Vulkan check is independent of the EGL context.
//!
//! Every probe is best effort: failures are logged and reported as the
//! probe's sentinel value (empty, zero or `false`).

pub mod backend;
pub mod benchmark;
pub mod context;
pub mod egl_driver;
pub mod extensions;
pub mod gles_driver;
pub mod native;
pub mod probe;
pub mod snapshot;
pub mod vulkan_check;

use std::sync::OnceLock;

use gfxprobe_core::config::ProbeConfig;

pub use backend::GraphicsBackend;
pub use context::{ContextManager, RuntimeState};
pub use native::NativeBackend;
pub use probe::GpuProbe;
pub use snapshot::collect_snapshot;
pub use vulkan_check::VulkanSupport;

static GLOBAL_PROBE: OnceLock<GpuProbe<NativeBackend>> = OnceLock::new();

/// Process-wide probe over the system drivers, created with default
/// configuration on first use.
pub fn global() -> &'static GpuProbe<NativeBackend> {
    GLOBAL_PROBE.get_or_init(|| GpuProbe::from_config(&ProbeConfig::default()))
}

/// Create the process-wide probe from `config`. Has no effect if it already
/// exists; the first initialization wins.
pub fn init_global(config: &ProbeConfig) -> &'static GpuProbe<NativeBackend> {
    GLOBAL_PROBE.get_or_init(|| GpuProbe::from_config(config))
}
