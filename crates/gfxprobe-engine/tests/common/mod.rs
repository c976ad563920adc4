//! Scriptable, instrumented stand-ins for the native graphics driver and
//! the Vulkan loader.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::{c_void, CStr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ash::vk;
use parking_lot::Mutex;

use gfxprobe_core::GlesVersion;
use gfxprobe_engine::backend::{
    ConfigAttribute, ConfigHandle, ConfigRequest, ContextHandle, DisplayHandle, DisplayString,
    GraphicsBackend, SurfaceHandle,
};
use gfxprobe_engine::gles_driver::{GLenum, GLubyte, GLuint, GL_NUM_EXTENSIONS};
use gfxprobe_engine::vulkan_check::{VulkanLibrary, VulkanLoader};
use gfxprobe_engine::GpuProbe;

pub const GL_INVALID_ENUM: u32 = 0x0500;

/// Names served by the fake `glGetStringi`, in index order.
pub const INDEXED_EXTENSIONS: [&CStr; 3] = [
    c"GL_OES_texture_float",
    c"GL_NVX_gpu_memory_info",
    c"GL_EXT_color_buffer_float",
];

unsafe extern "system" fn fake_get_stringi(_name: GLenum, index: GLuint) -> *const GLubyte {
    match INDEXED_EXTENSIONS.get(index as usize) {
        Some(name) => name.as_ptr() as *const GLubyte,
        None => std::ptr::null(),
    }
}

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// How the fake driver behaves. Tests adjust it before or between calls.
#[derive(Debug, Clone)]
pub struct FakeScript {
    pub display_available: bool,
    pub initialize_ok: bool,
    pub failing_config: Vec<GlesVersion>,
    pub failing_surface: Vec<GlesVersion>,
    pub failing_context: Vec<GlesVersion>,
    pub make_current_ok: bool,
    pub strings: HashMap<u32, String>,
    pub display_vendor: Option<String>,
    pub config_depths: [i32; 6],
    pub integers: HashMap<u32, Vec<i32>>,
    /// Error code raised by reading the given parameter
    pub error_after: HashMap<u32, u32>,
    pub get_stringi_available: bool,
    pub finish_delay: Duration,
}

impl Default for FakeScript {
    fn default() -> Self {
        Self {
            display_available: true,
            initialize_ok: true,
            failing_config: Vec::new(),
            failing_surface: Vec::new(),
            failing_context: Vec::new(),
            make_current_ok: true,
            strings: HashMap::new(),
            display_vendor: Some("Fake EGL Vendor".to_string()),
            config_depths: [8, 8, 8, 8, 16, 8],
            integers: HashMap::new(),
            error_after: HashMap::new(),
            get_stringi_available: true,
            finish_delay: Duration::from_micros(200),
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub default_display: AtomicUsize,
    pub initialize: AtomicUsize,
    pub choose_config: AtomicUsize,
    pub create_surface: AtomicUsize,
    pub create_context: AtomicUsize,
    pub destroy_surface: AtomicUsize,
    pub make_current: AtomicUsize,
    pub clear: AtomicUsize,
    pub finish: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct FakeBackend {
    pub script: Mutex<FakeScript>,
    pub counters: Counters,
    pending_error: Mutex<u32>,
    clear_colors: Mutex<Vec<[f32; 4]>>,
    next_handle: AtomicUsize,
}

impl FakeBackend {
    pub fn new(script: FakeScript) -> Self {
        Self {
            script: Mutex::new(script),
            counters: Counters::default(),
            pending_error: Mutex::new(0),
            clear_colors: Mutex::new(Vec::new()),
            next_handle: AtomicUsize::new(0x1000),
        }
    }

    pub fn with_extension_string(extensions: &str) -> Self {
        let mut script = FakeScript::default();
        script
            .strings
            .insert(gfxprobe_engine::gles_driver::GL_EXTENSIONS, extensions.to_string());
        Self::new(script)
    }

    pub fn clear_colors(&self) -> Vec<[f32; 4]> {
        self.clear_colors.lock().clone()
    }

    fn handle(&self) -> usize {
        self.next_handle.fetch_add(1, Ordering::SeqCst)
    }

    fn config_version(config: ConfigHandle) -> GlesVersion {
        if config.0 & 0xF == 3 {
            GlesVersion::Gles3
        } else {
            GlesVersion::Gles2
        }
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

impl GraphicsBackend for FakeBackend {
    fn default_display(&self) -> Option<DisplayHandle> {
        bump(&self.counters.default_display);
        self.script
            .lock()
            .display_available
            .then_some(DisplayHandle(0xD15))
    }

    fn initialize(&self, _display: DisplayHandle) -> Option<(i32, i32)> {
        bump(&self.counters.initialize);
        self.script.lock().initialize_ok.then_some((1, 5))
    }

    fn bind_gles_api(&self) -> bool {
        true
    }

    fn choose_config(
        &self,
        _display: DisplayHandle,
        request: &ConfigRequest,
    ) -> Option<ConfigHandle> {
        bump(&self.counters.choose_config);
        if self.script.lock().failing_config.contains(&request.version) {
            return None;
        }
        // low nibble encodes the requested major version
        Some(ConfigHandle(0xC0 | request.version.major() as usize))
    }

    fn create_pbuffer_surface(
        &self,
        _display: DisplayHandle,
        config: ConfigHandle,
    ) -> Option<SurfaceHandle> {
        bump(&self.counters.create_surface);
        let version = Self::config_version(config);
        if self.script.lock().failing_surface.contains(&version) {
            return None;
        }
        Some(SurfaceHandle(self.handle()))
    }

    fn create_context(
        &self,
        _display: DisplayHandle,
        _config: ConfigHandle,
        version: GlesVersion,
    ) -> Option<ContextHandle> {
        bump(&self.counters.create_context);
        if self.script.lock().failing_context.contains(&version) {
            return None;
        }
        Some(ContextHandle(self.handle()))
    }

    fn destroy_surface(&self, _display: DisplayHandle, _surface: SurfaceHandle) {
        bump(&self.counters.destroy_surface);
    }

    fn make_current(
        &self,
        _display: DisplayHandle,
        _surface: SurfaceHandle,
        _context: ContextHandle,
    ) -> bool {
        bump(&self.counters.make_current);
        self.script.lock().make_current_ok
    }

    fn query_display_string(
        &self,
        _display: DisplayHandle,
        name: DisplayString,
    ) -> Option<String> {
        match name {
            DisplayString::Vendor => self.script.lock().display_vendor.clone(),
            DisplayString::Version => Some("1.5 Fake".to_string()),
        }
    }

    fn config_attrib(
        &self,
        _display: DisplayHandle,
        _config: ConfigHandle,
        attribute: ConfigAttribute,
    ) -> Option<i32> {
        let index = ConfigAttribute::ALL.iter().position(|a| *a == attribute)?;
        Some(self.script.lock().config_depths[index])
    }

    fn get_string(&self, name: u32) -> Option<String> {
        self.script.lock().strings.get(&name).cloned()
    }

    fn get_integer_v(&self, pname: u32, out: &mut [i32]) {
        let script = self.script.lock();
        if pname == GL_NUM_EXTENSIONS && !script.integers.contains_key(&pname) {
            out[0] = INDEXED_EXTENSIONS.len() as i32;
        } else if let Some(values) = script.integers.get(&pname) {
            for (slot, value) in out.iter_mut().zip(values) {
                *slot = *value;
            }
        }
        if let Some(code) = script.error_after.get(&pname) {
            *self.pending_error.lock() = *code;
        }
    }

    fn get_error(&self) -> u32 {
        std::mem::take(&mut *self.pending_error.lock())
    }

    fn get_proc_address(&self, symbol: &str) -> Option<*const c_void> {
        if symbol == "glGetStringi" && self.script.lock().get_stringi_available {
            let f: unsafe extern "system" fn(GLenum, GLuint) -> *const GLubyte = fake_get_stringi;
            Some(f as *const c_void)
        } else {
            None
        }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.clear_colors.lock().push([red, green, blue, alpha]);
    }

    fn clear(&self, _mask: u32) {
        bump(&self.counters.clear);
    }

    fn finish(&self) {
        bump(&self.counters.finish);
        let delay = self.script.lock().finish_delay;
        std::thread::sleep(delay);
    }
}

// ── Vulkan loader double ─────────────────────────────────────────────

unsafe extern "system" fn enumerate_1_3(version: *mut u32) -> vk::Result {
    unsafe { *version = vk::make_api_version(0, 1, 3, 0) };
    vk::Result::SUCCESS
}

unsafe extern "system" fn enumerate_below_minimum(version: *mut u32) -> vk::Result {
    unsafe { *version = vk::make_api_version(0, 0, 9, 0) };
    vk::Result::SUCCESS
}

unsafe extern "system" fn enumerate_failure(_version: *mut u32) -> vk::Result {
    vk::Result::ERROR_OUT_OF_HOST_MEMORY
}

/// What the fake loader's `vkEnumerateInstanceVersion` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionEntry {
    Missing,
    Reports1_3,
    ReportsBelowMinimum,
    Fails,
}

#[derive(Debug, Default)]
pub struct LoaderLog {
    pub attempts: Mutex<Vec<String>>,
    pub opened: AtomicUsize,
    pub released: AtomicUsize,
}

pub struct FakeVulkanLoader {
    pub loadable: Vec<String>,
    pub entry: VersionEntry,
    pub log: Arc<LoaderLog>,
}

impl FakeVulkanLoader {
    pub fn new(loadable: &[&str], entry: VersionEntry) -> Self {
        Self {
            loadable: loadable.iter().map(|s| s.to_string()).collect(),
            entry,
            log: Arc::new(LoaderLog::default()),
        }
    }

    pub fn denying_all() -> Self {
        Self::new(&[], VersionEntry::Missing)
    }
}

struct FakeVulkanLibrary {
    entry: VersionEntry,
    log: Arc<LoaderLog>,
}

impl VulkanLibrary for FakeVulkanLibrary {
    fn enumerate_instance_version_fn(&self) -> Option<vk::PFN_vkEnumerateInstanceVersion> {
        match self.entry {
            VersionEntry::Missing => None,
            VersionEntry::Reports1_3 => Some(enumerate_1_3),
            VersionEntry::ReportsBelowMinimum => Some(enumerate_below_minimum),
            VersionEntry::Fails => Some(enumerate_failure),
        }
    }
}

impl Drop for FakeVulkanLibrary {
    fn drop(&mut self) {
        self.log.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl VulkanLoader for FakeVulkanLoader {
    fn open(&self, name: &str) -> Option<Box<dyn VulkanLibrary>> {
        self.log.attempts.lock().push(name.to_string());
        if !self.loadable.iter().any(|n| n == name) {
            return None;
        }
        self.log.opened.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(FakeVulkanLibrary {
            entry: self.entry,
            log: self.log.clone(),
        }))
    }
}

pub fn vulkan_candidates() -> Vec<String> {
    vec!["libvulkan.so".to_string(), "libvulkan.so.1".to_string()]
}

/// Probe over `backend` with a Vulkan loader that opens nothing.
pub fn probe_with(backend: FakeBackend) -> GpuProbe<FakeBackend> {
    init_test_logging();
    GpuProbe::new(backend).with_vulkan_loader(FakeVulkanLoader::denying_all(), vulkan_candidates())
}
