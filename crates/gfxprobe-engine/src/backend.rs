//! The seam between the probe engine and the native EGL / OpenGL ES driver.
//!
//! Every native call made by the context manager and the probes goes through
//! [`GraphicsBackend`]. [`crate::native::NativeBackend`] forwards to the
//! dynamically loaded driver; tests substitute an instrumented double.

use std::ffi::c_void;

use gfxprobe_core::GlesVersion;

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub usize);

        impl $name {
            /// Wrap a native pointer; null maps to `None`.
            pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
                if ptr.is_null() {
                    None
                } else {
                    Some(Self(ptr as usize))
                }
            }

            pub fn as_ptr(self) -> *mut c_void {
                self.0 as *mut c_void
            }
        }
    };
}

native_handle!(
    /// EGL display connection.
    DisplayHandle
);
native_handle!(
    /// Offscreen (pbuffer) surface.
    SurfaceHandle
);
native_handle!(
    /// Rendering context.
    ContextHandle
);
native_handle!(
    /// Framebuffer configuration chosen for the surface.
    ConfigHandle
);

/// Framebuffer attributes requested from the driver for a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRequest {
    pub version: GlesVersion,
    pub red: i32,
    pub green: i32,
    pub blue: i32,
    pub alpha: i32,
    pub depth: i32,
    pub stencil: i32,
}

impl ConfigRequest {
    pub fn for_version(version: GlesVersion) -> Self {
        Self {
            version,
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth: 16,
            stencil: 8,
        }
    }
}

/// Per-configuration attributes readable through [`GraphicsBackend::config_attrib`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAttribute {
    RedSize,
    GreenSize,
    BlueSize,
    AlphaSize,
    DepthSize,
    StencilSize,
}

impl ConfigAttribute {
    pub const ALL: [ConfigAttribute; 6] = [
        ConfigAttribute::RedSize,
        ConfigAttribute::GreenSize,
        ConfigAttribute::BlueSize,
        ConfigAttribute::AlphaSize,
        ConfigAttribute::DepthSize,
        ConfigAttribute::StencilSize,
    ];
}

/// Strings the display connection itself reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayString {
    Vendor,
    Version,
}

/// Native graphics primitives used by the engine.
///
/// Methods mirror individual driver entry points. Failures are reported as
/// `None`/`false` exactly as the driver reports them; interpretation is left
/// to the callers.
pub trait GraphicsBackend: Send + Sync {
    /// Obtain the process default display connection.
    fn default_display(&self) -> Option<DisplayHandle>;

    /// Initialize a display; returns the EGL (major, minor) version on success.
    fn initialize(&self, display: DisplayHandle) -> Option<(i32, i32)>;

    /// Select OpenGL ES as the current rendering API.
    fn bind_gles_api(&self) -> bool;

    fn choose_config(&self, display: DisplayHandle, request: &ConfigRequest)
        -> Option<ConfigHandle>;

    /// Create a 1x1 pbuffer surface.
    fn create_pbuffer_surface(
        &self,
        display: DisplayHandle,
        config: ConfigHandle,
    ) -> Option<SurfaceHandle>;

    fn create_context(
        &self,
        display: DisplayHandle,
        config: ConfigHandle,
        version: GlesVersion,
    ) -> Option<ContextHandle>;

    fn destroy_surface(&self, display: DisplayHandle, surface: SurfaceHandle);

    fn make_current(
        &self,
        display: DisplayHandle,
        surface: SurfaceHandle,
        context: ContextHandle,
    ) -> bool;

    fn query_display_string(&self, display: DisplayHandle, name: DisplayString)
        -> Option<String>;

    fn config_attrib(
        &self,
        display: DisplayHandle,
        config: ConfigHandle,
        attribute: ConfigAttribute,
    ) -> Option<i32>;

    /// `glGetString`; `None` when the driver returns null.
    fn get_string(&self, name: u32) -> Option<String>;

    /// `glGetIntegerv` into a caller-sized buffer.
    fn get_integer_v(&self, pname: u32, out: &mut [i32]);

    fn get_error(&self) -> u32;

    /// Resolve an entry point by name through the API's proc-address lookup.
    /// The returned pointer must have the C signature of the named function.
    fn get_proc_address(&self, symbol: &str) -> Option<*const c_void>;

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);

    fn clear(&self, mask: u32);

    fn finish(&self);

    /// Single-value convenience over [`GraphicsBackend::get_integer_v`].
    fn get_integer(&self, pname: u32) -> i32 {
        let mut value = [0i32; 1];
        self.get_integer_v(pname, &mut value);
        value[0]
    }
}
