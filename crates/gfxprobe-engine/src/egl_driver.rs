//! Dynamic loading of the system EGL library.
//!
//! Uses `libloading` to load `libEGL.so.1` (Linux/Android) or `libEGL.dll`
//! (Windows, ANGLE) and wraps the handful of EGL entry points needed to set
//! up an offscreen OpenGL ES context.

use std::ffi::{c_char, c_void, CStr, CString};

use gfxprobe_core::ProbeError;
use libloading::{Library, Symbol};
use tracing::{debug, info};

pub type EGLDisplay = *mut c_void;
pub type EGLConfig = *mut c_void;
pub type EGLSurface = *mut c_void;
pub type EGLContext = *mut c_void;
pub type EGLNativeDisplayType = *mut c_void;
pub type EGLBoolean = u32;
pub type EGLint = i32;
pub type EGLenum = u32;

pub const EGL_FALSE: EGLBoolean = 0;
pub const EGL_DEFAULT_DISPLAY: EGLNativeDisplayType = std::ptr::null_mut();
pub const EGL_NO_CONTEXT: EGLContext = std::ptr::null_mut();

pub const EGL_ALPHA_SIZE: EGLint = 0x3021;
pub const EGL_BLUE_SIZE: EGLint = 0x3022;
pub const EGL_GREEN_SIZE: EGLint = 0x3023;
pub const EGL_RED_SIZE: EGLint = 0x3024;
pub const EGL_DEPTH_SIZE: EGLint = 0x3025;
pub const EGL_STENCIL_SIZE: EGLint = 0x3026;
pub const EGL_SURFACE_TYPE: EGLint = 0x3033;
pub const EGL_NONE: EGLint = 0x3038;
pub const EGL_RENDERABLE_TYPE: EGLint = 0x3040;
pub const EGL_VENDOR: EGLint = 0x3053;
pub const EGL_VERSION: EGLint = 0x3054;
pub const EGL_HEIGHT: EGLint = 0x3056;
pub const EGL_WIDTH: EGLint = 0x3057;
pub const EGL_CONTEXT_CLIENT_VERSION: EGLint = 0x3098;
pub const EGL_OPENGL_ES_API: EGLenum = 0x30A0;

pub const EGL_PBUFFER_BIT: EGLint = 0x0001;
pub const EGL_OPENGL_ES2_BIT: EGLint = 0x0004;
pub const EGL_OPENGL_ES3_BIT_KHR: EGLint = 0x0040;

type FnEglGetDisplay = unsafe extern "system" fn(display_id: EGLNativeDisplayType) -> EGLDisplay;
type FnEglInitialize = unsafe extern "system" fn(
    dpy: EGLDisplay,
    major: *mut EGLint,
    minor: *mut EGLint,
) -> EGLBoolean;
type FnEglBindApi = unsafe extern "system" fn(api: EGLenum) -> EGLBoolean;
type FnEglChooseConfig = unsafe extern "system" fn(
    dpy: EGLDisplay,
    attrib_list: *const EGLint,
    configs: *mut EGLConfig,
    config_size: EGLint,
    num_config: *mut EGLint,
) -> EGLBoolean;
type FnEglCreatePbufferSurface = unsafe extern "system" fn(
    dpy: EGLDisplay,
    config: EGLConfig,
    attrib_list: *const EGLint,
) -> EGLSurface;
type FnEglCreateContext = unsafe extern "system" fn(
    dpy: EGLDisplay,
    config: EGLConfig,
    share_context: EGLContext,
    attrib_list: *const EGLint,
) -> EGLContext;
type FnEglDestroySurface =
    unsafe extern "system" fn(dpy: EGLDisplay, surface: EGLSurface) -> EGLBoolean;
type FnEglMakeCurrent = unsafe extern "system" fn(
    dpy: EGLDisplay,
    draw: EGLSurface,
    read: EGLSurface,
    ctx: EGLContext,
) -> EGLBoolean;
type FnEglQueryString = unsafe extern "system" fn(dpy: EGLDisplay, name: EGLint) -> *const c_char;
type FnEglGetConfigAttrib = unsafe extern "system" fn(
    dpy: EGLDisplay,
    config: EGLConfig,
    attribute: EGLint,
    value: *mut EGLint,
) -> EGLBoolean;
type FnEglGetProcAddress = unsafe extern "system" fn(procname: *const c_char) -> *const c_void;
type FnEglGetError = unsafe extern "system" fn() -> EGLint;

/// Dynamically loaded EGL library with function pointers.
pub struct EglDriver {
    _lib: Library,
    egl_get_display: FnEglGetDisplay,
    egl_initialize: FnEglInitialize,
    egl_bind_api: FnEglBindApi,
    egl_choose_config: FnEglChooseConfig,
    egl_create_pbuffer_surface: FnEglCreatePbufferSurface,
    egl_create_context: FnEglCreateContext,
    egl_destroy_surface: FnEglDestroySurface,
    egl_make_current: FnEglMakeCurrent,
    egl_query_string: FnEglQueryString,
    egl_get_config_attrib: FnEglGetConfigAttrib,
    egl_get_proc_address: FnEglGetProcAddress,
    egl_get_error: Option<FnEglGetError>,
}

impl EglDriver {
    /// Load the first EGL library from `candidates` that resolves every
    /// required entry point.
    pub fn load(candidates: &[String]) -> Result<Self, ProbeError> {
        let lib = load_first(candidates, "EGL")?;

        unsafe {
            let driver = Self {
                egl_get_display: load_fn(&lib, "eglGetDisplay")?,
                egl_initialize: load_fn(&lib, "eglInitialize")?,
                egl_bind_api: load_fn(&lib, "eglBindAPI")?,
                egl_choose_config: load_fn(&lib, "eglChooseConfig")?,
                egl_create_pbuffer_surface: load_fn(&lib, "eglCreatePbufferSurface")?,
                egl_create_context: load_fn(&lib, "eglCreateContext")?,
                egl_destroy_surface: load_fn(&lib, "eglDestroySurface")?,
                egl_make_current: load_fn(&lib, "eglMakeCurrent")?,
                egl_query_string: load_fn(&lib, "eglQueryString")?,
                egl_get_config_attrib: load_fn(&lib, "eglGetConfigAttrib")?,
                egl_get_proc_address: load_fn(&lib, "eglGetProcAddress")?,
                egl_get_error: load_fn_opt(&lib, "eglGetError"),
                _lib: lib,
            };
            Ok(driver)
        }
    }

    pub fn get_display(&self, native: EGLNativeDisplayType) -> EGLDisplay {
        unsafe { (self.egl_get_display)(native) }
    }

    pub fn initialize(&self, dpy: EGLDisplay) -> Option<(i32, i32)> {
        let mut major: EGLint = 0;
        let mut minor: EGLint = 0;
        let ok = unsafe { (self.egl_initialize)(dpy, &mut major, &mut minor) };
        if ok == EGL_FALSE {
            debug!("eglInitialize failed (error 0x{:04x})", self.last_error());
            None
        } else {
            Some((major, minor))
        }
    }

    pub fn bind_api(&self, api: EGLenum) -> bool {
        unsafe { (self.egl_bind_api)(api) != EGL_FALSE }
    }

    /// Return the first config matching `attribs` (EGL_NONE terminated).
    pub fn choose_config(&self, dpy: EGLDisplay, attribs: &[EGLint]) -> Option<EGLConfig> {
        debug_assert_eq!(attribs.last(), Some(&EGL_NONE));
        let mut config: EGLConfig = std::ptr::null_mut();
        let mut num_configs: EGLint = 0;
        let ok = unsafe {
            (self.egl_choose_config)(dpy, attribs.as_ptr(), &mut config, 1, &mut num_configs)
        };
        if ok == EGL_FALSE || num_configs <= 0 || config.is_null() {
            None
        } else {
            Some(config)
        }
    }

    pub fn create_pbuffer_surface(
        &self,
        dpy: EGLDisplay,
        config: EGLConfig,
        attribs: &[EGLint],
    ) -> EGLSurface {
        unsafe { (self.egl_create_pbuffer_surface)(dpy, config, attribs.as_ptr()) }
    }

    pub fn create_context(
        &self,
        dpy: EGLDisplay,
        config: EGLConfig,
        attribs: &[EGLint],
    ) -> EGLContext {
        unsafe { (self.egl_create_context)(dpy, config, EGL_NO_CONTEXT, attribs.as_ptr()) }
    }

    pub fn destroy_surface(&self, dpy: EGLDisplay, surface: EGLSurface) -> bool {
        unsafe { (self.egl_destroy_surface)(dpy, surface) != EGL_FALSE }
    }

    pub fn make_current(
        &self,
        dpy: EGLDisplay,
        draw: EGLSurface,
        read: EGLSurface,
        ctx: EGLContext,
    ) -> bool {
        unsafe { (self.egl_make_current)(dpy, draw, read, ctx) != EGL_FALSE }
    }

    pub fn query_string(&self, dpy: EGLDisplay, name: EGLint) -> Option<String> {
        let ptr = unsafe { (self.egl_query_string)(dpy, name) };
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }

    pub fn get_config_attrib(
        &self,
        dpy: EGLDisplay,
        config: EGLConfig,
        attribute: EGLint,
    ) -> Option<i32> {
        let mut value: EGLint = 0;
        let ok = unsafe { (self.egl_get_config_attrib)(dpy, config, attribute, &mut value) };
        (ok != EGL_FALSE).then_some(value)
    }

    pub fn get_proc_address(&self, name: &str) -> Option<*const c_void> {
        let name = CString::new(name).ok()?;
        let ptr = unsafe { (self.egl_get_proc_address)(name.as_ptr()) };
        (!ptr.is_null()).then_some(ptr)
    }

    /// Last EGL error code, or 0 when eglGetError is not exported.
    pub fn last_error(&self) -> i32 {
        match self.egl_get_error {
            Some(f) => unsafe { f() },
            None => 0,
        }
    }
}

/// Load the first library in `candidates` that opens.
pub(crate) fn load_first(candidates: &[String], what: &str) -> Result<Library, ProbeError> {
    let mut last_err = String::from("no candidates configured");
    for name in candidates {
        match unsafe { Library::new(name) } {
            Ok(lib) => {
                info!("loaded {} from: {}", what, name);
                return Ok(lib);
            }
            Err(e) => {
                last_err = format!("{}: {}", name, e);
                debug!("failed to load {}: {}", name, e);
            }
        }
    }
    Err(ProbeError::LibraryLoad(format!("{} ({})", what, last_err)))
}

pub(crate) unsafe fn load_fn<F: Copy>(lib: &Library, name: &str) -> Result<F, ProbeError> {
    let sym: Symbol<F> = unsafe { lib.get(name.as_bytes()) }
        .map_err(|e| ProbeError::LibraryLoad(format!("missing symbol {}: {}", name, e)))?;
    Ok(*sym)
}

pub(crate) unsafe fn load_fn_opt<F: Copy>(lib: &Library, name: &str) -> Option<F> {
    unsafe { lib.get(name.as_bytes()) }.ok().map(|s: Symbol<F>| *s)
}
