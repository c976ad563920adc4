//! Production [`GraphicsBackend`] backed by the system EGL and GLES libraries.

use std::ffi::c_void;

use gfxprobe_core::config::LibraryConfig;
use gfxprobe_core::GlesVersion;
use tracing::{debug, warn};

use crate::backend::{
    ConfigAttribute, ConfigHandle, ConfigRequest, ContextHandle, DisplayHandle, DisplayString,
    GraphicsBackend, SurfaceHandle,
};
use crate::egl_driver::*;
use crate::gles_driver::GlesDriver;

/// Forwards every primitive to the dynamically loaded drivers. A driver that
/// failed to load makes the corresponding primitives report failure.
pub struct NativeBackend {
    egl: Option<EglDriver>,
    gles: Option<GlesDriver>,
}

impl NativeBackend {
    pub fn load(libraries: &LibraryConfig) -> Self {
        let egl = EglDriver::load(&libraries.egl)
            .map_err(|e| warn!("EGL unavailable: {}", e))
            .ok();
        let gles = GlesDriver::load(&libraries.gles)
            .map_err(|e| warn!("GLES unavailable: {}", e))
            .ok();
        Self { egl, gles }
    }

    /// Whether the EGL library and its entry points loaded.
    pub fn has_egl(&self) -> bool {
        self.egl.is_some()
    }

    /// Whether the GLES library and its entry points loaded.
    pub fn has_gles(&self) -> bool {
        self.gles.is_some()
    }
}

fn config_attrib_token(attribute: ConfigAttribute) -> EGLint {
    match attribute {
        ConfigAttribute::RedSize => EGL_RED_SIZE,
        ConfigAttribute::GreenSize => EGL_GREEN_SIZE,
        ConfigAttribute::BlueSize => EGL_BLUE_SIZE,
        ConfigAttribute::AlphaSize => EGL_ALPHA_SIZE,
        ConfigAttribute::DepthSize => EGL_DEPTH_SIZE,
        ConfigAttribute::StencilSize => EGL_STENCIL_SIZE,
    }
}

fn renderable_bit(version: GlesVersion) -> EGLint {
    match version {
        GlesVersion::Gles3 => EGL_OPENGL_ES3_BIT_KHR,
        GlesVersion::Gles2 => EGL_OPENGL_ES2_BIT,
    }
}

impl GraphicsBackend for NativeBackend {
    fn default_display(&self) -> Option<DisplayHandle> {
        let egl = self.egl.as_ref()?;
        DisplayHandle::from_ptr(egl.get_display(EGL_DEFAULT_DISPLAY))
    }

    fn initialize(&self, display: DisplayHandle) -> Option<(i32, i32)> {
        self.egl.as_ref()?.initialize(display.as_ptr())
    }

    fn bind_gles_api(&self) -> bool {
        self.egl
            .as_ref()
            .is_some_and(|egl| egl.bind_api(EGL_OPENGL_ES_API))
    }

    fn choose_config(
        &self,
        display: DisplayHandle,
        request: &ConfigRequest,
    ) -> Option<ConfigHandle> {
        let egl = self.egl.as_ref()?;
        #[rustfmt::skip]
        let attribs = [
            EGL_SURFACE_TYPE, EGL_PBUFFER_BIT,
            EGL_RENDERABLE_TYPE, renderable_bit(request.version),
            EGL_RED_SIZE, request.red,
            EGL_GREEN_SIZE, request.green,
            EGL_BLUE_SIZE, request.blue,
            EGL_ALPHA_SIZE, request.alpha,
            EGL_DEPTH_SIZE, request.depth,
            EGL_STENCIL_SIZE, request.stencil,
            EGL_NONE,
        ];
        egl.choose_config(display.as_ptr(), &attribs)
            .and_then(ConfigHandle::from_ptr)
    }

    fn create_pbuffer_surface(
        &self,
        display: DisplayHandle,
        config: ConfigHandle,
    ) -> Option<SurfaceHandle> {
        let egl = self.egl.as_ref()?;
        let attribs = [EGL_WIDTH, 1, EGL_HEIGHT, 1, EGL_NONE];
        let surface = egl.create_pbuffer_surface(display.as_ptr(), config.as_ptr(), &attribs);
        if surface.is_null() {
            debug!("eglCreatePbufferSurface error 0x{:04x}", egl.last_error());
        }
        SurfaceHandle::from_ptr(surface)
    }

    fn create_context(
        &self,
        display: DisplayHandle,
        config: ConfigHandle,
        version: GlesVersion,
    ) -> Option<ContextHandle> {
        let egl = self.egl.as_ref()?;
        let attribs = [EGL_CONTEXT_CLIENT_VERSION, version.major(), EGL_NONE];
        let context = egl.create_context(display.as_ptr(), config.as_ptr(), &attribs);
        if context.is_null() {
            debug!("eglCreateContext error 0x{:04x}", egl.last_error());
        }
        ContextHandle::from_ptr(context)
    }

    fn destroy_surface(&self, display: DisplayHandle, surface: SurfaceHandle) {
        if let Some(egl) = self.egl.as_ref() {
            if !egl.destroy_surface(display.as_ptr(), surface.as_ptr()) {
                debug!("eglDestroySurface failed for {:?}", surface);
            }
        }
    }

    fn make_current(
        &self,
        display: DisplayHandle,
        surface: SurfaceHandle,
        context: ContextHandle,
    ) -> bool {
        self.egl.as_ref().is_some_and(|egl| {
            egl.make_current(
                display.as_ptr(),
                surface.as_ptr(),
                surface.as_ptr(),
                context.as_ptr(),
            )
        })
    }

    fn query_display_string(&self, display: DisplayHandle, name: DisplayString) -> Option<String> {
        let token = match name {
            DisplayString::Vendor => EGL_VENDOR,
            DisplayString::Version => EGL_VERSION,
        };
        self.egl.as_ref()?.query_string(display.as_ptr(), token)
    }

    fn config_attrib(
        &self,
        display: DisplayHandle,
        config: ConfigHandle,
        attribute: ConfigAttribute,
    ) -> Option<i32> {
        self.egl.as_ref()?.get_config_attrib(
            display.as_ptr(),
            config.as_ptr(),
            config_attrib_token(attribute),
        )
    }

    fn get_string(&self, name: u32) -> Option<String> {
        self.gles.as_ref()?.get_string(name)
    }

    fn get_integer_v(&self, pname: u32, out: &mut [i32]) {
        if let Some(gles) = self.gles.as_ref() {
            gles.get_integerv(pname, out);
        }
    }

    fn get_error(&self) -> u32 {
        self.gles.as_ref().map_or(0, GlesDriver::get_error)
    }

    fn get_proc_address(&self, symbol: &str) -> Option<*const c_void> {
        self.egl.as_ref()?.get_proc_address(symbol)
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        if let Some(gles) = self.gles.as_ref() {
            gles.clear_color(red, green, blue, alpha);
        }
    }

    fn clear(&self, mask: u32) {
        if let Some(gles) = self.gles.as_ref() {
            gles.clear(mask);
        }
    }

    fn finish(&self) {
        if let Some(gles) = self.gles.as_ref() {
            gles.finish();
        }
    }
}
