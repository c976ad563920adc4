//! Dynamic loading of the OpenGL ES 2/3 library.

use std::ffi::{c_char, CStr};

use gfxprobe_core::ProbeError;
use libloading::Library;

use crate::egl_driver::{load_first, load_fn};

pub type GLenum = u32;
pub type GLbitfield = u32;
pub type GLint = i32;
pub type GLuint = u32;
pub type GLfloat = f32;
pub type GLubyte = u8;

pub const GL_NO_ERROR: GLenum = 0;
pub const GL_DEPTH_BUFFER_BIT: GLbitfield = 0x0000_0100;
pub const GL_STENCIL_BUFFER_BIT: GLbitfield = 0x0000_0400;
pub const GL_COLOR_BUFFER_BIT: GLbitfield = 0x0000_4000;
pub const GL_MAX_TEXTURE_SIZE: GLenum = 0x0D33;
pub const GL_VENDOR: GLenum = 0x1F00;
pub const GL_RENDERER: GLenum = 0x1F01;
pub const GL_VERSION: GLenum = 0x1F02;
pub const GL_EXTENSIONS: GLenum = 0x1F03;
pub const GL_NUM_EXTENSIONS: GLenum = 0x821D;
pub const GL_MAX_COMPUTE_WORK_GROUP_INVOCATIONS: GLenum = 0x90EB;

// Vendor memory extensions
pub const GL_GPU_MEMORY_INFO_TOTAL_AVAILABLE_MEMORY_NVX: GLenum = 0x9048;
pub const GL_GPU_MEMORY_INFO_CURRENT_AVAILABLE_VIDMEM_NVX: GLenum = 0x9049;
pub const GL_TEXTURE_FREE_MEMORY_ATI: GLenum = 0x87FC;

/// `glGetStringi`, resolved at runtime since GLES2 drivers lack it.
pub type FnGlGetStringi = unsafe extern "system" fn(name: GLenum, index: GLuint) -> *const GLubyte;

type FnGlGetString = unsafe extern "system" fn(name: GLenum) -> *const GLubyte;
type FnGlGetIntegerv = unsafe extern "system" fn(pname: GLenum, data: *mut GLint);
type FnGlGetError = unsafe extern "system" fn() -> GLenum;
type FnGlClearColor =
    unsafe extern "system" fn(red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
type FnGlClear = unsafe extern "system" fn(mask: GLbitfield);
type FnGlFinish = unsafe extern "system" fn();

/// Dynamically loaded GLES library. Calls are only meaningful while a
/// context is current on the calling thread.
pub struct GlesDriver {
    _lib: Library,
    gl_get_string: FnGlGetString,
    gl_get_integerv: FnGlGetIntegerv,
    gl_get_error: FnGlGetError,
    gl_clear_color: FnGlClearColor,
    gl_clear: FnGlClear,
    gl_finish: FnGlFinish,
}

impl GlesDriver {
    pub fn load(candidates: &[String]) -> Result<Self, ProbeError> {
        let lib = load_first(candidates, "GLES")?;

        unsafe {
            let driver = Self {
                gl_get_string: load_fn(&lib, "glGetString")?,
                gl_get_integerv: load_fn(&lib, "glGetIntegerv")?,
                gl_get_error: load_fn(&lib, "glGetError")?,
                gl_clear_color: load_fn(&lib, "glClearColor")?,
                gl_clear: load_fn(&lib, "glClear")?,
                gl_finish: load_fn(&lib, "glFinish")?,
                _lib: lib,
            };
            Ok(driver)
        }
    }

    pub fn get_string(&self, name: GLenum) -> Option<String> {
        let ptr = unsafe { (self.gl_get_string)(name) };
        if ptr.is_null() {
            return None;
        }
        let s = unsafe { CStr::from_ptr(ptr as *const c_char) };
        Some(s.to_string_lossy().into_owned())
    }

    pub fn get_integerv(&self, pname: GLenum, out: &mut [GLint]) {
        if out.is_empty() {
            return;
        }
        unsafe { (self.gl_get_integerv)(pname, out.as_mut_ptr()) }
    }

    pub fn get_error(&self) -> GLenum {
        unsafe { (self.gl_get_error)() }
    }

    pub fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { (self.gl_clear_color)(red, green, blue, alpha) }
    }

    pub fn clear(&self, mask: GLbitfield) {
        unsafe { (self.gl_clear)(mask) }
    }

    pub fn finish(&self) {
        unsafe { (self.gl_finish)() }
    }
}
