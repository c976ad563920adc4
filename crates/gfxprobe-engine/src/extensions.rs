//! Extension enumeration.
//!
//! Drivers disagree on how they advertise extensions: older ones return a
//! single space-separated `GL_EXTENSIONS` string, while GLES3-era drivers
//! may return an empty string there and only support indexed lookup via
//! `glGetStringi`. Both paths are tried in that order.

use std::ffi::{c_char, CStr};

use tracing::debug;

use crate::backend::GraphicsBackend;
use crate::gles_driver::{FnGlGetStringi, GL_EXTENSIONS, GL_NUM_EXTENSIONS};

const GET_STRINGI_SYMBOL: &str = "glGetStringi";

/// Read the extension list from the current context, preserving driver order.
/// Callers must have made a context current.
pub fn query_extensions<B: GraphicsBackend + ?Sized>(backend: &B) -> Vec<String> {
    if let Some(raw) = backend.get_string(GL_EXTENSIONS) {
        if !raw.is_empty() {
            return split_extension_string(&raw);
        }
    }
    query_indexed(backend)
}

/// Split a legacy space-separated extension string.
pub fn split_extension_string(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Join extensions the way marker lookups expect: every name followed by a space.
pub fn join_extensions(extensions: &[String]) -> String {
    let mut joined = String::with_capacity(extensions.len() * 16);
    for ext in extensions {
        joined.push_str(ext);
        joined.push(' ');
    }
    joined
}

fn query_indexed<B: GraphicsBackend + ?Sized>(backend: &B) -> Vec<String> {
    let count = backend.get_integer(GL_NUM_EXTENSIONS);
    let get_stringi = backend
        .get_proc_address(GET_STRINGI_SYMBOL)
        // SAFETY: the backend contract guarantees the pointer has the
        // signature of the named entry point.
        .map(|ptr| unsafe { std::mem::transmute::<*const std::ffi::c_void, FnGlGetStringi>(ptr) });

    let Some(get_stringi) = get_stringi else {
        debug!("{} not resolvable, no indexed extensions", GET_STRINGI_SYMBOL);
        return Vec::new();
    };
    if count <= 0 {
        debug!("GL_NUM_EXTENSIONS reported {}", count);
        return Vec::new();
    }

    (0..count as u32)
        .filter_map(|index| {
            let ptr = unsafe { get_stringi(GL_EXTENSIONS, index) };
            if ptr.is_null() {
                return None;
            }
            let name = unsafe { CStr::from_ptr(ptr as *const c_char) };
            Some(name.to_string_lossy().into_owned())
        })
        .collect()
}
