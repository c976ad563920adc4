/// Candidate EGL library names, most specific first.
pub fn default_egl_libraries() -> Vec<String> {
    #[cfg(windows)]
    {
        vec!["libEGL.dll".to_string()]
    }
    #[cfg(not(windows))]
    {
        vec!["libEGL.so.1".to_string(), "libEGL.so".to_string()]
    }
}

/// Candidate OpenGL ES 2/3 library names.
pub fn default_gles_libraries() -> Vec<String> {
    #[cfg(windows)]
    {
        vec!["libGLESv2.dll".to_string()]
    }
    #[cfg(not(windows))]
    {
        vec!["libGLESv2.so.2".to_string(), "libGLESv2.so".to_string()]
    }
}

/// Candidate Vulkan loader names: the unversioned name first, then the
/// versioned soname.
pub fn default_vulkan_libraries() -> Vec<String> {
    #[cfg(windows)]
    {
        vec!["vulkan-1.dll".to_string()]
    }
    #[cfg(not(windows))]
    {
        vec!["libvulkan.so".to_string(), "libvulkan.so.1".to_string()]
    }
}

/// Returns the platform name string.
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "windows")]
    { "windows" }
    #[cfg(target_os = "android")]
    { "android" }
    #[cfg(target_os = "linux")]
    { "linux" }
    #[cfg(target_os = "macos")]
    { "macos" }
    #[cfg(not(any(
        target_os = "windows",
        target_os = "android",
        target_os = "linux",
        target_os = "macos"
    )))]
    { "unknown" }
}
