//! Vulkan loader availability check.

mod common;

use std::sync::atomic::Ordering;

use ash::vk;
use common::{
    init_test_logging, vulkan_candidates, Counters, FakeBackend, FakeScript, FakeVulkanLoader,
    VersionEntry,
};
use gfxprobe_engine::vulkan_check::check_vulkan_support;
use gfxprobe_engine::GpuProbe;

#[test]
fn test_unsupported_when_no_library_loads() {
    init_test_logging();
    let loader = FakeVulkanLoader::denying_all();
    let support = check_vulkan_support(&loader, &vulkan_candidates());

    assert!(!support.supported);
    assert_eq!(support.library, None);
    assert_eq!(
        *loader.log.attempts.lock(),
        vec!["libvulkan.so".to_string(), "libvulkan.so.1".to_string()]
    );
    assert_eq!(loader.log.released.load(Ordering::SeqCst), 0);
}

#[test]
fn test_versioned_fallback_name_is_tried() {
    let loader = FakeVulkanLoader::new(&["libvulkan.so.1"], VersionEntry::Reports1_3);
    let support = check_vulkan_support(&loader, &vulkan_candidates());

    assert!(support.supported);
    assert_eq!(support.library.as_deref(), Some("libvulkan.so.1"));
    assert_eq!(support.version_triple(), Some((1, 3, 0)));
    assert_eq!(loader.log.released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_primary_name_short_circuits() {
    let loader = FakeVulkanLoader::new(
        &["libvulkan.so", "libvulkan.so.1"],
        VersionEntry::Reports1_3,
    );
    let support = check_vulkan_support(&loader, &vulkan_candidates());

    assert_eq!(support.library.as_deref(), Some("libvulkan.so"));
    assert_eq!(loader.log.attempts.lock().len(), 1);
    assert_eq!(loader.log.opened.load(Ordering::SeqCst), 1);
}

#[test]
fn test_missing_version_entry_point_is_permissive() {
    let loader = FakeVulkanLoader::new(&["libvulkan.so"], VersionEntry::Missing);
    let support = check_vulkan_support(&loader, &vulkan_candidates());

    assert!(support.supported);
    assert_eq!(support.api_version, None);
    assert_eq!(loader.log.released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_version_below_minimum_is_unsupported() {
    let loader = FakeVulkanLoader::new(&["libvulkan.so"], VersionEntry::ReportsBelowMinimum);
    let support = check_vulkan_support(&loader, &vulkan_candidates());

    assert!(!support.supported);
    assert_eq!(support.api_version, Some(vk::make_api_version(0, 0, 9, 0)));
    assert_eq!(loader.log.released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_enumeration_is_unsupported() {
    let loader = FakeVulkanLoader::new(&["libvulkan.so"], VersionEntry::Fails);
    let support = check_vulkan_support(&loader, &vulkan_candidates());

    assert!(!support.supported);
    assert_eq!(support.api_version, None);
    assert_eq!(loader.log.released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_check_does_not_touch_graphics_context() {
    init_test_logging();
    let loader = FakeVulkanLoader::new(&["libvulkan.so"], VersionEntry::Reports1_3);
    let log = loader.log.clone();
    let probe = GpuProbe::new(FakeBackend::new(FakeScript::default()))
        .with_vulkan_loader(loader, vulkan_candidates());

    assert!(probe.check_secondary_api());
    assert!(probe.check_secondary_api());

    let c = &probe.context().backend().counters;
    assert_eq!(Counters::get(&c.default_display), 0);
    assert_eq!(Counters::get(&c.make_current), 0);
    assert_eq!(log.opened.load(Ordering::SeqCst), 2);
    assert_eq!(log.released.load(Ordering::SeqCst), 2);
}
