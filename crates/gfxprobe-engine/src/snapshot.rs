//! Collects every probe into a single [`GpuSnapshot`].

use std::collections::HashSet;

use gfxprobe_core::config::SnapshotConfig;
use gfxprobe_core::GpuSnapshot;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::backend::GraphicsBackend;
use crate::probe::GpuProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeStep {
    Renderer,
    Vendor,
    Version,
    Extensions,
    DisplayVendor,
    Configuration,
    Memory,
    MaxTextureSize,
    ComputeInvocations,
    Vulkan,
    Benchmark,
}

const ALL_STEPS: [ProbeStep; 11] = [
    ProbeStep::Renderer,
    ProbeStep::Vendor,
    ProbeStep::Version,
    ProbeStep::Extensions,
    ProbeStep::DisplayVendor,
    ProbeStep::Configuration,
    ProbeStep::Memory,
    ProbeStep::MaxTextureSize,
    ProbeStep::ComputeInvocations,
    ProbeStep::Vulkan,
    ProbeStep::Benchmark,
];

/// Run every probe once and gather the results. Each probe is independent;
/// one returning its sentinel does not affect the rest.
pub fn collect_snapshot<B: GraphicsBackend>(
    probe: &GpuProbe<B>,
    config: &SnapshotConfig,
) -> GpuSnapshot {
    let mut steps: Vec<ProbeStep> = ALL_STEPS
        .into_iter()
        .filter(|step| config.run_benchmark || *step != ProbeStep::Benchmark)
        .collect();
    if config.shuffle_order {
        steps.shuffle(&mut rand::thread_rng());
    }
    debug!("snapshot probe order: {:?}", steps);

    let mut snapshot = GpuSnapshot::default();
    for step in steps {
        match step {
            ProbeStep::Renderer => snapshot.renderer = probe.renderer(),
            ProbeStep::Vendor => snapshot.vendor = probe.vendor(),
            ProbeStep::Version => snapshot.version = probe.version(),
            ProbeStep::Extensions => {
                let distinct = distinct_extensions(probe.extensions());
                snapshot.extension_count = distinct.len();
                snapshot.extensions = distinct.into_iter().take(config.max_extensions).collect();
            }
            ProbeStep::DisplayVendor => snapshot.display_vendor = probe.display_vendor(),
            ProbeStep::Configuration => snapshot.configuration = probe.configuration(),
            ProbeStep::Memory => snapshot.memory = probe.memory_report(),
            ProbeStep::MaxTextureSize => snapshot.max_texture_size = probe.max_texture_size(),
            ProbeStep::ComputeInvocations => {
                snapshot.compute_work_group_invocations = probe.max_compute_invocations();
                snapshot.compute_supported = snapshot.compute_work_group_invocations > 0;
            }
            ProbeStep::Vulkan => snapshot.vulkan_supported = probe.check_secondary_api(),
            ProbeStep::Benchmark => {
                snapshot.micro_benchmark_ms = probe.run_micro_benchmark().millis_per_iteration();
            }
        }
    }
    snapshot.context_version = probe.context().state().version();
    snapshot
}

/// Drop blank names and repeats, keeping first occurrences in order.
pub fn distinct_extensions(extensions: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    extensions
        .into_iter()
        .filter(|ext| !ext.trim().is_empty())
        .filter(|ext| seen.insert(ext.clone()))
        .collect()
}
