use std::fmt;

use serde::{Deserialize, Serialize};

/// OpenGL ES major version requested when negotiating a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlesVersion {
    #[serde(rename = "gles2")]
    Gles2,
    #[serde(rename = "gles3")]
    Gles3,
}

impl GlesVersion {
    /// Versions in the order they are attempted.
    pub const FALLBACK_ORDER: [GlesVersion; 2] = [GlesVersion::Gles3, GlesVersion::Gles2];

    pub fn major(self) -> i32 {
        match self {
            GlesVersion::Gles2 => 2,
            GlesVersion::Gles3 => 3,
        }
    }
}

impl fmt::Display for GlesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GLES{}", self.major())
    }
}

/// Color/depth/stencil precision of the negotiated offscreen surface.
/// All zero means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDescriptor {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
    pub depth: u32,
    pub stencil: u32,
}

impl ConfigurationDescriptor {
    pub fn is_unknown(&self) -> bool {
        *self == Self::default()
    }

    pub fn as_array(&self) -> [u32; 6] {
        [self.red, self.green, self.blue, self.alpha, self.depth, self.stencil]
    }
}

/// GPU memory counters in kilobytes, as reported by a vendor extension.
/// All zero means the driver exposes no recognized counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub total: u32,
    pub used: u32,
    pub free: u32,
}

impl MemoryReport {
    pub fn new(total: u32, used: u32, free: u32) -> Self {
        Self { total, used, free }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::default()
    }
}

/// Mean milliseconds per benchmark iteration; 0.0 when the benchmark
/// could not run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkResult(pub f64);

impl BenchmarkResult {
    pub const NOT_RUN: BenchmarkResult = BenchmarkResult(0.0);

    pub fn millis_per_iteration(&self) -> f64 {
        self.0
    }

    pub fn did_run(&self) -> bool {
        self.0 > 0.0
    }
}

/// Raw graphics signals gathered in a single collection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuSnapshot {
    pub renderer: String,
    pub vendor: String,
    pub version: String,
    pub display_vendor: String,
    /// Distinct, non-blank extension names, truncated to the configured cap
    pub extensions: Vec<String>,
    /// Distinct extension count before truncation
    pub extension_count: usize,
    pub configuration: ConfigurationDescriptor,
    pub memory: MemoryReport,
    pub max_texture_size: u32,
    pub compute_work_group_invocations: u32,
    pub compute_supported: bool,
    pub vulkan_supported: bool,
    pub micro_benchmark_ms: f64,
    /// Context version that was negotiated, if any
    pub context_version: Option<GlesVersion>,
}
