use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ProbeError;

/// Top-level probe configuration, loaded from gfxprobe.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub libraries: LibraryConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Native library candidates, tried in order until one loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "gfxprobe_common::platform::default_egl_libraries")]
    pub egl: Vec<String>,
    #[serde(default = "gfxprobe_common::platform::default_gles_libraries")]
    pub gles: Vec<String>,
    #[serde(default = "gfxprobe_common::platform::default_vulkan_libraries")]
    pub vulkan: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Randomize the order probes run in
    #[serde(default = "default_true")]
    pub shuffle_order: bool,
    /// Include the timed micro-benchmark
    #[serde(default = "default_true")]
    pub run_benchmark: bool,
    /// Maximum number of extension names kept in a snapshot
    #[serde(default = "default_max_extensions")]
    pub max_extensions: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            egl: gfxprobe_common::platform::default_egl_libraries(),
            gles: gfxprobe_common::platform::default_gles_libraries(),
            vulkan: gfxprobe_common::platform::default_vulkan_libraries(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            shuffle_order: true,
            run_benchmark: true,
            max_extensions: default_max_extensions(),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ProbeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ProbeError> {
        let config: ProbeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    /// A file that exists but does not parse or validate is logged and
    /// replaced by defaults.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ProbeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("ignoring config {}: {}; using defaults", path, e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ProbeError> {
        let lists = [
            ("libraries.egl", &self.libraries.egl),
            ("libraries.gles", &self.libraries.gles),
            ("libraries.vulkan", &self.libraries.vulkan),
        ];
        for (key, names) in lists {
            if names.is_empty() || names.iter().any(|n| n.trim().is_empty()) {
                return Err(ProbeError::Config(format!(
                    "{} must list at least one non-empty library name",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Returns the default config file path based on platform conventions.
/// Search order:
/// 1. System-wide config: `%PROGRAMDATA%\gfxprobe\gfxprobe.toml` (Windows)
///    or `/etc/gfxprobe/gfxprobe.toml`
/// 2. Local fallback: `./gfxprobe.toml`
pub fn default_config_path() -> String {
    #[cfg(windows)]
    {
        let programdata = std::env::var("PROGRAMDATA")
            .unwrap_or_else(|_| r"C:\ProgramData".to_string());
        let system_path = format!(r"{}\gfxprobe\gfxprobe.toml", programdata);
        if std::path::Path::new(&system_path).exists() {
            return system_path;
        }
    }
    #[cfg(not(windows))]
    {
        let system_path = "/etc/gfxprobe/gfxprobe.toml";
        if std::path::Path::new(system_path).exists() {
            return system_path.to_string();
        }
    }
    "gfxprobe.toml".to_string()
}

fn default_max_extensions() -> usize {
    15
}

fn default_true() -> bool {
    true
}
