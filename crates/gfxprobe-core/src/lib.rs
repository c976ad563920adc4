pub mod config;
pub mod error;
pub mod gpu_info;

pub use config::ProbeConfig;
pub use error::ProbeError;
pub use gpu_info::{
    BenchmarkResult, ConfigurationDescriptor, GlesVersion, GpuSnapshot, MemoryReport,
};
