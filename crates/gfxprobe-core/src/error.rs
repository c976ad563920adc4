use crate::gpu_info::GlesVersion;

/// Everything that can go wrong while probing. None of these escape the
/// public probe surface; they are logged and mapped to sentinel values.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("graphics environment unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("no matching configuration for {version}")]
    Negotiation { version: GlesVersion },

    #[error("driver rejected {operation} for {version}")]
    DriverRejected {
        operation: &'static str,
        version: GlesVersion,
    },

    #[error("capability absent: {0}")]
    CapabilityAbsent(String),

    #[error("driver raised error 0x{code:04x} after {operation}")]
    DriverErrorFlag { operation: &'static str, code: u32 },

    #[error("failed to load library: {0}")]
    LibraryLoad(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ProbeError {
    fn from(e: toml::de::Error) -> Self {
        ProbeError::Config(e.to_string())
    }
}
