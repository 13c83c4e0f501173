//! Server configuration

/// Default bind address; the port matches what the web front end targets
pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";

/// Default upload limit in MiB
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8000`
    pub addr: String,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    #[must_use]
    pub fn new(addr: impl Into<String>, max_upload_mb: usize) -> Self {
        Self {
            addr: addr.into(),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDR, DEFAULT_MAX_UPLOAD_MB)
    }
}
