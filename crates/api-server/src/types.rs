//! API response types not owned by the core library

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Parsed multipart upload
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name, for logging only
    pub file_name: Option<String>,
    pub bytes: axum::body::Bytes,
    /// `sheet_name` form field; empty values are treated as absent
    pub sheet_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let health = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&health).unwrap();
        assert_eq!(json, r#"{"status":"ok","version":"0.1.0"}"#);
    }
}
