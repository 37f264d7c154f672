use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single call to the remote data service.
///
/// Transport, non-2xx and malformed bodies are kept apart for logging, but
/// they all render to the same "operation failed" style banner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("service responded with status {status}{}", detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Message shown in the error banner for a failed `operation`.
    pub fn user_message(&self, operation: &str) -> String {
        match self {
            GatewayError::Status {
                detail: Some(detail),
                ..
            } => format!("Failed to {operation}: {detail}"),
            _ => format!("Failed to {operation}"),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Malformed(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid configuration in {path}: {msg}")]
    Config { path: PathBuf, msg: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_detail_is_shown_to_user() {
        let err = GatewayError::Status {
            status: 404,
            detail: Some("File not found".into()),
        };
        assert_eq!(
            err.user_message("load chromatogram"),
            "Failed to load chromatogram: File not found"
        );
    }

    #[test]
    fn test_malformed_and_transport_share_message() {
        let malformed = GatewayError::Malformed("missing field `rts`".into());
        let transport = GatewayError::Transport("connection refused".into());
        assert_eq!(
            malformed.user_message("load spectrum"),
            transport.user_message("load spectrum")
        );
    }

    #[test]
    fn test_status_display_without_detail() {
        let err = GatewayError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "service responded with status 500");
    }
}
