use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::Duration;

use crate::errors::ExplorerError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Root URL of the data service.
    pub backend_url: String,
    /// Initial tolerance for extracted chromatograms, in ppm.
    pub ppm_tolerance: f64,
    /// Start with MS1 intensities shown as percent of base peak.
    pub normalize_ms1: bool,
    /// Per-request timeout. Requests are unbounded when unset.
    pub request_timeout_secs: Option<u64>,
    /// Append every handled command as a JSON line to this file.
    pub session_log: Option<PathBuf>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            ppm_tolerance: 10.0,
            normalize_ms1: false,
            request_timeout_secs: None,
            session_log: None,
        }
    }
}

impl ExplorerConfig {
    pub fn from_path(path: &Path) -> Result<Self, ExplorerError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ExplorerError> {
        if !self.ppm_tolerance.is_finite() || self.ppm_tolerance < 0.0 {
            return Err(ExplorerError::Config {
                path: path.to_path_buf(),
                msg: format!("ppm_tolerance must be non-negative, got {}", self.ppm_tolerance),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
