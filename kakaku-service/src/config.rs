//! Service configuration, read once from the environment at startup.

use std::path::PathBuf;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default pipeline artifact path.
const DEFAULT_PIPELINE_PATH: &str = "artifacts/pipeline.json";

/// Default model artifact path.
const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";

/// Runtime configuration for the prediction service.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub pipeline_path: PathBuf,
    pub model_path: PathBuf,
}

impl ServiceConfig {
    /// Read configuration from environment variables, falling back to the
    /// documented defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("KAKAKU_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            pipeline_path: std::env::var("KAKAKU_PIPELINE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PIPELINE_PATH)),
            model_path: std::env::var("KAKAKU_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH)),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            pipeline_path: PathBuf::from(DEFAULT_PIPELINE_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}
