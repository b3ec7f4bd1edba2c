//! Kakaku Core Library
//!
//! Shared building blocks for the kakaku prediction service:
//! - Feature records with value tagging
//! - The transform pipeline and its stages
//! - The trained model artifact and scorer
//! - Artifact loading with format versioning

pub mod artifact;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod record;

// Re-export commonly used items
pub use artifact::{load_model, load_pipeline, FORMAT_VERSION};
pub use error::{ArtifactError, ModelError, TransformError};
pub use model::{FeatureKind, FeatureSpec, Model, ModelWeights};
pub use pipeline::{Stage, TransformPipeline};
pub use record::{FeatureValue, Record};

/// Initialize tracing with standard configuration
pub fn init_tracing(service_name: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info,tower_http=debug", service_name)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}
