//! Shared application state: the two artifacts, loaded once and read-only.
//!
//! Lifecycle is two-phase: `load()` runs once, single-threaded, before the
//! listener binds; afterwards the state is shared read-only by every request
//! with no mutation path from the handling surface.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use kakaku_core::{
    load_model, load_pipeline, ArtifactError, FeatureValue, Model, ModelError, Record,
    TransformError, TransformPipeline,
};

use crate::config::ServiceConfig;
use crate::{FIELD_ADDRESS, FIELD_AREA, FIELD_BUILDING_YEAR, FIELD_TRADE_DATE};

/// Failures that prevent the process from reaching a ready state.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("pipeline probe run failed: {0}")]
    Probe(#[from] TransformError),

    #[error("pipeline output does not match the model's feature schema: {0}")]
    SchemaMismatch(#[from] ModelError),
}

/// Application state
pub struct AppState {
    /// Transform pipeline artifact, immutable after load.
    pub pipeline: TransformPipeline,

    /// Model artifact, immutable after load.
    pub model: Model,

    /// Service instance ID
    pub instance_id: String,

    /// Service start time for uptime calculations
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wrap already-validated artifacts. `load` is the checked path; this
    /// constructor trusts the caller (training side, tests).
    pub fn new(pipeline: TransformPipeline, model: Model) -> Self {
        let instance_id = Uuid::new_v4().to_string()[..8].to_string();
        Self {
            pipeline,
            model,
            instance_id,
            started_at: Utc::now(),
        }
    }

    /// Load both artifacts and run the schema self-check.
    ///
    /// Any failure here is fatal to startup, not to an individual request:
    /// the process must not begin serving without both artifacts.
    pub fn load(config: &ServiceConfig) -> Result<Self, StartupError> {
        let pipeline = load_pipeline(&config.pipeline_path)?;
        let model = load_model(&config.model_path)?;
        check_feature_schema(&pipeline, &model)?;

        let state = Self::new(pipeline, model);
        info!(instance_id = %state.instance_id, "Application state initialized");
        Ok(state)
    }

    /// Get service uptime in seconds.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// Push a synthetic probe record through the pipeline and check the result
/// against the model's declared feature schema. A training/serving encoding
/// mismatch fails the boot instead of producing wrong answers at request
/// time.
fn check_feature_schema(
    pipeline: &TransformPipeline,
    model: &Model,
) -> Result<(), StartupError> {
    let vector = pipeline.transform(probe_record())?;
    model.check_schema(&vector)?;
    Ok(())
}

/// A well-formed augmented record with placeholder values, shaped exactly
/// like the one the handler builds per request.
fn probe_record() -> Record {
    let mut record = Record::new();
    record.insert(FIELD_ADDRESS, FeatureValue::Text("schema-probe".to_string()));
    record.insert(FIELD_AREA, FeatureValue::Number(0.0));
    record.insert(FIELD_BUILDING_YEAR, FeatureValue::Number(0.0));
    record.insert(FIELD_TRADE_DATE, FeatureValue::Timestamp(DateTime::UNIX_EPOCH));
    record
}
