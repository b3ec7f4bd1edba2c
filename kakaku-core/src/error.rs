//! Error taxonomy for the prediction core.
//!
//! Every fault is an explicit `Result` value; the service layer performs one
//! centralized mapping from these kinds to external status codes.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::FeatureKind;

/// Errors raised by pipeline stages.
///
/// Any stage failure aborts the whole pipeline run; a partially transformed
/// record is never returned. Both variants are client-caused when they occur
/// on the request path.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("required field `{field}` is missing from the record")]
    MissingField { field: String },

    #[error("field `{field}` cannot be transformed: {reason}")]
    MalformedFeature { field: String, reason: String },
}

/// Errors raised by the model when scoring a feature vector.
///
/// These indicate a schema or artifact problem the client cannot cause.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("feature `{0}` is missing from the feature vector")]
    MissingFeature(String),

    #[error("feature `{feature}` is {found}, model expects {expected}")]
    KindMismatch {
        feature: String,
        expected: FeatureKind,
        found: &'static str,
    },

    #[error("feature vector carries `{0}`, which the model was not trained on")]
    UndeclaredField(String),

    #[error("model weights have no entry for feature `{0}`")]
    MissingWeight(String),

    #[error("model produced a non-finite score")]
    NonFiniteScore,
}

/// Errors raised while loading an artifact at startup. All fatal.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read artifact `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("failed to parse artifact `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("artifact `{path}` has format version {found}, supported version is {supported}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
}
