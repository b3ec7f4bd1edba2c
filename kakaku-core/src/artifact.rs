//! Artifact loading.
//!
//! Both artifacts are JSON files produced by the offline training side and
//! loaded exactly once at process start. A load failure here is fatal to
//! startup, never to an individual request.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::ArtifactError;
use crate::model::Model;
use crate::pipeline::TransformPipeline;

/// Artifact format version this build reads and writes.
pub const FORMAT_VERSION: u32 = 1;

/// Load the pipeline artifact from a JSON file.
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<TransformPipeline, ArtifactError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pipeline: TransformPipeline =
        serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    check_version(path, pipeline.version())?;

    info!(
        path = %path.display(),
        stages = pipeline.stages().len(),
        "Loaded pipeline artifact"
    );
    Ok(pipeline)
}

/// Load the model artifact from a JSON file.
pub fn load_model(path: impl AsRef<Path>) -> Result<Model, ArtifactError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model: Model = serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    check_version(path, model.version())?;

    info!(
        path = %path.display(),
        features = model.features().len(),
        "Loaded model artifact"
    );
    Ok(model)
}

fn check_version(path: &Path, found: u32) -> Result<(), ArtifactError> {
    if found == FORMAT_VERSION {
        Ok(())
    } else {
        Err(ArtifactError::UnsupportedVersion {
            path: path.to_path_buf(),
            found,
            supported: FORMAT_VERSION,
        })
    }
}
