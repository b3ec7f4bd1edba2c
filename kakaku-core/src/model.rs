//! The trained model artifact and its scorer.
//!
//! The service treats the model as an opaque function from feature vector to
//! scalar. The artifact declares the feature schema it was trained against
//! (names and kinds, in order) alongside its learned weights, which makes a
//! training/serving schema mismatch detectable instead of a silently wrong
//! answer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::{FeatureValue, Record};

/// Encoding kind a model feature expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Accepts integer or floating-point values.
    Numeric,
    /// Accepts a declared categorical symbol (not free text).
    Categorical,
}

impl FeatureKind {
    fn matches(self, value: &FeatureValue) -> bool {
        match self {
            Self::Numeric => matches!(value, FeatureValue::Number(_) | FeatureValue::Integer(_)),
            Self::Categorical => matches!(value, FeatureValue::Categorical(_)),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// One feature the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Learned parameters of the scorer.
///
/// Categorical features score through a per-category effect table with an
/// explicit fallback, so categories unseen at training time are legal at
/// serving time and the model, not the pipeline, decides how they score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub intercept: f64,

    /// Coefficient per numeric feature name.
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,

    /// Per categorical feature: category symbol → learned effect.
    #[serde(default)]
    pub categories: BTreeMap<String, BTreeMap<String, f64>>,

    /// Per categorical feature: effect applied to unseen categories.
    #[serde(default)]
    pub default_effects: BTreeMap<String, f64>,
}

/// The deserialized model artifact: declared schema plus weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    version: u32,
    features: Vec<FeatureSpec>,
    weights: ModelWeights,
}

impl Model {
    /// Build a model at the current artifact format version. Used by the
    /// offline training side and by tests; the service only loads.
    pub fn new(features: Vec<FeatureSpec>, weights: ModelWeights) -> Self {
        Self {
            version: crate::artifact::FORMAT_VERSION,
            features,
            weights,
        }
    }

    /// Artifact format version this model was serialized with.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The declared feature schema, in training order.
    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    /// Verify that a feature vector carries exactly the declared field set
    /// with matching kinds. Run against a probe record at startup so an
    /// encoding mismatch fails the boot, not a live request.
    pub fn check_schema(&self, vector: &Record) -> Result<(), ModelError> {
        for spec in &self.features {
            let value = vector
                .get(&spec.name)
                .ok_or_else(|| ModelError::MissingFeature(spec.name.clone()))?;
            if !spec.kind.matches(value) {
                return Err(ModelError::KindMismatch {
                    feature: spec.name.clone(),
                    expected: spec.kind,
                    found: value.type_name(),
                });
            }
        }
        for name in vector.field_names() {
            if !self.features.iter().any(|spec| spec.name == name) {
                return Err(ModelError::UndeclaredField(name.to_string()));
            }
        }
        Ok(())
    }

    /// Score a feature vector.
    ///
    /// Walks the declared schema in training order; every declared feature
    /// must be present with the declared kind. The result is required to be
    /// finite; non-negativity is a property of the training domain and is
    /// not enforced here.
    pub fn predict(&self, vector: &Record) -> Result<f64, ModelError> {
        let mut score = self.weights.intercept;
        for spec in &self.features {
            let value = vector
                .get(&spec.name)
                .ok_or_else(|| ModelError::MissingFeature(spec.name.clone()))?;
            score += self.contribution(spec, value)?;
        }

        if score.is_finite() {
            Ok(score)
        } else {
            Err(ModelError::NonFiniteScore)
        }
    }

    fn contribution(&self, spec: &FeatureSpec, value: &FeatureValue) -> Result<f64, ModelError> {
        match (spec.kind, value) {
            (FeatureKind::Numeric, FeatureValue::Number(x)) => self.numeric_term(spec, *x),
            (FeatureKind::Numeric, FeatureValue::Integer(i)) => self.numeric_term(spec, *i as f64),
            (FeatureKind::Categorical, FeatureValue::Categorical(symbol)) => {
                self.category_term(spec, symbol)
            }
            (expected, other) => Err(ModelError::KindMismatch {
                feature: spec.name.clone(),
                expected,
                found: other.type_name(),
            }),
        }
    }

    fn numeric_term(&self, spec: &FeatureSpec, x: f64) -> Result<f64, ModelError> {
        let coef = self
            .weights
            .numeric
            .get(&spec.name)
            .copied()
            .ok_or_else(|| ModelError::MissingWeight(spec.name.clone()))?;
        Ok(coef * x)
    }

    fn category_term(&self, spec: &FeatureSpec, symbol: &str) -> Result<f64, ModelError> {
        let learned = self
            .weights
            .categories
            .get(&spec.name)
            .and_then(|table| table.get(symbol));
        match learned {
            Some(effect) => Ok(*effect),
            None => self
                .weights
                .default_effects
                .get(&spec.name)
                .copied()
                .ok_or_else(|| ModelError::MissingWeight(spec.name.clone())),
        }
    }
}
