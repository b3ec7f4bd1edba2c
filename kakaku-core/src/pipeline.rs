//! Transform pipeline: an ordered list of field-level recoding stages.
//!
//! Stages are a closed set of kinds behind one `fit`/`transform` contract.
//! They carry no statistics learned from data, only structural recoding
//! rules, so `fit` is a no-op and a stage works without prior fitting.
//!
//! The serialized form of [`TransformPipeline`] is the pipeline artifact:
//! a versioned, ordered stage list with each stage's target field.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::record::{FeatureValue, Record};

/// One unit of the pipeline, targeting exactly one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stage {
    /// Reinterpret a timestamp (or parseable date-like string) as integer
    /// seconds since the Unix epoch, truncating sub-second precision.
    EpochSeconds { field: String },

    /// Re-tag free text as a categorical symbol without altering its value.
    /// No fitted vocabulary; unseen categories pass through unchanged.
    Categorical { field: String },
}

impl Stage {
    /// Name of the field this stage targets.
    pub fn field(&self) -> &str {
        match self {
            Self::EpochSeconds { field } | Self::Categorical { field } => field,
        }
    }

    /// Offline-only fitting hook. These stages learn nothing from data, so
    /// this always succeeds without touching the batch.
    pub fn fit(&self, _records: &[Record]) -> Result<(), TransformError> {
        Ok(())
    }

    /// Apply the stage to one record. Pure function of the record and the
    /// stage's target field; re-applying on an already-encoded field is a
    /// pass-through.
    pub fn transform(&self, mut record: Record) -> Result<Record, TransformError> {
        let field = self.field();
        let value = record
            .remove(field)
            .ok_or_else(|| TransformError::MissingField {
                field: field.to_string(),
            })?;

        let encoded = match self {
            Self::EpochSeconds { .. } => encode_epoch_seconds(field, value)?,
            Self::Categorical { .. } => encode_categorical(field, value)?,
        };

        record.insert(field, encoded);
        Ok(record)
    }
}

fn encode_epoch_seconds(field: &str, value: FeatureValue) -> Result<FeatureValue, TransformError> {
    match value {
        FeatureValue::Timestamp(ts) => Ok(FeatureValue::Integer(ts.timestamp())),
        // Already encoded; safe to re-apply.
        FeatureValue::Integer(secs) => Ok(FeatureValue::Integer(secs)),
        FeatureValue::Text(text) => match parse_date_like(&text) {
            Some(secs) => Ok(FeatureValue::Integer(secs)),
            None => Err(TransformError::MalformedFeature {
                field: field.to_string(),
                reason: format!("`{text}` is not a parseable date/time"),
            }),
        },
        other => Err(TransformError::MalformedFeature {
            field: field.to_string(),
            reason: format!("expected a date-like value, found {}", other.type_name()),
        }),
    }
}

fn encode_categorical(field: &str, value: FeatureValue) -> Result<FeatureValue, TransformError> {
    match value {
        FeatureValue::Text(text) => Ok(FeatureValue::Categorical(text)),
        // Already tagged; safe to re-apply.
        FeatureValue::Categorical(symbol) => Ok(FeatureValue::Categorical(symbol)),
        other => Err(TransformError::MalformedFeature {
            field: field.to_string(),
            reason: format!("expected text, found {}", other.type_name()),
        }),
    }
}

/// Parse a date-like string as whole seconds since the Unix epoch.
///
/// Accepted forms, tried in order: RFC 3339, `%Y-%m-%d %H:%M:%S` (taken as
/// UTC), `%Y-%m-%d` (midnight UTC). The live request path always injects a
/// structured timestamp; string parsing exists so offline records replay
/// through the same artifact.
fn parse_date_like(text: &str) -> Option<i64> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().timestamp());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    None
}

/// Ordered sequence of stages converting a raw record into the model's
/// expected feature encoding.
///
/// The declared order is always honored, even where stages target disjoint
/// fields and would commute, so a serving-time run replays exactly what the
/// training-time artifact recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformPipeline {
    version: u32,
    stages: Vec<Stage>,
}

impl TransformPipeline {
    /// Build a pipeline at the current artifact format version.
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            version: crate::artifact::FORMAT_VERSION,
            stages,
        }
    }

    /// Artifact format version this pipeline was serialized with.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The stage list, in application order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Fit every stage on a batch of records, in declared order.
    pub fn fit(&self, records: &[Record]) -> Result<(), TransformError> {
        for stage in &self.stages {
            stage.fit(records)?;
        }
        Ok(())
    }

    /// Run the record through every stage in declared order. The first
    /// failing stage aborts the run; no partial record escapes.
    pub fn transform(&self, record: Record) -> Result<Record, TransformError> {
        self.stages
            .iter()
            .try_fold(record, |record, stage| stage.transform(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn trade_pipeline() -> TransformPipeline {
        TransformPipeline::new(vec![
            Stage::EpochSeconds {
                field: "trade_date".to_string(),
            },
            Stage::Categorical {
                field: "address".to_string(),
            },
        ])
    }

    fn augmented_record() -> Record {
        let mut record = Record::new();
        record.insert("address", FeatureValue::Text("東京都千代田区".to_string()));
        record.insert("area", FeatureValue::Number(30.0));
        record.insert("building_year", FeatureValue::Number(2013.0));
        record.insert(
            "trade_date",
            FeatureValue::Timestamp(Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap()),
        );
        record
    }

    #[test]
    fn test_epoch_seconds_known_value() {
        let stage = Stage::EpochSeconds {
            field: "trade_date".to_string(),
        };
        let mut record = Record::new();
        record.insert(
            "trade_date",
            FeatureValue::Timestamp(Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap()),
        );

        let out = stage.transform(record).unwrap();
        assert_eq!(out.get("trade_date"), Some(&FeatureValue::Integer(1_561_939_200)));
    }

    #[test]
    fn test_epoch_seconds_parses_date_strings() {
        let stage = Stage::EpochSeconds {
            field: "trade_date".to_string(),
        };

        for text in ["2019-07-01T00:00:00Z", "2019-07-01 00:00:00", "2019-07-01"] {
            let mut record = Record::new();
            record.insert("trade_date", FeatureValue::Text(text.to_string()));
            let out = stage.transform(record).unwrap();
            assert_eq!(
                out.get("trade_date"),
                Some(&FeatureValue::Integer(1_561_939_200)),
                "input `{text}`"
            );
        }
    }

    #[test]
    fn test_epoch_seconds_truncates_subseconds() {
        let stage = Stage::EpochSeconds {
            field: "trade_date".to_string(),
        };
        let mut record = Record::new();
        record.insert(
            "trade_date",
            FeatureValue::Text("2019-07-01T00:00:00.750Z".to_string()),
        );

        let out = stage.transform(record).unwrap();
        assert_eq!(out.get("trade_date"), Some(&FeatureValue::Integer(1_561_939_200)));
    }

    #[test]
    fn test_epoch_seconds_monotonic_distinct() {
        let stage = Stage::EpochSeconds {
            field: "trade_date".to_string(),
        };
        let instants = [
            Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2019, 6, 30, 23, 59, 59).unwrap(),
            Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 1).unwrap(),
        ];

        let mut encoded = Vec::new();
        for ts in instants {
            let mut record = Record::new();
            record.insert("trade_date", FeatureValue::Timestamp(ts));
            let out = stage.transform(record).unwrap();
            match out.get("trade_date") {
                Some(FeatureValue::Integer(secs)) => encoded.push(*secs),
                other => panic!("unexpected encoding: {other:?}"),
            }
        }

        for pair in encoded.windows(2) {
            assert!(pair[0] < pair[1], "mapping must be strictly increasing");
        }
    }

    #[test]
    fn test_epoch_seconds_rejects_garbage() {
        let stage = Stage::EpochSeconds {
            field: "trade_date".to_string(),
        };
        let mut record = Record::new();
        record.insert("trade_date", FeatureValue::Text("not a date".to_string()));

        let err = stage.transform(record).unwrap_err();
        assert!(matches!(err, TransformError::MalformedFeature { ref field, .. } if field == "trade_date"));
    }

    #[test]
    fn test_epoch_seconds_rejects_number() {
        let stage = Stage::EpochSeconds {
            field: "trade_date".to_string(),
        };
        let mut record = Record::new();
        record.insert("trade_date", FeatureValue::Number(2019.0));

        assert!(matches!(
            stage.transform(record),
            Err(TransformError::MalformedFeature { .. })
        ));
    }

    #[test]
    fn test_categorical_preserves_value() {
        let stage = Stage::Categorical {
            field: "address".to_string(),
        };
        let mut record = Record::new();
        record.insert("address", FeatureValue::Text("東京都千代田区".to_string()));

        let out = stage.transform(record).unwrap();
        assert_eq!(
            out.get("address"),
            Some(&FeatureValue::Categorical("東京都千代田区".to_string()))
        );
    }

    #[test]
    fn test_missing_field() {
        let stage = Stage::Categorical {
            field: "address".to_string(),
        };
        let err = stage.transform(Record::new()).unwrap_err();
        assert!(matches!(err, TransformError::MissingField { ref field } if field == "address"));
    }

    #[test]
    fn test_fit_is_noop() {
        let pipeline = trade_pipeline();
        assert!(pipeline.fit(&[augmented_record()]).is_ok());
        assert!(pipeline.fit(&[]).is_ok());
    }

    #[test]
    fn test_pipeline_transform() {
        let out = trade_pipeline().transform(augmented_record()).unwrap();

        assert_eq!(out.get("trade_date"), Some(&FeatureValue::Integer(1_561_939_200)));
        assert_eq!(
            out.get("address"),
            Some(&FeatureValue::Categorical("東京都千代田区".to_string()))
        );
        // Untargeted fields pass through untouched.
        assert_eq!(out.get("area"), Some(&FeatureValue::Number(30.0)));
        assert_eq!(out.get("building_year"), Some(&FeatureValue::Number(2013.0)));
    }

    #[test]
    fn test_pipeline_deterministic() {
        let pipeline = trade_pipeline();
        let a = pipeline.transform(augmented_record()).unwrap();
        let b = pipeline.transform(augmented_record()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pipeline_reapply_is_stable() {
        let pipeline = trade_pipeline();
        let once = pipeline.transform(augmented_record()).unwrap();
        let twice = pipeline.transform(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_pipeline_aborts_on_first_failure() {
        // The temporal stage runs first and fails; no partial record escapes.
        let pipeline = trade_pipeline();
        let mut record = Record::new();
        record.insert("address", FeatureValue::Text("東京都千代田区".to_string()));
        record.insert("trade_date", FeatureValue::Text("garbage".to_string()));

        assert!(matches!(
            pipeline.transform(record),
            Err(TransformError::MalformedFeature { ref field, .. }) if field == "trade_date"
        ));
    }

    #[test]
    fn test_artifact_round_trip() {
        let pipeline = trade_pipeline();
        let json = serde_json::to_string(&pipeline).unwrap();
        assert!(json.contains("epoch_seconds"));
        assert!(json.contains("categorical"));

        let parsed: TransformPipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pipeline);
    }
}
