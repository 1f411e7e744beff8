use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::{FeatureSchema, FeatureScaler, FittedClassifier, FittedScaler, ModelError};

/// Failure to produce a usable bundle. Fatal: the service must not accept requests without one.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact could not be deserialized: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact is missing the `{0}` entry")]
    MissingField(&'static str),
    #[error("model artifact declares no feature names")]
    EmptyFeatures,
    #[error("feature name at position {position} is blank")]
    BlankFeature { position: usize },
    #[error("feature `{0}` is declared more than once")]
    DuplicateFeature(String),
    #[error("model artifact is inconsistent: {0}")]
    Model(#[from] ModelError),
}

/// Artifact layout written by the training pipeline. Every entry is optional here so a missing
/// one is reported by name instead of as a generic parse failure.
#[derive(Debug, Deserialize)]
struct RawBundle {
    best_model: Option<FittedClassifier>,
    scaler: Option<FittedScaler>,
    feature_column: Option<Vec<String>>,
}

/// Immutable, process-lifetime model bundle.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    classifier: FittedClassifier,
    scaler: FittedScaler,
    features: FeatureSchema,
}

impl ModelBundle {
    /// Assemble a bundle from parts, applying the same consistency checks as [`ModelBundle::load`].
    pub fn new(
        classifier: FittedClassifier,
        scaler: FittedScaler,
        features: FeatureSchema,
    ) -> Result<Self, LoadError> {
        scaler.validate()?;
        if scaler.n_features() != features.len() {
            return Err(ModelError::DimensionMismatch {
                component: "scaler",
                expected: features.len(),
                found: scaler.n_features(),
            }
            .into());
        }
        classifier.validate(features.len())?;

        Ok(Self {
            classifier,
            scaler,
            features,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_reader(BufReader::new(file))?;

        info!(
            path = %path.display(),
            classifier = bundle.classifier.kind(),
            scaler = bundle.scaler.kind(),
            features = bundle.features.len(),
            "model bundle loaded"
        );
        Ok(bundle)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let raw: RawBundle = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        let raw: RawBundle = serde_json::from_slice(bytes)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawBundle) -> Result<Self, LoadError> {
        let classifier = raw.best_model.ok_or(LoadError::MissingField("best_model"))?;
        let scaler = raw.scaler.ok_or(LoadError::MissingField("scaler"))?;
        let names = raw
            .feature_column
            .ok_or(LoadError::MissingField("feature_column"))?;
        let features = FeatureSchema::new(names)?;

        Self::new(classifier, scaler, features)
    }

    pub fn classifier(&self) -> &FittedClassifier {
        &self.classifier
    }

    pub fn scaler(&self) -> &FittedScaler {
        &self.scaler
    }

    pub fn features(&self) -> &FeatureSchema {
        &self.features
    }

    pub fn into_parts(self) -> (FeatureSchema, FittedScaler, FittedClassifier) {
        (self.features, self.scaler, self.classifier)
    }
}
