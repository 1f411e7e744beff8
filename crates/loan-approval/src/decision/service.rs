use tracing::debug;

use super::domain::{ApplicantInput, ApplicantRecord, Decision, PredictionError};
use super::form::FormSchema;
use crate::model::{
    Classifier, FeatureSchema, FeatureScaler, FittedClassifier, FittedScaler, ModelBundle,
    ModelError,
};

/// Stateless decision service holding the bundle's feature list and its scaler/classifier.
///
/// Constructed once at startup and shared read-only across requests.
pub struct DecisionService<S = FittedScaler, C = FittedClassifier> {
    features: FeatureSchema,
    form: FormSchema,
    scaler: S,
    classifier: C,
}

impl DecisionService<FittedScaler, FittedClassifier> {
    /// Take ownership of a loaded bundle for the life of the process.
    pub fn from_bundle(bundle: ModelBundle) -> Self {
        let (features, scaler, classifier) = bundle.into_parts();
        Self::new(features, scaler, classifier)
    }
}

impl<S, C> DecisionService<S, C>
where
    S: FeatureScaler,
    C: Classifier,
{
    pub fn new(features: FeatureSchema, scaler: S, classifier: C) -> Self {
        let form = FormSchema::for_features(&features);
        Self {
            features,
            form,
            scaler,
            classifier,
        }
    }

    pub fn features(&self) -> &FeatureSchema {
        &self.features
    }

    pub fn form(&self) -> &FormSchema {
        &self.form
    }

    /// Validate raw input into a record bound to this service's feature list.
    pub fn record(&self, input: &ApplicantInput) -> Result<ApplicantRecord, PredictionError> {
        ApplicantRecord::from_input(&self.features, &self.form, input)
    }

    /// Run the record through scaler and classifier and map the label to a decision.
    pub fn predict(&self, record: &ApplicantRecord) -> Result<Decision, PredictionError> {
        self.ensure_columns(record)?;

        let row = record.to_row();
        let scaled = self.scaler.transform(&row)?;
        if scaled.len() != row.len() {
            return Err(ModelError::DimensionMismatch {
                component: "scaler output",
                expected: row.len(),
                found: scaled.len(),
            }
            .into());
        }

        let label = self.classifier.predict(&scaled)?;
        let decision = Decision::from_label(label)?;

        debug!(decision = decision.label(), label, "loan decision computed");
        Ok(decision)
    }

    /// Validate and predict in one step.
    pub fn decide(&self, input: &ApplicantInput) -> Result<Decision, PredictionError> {
        let record = self.record(input)?;
        self.predict(&record)
    }

    fn ensure_columns(&self, record: &ApplicantRecord) -> Result<(), PredictionError> {
        if record.len() != self.features.len() {
            return Err(PredictionError::ColumnCount {
                expected: self.features.len(),
                found: record.len(),
            });
        }

        let mismatch = self
            .features
            .names()
            .iter()
            .zip(record.names())
            .enumerate()
            .find(|(_, (expected, found))| expected.as_str() != *found);

        match mismatch {
            Some((position, (expected, found))) => Err(PredictionError::ColumnMismatch {
                position,
                expected: expected.clone(),
                found: found.to_string(),
            }),
            None => Ok(()),
        }
    }
}
