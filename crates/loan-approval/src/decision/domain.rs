use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::form::FormSchema;
use crate::model::{FeatureSchema, ModelError};

/// Binary outcome of a loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Classifier label 1 approves, 0 rejects; anything else means the bundle was not trained
    /// for this decision.
    pub fn from_label(label: i64) -> Result<Self, PredictionError> {
        match label {
            1 => Ok(Decision::Approved),
            0 => Ok(Decision::Rejected),
            other => Err(PredictionError::UnexpectedLabel(other)),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Decision::Approved => "Loan Approved! Congratulations!",
            Decision::Rejected => "Loan Rejected. Criteria not met.",
        }
    }

    pub const fn is_approved(self) -> bool {
        matches!(self, Decision::Approved)
    }
}

/// Raw form submission keyed by feature name, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApplicantInput(BTreeMap<String, Value>);

impl ApplicantInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(feature, value);
        self
    }

    pub fn insert(&mut self, feature: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(feature.into(), value.into());
    }

    pub fn remove(&mut self, feature: &str) -> Option<Value> {
        self.0.remove(feature)
    }

    pub fn get(&self, feature: &str) -> Option<&Value> {
        self.0.get(feature)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ApplicantInput
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(feature, value)| (feature.into(), value.into()))
                .collect(),
        )
    }
}

/// A feature named twice in one submission is rejected rather than letting the last value win.
impl<'de> Deserialize<'de> for ApplicantInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct InputVisitor;

        impl<'de> Visitor<'de> for InputVisitor {
            type Value = ApplicantInput;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of feature values keyed by feature name")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut values = BTreeMap::new();
                while let Some((feature, value)) = map.next_entry::<String, Value>()? {
                    match values.entry(feature) {
                        Entry::Occupied(entry) => {
                            return Err(de::Error::custom(format!(
                                "feature `{}` is given more than once",
                                entry.key()
                            )))
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(value);
                        }
                    }
                }
                Ok(ApplicantInput(values))
            }
        }

        deserializer.deserialize_map(InputVisitor)
    }
}

/// Validated applicant values, one per declared feature, stored in the bundle's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantRecord {
    values: Vec<(String, u64)>,
}

impl ApplicantRecord {
    /// Bind raw input to the feature list by name. Every declared feature must be present with a
    /// non-negative whole number inside its form domain, and no undeclared names are allowed.
    pub fn from_input(
        features: &FeatureSchema,
        form: &FormSchema,
        input: &ApplicantInput,
    ) -> Result<Self, PredictionError> {
        let mut values = Vec::with_capacity(features.len());

        for name in features.names() {
            let raw = match input.get(name) {
                Some(Value::Null) | None => {
                    return Err(PredictionError::MissingFeature(name.clone()))
                }
                Some(raw) => raw,
            };
            let value = whole_number(name, raw)?;

            if let Some(field) = form.field(name) {
                if !field.widget.accepts(value) {
                    return Err(PredictionError::InvalidValue {
                        feature: name.clone(),
                        reason: field.widget.describe_domain(),
                    });
                }
            }

            values.push((name.clone(), value));
        }

        if let Some(unknown) = input.0.keys().find(|name| !features.contains(name)) {
            return Err(PredictionError::UnknownFeature(unknown.clone()));
        }

        Ok(Self { values })
    }

    pub fn get(&self, feature: &str) -> Option<u64> {
        self.values
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Single numeric row in column order, ready for the scaler.
    pub fn to_row(&self) -> Vec<f64> {
        self.values.iter().map(|(_, value)| *value as f64).collect()
    }
}

// Largest integer an f64 represents exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

fn whole_number(feature: &str, raw: &Value) -> Result<u64, PredictionError> {
    let invalid = |reason: &str| PredictionError::InvalidValue {
        feature: feature.to_string(),
        reason: reason.to_string(),
    };

    let Value::Number(number) = raw else {
        return Err(invalid("must be numeric"));
    };

    if let Some(value) = number.as_u64() {
        return Ok(value);
    }
    if number.as_i64().is_some() {
        return Err(invalid("must be non-negative"));
    }

    match number.as_f64() {
        Some(value) if value < 0.0 => Err(invalid("must be non-negative")),
        Some(value) if value.fract() != 0.0 => Err(invalid("must be a whole number")),
        Some(value) if value <= MAX_EXACT_FLOAT => Ok(value as u64),
        _ => Err(invalid("is out of range")),
    }
}

/// Per-request failure. Never fatal: the next request is evaluated independently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("missing value for feature `{0}`")]
    MissingFeature(String),
    #[error("feature `{0}` is not declared by the model")]
    UnknownFeature(String),
    #[error("invalid value for feature `{feature}`: {reason}")]
    InvalidValue { feature: String, reason: String },
    #[error("record column {position} is `{found}` but the model expects `{expected}`")]
    ColumnMismatch {
        position: usize,
        expected: String,
        found: String,
    },
    #[error("record has {found} column(s) but the model expects {expected}")]
    ColumnCount { expected: usize, found: usize },
    #[error("classifier returned unexpected label {0}")]
    UnexpectedLabel(i64),
    #[error("model evaluation failed: {0}")]
    Model(#[from] ModelError),
}

impl PredictionError {
    /// Feature the requester should correct, when the failure is tied to one.
    pub fn feature(&self) -> Option<&str> {
        match self {
            PredictionError::MissingFeature(feature)
            | PredictionError::UnknownFeature(feature)
            | PredictionError::InvalidValue { feature, .. } => Some(feature.as_str()),
            _ => None,
        }
    }

    /// Whether the failure stems from the submitted input rather than the model.
    pub fn is_input_error(&self) -> bool {
        self.feature().is_some()
    }
}
