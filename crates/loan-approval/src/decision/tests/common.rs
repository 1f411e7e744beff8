use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::decision::{decision_router, ApplicantInput, DecisionService};
use crate::model::{
    Classifier, FeatureSchema, FeatureScaler, FittedClassifier, FittedScaler, ModelBundle,
    ModelError,
};

pub(super) const LOAN_FEATURES: [&str; 10] = [
    "Gender",
    "Married",
    "Education",
    "Self_Employed",
    "ApplicantIncome",
    "CoapplicantIncome",
    "LoanAmount",
    "Loan_Amount_Term",
    "Credit_History",
    "Property_Area",
];

pub(super) fn loan_features() -> FeatureSchema {
    FeatureSchema::new(LOAN_FEATURES).expect("valid loan features")
}

pub(super) fn loan_bundle() -> ModelBundle {
    let scaler = FittedScaler::Standard {
        mean: vec![
            0.18, 0.65, 0.78, 0.14, 5403.46, 1621.25, 146.41, 342.0, 0.84, 1.04,
        ],
        scale: vec![
            0.38, 0.48, 0.41, 0.35, 6105.0, 2924.0, 84.0, 65.0, 0.36, 0.79,
        ],
    };
    let classifier = FittedClassifier::LogisticRegression {
        coefficients: vec![0.05, 0.25, 0.20, -0.02, 0.03, -0.05, -0.12, -0.03, 1.35, 0.08],
        intercept: 0.85,
        classes: [0, 1],
    };

    ModelBundle::new(classifier, scaler, loan_features()).expect("consistent bundle")
}

pub(super) fn loan_service() -> DecisionService {
    DecisionService::from_bundle(loan_bundle())
}

/// Graduate, married applicant with good credit in an urban area.
pub(super) fn approved_applicant() -> ApplicantInput {
    ApplicantInput::new()
        .with("Gender", 1)
        .with("Married", 1)
        .with("Education", 1)
        .with("Self_Employed", 0)
        .with("ApplicantIncome", 5000)
        .with("CoapplicantIncome", 0)
        .with("LoanAmount", 128)
        .with("Loan_Amount_Term", 360)
        .with("Credit_History", 1)
        .with("Property_Area", 2)
}

pub(super) fn rejected_applicant() -> ApplicantInput {
    approved_applicant().with("Credit_History", 0)
}

/// Scaler double that records every row it sees.
#[derive(Default)]
pub(super) struct RecordingScaler {
    rows: Mutex<Vec<Vec<f64>>>,
}

impl RecordingScaler {
    pub(super) fn rows(&self) -> Vec<Vec<f64>> {
        self.rows.lock().expect("rows mutex poisoned").clone()
    }
}

impl FeatureScaler for RecordingScaler {
    fn n_features(&self) -> usize {
        LOAN_FEATURES.len()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .push(row.to_vec());
        Ok(row.to_vec())
    }
}

impl FeatureScaler for Arc<RecordingScaler> {
    fn n_features(&self) -> usize {
        self.as_ref().n_features()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.as_ref().transform(row)
    }
}

pub(super) struct FailingScaler;

impl FeatureScaler for FailingScaler {
    fn n_features(&self) -> usize {
        LOAN_FEATURES.len()
    }

    fn transform(&self, _row: &[f64]) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::InvalidParameters {
            component: "scaler",
            detail: "scaler state unavailable".to_string(),
        })
    }
}

/// Classifier double that returns the same label for every row.
pub(super) struct FixedLabel(pub(super) i64);

impl Classifier for FixedLabel {
    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, _row: &[f64]) -> Result<i64, ModelError> {
        Ok(self.0)
    }
}

pub(super) fn loan_router() -> axum::Router {
    decision_router(Arc::new(loan_service()), Duration::ZERO)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
