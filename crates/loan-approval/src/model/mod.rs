//! Pre-fit model artifact: scaler, classifier, and the ordered feature list they were trained on.
//!
//! Training happens elsewhere. This module only deserializes the fitted parameters and exposes
//! them through the [`FeatureScaler`] and [`Classifier`] capabilities consumed by the decision
//! service.

mod bundle;
mod classifier;
mod features;
mod scaler;

pub use bundle::{LoadError, ModelBundle};
pub use classifier::{DecisionTree, FittedClassifier, TreeNode};
pub use features::FeatureSchema;
pub use scaler::FittedScaler;

/// Deterministic numeric transform fit during training.
pub trait FeatureScaler: Send + Sync {
    fn n_features(&self) -> usize;
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Deterministic mapping from a scaled feature row to a class label.
pub trait Classifier: Send + Sync {
    /// Width of the row the classifier expects, when its parameters pin one down.
    fn n_features(&self) -> Option<usize>;
    fn predict(&self, row: &[f64]) -> Result<i64, ModelError>;
}

/// Failure raised while validating fitted parameters or applying them to a row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("{component} expects {expected} feature(s), received {found}")]
    DimensionMismatch {
        component: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{component} produced a non-finite value at column {column}")]
    NonFinite {
        component: &'static str,
        column: usize,
    },
    #[error("{component} parameters are invalid: {detail}")]
    InvalidParameters {
        component: &'static str,
        detail: String,
    },
}

pub(crate) fn ensure_width(
    component: &'static str,
    expected: usize,
    row: &[f64],
) -> Result<(), ModelError> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            component,
            expected,
            found: row.len(),
        })
    }
}

pub(crate) fn ensure_finite(component: &'static str, values: &[f64]) -> Result<(), ModelError> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(column) => Err(ModelError::NonFinite { component, column }),
        None => Ok(()),
    }
}
