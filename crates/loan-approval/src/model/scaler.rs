use serde::{Deserialize, Serialize};

use super::{ensure_finite, ensure_width, FeatureScaler, ModelError};

const COMPONENT: &str = "scaler";

/// Fitted scaler parameters as exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// Standardization: `(x - mean) / scale`. A zero scale marks a constant column and is
    /// treated as 1.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Range scaling: `x * scale + min`.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    Identity { n_features: usize },
}

impl FittedScaler {
    pub const fn kind(&self) -> &'static str {
        match self {
            FittedScaler::Standard { .. } => "standard",
            FittedScaler::MinMax { .. } => "min_max",
            FittedScaler::Identity { .. } => "identity",
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let (offsets, factors) = match self {
            FittedScaler::Standard { mean, scale } => (mean, scale),
            FittedScaler::MinMax { min, scale } => (min, scale),
            FittedScaler::Identity { n_features } => {
                if *n_features == 0 {
                    return Err(invalid("identity scaler declares zero features"));
                }
                return Ok(());
            }
        };

        if offsets.is_empty() {
            return Err(invalid("no fitted columns"));
        }
        if offsets.len() != factors.len() {
            return Err(invalid(format!(
                "{} offset(s) but {} scale factor(s)",
                offsets.len(),
                factors.len()
            )));
        }
        ensure_finite(COMPONENT, offsets)?;
        ensure_finite(COMPONENT, factors)
    }
}

impl FeatureScaler for FittedScaler {
    fn n_features(&self) -> usize {
        match self {
            FittedScaler::Standard { mean, .. } => mean.len(),
            FittedScaler::MinMax { min, .. } => min.len(),
            FittedScaler::Identity { n_features } => *n_features,
        }
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        ensure_width(COMPONENT, self.n_features(), row)?;
        ensure_finite(COMPONENT, row)?;

        let scaled: Vec<f64> = match self {
            FittedScaler::Standard { mean, scale } => row
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(value, (mean, scale))| {
                    let divisor = if *scale == 0.0 { 1.0 } else { *scale };
                    (value - mean) / divisor
                })
                .collect(),
            FittedScaler::MinMax { min, scale } => row
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(value, (min, scale))| value * scale + min)
                .collect(),
            FittedScaler::Identity { .. } => row.to_vec(),
        };

        ensure_finite(COMPONENT, &scaled)?;
        Ok(scaled)
    }
}

fn invalid(detail: impl Into<String>) -> ModelError {
    ModelError::InvalidParameters {
        component: COMPONENT,
        detail: detail.into(),
    }
}
