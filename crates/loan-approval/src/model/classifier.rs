use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ensure_finite, ensure_width, Classifier, ModelError};

const COMPONENT: &str = "classifier";

fn default_classes() -> [i64; 2] {
    [0, 1]
}

/// Fitted classifier parameters as exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedClassifier {
    /// Binary logistic regression; picks `classes[1]` when the decision function is positive.
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_classes")]
        classes: [i64; 2],
    },
    DecisionTree(DecisionTree),
    /// Majority vote over the member trees; ties go to the smallest label.
    RandomForest { trees: Vec<DecisionTree> },
}

/// Flat node array with the root at index 0. Children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Rows with `row[feature] <= threshold` descend to `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: i64,
    },
}

impl FittedClassifier {
    pub const fn kind(&self) -> &'static str {
        match self {
            FittedClassifier::LogisticRegression { .. } => "logistic_regression",
            FittedClassifier::DecisionTree(_) => "decision_tree",
            FittedClassifier::RandomForest { .. } => "random_forest",
        }
    }

    /// Check the parameters against the width of the bundle's feature list.
    pub(crate) fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        match self {
            FittedClassifier::LogisticRegression {
                coefficients,
                intercept,
                ..
            } => {
                if coefficients.len() != n_features {
                    return Err(ModelError::DimensionMismatch {
                        component: COMPONENT,
                        expected: n_features,
                        found: coefficients.len(),
                    });
                }
                ensure_finite(COMPONENT, coefficients)?;
                ensure_finite(COMPONENT, &[*intercept])
            }
            FittedClassifier::DecisionTree(tree) => tree.validate(n_features),
            FittedClassifier::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(invalid("random forest has no trees"));
                }
                trees.iter().try_for_each(|tree| tree.validate(n_features))
            }
        }
    }
}

impl Classifier for FittedClassifier {
    fn n_features(&self) -> Option<usize> {
        match self {
            FittedClassifier::LogisticRegression { coefficients, .. } => Some(coefficients.len()),
            FittedClassifier::DecisionTree(_) | FittedClassifier::RandomForest { .. } => None,
        }
    }

    fn predict(&self, row: &[f64]) -> Result<i64, ModelError> {
        ensure_finite(COMPONENT, row)?;

        match self {
            FittedClassifier::LogisticRegression {
                coefficients,
                intercept,
                classes,
            } => {
                ensure_width(COMPONENT, coefficients.len(), row)?;
                let decision: f64 = coefficients
                    .iter()
                    .zip(row)
                    .map(|(weight, value)| weight * value)
                    .sum::<f64>()
                    + intercept;
                ensure_finite(COMPONENT, &[decision])?;
                Ok(if decision > 0.0 { classes[1] } else { classes[0] })
            }
            FittedClassifier::DecisionTree(tree) => tree.predict(row),
            FittedClassifier::RandomForest { trees } => {
                let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
                for tree in trees {
                    *votes.entry(tree.predict(row)?).or_default() += 1;
                }

                let mut winner: Option<(i64, usize)> = None;
                for (label, count) in votes {
                    if winner.map_or(true, |(_, best)| count > best) {
                        winner = Some((label, count));
                    }
                }
                winner
                    .map(|(label, _)| label)
                    .ok_or_else(|| invalid("random forest has no trees"))
            }
        }
    }
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(invalid("decision tree has no nodes"));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(invalid(format!(
                        "node {index} splits on column {feature} but only {n_features} exist"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(invalid(format!("node {index} has a non-finite threshold")));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(invalid(format!(
                            "node {index} points at invalid child {child}"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<i64, ModelError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { label }) => return Ok(*label),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).ok_or(ModelError::DimensionMismatch {
                        component: COMPONENT,
                        expected: feature + 1,
                        found: row.len(),
                    })?;
                    let next = if value <= threshold { *left } else { *right };
                    if next <= index {
                        return Err(invalid(format!("node {index} loops back to {next}")));
                    }
                    index = next;
                }
                None => return Err(invalid(format!("tree walked off node {index}"))),
            }
        }
    }
}

fn invalid(detail: impl Into<String>) -> ModelError {
    ModelError::InvalidParameters {
        component: COMPONENT,
        detail: detail.into(),
    }
}
