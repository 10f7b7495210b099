//! Point estimators stored in the model artifact

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural problems found while validating an estimator
#[derive(Debug, Error, PartialEq)]
pub enum EstimatorError {
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },

    #[error("tree {tree}, node {node}: feature index {feature} out of range ({n_features} features)")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
        n_features: usize,
    },

    #[error("tree {tree}, node {node}: child {child} must be a later node")]
    InvalidChild { tree: usize, node: usize, child: usize },

    #[error("linear model has {actual} coefficients, expected {expected}")]
    CoefficientCount { expected: usize, actual: usize },

    #[error("ensemble has no trees")]
    NoTrees,
}

/// Point estimator variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

impl Estimator {
    /// Check internal consistency against the encoded feature count
    pub fn validate(&self, n_features: usize) -> Result<(), EstimatorError> {
        match self {
            Estimator::TreeEnsemble(ensemble) => ensemble.validate(n_features),
            Estimator::Linear(linear) => linear.validate(n_features),
        }
    }

    /// Point estimates, one per row
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Array1<f64> {
        match self {
            Estimator::TreeEnsemble(ensemble) => features
                .rows()
                .into_iter()
                .map(|row| ensemble.predict_row(row))
                .collect(),
            Estimator::Linear(linear) => {
                features.dot(&ArrayView1::from(linear.coefficients.as_slice())) + linear.intercept
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::TreeEnsemble(_) => "tree_ensemble",
            Estimator::Linear(_) => "linear",
        }
    }
}

/// How tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Random-forest style average
    #[default]
    Mean,
    /// Boosting style sum on top of `base_score`
    Sum,
}

/// Ensemble of regression trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    fn validate(&self, n_features: usize) -> Result<(), EstimatorError> {
        if self.trees.is_empty() {
            return Err(EstimatorError::NoTrees);
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(idx, tree)| tree.validate(idx, n_features))
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        match self.aggregation {
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + total,
        }
    }
}

/// A single tree, nodes stored flat with node 0 as root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

/// Split nodes send `x[feature] <= threshold` left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    fn validate(&self, tree: usize, n_features: usize) -> Result<(), EstimatorError> {
        if self.nodes.is_empty() {
            return Err(EstimatorError::EmptyTree { tree });
        }
        for (node, n) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = *n
            {
                if feature >= n_features {
                    return Err(EstimatorError::FeatureOutOfRange {
                        tree,
                        node,
                        feature,
                        n_features,
                    });
                }
                // Children strictly after the parent guarantees traversal terminates
                for child in [left, right] {
                    if child <= node || child >= self.nodes.len() {
                        return Err(EstimatorError::InvalidChild { tree, node, child });
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Linear model `intercept + x · coefficients`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn validate(&self, n_features: usize) -> Result<(), EstimatorError> {
        if self.coefficients.len() != n_features {
            return Err(EstimatorError::CoefficientCount {
                expected: n_features,
                actual: self.coefficients.len(),
            });
        }
        Ok(())
    }
}
