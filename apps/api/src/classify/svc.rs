//! Frozen SVM decision boundary exported from a scikit-learn binary `SVC` / `LinearSVC`.
//!
//! Artifact format (`classifier.json`):
//! ```json
//! { "kernel": "rbf", "classes": [0, 1], "intercept": -0.42,
//!   "support_vectors": [[...], ...], "dual_coef": [...], "gamma": 0.0013 }
//! ```
//! Linear models may ship `coef` instead of support vectors.

use std::path::Path;

use serde::Deserialize;

use super::InferenceError;

pub const CLASSIFIER_FILE: &str = "classifier.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf,
    Poly,
    Sigmoid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SvcModel {
    pub kernel: Kernel,
    /// `[negative, positive]` labels, in scikit-learn's `classes_` order.
    pub classes: [u8; 2],
    pub intercept: f64,
    #[serde(default)]
    pub coef: Option<Vec<f64>>,
    #[serde(default)]
    pub support_vectors: Vec<Vec<f64>>,
    #[serde(default)]
    pub dual_coef: Vec<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    #[serde(default)]
    pub coef0: f64,
    #[serde(default = "default_degree")]
    pub degree: i32,
}

fn default_degree() -> i32 {
    3
}

impl SvcModel {
    /// Reads and validates a `classifier.json` artifact.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoad(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw).map_err(|e| match e {
            InferenceError::ModelLoad(msg) => {
                InferenceError::ModelLoad(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, InferenceError> {
        let model: SvcModel = serde_json::from_str(raw)
            .map_err(|e| InferenceError::ModelLoad(format!("invalid classifier artifact: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), InferenceError> {
        let invalid = |msg: String| Err(InferenceError::ModelLoad(msg));

        if self.classes.iter().any(|&c| c > 1) || self.classes[0] == self.classes[1] {
            return invalid(format!(
                "classes must be the distinct binary labels 0 and 1, got {:?}",
                self.classes
            ));
        }

        if self.kernel == Kernel::Linear && self.coef.is_some() {
            return match &self.coef {
                Some(coef) if coef.is_empty() => invalid("coef is empty".to_string()),
                _ => Ok(()),
            };
        }

        if self.support_vectors.is_empty() {
            return invalid("support_vectors are required without a linear coef".to_string());
        }
        if self.support_vectors.len() != self.dual_coef.len() {
            return invalid(format!(
                "{} support vectors but {} dual coefficients",
                self.support_vectors.len(),
                self.dual_coef.len()
            ));
        }
        let dim = self.support_vectors[0].len();
        if dim == 0 || self.support_vectors.iter().any(|sv| sv.len() != dim) {
            return invalid("support vectors must share one non-zero dimension".to_string());
        }
        if self.kernel != Kernel::Linear && self.gamma.is_none() {
            return invalid(format!("{:?} kernel requires gamma", self.kernel));
        }
        Ok(())
    }

    /// Number of features the decision boundary was fitted on.
    pub fn dimension(&self) -> usize {
        match &self.coef {
            Some(coef) if self.kernel == Kernel::Linear => coef.len(),
            _ => self.support_vectors.first().map_or(0, Vec::len),
        }
    }

    /// Signed distance to the boundary; positive means `classes[1]`.
    pub fn decision_function(&self, x: &[f32]) -> Result<f64, InferenceError> {
        let expected = self.dimension();
        if x.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                expected,
                actual: x.len(),
            });
        }

        if let (Kernel::Linear, Some(coef)) = (self.kernel, &self.coef) {
            return Ok(dot(coef, x) + self.intercept);
        }

        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(sv, alpha)| alpha * self.kernel_value(sv, x))
            .sum();
        Ok(sum + self.intercept)
    }

    pub fn predict(&self, x: &[f32]) -> Result<u8, InferenceError> {
        let decision = self.decision_function(x)?;
        Ok(if decision > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }

    fn kernel_value(&self, sv: &[f64], x: &[f32]) -> f64 {
        let gamma = self.gamma.unwrap_or(1.0);
        match self.kernel {
            Kernel::Linear => dot(sv, x),
            Kernel::Rbf => {
                let squared: f64 = sv
                    .iter()
                    .zip(x)
                    .map(|(a, &b)| (a - b as f64).powi(2))
                    .sum();
                (-gamma * squared).exp()
            }
            Kernel::Poly => (gamma * dot(sv, x) + self.coef0).powi(self.degree),
            Kernel::Sigmoid => (gamma * dot(sv, x) + self.coef0).tanh(),
        }
    }
}

fn dot(weights: &[f64], x: &[f32]) -> f64 {
    weights.iter().zip(x).map(|(w, &v)| w * v as f64).sum()
}
