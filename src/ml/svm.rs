// src/ml/svm.rs
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ml::layers::matrix_from_rows;
use crate::models::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Rbf,
    Poly,
    Sigmoid,
}

fn default_degree() -> u32 {
    3
}

fn default_classes() -> Vec<f64> {
    vec![0.0, 1.0]
}

#[derive(Debug, Deserialize)]
struct SvcSpec {
    kernel: Kernel,
    #[serde(default)]
    gamma: Option<f64>,
    #[serde(default)]
    coef0: f64,
    #[serde(default = "default_degree")]
    degree: u32,
    support_vectors: Vec<Vec<f64>>,
    dual_coef: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_classes")]
    classes: Vec<f64>,
}

/// Binary kernel SVM exported from a fitted scikit-learn `SVC`.
///
/// `decision(x) = sum_i dual_coef[i] * K(sv[i], x) + intercept`, positive
/// decisions map to `classes[1]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SvcSpec")]
pub struct SupportVectorClassifier {
    kernel: Kernel,
    gamma: f64,
    coef0: f64,
    degree: u32,
    support_vectors: Array2<f64>,
    dual_coef: Array1<f64>,
    intercept: f64,
    classes: [f64; 2],
}

impl TryFrom<SvcSpec> for SupportVectorClassifier {
    type Error = ModelError;

    fn try_from(spec: SvcSpec) -> Result<Self, Self::Error> {
        let gamma = match (spec.kernel, spec.gamma) {
            (_, Some(gamma)) => gamma,
            (Kernel::Linear, None) => 0.0,
            (kernel, None) => {
                return Err(ModelError::InvalidArtifact(format!(
                    "{kernel:?} kernel requires a numeric gamma"
                )))
            }
        };

        let classes: [f64; 2] = spec.classes.as_slice().try_into().map_err(|_| {
            ModelError::InvalidArtifact(format!(
                "binary classifier needs exactly 2 classes, got {}",
                spec.classes.len()
            ))
        })?;

        let support_vectors = matrix_from_rows(&spec.support_vectors, "support vectors")?;
        SupportVectorClassifier::new(
            spec.kernel,
            gamma,
            spec.coef0,
            spec.degree,
            support_vectors,
            Array1::from(spec.dual_coef),
            spec.intercept,
            classes,
        )
    }
}

impl SupportVectorClassifier {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kernel: Kernel,
        gamma: f64,
        coef0: f64,
        degree: u32,
        support_vectors: Array2<f64>,
        dual_coef: Array1<f64>,
        intercept: f64,
        classes: [f64; 2],
    ) -> Result<Self, ModelError> {
        if support_vectors.nrows() == 0 || support_vectors.ncols() == 0 {
            return Err(ModelError::InvalidArtifact("classifier has no support vectors".into()));
        }
        if support_vectors.nrows() != dual_coef.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "{} support vectors but {} dual coefficients",
                support_vectors.nrows(),
                dual_coef.len()
            )));
        }

        Ok(Self {
            kernel,
            gamma,
            coef0,
            degree,
            support_vectors,
            dual_coef,
            intercept,
            classes,
        })
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn n_features(&self) -> usize {
        self.support_vectors.ncols()
    }

    pub fn n_support(&self) -> usize {
        self.support_vectors.nrows()
    }

    fn kernel_row(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let sv = &self.support_vectors;
        match self.kernel {
            Kernel::Linear => sv.dot(&x),
            Kernel::Poly => {
                let degree = self.degree as i32;
                sv.dot(&x).mapv(|d| (self.gamma * d + self.coef0).powi(degree))
            }
            Kernel::Sigmoid => sv.dot(&x).mapv(|d| (self.gamma * d + self.coef0).tanh()),
            Kernel::Rbf => sv
                .axis_iter(Axis(0))
                .map(|s| {
                    let diff = &s - &x;
                    (-self.gamma * diff.dot(&diff)).exp()
                })
                .collect(),
        }
    }

    pub fn decision_function(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::shape("classifier input", self.n_features(), x.ncols()));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite {
                context: "classifier input".into(),
            });
        }

        Ok(x.axis_iter(Axis(0))
            .map(|row| self.dual_coef.dot(&self.kernel_row(row)) + self.intercept)
            .collect())
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<Label>, ModelError> {
        let decisions = self.decision_function(x)?;
        Ok(decisions
            .iter()
            .map(|&d| Label(if d > 0.0 { self.classes[1] } else { self.classes[0] }))
            .collect())
    }
}
