// src/ml/layers.rs
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    pub fn apply(&self, mut z: Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Linear => {}
            Activation::Relu => z.mapv_inplace(|v| if v < 0.0 { 0.0 } else { v }),
            Activation::Sigmoid => z.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Tanh => z.mapv_inplace(f64::tanh),
            Activation::Softmax => {
                for mut row in z.axis_iter_mut(Axis(0)) {
                    let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
                    row.mapv_inplace(|v| (v - max).exp());
                    let sum = row.sum();
                    row.mapv_inplace(|v| v / sum);
                }
            }
        }
        z
    }
}

#[derive(Debug, Deserialize)]
struct DenseSpec {
    #[serde(default)]
    name: Option<String>,
    units: usize,
    #[serde(default)]
    activation: Activation,
    kernel: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Fully connected layer, `y = activation(x · kernel + bias)`.
///
/// The kernel keeps the Keras layout: one row per input, one column per unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "DenseSpec")]
pub struct Dense {
    name: String,
    activation: Activation,
    kernel: Array2<f64>,
    bias: Array1<f64>,
}

impl TryFrom<DenseSpec> for Dense {
    type Error = ModelError;

    fn try_from(spec: DenseSpec) -> Result<Self, Self::Error> {
        let name = spec.name.unwrap_or_else(|| "dense".to_string());
        let kernel = matrix_from_rows(&spec.kernel, &format!("kernel of layer '{name}'"))?;
        Dense::new(name, kernel, Array1::from(spec.bias), spec.activation, Some(spec.units))
    }
}

impl Dense {
    pub fn new(
        name: impl Into<String>,
        kernel: Array2<f64>,
        bias: Array1<f64>,
        activation: Activation,
        units: Option<usize>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let width = kernel.ncols();

        if let Some(units) = units {
            if units != width {
                return Err(ModelError::shape(format!("kernel of layer '{name}'"), units, width));
            }
        }
        if bias.len() != width {
            return Err(ModelError::InvalidArtifact(format!(
                "layer '{name}' has {width} units but {} bias terms",
                bias.len()
            )));
        }
        if kernel.nrows() == 0 || width == 0 {
            return Err(ModelError::InvalidArtifact(format!("layer '{name}' has an empty kernel")));
        }

        Ok(Self {
            name,
            activation,
            kernel,
            bias,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.nrows()
    }

    pub fn units(&self) -> usize {
        self.kernel.ncols()
    }

    pub fn kernel(&self) -> &Array2<f64> {
        &self.kernel
    }

    pub fn forward(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        if x.ncols() != self.input_dim() {
            return Err(ModelError::shape(
                format!("input of layer '{}'", self.name),
                self.input_dim(),
                x.ncols(),
            ));
        }
        let z = x.dot(&self.kernel) + &self.bias;
        Ok(self.activation.apply(z))
    }
}

#[derive(Debug, Deserialize)]
struct SequentialSpec {
    #[serde(default)]
    name: Option<String>,
    input_dim: usize,
    layers: Vec<Dense>,
}

/// A stack of dense layers. The encoder artifact is exactly this.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SequentialSpec")]
pub struct Sequential {
    name: String,
    input_dim: usize,
    layers: Vec<Dense>,
}

impl TryFrom<SequentialSpec> for Sequential {
    type Error = ModelError;

    fn try_from(spec: SequentialSpec) -> Result<Self, Self::Error> {
        Sequential::new(
            spec.name.unwrap_or_else(|| "sequential".to_string()),
            spec.input_dim,
            spec.layers,
        )
    }
}

impl Sequential {
    pub fn new(name: impl Into<String>, input_dim: usize, layers: Vec<Dense>) -> Result<Self, ModelError> {
        let name = name.into();
        if layers.is_empty() {
            return Err(ModelError::InvalidArtifact(format!("model '{name}' has no layers")));
        }

        let mut width = input_dim;
        for layer in &layers {
            if layer.input_dim() != width {
                return Err(ModelError::shape(
                    format!("layer '{}' of model '{name}'", layer.name()),
                    width,
                    layer.input_dim(),
                ));
            }
            width = layer.units();
        }

        Ok(Self {
            name,
            input_dim,
            layers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        // non-empty by construction
        self.layers.last().map_or(self.input_dim, Dense::units)
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        if x.ncols() != self.input_dim {
            return Err(ModelError::shape(
                format!("input of model '{}'", self.name),
                self.input_dim,
                x.ncols(),
            ));
        }

        let mut out = x.to_owned();
        for layer in &self.layers {
            out = layer.forward(out.view())?;
        }
        Ok(out)
    }
}

pub(crate) fn matrix_from_rows(rows: &[Vec<f64>], context: &str) -> Result<Array2<f64>, ModelError> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(ModelError::shape(context, ncols, bad.len()));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), flat)
        .map_err(|e| ModelError::InvalidArtifact(format!("{context}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn relu_layer() -> Dense {
        Dense::new(
            "hidden",
            array![[1.0, -1.0], [2.0, 0.5]],
            array![0.0, 1.0],
            Activation::Relu,
            None,
        )
        .unwrap()
    }

    #[test]
    fn dense_forward_applies_kernel_bias_and_activation() {
        let out = relu_layer().forward(array![[1.0, 1.0]].view()).unwrap();
        // z = [1 + 2 + 0, -1 + 0.5 + 1] = [3, 0.5]
        assert_eq!(out, array![[3.0, 0.5]]);

        let out = relu_layer().forward(array![[-2.0, 0.0]].view()).unwrap();
        // z = [-2, 3]
        assert_eq!(out, array![[0.0, 3.0]]);
    }

    #[test]
    fn dense_rejects_wrong_input_width() {
        let err = relu_layer().forward(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 2, actual: 3, .. }));
    }

    #[test]
    fn dense_rejects_bias_length() {
        let err = Dense::new("bad", Array2::zeros((2, 3)), array![0.0], Activation::Linear, None);
        assert!(err.is_err());
    }

    #[test]
    fn relu_propagates_nan() {
        let out = Activation::Relu.apply(array![[f64::NAN, -1.0, f64::INFINITY]]);
        assert!(out[[0, 0]].is_nan());
        assert_eq!(out[[0, 1]], 0.0);
        assert_eq!(out[[0, 2]], f64::INFINITY);
    }

    #[test]
    fn activations() {
        let z = array![[0.0, 2.0]];
        let sig = Activation::Sigmoid.apply(z.clone());
        assert!((sig[[0, 0]] - 0.5).abs() < 1e-12);

        let soft = Activation::Softmax.apply(z.clone());
        assert!((soft.sum() - 1.0).abs() < 1e-12);
        assert!(soft[[0, 1]] > soft[[0, 0]]);

        let tanh = Activation::Tanh.apply(z);
        assert_eq!(tanh[[0, 0]], 0.0);
    }

    #[test]
    fn sequential_deserializes_and_chains_layers() {
        let json = r#"{
            "name": "encoder",
            "input_dim": 3,
            "layers": [
                {"units": 2, "activation": "relu",
                 "kernel": [[1, 0], [0, 1], [1, 1]], "bias": [0, -1]},
                {"units": 1, "kernel": [[1], [2]], "bias": [0.5]}
            ]
        }"#;
        let model: Sequential = serde_json::from_str(json).unwrap();
        assert_eq!(model.input_dim(), 3);
        assert_eq!(model.output_dim(), 1);

        // h = relu([1 + 3, 2 + 3 - 1]) = [4, 4]; y = 4 + 8 + 0.5
        let out = model.predict(array![[1.0, 2.0, 3.0]].view()).unwrap();
        assert_eq!(out, array![[12.5]]);
    }

    #[test]
    fn sequential_rejects_broken_chain() {
        let json = r#"{
            "input_dim": 3,
            "layers": [
                {"units": 2, "kernel": [[1, 0], [0, 1], [1, 1]], "bias": [0, 0]},
                {"units": 1, "kernel": [[1], [2], [3]], "bias": [0]}
            ]
        }"#;
        assert!(serde_json::from_str::<Sequential>(json).is_err());
    }

    #[test]
    fn ragged_kernel_is_rejected() {
        let json = r#"{"units": 2, "kernel": [[1, 0], [0]], "bias": [0, 0]}"#;
        assert!(serde_json::from_str::<Dense>(json).is_err());
    }
}
