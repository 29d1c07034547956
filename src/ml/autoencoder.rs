// src/ml/autoencoder.rs
use ndarray::{Array2, ArrayView2};
use serde::Deserialize;
use std::path::Path;

use crate::error::ModelError;
use crate::ml::layers::{Dense, Sequential};
use crate::ml::losses::{CustomObjects, Loss, LossSpec};
use crate::ml::read_artifact;

#[derive(Debug, Deserialize)]
struct AutoencoderSpec {
    #[serde(default)]
    name: Option<String>,
    input_dim: usize,
    layers: Vec<Dense>,
    loss: LossSpec,
}

/// The stacked contractive autoencoder the encoder was cut from.
///
/// Only its loss matters to the server: loading it proves the custom loss is
/// registered under the name the saved graph expects.
#[derive(Debug)]
pub struct Autoencoder {
    model: Sequential,
    loss: Box<dyn Loss>,
}

impl Autoencoder {
    pub fn load(path: &Path, custom_objects: &CustomObjects) -> Result<Self, ModelError> {
        let spec: AutoencoderSpec = read_artifact(path)?;
        let model = Sequential::new(
            spec.name.unwrap_or_else(|| "autoencoder".to_string()),
            spec.input_dim,
            spec.layers,
        )?;
        let loss = custom_objects.resolve_loss(&spec.loss)?;
        Self::new(model, loss)
    }

    pub fn new(model: Sequential, loss: Box<dyn Loss>) -> Result<Self, ModelError> {
        if model.output_dim() != model.input_dim() {
            return Err(ModelError::shape(
                format!("reconstruction of model '{}'", model.name()),
                model.input_dim(),
                model.output_dim(),
            ));
        }
        Ok(Self { model, loss })
    }

    pub fn model(&self) -> &Sequential {
        &self.model
    }

    pub fn loss(&self) -> &dyn Loss {
        self.loss.as_ref()
    }

    pub fn reconstruct(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        self.model.predict(x)
    }

    /// Training loss of reconstructing `x`.
    pub fn evaluate(&self, x: ArrayView2<f64>) -> Result<f64, ModelError> {
        let reconstruction = self.reconstruct(x)?;
        self.loss.call(&self.model, x, reconstruction.view())
    }
}
