// src/ml/losses.rs
use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::ModelError;
use crate::ml::layers::Sequential;

/// A training loss attached to a saved model.
///
/// Inference never evaluates losses; they are resolved at load time only
/// because the saved autoencoder references one by class name.
pub trait Loss: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn call(&self, model: &Sequential, y_true: ArrayView2<f64>, y_pred: ArrayView2<f64>) -> Result<f64, ModelError>;
}

/// Builds a loss from the `config` object stored next to its class name.
pub type LossFactory = fn(&Value) -> Result<Box<dyn Loss>, ModelError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossSpec {
    pub class_name: String,
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Auto,
    None,
    Sum,
    #[default]
    SumOverBatchSize,
}

/// Name → constructor table consulted while deserializing a model's loss.
#[derive(Default)]
pub struct CustomObjects {
    losses: HashMap<String, LossFactory>,
}

impl CustomObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_loss(&mut self, class_name: impl Into<String>, factory: LossFactory) -> &mut Self {
        self.losses.insert(class_name.into(), factory);
        self
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.losses.contains_key(class_name)
    }

    /// Registered objects shadow the built-in losses.
    pub fn resolve_loss(&self, spec: &LossSpec) -> Result<Box<dyn Loss>, ModelError> {
        if let Some(factory) = self.losses.get(&spec.class_name) {
            return factory(&spec.config);
        }

        match spec.class_name.as_str() {
            "mse" | "mean_squared_error" | "MeanSquaredError" => Ok(Box::new(MeanSquaredError)),
            other => Err(ModelError::UnknownLoss(other.to_string())),
        }
    }
}

impl fmt::Debug for CustomObjects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.losses.keys().collect();
        names.sort();
        f.debug_struct("CustomObjects").field("losses", &names).finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn name(&self) -> &str {
        "mean_squared_error"
    }

    fn call(&self, _model: &Sequential, y_true: ArrayView2<f64>, y_pred: ArrayView2<f64>) -> Result<f64, ModelError> {
        mean_squared_error(y_true, y_pred)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ContractiveLossConfig {
    lam: f64,
    reduction: Reduction,
    name: String,
}

impl Default for ContractiveLossConfig {
    fn default() -> Self {
        Self {
            lam: 1e-4,
            reduction: Reduction::SumOverBatchSize,
            name: "contractive_loss".to_string(),
        }
    }
}

/// Reconstruction error plus a penalty on the encoder's Jacobian:
///
/// `mean((y_true - y_pred)^2) + lam * sum(dh^2 * sum_j W^2)`
///
/// where `W` is the first dense kernel (units × inputs once transposed),
/// `h` is that layer applied to `y_pred` and `dh = 1[h > 0]`.
///
/// The value is already a scalar over the whole batch, so every
/// `reduction` yields the same result; it is only stored.
#[derive(Debug, Clone)]
pub struct ContractiveLoss {
    lam: f64,
    reduction: Reduction,
    name: String,
}

impl ContractiveLoss {
    pub const CLASS_NAME: &'static str = "ContractiveLoss";

    pub fn new(lam: f64) -> Self {
        Self {
            lam,
            reduction: Reduction::SumOverBatchSize,
            name: "contractive_loss".to_string(),
        }
    }

    pub fn lam(&self) -> f64 {
        self.lam
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn from_config(config: &Value) -> Result<Box<dyn Loss>, ModelError> {
        let parsed: ContractiveLossConfig = if config.is_null() {
            ContractiveLossConfig::default()
        } else {
            serde_json::from_value(config.clone()).map_err(|e| ModelError::LossConfig {
                name: Self::CLASS_NAME.to_string(),
                reason: e.to_string(),
            })?
        };

        Ok(Box::new(Self {
            lam: parsed.lam,
            reduction: parsed.reduction,
            name: parsed.name,
        }))
    }
}

impl Loss for ContractiveLoss {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, model: &Sequential, y_true: ArrayView2<f64>, y_pred: ArrayView2<f64>) -> Result<f64, ModelError> {
        let reconstruction = mean_squared_error(y_true, y_pred)?;

        let encoder_layer = model
            .layers()
            .first()
            .ok_or_else(|| ModelError::InvalidArtifact("contractive loss needs a dense layer".into()))?;

        let h = encoder_layer.forward(y_pred)?;
        let dh = h.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        let w_sq = encoder_layer.kernel().mapv(|w| w * w).sum_axis(Axis(0));

        let penalty = self.lam * (dh.mapv(|d| d * d) * &w_sq).sum();
        Ok(reconstruction + penalty)
    }
}

fn mean_squared_error(y_true: ArrayView2<f64>, y_pred: ArrayView2<f64>) -> Result<f64, ModelError> {
    if y_true.dim() != y_pred.dim() {
        return Err(ModelError::shape("loss targets", y_true.ncols(), y_pred.ncols()));
    }
    let diff = &y_true - &y_pred;
    Ok(diff.mapv(|d| d * d).mean().unwrap_or(0.0))
}
