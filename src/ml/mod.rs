// src/ml/mod.rs
pub mod autoencoder;
pub mod layers;
pub mod losses;
pub mod model_manager;
pub mod svm;

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ModelError;
use crate::models::{FeatureVector, Label};

pub use autoencoder::Autoencoder;
pub use layers::{Activation, Dense, Sequential};
pub use losses::{ContractiveLoss, CustomObjects, Loss};
pub use model_manager::ModelManager;
pub use svm::{Kernel, SupportVectorClassifier};

/// Anything that can turn one connection record into a class label.
pub trait IntrusionModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Label, ModelError>;
}

pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ModelError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
