// src/ml/model_manager.rs
use ndarray::Array2;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::MlConfig;
use crate::error::ModelError;
use crate::ml::autoencoder::Autoencoder;
use crate::ml::layers::Sequential;
use crate::ml::losses::{ContractiveLoss, CustomObjects};
use crate::ml::svm::SupportVectorClassifier;
use crate::ml::{read_artifact, IntrusionModel};
use crate::models::{FeatureVector, Label, FEATURE_COUNT};

/// The three pre-trained artifacts, loaded once and shared read-only by every
/// request.
#[derive(Debug)]
pub struct ModelManager {
    autoencoder: Autoencoder,
    encoder: Sequential,
    classifier: SupportVectorClassifier,
}

impl ModelManager {
    /// Custom objects the saved autoencoder refers to by name.
    pub fn custom_objects() -> CustomObjects {
        let mut objects = CustomObjects::new();
        objects.register_loss(ContractiveLoss::CLASS_NAME, ContractiveLoss::from_config);
        objects
    }

    pub fn load(config: &MlConfig) -> Result<Self, ModelError> {
        let custom_objects = Self::custom_objects();

        let autoencoder = timed("autoencoder", &config.autoencoder_path, || {
            Autoencoder::load(&config.autoencoder_path, &custom_objects)
        })?;
        let encoder: Sequential = timed("encoder", &config.encoder_path, || read_artifact(&config.encoder_path))?;
        let classifier: SupportVectorClassifier =
            timed("classifier", &config.classifier_path, || read_artifact(&config.classifier_path))?;

        let manager = Self::from_parts(autoencoder, encoder, classifier)?;
        info!(
            loss = manager.autoencoder.loss().name(),
            encoded_dim = manager.encoder.output_dim(),
            kernel = ?manager.classifier.kernel(),
            support_vectors = manager.classifier.n_support(),
            "Models ready"
        );
        Ok(manager)
    }

    pub fn from_parts(
        autoencoder: Autoencoder,
        encoder: Sequential,
        classifier: SupportVectorClassifier,
    ) -> Result<Self, ModelError> {
        if encoder.input_dim() != FEATURE_COUNT {
            return Err(ModelError::shape("encoder input", FEATURE_COUNT, encoder.input_dim()));
        }
        if encoder.output_dim() != classifier.n_features() {
            return Err(ModelError::shape(
                "classifier input vs encoder output",
                classifier.n_features(),
                encoder.output_dim(),
            ));
        }

        Ok(Self {
            autoencoder,
            encoder,
            classifier,
        })
    }

    pub fn autoencoder(&self) -> &Autoencoder {
        &self.autoencoder
    }

    pub fn encoder(&self) -> &Sequential {
        &self.encoder
    }

    pub fn classifier(&self) -> &SupportVectorClassifier {
        &self.classifier
    }

    pub fn encode(&self, features: &FeatureVector) -> Result<Array2<f64>, ModelError> {
        self.encoder.predict(features.to_row().view())
    }
}

impl IntrusionModel for ModelManager {
    fn predict(&self, features: &FeatureVector) -> Result<Label, ModelError> {
        let encoded = self.encode(features)?;
        let labels = self.classifier.predict(encoded.view())?;
        debug!(?encoded, ?labels, "Classified feature vector");

        labels
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidArtifact("classifier returned no prediction".into()))
    }
}

fn timed<T>(kind: &str, path: &Path, load: impl FnOnce() -> Result<T, ModelError>) -> Result<T, ModelError> {
    let start = Instant::now();
    let loaded = load()?;
    info!(artifact = kind, path = %path.display(), elapsed = ?start.elapsed(), "Loaded artifact");
    Ok(loaded)
}
