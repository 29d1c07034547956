// src/controllers/main_controller.rs
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::DetectionError;
use crate::ml::IntrusionModel;
use crate::models::{FeatureVector, Label};

pub const INTRUSION_MESSAGE: &str = "🚨 Intrusion Detected!";
pub const NORMAL_MESSAGE: &str = "✅ Normal Traffic";

/// Outcome of one form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Intrusion,
    Normal,
    Error(String),
}

impl Verdict {
    pub fn from_label(label: Label) -> Self {
        if label.is_intrusion() {
            Verdict::Intrusion
        } else {
            Verdict::Normal
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Intrusion => f.write_str(INTRUSION_MESSAGE),
            Verdict::Normal => f.write_str(NORMAL_MESSAGE),
            Verdict::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl From<DetectionError> for Verdict {
    fn from(err: DetectionError) -> Self {
        Verdict::Error(err.to_string())
    }
}

pub struct MainController {
    model: Arc<dyn IntrusionModel>,
}

impl MainController {
    pub fn new(model: Arc<dyn IntrusionModel>) -> Self {
        Self { model }
    }

    /// Parse → encode → classify. Every failure ends up as `Verdict::Error`.
    pub fn classify(&self, form: &HashMap<String, String>) -> Verdict {
        let verdict = match self.detect(form) {
            Ok(label) => Verdict::from_label(label),
            Err(err) => Verdict::from(err),
        };
        debug!(%verdict, "Form classified");
        verdict
    }

    fn detect(&self, form: &HashMap<String, String>) -> Result<Label, DetectionError> {
        let features = FeatureVector::from_form(form)?;
        Ok(self.model.predict(&features)?)
    }
}
