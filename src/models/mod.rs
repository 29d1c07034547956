// src/models/mod.rs
mod detector_models;

pub use detector_models::{FeatureVector, Label, FEATURE_COUNT, FEATURE_NAMES};
