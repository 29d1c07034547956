// src/models/detector_models.rs
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DetectionError;

pub const FEATURE_COUNT: usize = 10;

/// Form field names, in the column order the encoder was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "protocol_type",
    "service",
    "flag",
    "logged_in",
    "count",
    "same_srv_rate",
    "diff_srv_rate",
    "dst_host_srv_count",
    "dst_host_same_srv_rate",
    "dst_host_same_src_port_rate",
];

/// One connection record as submitted through the form.
///
/// Categorical columns (`protocol_type`, `service`, `flag`) arrive already
/// label-encoded. Codes are passed through as-is: nothing here checks them
/// against the vocabulary the models were trained with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub protocol_type: f64,
    pub service: f64,
    pub flag: f64,
    pub logged_in: f64,
    pub count: f64,
    pub same_srv_rate: f64,
    pub diff_srv_rate: f64,
    pub dst_host_srv_count: f64,
    pub dst_host_same_srv_rate: f64,
    pub dst_host_same_src_port_rate: f64,
}

impl FeatureVector {
    /// Reads the ten named fields, failing on the first one that is absent
    /// or does not parse as a float.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, DetectionError> {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, &name) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
            let raw = form.get(name).ok_or(DetectionError::MissingField(name))?;
            *slot = parse_float(name, raw)?;
        }
        Ok(Self::from_array(values))
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            protocol_type: values[0],
            service: values[1],
            flag: values[2],
            logged_in: values[3],
            count: values[4],
            same_srv_rate: values[5],
            diff_srv_rate: values[6],
            dst_host_srv_count: values[7],
            dst_host_same_srv_rate: values[8],
            dst_host_same_src_port_rate: values[9],
        }
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.protocol_type,
            self.service,
            self.flag,
            self.logged_in,
            self.count,
            self.same_srv_rate,
            self.diff_srv_rate,
            self.dst_host_srv_count,
            self.dst_host_same_srv_rate,
            self.dst_host_same_src_port_rate,
        ]
    }

    /// Single-row table, shape `(1, FEATURE_COUNT)`.
    pub fn to_row(&self) -> Array2<f64> {
        let values = self.to_array();
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| values[j])
    }
}

fn parse_float(field: &'static str, raw: &str) -> Result<f64, DetectionError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DetectionError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Class value produced by the classifier. Any non-zero value is an intrusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Label(pub f64);

impl Label {
    pub fn is_intrusion(&self) -> bool {
        self.0 != 0.0
    }
}
