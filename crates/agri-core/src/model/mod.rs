//! **Model artifacts**: opaque predict/transform capabilities loaded from disk.
//!
//! Implement `Predictor` for anything that maps an input tensor to a score or
//! value vector, and `Transformer` for feature preprocessors. The registry
//! stores both behind `Arc<dyn _>` so handlers never see the concrete runtime.

pub mod onnx;
pub mod preprocess;
pub mod registry;

use crate::error::ModelResult;
use std::fmt;
use std::sync::Arc;

pub use onnx::OnnxModel;
pub use preprocess::{ColumnKind, ColumnPreprocessor};
pub use registry::{Capability, ModelEntry, ModelRegistry, ModelStatus};

/// Dense f32 input with an explicit shape (batch dimension included).
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

impl InputTensor {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { shape, values }
    }

    /// One sample as a `[1, n]` batch.
    pub fn row(values: Vec<f32>) -> Self {
        Self {
            shape: vec![1, values.len()],
            values,
        }
    }
}

/// A single raw feature handed to a `Transformer`.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Category(v.to_string())
    }
}

/// Black-box model: tensor in, flat output out.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: &InputTensor) -> ModelResult<Vec<f32>>;
}

/// Black-box feature preprocessor: one raw row in, one model-ready row out.
pub trait Transformer: Send + Sync {
    fn transform(&self, row: &[FeatureValue]) -> ModelResult<Vec<f32>>;
}

/// Whatever a registry entry holds once deserialization succeeded.
#[derive(Clone)]
pub enum Artifact {
    Predictor(Arc<dyn Predictor>),
    Transformer(Arc<dyn Transformer>),
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Predictor(_) => f.write_str("Artifact::Predictor"),
            Artifact::Transformer(_) => f.write_str("Artifact::Transformer"),
        }
    }
}

/// Index of the highest score; first one wins on ties. `None` for empty input.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if score <= b => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Classifier output → class index. A single value is a predicted class id;
/// a longer vector is a score distribution.
pub fn class_index(output: &[f32]) -> Option<usize> {
    match output {
        [] => None,
        [id] if *id >= 0.0 && id.is_finite() => Some(id.round() as usize),
        [_] => None,
        scores => argmax(scores),
    }
}
