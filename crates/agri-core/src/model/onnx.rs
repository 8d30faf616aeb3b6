//! ONNX artifacts executed with tract (pure Rust, no native runtime).

use super::{InputTensor, Predictor};
use crate::error::{ModelError, ModelResult};
use std::path::Path;
use tract_onnx::prelude::*;

/// Optimized, runnable ONNX graph. Only the first output is read; integer
/// outputs (e.g. a classifier's `label`) are cast to f32.
pub struct OnnxModel {
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxModel {
    /// Load and optimize. `input_shape` pins the first input when the graph
    /// leaves it symbolic (batch dimension included).
    pub fn load(path: &Path, input_shape: Option<&[usize]>) -> ModelResult<Self> {
        let load_err = |e: TractError| ModelError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let mut model = tract_onnx::onnx().model_for_path(path).map_err(load_err)?;
        if let Some(shape) = input_shape {
            let dims: TVec<usize> = shape.iter().copied().collect();
            model = model
                .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), dims))
                .map_err(load_err)?;
        }
        let plan = model
            .into_optimized()
            .and_then(|m| m.into_runnable())
            .map_err(load_err)?;

        tracing::debug!(path = %path.display(), "ONNX artifact ready");
        Ok(Self { plan })
    }
}

impl Predictor for OnnxModel {
    fn predict(&self, input: &InputTensor) -> ModelResult<Vec<f32>> {
        let expected: usize = input.shape.iter().product();
        if expected != input.values.len() {
            return Err(ModelError::Shape {
                expected,
                actual: input.values.len(),
            });
        }

        let tensor = Tensor::from_shape(&input.shape, &input.values)
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let first = outputs.first().ok_or(ModelError::EmptyOutput)?;
        let values = first
            .cast_to::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        let slice = values
            .as_slice::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        if slice.is_empty() {
            return Err(ModelError::EmptyOutput);
        }
        Ok(slice.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_load_error() {
        match OnnxModel::load(Path::new("/nonexistent/model.onnx"), Some(&[1, 7])) {
            Err(ModelError::Load { path, .. }) => assert!(path.ends_with("model.onnx")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loading a missing file must fail"),
        }
    }
}
