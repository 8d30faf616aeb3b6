//! Model Registry: every artifact the API serves, keyed by name.
//!
//! Populated once on the startup path, then shared read-only (`Arc<ModelRegistry>`).
//! A failed load is recorded as a permanently unavailable entry; it is never retried.

use super::{Artifact, ColumnPreprocessor, OnnxModel, Predictor, Transformer};
use crate::config::DataPaths;
use crate::error::ModelResult;
use crate::imaging::{IMAGE_CHANNELS, IMAGE_SIZE};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CROP_MODEL: &str = "crop_model";
pub const CROP_SCALER: &str = "crop_scaler";
pub const DISEASE_MODEL: &str = "disease_model";
pub const YIELD_MODEL: &str = "yield_model";
pub const YIELD_PREPROCESSOR: &str = "yield_preprocessor";

/// Width of the crop feature row: N, P, K, temperature, humidity, pH, rainfall.
pub const CROP_FEATURES: usize = 7;

/// A user-facing prediction service and the artifacts it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CropRecommendation,
    DiseaseDetection,
    YieldPrediction,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::CropRecommendation,
        Capability::DiseaseDetection,
        Capability::YieldPrediction,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Capability::CropRecommendation => "crop_recommendation",
            Capability::DiseaseDetection => "disease_detection",
            Capability::YieldPrediction => "yield_prediction",
        }
    }

    /// Human label used in "model not available" messages.
    pub fn label(self) -> &'static str {
        match self {
            Capability::CropRecommendation => "Crop recommendation",
            Capability::DiseaseDetection => "Disease detection",
            Capability::YieldPrediction => "Yield prediction",
        }
    }

    pub fn artifacts(self) -> &'static [&'static str] {
        match self {
            Capability::CropRecommendation => &[CROP_MODEL, CROP_SCALER],
            Capability::DiseaseDetection => &[DISEASE_MODEL],
            Capability::YieldPrediction => &[YIELD_MODEL, YIELD_PREPROCESSOR],
        }
    }
}

/// Availability flags reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub crop_recommendation: bool,
    pub disease_detection: bool,
    pub yield_prediction: bool,
}

#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub name: String,
    pub path: Option<PathBuf>,
    artifact: Option<Artifact>,
}

impl ModelEntry {
    pub fn available(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistry {
    entries: HashMap<String, ModelEntry>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to deserialize `path` with `loader`. Failures are logged and recorded
    /// as an unavailable entry; they never propagate.
    pub fn load<F>(&mut self, name: &str, path: &Path, loader: F) -> &ModelEntry
    where
        F: FnOnce(&Path) -> ModelResult<Artifact>,
    {
        let artifact = match loader(path) {
            Ok(artifact) => {
                tracing::info!(artifact = name, path = %path.display(), "Model artifact loaded");
                Some(artifact)
            }
            Err(e) => {
                tracing::error!(
                    artifact = name,
                    path = %path.display(),
                    error = %e,
                    "Model artifact failed to load; marking unavailable"
                );
                None
            }
        };
        self.put(ModelEntry {
            name: name.to_string(),
            path: Some(path.to_path_buf()),
            artifact,
        })
    }

    /// Register an already-built artifact.
    pub fn insert(&mut self, name: &str, artifact: Artifact) -> &ModelEntry {
        self.put(ModelEntry {
            name: name.to_string(),
            path: None,
            artifact: Some(artifact),
        })
    }

    fn put(&mut self, entry: ModelEntry) -> &ModelEntry {
        let name = entry.name.clone();
        self.entries.insert(name.clone(), entry);
        &self.entries[&name]
    }

    pub fn entry(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.get(name)
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.entries.get(name).and_then(ModelEntry::artifact)
    }

    pub fn predictor(&self, name: &str) -> Option<Arc<dyn Predictor>> {
        match self.get(name)? {
            Artifact::Predictor(p) => Some(Arc::clone(p)),
            Artifact::Transformer(_) => None,
        }
    }

    pub fn transformer(&self, name: &str) -> Option<Arc<dyn Transformer>> {
        match self.get(name)? {
            Artifact::Transformer(t) => Some(Arc::clone(t)),
            Artifact::Predictor(_) => None,
        }
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Per-artifact availability.
    pub fn status_snapshot(&self) -> BTreeMap<String, bool> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.available()))
            .collect()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        capability
            .artifacts()
            .iter()
            .all(|name| self.is_available(name))
    }

    pub fn capability_status(&self) -> ModelStatus {
        ModelStatus {
            crop_recommendation: self.supports(Capability::CropRecommendation),
            disease_detection: self.supports(Capability::DiseaseDetection),
            yield_prediction: self.supports(Capability::YieldPrediction),
        }
    }

    /// Load every artifact named in `paths`. Runs synchronously before the server binds.
    pub fn from_paths(paths: &DataPaths) -> Self {
        let mut registry = Self::new();

        registry.load(CROP_SCALER, &paths.model(&paths.crop_scaler), load_preprocessor);
        registry.load(CROP_MODEL, &paths.model(&paths.crop_model), |p| {
            load_onnx(p, Some(&[1, CROP_FEATURES]))
        });
        registry.load(DISEASE_MODEL, &paths.model(&paths.disease_model), |p| {
            load_onnx(p, Some(&[1, IMAGE_SIZE as usize, IMAGE_SIZE as usize, IMAGE_CHANNELS]))
        });

        let mut yield_width = None;
        registry.load(YIELD_PREPROCESSOR, &paths.model(&paths.yield_preprocessor), |p| {
            let pre = ColumnPreprocessor::load(p)?;
            yield_width = Some(pre.output_width());
            Ok(Artifact::Transformer(Arc::new(pre)))
        });
        registry.load(YIELD_MODEL, &paths.model(&paths.yield_model), |p| match yield_width {
            Some(width) => load_onnx(p, Some(&[1, width])),
            None => load_onnx(p, None),
        });

        let status = registry.capability_status();
        tracing::info!(
            crop_recommendation = status.crop_recommendation,
            disease_detection = status.disease_detection,
            yield_prediction = status.yield_prediction,
            "Model registry initialized"
        );
        registry
    }
}

fn load_onnx(path: &Path, input_shape: Option<&[usize]>) -> ModelResult<Artifact> {
    let model = OnnxModel::load(path, input_shape)?;
    Ok(Artifact::Predictor(Arc::new(model)))
}

fn load_preprocessor(path: &Path) -> ModelResult<Artifact> {
    let pre = ColumnPreprocessor::load(path)?;
    Ok(Artifact::Transformer(Arc::new(pre)))
}
