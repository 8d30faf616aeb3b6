//! **agri_core**: model registry, prediction pipelines and reference data for
//! the agricultural ML API.
//!
//! The HTTP surface lives in the `agri-gateway` binary; everything here is
//! synchronous and runtime-agnostic.

pub mod config;
pub mod crops;
pub mod error;
pub mod imaging;
pub mod inference;
pub mod labels;
pub mod model;
pub mod nutrients;

pub use config::{DataPaths, ServerConfig};
pub use error::{AgriError, AgriResult, DataError, ModelError, ModelResult};
pub use inference::{
    advise_fertilizer, detect_disease, predict_yield, recommend_crop, CropFeatures,
    CropRecommendation, DiseaseDiagnosis, FertilizerAdvice, YieldEstimate, YieldFeatures,
};
pub use labels::{DiseaseRecord, KnowledgeBase, LabelAliases};
pub use model::{Capability, ModelRegistry, ModelStatus};
pub use nutrients::{NutrientReading, NutrientTable};

/// Crate version reported by the API banner.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
