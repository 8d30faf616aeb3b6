//! **Prediction pipelines**: validated features in, response payloads out.
//!
//! Each pipeline is synchronous and CPU-bound; callers on an async runtime
//! run them on the blocking pool. Artifacts come from the registry as
//! `Option`, so an unavailable capability surfaces as `ModelUnavailable`
//! before anything is invoked.

use crate::crops::{crop_label, recommendation_message};
use crate::error::{AgriError, AgriResult, ModelError};
use crate::imaging::prepare_image;
use crate::labels::{class_label, display_name, KnowledgeBase, LabelAliases, DISEASE_CLASSES};
use crate::model::registry::{
    CROP_MODEL, CROP_SCALER, DISEASE_MODEL, YIELD_MODEL, YIELD_PREPROCESSOR,
};
use crate::model::{
    class_index, Capability, FeatureValue, InputTensor, ModelRegistry, Predictor, Transformer,
};
use crate::nutrients::{NutrientReading, NutrientTable};
use serde::Serialize;
use std::sync::Arc;

pub const YIELD_UNIT: &str = "tonnes per hectare";

/// Column positions of the categorical yield inputs.
const AREA_COLUMN: usize = 4;
const ITEM_COLUMN: usize = 5;

fn predictor(registry: &ModelRegistry, name: &str, cap: Capability) -> AgriResult<Arc<dyn Predictor>> {
    registry
        .predictor(name)
        .ok_or_else(|| AgriError::ModelUnavailable(cap.label().to_string()))
}

fn transformer(
    registry: &ModelRegistry,
    name: &str,
    cap: Capability,
) -> AgriResult<Arc<dyn Transformer>> {
    registry
        .transformer(name)
        .ok_or_else(|| AgriError::ModelUnavailable(cap.label().to_string()))
}

// ---------------------------------------------------------------------------
// Crop recommendation
// ---------------------------------------------------------------------------

/// Soil and climate reading, echoed back as `input_features`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropFeatures {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl CropFeatures {
    fn row(&self) -> Vec<FeatureValue> {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
        .into_iter()
        .map(FeatureValue::Number)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRecommendation {
    pub prediction: String,
    pub message: String,
    pub confidence: &'static str,
    pub input_features: CropFeatures,
}

pub fn recommend_crop(
    registry: &ModelRegistry,
    features: CropFeatures,
) -> AgriResult<CropRecommendation> {
    let cap = Capability::CropRecommendation;
    let scaler = transformer(registry, CROP_SCALER, cap)?;
    let model = predictor(registry, CROP_MODEL, cap)?;

    let scaled = scaler.transform(&features.row())?;
    let output = model.predict(&InputTensor::row(scaled))?;
    let index = class_index(&output)
        .ok_or_else(|| AgriError::Internal(format!("crop model output {output:?} has no class")))?;
    let crop = crop_label(index)?;

    tracing::debug!(crop, index, "Crop recommendation computed");
    Ok(CropRecommendation {
        prediction: crop.to_string(),
        message: recommendation_message(crop),
        confidence: "High",
        input_features: features,
    })
}

// ---------------------------------------------------------------------------
// Fertilizer recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientBreakdown {
    #[serde(rename = "required_N")]
    pub required_n: f64,
    #[serde(rename = "current_N")]
    pub current_n: f64,
    #[serde(rename = "N_diff")]
    pub n_diff: f64,
    #[serde(rename = "required_P")]
    pub required_p: f64,
    #[serde(rename = "current_P")]
    pub current_p: f64,
    #[serde(rename = "P_diff")]
    pub p_diff: f64,
    #[serde(rename = "required_K")]
    pub required_k: f64,
    #[serde(rename = "current_K")]
    pub current_k: f64,
    #[serde(rename = "K_diff")]
    pub k_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerAdvice {
    pub recommendation: &'static str,
    pub nutrient_analysis: NutrientBreakdown,
    pub primary_deficiency: &'static str,
    pub crop: String,
}

pub fn advise_fertilizer(
    table: &NutrientTable,
    crop: &str,
    current: NutrientReading,
) -> AgriResult<FertilizerAdvice> {
    let analysis = table.resolve(crop, current)?;
    let (req, cur, diff) = (analysis.required, analysis.current, analysis.diff);

    tracing::debug!(crop, key = analysis.key.as_str(), "Fertilizer recommendation resolved");
    Ok(FertilizerAdvice {
        recommendation: analysis.recommendation(),
        nutrient_analysis: NutrientBreakdown {
            required_n: req.nitrogen,
            current_n: cur.nitrogen,
            n_diff: diff.nitrogen,
            required_p: req.phosphorus,
            current_p: cur.phosphorus,
            p_diff: diff.phosphorus,
            required_k: req.potassium,
            current_k: cur.potassium,
            k_diff: diff.potassium,
        },
        primary_deficiency: analysis.primary.as_str(),
        crop: crop.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Disease detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseDetails {
    pub cause: String,
    pub cure: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseDiagnosis {
    pub prediction: String,
    pub disease: String,
    pub class_index: usize,
    pub total_classes: usize,
    /// Present only when the knowledge base has a matching record.
    #[serde(flatten)]
    pub details: Option<DiseaseDetails>,
}

pub fn detect_disease(
    registry: &ModelRegistry,
    knowledge_base: Option<&KnowledgeBase>,
    aliases: &LabelAliases,
    image: &[u8],
) -> AgriResult<DiseaseDiagnosis> {
    let model = predictor(registry, DISEASE_MODEL, Capability::DiseaseDetection)?;

    let input = prepare_image(image).map_err(|e| AgriError::invalid("image", e))?;
    let output = model.predict(&input)?;
    let index = class_index(&output)
        .ok_or_else(|| AgriError::Internal("disease model produced no scores".to_string()))?;
    let label = class_label(index)?;

    let details = knowledge_base
        .and_then(|kb| kb.lookup(aliases, aliases.normalize(label)))
        .map(|record| DiseaseDetails {
            cause: record.cause.clone(),
            cure: record.cure.clone(),
            html: record.html.clone().unwrap_or_default(),
        });
    if details.is_none() {
        tracing::debug!(label, "No knowledge-base entry for predicted class");
    }

    Ok(DiseaseDiagnosis {
        prediction: label.to_string(),
        disease: display_name(label),
        class_index: index,
        total_classes: DISEASE_CLASSES.len(),
        details,
    })
}

// ---------------------------------------------------------------------------
// Yield prediction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldFeatures {
    pub year: i64,
    pub rainfall: f64,
    pub pesticides: f64,
    pub avg_temperature: f64,
    pub area: String,
    pub item: String,
}

impl YieldFeatures {
    fn row(&self) -> Vec<FeatureValue> {
        vec![
            FeatureValue::Number(self.year as f64),
            FeatureValue::Number(self.rainfall),
            FeatureValue::Number(self.pesticides),
            FeatureValue::Number(self.avg_temperature),
            FeatureValue::Category(self.area.clone()),
            FeatureValue::Category(self.item.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldEstimate {
    pub prediction: f64,
    pub unit: &'static str,
    pub input_features: YieldFeatures,
}

pub fn predict_yield(registry: &ModelRegistry, features: YieldFeatures) -> AgriResult<YieldEstimate> {
    let cap = Capability::YieldPrediction;
    let preprocessor = transformer(registry, YIELD_PREPROCESSOR, cap)?;
    let model = predictor(registry, YIELD_MODEL, cap)?;

    let encoded = preprocessor
        .transform(&features.row())
        .map_err(|e| match e {
            ModelError::UnknownCategory { column, value } if column == AREA_COLUMN => {
                AgriError::invalid("Area", format!("unknown value '{value}'"))
            }
            ModelError::UnknownCategory { column, value } if column == ITEM_COLUMN => {
                AgriError::invalid("Item", format!("unknown value '{value}'"))
            }
            other => other.into(),
        })?;
    let output = model.predict(&InputTensor::row(encoded))?;
    let prediction = output.first().copied().ok_or(ModelError::EmptyOutput)?;

    Ok(YieldEstimate {
        prediction: f64::from(prediction),
        unit: YIELD_UNIT,
        input_features: features,
    })
}
