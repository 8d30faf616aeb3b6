//! Prediction endpoints. Each one checks field presence in declared order,
//! parses, then hands the work to an `agri_core` pipeline.

use super::blocking;
use crate::error::{ApiError, Endpoint};
use crate::form::FormFields;
use crate::state::AppState;
use agri_core::{
    AgriError, AgriResult, CropFeatures, CropRecommendation, DiseaseDiagnosis, FertilizerAdvice,
    NutrientReading, YieldEstimate, YieldFeatures,
};
use axum::{extract::State, Json};

const CROP_FIELDS: [&str; 7] = [
    "Nitrogen",
    "Phosporus",
    "Potassium",
    "Temperature",
    "Humidity",
    "pH",
    "Rainfall",
];

const FERTILIZER_FIELDS: [&str; 4] = ["cropname", "nitrogen", "phosphorous", "pottasium"];

const YIELD_FIELDS: [&str; 6] = [
    "Year",
    "average_rain_fall_mm_per_year",
    "pesticides_tonnes",
    "avg_temp",
    "Area",
    "Item",
];

pub async fn predict_crop(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Json<CropRecommendation>, ApiError> {
    crop(state, form)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(Endpoint::Crop, e))
}

async fn crop(state: AppState, form: FormFields) -> AgriResult<CropRecommendation> {
    form.require(&CROP_FIELDS)?;
    let features = CropFeatures {
        nitrogen: form.number("Nitrogen")?,
        phosphorus: form.number("Phosporus")?,
        potassium: form.number("Potassium")?,
        temperature: form.number("Temperature")?,
        humidity: form.number("Humidity")?,
        ph: form.number("pH")?,
        rainfall: form.number("Rainfall")?,
    };

    let registry = state.registry.clone();
    blocking(move || agri_core::recommend_crop(&registry, features)).await
}

pub async fn predict_fertilizer(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Json<FertilizerAdvice>, ApiError> {
    fertilizer(state, form)
        .map(Json)
        .map_err(|e| ApiError::new(Endpoint::Fertilizer, e))
}

fn fertilizer(state: AppState, form: FormFields) -> AgriResult<FertilizerAdvice> {
    form.require(&FERTILIZER_FIELDS)?;
    let crop = form.text("cropname")?;
    let current = NutrientReading::new(
        form.number("nitrogen")?,
        form.number("phosphorous")?,
        form.number("pottasium")?,
    );

    let table = state
        .nutrients
        .as_deref()
        .ok_or_else(|| AgriError::Internal("fertilizer table not loaded".to_string()))?;
    agri_core::advise_fertilizer(table, crop, current)
}

pub async fn predict_disease(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Json<DiseaseDiagnosis>, ApiError> {
    disease(state, form)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(Endpoint::Disease, e))
}

async fn disease(state: AppState, form: FormFields) -> AgriResult<DiseaseDiagnosis> {
    let upload = form.file("image")?;
    if upload.filename.is_empty() {
        return Err(AgriError::EmptyUpload);
    }
    tracing::debug!(filename = %upload.filename, bytes = upload.bytes.len(), "Leaf image received");

    let bytes = upload.bytes.clone();
    blocking(move || {
        agri_core::detect_disease(
            &state.registry,
            state.knowledge_base.as_deref(),
            &state.aliases,
            &bytes,
        )
    })
    .await
}

pub async fn predict_yield(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Json<YieldEstimate>, ApiError> {
    harvest(state, form)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(Endpoint::Yield, e))
}

async fn harvest(state: AppState, form: FormFields) -> AgriResult<YieldEstimate> {
    form.require(&YIELD_FIELDS)?;
    let features = YieldFeatures {
        year: form.parse("Year")?,
        rainfall: form.number("average_rain_fall_mm_per_year")?,
        pesticides: form.number("pesticides_tonnes")?,
        avg_temperature: form.number("avg_temp")?,
        area: form.text("Area")?.to_string(),
        item: form.text("Item")?.to_string(),
    };

    let registry = state.registry.clone();
    blocking(move || agri_core::predict_yield(&registry, features)).await
}
