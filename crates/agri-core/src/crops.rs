//! Crop classes known to the crop recommendation model.

use crate::error::{AgriError, AgriResult};

/// Output order of the crop classifier (alphabetical label encoding).
pub const CROP_CLASSES: [&str; 22] = [
    "apple",
    "banana",
    "blackgram",
    "chickpea",
    "coconut",
    "coffee",
    "cotton",
    "grapes",
    "jute",
    "kidneybeans",
    "lentil",
    "maize",
    "mango",
    "mothbeans",
    "mungbean",
    "muskmelon",
    "orange",
    "papaya",
    "pigeonpeas",
    "pomegranate",
    "rice",
    "watermelon",
];

pub fn crop_label(index: usize) -> AgriResult<&'static str> {
    CROP_CLASSES
        .get(index)
        .copied()
        .ok_or(AgriError::UnknownClassIndex {
            index,
            total: CROP_CLASSES.len(),
        })
}

/// `"rice"` → `"Rice is the best crop to be cultivated."`
pub fn recommendation_message(crop: &str) -> String {
    let mut chars = crop.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };
    format!("{capitalized} is the best crop to be cultivated.")
}
