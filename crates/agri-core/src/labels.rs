//! Label Reconciliation: bridges the disease classifier's training labels and
//! the knowledge-base file, which name the same classes differently.
//!
//! The alias table is data: built-in pairs plus an optional JSON object file
//! merged on top, so new divergences need no code change.

use crate::error::{AgriError, AgriResult, DataError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Separator between subject (plant) and condition in a class label.
pub const LABEL_SEPARATOR: &str = "___";

/// Output order of the disease classifier.
pub const DISEASE_CLASSES: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// Known divergences between classifier labels and knowledge-base names.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("Cherry_(including_sour)___Powdery_mildew", "Cherry___Powdery_mildew"),
    ("Cherry_(including_sour)___healthy", "Cherry___healthy"),
    (
        "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
        "Corn___Cercospora_leaf_spot Gray_leaf_spot",
    ),
    ("Corn_(maize)___Common_rust_", "Corn___Common_rust"),
    ("Corn_(maize)___Northern_Leaf_Blight", "Corn___Northern_Leaf_Blight"),
    ("Corn_(maize)___healthy", "Corn___healthy"),
    ("Pepper,_bell___Bacterial_spot", "Pepper,_bell___Bacterial_spot"),
    ("Pepper,_bell___healthy", "Pepper,_bell___healthy"),
];

/// Raw-label → knowledge-base-label substitutions. Chains are collapsed on
/// construction, so `normalize` is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAliases {
    map: HashMap<String, String>,
}

impl Default for LabelAliases {
    fn default() -> Self {
        Self::from_pairs(
            DEFAULT_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap_or_else(|_| Self {
            map: HashMap::new(),
        })
    }
}

impl LabelAliases {
    /// Build from pairs; later pairs win. Rejects cycles (`a → b → a`).
    pub fn from_pairs<I>(pairs: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: HashMap<String, String> = pairs.into_iter().collect();
        let mut map = HashMap::with_capacity(raw.len());
        for start in raw.keys() {
            let mut current = start;
            let mut hops = 0;
            while let Some(next) = raw.get(current) {
                if next == current {
                    break;
                }
                hops += 1;
                if hops > raw.len() {
                    return Err(DataError::AliasCycle(start.clone()));
                }
                current = next;
            }
            map.insert(start.clone(), current.clone());
        }
        Ok(Self { map })
    }

    /// Built-in table with the JSON object at `path` merged over it.
    pub fn with_overrides(path: &Path) -> Result<Self, DataError> {
        let raw = std::fs::read_to_string(path)?;
        let extra: HashMap<String, String> = serde_json::from_str(&raw)?;
        let merged = DEFAULT_ALIASES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .chain(extra);
        Self::from_pairs(merged)
    }

    /// Map a known-divergent label to its knowledge-base spelling; others pass through.
    pub fn normalize<'a>(&'a self, label: &'a str) -> &'a str {
        self.map.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One knowledge-base entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub name: String,
    #[serde(default)]
    pub cause: String,
    #[serde(default)]
    pub cure: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Disease knowledge base (JSON array of records), read once at startup.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    records: Vec<DiseaseRecord>,
}

impl KnowledgeBase {
    pub fn new(records: Vec<DiseaseRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<DiseaseRecord> = serde_json::from_str(&raw)?;
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Linear scan; each record's own name is normalized before comparing.
    /// Returns the first match.
    pub fn lookup(&self, aliases: &LabelAliases, normalized: &str) -> Option<&DiseaseRecord> {
        self.records
            .iter()
            .find(|r| aliases.normalize(&r.name) == normalized)
    }
}

/// Canonical label for a classifier output index.
pub fn class_label(index: usize) -> AgriResult<&'static str> {
    DISEASE_CLASSES
        .get(index)
        .copied()
        .ok_or(AgriError::UnknownClassIndex {
            index,
            total: DISEASE_CLASSES.len(),
        })
}

/// Human-facing name: `Potato___Early_blight` → `Early blight`,
/// `Tomato___healthy` → `Healthy Tomato`, no separator → underscores to spaces.
pub fn display_name(label: &str) -> String {
    let parts: Vec<&str> = label.split(LABEL_SEPARATOR).collect();
    if let [subject, condition] = parts.as_slice() {
        let condition = condition.replace('_', " ");
        let condition = condition.trim();
        if condition.eq_ignore_ascii_case("healthy") {
            let plant: String = subject
                .replace('_', " ")
                .chars()
                .filter(|c| !matches!(c, '(' | ')' | ','))
                .collect();
            return format!("Healthy {}", plant.trim());
        }
        return condition.to_string();
    }
    label.replace('_', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, cause: &str) -> DiseaseRecord {
        DiseaseRecord {
            name: name.to_string(),
            cause: cause.to_string(),
            cure: format!("cure for {name}"),
            html: None,
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("Tomato___healthy"), "Healthy Tomato");
        assert_eq!(display_name("Potato___Early_blight"), "Early blight");
        assert_eq!(display_name("NoSeparatorLabel"), "NoSeparatorLabel");
        assert_eq!(display_name("Corn_(maize)___Common_rust_"), "Common rust");
        assert_eq!(
            display_name("Cherry_(including_sour)___healthy"),
            "Healthy Cherry including sour"
        );
        assert_eq!(display_name("Pepper,_bell___healthy"), "Healthy Pepper bell");
        assert_eq!(display_name("Apple___HEALTHY"), "Healthy Apple");
        assert_eq!(display_name("a___b___c"), "a   b   c");
    }

    #[test]
    fn normalize_uses_table_and_passes_through() {
        let aliases = LabelAliases::default();
        assert_eq!(aliases.normalize("Corn_(maize)___healthy"), "Corn___healthy");
        assert_eq!(aliases.normalize("Corn_(maize)___Common_rust_"), "Corn___Common_rust");
        assert_eq!(aliases.normalize("Tomato___Leaf_Mold"), "Tomato___Leaf_Mold");
    }

    #[test]
    fn normalize_is_idempotent() {
        let aliases = LabelAliases::default();
        for label in DISEASE_CLASSES {
            let once = aliases.normalize(label);
            assert_eq!(aliases.normalize(once), once, "label {label}");
        }
    }

    #[test]
    fn chains_collapse_and_cycles_are_rejected() {
        let aliases = LabelAliases::from_pairs([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
        ])
        .unwrap();
        assert_eq!(aliases.normalize("a"), "c");
        assert_eq!(aliases.normalize(aliases.normalize("a")), "c");

        let cycle = LabelAliases::from_pairs([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
        ]);
        assert!(matches!(cycle, Err(DataError::AliasCycle(_))));
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"Orange___Haunglongbing_(Citrus_greening)": "Orange___Citrus_greening"}"#,
        )
        .unwrap();
        let aliases = LabelAliases::with_overrides(file.path()).unwrap();
        assert_eq!(aliases.len(), DEFAULT_ALIASES.len() + 1);
        assert_eq!(
            aliases.normalize("Orange___Haunglongbing_(Citrus_greening)"),
            "Orange___Citrus_greening"
        );
        assert_eq!(aliases.normalize("Corn_(maize)___healthy"), "Corn___healthy");
    }

    #[test]
    fn lookup_normalizes_record_names() {
        let aliases = LabelAliases::default();
        let kb = KnowledgeBase::new(vec![
            record("Tomato___Leaf_Mold", "fungus"),
            record("Corn_(maize)___healthy", "none"),
            record("Corn___healthy", "duplicate"),
        ]);
        let hit = kb.lookup(&aliases, aliases.normalize("Corn_(maize)___healthy"));
        assert_eq!(hit.map(|r| r.cause.as_str()), Some("none"));
        assert!(kb.lookup(&aliases, "Apple___Black_rot").is_none());
    }

    #[test]
    fn class_index_bounds() {
        assert_eq!(class_label(0).unwrap(), "Apple___Apple_scab");
        assert_eq!(class_label(37).unwrap(), "Tomato___healthy");
        assert!(matches!(
            class_label(38),
            Err(AgriError::UnknownClassIndex {
                index: 38,
                total: 38
            })
        ));
    }

    #[test]
    fn knowledge_base_loads_optional_html() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"[{"name":"Potato___Late_blight","cause":"Phytophthora","cure":"Fungicide","html":"<b>x</b>"},
                {"name":"Potato___healthy","cause":"","cure":""}]"#,
        )
        .unwrap();
        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.len(), 2);
        let aliases = LabelAliases::default();
        let rec = kb.lookup(&aliases, "Potato___Late_blight").unwrap();
        assert_eq!(rec.html.as_deref(), Some("<b>x</b>"));
        assert!(kb.lookup(&aliases, "Potato___healthy").unwrap().html.is_none());
    }
}
