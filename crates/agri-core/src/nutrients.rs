//! Nutrient Deficiency Resolver.
//!
//! Compares a soil reading against the crop's required N/P/K (from the
//! fertilizer CSV) and picks the nutrient with the largest gap. The sign of
//! the gap selects one of six canned recommendation texts.

use crate::error::{AgriError, AgriResult, DataError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    N,
    P,
    K,
}

impl Nutrient {
    /// Tie-break order: earlier wins.
    pub const ORDER: [Nutrient; 3] = [Nutrient::N, Nutrient::P, Nutrient::K];

    pub fn as_str(self) -> &'static str {
        match self {
            Nutrient::N => "N",
            Nutrient::P => "P",
            Nutrient::K => "K",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soil or requirement levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientReading {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl NutrientReading {
    pub fn new(nitrogen: f64, phosphorus: f64, potassium: f64) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::N => self.nitrogen,
            Nutrient::P => self.phosphorus,
            Nutrient::K => self.potassium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationKey {
    NHigh,
    Nlow,
    PHigh,
    Plow,
    KHigh,
    Klow,
}

impl RecommendationKey {
    /// `surplus` means the soil holds more than the crop requires.
    pub fn for_factor(nutrient: Nutrient, surplus: bool) -> Self {
        match (nutrient, surplus) {
            (Nutrient::N, true) => RecommendationKey::NHigh,
            (Nutrient::N, false) => RecommendationKey::Nlow,
            (Nutrient::P, true) => RecommendationKey::PHigh,
            (Nutrient::P, false) => RecommendationKey::Plow,
            (Nutrient::K, true) => RecommendationKey::KHigh,
            (Nutrient::K, false) => RecommendationKey::Klow,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationKey::NHigh => "NHigh",
            RecommendationKey::Nlow => "Nlow",
            RecommendationKey::PHigh => "PHigh",
            RecommendationKey::Plow => "Plow",
            RecommendationKey::KHigh => "KHigh",
            RecommendationKey::Klow => "Klow",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            RecommendationKey::NHigh => N_HIGH,
            RecommendationKey::Nlow => N_LOW,
            RecommendationKey::PHigh => P_HIGH,
            RecommendationKey::Plow => P_LOW,
            RecommendationKey::KHigh => K_HIGH,
            RecommendationKey::Klow => K_LOW,
        }
    }
}

const N_HIGH: &str = "The N value of soil is high and might give rise to weeds.
Please consider the following suggestions:
1. Manure – adding manure is one of the simplest ways to amend your soil with nitrogen.
2. Coffee grounds – use your morning addiction to feed your gardening habit!
3. Plant nitrogen fixing plants – planting vegetables in Fabaceae family like peas, beans and soybeans.
4. Plant 'green manure' crops like cabbage, corn and broccoli.
5. Use mulch (wet grass) while growing crops.";

const N_LOW: &str = "The N value of your soil is low.
Please consider the following suggestions:
1. Add sawdust or fine woodchips to your soil.
2. Plant heavy nitrogen feeding plants – tomatoes, corn, broccoli, cabbage and spinach.
3. Water – soaking your soil with water will help leach the nitrogen deeper.
4. Add composted manure to the soil.
5. Plant Nitrogen fixing plants like peas or beans.
6. Use NPK fertilizers with high N value.";

const P_HIGH: &str = "The P value of your soil is high.
Please consider the following suggestions:
1. Avoid adding manure – manure contains high levels of phosphorous.
2. Use only phosphorus-free fertilizer.
3. Water your soil liberally to drive phosphorous out.
4. Plant nitrogen fixing vegetables to increase nitrogen without increasing phosphorous.
5. Use crop rotations to decrease high phosphorous levels.";

const P_LOW: &str = "The P value of your soil is low.
Please consider the following suggestions:
1. Bone meal – a fast acting source made from ground animal bones.
2. Rock phosphate – a slower acting source.
3. Phosphorus Fertilizers – applying fertilizer with high phosphorous content.
4. Organic compost – adding quality organic compost.
5. Manure – excellent source of phosphorous.
6. Ensure proper soil pH – having pH in 6.0 to 7.0 range.";

const K_HIGH: &str = "The K value of your soil is high.
Please consider the following suggestions:
1. Loosen the soil deeply and water thoroughly to dissolve water-soluble potassium.
2. Remove as many rocks as possible from soil.
3. Stop applying potassium-rich commercial fertilizer.
4. Mix crushed eggshells, seashells, wood ash to add calcium.
5. Use NPK fertilizers with low K levels.";

const K_LOW: &str = "The K value of your soil is low.
Please consider the following suggestions:
1. Mix in muricate of potash or sulphate of potash.
2. Try kelp meal or seaweed.
3. Try Sul-Po-Mag.
4. Bury banana peels an inch below the soil surface.
5. Use Potash fertilizers since they contain high potassium values.";

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Crop")]
    crop: String,
    #[serde(rename = "N")]
    n: f64,
    #[serde(rename = "P")]
    p: f64,
    #[serde(rename = "K")]
    k: f64,
}

/// Required N/P/K per crop, in file order.
#[derive(Debug, Clone, Default)]
pub struct NutrientTable {
    rows: Vec<(String, NutrientReading)>,
}

impl NutrientTable {
    pub fn new(rows: Vec<(String, NutrientReading)>) -> Self {
        Self { rows }
    }

    /// Read a `Crop,N,P,K` CSV; other columns are ignored.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, DataError> {
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: CsvRow = record?;
            rows.push((row.crop, NutrientReading::new(row.n, row.p, row.k)));
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact, case-sensitive lookup of the crop name as stored in the table.
    pub fn required(&self, crop: &str) -> Option<&NutrientReading> {
        self.rows
            .iter()
            .find(|(name, _)| name == crop)
            .map(|(_, reading)| reading)
    }

    pub fn resolve(&self, crop: &str, current: NutrientReading) -> AgriResult<NutrientAnalysis> {
        let required = self
            .required(crop)
            .ok_or_else(|| AgriError::UnknownCrop(crop.to_string()))?;
        Ok(NutrientAnalysis::between(*required, current))
    }
}

/// Outcome of comparing a reading against requirements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientAnalysis {
    pub required: NutrientReading,
    pub current: NutrientReading,
    /// `required - current` per nutrient.
    pub diff: NutrientReading,
    pub primary: Nutrient,
    pub key: RecommendationKey,
}

impl NutrientAnalysis {
    pub fn between(required: NutrientReading, current: NutrientReading) -> Self {
        let diff = NutrientReading::new(
            required.nitrogen - current.nitrogen,
            required.phosphorus - current.phosphorus,
            required.potassium - current.potassium,
        );

        let mut primary = Nutrient::N;
        for nutrient in Nutrient::ORDER {
            if diff.get(nutrient).abs() > diff.get(primary).abs() {
                primary = nutrient;
            }
        }
        let key = RecommendationKey::for_factor(primary, diff.get(primary) < 0.0);

        Self {
            required,
            current,
            diff,
            primary,
            key,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        self.key.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NutrientTable {
        NutrientTable::new(vec![
            ("rice".to_string(), NutrientReading::new(80.0, 40.0, 40.0)),
            ("Maize".to_string(), NutrientReading::new(80.0, 40.0, 20.0)),
        ])
    }

    #[test]
    fn largest_gap_picks_low_variant() {
        let analysis = table()
            .resolve("rice", NutrientReading::new(20.0, 40.0, 40.0))
            .unwrap();
        assert_eq!(analysis.diff, NutrientReading::new(60.0, 0.0, 0.0));
        assert_eq!(analysis.primary, Nutrient::N);
        assert_eq!(analysis.key, RecommendationKey::Nlow);
        assert!(analysis.recommendation().starts_with("The N value of your soil is low."));
    }

    #[test]
    fn surplus_picks_high_variant() {
        let analysis = table()
            .resolve("rice", NutrientReading::new(80.0, 40.0, 100.0))
            .unwrap();
        assert_eq!(analysis.primary, Nutrient::K);
        assert_eq!(analysis.diff.potassium, -60.0);
        assert_eq!(analysis.key, RecommendationKey::KHigh);
    }

    #[test]
    fn ties_break_n_then_p_then_k() {
        let required = NutrientReading::new(50.0, 50.0, 50.0);
        let all_equal = NutrientAnalysis::between(required, NutrientReading::new(40.0, 60.0, 40.0));
        assert_eq!(all_equal.primary, Nutrient::N);
        assert_eq!(all_equal.key, RecommendationKey::Nlow);

        let p_and_k = NutrientAnalysis::between(required, NutrientReading::new(50.0, 70.0, 30.0));
        assert_eq!(p_and_k.primary, Nutrient::P);
        assert_eq!(p_and_k.key, RecommendationKey::PHigh);

        let no_gap = NutrientAnalysis::between(required, required);
        assert_eq!(no_gap.primary, Nutrient::N);
        assert_eq!(no_gap.key, RecommendationKey::Nlow);
    }

    #[test]
    fn crop_match_is_exact() {
        let table = table();
        assert!(table.required("Maize").is_some());
        assert!(table.required("rice").is_some());
        for variant in ["maize", "RICE", "  rice ", "Rice"] {
            assert!(matches!(
                table.resolve(variant, NutrientReading::new(1.0, 1.0, 1.0)),
                Err(AgriError::UnknownCrop(name)) if name == variant
            ));
        }
        assert!(matches!(
            table.resolve("quinoa", NutrientReading::new(1.0, 1.0, 1.0)),
            Err(AgriError::UnknownCrop(name)) if name == "quinoa"
        ));
    }

    #[test]
    fn loads_csv_ignoring_extra_columns() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "Unnamed: 0,Crop,N,P,K,pH,soil_moisture\n0,rice,80,40,40,5.5,30\n3,coffee,100,20,30,6,20\n",
        )
        .unwrap();
        let table = NutrientTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.required("coffee"),
            Some(&NutrientReading::new(100.0, 20.0, 30.0))
        );
    }

    #[test]
    fn every_key_has_numbered_suggestions() {
        for nutrient in Nutrient::ORDER {
            for surplus in [true, false] {
                let key = RecommendationKey::for_factor(nutrient, surplus);
                let text = key.text();
                assert!(text.contains(&format!("The {} value", nutrient)), "{}", key.as_str());
                assert!(text.contains("\n1. "));
            }
        }
    }
}
