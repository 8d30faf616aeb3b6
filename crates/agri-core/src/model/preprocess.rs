//! Column-wise feature preprocessors exported as JSON.
//!
//! Covers the fitted scalers and encoders the crop and yield models were
//! trained behind. Export shape:
//!
//! ```json
//! { "columns": [
//!     { "kind": "standard", "mean": 2013.0, "scale": 6.4 },
//!     { "kind": "min_max", "min": -0.1, "scale": 0.01 },
//!     { "kind": "passthrough" },
//!     { "kind": "one_hot", "categories": ["Albania", "India"], "drop_first": false }
//! ] }
//! ```

use super::{FeatureValue, Transformer};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// How one input column becomes one or more output features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    /// `(x - mean) / scale`; a zero scale behaves as 1.
    Standard { mean: f64, scale: f64 },
    /// `x * scale + min`.
    MinMax { min: f64, scale: f64 },
    Passthrough,
    /// Indicator per category. Unknown values encode as all zeros unless
    /// `ignore_unknown` is false.
    OneHot {
        categories: Vec<String>,
        #[serde(default)]
        drop_first: bool,
        #[serde(default = "default_true")]
        ignore_unknown: bool,
    },
}

impl ColumnKind {
    fn width(&self) -> usize {
        match self {
            ColumnKind::OneHot {
                categories,
                drop_first,
                ..
            } => categories.len() - usize::from(*drop_first),
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    columns: Vec<ColumnKind>,
}

impl ColumnPreprocessor {
    pub fn new(columns: Vec<ColumnKind>) -> ModelResult<Self> {
        let pre = Self { columns };
        pre.validate()
            .map_err(|reason| ModelError::Load {
                path: "<inline>".to_string(),
                reason,
            })?;
        Ok(pre)
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        let load_err = |reason: String| ModelError::Load {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let pre: Self = serde_json::from_str(&raw).map_err(|e| load_err(e.to_string()))?;
        pre.validate().map_err(load_err)?;
        Ok(pre)
    }

    fn validate(&self) -> Result<(), String> {
        if self.columns.is_empty() {
            return Err("preprocessor has no columns".to_string());
        }
        for (i, col) in self.columns.iter().enumerate() {
            if let ColumnKind::OneHot { categories, .. } = col {
                if categories.is_empty() {
                    return Err(format!("one_hot column {i} has no categories"));
                }
            }
        }
        Ok(())
    }

    /// Number of raw input columns.
    pub fn input_width(&self) -> usize {
        self.columns.len()
    }

    /// Number of features produced per row.
    pub fn output_width(&self) -> usize {
        self.columns.iter().map(ColumnKind::width).sum()
    }
}

impl Transformer for ColumnPreprocessor {
    fn transform(&self, row: &[FeatureValue]) -> ModelResult<Vec<f32>> {
        if row.len() != self.columns.len() {
            return Err(ModelError::Shape {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }

        let mut out = Vec::with_capacity(self.output_width());
        for (column, (kind, value)) in self.columns.iter().zip(row).enumerate() {
            match kind {
                ColumnKind::OneHot {
                    categories,
                    drop_first,
                    ignore_unknown,
                } => {
                    let FeatureValue::Category(v) = value else {
                        return Err(ModelError::ColumnType {
                            column,
                            expected: "categorical",
                        });
                    };
                    let hit = categories.iter().position(|c| c == v);
                    if hit.is_none() && !ignore_unknown {
                        return Err(ModelError::UnknownCategory {
                            column,
                            value: v.clone(),
                        });
                    }
                    let skip = usize::from(*drop_first);
                    out.extend(
                        (skip..categories.len()).map(|i| if hit == Some(i) { 1.0 } else { 0.0 }),
                    );
                }
                numeric => {
                    let FeatureValue::Number(x) = value else {
                        return Err(ModelError::ColumnType {
                            column,
                            expected: "numeric",
                        });
                    };
                    let y = match numeric {
                        ColumnKind::Standard { mean, scale } => {
                            let s = if *scale == 0.0 { 1.0 } else { *scale };
                            (x - mean) / s
                        }
                        ColumnKind::MinMax { min, scale } => x * scale + min,
                        _ => *x,
                    };
                    out.push(y as f32);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: f64) -> FeatureValue {
        FeatureValue::Number(x)
    }

    fn c(s: &str) -> FeatureValue {
        FeatureValue::Category(s.to_string())
    }

    fn yield_like() -> ColumnPreprocessor {
        ColumnPreprocessor::new(vec![
            ColumnKind::Standard {
                mean: 2000.0,
                scale: 10.0,
            },
            ColumnKind::Passthrough,
            ColumnKind::OneHot {
                categories: vec!["India".into(), "Kenya".into()],
                drop_first: false,
                ignore_unknown: true,
            },
            ColumnKind::OneHot {
                categories: vec!["Maize".into(), "Rice, paddy".into(), "Wheat".into()],
                drop_first: true,
                ignore_unknown: false,
            },
        ])
        .unwrap()
    }

    #[test]
    fn encodes_numeric_and_categorical_columns() {
        let pre = yield_like();
        assert_eq!(pre.input_width(), 4);
        assert_eq!(pre.output_width(), 1 + 1 + 2 + 2);

        let out = pre
            .transform(&[
                n(2010.0),
                n(1083.0),
                c("Kenya"),
                c("Rice, paddy"),
            ])
            .unwrap();
        assert_eq!(out, vec![1.0, 1083.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn unknown_category_follows_column_policy() {
        let pre = yield_like();
        let ignored = pre
            .transform(&[n(2000.0), n(1.0), c("Peru"), c("Wheat")])
            .unwrap();
        assert_eq!(&ignored[2..4], &[0.0, 0.0]);

        let err = pre
            .transform(&[n(2000.0), n(1.0), c("India"), c("Yams")])
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownCategory { column: 3, .. }));
    }

    #[test]
    fn rejects_wrong_width_and_types() {
        let pre = yield_like();
        assert!(matches!(
            pre.transform(&[n(1.0)]),
            Err(ModelError::Shape {
                expected: 4,
                actual: 1
            })
        ));
        assert!(matches!(
            pre.transform(&[c("x"), n(1.0), c("India"), c("Wheat")]),
            Err(ModelError::ColumnType { column: 0, .. })
        ));
    }

    #[test]
    fn min_max_and_zero_scale() {
        let pre = ColumnPreprocessor::new(vec![
            ColumnKind::MinMax {
                min: -1.0,
                scale: 0.5,
            },
            ColumnKind::Standard {
                mean: 3.0,
                scale: 0.0,
            },
        ])
        .unwrap();
        assert_eq!(pre.transform(&[n(4.0), n(5.0)]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn loads_json_export() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"columns":[{"kind":"standard","mean":1.0,"scale":2.0},{"kind":"one_hot","categories":["a","b"]}]}"#,
        )
        .unwrap();
        let pre = ColumnPreprocessor::load(file.path()).unwrap();
        assert_eq!(pre.output_width(), 3);
        assert_eq!(
            pre.transform(&[n(3.0), c("b")]).unwrap(),
            vec![1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn empty_export_is_a_load_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"columns":[]}"#).unwrap();
        assert!(matches!(
            ColumnPreprocessor::load(file.path()),
            Err(ModelError::Load { .. })
        ));
    }
}
