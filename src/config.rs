use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Cell values treated as missing, mirroring the usual dataframe defaults.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Everything a run needs besides the input path, K and the output path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column holding the source entity of a relationship.
    pub entity_column: String,

    /// Column holding the target entity (counterparty).
    pub counterparty_column: String,

    /// Cell values (after trimming) that count as missing.
    pub na_values: Vec<String>,

    /// Drop the last retained partition a second time before the
    /// per-partition stages run. On by default to match existing artifacts.
    pub drop_trailing_twice: bool,

    /// Feed `(L + Lᵀ) / 2` to the symmetric eigensolver instead of `L`.
    /// When off, the solver only reads the lower triangle of `L`.
    pub symmetrize_before_spectrum: bool,

    /// Worker threads for per-partition work (None = rayon default).
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            entity_column: "CompanyName".to_string(),
            counterparty_column: "Suppliers".to_string(),
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            drop_trailing_twice: true,
            symmetrize_before_spectrum: false,
            threads: None,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file; absent fields keep their defaults.
    pub fn from_json(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("reading `{}`: {e}", path.display())))?;
        let cfg: PipelineConfig = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("parsing `{}`: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.entity_column.is_empty() || self.counterparty_column.is_empty() {
            return Err(PipelineError::Config(
                "column names must not be empty".to_string(),
            ));
        }
        if self.entity_column == self.counterparty_column {
            return Err(PipelineError::Config(format!(
                "entity and counterparty columns are both `{}`",
                self.entity_column
            )));
        }
        if self.threads == Some(0) {
            return Err(PipelineError::Config(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a raw cell should be treated as missing.
    pub fn is_na(&self, cell: &str) -> bool {
        let trimmed = cell.trim();
        self.na_values.iter().any(|na| na == trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let cfg = PipelineConfig::default();
        cfg.validate().unwrap();
        assert!(cfg.drop_trailing_twice);
        assert!(!cfg.symmetrize_before_spectrum);
    }

    #[test]
    fn na_detection_trims() {
        let cfg = PipelineConfig::default();
        assert!(cfg.is_na(""));
        assert!(cfg.is_na("   "));
        assert!(cfg.is_na(" NaN "));
        assert!(cfg.is_na("null"));
        assert!(!cfg.is_na("Acme"));
        assert!(!cfg.is_na("0"));
    }

    #[test]
    fn rejects_same_column_twice() {
        let cfg = PipelineConfig {
            counterparty_column: "CompanyName".into(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn rejects_zero_threads() {
        let cfg = PipelineConfig {
            threads: Some(0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"entity_column": "buyer", "counterparty_column": "seller", "threads": 2}}"#)
            .unwrap();

        let cfg = PipelineConfig::from_json(file.path()).unwrap();
        assert_eq!(cfg.entity_column, "buyer");
        assert_eq!(cfg.counterparty_column, "seller");
        assert_eq!(cfg.threads, Some(2));
        assert!(cfg.drop_trailing_twice);
        assert_eq!(cfg.na_values.len(), DEFAULT_NA_VALUES.len());
    }
}
