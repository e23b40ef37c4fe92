//! Engine configuration.
//!
//! Everything the correction engine treats as tunable lives here: the
//! classifier rule table, the label keywords and the engine/segmentation
//! modes the reprocess advisor recommends. A JSON document may set any
//! subset of fields; the rest keep their defaults.

use crate::classify::{ClassificationRule, default_rules};
use crate::error::{CorrectionError, Result};
use crate::label::default_keywords;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Highest engine mode Tesseract accepts.
const MAX_OEM: u8 = 3;
/// Highest page segmentation mode Tesseract accepts.
const MAX_PSM: u8 = 13;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Classifier rules in priority order.
    pub rules: Vec<ClassificationRule>,
    /// Regex alternatives that may open a span as its label.
    pub keywords: Vec<String>,
    pub reprocess: ReprocessConfig,
    /// Spans with at most this many digits are legend text, not readings.
    pub legend_digit_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            keywords: default_keywords(),
            reprocess: ReprocessConfig::default(),
            legend_digit_threshold: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprocessConfig {
    pub legacy_oem: u8,
    pub neural_oem: u8,
    pub permissive_psm: u8,
    pub strict_psm: u8,
    /// Words that make a span keyword-led.
    pub keywords: Vec<String>,
}

impl Default for ReprocessConfig {
    fn default() -> Self {
        Self {
            legacy_oem: 1,
            neural_oem: 0,
            permissive_psm: 11,
            strict_psm: 7,
            keywords: [
                "Level", "Station", "Non", "Mean", "Year", "Pressure", "Temperature",
                "Relative", "Humidity", "Wind", "Speed", "Jan", "Feb", "Mar", "April",
                "May", "June", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(CorrectionError::configuration("rule table is empty"));
        }
        for rule in &self.rules {
            if rule.leading_digits.is_empty() {
                return Err(CorrectionError::configuration(format!(
                    "rule for {} has no leading digits",
                    rule.variable
                )));
            }
            if let Some((low, high)) = rule.length_range {
                if low >= high {
                    return Err(CorrectionError::configuration(format!(
                        "rule for {} has an empty length range ({}, {})",
                        rule.variable, low, high
                    )));
                }
            }
        }
        if self.keywords.is_empty() {
            return Err(CorrectionError::configuration("label keyword list is empty"));
        }
        self.reprocess.validate()
    }
}

impl ReprocessConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, oem) in [("legacy_oem", self.legacy_oem), ("neural_oem", self.neural_oem)] {
            if oem > MAX_OEM {
                return Err(CorrectionError::configuration(format!(
                    "{name} must be at most {MAX_OEM}, got {oem}"
                )));
            }
        }
        for (name, psm) in [
            ("permissive_psm", self.permissive_psm),
            ("strict_psm", self.strict_psm),
        ] {
            if psm > MAX_PSM {
                return Err(CorrectionError::configuration(format!(
                    "{name} must be at most {MAX_PSM}, got {psm}"
                )));
            }
        }
        if self.keywords.is_empty() {
            return Err(CorrectionError::configuration("advisor keyword list is empty"));
        }
        Ok(())
    }
}
