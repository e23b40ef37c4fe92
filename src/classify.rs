//! Variable inference from a digit signature.
//!
//! An ordered rule table; the first rule whose leading digits contain the
//! signature's leading token and whose length range (if any) strictly
//! contains the digit count wins. No scoring.

use crate::signature::DigitSignature;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The meteorological quantity a span is believed to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    Pressure,
    Wind,
    DiurnalInequality,
    Temperature,
    RelativeHumidity,
    GrassTemperature,
    Default,
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Pressure => "pressure",
            VariableType::Wind => "wind",
            VariableType::DiurnalInequality => "diurnal inequalities",
            VariableType::Temperature => "temperature",
            VariableType::RelativeHumidity => "relative humidity",
            VariableType::GrassTemperature => "grass temperature",
            VariableType::Default => "default",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub variable: VariableType,
    pub leading_digits: Vec<char>,
    /// Exclusive bounds on the digit count.
    #[serde(default)]
    pub length_range: Option<(usize, usize)>,
}

impl ClassificationRule {
    pub fn new(variable: VariableType, leading_digits: &str, length_range: Option<(usize, usize)>) -> Self {
        Self {
            variable,
            leading_digits: leading_digits.chars().collect(),
            length_range,
        }
    }

    pub fn matches(&self, signature: &DigitSignature) -> bool {
        let mut chars = signature.leading_token.chars();
        let leading = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return false,
        };
        if !self.leading_digits.contains(&leading) {
            return false;
        }
        match self.length_range {
            None => true,
            Some((low, high)) => low < signature.digit_count && signature.digit_count < high,
        }
    }
}

/// The rule table in the order the source documents were tuned against.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(VariableType::Pressure, "09", Some((90, 110))),
        ClassificationRule::new(VariableType::Wind, "0123", Some((50, 70))),
        ClassificationRule::new(VariableType::DiurnalInequality, "+-", None),
        ClassificationRule::new(VariableType::Temperature, "78", Some((60, 80))),
        ClassificationRule::new(VariableType::RelativeHumidity, "6789", Some((40, 60))),
        ClassificationRule::new(VariableType::GrassTemperature, "678", Some((30, 50))),
    ]
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Total: every signature, including the empty one, maps to a variable.
    pub fn classify(&self, signature: &DigitSignature) -> VariableType {
        let variable = self
            .rules
            .iter()
            .find(|rule| rule.matches(signature))
            .map(|rule| rule.variable)
            .unwrap_or(VariableType::Default);

        debug!(
            leading = %signature.leading_token,
            digits = signature.digit_count,
            %variable,
            "classified span"
        );
        variable
    }
}
