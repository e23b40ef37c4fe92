//! Span correction pipeline.
//!
//! label split -> glyph prep -> signature + classification -> normalisation
//! -> whitespace tidy -> group splitting -> decimal insertion -> sentinels.
//! Every step takes and returns an owned string; nothing is carried from
//! one span to the next.

use crate::classify::{Classifier, VariableType};
use crate::config::EngineConfig;
use crate::dictionary::LegendDictionary;
use crate::error::Result;
use crate::grammar;
use crate::label::{LabelSplitter, SpanKind, span_kind};
use crate::normalize;
use crate::signature::{DigitSignature, analyze};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Label plus corrected body; displays as `"{label} {body}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub label: String,
    pub body: String,
}

impl fmt::Display for NormalizedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.body)
    }
}

/// A corrected span and what the pipeline inferred about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub record: NormalizedRecord,
    pub variable: VariableType,
    pub signature: DigitSignature,
}

impl Correction {
    pub fn line(&self) -> String {
        self.record.to_string()
    }
}

pub struct Corrector {
    classifier: Classifier,
    splitter: LabelSplitter,
    legend: LegendDictionary,
    legend_digit_threshold: usize,
}

impl Default for Corrector {
    fn default() -> Self {
        Self {
            classifier: Classifier::default(),
            splitter: LabelSplitter::default(),
            legend: LegendDictionary::builtin(),
            legend_digit_threshold: EngineConfig::default().legend_digit_threshold,
        }
    }
}

impl Corrector {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new(config.rules.clone()),
            splitter: LabelSplitter::new(&config.keywords)?,
            legend: LegendDictionary::builtin(),
            legend_digit_threshold: config.legend_digit_threshold,
        })
    }

    /// Replace the built-in legend vocabulary.
    pub fn with_legend(mut self, legend: LegendDictionary) -> Self {
        self.legend = legend;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn correct(&self, span: &str) -> Result<Correction> {
        let (label, body) = self.splitter.split(span);
        let body = normalize::prepare(&body);

        let signature = analyze(&body);
        let variable = self.classifier.classify(&signature);

        let body = normalize::normalize(&body, variable);
        let body = normalize::tidy_whitespace(&body);
        let body = format_body(body, variable)?;
        trace!(%body, "formatted");

        debug!(%label, %variable, "corrected span");
        Ok(Correction {
            record: NormalizedRecord { label, body },
            variable,
            signature,
        })
    }

    /// Correct a span and render it as `"{label} {body}"`.
    pub fn correct_text(&self, span: &str) -> Result<String> {
        Ok(self.correct(span)?.line())
    }

    /// Correct many spans on the rayon pool. Output order matches input order.
    pub fn correct_batch<S: AsRef<str> + Sync>(&self, spans: &[S]) -> Result<Vec<Correction>> {
        spans
            .par_iter()
            .map(|span| self.correct(span.as_ref()))
            .collect()
    }

    pub fn span_kind(&self, span: &str) -> SpanKind {
        span_kind(span, self.legend_digit_threshold)
    }

    /// Upper-case legend segments and replace misread words.
    pub fn correct_legend<S: AsRef<str>>(&self, segments: &[S]) -> Vec<String> {
        self.legend.correct_segments(segments)
    }
}

/// Variable-specific formatting; variables without a grammar pass through
/// to the sentinel step untouched.
fn format_body(body: String, variable: VariableType) -> Result<String> {
    let body = if grammar::supports_splitting(variable) {
        grammar::split_groups(&body, variable)?
    } else {
        body
    };
    let body = if grammar::supports_insertion(variable) {
        grammar::insert_decimal(&body, variable)?
    } else {
        body
    };
    Ok(grammar::mark_sentinels(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationRule;

    #[test]
    fn test_record_display() {
        let record = NormalizedRecord {
            label: "Jan".to_string(),
            body: "099.5".to_string(),
        };
        assert_eq!(record.to_string(), "Jan 099.5");
    }

    #[test]
    fn test_unclassified_span_keeps_fallback_label() {
        let corrector = Corrector::default();
        let correction = corrector.correct("").unwrap();
        assert_eq!(correction.record.label, "[D]");
        assert_eq!(correction.variable, VariableType::Default);
        assert!(correction.signature.is_empty());
        assert_eq!(correction.line(), "[D] ");
    }

    #[test]
    fn test_custom_rules_drive_the_grammar() {
        let config = EngineConfig {
            rules: vec![ClassificationRule::new(VariableType::Temperature, "6", Some((0, 20)))],
            ..EngineConfig::default()
        };
        let corrector = Corrector::new(&config).unwrap();
        let correction = corrector.correct("Mean 673 681").unwrap();
        assert_eq!(correction.variable, VariableType::Temperature);
        assert_eq!(correction.record.body, "67.3 68.1");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            keywords: vec!["(".to_string()],
            ..EngineConfig::default()
        };
        assert!(Corrector::new(&config).is_err());
    }

    #[test]
    fn test_span_kind_threshold() {
        let config = EngineConfig {
            legend_digit_threshold: 3,
            ..EngineConfig::default()
        };
        let corrector = Corrector::new(&config).unwrap();
        assert_eq!(corrector.span_kind("Mean 12"), SpanKind::Legend);
        assert_eq!(corrector.span_kind("Mean 1234"), SpanKind::Data);
    }

    #[test]
    fn test_legend_correction() {
        let corrector = Corrector::default();
        assert_eq!(
            corrector.correct_legend(&["Presure at sea levl"]),
            vec!["PRESSURE AT SEA LEVEL".to_string()]
        );
    }
}
