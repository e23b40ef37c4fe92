//! Reprocess advisor.
//!
//! Looks at a raw OCR result before any correction and decides whether the
//! source image should go through the engine again with other settings.
//! Independent of the correction pipeline.

use crate::config::ReprocessConfig;
use crate::error::{CorrectionError, Result};
use crate::ocr::OcrConfig;
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

lazy_static! {
    static ref DIGIT_LED: Regex =
        Regex::new(r"(?s)^.*([1-9]|[1-3][1-9]+)(?:\n|\s{2,})+(.*)").unwrap();
    // A degree sign, or lone punctuation between spaces.
    static ref FORMAT_ARTIFACT: Regex = Regex::new(r"°\s|\s[.\-']\s").unwrap();
    static ref INVALID_CHAR: Regex = Regex::new(r"[^A-Za-z0-9.\-',°\s!]").unwrap();
}

/// Outcome of [`ReprocessAdvisor::should_reprocess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub needs_retry: bool,
    pub oem: Option<u8>,
    pub psm: Option<u8>,
}

impl Advice {
    pub fn keep() -> Self {
        Self {
            needs_retry: false,
            oem: None,
            psm: None,
        }
    }

    pub fn retry(oem: u8, psm: u8) -> Self {
        Self {
            needs_retry: true,
            oem: Some(oem),
            psm: Some(psm),
        }
    }

    pub fn as_tuple(&self) -> (bool, Option<u8>, Option<u8>) {
        (self.needs_retry, self.oem, self.psm)
    }

    /// Settings for the second pass, or `None` when no retry is advised.
    pub fn apply_to(&self, base: &OcrConfig) -> Option<OcrConfig> {
        if !self.needs_retry {
            return None;
        }
        let mut config = base.clone();
        if let Some(oem) = self.oem {
            config.oem = oem;
        }
        if let Some(psm) = self.psm {
            config.psm = psm;
        }
        Some(config)
    }
}

#[derive(Debug, Clone)]
pub struct ReprocessAdvisor {
    keyword_led: Regex,
    config: ReprocessConfig,
}

impl Default for ReprocessAdvisor {
    fn default() -> Self {
        Self::new(&ReprocessConfig::default()).unwrap()
    }
}

impl ReprocessAdvisor {
    pub fn new(config: &ReprocessConfig) -> Result<Self> {
        config.validate()?;
        let alternatives: Vec<String> = config.keywords.iter().map(|k| regex::escape(k)).collect();
        let source = format!(r"(?s)^.*(?:{})(?:[.,\-\n]|\s)+(.*)", alternatives.join("|"));
        let keyword_led = Regex::new(&source).map_err(|source_err| CorrectionError::InvalidPattern {
            pattern: source.clone(),
            source: source_err,
        })?;
        Ok(Self {
            keyword_led,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ReprocessConfig {
        &self.config
    }

    /// Decide whether `raw` should be re-read, and with which engine and
    /// segmentation modes.
    ///
    /// A digit-led span (a short index, then a wide gap) is judged on its
    /// value region; a keyword-led span only on whether the values run over
    /// several lines. Anything else is retried when it carries artifacts or
    /// line breaks at all.
    pub fn should_reprocess(&self, raw: &str) -> Advice {
        let cfg = &self.config;

        if let Some(values) = DIGIT_LED.captures(raw).and_then(|c| c.get(2)) {
            let values = values.as_str();
            let newlines = values.contains('\n');
            let special = has_artifact(values);
            let advice = match (newlines, special) {
                (true, true) => Some(Advice::retry(cfg.legacy_oem, cfg.permissive_psm)),
                (true, false) => Some(Advice::retry(cfg.neural_oem, cfg.permissive_psm)),
                (false, true) => Some(Advice::retry(cfg.legacy_oem, cfg.permissive_psm)),
                (false, false) => None,
            };
            if let Some(advice) = advice {
                debug!(newlines, special, "digit-led span needs another pass");
                return advice;
            }
        }

        if let Some(values) = self.keyword_led.captures(raw).and_then(|c| c.get(1)) {
            let newlines = values.as_str().contains('\n');
            debug!(newlines, "keyword-led span needs another pass");
            return if newlines {
                Advice::retry(cfg.neural_oem, cfg.strict_psm)
            } else {
                Advice::retry(cfg.legacy_oem, cfg.permissive_psm)
            };
        }

        if has_artifact(raw) || raw.contains('\n') {
            debug!("unstructured span with artifacts needs another pass");
            return Advice::retry(cfg.legacy_oem, cfg.permissive_psm);
        }

        Advice::keep()
    }

    /// [`Self::should_reprocess`] over many spans on the rayon pool, in input order.
    pub fn advise_batch<S: AsRef<str> + Sync>(&self, raws: &[S]) -> Vec<Advice> {
        raws.par_iter()
            .map(|raw| self.should_reprocess(raw.as_ref()))
            .collect()
    }
}

fn has_artifact(text: &str) -> bool {
    FORMAT_ARTIFACT.is_match(text) || INVALID_CHAR.is_match(text)
}
