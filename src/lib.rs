//! Correction and variable inference for OCR'd historical weather logs.
//!
//! A raw OCR span from one block or line image goes in; a `"{label} {body}"`
//! record comes out, with the body's readings repaired according to the
//! variable (pressure, temperature, ...) the digits most likely encode.
//!
//! ```
//! use weather_ocr_correct::Corrector;
//!
//! let corrector = Corrector::default();
//! let line = corrector.correct_text("Jan. 0091523481").unwrap();
//! assert!(line.starts_with("Jan "));
//! ```

pub mod classify;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod grammar;
pub mod label;
pub mod normalize;
pub mod ocr;
pub mod pipeline;
pub mod reprocess;
pub mod signature;

mod scan;

#[cfg(feature = "python")]
mod python;

pub use classify::{ClassificationRule, Classifier, VariableType};
pub use config::{EngineConfig, ReprocessConfig};
pub use dictionary::LegendDictionary;
pub use error::{CorrectionError, Result};
pub use label::{FALLBACK_LABEL, LabelSplitter, SpanKind};
pub use ocr::{OcrConfig, OcrProfile, SpanMetadata};
pub use pipeline::{Correction, Corrector, NormalizedRecord};
pub use reprocess::{Advice, ReprocessAdvisor};
pub use signature::{DigitSignature, analyze};
