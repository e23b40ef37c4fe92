//! What the correction engine knows about the OCR step upstream of it:
//! where a span came from and which engine settings produced it.

use crate::error::{CorrectionError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Line images taller than this are read with the alternate profile.
pub const LINE_HEIGHT_LIMIT: u32 = 60;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"y([0-9]{4})").unwrap();
    static ref PAGE: Regex = Regex::new(r"p([0-9]{1,3})").unwrap();
    static ref BLOCK: Regex = Regex::new(r"b([0-9]{1,2})").unwrap();
    static ref LINE: Regex = Regex::new(r"r([0-9]{1,3})").unwrap();
}

/// Position of a span in the archive, read from its image file name
/// (`y1922_p012_b3_r07.png`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanMetadata {
    pub year: u16,
    pub page: u16,
    pub block: u16,
    /// Set for line images only.
    pub line: Option<u16>,
}

impl SpanMetadata {
    pub fn from_name(name: &str) -> Result<Self> {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name);

        let field = |pattern: &Regex, field: &'static str| {
            capture_number(pattern, file_name).ok_or_else(|| CorrectionError::MissingMetadata {
                field,
                name: name.to_string(),
            })
        };

        Ok(Self {
            year: field(&YEAR, "year")?,
            page: field(&PAGE, "page")?,
            block: field(&BLOCK, "block")?,
            line: capture_number(&LINE, file_name),
        })
    }

    pub fn is_line(&self) -> bool {
        self.line.is_some()
    }
}

fn capture_number(pattern: &Regex, text: &str) -> Option<u16> {
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

/// One Tesseract invocation's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    pub oem: u8,
    pub psm: u8,
    pub dpi: u32,
    pub lang: String,
    pub write_images: bool,
}

impl OcrConfig {
    pub fn new(oem: u8, psm: u8) -> Self {
        Self {
            oem,
            psm,
            dpi: 300,
            lang: "eng".to_string(),
            write_images: true,
        }
    }

    /// Command-line form, e.g. `-l eng --oem 0 --psm 6 --dpi 300 -c tessedit_write_images=true`.
    pub fn to_args(&self) -> String {
        format!(
            "-l {} --oem {} --psm {} --dpi {} -c tessedit_write_images={}",
            self.lang, self.oem, self.psm, self.dpi, self.write_images
        )
    }
}

impl fmt::Display for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_args())
    }
}

/// First-pass settings for block images and for short and tall line images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrProfile {
    pub block: OcrConfig,
    pub line: OcrConfig,
    pub line_alt: OcrConfig,
}

impl Default for OcrProfile {
    fn default() -> Self {
        Self {
            block: OcrConfig::new(0, 6),
            line: OcrConfig::new(0, 6),
            line_alt: OcrConfig::new(1, 6),
        }
    }
}

impl OcrProfile {
    pub fn for_line(&self, height: u32) -> &OcrConfig {
        if height <= LINE_HEIGHT_LIMIT {
            &self.line
        } else {
            &self.line_alt
        }
    }

    /// Settings that produced a span, given its metadata and, for line
    /// images, the image height in pixels.
    pub fn for_span(&self, metadata: &SpanMetadata, height: u32) -> &OcrConfig {
        if metadata.is_line() {
            self.for_line(height)
        } else {
            &self.block
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_metadata() {
        let meta = SpanMetadata::from_name("y1922_p012_b3_r07.png").unwrap();
        assert_eq!(meta.year, 1922);
        assert_eq!(meta.page, 12);
        assert_eq!(meta.block, 3);
        assert_eq!(meta.line, Some(7));
        assert!(meta.is_line());
    }

    #[test]
    fn test_block_metadata_from_path() {
        let meta = SpanMetadata::from_name("/data/pages/y1873_p4_b12.png").unwrap();
        assert_eq!(meta.year, 1873);
        assert_eq!(meta.block, 12);
        assert_eq!(meta.line, None);
    }

    #[test]
    fn test_missing_field_is_named() {
        let err = SpanMetadata::from_name("p4_b12.png").unwrap_err();
        match err {
            CorrectionError::MissingMetadata { field, name } => {
                assert_eq!(field, "year");
                assert_eq!(name, "p4_b12.png");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(SpanMetadata::from_name("y1922_p4.png").is_err());
    }

    #[test]
    fn test_args() {
        assert_eq!(
            OcrConfig::new(0, 6).to_args(),
            "-l eng --oem 0 --psm 6 --dpi 300 -c tessedit_write_images=true"
        );
        let mut config = OcrConfig::new(1, 11);
        config.write_images = false;
        assert_eq!(
            config.to_string(),
            "-l eng --oem 1 --psm 11 --dpi 300 -c tessedit_write_images=false"
        );
    }

    #[test]
    fn test_tall_lines_use_alternate_profile() {
        let profile = OcrProfile::default();
        assert_eq!(profile.for_line(60).oem, 0);
        assert_eq!(profile.for_line(61).oem, 1);

        let block = SpanMetadata::from_name("y1922_p1_b2.png").unwrap();
        assert_eq!(profile.for_span(&block, 200), &profile.block);
        let line = SpanMetadata::from_name("y1922_p1_b2_r3.png").unwrap();
        assert_eq!(profile.for_span(&line, 200), &profile.line_alt);
    }
}
