//! Label/body splitting.
//!
//! A span usually opens with a row label (a day number, a month, a word
//! such as "Mean") followed by the readings. The label is peeled off with a
//! single search over the whole span; everything after the separator run is
//! the body.

use crate::error::{CorrectionError, Result};
use crate::scan::rewrite;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label used when no keyword is found.
pub const FALLBACK_LABEL: &str = "[D]";

lazy_static! {
    static ref SHORT_INDEX: Regex = Regex::new(r"^\s{5,}([1-3][0-9]|[1-9])\s+\d").unwrap();
    static ref DIGIT: Regex = Regex::new(r"\d").unwrap();
}

/// Keyword alternatives, tried in this order at each candidate position.
/// Several carry the glyph confusions seen in the scans (`Fe8`, `N0v`).
pub fn default_keywords() -> Vec<String> {
    [
        "[1-9]",
        "[1-3][1-9]+",
        "[lL]eve[lL]",
        "Station",
        "N[oO0]+n",
        "Mean",
        "Year",
        "Pressure",
        "Temperature",
        "Relative",
        "Humidity",
        "Wind",
        "Speed",
        "Jan",
        "Fe[b8]",
        "Mar",
        "April",
        "May",
        "June",
        "Jul",
        "July",
        "Aug",
        "Sept",
        "[oO0]ct",
        "N[oO0]v",
        "Dec",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

#[derive(Debug, Clone)]
pub struct LabelSplitter {
    pattern: Regex,
}

impl Default for LabelSplitter {
    fn default() -> Self {
        Self::new(&default_keywords()).unwrap()
    }
}

impl LabelSplitter {
    pub fn new(keywords: &[String]) -> Result<Self> {
        if keywords.is_empty() {
            return Err(CorrectionError::configuration("keyword list is empty"));
        }
        for keyword in keywords {
            Regex::new(keyword).map_err(|source| CorrectionError::InvalidPattern {
                pattern: keyword.clone(),
                source,
            })?;
        }
        let alternatives: Vec<String> = keywords.iter().map(|k| format!("(?:{})", k)).collect();
        let source = format!(
            r"(?s)(?:^|\n)(?P<label>{})[.,\s]+(?P<body>.*)",
            alternatives.join("|")
        );
        let pattern = Regex::new(&source).map_err(|source_err| CorrectionError::InvalidPattern {
            pattern: source.clone(),
            source: source_err,
        })?;
        Ok(Self { pattern })
    }

    /// Split a span into `(label, body)`.
    ///
    /// Falls back to `("[D]", span)` with the span untouched when no keyword
    /// opens the span or one of its lines.
    pub fn split(&self, span: &str) -> (String, String) {
        let (label, body) = match self.pattern.captures(span) {
            Some(caps) => (
                caps.name("label").map_or("", |m| m.as_str()).to_string(),
                caps.name("body").map_or("", |m| m.as_str()).to_string(),
            ),
            None => return (FALLBACK_LABEL.to_string(), span.to_string()),
        };
        (label, tidy_body(&body))
    }
}

/// Doubled newlines become a space, and a short column index stranded
/// after a wide gap replaces the digit and the gap in front of it.
fn tidy_body(body: &str) -> String {
    let body = body.replace("\n\n", " ");
    rewrite(&body, |_, tail| {
        let digit = tail.chars().next().filter(|c| c.is_ascii_digit())?;
        let skip = digit.len_utf8();
        let caps = SHORT_INDEX.captures(&tail[skip..])?;
        let index = caps.get(1)?;
        Some((skip + index.end(), index.as_str().to_string()))
    })
}

/// Whether a span holds readings or legend text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Data,
    Legend,
}

/// A span with more than `threshold` digits is data; anything else is legend.
pub fn span_kind(span: &str, threshold: usize) -> SpanKind {
    if DIGIT.find_iter(span).count() > threshold {
        SpanKind::Data
    } else {
        SpanKind::Legend
    }
}
