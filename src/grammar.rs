//! Variable-specific positional grammars.
//!
//! Each variable is printed in a fixed-width column format, so readings can
//! be recovered from digit-run lengths alone: a decimal point goes at a
//! fixed offset from a group boundary, and two readings that segmentation
//! glued together are split where the first one must end. Rules run in
//! order; later rules assume the earlier ones already ran.

use crate::classify::VariableType;
use crate::error::{CorrectionError, Result};
use crate::scan::{Site, apply_all, is_word, rewrite};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Station codes, day numbers and stray punctuation ahead of the readings.
    static ref LEADING_PREFIX: Regex =
        Regex::new(r"^(?:\W|[A-Za-z]+\d\W|\d{1,2}\s|\W+\d{1,2}\s)+").unwrap();

    static ref PRESSURE_POINTS: Vec<Site> = vec![
        Site::new(Some(r"\b[09]\d{2}"), Some(r"\d(?:\s|$)")).insert("."),
        Site::new(Some(r"\b\d{3}"), Some(r"\d{2}\b(?:\s|$)")).insert("."),
        Site::new(Some(r"\b\d{4}"), Some(r"\d{2}\b(?:\s|$)")).insert("."),
        Site::new(Some(r"\b[09]\d{2}"), Some(r"\d(?:\s|$)")).insert("."),
    ];
    static ref TEMPERATURE_POINTS: Vec<Site> = vec![
        Site::new(Some(r"\b[6-9]\d"), Some(r"\d{1,2}(?:\s|$)")).insert("."),
    ];
    static ref DIURNAL_POINTS: Vec<Site> = vec![
        Site::new(Some(r"\s\d{4}"), Some(r"\d{2}\s")).insert("."),
        Site::new(Some(r"[+\-][0-9]"), Some(r"\d{2}(?:\s|$)")).insert("."),
    ];

    static ref PRESSURE_SPLITS: Vec<Site> = vec![
        Site::new(Some(r"\b\d{3}[^A-Za-z0-9\s]\d"), Some(r"[^A-Za-z0-9\s]\b")).replace(1, " "),
        Site::new(Some(r"\d{3}[^A-Za-z0-9\s]\d"), Some(r"\d{3}[^A-Za-z0-9\s]\d")).insert(" "),
        Site::new(Some(r"\d{3}[^A-Za-z0-9 ]\d"), Some(r"\d{3}[^A-Za-z0-9\s]\d")).insert(" "),
        Site::new(Some(r"\d{3}[^A-Za-z0-9\s]\d"), Some(r"[^A-Za-z0-9\s]")).replace(1, " "),
        Site::new(Some(r"\d{3}[^A-Za-z0-9\s]\d{2}"), Some(r"[^A-Za-z0-9\s]")).replace(1, " "),
        Site::new(Some(r"\d{3}[^A-Za-z0-9\s]\d{2}"), Some(r"\d{3}[^A-Za-z0-9\s]\d{2}")).insert(" "),
        Site::new(Some(r"\d{4}"), Some(r"\d{3}[^A-Za-z0-9 ]\d")).insert(" "),
        Site::new(Some(r"09\d{2}"), Some(r"[^A-Za-z0-9+\-\s]\d{3}\W\d"))
            .on_boundary()
            .replace(1, " "),
    ];
    static ref HUMIDITY_SPLITS: Vec<Site> = vec![
        Site::new(Some(r"\b100"), Some(r"\d{2,}\b")).insert(" "),
        Site::new(Some(r"\b\d{2}"), Some(r"\d{2,3}\b")).insert(" "),
        Site::new(Some(r"\b\d{2}"), Some(r"\d[^0-9\s]")).insert(" "),
        Site::new(Some(r"\d{2}"), Some(r"\d{2}")).prefix(2, " "),
    ];

    static ref SENTINEL_SITES_HEAD: Vec<Site> = vec![
        // A digit wedged between a sign and `d[0-4].dd` is noise.
        Site::new(Some(r"[+\-]"), Some(r"\d[0-4]\W\d{2}")).replace(1, ""),
        Site::new(None, Some(r"4\d.\d\b")).on_boundary().replace(1, "7"),
    ];
    static ref LEADING_NOISE: Regex = Regex::new(r"^[\W\d{}]\s").unwrap();
    static ref SENTINEL_SITES_TAIL: Vec<Site> = vec![
        Site::new(None, Some(r"09\d.\d\b")).on_boundary().replace(1, "[0]"),
        Site::new(Some(r"\d"), Some(r"-(?:\s|$)")).replace(1, "[N]"),
        Site::new(None, Some(r"[^A-Za-z0-9 ]\d{3}.\d")).replace(1, ""),
        Site::new(None, Some(r"00\d{2}[^A-Za-z0-9 ]\d")).replace(1, ""),
    ];
    // `[` is left out of the first class so an inferred `[0]` is never re-bracketed.
    static ref LEADING_FRAGMENT: Regex =
        Regex::new(r"^(?:([^A-Za-z0-9 \[]\d)|([A-Za-z]\s\d)|(\d{2})(\d{3}\.\d\s))").unwrap();
    static ref UNRESOLVED_SYMBOL: Regex = Regex::new(r"(\d{2,3})([^A-Za-z0-9.\s])(\s|$)").unwrap();
}

fn unsupported(operation: &'static str, variable: VariableType) -> CorrectionError {
    CorrectionError::UnsupportedVariable { operation, variable }
}

fn point_sites(variable: VariableType) -> Option<&'static [Site]> {
    match variable {
        VariableType::Pressure => Some(PRESSURE_POINTS.as_slice()),
        VariableType::Temperature => Some(TEMPERATURE_POINTS.as_slice()),
        VariableType::DiurnalInequality => Some(DIURNAL_POINTS.as_slice()),
        VariableType::Wind
        | VariableType::RelativeHumidity
        | VariableType::GrassTemperature
        | VariableType::Default => None,
    }
}

fn split_sites(variable: VariableType) -> Option<&'static [Site]> {
    match variable {
        VariableType::Pressure => Some(PRESSURE_SPLITS.as_slice()),
        // Temperature columns are accepted but never re-split.
        VariableType::Temperature => Some(&[]),
        VariableType::RelativeHumidity => Some(HUMIDITY_SPLITS.as_slice()),
        VariableType::Wind
        | VariableType::DiurnalInequality
        | VariableType::GrassTemperature
        | VariableType::Default => None,
    }
}

pub fn supports_insertion(variable: VariableType) -> bool {
    point_sites(variable).is_some()
}

pub fn supports_splitting(variable: VariableType) -> bool {
    split_sites(variable).is_some()
}

/// Put decimal points back into the readings of a body.
///
/// Any leading station code or date prefix is set aside and restored
/// verbatim afterwards.
pub fn insert_decimal(body: &str, variable: VariableType) -> Result<String> {
    let sites = point_sites(variable).ok_or_else(|| unsupported("decimal insertion", variable))?;

    let prefix_len = LEADING_PREFIX.find(body).map_or(0, |m| m.end());
    let (prefix, rest) = body.split_at(prefix_len);

    let rest = separators_to_points(rest);
    let rest = apply_all(sites, &rest);
    Ok(format!("{}{}", prefix, rest))
}

/// Separate readings that segmentation merged into one token.
pub fn split_groups(body: &str, variable: VariableType) -> Result<String> {
    let sites = split_sites(variable).ok_or_else(|| unsupported("group splitting", variable))?;
    Ok(apply_all(sites, body))
}

// `c` is how the engine usually misreads a printed decimal point.
fn is_separator(c: char) -> bool {
    !(c.is_ascii_uppercase() || (c.is_ascii_lowercase() && c != 'c') || c.is_ascii_digit() || c == ' ')
}

/// Punctuation directly after a digit becomes the decimal point.
fn separators_to_points(text: &str) -> String {
    let text = rewrite(text, |head, tail| {
        if !head.chars().next_back().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        let ends: Vec<usize> = tail
            .char_indices()
            .take_while(|&(_, c)| is_separator(c))
            .map(|(i, c)| i + c.len_utf8())
            .collect();
        // Longest run first; give chars back until a digit, space or the end follows.
        ends.into_iter().rev().find_map(|end| {
            tail[end..]
                .chars()
                .next()
                .is_none_or(|c| c.is_ascii_digit() || c.is_whitespace())
                .then(|| (end, ".".to_string()))
        })
    });

    rewrite(&text, |head, tail| {
        if !head.chars().next_back().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        let run = tail
            .find(|c: char| is_word(c) || c.is_whitespace())
            .unwrap_or(tail.len());
        if run == 0 {
            return None;
        }
        tail[run..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
            .then(|| (run, ".".to_string()))
    })
}

/// Final touch-ups shared by every variable, including the `[0]`, `[N]`
/// and `[X]` sentinels.
pub fn mark_sentinels(body: &str) -> String {
    let text = apply_all(&SENTINEL_SITES_HEAD, body);
    let text = LEADING_NOISE.replace(&text, "").into_owned();
    let text = apply_all(&SENTINEL_SITES_TAIL, &text);
    let text = bracket_leading_fragment(&text);
    UNRESOLVED_SYMBOL.replace_all(&text, "${1}.[X]${3}").into_owned()
}

fn bracket_leading_fragment(text: &str) -> String {
    let Some(caps) = LEADING_FRAGMENT.captures(text) else {
        return text.to_string();
    };
    let fragment = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str());
    let kept = caps.get(4).map_or("", |m| m.as_str());
    format!("[{}] {}{}", fragment, kept, &text[caps[0].len()..])
}
