//! Character and sign normalisation.
//!
//! An ordered list of whole-text passes. Order matters: sign recovery has
//! to see `4`s before the glyph table creates new digits, and isolated
//! dashes only become `NaN` once the sign passes have merged what they can.

use crate::classify::VariableType;
use crate::scan::{Site, apply_all, rewrite};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

/// Glyphs the OCR engine confuses with digits, and the digit they stand for.
const GLYPH_DIGITS: &[(&str, char)] = &[
    ("oO©D", '0'),
    ("xXtTiIlLrK!", '1'),
    ("zZ£", '2'),
    ("¢", '4'),
    ("sS", '5'),
    ("C€", '6'),
    ("yY%", '7'),
    ("&bB", '8'),
    ("§qQgGhH$", '9'),
];

lazy_static! {
    // The scanner prints '+' as something very close to '4'.
    static ref FOUR_AS_SIGN: Vec<Site> = vec![
        Site::new(None, Some(r"4\d{3}")).on_boundary().replace(1, "+"),
        Site::new(None, Some(r"4(?:\d{3,5}\b|\d[^A-Za-z ]\d{2}\b|[\-+]+\d+)"))
            .on_boundary()
            .replace(1, "+"),
    ];
    static ref FOUR_AS_SIGN_DIURNAL: Site =
        Site::new(None, Some(r"4\d{2}")).on_boundary().replace(1, "+");

    static ref DASH_RUN: Regex = Regex::new(r"^[\-—~]{2,}").unwrap();
    static ref PLUS_RUN: Regex = Regex::new(r"^(?:\++[+\-]+|-\+|-[{}]-)").unwrap();
    static ref BRACE_DASH_RUN: Regex = Regex::new(r"^[\-{}]+").unwrap();
    static ref BRACE_RUN: Regex = Regex::new(r"^[{}]+").unwrap();

    static ref PAREN_ZERO: Site = Site::new(Some("-"), Some(r"\(-")).replace(1, "0");

    static ref WHITESPACE_RUN: Regex = Regex::new(r"(\s){2,}").unwrap();
    static ref LINE_BREAK: Regex = Regex::new(r"(\S)\n+").unwrap();
    static ref LOOSE_GAP: Regex = Regex::new(r"(\s[+\-]|\s\d{2,3})(\s)([^A-Za-z])").unwrap();
}

/// Em-dash to hyphen, then the two glyph fixes that must happen before
/// anything looks at digits: `o O ©` to `0`, `I !` to `1`.
pub fn prepare(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '—' => '-',
            'o' | 'O' | '©' => '0',
            'I' | '!' => '1',
            other => other,
        })
        .collect()
}

/// Turn a `4` that opens a signed reading back into `+`.
pub fn digit_to_sign(text: &str, variable: VariableType) -> String {
    let text = apply_all(&FOUR_AS_SIGN, text);
    if variable == VariableType::DiurnalInequality {
        FOUR_AS_SIGN_DIURNAL.apply(&text)
    } else {
        text
    }
}

/// Repair merged or garbled sign characters.
///
/// Dash runs collapse to `-` unless they open with a plain `--`; a single
/// `~` or em-dash is `-`; `-(` before `0` is `-`. Then any mix of `+`,
/// `-` and braces that is not a lone minus collapses to `+`.
pub fn edit_sign(text: &str) -> String {
    let text = rewrite(text, |_, tail| {
        if !tail.starts_with("--") {
            if let Some(m) = DASH_RUN.find(tail) {
                return Some((m.end(), "-".to_string()));
            }
        }
        match tail.chars().next() {
            Some(c @ ('—' | '~')) => Some((c.len_utf8(), "-".to_string())),
            Some('-') if tail[1..].starts_with("(0") => Some((2, "-".to_string())),
            _ => None,
        }
    });

    rewrite(&text, |_, tail| {
        if let Some(m) = PLUS_RUN.find(tail) {
            return Some((m.end(), "+".to_string()));
        }
        if (tail.starts_with('{') || tail.starts_with('}')) && !tail.starts_with("{}") {
            let m = BRACE_DASH_RUN.find(tail)?;
            return Some((m.end(), "+".to_string()));
        }
        BRACE_RUN.find(tail).map(|m| (m.end(), "+".to_string()))
    })
}

/// Apply the full glyph table, then read `(` squeezed between two
/// dashes as `0`.
pub fn char_to_digit(text: &str) -> String {
    let text: String = text
        .chars()
        .map(|c| {
            GLYPH_DIGITS
                .iter()
                .find(|(glyphs, _)| glyphs.contains(c))
                .map(|&(_, digit)| digit)
                .unwrap_or(c)
        })
        .collect();
    PAREN_ZERO.apply(&text)
}

/// A token made only of `-`, `_` or `.` carries no value: mark it `NaN`.
pub fn sign_to_nan(text: &str) -> String {
    rewrite(text, |head, tail| {
        if !head.chars().next_back().is_none_or(char::is_whitespace) {
            return None;
        }
        let run = tail
            .find(|c: char| !matches!(c, '-' | '_' | '.'))
            .unwrap_or(tail.len());
        if run == 0 {
            return None;
        }
        let after = tail[run..].chars().next();
        after
            .is_none_or(char::is_whitespace)
            .then(|| (run, "NaN".to_string()))
    })
}

/// Run every normalisation pass over a body, in order.
pub fn normalize(body: &str, variable: VariableType) -> String {
    let text = prepare(body);
    let text = digit_to_sign(&text, variable);
    trace!(%text, "after sign recovery");
    let text = edit_sign(&text);
    trace!(%text, "after sign repair");
    let text = char_to_digit(&text);
    let text = sign_to_nan(&text);
    trace!(%text, "normalised");
    text
}

/// Collapse whitespace runs, turn line breaks into spaces, and close the
/// gap between a sign or short digit run and the value after it.
pub fn tidy_whitespace(text: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(text, "$1");
    let text = LINE_BREAK.replace_all(&text, "$1 ");
    LOOSE_GAP.replace_all(&text, "$1$3").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare() {
        assert_eq!(prepare("—O9I!o ©"), "-09110 0");
    }

    #[test]
    fn test_four_read_as_plus() {
        assert_eq!(digit_to_sign("4512 0991", VariableType::Pressure), "+512 0991");
        assert_eq!(digit_to_sign("41.23 0991", VariableType::Pressure), "+1.23 0991");
        assert_eq!(digit_to_sign("4-12", VariableType::Temperature), "+-12");
        // Inside a token the 4 is a real digit.
        assert_eq!(digit_to_sign("0451 7412", VariableType::Pressure), "0451 7412");
    }

    #[test]
    fn test_short_form_only_for_diurnal() {
        assert_eq!(digit_to_sign("412 +3", VariableType::Pressure), "412 +3");
        assert_eq!(
            digit_to_sign("412 +3", VariableType::DiurnalInequality),
            "+12 +3"
        );
    }

    #[test]
    fn test_dash_runs() {
        assert_eq!(edit_sign("~~3"), "-3");
        assert_eq!(edit_sign("-~-"), "-");
        assert_eq!(edit_sign("~5"), "-5");
        assert_eq!(edit_sign("-(0"), "-0");
        // A run opening with a plain double hyphen is left for the NaN pass.
        assert_eq!(edit_sign("5 --- 3"), "5 --- 3");
        assert_eq!(edit_sign("5--3"), "5--3");
    }

    #[test]
    fn test_mixed_signs_become_plus() {
        assert_eq!(edit_sign("+-5"), "+5");
        assert_eq!(edit_sign("+++5"), "+5");
        assert_eq!(edit_sign("-+5"), "+5");
        assert_eq!(edit_sign("-{-5"), "+5");
        assert_eq!(edit_sign("{-12"), "+12");
        assert_eq!(edit_sign("}7"), "+7");
        assert_eq!(edit_sign("{}-7"), "+-7");
        assert_eq!(edit_sign("-7"), "-7");
    }

    #[test]
    fn test_edit_sign_idempotent_on_clean_input() {
        for text in ["-7 +3 0991", "5 --- 3", "+-7 12", "NaN -1.5"] {
            let once = edit_sign(text);
            assert_eq!(edit_sign(&once), once, "input {text:?}");
        }
    }

    #[test]
    fn test_glyph_table() {
        assert_eq!(char_to_digit("lO.S"), "10.5");
        assert_eq!(char_to_digit("Zy&q"), "2789");
        assert_eq!(char_to_digit("£¢§€"), "2496");
        assert_eq!(char_to_digit("-(-"), "-0-");
        assert_eq!(char_to_digit("(5)"), "(5)");
    }

    #[test]
    fn test_isolated_signs_are_nan() {
        assert_eq!(sign_to_nan("- 12 _ 3 ."), "NaN 12 NaN 3 NaN");
        assert_eq!(sign_to_nan("0991 --- 0992"), "0991 NaN 0992");
        assert_eq!(sign_to_nan("12.5 -5 5-"), "12.5 -5 5-");
        assert_eq!(sign_to_nan("a\n..\nb"), "a\nNaN\nb");
    }

    #[test]
    fn test_normalize_pipeline() {
        assert_eq!(
            normalize("0991 --- 0992", VariableType::Pressure),
            "0991 NaN 0992"
        );
        assert_eq!(normalize("4512 O99S", VariableType::Pressure), "+512 0995");
        assert_eq!(normalize("~~ 7B.l", VariableType::Temperature), "NaN 78.1");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let span = "4512 ~~ {-12 lO.S -(- 0991\n--- 41.23";
        for variable in [VariableType::Pressure, VariableType::DiurnalInequality] {
            assert_eq!(normalize(span, variable), normalize(span, variable));
        }
    }

    #[test]
    fn test_tidy_whitespace() {
        assert_eq!(tidy_whitespace("0991   0992"), "0991 0992");
        assert_eq!(tidy_whitespace("0991\n0992"), "0991 0992");
        assert_eq!(tidy_whitespace("a + 5"), "a +5");
        assert_eq!(tidy_whitespace("x 12 .5"), "x 12.5");
        // Letters after the gap stay separate.
        assert_eq!(tidy_whitespace("x 12 NaN"), "x 12 NaN");
    }
}
