//! Digit signature: the two cheap statistics used to guess which quantity a
//! span of digits encodes.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref DIGIT: Regex = Regex::new(r"\d").unwrap();
}

/// Most frequent token start after whitespace, plus the total digit count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitSignature {
    /// A digit, `+` or `-`; empty when no token follows whitespace.
    pub leading_token: String,
    pub digit_count: usize,
}

impl DigitSignature {
    pub fn is_empty(&self) -> bool {
        self.leading_token.is_empty()
    }
}

/// Compute the signature of a span.
///
/// Must run on still-noisy text: the classifier's length ranges were tuned
/// against digit counts taken before glyph correction.
pub fn analyze(span: &str) -> DigitSignature {
    // First-seen order breaks ties between equally frequent starts.
    let mut counts: Vec<(char, usize)> = Vec::new();
    let mut prev: Option<char> = None;

    for c in span.chars() {
        if prev.is_some_and(char::is_whitespace) && is_token_start(c) {
            match counts.iter_mut().find(|(seen, _)| *seen == c) {
                Some((_, n)) => *n += 1,
                None => counts.push((c, 1)),
            }
        }
        prev = Some(c);
    }

    let mut leading: Option<(char, usize)> = None;
    for &(c, n) in &counts {
        if leading.is_none_or(|(_, best)| n > best) {
            leading = Some((c, n));
        }
    }

    DigitSignature {
        leading_token: leading.map(|(c, _)| c.to_string()).unwrap_or_default(),
        digit_count: DIGIT.find_iter(span).count(),
    }
}

fn is_token_start(c: char) -> bool {
    c == '+' || c == '-' || DIGIT.is_match(c.encode_utf8(&mut [0; 4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_common_leading_token() {
        let sig = analyze("x 0991 0993 9987 0995");
        assert_eq!(sig.leading_token, "0");
        assert_eq!(sig.digit_count, 16);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let sig = analyze(" 7 8 8 7");
        assert_eq!(sig.leading_token, "7");
    }

    #[test]
    fn test_signs_count_as_token_starts() {
        let sig = analyze("a +12 -3 +4");
        assert_eq!(sig.leading_token, "+");
        assert_eq!(sig.digit_count, 4);
    }

    #[test]
    fn test_first_char_needs_preceding_whitespace() {
        // The very first char has nothing before it.
        let sig = analyze("123");
        assert!(sig.is_empty());
        assert_eq!(sig.digit_count, 3);
    }

    #[test]
    fn test_empty_span() {
        assert_eq!(analyze(""), DigitSignature::default());
    }

    #[test]
    fn test_newline_is_whitespace() {
        let sig = analyze("Jan\n9\n9");
        assert_eq!(sig.leading_token, "9");
    }
}
