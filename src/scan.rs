//! Position-anchored rewriting.
//!
//! The `regex` crate has no lookaround, and most correction rules are
//! "at a position where the text before looks like X and the text after
//! looks like Y, insert or replace something". [`rewrite`] walks every char
//! boundary left to right, asks a rule whether it fires there, and builds a
//! new string. Rules always see the original text, never partial output, so
//! a rule firing at one site cannot change what an earlier site saw.

use regex::Regex;

/// Walk `text` and let `rule` fire at each char boundary.
///
/// `rule(head, tail)` receives the text before and after the site and
/// returns the number of bytes of `tail` it consumes plus the replacement.
/// A zero-length edit inserts the replacement and the scan moves one char
/// on; a consuming edit resumes right after the consumed bytes.
pub(crate) fn rewrite<F>(text: &str, mut rule: F) -> String
where
    F: FnMut(&str, &str) -> Option<(usize, String)>,
{
    let mut out = String::with_capacity(text.len() + 8);
    let mut pos = 0;

    while pos <= text.len() {
        let (head, tail) = text.split_at(pos);
        if let Some((consumed, replacement)) = rule(head, tail) {
            out.push_str(&replacement);
            if consumed > 0 {
                pos += consumed.min(tail.len());
                continue;
            }
        }
        match tail.chars().next() {
            Some(c) => {
                out.push(c);
                pos += c.len_utf8();
            }
            None => break,
        }
    }

    out
}

pub(crate) fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `\b` between `head` and `tail`.
pub(crate) fn word_boundary(head: &str, tail: &str) -> bool {
    let before = head.chars().next_back().is_some_and(is_word);
    let after = tail.chars().next().is_some_and(is_word);
    before != after
}

/// Byte length of the first `n` chars of `s`, if it has that many.
pub(crate) fn char_prefix_len(s: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    s.char_indices()
        .nth(n - 1)
        .map(|(i, c)| i + c.len_utf8())
}

/// What a [`Site`] writes when it fires.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Emit {
    /// Replace the consumed chars with this text.
    Text(&'static str),
    /// Write this text, then the consumed chars unchanged.
    Before(&'static str),
}

/// One positional rule: context before, context after, what to consume.
#[derive(Debug, Clone)]
pub(crate) struct Site {
    behind: Option<Regex>,
    boundary: bool,
    ahead: Option<Regex>,
    consume: usize,
    emit: Emit,
}

impl Site {
    /// `behind` must match the text ending at the site, `ahead` the text
    /// starting there. Both are plain regex fragments; anchoring is added here.
    pub(crate) fn new(behind: Option<&str>, ahead: Option<&str>) -> Self {
        Self {
            behind: behind.map(|b| Regex::new(&format!("(?:{})$", b)).unwrap()),
            boundary: false,
            ahead: ahead.map(|a| Regex::new(&format!("^(?:{})", a)).unwrap()),
            consume: 0,
            emit: Emit::Text(""),
        }
    }

    /// Also require a word boundary at the site.
    pub(crate) fn on_boundary(mut self) -> Self {
        self.boundary = true;
        self
    }

    /// Insert `text` without consuming anything.
    pub(crate) fn insert(mut self, text: &'static str) -> Self {
        self.consume = 0;
        self.emit = Emit::Text(text);
        self
    }

    /// Replace the next `chars` chars with `text`.
    pub(crate) fn replace(mut self, chars: usize, text: &'static str) -> Self {
        self.consume = chars;
        self.emit = Emit::Text(text);
        self
    }

    /// Consume the next `chars` chars and write them back after `text`.
    pub(crate) fn prefix(mut self, chars: usize, text: &'static str) -> Self {
        self.consume = chars;
        self.emit = Emit::Before(text);
        self
    }

    fn fires(&self, head: &str, tail: &str) -> Option<(usize, String)> {
        if self.boundary && !word_boundary(head, tail) {
            return None;
        }
        if let Some(behind) = &self.behind {
            if !behind.is_match(head) {
                return None;
            }
        }
        if let Some(ahead) = &self.ahead {
            if !ahead.is_match(tail) {
                return None;
            }
        }
        let consumed = char_prefix_len(tail, self.consume)?;
        let written = match self.emit {
            Emit::Text(text) => text.to_string(),
            Emit::Before(text) => format!("{}{}", text, &tail[..consumed]),
        };
        Some((consumed, written))
    }

    pub(crate) fn apply(&self, text: &str) -> String {
        rewrite(text, |head, tail| self.fires(head, tail))
    }
}

/// Run `sites` one after another, each over the previous output.
pub(crate) fn apply_all(sites: &[Site], text: &str) -> String {
    sites
        .iter()
        .fold(text.to_string(), |acc, site| site.apply(&acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_width_insert_sees_original_text() {
        // Every gap between two digits gets a dot, including gaps next to
        // dots inserted a moment ago.
        let site = Site::new(Some(r"\d"), Some(r"\d")).insert(".");
        assert_eq!(site.apply("1234"), "1.2.3.4");
    }

    #[test]
    fn test_consuming_site_does_not_overlap() {
        let site = Site::new(Some(r"\d{2}"), Some(r"\d{2}")).prefix(2, " ");
        assert_eq!(site.apply("12345678"), "12 34 56 78");
    }

    #[test]
    fn test_boundary_check() {
        let site = Site::new(None, Some(r"4\d{3}")).on_boundary().replace(1, "+");
        assert_eq!(site.apply("4512 x4512 44512"), "+512 x4512 +4512");
    }

    #[test]
    fn test_word_boundary_edges() {
        assert!(word_boundary("", "a"));
        assert!(word_boundary("a", ""));
        assert!(!word_boundary("", ""));
        assert!(!word_boundary("a", "b"));
        assert!(word_boundary(" ", "4"));
    }

    #[test]
    fn test_char_prefix_len_multibyte() {
        assert_eq!(char_prefix_len("°12", 1), Some(2));
        assert_eq!(char_prefix_len("ab", 3), None);
        assert_eq!(char_prefix_len("", 0), Some(0));
    }

    #[test]
    fn test_rewrite_can_fire_at_end() {
        let out = rewrite("ab", |_, tail| tail.is_empty().then(|| (0, "!".to_string())));
        assert_eq!(out, "ab!");
    }
}
