//! Legend vocabulary and best-effort word correction.
//!
//! Legend spans (captions, column headers) carry words, not readings. Each
//! word is checked against a small meteorological vocabulary, optionally
//! extended by a word list and a Hunspell dictionary; an unknown word is
//! replaced by the closest vocabulary word within two edits.

use crate::error::{CorrectionError, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;
use zspell::Dictionary;

/// Global dictionary instance (loaded once, reused)
static DICTIONARY: OnceLock<LegendDictionary> = OnceLock::new();

pub const MAX_EDIT_DISTANCE: usize = 2;
/// Shorter words have too many neighbours within two edits.
const MIN_CORRECTABLE_LEN: usize = 4;
const WORD_LIST_FILE: &str = "legend_words.txt";
const HUNSPELL_NAME: &str = "en_US";

const MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "April", "May", "June", "July", "Aug", "Sept", "Oct", "Nov", "Dec",
];

const VARIABLES: &[&str] = &[
    "pressure",
    "absolute pressure",
    "pressure at station level and at sea level.",
    "absolute temperature",
    "temperature",
    "temperature in the ground",
    "night grass temperature",
    "humidity",
    "humidity : annual means",
    "relative humidity",
    "rainfall",
    "duration of bright sunshine",
    "wind",
    "cloud",
    "solar",
    "potential gradient",
    "magnetism",
    "water",
    "pollution",
];

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[^\W\d_]+").unwrap();
}

pub struct LegendDictionary {
    /// NFKC, upper-case.
    vocabulary: BTreeSet<String>,
    hunspell: Option<Dictionary>,
}

impl Default for LegendDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LegendDictionary {
    /// Month names and the variable names printed in the log legends.
    pub fn builtin() -> Self {
        let dict = Self {
            vocabulary: BTreeSet::new(),
            hunspell: None,
        };
        dict.with_words(MONTHS.iter().chain(VARIABLES))
    }

    /// Built-in vocabulary plus whatever `dict_dir` provides: a
    /// `legend_words.txt` word list and an `en_US` Hunspell pair. Both are
    /// optional; a missing directory is an error.
    pub fn load(dict_dir: &Path) -> Result<Self> {
        if !dict_dir.is_dir() {
            return Err(CorrectionError::DictionaryNotFound {
                path: dict_dir.to_path_buf(),
            });
        }
        let mut dict = Self::builtin().with_words(load_word_list(dict_dir));
        dict.hunspell = load_hunspell(dict_dir, HUNSPELL_NAME);
        info!("{}", dict.stats());
        Ok(dict)
    }

    /// Add every word of every entry; entries may be phrases.
    pub fn with_words<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in entries {
            for word in WORD.find_iter(entry.as_ref()) {
                self.vocabulary.insert(canonical(word.as_str()));
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        if self.vocabulary.contains(&canonical(word)) {
            return true;
        }
        match &self.hunspell {
            Some(d) => d.check_word(word) || d.check_word(&word.to_lowercase()),
            None => false,
        }
    }

    /// Closest vocabulary word within [`MAX_EDIT_DISTANCE`], upper-case.
    /// Ties go to the smaller distance, then to the alphabetically first word.
    pub fn suggest(&self, word: &str) -> Option<String> {
        let target = canonical(word);
        if target.chars().count() < MIN_CORRECTABLE_LEN || self.contains(word) {
            return None;
        }

        let mut best: Option<(usize, &String)> = None;
        for candidate in &self.vocabulary {
            let distance = levenshtein_distance(&target, candidate);
            if distance <= MAX_EDIT_DISTANCE && best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
        }
        best.map(|(_, word)| word.clone())
    }

    /// Upper-case a legend segment and replace misread words.
    pub fn correct_segment(&self, segment: &str) -> String {
        let segment: String = segment.nfkc().collect();
        let corrected = WORD.replace_all(&segment, |caps: &Captures| {
            let word = &caps[0];
            match self.suggest(word) {
                Some(fix) => {
                    debug!(word, %fix, "legend word corrected");
                    fix
                }
                None => word.to_string(),
            }
        });
        corrected.to_uppercase()
    }

    pub fn correct_segments<S: AsRef<str>>(&self, segments: &[S]) -> Vec<String> {
        segments
            .iter()
            .map(|s| self.correct_segment(s.as_ref()))
            .collect()
    }

    pub fn stats(&self) -> String {
        format!(
            "Legend dictionary: {} words, hunspell={}",
            self.vocabulary.len(),
            self.hunspell.is_some()
        )
    }
}

fn canonical(word: &str) -> String {
    word.nfkc().collect::<String>().to_uppercase()
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    #[allow(clippy::needless_range_loop)]
    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

/// One entry per line; blank lines and `#` comments are skipped.
fn load_word_list(dict_dir: &Path) -> Vec<String> {
    let path = dict_dir.join(WORD_LIST_FILE);
    if !path.exists() {
        debug!("Word list not found: {}", WORD_LIST_FILE);
        return Vec::new();
    }

    match fs::read_to_string(&path) {
        Ok(content) => {
            let words: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| line.to_string())
                .collect();
            info!("Loaded word list: {} entries", words.len());
            words
        }
        Err(e) => {
            warn!("Failed to read {}: {}", WORD_LIST_FILE, e);
            Vec::new()
        }
    }
}

/// Load a Hunspell dictionary using the zspell builder.
fn load_hunspell(dict_dir: &Path, name: &str) -> Option<Dictionary> {
    let aff_path = dict_dir.join(format!("{}.aff", name));
    let dic_path = dict_dir.join(format!("{}.dic", name));

    if !aff_path.exists() || !dic_path.exists() {
        debug!("Hunspell dictionary not found: {}", name);
        return None;
    }

    let aff_content = match fs::read_to_string(&aff_path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}.aff: {}", name, e);
            return None;
        }
    };
    let dic_content = match fs::read_to_string(&dic_path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}.dic: {}", name, e);
            return None;
        }
    };

    match zspell::builder()
        .config_str(&aff_content)
        .dict_str(&dic_content)
        .build()
    {
        Ok(dict) => {
            info!("Loaded Hunspell dictionary: {}", name);
            Some(dict)
        }
        Err(e) => {
            warn!("Failed to build dictionary {}: {}", name, e);
            None
        }
    }
}

/// Initialize the global dictionary from a directory path
pub fn init_dictionary(dict_dir: &str) -> bool {
    let dict = match LegendDictionary::load(Path::new(dict_dir)) {
        Ok(dict) => dict,
        Err(e) => {
            warn!("{}", e);
            return false;
        }
    };

    if DICTIONARY.set(dict).is_err() {
        debug!("Dictionary already initialized");
    }
    true
}

/// The global dictionary, falling back to the built-in vocabulary.
pub fn global() -> &'static LegendDictionary {
    DICTIONARY.get_or_init(LegendDictionary::builtin)
}

pub fn is_known_word(word: &str) -> bool {
    global().contains(word)
}

pub fn dictionary_loaded() -> bool {
    DICTIONARY.get().is_some()
}
