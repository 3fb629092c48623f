use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Punctuation and digits are deleted outright, not turned into
    // boundaries: "foo-bar" becomes "foobar", "runner's" becomes "runners".
    static ref STRIP: Regex = Regex::new(r"[\p{P}\p{N}]+").expect("valid regex");
}

/// NFKC-normalize, delete punctuation and digits, lowercase, and split on
/// whitespace. Deterministic and idempotent on already-normalized input.
pub fn normalize(text: &str) -> Vec<String> {
    let folded = text.nfkc().collect::<String>().to_lowercase();
    let stripped = STRIP.replace_all(&folded, "");
    stripped.split_whitespace().map(str::to_owned).collect()
}

/// Whitespace split of raw query text with case preserved.
///
/// Boolean queries must see operator words un-folded, so this does none of
/// the cleanup that [`normalize`] does.
pub fn word_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

/// Reduces a token to its stem. Implementations must be pure and
/// deterministic; the engine never caches stems across calls.
pub trait Stem {
    fn stem(&self, token: &str) -> String;
}

/// Porter-style English stemming via `rust-stemmers`.
pub struct EnglishStemmer {
    inner: Stemmer,
}

impl EnglishStemmer {
    pub fn new() -> Self {
        Self { inner: Stemmer::create(Algorithm::English) }
    }
}

impl Default for EnglishStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stem for EnglishStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).to_string()
    }
}

/// Pre-lowercased stopword set. An absent source degrades to the empty set;
/// it is never an error.
#[derive(Debug, Default, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        Self { words }
    }

    /// Load a flat word list, one word per line. Blank lines are ignored.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                Self::from_words(text.lines().map(str::trim).filter(|w| !w.is_empty()))
            }
            Err(_) => {
                tracing::debug!(path = %path.display(), "no stopword list, filtering disabled");
                Self::empty()
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// The full analysis pipeline: normalize, drop stopwords and short tokens,
/// stem. The stemmer is injected so tests can substitute a deterministic
/// stub.
pub struct Analyzer {
    stopwords: StopwordSet,
    stemmer: Box<dyn Stem + Send + Sync>,
}

impl Analyzer {
    pub fn new(stopwords: StopwordSet, stemmer: Box<dyn Stem + Send + Sync>) -> Self {
        Self { stopwords, stemmer }
    }

    /// Analyzer with the default English stemmer.
    pub fn english(stopwords: StopwordSet) -> Self {
        Self::new(stopwords, Box::new(EnglishStemmer::new()))
    }

    /// Run a document through the pipeline, yielding its ordered term
    /// sequence. Positions in the positional index are ordinals into this
    /// filtered sequence, so the stopword/length drops happen before any
    /// position is assigned.
    pub fn process(&self, text: &str) -> Vec<String> {
        normalize(text)
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .filter(|t| t.chars().count() > 2)
            .map(|t| self.stemmer.stem(&t))
            .collect()
    }

    /// Lowercase and stem a single query term. Query terms skip the
    /// stopword/length filters so they hit the index the way the caller
    /// wrote them.
    pub fn stem_term(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase())
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_digits() {
        let tokens = normalize("Hello, World! 42 foo-bar runner's");
        assert_eq!(tokens, vec!["hello", "world", "foobar", "runners"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("The CAT, sat. On 3 mats!").join(" ");
        assert_eq!(normalize(&once).join(" "), once);
    }

    #[test]
    fn normalize_applies_nfkc() {
        // Fullwidth letters fold down to ASCII under NFKC.
        assert_eq!(normalize("ｃａｔ"), vec!["cat"]);
    }

    #[test]
    fn word_tokens_preserve_case() {
        assert_eq!(word_tokens("cat AND Sat"), vec!["cat", "AND", "Sat"]);
    }

    #[test]
    fn process_filters_stopwords_and_short_tokens() {
        let analyzer = Analyzer::english(StopwordSet::from_words(["the", "on"]));
        let terms = analyzer.process("The cat is on an ox mat");
        // "the"/"on" are stopwords, "is"/"an"/"ox" are too short.
        assert_eq!(terms, vec!["cat", "mat"]);
    }

    #[test]
    fn process_stems_surviving_tokens() {
        let analyzer = Analyzer::english(StopwordSet::empty());
        let terms = analyzer.process("running runners");
        assert_eq!(terms, vec!["run", "runner"]);
    }

    #[test]
    fn missing_stopword_file_degrades_to_empty_set() {
        let set = StopwordSet::load(Path::new("/nonexistent/stopwords.txt"));
        assert!(set.is_empty());
    }

    #[test]
    fn stopwords_are_case_insensitive() {
        let set = StopwordSet::from_words(["The", "ON"]);
        assert!(set.contains("the"));
        assert!(set.contains("on"));
    }
}
