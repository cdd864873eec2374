//! Fixed-phrase content filter

use crate::constants::DEFAULT_BANNED_WORDS;

/// Case-insensitive substring deny-list. No tokenization: "spammer" matches "spam".
#[derive(Debug, Clone)]
pub struct ContentFilter {
    banned: Vec<String>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_WORDS.iter().copied())
    }
}

impl ContentFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let banned = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { banned }
    }

    /// False if any deny-list entry appears anywhere in `text`
    pub fn passes(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        !self.banned.iter().any(|word| lower.contains(word.as_str()))
    }

    pub fn banned_words(&self) -> &[String] {
        &self.banned
    }
}
