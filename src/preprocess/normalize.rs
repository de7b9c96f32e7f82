// The text normalization chain.
//
// String-level operations take and return &str/String; token-level operations
// take token slices. The handoff point is `tokenize`, so calling a token
// operation before tokenizing is a type error rather than a runtime surprise.
//
// Canonical order: fill -> strip URLs -> expand contractions -> lowercase ->
// strip hashtags -> strip escapes -> tokenize -> strip special chars ->
// filter stopwords -> stem or lemmatize.

use std::collections::HashSet;

use regex_lite::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

use super::contractions;
use super::lemma::{self, PosTag};

/// Which token reduction to apply at the end of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StemMode {
    /// Snowball English stemming — fast, crude ("relevance" -> "relev").
    Stem,
    /// POS-tagged rule lemmatization — slower, keeps readable words.
    #[default]
    Lemmatize,
}

/// One normalized text column with its provenance: the cleaned string the
/// sentiment model consumes, the reduced tokens, their POS tags (lemmatize
/// mode only), and the space-joined document the topic model consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedText {
    pub cleaned: String,
    pub tokens: Vec<String>,
    pub tags: Vec<PosTag>,
    pub joined: String,
}

pub struct TextNormalizer {
    url_re: Regex,
    stop_words: HashSet<String>,
    stemmer: Stemmer,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            url_re: Regex::new(r"(?:https?://|www\.)[^\s]+")
                .expect("URL pattern is statically valid"),
            stop_words: get(LANGUAGE::English).into_iter().collect(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Absent text becomes the empty string. Every chain starts here.
    pub fn fill_missing(text: Option<&str>) -> String {
        text.unwrap_or_default().to_string()
    }

    /// Remove HTTP(S) and www URLs. Idempotent.
    pub fn strip_urls(&self, text: &str) -> String {
        self.url_re.replace_all(text, "").into_owned()
    }

    /// Rewrite contracted forms to full forms. Idempotent.
    pub fn expand_contractions(&self, text: &str) -> String {
        contractions::expand(text)
    }

    /// Idempotent.
    pub fn to_lowercase(&self, text: &str) -> String {
        text.to_lowercase()
    }

    /// Remove `#` characters. Idempotent.
    pub fn strip_hashtags(&self, text: &str) -> String {
        text.replace('#', "")
    }

    /// Replace literal escape sequences ("\n" as two characters) and real
    /// control whitespace with spaces, then collapse runs of whitespace.
    pub fn strip_escape_sequences(&self, text: &str) -> String {
        let replaced = text
            .replace("\\n", " ")
            .replace("\\t", " ")
            .replace("\\r", " ")
            .replace(['\n', '\t', '\r'], " ");
        replaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Split into sentences, then words. Words are runs of alphanumeric
    /// characters (apostrophes stay attached, as in "cat's"); every other
    /// non-space character becomes its own punctuation token. Empty input
    /// yields an empty token list.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for sentence in text.split(|c| matches!(c, '.' | '!' | '?')) {
            split_words(sentence, &mut tokens);
        }
        tokens
    }

    /// Drop non-alphanumeric (non-alphabetic when `remove_digits`) characters
    /// from each token, case-fold, discard tokens that become empty.
    pub fn strip_special_characters(&self, tokens: &[String], remove_digits: bool) -> Vec<String> {
        tokens
            .iter()
            .filter_map(|tok| {
                let kept: String = tok
                    .chars()
                    .filter(|c| {
                        if remove_digits {
                            c.is_ascii_alphabetic()
                        } else {
                            c.is_ascii_alphanumeric()
                        }
                    })
                    .collect::<String>()
                    .to_lowercase();
                if kept.is_empty() {
                    None
                } else {
                    Some(kept)
                }
            })
            .collect()
    }

    /// Remove standard English stopwords; drop emptied entries.
    pub fn filter_stopwords(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .filter(|tok| !tok.is_empty() && !self.stop_words.contains(tok.as_str()))
            .cloned()
            .collect()
    }

    /// Snowball English stemming.
    pub fn stem(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .map(|tok| self.stemmer.stem(tok).into_owned())
            .collect()
    }

    /// POS-tag each token independently, then lemmatize with the tag.
    /// Returns the tags alongside the lemmas.
    pub fn lemmatize(&self, tokens: &[String]) -> (Vec<PosTag>, Vec<String>) {
        let tags: Vec<PosTag> = tokens.iter().map(|tok| lemma::tag_token(tok)).collect();
        let lemmas = tokens
            .iter()
            .zip(&tags)
            .map(|(tok, &tag)| lemma::lemmatize_token(tok, tag))
            .collect();
        (tags, lemmas)
    }

    /// Rejoin tokens into a single space-separated string.
    pub fn tokens_to_string(tokens: &[String]) -> String {
        tokens.join(" ")
    }

    /// The canonical chain, start to finish, for one text value.
    pub fn normalize(&self, text: Option<&str>, mode: StemMode) -> NormalizedText {
        let filled = Self::fill_missing(text);
        let s = self.strip_urls(&filled);
        let s = self.expand_contractions(&s);
        let s = self.to_lowercase(&s);
        let s = self.strip_hashtags(&s);
        let cleaned = self.strip_escape_sequences(&s);

        let raw_tokens = self.tokenize(&cleaned);
        let stripped = self.strip_special_characters(&raw_tokens, false);
        let filtered = self.filter_stopwords(&stripped);

        let (tags, tokens) = match mode {
            StemMode::Stem => (Vec::new(), self.stem(&filtered)),
            StemMode::Lemmatize => self.lemmatize(&filtered),
        };

        let joined = Self::tokens_to_string(&tokens);
        NormalizedText {
            cleaned,
            tokens,
            tags,
            joined,
        }
    }
}

fn split_words(sentence: &str, out: &mut Vec<String>) {
    let mut word = String::new();
    for c in sentence.chars() {
        if c.is_alphanumeric() || c == '\'' {
            word.push(c);
        } else {
            if !word.is_empty() {
                out.push(std::mem::take(&mut word));
            }
            if !c.is_whitespace() {
                out.push(c.to_string());
            }
        }
    }
    if !word.is_empty() {
        out.push(word);
    }
}
