// Part-of-speech tagging and lemmatization.
//
// Each token is tagged independently of its neighbors — computationally
// naive, but tokens reach this stage already stripped of context (stopwords
// and punctuation are gone), so a context-aware tagger would have little to
// work with anyway. The tag vocabulary is the lemmatizer's: adjective, noun,
// verb, adverb, defaulting to noun.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PosTag {
    Adjective,
    Noun,
    Verb,
    Adverb,
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PosTag::Adjective => "adj",
            PosTag::Noun => "noun",
            PosTag::Verb => "verb",
            PosTag::Adverb => "adv",
        };
        f.write_str(s)
    }
}

/// Suffix-rule tagger. Defaults to noun, the safest guess for English.
pub fn tag_token(token: &str) -> PosTag {
    let t = token.to_lowercase();

    if IRREGULAR_VERBS.iter().any(|(w, _)| *w == t) {
        return PosTag::Verb;
    }
    if IRREGULAR_ADJECTIVES.iter().any(|(w, _)| *w == t) {
        return PosTag::Adjective;
    }

    if t.len() > 3 && t.ends_with("ly") {
        return PosTag::Adverb;
    }
    if t.len() > 4 && (t.ends_with("ing") || t.ends_with("ed")) {
        return PosTag::Verb;
    }
    if t.ends_with("ize") || t.ends_with("ise") || t.ends_with("ify") {
        return PosTag::Verb;
    }
    const ADJ_SUFFIXES: [&str; 7] = ["ous", "ful", "ive", "less", "able", "ible", "ish"];
    if t.len() > 4 && ADJ_SUFFIXES.iter().any(|s| t.ends_with(s)) {
        return PosTag::Adjective;
    }

    PosTag::Noun
}

const IRREGULAR_VERBS: [(&str, &str); 22] = [
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("has", "have"),
    ("had", "have"),
    ("did", "do"),
    ("done", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("said", "say"),
    ("made", "make"),
    ("got", "get"),
    ("took", "take"),
    ("taken", "take"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("knew", "know"),
    ("ran", "run"),
];

const IRREGULAR_NOUNS: [(&str, &str); 7] = [
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
];

const IRREGULAR_ADJECTIVES: [(&str, &str); 4] = [
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
];

/// Reduce a token to its base form according to its POS tag.
pub fn lemmatize_token(token: &str, tag: PosTag) -> String {
    let t = token.to_lowercase();
    match tag {
        PosTag::Noun => lemmatize_noun(&t),
        PosTag::Verb => lemmatize_verb(&t),
        PosTag::Adjective => lemmatize_adjective(&t),
        // WordNet barely lemmatizes adverbs; pass through.
        PosTag::Adverb => t,
    }
}

fn lemmatize_noun(t: &str) -> String {
    if let Some(&(_, lemma)) = IRREGULAR_NOUNS.iter().find(|(w, _)| *w == t) {
        return lemma.to_string();
    }
    if t.len() > 4 && t.ends_with("ies") {
        return format!("{}y", &t[..t.len() - 3]);
    }
    if t.ends_with("sses") {
        return t[..t.len() - 2].to_string();
    }
    if t.len() > 4
        && (t.ends_with("xes") || t.ends_with("zes") || t.ends_with("ches") || t.ends_with("shes"))
    {
        return t[..t.len() - 2].to_string();
    }
    if t.len() > 4 && t.ends_with("ves") {
        return format!("{}f", &t[..t.len() - 3]);
    }
    if t.len() > 3 && t.ends_with('s') && !t.ends_with("ss") && !t.ends_with("us") && !t.ends_with("is")
    {
        return t[..t.len() - 1].to_string();
    }
    t.to_string()
}

fn lemmatize_verb(t: &str) -> String {
    if let Some(&(_, lemma)) = IRREGULAR_VERBS.iter().find(|(w, _)| *w == t) {
        return lemma.to_string();
    }
    if t.len() > 4 && t.ends_with("ies") {
        return format!("{}y", &t[..t.len() - 3]);
    }
    if t.len() > 4 && t.ends_with("ied") {
        return format!("{}y", &t[..t.len() - 3]);
    }
    if t.len() > 4 && t.ends_with("eed") {
        return t[..t.len() - 1].to_string();
    }
    if t.len() > 5 && t.ends_with("ing") {
        return undouble(&t[..t.len() - 3]);
    }
    if t.len() > 4 && t.ends_with("ed") {
        return undouble(&t[..t.len() - 2]);
    }
    if t.len() > 3 && t.ends_with("es") {
        return t[..t.len() - 1].to_string();
    }
    if t.len() > 3 && t.ends_with('s') && !t.ends_with("ss") {
        return t[..t.len() - 1].to_string();
    }
    t.to_string()
}

fn lemmatize_adjective(t: &str) -> String {
    if let Some(&(_, lemma)) = IRREGULAR_ADJECTIVES.iter().find(|(w, _)| *w == t) {
        return lemma.to_string();
    }
    if t.len() > 5 && t.ends_with("iest") {
        return format!("{}y", &t[..t.len() - 4]);
    }
    if t.len() > 4 && t.ends_with("ier") {
        return format!("{}y", &t[..t.len() - 3]);
    }
    if t.len() > 4 && t.ends_with("est") {
        return undouble(&t[..t.len() - 3]);
    }
    if t.len() > 3 && t.ends_with("er") {
        return undouble(&t[..t.len() - 2]);
    }
    t.to_string()
}

/// Collapse a trailing doubled consonant left behind by suffix stripping
/// ("running" -> "runn" -> "run"). "ll" and "ss" stay doubled ("rolling",
/// "missing").
fn undouble(stem: &str) -> String {
    let bytes = stem.as_bytes();
    if bytes.len() >= 2 {
        let last = bytes[bytes.len() - 1];
        let prev = bytes[bytes.len() - 2];
        if last == prev && b"bdgmnprt".contains(&last) {
            return stem[..stem.len() - 1].to_string();
        }
    }
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagger_suffixes() {
        assert_eq!(tag_token("quickly"), PosTag::Adverb);
        assert_eq!(tag_token("running"), PosTag::Verb);
        assert_eq!(tag_token("agreed"), PosTag::Verb);
        assert_eq!(tag_token("beautiful"), PosTag::Adjective);
        assert_eq!(tag_token("famous"), PosTag::Adjective);
        assert_eq!(tag_token("cat"), PosTag::Noun);
    }

    #[test]
    fn test_tagger_defaults_to_noun() {
        assert_eq!(tag_token("keyboard"), PosTag::Noun);
        assert_eq!(tag_token("xyzzy"), PosTag::Noun);
    }

    #[test]
    fn test_noun_plurals() {
        assert_eq!(lemmatize_token("cats", PosTag::Noun), "cat");
        assert_eq!(lemmatize_token("parties", PosTag::Noun), "party");
        assert_eq!(lemmatize_token("boxes", PosTag::Noun), "box");
        assert_eq!(lemmatize_token("wolves", PosTag::Noun), "wolf");
        assert_eq!(lemmatize_token("classes", PosTag::Noun), "class");
        // Not stripped: looks singular
        assert_eq!(lemmatize_token("bus", PosTag::Noun), "bus");
        assert_eq!(lemmatize_token("analysis", PosTag::Noun), "analysis");
    }

    #[test]
    fn test_irregular_nouns() {
        assert_eq!(lemmatize_token("children", PosTag::Noun), "child");
        assert_eq!(lemmatize_token("people", PosTag::Noun), "person");
    }

    #[test]
    fn test_verbs() {
        assert_eq!(lemmatize_token("running", PosTag::Verb), "run");
        assert_eq!(lemmatize_token("agreed", PosTag::Verb), "agree");
        assert_eq!(lemmatize_token("tried", PosTag::Verb), "try");
        assert_eq!(lemmatize_token("walks", PosTag::Verb), "walk");
        assert_eq!(lemmatize_token("was", PosTag::Verb), "be");
        assert_eq!(lemmatize_token("went", PosTag::Verb), "go");
    }

    #[test]
    fn test_adjectives() {
        assert_eq!(lemmatize_token("happier", PosTag::Adjective), "happy");
        assert_eq!(lemmatize_token("biggest", PosTag::Adjective), "big");
        assert_eq!(lemmatize_token("better", PosTag::Adjective), "good");
    }

    #[test]
    fn test_adverbs_pass_through() {
        assert_eq!(lemmatize_token("quickly", PosTag::Adverb), "quickly");
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(PosTag::Noun.to_string(), "noun");
        assert_eq!(PosTag::Adverb.to_string(), "adv");
    }
}
